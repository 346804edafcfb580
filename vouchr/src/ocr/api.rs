use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::OcrConfig;
use crate::error::{Result, VouchrError};

use super::TextRecognizer;

/// OCR.space client that walks its API keys in order until one answers.
#[derive(Clone, Debug)]
pub struct OcrSpaceClient {
    client: Client,
    api_keys: Vec<String>,
    base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ParseResponse {
    #[serde(default)]
    parsed_results: Option<Vec<ParsedResult>>,
    #[serde(default)]
    is_errored_on_processing: bool,
    #[serde(default)]
    error_message: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ParsedResult {
    #[serde(default)]
    parsed_text: String,
}

impl OcrSpaceClient {
    pub fn new(config: &OcrConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VouchrError::Ocr(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_keys: config.api_keys.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn key_count(&self) -> usize {
        self.api_keys.len()
    }

    async fn parse_with_key(&self, data_url: &str, api_key: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/parse/image", self.base_url))
            .form(&[("base64image", data_url), ("apikey", api_key)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VouchrError::Ocr(format!(
                "OCR.space request failed: {status} - {body}"
            )));
        }

        let parsed: ParseResponse = response
            .json()
            .await
            .map_err(|e| VouchrError::Ocr(format!("Failed to parse OCR.space response: {e}")))?;

        match parsed.parsed_results {
            Some(results) if !results.is_empty() => Ok(results[0].parsed_text.trim().to_string()),
            _ => {
                let reason = parsed
                    .error_message
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "no parsed results".to_string());
                Err(VouchrError::Ocr(format!(
                    "OCR.space returned no text (errored: {}): {reason}",
                    parsed.is_errored_on_processing
                )))
            }
        }
    }
}

#[async_trait]
impl TextRecognizer for OcrSpaceClient {
    fn name(&self) -> &'static str {
        "ocr.space"
    }

    async fn recognize(&self, image_bytes: &[u8]) -> Result<String> {
        let data_url = format!("data:image/png;base64,{}", STANDARD.encode(image_bytes));

        for (index, api_key) in self.api_keys.iter().enumerate() {
            match self.parse_with_key(&data_url, api_key).await {
                Ok(text) => {
                    debug!(key_index = index, "OCR.space key succeeded");
                    return Ok(text);
                }
                Err(e) => warn!(key_index = index, error = %e, "OCR.space key failed"),
            }
        }

        Err(VouchrError::Ocr(
            "All API keys failed. Unable to retrieve OCR results.".to_string(),
        ))
    }
}
