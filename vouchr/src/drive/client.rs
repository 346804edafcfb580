use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::GoogleConfig;
use crate::error::{Result, VouchrError};

use super::{CloudStore, UploadedFile, FOLDER_MIME_TYPE};

const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Google Drive v3 over plain REST.
#[derive(Clone, Debug)]
pub struct DriveClient {
    client: Client,
    api_url: String,
    upload_url: String,
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FileId>,
}

#[derive(Debug, Deserialize)]
struct FileId {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedFile {
    id: String,
    #[serde(default)]
    web_view_link: Option<String>,
}

impl DriveClient {
    pub fn new(config: &GoogleConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| VouchrError::Drive(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: config.drive_api_url.trim_end_matches('/').to_string(),
            upload_url: config.drive_upload_url.trim_end_matches('/').to_string(),
        })
    }

    async fn find_folder(&self, access_token: &str, name: &str) -> Result<Option<String>> {
        let query = format!(
            "name='{}' and mimeType='{FOLDER_MIME_TYPE}' and trashed=false",
            escape_query_value(name)
        );

        let response = self
            .client
            .get(format!("{}/files", self.api_url))
            .bearer_auth(access_token)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id)"),
                ("spaces", "drive"),
            ])
            .send()
            .await?;

        let list: FileList = check(response, "folder lookup").await?.json().await?;
        Ok(list.files.into_iter().next().map(|f| f.id))
    }

    async fn create_folder(&self, access_token: &str, name: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/files", self.api_url))
            .bearer_auth(access_token)
            .query(&[("fields", "id")])
            .json(&json!({ "name": name, "mimeType": FOLDER_MIME_TYPE }))
            .send()
            .await?;

        let created: FileId = check(response, "folder create").await?.json().await?;
        info!(folder = name, id = %created.id, "Created Drive folder");
        Ok(created.id)
    }
}

#[async_trait]
impl CloudStore for DriveClient {
    async fn ensure_folder(&self, access_token: &str, name: &str) -> Result<String> {
        if let Some(id) = self.find_folder(access_token, name).await? {
            debug!(folder = name, id = %id, "Drive folder found");
            return Ok(id);
        }
        self.create_folder(access_token, name).await
    }

    async fn upload_file(
        &self,
        access_token: &str,
        folder_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
        mime_type: &str,
    ) -> Result<UploadedFile> {
        let boundary = format!("vouchr-{}", Uuid::new_v4().simple());
        let metadata = json!({ "name": file_name, "parents": [folder_id] });
        let body = multipart_related(&boundary, &metadata, mime_type, &bytes)?;

        let response = self
            .client
            .post(format!("{}/files", self.upload_url))
            .bearer_auth(access_token)
            .query(&[("uploadType", "multipart"), ("fields", "id,webViewLink")])
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={boundary}"),
            )
            .body(body)
            .send()
            .await?;

        let created: CreatedFile = check(response, "upload").await?.json().await?;
        info!(file = file_name, id = %created.id, "Uploaded file to Drive");

        Ok(UploadedFile {
            id: created.id,
            web_view_link: created.web_view_link,
        })
    }

    async fn make_public(&self, access_token: &str, file_id: &str) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/files/{file_id}/permissions", self.api_url))
            .bearer_auth(access_token)
            .json(&json!({ "role": "reader", "type": "anyone" }))
            .send()
            .await?;

        check(response, "permission grant").await?;
        Ok(())
    }
}

/// Maps non-2xx answers onto the error taxonomy. A 401 means the token is
/// no good, anything else is treated as a passing Drive failure.
async fn check(response: Response, action: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(match status {
        StatusCode::UNAUTHORIZED => {
            VouchrError::Unauthenticated(format!("Drive rejected the access token: {body}"))
        }
        _ => VouchrError::Drive(format!("Drive {action} failed: {status} - {body}")),
    })
}

fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

fn multipart_related(
    boundary: &str,
    metadata: &serde_json::Value,
    mime_type: &str,
    bytes: &[u8],
) -> Result<Vec<u8>> {
    let mut body = Vec::with_capacity(bytes.len() + 512);
    body.extend_from_slice(
        format!("--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(&serde_json::to_vec(metadata)?);
    body.extend_from_slice(format!("\r\n--{boundary}\r\nContent-Type: {mime_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> DriveClient {
        DriveClient::new(&GoogleConfig {
            drive_api_url: format!("{}/drive/v3", server.uri()),
            drive_upload_url: format!("{}/upload/drive/v3", server.uri()),
            ..GoogleConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_query_value_escaping() {
        assert_eq!(escape_query_value("Bob's"), "Bob\\'s");
        assert_eq!(escape_query_value("plain"), "plain");
    }

    #[test]
    fn test_multipart_related_layout() {
        let body = multipart_related("b", &json!({"name": "x.jpg"}), "image/jpeg", b"JPG").unwrap();
        let text = String::from_utf8(body).unwrap();
        assert!(text.starts_with("--b\r\nContent-Type: application/json"));
        assert!(text.contains("{\"name\":\"x.jpg\"}"));
        assert!(text.contains("Content-Type: image/jpeg\r\n\r\nJPG\r\n--b--"));
    }

    #[tokio::test]
    async fn test_existing_folder_is_reused() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drive/v3/files"))
            .and(header("authorization", "Bearer ya29.t"))
            .and(query_param(
                "q",
                "name='hanzlenord' and mimeType='application/vnd.google-apps.folder' and trashed=false",
            ))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"files": [{"id": "folder-1"}]})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/drive/v3/files"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let id = client(&server)
            .ensure_folder("ya29.t", "hanzlenord")
            .await
            .unwrap();
        assert_eq!(id, "folder-1");
    }

    #[tokio::test]
    async fn test_missing_folder_is_created() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drive/v3/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"files": []})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/drive/v3/files"))
            .and(body_json(json!({
                "name": "hanzlenord",
                "mimeType": "application/vnd.google-apps.folder"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "folder-new"})))
            .expect(1)
            .mount(&server)
            .await;

        let id = client(&server)
            .ensure_folder("ya29.t", "hanzlenord")
            .await
            .unwrap();
        assert_eq!(id, "folder-new");
    }

    #[tokio::test]
    async fn test_upload_and_share() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload/drive/v3/files"))
            .and(query_param("uploadType", "multipart"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "file-9",
                "webViewLink": "https://drive.google.com/file/d/file-9/view?usp=drivesdk"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/drive/v3/files/file-9/permissions"))
            .and(body_json(json!({"role": "reader", "type": "anyone"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "anyoneWithLink"})))
            .expect(1)
            .mount(&server)
            .await;

        let drive = client(&server);
        let file = drive
            .upload_file("ya29.t", "folder-1", "a.jpg", vec![0xFF, 0xD8], "image/jpeg")
            .await
            .unwrap();
        drive.make_public("ya29.t", &file.id).await.unwrap();

        assert_eq!(file.share_link(), "https://drive.google.com/file/d/file-9");
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/drive/v3/files/gone/permissions"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/drive/v3/files/busy/permissions"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let drive = client(&server);
        assert!(matches!(
            drive.make_public("t", "gone").await,
            Err(VouchrError::Unauthenticated(_))
        ));
        let err = drive.make_public("t", "busy").await.unwrap_err();
        assert!(matches!(err, VouchrError::Drive(_)));
        assert!(err.is_retryable());
    }
}
