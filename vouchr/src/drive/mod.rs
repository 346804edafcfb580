mod client;

use async_trait::async_trait;

use crate::error::Result;

pub use client::DriveClient;

pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// A file accepted by the cloud store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub id: String,
    pub web_view_link: Option<String>,
}

impl UploadedFile {
    /// Public link recorded with the voucher: the view link without its
    /// `/view?usp=drivesdk` tail.
    pub fn share_link(&self) -> String {
        match &self.web_view_link {
            Some(link) => link.replace("/view?usp=drivesdk", ""),
            None => format!("https://drive.google.com/file/d/{}", self.id),
        }
    }
}

/// Remote file storage used by the upload pipeline. Every call carries the
/// caller's bearer token so a refreshed token takes effect on the next attempt.
#[async_trait]
pub trait CloudStore: Send + Sync {
    /// Id of the folder called `name`, created when absent.
    async fn ensure_folder(&self, access_token: &str, name: &str) -> Result<String>;

    async fn upload_file(
        &self,
        access_token: &str,
        folder_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
        mime_type: &str,
    ) -> Result<UploadedFile>;

    /// Grant "anyone with the link" read access.
    async fn make_public(&self, access_token: &str, file_id: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_link_strips_view_suffix() {
        let file = UploadedFile {
            id: "1AbC".to_string(),
            web_view_link: Some(
                "https://drive.google.com/file/d/1AbC/view?usp=drivesdk".to_string(),
            ),
        };
        assert_eq!(file.share_link(), "https://drive.google.com/file/d/1AbC");
    }

    #[test]
    fn test_share_link_without_view_link() {
        let file = UploadedFile {
            id: "1AbC".to_string(),
            web_view_link: None,
        };
        assert_eq!(file.share_link(), "https://drive.google.com/file/d/1AbC");
    }
}
