//! Box folder client

use crate::error::SourceError;
use async_trait::async_trait;
use invox_domain::traits::{DocumentRef, DocumentSource};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Default Box API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.box.com/2.0";

/// Box folder client holding a pre-issued access token.
///
/// Token acquisition (developer token, CCG, ...) happens out-of-band; this
/// client only consumes the result.
pub struct BoxSource {
    client: reqwest::Client,
    endpoint: String,
    token: String,
    folder_id: String,
}

#[derive(Deserialize)]
struct FolderItems {
    entries: Vec<FolderEntry>,
}

#[derive(Deserialize)]
struct FolderEntry {
    id: String,
    name: String,
    #[serde(rename = "type")]
    kind: String,
}

impl BoxSource {
    /// Create a client for one folder.
    pub fn new(token: impl Into<String>, folder_id: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token: token.into(),
            folder_id: folder_id.into(),
        }
    }

    /// Override the API endpoint (useful for tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Download every listed document into `dir`, skipping files whose
    /// target path already exists. Returns the number downloaded.
    pub async fn sync_to(&self, dir: &Path) -> Result<usize, SourceError> {
        let documents = self.list().await?;
        info!(
            "Found {} invoices in Box folder {}.",
            documents.len(),
            self.folder_id
        );

        tokio::fs::create_dir_all(dir).await?;

        let mut downloaded = 0;
        for document in &documents {
            let local_path = dir.join(&document.name);
            if local_path.exists() {
                info!("{} already exists in the local folder.", document.name);
                continue;
            }
            info!("Downloading {}...", document.name);
            let bytes = self.fetch(&document.id).await?;
            tokio::fs::write(&local_path, bytes).await?;
            downloaded += 1;
        }
        Ok(downloaded)
    }
}

#[async_trait]
impl DocumentSource for BoxSource {
    type Error = SourceError;

    async fn list(&self) -> Result<Vec<DocumentRef>, Self::Error> {
        let url = format!("{}/folders/{}/items", self.endpoint, self.folder_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| SourceError::Communication(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SourceError::Communication(format!(
                "HTTP {} listing folder {}",
                response.status(),
                self.folder_id
            )));
        }

        let items: FolderItems = response
            .json()
            .await
            .map_err(|e| SourceError::InvalidResponse(e.to_string()))?;

        Ok(items
            .entries
            .into_iter()
            .filter(|entry| entry.kind == "file")
            .map(|entry| DocumentRef {
                id: entry.id,
                name: entry.name,
            })
            .collect())
    }

    async fn fetch(&self, id: &str) -> Result<Vec<u8>, Self::Error> {
        let url = format!("{}/files/{}/content", self.endpoint, id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| SourceError::Communication(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SourceError::Communication(format!(
                "HTTP {} fetching file {}",
                response.status(),
                id
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SourceError::Communication(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_items_parsing() {
        let items: FolderItems = serde_json::from_str(
            r#"{"entries": [
                {"id": "101", "name": "invoice-a.pdf", "type": "file"},
                {"id": "102", "name": "archive", "type": "folder"}
            ]}"#,
        )
        .unwrap();

        let files: Vec<&FolderEntry> =
            items.entries.iter().filter(|e| e.kind == "file").collect();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].id, "101");
        assert_eq!(files[0].name, "invoice-a.pdf");
    }

    #[tokio::test]
    async fn test_list_against_unreachable_endpoint() {
        let source = BoxSource::new("token", "folder").with_endpoint("http://127.0.0.1:1");
        let result = source.list().await;
        assert!(matches!(result, Err(SourceError::Communication(_))));
    }
}
