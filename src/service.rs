//! Sync service client.
//!
//! This module provides:
//!
//! - `ServiceEndpoint`: the service's address and port, fixed at startup
//! - `ServiceClient`: HTTP client wrapper for listing, downloading and
//!   uploading savegames
//! - `RemoteSavegame`: a deserialized savegame descriptor
//!
//! The endpoint is built once from an ordered candidate address list; the
//! first entry wins and an absent or empty list is a fatal configuration
//! error. Every request carries the protocol version as a query parameter.

use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;

use crate::savegame;

/// Protocol version sent to the service with every request
pub const PROTO_VERSION: &str = "1";

/// User agent for service requests
const USER_AGENT: &str = concat!("sasync/", env!("CARGO_PKG_VERSION"));

/// Request header carrying the SHA-256 of an uploaded payload
pub const CHECKSUM_HEADER: &str = "x-savegame-sha256";

/// Errors from endpoint construction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EndpointError {
    #[error("No service address provided")]
    NoAddress,
}

/// Address and port of the sync service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    address: String,
    port: u16,
}

impl ServiceEndpoint {
    /// Pick the first address from an ordered candidate list.
    pub fn from_candidates(addresses: &[String], port: u16) -> Result<Self, EndpointError> {
        let address = addresses.first().ok_or(EndpointError::NoAddress)?;
        Ok(Self {
            address: address.clone(),
            port,
        })
    }
}

impl std::fmt::Display for ServiceEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

/// A savegame descriptor reported by the service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSavegame {
    pub name: String,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

/// Errors that can occur talking to the service
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Service returned {0}")]
    Status(reqwest::StatusCode),

    #[error("Not a recognized savegame name: {0}")]
    UnrecognizedName(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP client for one service endpoint
#[derive(Clone)]
pub struct ServiceClient {
    client: reqwest::Client,
    endpoint: ServiceEndpoint,
}

impl ServiceClient {
    /// Create a client bound to `endpoint`
    pub fn new(endpoint: ServiceEndpoint) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self { client, endpoint })
    }

    /// The endpoint this client talks to
    pub fn endpoint(&self) -> &ServiceEndpoint {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}/{}", self.endpoint, path)
    }

    /// Fetch the service's savegame list
    pub async fn list_savegames(&self) -> Result<Vec<RemoteSavegame>, ServiceError> {
        let start = std::time::Instant::now();

        let response = self
            .client
            .get(self.url("savegames"))
            .query(&[("proto", PROTO_VERSION)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::Status(response.status()));
        }

        let saves: Vec<RemoteSavegame> = response.json().await?;
        tracing::info!(
            "Fetched {} remote savegames in {:.1}s",
            saves.len(),
            start.elapsed().as_secs_f32()
        );

        Ok(saves)
    }

    /// Download a savegame into `dest_dir`.
    ///
    /// Streams to a `.part` temporary file, then renames on success.
    pub async fn download(&self, name: &str, dest_dir: &Path) -> Result<PathBuf, ServiceError> {
        if !savegame::is_recognized(name) {
            return Err(ServiceError::UnrecognizedName(name.to_string()));
        }

        let response = self
            .client
            .get(self.url(&format!("savegames/{name}")))
            .query(&[("proto", PROTO_VERSION)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::Status(response.status()));
        }

        tokio::fs::create_dir_all(dest_dir).await?;
        let dest_path = dest_dir.join(name);
        let temp_path = dest_dir.join(format!("{name}.part"));
        let mut file = tokio::fs::File::create(&temp_path).await?;

        // Stream the response body to disk
        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;
        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;
        }

        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&temp_path, &dest_path).await?;

        tracing::info!(
            "Downloaded {} ({} bytes) to {}",
            name,
            downloaded,
            dest_path.display()
        );

        Ok(dest_path)
    }

    /// Upload a local savegame to the service.
    ///
    /// The payload's SHA-256 travels in a request header so the service can
    /// verify the transfer. Returns the digest.
    pub async fn upload(&self, path: &Path) -> Result<String, ServiceError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !savegame::is_recognized(&name) {
            return Err(ServiceError::UnrecognizedName(name));
        }

        let bytes = tokio::fs::read(path).await?;
        let digest = format!("{:x}", Sha256::digest(&bytes));

        let response = self
            .client
            .put(self.url(&format!("savegames/{name}")))
            .query(&[("proto", PROTO_VERSION)])
            .header(CHECKSUM_HEADER, &digest)
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::Status(response.status()));
        }

        tracing::info!("Uploaded {} ({})", name, digest);
        Ok(digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addresses(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_endpoint_uses_first_candidate() {
        let endpoint =
            ServiceEndpoint::from_candidates(&addresses(&["10.0.0.5", "10.0.0.9"]), 8080).unwrap();
        assert_eq!(endpoint.to_string(), "10.0.0.5:8080");
    }

    #[test]
    fn test_endpoint_rejects_empty_candidate_list() {
        let result = ServiceEndpoint::from_candidates(&[], 8080);
        assert_eq!(result.unwrap_err(), EndpointError::NoAddress);
    }

    #[test]
    fn test_endpoint_formats_default_port() {
        let endpoint = ServiceEndpoint::from_candidates(&addresses(&["example.org"]), 0).unwrap();
        assert_eq!(endpoint.to_string(), "example.org:0");
    }

    #[test]
    fn test_client_url_building() {
        let endpoint =
            ServiceEndpoint::from_candidates(&addresses(&["192.168.1.20"]), 7070).unwrap();
        let client = ServiceClient::new(endpoint).unwrap();
        assert_eq!(
            client.url("savegames"),
            "http://192.168.1.20:7070/savegames"
        );
        assert_eq!(
            client.url("savegames/GTASAsf1.b"),
            "http://192.168.1.20:7070/savegames/GTASAsf1.b"
        );
    }

    #[test]
    fn test_remote_savegame_from_json() {
        let json = r#"[
            {"name": "GTASAsf1.b", "size": 202752, "modified": "2024-03-01T18:22:40Z"},
            {"name": "GTASAsf2.b", "size": 198400, "modified": null}
        ]"#;

        let saves: Vec<RemoteSavegame> = serde_json::from_str(json).unwrap();
        assert_eq!(saves.len(), 2);
        assert_eq!(saves[0].name, "GTASAsf1.b");
        assert_eq!(saves[0].size, 202752);
        assert!(saves[0].modified.is_some());
        assert!(saves[1].modified.is_none());
    }

    #[tokio::test]
    async fn test_upload_rejects_unrecognized_name() {
        let endpoint = ServiceEndpoint::from_candidates(&addresses(&["localhost"]), 9000).unwrap();
        let client = ServiceClient::new(endpoint).unwrap();

        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.txt");
        std::fs::write(&path, b"not a save").unwrap();

        let result = client.upload(&path).await;
        assert!(matches!(result, Err(ServiceError::UnrecognizedName(_))));
    }

    #[tokio::test]
    async fn test_download_rejects_unrecognized_name() {
        let endpoint = ServiceEndpoint::from_candidates(&addresses(&["localhost"]), 9000).unwrap();
        let client = ServiceClient::new(endpoint).unwrap();

        let temp_dir = tempfile::TempDir::new().unwrap();
        let result = client.download("GTASAsf10.b", temp_dir.path()).await;
        assert!(matches!(result, Err(ServiceError::UnrecognizedName(_))));
    }
}
