//! Download of the source workbook.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::{IngestError, Result};

/// HTTP request timeout. The workbook is tens of megabytes.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Outcome of a successful download.
#[derive(Debug, Clone)]
pub struct FetchedWorkbook {
    pub path: PathBuf,
    pub bytes: u64,
    pub sha256: String,
}

/// Fetches `url` with a single GET and stores the body at `destination`.
///
/// No retry: a failed fetch aborts the run and the caller decides whether
/// to invoke the pipeline again.
pub fn fetch_workbook(url: &str, destination: &Path) -> Result<FetchedWorkbook> {
    let client = Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| IngestError::Fetch {
            url: url.to_string(),
            message: e.to_string(),
        })?;

    debug!(url, "fetching workbook");
    let response = client
        .get(url)
        .header(USER_AGENT, format!("contracts/{}", env!("CARGO_PKG_VERSION")))
        .send()
        .map_err(|e| IngestError::Fetch {
            url: url.to_string(),
            message: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(IngestError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.bytes().map_err(|e| IngestError::Fetch {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    store_workbook(&body, destination)
}

/// Writes downloaded bytes to disk and records their digest.
pub fn store_workbook(body: &[u8], destination: &Path) -> Result<FetchedWorkbook> {
    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| IngestError::DirectoryCreate {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(destination, body).map_err(|e| IngestError::write(destination, e))?;

    let fetched = FetchedWorkbook {
        path: destination.to_path_buf(),
        bytes: body.len() as u64,
        sha256: sha256_hex(body),
    };
    info!(
        path = %fetched.path.display(),
        bytes = fetched.bytes,
        sha256 = %fetched.sha256,
        "workbook stored"
    );
    Ok(fetched)
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn digest_of_empty_input() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn stores_body_and_reports_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw").join("contracts.xlsx");
        let fetched = store_workbook(b"abc", &path).unwrap();
        assert_eq!(fetched.bytes, 3);
        assert_eq!(std::fs::read(&path).unwrap(), b"abc");
        assert_eq!(
            fetched.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn successful_fetch_stores_the_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/contracts.xlsx");
            then.status(200).body("abc");
        });
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw").join("contracts.xlsx");

        let fetched = fetch_workbook(&server.url("/contracts.xlsx"), &path).unwrap();
        assert_eq!(fetched.bytes, 3);
        assert_eq!(fetched.sha256, sha256_hex(b"abc"));
        assert_eq!(std::fs::read(&path).unwrap(), b"abc");
    }

    #[test]
    fn non_success_status_writes_nothing() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/contracts.xlsx");
            then.status(404);
        });
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contracts.xlsx");

        let err = fetch_workbook(&server.url("/contracts.xlsx"), &path).unwrap_err();
        assert!(matches!(err, IngestError::HttpStatus { status: 404, .. }), "{err}");
        assert!(!path.exists());
    }

    #[test]
    fn unreachable_server_is_a_fetch_error() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contracts.xlsx");

        let url = format!("http://127.0.0.1:{port}/contracts.xlsx");
        let err = fetch_workbook(&url, &path).unwrap_err();
        assert!(matches!(err, IngestError::Fetch { .. }), "{err}");
        assert!(!path.exists());
    }
}
