//! [`BlobServiceApi`] implementation on top of the Azure SDK.

use crate::azure::{AzureBlobStore, BlobServiceApi};
use crate::error::{StorageError, StorageResult};
use crate::params::ConnectionParams;
use crate::runtime::blocking_runtime;
use azure_core::StatusCode;
use azure_storage::{CloudLocation, ConnectionString};
use azure_storage_blobs::prelude::{BlobServiceClient, ClientBuilder};
use futures::StreamExt;
use tokio::runtime::Runtime;
use tracing::debug;

/// Blocking Blob service client backed by the Azure SDK.
///
/// Like [`crate::SdkS3Client`], it owns a small tokio runtime and blocks on
/// it for every request. It must not be used from inside another tokio
/// runtime.
pub struct SdkBlobClient {
    service: BlobServiceClient,
    runtime: Runtime,
}

impl SdkBlobClient {
    /// Builds a client from the `conn_str` connection parameter.
    ///
    /// The connection string must name the account and carry credentials
    /// (an account key or a SAS token). A `BlobEndpoint` entry, as used by
    /// the Azurite emulator, replaces the public endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::MissingParameter`] without `conn_str`,
    /// [`StorageError::InvalidParameter`] if it cannot be used, or an error
    /// if the runtime cannot be started.
    pub fn connect(params: &ConnectionParams) -> StorageResult<Self> {
        let conn_str = params.require(AzureBlobStore::CONNECTION_STRING_PARAM)?;
        let service = service_client(conn_str)?;
        Ok(Self {
            service,
            runtime: blocking_runtime("largemsg-abs")?,
        })
    }

    /// Wraps an already configured SDK client.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime cannot be started.
    pub fn from_client(service: BlobServiceClient) -> StorageResult<Self> {
        Ok(Self {
            service,
            runtime: blocking_runtime("largemsg-abs")?,
        })
    }
}

fn service_client(conn_str: &str) -> StorageResult<BlobServiceClient> {
    let invalid = |reason: String| {
        StorageError::invalid_parameter(AzureBlobStore::CONNECTION_STRING_PARAM, reason)
    };

    let parsed = ConnectionString::new(conn_str).map_err(|e| invalid(e.to_string()))?;
    let account = parsed
        .account_name
        .ok_or_else(|| invalid("no AccountName entry".to_string()))?;
    let credentials = parsed
        .storage_credentials()
        .map_err(|e| invalid(e.to_string()))?;

    let builder = match parsed.blob_endpoint {
        Some(uri) => {
            debug!(account, endpoint = uri, "created Azure blob client");
            ClientBuilder::with_location(
                CloudLocation::Custom {
                    account: account.to_string(),
                    uri: uri.to_string(),
                },
                credentials,
            )
        }
        None => {
            debug!(account, "created Azure blob client");
            ClientBuilder::new(account, credentials)
        }
    };
    Ok(builder.blob_service_client())
}

fn is_not_found(err: &azure_core::Error) -> bool {
    err.as_http_error()
        .is_some_and(|http| http.status() == StatusCode::NotFound)
}

fn blob_error(err: azure_core::Error, container: &str, name: &str) -> StorageError {
    if is_not_found(&err) {
        StorageError::not_found(container, name)
    } else {
        StorageError::unavailable(format!("{container}/{name}: {err}"))
    }
}

impl BlobServiceApi for SdkBlobClient {
    fn upload_blob(&self, container: &str, name: &str, data: &[u8]) -> StorageResult<()> {
        let blob = self.service.container_client(container).blob_client(name);
        let body = data.to_vec();
        self.runtime
            .block_on(async { blob.put_block_blob(body).await })
            .map(|_| ())
            .map_err(|e| StorageError::unavailable(format!("{container}/{name}: {e}")))
    }

    fn download_blob(&self, container: &str, name: &str) -> StorageResult<Vec<u8>> {
        let blob = self.service.container_client(container).blob_client(name);
        self.runtime
            .block_on(async { blob.get_content().await })
            .map_err(|e| blob_error(e, container, name))
    }

    fn list_blobs(&self, container: &str, prefix: &str) -> StorageResult<Vec<String>> {
        let client = self.service.container_client(container);
        self.runtime.block_on(async {
            let mut pages = client.list_blobs().prefix(prefix.to_string()).into_stream();
            let mut names = Vec::new();
            while let Some(page) = pages.next().await {
                let page = page.map_err(|e| {
                    StorageError::unavailable(format!("listing {container}/{prefix}: {e}"))
                })?;
                names.extend(page.blobs.blobs().map(|blob| blob.name.clone()));
            }
            Ok(names)
        })
    }

    fn delete_blob(&self, container: &str, name: &str) -> StorageResult<()> {
        let blob = self.service.container_client(container).blob_client(name);
        self.runtime
            .block_on(async { blob.delete().await })
            .map(|_| ())
            .map_err(|e| blob_error(e, container, name))
    }
}

impl std::fmt::Debug for SdkBlobClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SdkBlobClient").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known Azurite development account.
    const AZURITE: &str = "DefaultEndpointsProtocol=http;AccountName=devstoreaccount1;\
        AccountKey=Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==;\
        BlobEndpoint=http://127.0.0.1:10000/devstoreaccount1;";

    fn params_with(conn_str: &str) -> ConnectionParams {
        let mut params = ConnectionParams::new();
        params.set(AzureBlobStore::CONNECTION_STRING_PARAM, conn_str);
        params
    }

    #[test]
    fn connect_requires_connection_string() {
        let err = SdkBlobClient::connect(&ConnectionParams::new()).unwrap_err();
        assert!(matches!(err, StorageError::MissingParameter { ref name } if name == "conn_str"));
    }

    #[test]
    fn connect_requires_account_name() {
        let err = SdkBlobClient::connect(&params_with("DefaultEndpointsProtocol=https")).unwrap_err();
        assert!(matches!(err, StorageError::InvalidParameter { ref name, .. } if name == "conn_str"));
    }

    #[test]
    fn connect_accepts_emulator_connection_string() {
        let client = SdkBlobClient::connect(&params_with(AZURITE)).unwrap();
        assert!(format!("{client:?}").starts_with("SdkBlobClient"));
    }

    #[test]
    fn store_over_sdk_client_uses_abs_scheme() {
        let client = SdkBlobClient::connect(&params_with(AZURITE)).unwrap();
        let store = AzureBlobStore::new(std::sync::Arc::new(client));
        assert_eq!(crate::BackingStore::scheme(&store), "abs");
    }
}
