//! [`S3Api`] implementation on top of `aws-sdk-s3`.

use crate::error::{StorageError, StorageResult};
use crate::params::ConnectionParams;
use crate::runtime::blocking_runtime;
use crate::s3::{DeleteObjectsResponse, ObjectVersion, PutObjectResponse, S3Api};
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use aws_sdk_s3::Client;
use tokio::runtime::Runtime;
use tracing::debug;

/// Blocking S3 client backed by the AWS SDK.
///
/// The SDK is asynchronous; this client owns a small tokio runtime and
/// blocks on it for every request, which lets it be called from any number
/// of plain threads at once. It must not be used from inside another tokio
/// runtime.
pub struct SdkS3Client {
    client: Client,
    runtime: Runtime,
}

impl SdkS3Client {
    /// Access key id parameter.
    pub const ACCESS_KEY_PARAM: &'static str = "aws_access_key_id";
    /// Secret access key parameter.
    pub const SECRET_KEY_PARAM: &'static str = "aws_secret_access_key";
    /// Session token parameter.
    pub const SESSION_TOKEN_PARAM: &'static str = "aws_session_token";
    /// Region parameter.
    pub const REGION_PARAM: &'static str = "region_name";
    /// Endpoint override parameter.
    pub const ENDPOINT_PARAM: &'static str = "endpoint_url";
    /// Path-style addressing parameter (`true`/`false`). Defaults to `true`
    /// when an endpoint override is set.
    pub const PATH_STYLE_PARAM: &'static str = "force_path_style";

    /// Builds a client from connection parameters.
    ///
    /// Settings that are not supplied fall back to the SDK's default
    /// provider chain (environment, profile, instance metadata).
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime cannot be started.
    pub fn connect(params: &ConnectionParams) -> StorageResult<Self> {
        let runtime = blocking_runtime("largemsg-s3")?;
        let settings = S3Settings::from_params(params);
        let config = settings.sdk_config(&runtime);

        debug!(
            endpoint = settings.endpoint.as_deref().unwrap_or("default"),
            "created S3 client"
        );
        Ok(Self {
            client: Client::from_conf(config),
            runtime,
        })
    }

    /// Wraps an already configured SDK client.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime cannot be started.
    pub fn from_client(client: Client) -> StorageResult<Self> {
        Ok(Self {
            client,
            runtime: blocking_runtime("largemsg-s3")?,
        })
    }
}

/// S3 client settings read from connection parameters.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct S3Settings {
    /// Region, if set.
    pub region: Option<String>,
    /// Endpoint override, if set.
    pub endpoint: Option<String>,
    /// Whether buckets are addressed by path instead of virtual host.
    pub force_path_style: bool,
    access_key: Option<String>,
    secret_key: Option<String>,
    session_token: Option<String>,
}

impl S3Settings {
    /// Reads the settings from connection parameters.
    ///
    /// Static credentials apply only when both the access key id and the
    /// secret key are present.
    #[must_use]
    pub fn from_params(params: &ConnectionParams) -> Self {
        let owned = |name: &str| params.get(name).map(str::to_string);
        let endpoint = owned(SdkS3Client::ENDPOINT_PARAM);
        let force_path_style = match params.get(SdkS3Client::PATH_STYLE_PARAM) {
            Some(value) => value.eq_ignore_ascii_case("true"),
            None => endpoint.is_some(),
        };
        Self {
            region: owned(SdkS3Client::REGION_PARAM),
            endpoint,
            force_path_style,
            access_key: owned(SdkS3Client::ACCESS_KEY_PARAM),
            secret_key: owned(SdkS3Client::SECRET_KEY_PARAM),
            session_token: owned(SdkS3Client::SESSION_TOKEN_PARAM),
        }
    }

    /// Returns `true` if static credentials replace the default chain.
    #[must_use]
    pub fn has_static_credentials(&self) -> bool {
        self.access_key.is_some() && self.secret_key.is_some()
    }

    fn sdk_config(&self, runtime: &Runtime) -> aws_sdk_s3::Config {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &self.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let (Some(access_key), Some(secret_key)) = (&self.access_key, &self.secret_key) {
            loader = loader.credentials_provider(Credentials::new(
                access_key,
                secret_key,
                self.session_token.clone(),
                None,
                "largemsg",
            ));
        }
        if let Some(endpoint) = &self.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let shared = runtime.block_on(loader.load());

        aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(self.force_path_style)
            .build()
    }
}

impl std::fmt::Debug for S3Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Settings")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("force_path_style", &self.force_path_style)
            .field("access_key", &self.access_key)
            .field("static_credentials", &self.has_static_credentials())
            .finish()
    }
}

fn sdk_error<E: std::error::Error>(err: E) -> StorageError {
    StorageError::unavailable(DisplayErrorContext(err).to_string())
}

impl S3Api for SdkS3Client {
    fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> StorageResult<PutObjectResponse> {
        let request = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body.to_vec()))
            .send();

        match self.runtime.block_on(request) {
            Ok(_) => Ok(PutObjectResponse::ok()),
            Err(SdkError::ServiceError(err)) => Ok(PutObjectResponse {
                status: err.raw().status().as_u16(),
                raw: format!("{:?}", err.err()),
            }),
            Err(err) => Err(sdk_error(err)),
        }
    }

    fn get_object(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>> {
        self.runtime.block_on(async {
            let output = self
                .client
                .get_object()
                .bucket(bucket)
                .key(key)
                .send()
                .await
                .map_err(|err| {
                    if err.as_service_error().is_some_and(|e| e.is_no_such_key()) {
                        StorageError::not_found(bucket, key)
                    } else {
                        sdk_error(err)
                    }
                })?;
            let body = output.body.collect().await.map_err(sdk_error)?;
            Ok(body.into_bytes().to_vec())
        })
    }

    fn list_object_versions(&self, bucket: &str, prefix: &str) -> StorageResult<Vec<ObjectVersion>> {
        self.runtime.block_on(async {
            let mut versions = Vec::new();
            let mut key_marker: Option<String> = None;
            let mut version_marker: Option<String> = None;

            loop {
                let page = self
                    .client
                    .list_object_versions()
                    .bucket(bucket)
                    .prefix(prefix)
                    .set_key_marker(key_marker.take())
                    .set_version_id_marker(version_marker.take())
                    .send()
                    .await
                    .map_err(sdk_error)?;

                for version in page.versions() {
                    if let Some(key) = version.key() {
                        versions.push(ObjectVersion {
                            key: key.to_string(),
                            version_id: version.version_id().map(str::to_string),
                        });
                    }
                }
                for marker in page.delete_markers() {
                    if let Some(key) = marker.key() {
                        versions.push(ObjectVersion {
                            key: key.to_string(),
                            version_id: marker.version_id().map(str::to_string),
                        });
                    }
                }

                if !page.is_truncated().unwrap_or(false) {
                    break;
                }
                key_marker = page.next_key_marker().map(str::to_string);
                version_marker = page.next_version_id_marker().map(str::to_string);
                if key_marker.is_none() {
                    break;
                }
            }
            Ok(versions)
        })
    }

    fn delete_objects(
        &self,
        bucket: &str,
        objects: &[ObjectVersion],
    ) -> StorageResult<DeleteObjectsResponse> {
        let identifiers = objects
            .iter()
            .map(|obj| {
                ObjectIdentifier::builder()
                    .key(&obj.key)
                    .set_version_id(obj.version_id.clone())
                    .build()
                    .map_err(sdk_error)
            })
            .collect::<StorageResult<Vec<_>>>()?;
        let delete = Delete::builder()
            .set_objects(Some(identifiers))
            .quiet(true)
            .build()
            .map_err(sdk_error)?;

        let request = self
            .client
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send();
        let output = self.runtime.block_on(request).map_err(sdk_error)?;

        Ok(DeleteObjectsResponse {
            errors: output
                .errors()
                .iter()
                .map(|e| {
                    (
                        e.key().unwrap_or_default().to_string(),
                        e.message().unwrap_or_default().to_string(),
                    )
                })
                .collect(),
        })
    }
}

impl std::fmt::Debug for SdkS3Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SdkS3Client").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_credential_types::provider::ProvideCredentials;

    fn minio_params() -> ConnectionParams {
        let mut params = ConnectionParams::new();
        params.set(SdkS3Client::ACCESS_KEY_PARAM, "AKIDLARGEMSG");
        params.set(SdkS3Client::SECRET_KEY_PARAM, "secret");
        params.set(SdkS3Client::REGION_PARAM, "eu-west-1");
        params.set(SdkS3Client::ENDPOINT_PARAM, "http://127.0.0.1:9000");
        params
    }

    #[test]
    fn settings_read_every_parameter() {
        let settings = S3Settings::from_params(&minio_params());
        assert_eq!(settings.region.as_deref(), Some("eu-west-1"));
        assert_eq!(settings.endpoint.as_deref(), Some("http://127.0.0.1:9000"));
        assert!(settings.force_path_style);
        assert!(settings.has_static_credentials());
        assert!(!format!("{settings:?}").contains("secret"));
    }

    #[test]
    fn path_style_follows_endpoint_unless_set() {
        let settings = S3Settings::from_params(&ConnectionParams::new());
        assert!(!settings.force_path_style);
        assert!(!settings.has_static_credentials());

        let mut params = minio_params();
        params.set(SdkS3Client::PATH_STYLE_PARAM, "false");
        assert!(!S3Settings::from_params(&params).force_path_style);

        let mut params = ConnectionParams::new();
        params.set(SdkS3Client::PATH_STYLE_PARAM, "TRUE");
        assert!(S3Settings::from_params(&params).force_path_style);
    }

    #[test]
    fn secret_without_access_key_uses_default_chain() {
        let mut params = ConnectionParams::new();
        params.set(SdkS3Client::SECRET_KEY_PARAM, "secret");
        assert!(!S3Settings::from_params(&params).has_static_credentials());
    }

    #[test]
    fn connect_applies_region_and_static_credentials() {
        let client = SdkS3Client::connect(&minio_params()).unwrap();
        let config = client.client.config();

        assert_eq!(config.region(), Some(&Region::new("eu-west-1")));

        let provider = config
            .credentials_provider()
            .expect("static credentials should be configured");
        let credentials = client
            .runtime
            .block_on(provider.provide_credentials())
            .unwrap();
        assert_eq!(credentials.access_key_id(), "AKIDLARGEMSG");
        assert_eq!(credentials.secret_access_key(), "secret");
        assert!(credentials.session_token().is_none());
    }
}
