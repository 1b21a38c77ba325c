//! Which secret keys identify which credential provider.

use serde::Serializer;

use super::{
    config::CredentialConfig,
    gcs::GCS_CREDENTIAL_FILE_NAME,
    hdfs::{HdfsRole, HDFS_CONFIG_VOLUME_NAME, HDFS_TOKEN_VOLUME_NAME},
    s3::{AWS_ACCESS_KEY_ID_NAME, AWS_SECRET_ACCESS_KEY_NAME},
};
use crate::prelude::*;

/// A credential provider that a secret can belong to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Provider {
    /// AWS S3 or a compatible store.
    S3,
    /// Google Cloud Storage.
    Gcs,
    /// One of the two HDFS secrets.
    Hdfs(HdfsRole),
}

impl Provider {
    /// All providers, in the order we check for them. The first match wins.
    pub const PRIORITY: [Provider; 4] = [
        Provider::S3,
        Provider::Gcs,
        Provider::Hdfs(HdfsRole::Token),
        Provider::Hdfs(HdfsRole::Config),
    ];

    /// The secret key which identifies this provider if nobody overrides it.
    pub fn default_signature_key(self) -> &'static str {
        match self {
            Provider::S3 => AWS_SECRET_ACCESS_KEY_NAME,
            Provider::Gcs => GCS_CREDENTIAL_FILE_NAME,
            Provider::Hdfs(HdfsRole::Token) => HDFS_TOKEN_VOLUME_NAME,
            Provider::Hdfs(HdfsRole::Config) => HDFS_CONFIG_VOLUME_NAME,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::S3 => write!(f, "s3"),
            Provider::Gcs => write!(f, "gcs"),
            Provider::Hdfs(role) => write!(f, "hdfs {}", role),
        }
    }
}

impl Serialize for Provider {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The secret key names in effect for a single injection.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SignatureKeys {
    /// The S3 key holding the access key ID. This isn't part of the S3
    /// signature, but it travels with it.
    pub s3_access_key_id: String,
    /// The S3 key holding the secret access key.
    pub s3_secret_access_key: String,
    /// The GCS key holding the credential file.
    pub gcs_credential_file: String,
    /// The HDFS key marking a token secret.
    pub hdfs_token: String,
    /// The HDFS key marking a configuration secret.
    pub hdfs_config: String,
}

impl Default for SignatureKeys {
    fn default() -> Self {
        SignatureKeys::from_config(&CredentialConfig::default())
    }
}

impl SignatureKeys {
    /// Resolve the key names to use, given our configuration.
    pub fn from_config(config: &CredentialConfig) -> SignatureKeys {
        SignatureKeys {
            s3_access_key_id: effective_name(
                &config.s3.access_key_id_name,
                AWS_ACCESS_KEY_ID_NAME,
            ),
            s3_secret_access_key: effective_name(
                &config.s3.secret_access_key_name,
                AWS_SECRET_ACCESS_KEY_NAME,
            ),
            gcs_credential_file: effective_name(
                &config.gcs.credential_file_name,
                GCS_CREDENTIAL_FILE_NAME,
            ),
            hdfs_token: effective_name(
                &config.hdfs.token_secret_key_name,
                HDFS_TOKEN_VOLUME_NAME,
            ),
            hdfs_config: effective_name(
                &config.hdfs.config_secret_key_name,
                HDFS_CONFIG_VOLUME_NAME,
            ),
        }
    }

    /// The key whose presence identifies `provider`.
    pub fn signature_key(&self, provider: Provider) -> &str {
        match provider {
            Provider::S3 => &self.s3_secret_access_key,
            Provider::Gcs => &self.gcs_credential_file,
            Provider::Hdfs(HdfsRole::Token) => &self.hdfs_token,
            Provider::Hdfs(HdfsRole::Config) => &self.hdfs_config,
        }
    }
}

/// Use `configured` unless it's missing or empty.
fn effective_name(configured: &Option<String>, default: &str) -> String {
    match configured {
        Some(name) if !name.is_empty() => name.clone(),
        _ => default.to_owned(),
    }
}
