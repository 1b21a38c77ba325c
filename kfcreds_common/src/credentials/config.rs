//! Loading our configuration from a Kubernetes config map.

use super::{gcs::GcsConfig, hdfs::HdfsConfig, s3::S3Config};
use crate::k8s::ConfigMap;
use crate::prelude::*;

/// The config map key holding our JSON configuration.
pub const CREDENTIAL_CONFIG_KEY_NAME: &str = "credentials";

/// Per-provider overrides for the secret keys we look for. Any field which is
/// missing or empty falls back to its default.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct CredentialConfig {
    /// S3 settings.
    #[serde(default)]
    pub s3: S3Config,
    /// Google Cloud Storage settings.
    #[serde(default)]
    pub gcs: GcsConfig,
    /// HDFS settings.
    #[serde(default)]
    pub hdfs: HdfsConfig,
}

impl CredentialConfig {
    /// Parse our configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<CredentialConfig> {
        serde_json::from_str(json).context("could not parse credential configuration")
    }

    /// Load our configuration from the `credentials` key of `config_map`. If
    /// the key is missing, we use the defaults for everything.
    pub fn from_config_map(config_map: &ConfigMap) -> Result<CredentialConfig> {
        match config_map.data.get(CREDENTIAL_CONFIG_KEY_NAME) {
            Some(json) => CredentialConfig::from_json(json).with_context(|| {
                format!(
                    "invalid {:?} key in config map {}",
                    CREDENTIAL_CONFIG_KEY_NAME, config_map.metadata.name,
                )
            }),
            None => Ok(CredentialConfig::default()),
        }
    }
}
