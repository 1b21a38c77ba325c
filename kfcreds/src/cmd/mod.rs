//! Subcommands, and the options they share.

use kfcreds_common::{
    credentials::{CredentialBuilder, CredentialConfig, KubectlStore, MemoryStore, SecretStore},
    k8s::ConfigMap,
    prelude::*,
};
use std::path::PathBuf;
use structopt::StructOpt;

use crate::inputs::read_yaml_or_json;

pub mod classify;
pub mod inject;

/// Where to find the service account, its secrets, and our configuration.
#[derive(Debug, StructOpt)]
pub struct SourceOpt {
    /// The namespace containing the service account.
    #[structopt(long = "namespace", short = "n")]
    pub namespace: String,

    /// The service account to use (defaults to the pod's service account, or
    /// "default").
    #[structopt(long = "service-account")]
    pub service_account: Option<String>,

    /// A config map whose "credentials" key overrides the secret key names we
    /// look for.
    #[structopt(long = "config", parse(from_os_str))]
    pub config: Option<PathBuf>,

    /// Read service accounts and secrets from this `kubectl get -o json` style
    /// list, instead of from the cluster.
    #[structopt(long = "objects", parse(from_os_str))]
    pub objects: Option<PathBuf>,
}

impl SourceOpt {
    /// Load our credential configuration.
    pub fn credential_config(&self) -> Result<CredentialConfig> {
        match &self.config {
            Some(path) => {
                let config_map: ConfigMap = read_yaml_or_json(path)?;
                CredentialConfig::from_config_map(&config_map)
            }
            None => Ok(CredentialConfig::default()),
        }
    }

    /// Create a credential builder using the requested store.
    pub fn credential_builder(&self) -> Result<CredentialBuilder<Box<dyn SecretStore>>> {
        let config = self.credential_config()?;
        let store: Box<dyn SecretStore> = match &self.objects {
            Some(path) => {
                let list: serde_json::Value = read_yaml_or_json(path)?;
                Box::new(MemoryStore::from_list_value(list, &self.namespace)?)
            }
            None => Box::new(KubectlStore),
        };
        let span = tracing::info_span!("credentials", namespace = %self.namespace);
        Ok(CredentialBuilder::new(&config, store, span))
    }
}
