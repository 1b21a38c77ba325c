//! Injecting storage credentials into a container.
//!
//! We look at the secrets attached to a service account, decide which storage
//! provider each one is for (see [`classify`]), and add the volumes, mounts
//! and environment variables that provider needs. Secret payloads are never
//! read, only the names of their keys.
//!
//! HDFS is the odd one out: it needs both a token secret and a configuration
//! secret. Having exactly one of them is a fatal configuration error, and in
//! that case we leave the container alone.

use thiserror::Error;
use tracing::Span;

use crate::k8s::{Container, EnvVar, Secret, Volume, VolumeMount};
use crate::prelude::*;

pub mod classify;
pub mod config;
pub mod gcs;
pub mod hdfs;
pub mod s3;
pub mod signature;
pub mod store;

pub use self::classify::classify;
pub use self::config::{CredentialConfig, CREDENTIAL_CONFIG_KEY_NAME};
pub use self::hdfs::{HdfsCredentials, HdfsRole};
pub use self::signature::{Provider, SignatureKeys};
pub use self::store::{KubectlStore, MemoryStore, SecretStore};

/// The service account used when none is specified.
pub const DEFAULT_SERVICE_ACCOUNT_NAME: &str = "default";

/// A fatal credential misconfiguration. The caller should not deploy the
/// workload.
#[derive(Debug, Error)]
pub enum InjectionError {
    /// Only one of the two HDFS secrets is attached to the service account.
    #[error(
        "service account {namespace}/{service_account} has an HDFS {found} secret \
         but no HDFS {missing} secret; both must be defined"
    )]
    IncompleteHdfsCredentials {
        /// The namespace we were injecting into.
        namespace: String,
        /// The service account we looked at.
        service_account: String,
        /// The role we found.
        found: HdfsRole,
        /// The role we didn't find.
        missing: HdfsRole,
    },
}

/// What we decided about one secret attached to a service account.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct SecretClassification {
    /// The name of the secret.
    pub secret: String,
    /// The provider it belongs to, if any.
    pub provider: Option<Provider>,
}

/// What happened during an injection.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct InjectionReport {
    /// The namespace we looked in.
    pub namespace: String,
    /// The service account we actually looked up.
    pub service_account: String,
    /// True if the service account couldn't be fetched, in which case we did
    /// nothing.
    pub service_account_missing: bool,
    /// Every secret we managed to fetch, in service account order.
    pub secrets: Vec<SecretClassification>,
    /// Secrets which were attached but couldn't be fetched.
    pub unavailable_secrets: Vec<String>,
}

impl InjectionReport {
    /// The providers we found, in the order we found them.
    pub fn providers(&self) -> impl Iterator<Item = Provider> + '_ {
        self.secrets.iter().filter_map(|s| s.provider)
    }
}

/// Volumes, mounts and environment variables waiting to be added to a
/// container.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CredentialMounts {
    /// Pod-level volumes.
    pub volumes: Vec<Volume>,
    /// Container volume mounts.
    pub volume_mounts: Vec<VolumeMount>,
    /// Container environment variables.
    pub env: Vec<EnvVar>,
}

impl CredentialMounts {
    /// Is there nothing to add?
    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty() && self.volume_mounts.is_empty() && self.env.is_empty()
    }

    /// Append everything to `container` and `volumes`.
    pub fn apply_to(self, container: &mut Container, volumes: &mut Vec<Volume>) {
        volumes.extend(self.volumes);
        container.volume_mounts.extend(self.volume_mounts);
        container.env.extend(self.env);
    }
}

/// Figures out what credentials a service account provides, and how to
/// expose them to a container.
pub struct CredentialBuilder<S> {
    keys: SignatureKeys,
    store: S,
    span: Span,
}

impl<S: SecretStore> CredentialBuilder<S> {
    /// Create a new builder. All log events are recorded as children of
    /// `span`.
    pub fn new(config: &CredentialConfig, store: S, span: Span) -> Self {
        CredentialBuilder {
            keys: SignatureKeys::from_config(config),
            store,
            span,
        }
    }

    /// The signature keys this builder uses.
    pub fn signature_keys(&self) -> &SignatureKeys {
        &self.keys
    }

    /// Add the volumes, mounts and environment variables needed for the
    /// credentials attached to `service_account` (or `"default"`, if empty).
    ///
    /// A missing service account, or missing secrets, are logged and skipped.
    /// An incomplete set of HDFS secrets is an error, and nothing is added.
    pub fn inject(
        &self,
        namespace: &str,
        service_account: &str,
        container: &mut Container,
        volumes: &mut Vec<Volume>,
    ) -> Result<InjectionReport, InjectionError> {
        let (report, mounts) = self.build(namespace, service_account)?;
        mounts.apply_to(container, volumes);
        Ok(report)
    }

    /// Work out which provider each secret on `service_account` belongs to,
    /// without building anything.
    pub fn classify_service_account(
        &self,
        namespace: &str,
        service_account: &str,
    ) -> InjectionReport {
        let mut report = self.empty_report(namespace, service_account);
        for secret in self.fetch_secrets(&mut report) {
            let provider = classify(&secret, &self.keys);
            report.secrets.push(SecretClassification {
                secret: secret.metadata.name,
                provider,
            });
        }
        report
    }

    /// Build everything we would add for `service_account`, without touching
    /// any container.
    pub fn build(
        &self,
        namespace: &str,
        service_account: &str,
    ) -> Result<(InjectionReport, CredentialMounts), InjectionError> {
        let mut report = self.empty_report(namespace, service_account);
        let mut mounts = CredentialMounts::default();
        let mut hdfs_credentials = HdfsCredentials::default();

        for secret in self.fetch_secrets(&mut report) {
            let secret_name = secret.metadata.name.as_str();
            let provider = classify(&secret, &self.keys);
            match provider {
                Some(Provider::S3) => {
                    info!(parent: &self.span, secret = secret_name, "setting secret envs for s3");
                    mounts.env.extend(s3::build_secret_envs(
                        &secret,
                        &self.keys.s3_access_key_id,
                        &self.keys.s3_secret_access_key,
                    ));
                }
                Some(Provider::Gcs) => {
                    info!(parent: &self.span, secret = secret_name, "setting secret volume for gcs");
                    let (volume, volume_mount) = gcs::build_secret_volume(&secret);
                    mounts.volumes.push(volume);
                    mounts.volume_mounts.push(volume_mount);
                    mounts.env.push(gcs::build_env(&self.keys.gcs_credential_file));
                }
                Some(Provider::Hdfs(HdfsRole::Token)) => {
                    info!(parent: &self.span, secret = secret_name, "setting secret volume for hdfs token");
                    let (volume, volume_mount) = hdfs::build_token_volume(&secret);
                    mounts.volumes.push(volume);
                    mounts.volume_mounts.push(volume_mount);
                    hdfs_credentials = hdfs_credentials.saw(HdfsRole::Token);
                }
                Some(Provider::Hdfs(HdfsRole::Config)) => {
                    info!(parent: &self.span, secret = secret_name, "setting secret volume for hdfs config");
                    let (volume, volume_mounts) = hdfs::build_config_volume(&secret);
                    mounts.volumes.push(volume);
                    mounts.volume_mounts.extend(volume_mounts);
                    hdfs_credentials = hdfs_credentials.saw(HdfsRole::Config);
                }
                None => {
                    trace!(parent: &self.span, secret = secret_name, "skipping secret without storage credentials");
                }
            }
            report.secrets.push(SecretClassification {
                secret: secret.metadata.name.clone(),
                provider,
            });
        }

        match hdfs_credentials {
            HdfsCredentials::Unsatisfied => {}
            HdfsCredentials::Satisfied => {
                mounts.env.extend(hdfs::build_envs(namespace));
            }
            HdfsCredentials::Partial(found) => {
                error!(
                    parent: &self.span,
                    namespace = %namespace,
                    service_account = report.service_account.as_str(),
                    "need to define both HDFS token and config secrets"
                );
                return Err(InjectionError::IncompleteHdfsCredentials {
                    namespace: namespace.to_owned(),
                    service_account: report.service_account,
                    found,
                    missing: found.other(),
                });
            }
        }
        Ok((report, mounts))
    }

    /// A report with nothing in it yet.
    fn empty_report(&self, namespace: &str, service_account: &str) -> InjectionReport {
        let service_account = if service_account.is_empty() {
            DEFAULT_SERVICE_ACCOUNT_NAME
        } else {
            service_account
        };
        InjectionReport {
            namespace: namespace.to_owned(),
            service_account: service_account.to_owned(),
            ..InjectionReport::default()
        }
    }

    /// Fetch the service account named in `report` and all its secrets,
    /// noting anything we can't fetch.
    fn fetch_secrets(&self, report: &mut InjectionReport) -> Vec<Secret> {
        let namespace = report.namespace.clone();
        let sa = match self.store.service_account(&namespace, &report.service_account) {
            Ok(sa) => sa,
            Err(err) => {
                error!(
                    parent: &self.span,
                    namespace = %namespace,
                    service_account = report.service_account.as_str(),
                    "failed to find service account: {:#}",
                    err
                );
                report.service_account_missing = true;
                return vec![];
            }
        };

        let mut secrets = Vec::with_capacity(sa.secrets.len());
        for secret_ref in &sa.secrets {
            match self.store.secret(&namespace, &secret_ref.name) {
                Ok(secret) => secrets.push(secret),
                Err(err) => {
                    error!(
                        parent: &self.span,
                        namespace = %namespace,
                        secret = secret_ref.name.as_str(),
                        "failed to find secret: {:#}",
                        err
                    );
                    report.unavailable_secrets.push(secret_ref.name.clone());
                }
            }
        }
        secrets
    }
}
