//! HDFS credentials. HDFS needs two cooperating secrets: one holding a
//! delegation token, and one holding the Hadoop configuration directory
//! (including `krb5.conf`).

use crate::k8s::{EnvVar, Secret, SecretVolumeSource, Volume, VolumeMount};
use crate::prelude::*;

/// Environment variable pointing at the delegation token file.
pub const HDFS_TOKEN_FILE_LOCATION_ENV: &str = "HADOOP_TOKEN_FILE_LOCATION";
/// Environment variable pointing at the Hadoop configuration directory.
pub const HDFS_CONF_DIR_ENV: &str = "HADOOP_CONF_DIR";
/// Environment variable holding the Hadoop user name.
pub const HDFS_USER_NAME_ENV: &str = "HADOOP_USER_NAME";

/// Volume name for the configuration secret. This is also the default secret
/// key which marks a configuration secret.
pub const HDFS_CONFIG_VOLUME_NAME: &str = "hadoop-config-map";
/// Volume name for the token secret. This is also the default secret key which
/// marks a token secret.
pub const HDFS_TOKEN_VOLUME_NAME: &str = "hadoop-secret";

/// Where we mount the configuration secret.
pub const HDFS_CONFIG_VOLUME_PATH: &str = "/hadoop/conf";
/// Where we mount `krb5.conf` from the configuration secret.
pub const HDFS_KRB5_CONF_PATH: &str = "/etc/krb5.conf";
/// The key in the configuration secret holding the Kerberos configuration.
pub const HDFS_KRB5_CONF_KEY: &str = "krb5.conf";
/// Where we mount the token secret.
pub const HDFS_TOKEN_VOLUME_PATH: &str = "/hadoop/secrets";

/// Permissions for files in our secret volumes (0644).
pub const HDFS_VOLUME_DEFAULT_MODE: i32 = 0o644;

/// Overridable HDFS settings, as they appear in our config map.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct HdfsConfig {
    /// The secret key which marks a token secret.
    #[serde(default, rename = "hdfsTokenSecret")]
    pub token_secret_key_name: Option<String>,
    /// The secret key which marks a configuration secret.
    #[serde(default, rename = "hdfsConfigMap")]
    pub config_secret_key_name: Option<String>,
}

/// The two roles a secret can play for HDFS.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HdfsRole {
    /// Holds a delegation token.
    Token,
    /// Holds the Hadoop configuration.
    Config,
}

impl fmt::Display for HdfsRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HdfsRole::Token => f.write_str("token"),
            HdfsRole::Config => f.write_str("configuration"),
        }
    }
}

impl HdfsRole {
    /// The role which completes this one.
    pub fn other(self) -> HdfsRole {
        match self {
            HdfsRole::Token => HdfsRole::Config,
            HdfsRole::Config => HdfsRole::Token,
        }
    }
}

/// How many of the HDFS roles have we seen while looking at a service
/// account's secrets?
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HdfsCredentials {
    /// We haven't seen any HDFS secrets. This is fine.
    Unsatisfied,
    /// We've only seen secrets for one role. This is a configuration error if
    /// nothing else turns up.
    Partial(HdfsRole),
    /// We've seen both roles.
    Satisfied,
}

impl Default for HdfsCredentials {
    fn default() -> Self {
        HdfsCredentials::Unsatisfied
    }
}

impl HdfsCredentials {
    /// Record that we've seen a secret playing `role`.
    pub fn saw(self, role: HdfsRole) -> HdfsCredentials {
        match self {
            HdfsCredentials::Unsatisfied => HdfsCredentials::Partial(role),
            HdfsCredentials::Partial(seen) if seen == role => self,
            HdfsCredentials::Partial(_) => HdfsCredentials::Satisfied,
            HdfsCredentials::Satisfied => HdfsCredentials::Satisfied,
        }
    }
}

/// A secret-backed volume with our standard permissions.
fn secret_volume(volume_name: &str, secret: &Secret) -> Volume {
    Volume {
        name: volume_name.to_owned(),
        secret: Some(SecretVolumeSource {
            secret_name: secret.metadata.name.clone(),
            default_mode: Some(HDFS_VOLUME_DEFAULT_MODE),
        }),
        ..Volume::default()
    }
}

/// Build the volume and mount for a token secret.
pub fn build_token_volume(secret: &Secret) -> (Volume, VolumeMount) {
    let volume = secret_volume(HDFS_TOKEN_VOLUME_NAME, secret);
    let volume_mount = VolumeMount {
        name: HDFS_TOKEN_VOLUME_NAME.to_owned(),
        mount_path: HDFS_TOKEN_VOLUME_PATH.to_owned(),
        read_only: Some(true),
        sub_path: None,
    };
    (volume, volume_mount)
}

/// Build the volume and mounts for a configuration secret. The whole secret
/// is mounted as the Hadoop configuration directory, and `krb5.conf` is also
/// mounted on its own at the system location.
pub fn build_config_volume(secret: &Secret) -> (Volume, Vec<VolumeMount>) {
    let volume = secret_volume(HDFS_CONFIG_VOLUME_NAME, secret);
    let volume_mounts = vec![
        VolumeMount {
            name: HDFS_CONFIG_VOLUME_NAME.to_owned(),
            mount_path: HDFS_CONFIG_VOLUME_PATH.to_owned(),
            read_only: Some(true),
            sub_path: None,
        },
        VolumeMount {
            name: HDFS_CONFIG_VOLUME_NAME.to_owned(),
            mount_path: HDFS_KRB5_CONF_PATH.to_owned(),
            read_only: Some(true),
            sub_path: Some(HDFS_KRB5_CONF_KEY.to_owned()),
        },
    ];
    (volume, volume_mounts)
}

/// Build the environment variables Hadoop clients need once both secrets are
/// mounted.
///
/// The Hadoop user name is the namespace. That conflates two different
/// things, but existing deployments depend on it.
pub fn build_envs(namespace: &str) -> Vec<EnvVar> {
    vec![
        EnvVar::literal(
            HDFS_TOKEN_FILE_LOCATION_ENV,
            format!("{}/{}", HDFS_TOKEN_VOLUME_PATH, HDFS_TOKEN_VOLUME_NAME),
        ),
        EnvVar::literal(HDFS_CONF_DIR_ENV, HDFS_CONFIG_VOLUME_PATH),
        EnvVar::literal(HDFS_USER_NAME_ENV, namespace),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::k8s::ObjectMeta;

    fn secret(name: &str, key: &str) -> Secret {
        let mut data = BTreeMap::new();
        data.insert(key.to_owned(), vec![]);
        Secret {
            metadata: ObjectMeta::named(name),
            data,
        }
    }

    #[test]
    fn token_volume() {
        let (volume, volume_mount) =
            build_token_volume(&secret("user-hdfs-token", HDFS_TOKEN_VOLUME_NAME));
        assert_eq!(
            volume,
            Volume {
                name: HDFS_TOKEN_VOLUME_NAME.to_owned(),
                secret: Some(SecretVolumeSource {
                    secret_name: "user-hdfs-token".to_owned(),
                    default_mode: Some(420),
                }),
                ..Volume::default()
            },
        );
        assert_eq!(
            volume_mount,
            VolumeMount {
                name: HDFS_TOKEN_VOLUME_NAME.to_owned(),
                mount_path: HDFS_TOKEN_VOLUME_PATH.to_owned(),
                read_only: Some(true),
                sub_path: None,
            },
        );
    }

    #[test]
    fn config_volume() {
        let (volume, volume_mounts) =
            build_config_volume(&secret("user-hdfs-cmap", HDFS_CONFIG_VOLUME_NAME));
        assert_eq!(volume.name, HDFS_CONFIG_VOLUME_NAME);
        assert_eq!(
            volume.secret,
            Some(SecretVolumeSource {
                secret_name: "user-hdfs-cmap".to_owned(),
                default_mode: Some(420),
            }),
        );
        assert_eq!(
            volume_mounts,
            vec![
                VolumeMount {
                    name: HDFS_CONFIG_VOLUME_NAME.to_owned(),
                    mount_path: HDFS_CONFIG_VOLUME_PATH.to_owned(),
                    read_only: Some(true),
                    sub_path: None,
                },
                VolumeMount {
                    name: HDFS_CONFIG_VOLUME_NAME.to_owned(),
                    mount_path: HDFS_KRB5_CONF_PATH.to_owned(),
                    read_only: Some(true),
                    sub_path: Some("krb5.conf".to_owned()),
                },
            ],
        );
    }

    #[test]
    fn volume_name_ignores_secret_name() {
        let (a, _) = build_token_volume(&secret("first", HDFS_TOKEN_VOLUME_NAME));
        let (b, _) = build_token_volume(&secret("second", HDFS_TOKEN_VOLUME_NAME));
        assert_eq!(a.name, b.name);
    }

    #[test]
    fn envs_depend_only_on_namespace() {
        let envs = build_envs("team-a");
        assert_eq!(
            envs,
            vec![
                EnvVar::literal(
                    "HADOOP_TOKEN_FILE_LOCATION",
                    "/hadoop/secrets/hadoop-secret",
                ),
                EnvVar::literal("HADOOP_CONF_DIR", "/hadoop/conf"),
                EnvVar::literal("HADOOP_USER_NAME", "team-a"),
            ],
        );
        assert_eq!(envs, build_envs("team-a"));
    }

    #[test]
    fn credential_state_machine() {
        use super::HdfsCredentials::*;
        use super::HdfsRole::*;

        assert_eq!(Unsatisfied.saw(Token), Partial(Token));
        assert_eq!(Unsatisfied.saw(Config), Partial(Config));
        assert_eq!(Partial(Token).saw(Token), Partial(Token));
        assert_eq!(Partial(Token).saw(Config), Satisfied);
        assert_eq!(Partial(Config).saw(Token), Satisfied);
        assert_eq!(Satisfied.saw(Token), Satisfied);
    }
}
