//! Google Cloud Storage credentials, mounted as a service account key file.

use crate::k8s::{EnvVar, Secret, SecretVolumeSource, Volume, VolumeMount};
use crate::prelude::*;

/// Default secret key holding the credential file. Its presence marks a secret
/// as a GCS secret.
pub const GCS_CREDENTIAL_FILE_NAME: &str = "gcloud-application-credentials.json";
/// The volume name we mount the secret as.
pub const GCS_CREDENTIAL_VOLUME_NAME: &str = "user-gcp-sa";
/// Where we mount the secret. Note the trailing slash.
pub const GCS_CREDENTIAL_VOLUME_MOUNT_PATH: &str = "/var/secrets/";
/// Environment variable pointing at the credential file.
pub const GCS_CREDENTIAL_ENV_KEY: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Overridable GCS settings, as they appear in our config map.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct GcsConfig {
    /// The secret key holding the credential file.
    #[serde(default, rename = "gcsCredentialFileName")]
    pub credential_file_name: Option<String>,
}

/// Build the volume and mount for a GCS credential secret.
pub fn build_secret_volume(secret: &Secret) -> (Volume, VolumeMount) {
    let volume = Volume {
        name: GCS_CREDENTIAL_VOLUME_NAME.to_owned(),
        secret: Some(SecretVolumeSource {
            secret_name: secret.metadata.name.clone(),
            default_mode: None,
        }),
        ..Volume::default()
    };
    let volume_mount = VolumeMount {
        name: GCS_CREDENTIAL_VOLUME_NAME.to_owned(),
        mount_path: GCS_CREDENTIAL_VOLUME_MOUNT_PATH.to_owned(),
        read_only: Some(true),
        sub_path: None,
    };
    (volume, volume_mount)
}

/// Build the environment variable pointing Google client libraries at the
/// mounted credential file.
pub fn build_env(credential_file_name: &str) -> EnvVar {
    EnvVar::literal(
        GCS_CREDENTIAL_ENV_KEY,
        format!("{}{}", GCS_CREDENTIAL_VOLUME_MOUNT_PATH, credential_file_name),
    )
}

#[test]
fn gcs_volume_and_env() {
    use crate::k8s::ObjectMeta;

    let secret = Secret {
        metadata: ObjectMeta::named("user-gcp-creds"),
        ..Secret::default()
    };
    let (volume, volume_mount) = build_secret_volume(&secret);
    assert_eq!(volume.name, "user-gcp-sa");
    assert_eq!(volume.secret.unwrap().secret_name, "user-gcp-creds");
    assert_eq!(volume_mount.mount_path, "/var/secrets/");
    assert_eq!(volume_mount.read_only, Some(true));

    assert_eq!(
        build_env(GCS_CREDENTIAL_FILE_NAME),
        EnvVar::literal(
            "GOOGLE_APPLICATION_CREDENTIALS",
            "/var/secrets/gcloud-application-credentials.json",
        ),
    );
}
