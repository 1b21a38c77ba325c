//! AWS S3 (and S3-compatible) credentials, passed to the container as
//! environment variables.

use crate::k8s::{EnvVar, Secret};
use crate::prelude::*;

/// Environment variable for the access key ID.
pub const AWS_ACCESS_KEY_ID_ENV: &str = "AWS_ACCESS_KEY_ID";
/// Environment variable for the secret access key.
pub const AWS_SECRET_ACCESS_KEY_ENV: &str = "AWS_SECRET_ACCESS_KEY";
/// Environment variable for the full endpoint URL.
pub const AWS_ENDPOINT_URL_ENV: &str = "AWS_ENDPOINT_URL";
/// Environment variable for the bare endpoint host.
pub const S3_ENDPOINT_ENV: &str = "S3_ENDPOINT";
/// Environment variable saying whether to use HTTPS.
pub const S3_USE_HTTPS_ENV: &str = "S3_USE_HTTPS";
/// Environment variable saying whether to verify TLS certificates.
pub const S3_VERIFY_SSL_ENV: &str = "S3_VERIFY_SSL";

/// Default secret key holding the access key ID.
pub const AWS_ACCESS_KEY_ID_NAME: &str = "awsAccessKeyID";
/// Default secret key holding the secret access key. Its presence marks a
/// secret as an S3 secret.
pub const AWS_SECRET_ACCESS_KEY_NAME: &str = "awsSecretAccessKey";

/// Secret annotation naming a custom S3 endpoint.
pub const S3_ENDPOINT_ANNOTATION: &str = "serving.kubeflow.org/s3-endpoint";
/// Secret annotation saying whether the endpoint uses HTTPS (`"0"` or `"1"`).
pub const S3_USE_HTTPS_ANNOTATION: &str = "serving.kubeflow.org/s3-usehttps";
/// Secret annotation saying whether to verify the endpoint's certificate.
pub const S3_VERIFY_SSL_ANNOTATION: &str = "serving.kubeflow.org/s3-verifyssl";

/// Overridable S3 settings, as they appear in our config map.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct S3Config {
    /// The secret key holding the access key ID.
    #[serde(default, rename = "s3AccessKeyIDName")]
    pub access_key_id_name: Option<String>,
    /// The secret key holding the secret access key.
    #[serde(default, rename = "s3SecretAccessKeyName")]
    pub secret_access_key_name: Option<String>,
}

/// Build the environment variables needed to talk to S3 using `secret`.
///
/// Credentials are referenced using `secretKeyRef`, so they never appear in
/// the container spec itself.
pub fn build_secret_envs(
    secret: &Secret,
    access_key_id_name: &str,
    secret_access_key_name: &str,
) -> Vec<EnvVar> {
    let secret_name = &secret.metadata.name;
    let mut envs = vec![
        EnvVar::from_secret_key(AWS_ACCESS_KEY_ID_ENV, secret_name, access_key_id_name),
        EnvVar::from_secret_key(
            AWS_SECRET_ACCESS_KEY_ENV,
            secret_name,
            secret_access_key_name,
        ),
    ];

    if let Some(endpoint) = secret.annotation(S3_ENDPOINT_ANNOTATION) {
        let mut scheme = "https";
        if let Some(use_https) = secret.annotation(S3_USE_HTTPS_ANNOTATION) {
            if use_https == "0" {
                scheme = "http";
            }
            envs.push(EnvVar::literal(S3_USE_HTTPS_ENV, use_https));
        }
        envs.push(EnvVar::literal(S3_ENDPOINT_ENV, endpoint));
        envs.push(EnvVar::literal(
            AWS_ENDPOINT_URL_ENV,
            format!("{}://{}", scheme, endpoint),
        ));
    }

    if let Some(verify_ssl) = secret.annotation(S3_VERIFY_SSL_ANNOTATION) {
        envs.push(EnvVar::literal(S3_VERIFY_SSL_ENV, verify_ssl));
    }
    envs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::k8s::ObjectMeta;

    fn s3_secret(annotations: &[(&str, &str)]) -> Secret {
        let mut secret = Secret {
            metadata: ObjectMeta::named("s3-secret"),
            ..Secret::default()
        };
        secret
            .data
            .insert(AWS_SECRET_ACCESS_KEY_NAME.to_owned(), b"secret".to_vec());
        for &(k, v) in annotations {
            secret
                .metadata
                .annotations
                .insert(k.to_owned(), v.to_owned());
        }
        secret
    }

    #[test]
    fn credentials_come_from_secret_refs() {
        let envs = build_secret_envs(
            &s3_secret(&[]),
            AWS_ACCESS_KEY_ID_NAME,
            AWS_SECRET_ACCESS_KEY_NAME,
        );
        assert_eq!(
            envs,
            vec![
                EnvVar::from_secret_key(
                    "AWS_ACCESS_KEY_ID",
                    "s3-secret",
                    "awsAccessKeyID",
                ),
                EnvVar::from_secret_key(
                    "AWS_SECRET_ACCESS_KEY",
                    "s3-secret",
                    "awsSecretAccessKey",
                ),
            ],
        );
    }

    #[test]
    fn custom_key_names_are_used() {
        let envs = build_secret_envs(&s3_secret(&[]), "id", "key");
        let refs = envs
            .iter()
            .map(|e| e.value_from.as_ref().unwrap().secret_key_ref.as_ref().unwrap().key.as_str())
            .collect::<Vec<_>>();
        assert_eq!(refs, vec!["id", "key"]);
    }

    #[test]
    fn endpoint_annotations() {
        let envs = build_secret_envs(
            &s3_secret(&[
                (S3_ENDPOINT_ANNOTATION, "minio.local:9000"),
                (S3_USE_HTTPS_ANNOTATION, "0"),
                (S3_VERIFY_SSL_ANNOTATION, "0"),
            ]),
            AWS_ACCESS_KEY_ID_NAME,
            AWS_SECRET_ACCESS_KEY_NAME,
        );
        assert_eq!(
            &envs[2..],
            &[
                EnvVar::literal("S3_USE_HTTPS", "0"),
                EnvVar::literal("S3_ENDPOINT", "minio.local:9000"),
                EnvVar::literal("AWS_ENDPOINT_URL", "http://minio.local:9000"),
                EnvVar::literal("S3_VERIFY_SSL", "0"),
            ][..],
        );
    }

    #[test]
    fn endpoint_defaults_to_https() {
        let envs = build_secret_envs(
            &s3_secret(&[(S3_ENDPOINT_ANNOTATION, "s3.example.com")]),
            AWS_ACCESS_KEY_ID_NAME,
            AWS_SECRET_ACCESS_KEY_NAME,
        );
        assert_eq!(envs.len(), 4);
        assert_eq!(
            envs[3],
            EnvVar::literal("AWS_ENDPOINT_URL", "https://s3.example.com"),
        );
    }
}
