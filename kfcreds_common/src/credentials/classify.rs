//! Deciding which provider a secret belongs to.

use super::signature::{Provider, SignatureKeys};
use crate::k8s::Secret;

/// Figure out which provider `secret` belongs to, by checking for each
/// provider's signature key in `Provider::PRIORITY` order. A secret belongs to
/// at most one provider. Returns `None` if no signature key is present.
pub fn classify(secret: &Secret, keys: &SignatureKeys) -> Option<Provider> {
    Provider::PRIORITY
        .iter()
        .copied()
        .find(|&provider| secret.has_key(keys.signature_key(provider)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{config::CredentialConfig, hdfs::HdfsRole};
    use crate::k8s::ObjectMeta;

    fn secret_with_keys(keys: &[&str]) -> Secret {
        let mut secret = Secret {
            metadata: ObjectMeta::named("secret"),
            ..Secret::default()
        };
        for key in keys {
            secret.data.insert((*key).to_owned(), b"opaque".to_vec());
        }
        secret
    }

    #[test]
    fn each_provider_is_detected() {
        let keys = SignatureKeys::default();
        for &provider in &Provider::PRIORITY {
            let secret = secret_with_keys(&[provider.default_signature_key()]);
            assert_eq!(classify(&secret, &keys), Some(provider));
        }
    }

    #[test]
    fn first_match_wins() {
        let keys = SignatureKeys::default();
        let secret = secret_with_keys(&["hadoop-config-map", "hadoop-secret"]);
        assert_eq!(classify(&secret, &keys), Some(Provider::Hdfs(HdfsRole::Token)));

        let secret = secret_with_keys(&[
            "hadoop-secret",
            "gcloud-application-credentials.json",
            "awsSecretAccessKey",
        ]);
        assert_eq!(classify(&secret, &keys), Some(Provider::S3));
    }

    #[test]
    fn unrelated_secrets_are_ignored() {
        let keys = SignatureKeys::default();
        assert_eq!(classify(&secret_with_keys(&[]), &keys), None);
        assert_eq!(classify(&secret_with_keys(&["ca.crt", "token"]), &keys), None);
    }

    #[test]
    fn classification_is_repeatable() {
        let keys = SignatureKeys::default();
        let secret = secret_with_keys(&["hadoop-secret"]);
        assert_eq!(classify(&secret, &keys), classify(&secret, &keys));
    }

    #[test]
    fn overridden_keys_replace_defaults() {
        let mut config = CredentialConfig::default();
        config.s3.secret_access_key_name = Some("secretKey".to_owned());
        let keys = SignatureKeys::from_config(&config);

        assert_eq!(
            classify(&secret_with_keys(&["secretKey"]), &keys),
            Some(Provider::S3),
        );
        assert_eq!(classify(&secret_with_keys(&["awsSecretAccessKey"]), &keys), None);
    }
}
