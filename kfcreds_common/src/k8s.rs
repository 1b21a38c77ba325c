//! Local, `serde`-compatible reimplementations of the few Kubernetes `core/v1`
//! objects we need.
//!
//! These are missing lots of fields. Objects which we modify and hand back to
//! the user (`PodSpec`, `Container` and `Volume`) keep any fields we don't know
//! about in an `extra` map, so that they round-trip unchanged.

use serde_json::{Map, Value};

use crate::prelude::*;

/// Standard object metadata (missing lots of fields).
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    /// The name of this object.
    pub name: String,
    /// The namespace containing this object, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Annotations attached to this object.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

impl ObjectMeta {
    /// Metadata with just a name.
    pub fn named<S: Into<String>>(name: S) -> ObjectMeta {
        ObjectMeta {
            name: name.into(),
            ..ObjectMeta::default()
        }
    }

    /// Metadata with a name and a namespace.
    pub fn namespaced<S1, S2>(namespace: S1, name: S2) -> ObjectMeta
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        ObjectMeta {
            name: name.into(),
            namespace: Some(namespace.into()),
            ..ObjectMeta::default()
        }
    }
}

/// A Kubernetes secret. Kubernetes secrets contain key-value pairs, where each
/// value is an opaque blob of bytes.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Secret {
    /// Our metadata.
    pub metadata: ObjectMeta,
    /// Our secret data. Base64-encoded on the wire.
    #[serde(default, with = "base64_encoded_data")]
    pub data: BTreeMap<String, Vec<u8>>,
}

impl Secret {
    /// Does this secret have an entry named `key`? We never look at the
    /// values themselves.
    pub fn has_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Look up an annotation on this secret.
    pub fn annotation(&self, name: &str) -> Option<&str> {
        self.metadata.annotations.get(name).map(|v| v.as_str())
    }
}

/// A reference to another object in the same namespace.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ObjectReference {
    /// The name of the referenced object.
    pub name: String,
}

/// A Kubernetes service account, which is the identity a workload runs as.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ServiceAccount {
    /// Our metadata.
    pub metadata: ObjectMeta,
    /// The secrets attached to this service account.
    #[serde(default)]
    pub secrets: Vec<ObjectReference>,
}

/// A Kubernetes config map.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ConfigMap {
    /// Our metadata.
    pub metadata: ObjectMeta,
    /// Our configuration data.
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

/// A volume which can be mounted by containers in a pod.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Volume {
    /// The name of this volume, used by `VolumeMount`.
    pub name: String,
    /// Populate this volume from a secret.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<SecretVolumeSource>,
    /// Other volume sources we pass through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A volume populated from a secret. Each key becomes a file.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretVolumeSource {
    /// The name of the secret to use.
    pub secret_name: String,
    /// File permissions, as a decimal integer (420 is 0644).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_mode: Option<i32>,
}

/// Where and how to mount a volume inside a container.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeMount {
    /// The name of the volume to mount.
    pub name: String,
    /// The path inside the container.
    pub mount_path: String,
    /// Should this mount be read-only? Kubernetes treats a missing value as
    /// `false`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    /// Mount just this path within the volume, instead of the whole volume.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_path: Option<String>,
}

/// An environment variable for a container.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvVar {
    /// The variable name.
    pub name: String,
    /// A literal value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Take the value from somewhere else.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_from: Option<EnvVarSource>,
}

impl EnvVar {
    /// An environment variable with a literal value.
    pub fn literal<S1, S2>(name: S1, value: S2) -> EnvVar
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        EnvVar {
            name: name.into(),
            value: Some(value.into()),
            value_from: None,
        }
    }

    /// An environment variable whose value is read from `key` in the secret
    /// `secret_name`.
    pub fn from_secret_key<S1, S2, S3>(name: S1, secret_name: S2, key: S3) -> EnvVar
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        EnvVar {
            name: name.into(),
            value: None,
            value_from: Some(EnvVarSource {
                secret_key_ref: Some(SecretKeySelector {
                    name: secret_name.into(),
                    key: key.into(),
                }),
            }),
        }
    }
}

/// The source of an environment variable's value.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvVarSource {
    /// Read the value from a secret.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key_ref: Option<SecretKeySelector>,
}

/// Selects a single key from a secret.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct SecretKeySelector {
    /// The name of the secret.
    pub name: String,
    /// The key within the secret.
    pub key: String,
}

/// A single container in a pod.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    /// The name of this container.
    pub name: String,
    /// Environment variables.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVar>,
    /// Volumes to mount.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volume_mounts: Vec<VolumeMount>,
    /// Everything else (`image`, `command`, etc.).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The specification of a pod.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
    /// The service account this pod runs as.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_name: Option<String>,
    /// Our containers.
    #[serde(default)]
    pub containers: Vec<Container>,
    /// Volumes which may be mounted by our containers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<Volume>,
    /// Everything else.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Custom `serde` (de)serialization module for a map of Base64-encoded byte
/// strings, the way Kubernetes represents secret data. Use with
/// `#[serde(with = "base64_encoded_data")]`.
pub mod base64_encoded_data {
    use serde::{
        de::{Deserializer, Error as DeError},
        ser::Serializer,
        Deserialize, Serialize,
    };
    use std::{collections::BTreeMap, result};

    /// Deserialize a map of Base64-encoded values.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> result::Result<BTreeMap<String, Vec<u8>>, D::Error> {
        let encoded = Option::<BTreeMap<String, String>>::deserialize(deserializer)?;
        let mut decoded = BTreeMap::new();
        for (key, value) in encoded.unwrap_or_default() {
            let bytes = base64::decode(&value).map_err(|err| {
                D::Error::custom(format!("could not base64-decode secret key {:?}: {}", key, err))
            })?;
            decoded.insert(key, bytes);
        }
        Ok(decoded)
    }

    /// Serialize a map of byte strings as Base64.
    pub fn serialize<S: Serializer>(
        data: &BTreeMap<String, Vec<u8>>,
        serializer: S,
    ) -> result::Result<S::Ok, S::Error> {
        data.iter()
            .map(|(key, value)| (key, base64::encode(value)))
            .collect::<BTreeMap<_, _>>()
            .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_kubectl_secret() {
        let json = r#"{
  "apiVersion": "v1",
  "kind": "Secret",
  "metadata": {
    "name": "user-hdfs-token",
    "namespace": "kubeflow",
    "annotations": { "serving.kubeflow.org/s3-endpoint": "s3.example.com" }
  },
  "data": { "hadoop-secret": "dG9rZW4=" },
  "type": "Opaque"
}"#;
        let secret: Secret = serde_json::from_str(json).expect("parse error");
        assert_eq!(secret.metadata.name, "user-hdfs-token");
        assert_eq!(secret.metadata.namespace.as_deref(), Some("kubeflow"));
        assert!(secret.has_key("hadoop-secret"));
        assert_eq!(secret.data["hadoop-secret"], b"token".to_vec());
        assert_eq!(
            secret.annotation("serving.kubeflow.org/s3-endpoint"),
            Some("s3.example.com"),
        );
    }

    #[test]
    fn secret_without_data_is_empty() {
        let secret: Secret =
            serde_json::from_str(r#"{"metadata": {"name": "empty"}}"#).unwrap();
        assert!(secret.data.is_empty());
    }

    #[test]
    fn bad_base64_is_rejected() {
        let json = r#"{"metadata": {"name": "bad"}, "data": {"key": "!!!"}}"#;
        assert!(serde_json::from_str::<Secret>(json).is_err());
    }

    #[test]
    fn explicit_read_only_false_is_kept() {
        let json = r#"{
  "name": "kfserving-container",
  "volumeMounts": [{ "name": "cache", "mountPath": "/cache", "readOnly": false }]
}"#;
        let container: Container = serde_json::from_str(json).unwrap();
        assert_eq!(container.volume_mounts[0].read_only, Some(false));

        let round_tripped: Value = serde_json::to_value(&container).unwrap();
        let original: Value = serde_json::from_str(json).unwrap();
        assert_eq!(round_tripped, original);
    }

    #[test]
    fn pod_spec_keeps_unknown_fields() {
        let json = r#"{
  "serviceAccountName": "sa",
  "restartPolicy": "Never",
  "containers": [{
    "name": "kfserving-container",
    "image": "example/model:latest",
    "volumeMounts": [{ "name": "cache", "mountPath": "/cache" }]
  }],
  "volumes": [{ "name": "cache", "emptyDir": {} }]
}"#;
        let pod: PodSpec = serde_json::from_str(json).unwrap();
        assert_eq!(pod.containers[0].volume_mounts[0].mount_path, "/cache");
        assert_eq!(pod.containers[0].volume_mounts[0].read_only, None);

        let round_tripped: Value = serde_json::to_value(&pod).unwrap();
        let original: Value = serde_json::from_str(json).unwrap();
        assert_eq!(round_tripped, original);
    }
}
