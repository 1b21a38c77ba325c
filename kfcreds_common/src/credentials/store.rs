//! Where we look up service accounts and secrets. We only ever read.

use crate::k8s::{ObjectMeta, Secret, ServiceAccount};
use crate::kubernetes::kubectl_get;
use crate::prelude::*;

/// Read-only access to service accounts and secrets.
pub trait SecretStore {
    /// Look up a service account.
    fn service_account(&self, namespace: &str, name: &str) -> Result<ServiceAccount>;

    /// Look up a secret.
    fn secret(&self, namespace: &str, name: &str) -> Result<Secret>;
}

impl<S: SecretStore + ?Sized> SecretStore for Box<S> {
    fn service_account(&self, namespace: &str, name: &str) -> Result<ServiceAccount> {
        (**self).service_account(namespace, name)
    }

    fn secret(&self, namespace: &str, name: &str) -> Result<Secret> {
        (**self).secret(namespace, name)
    }
}

/// Fetch objects from the current cluster using `kubectl`.
#[derive(Clone, Copy, Debug, Default)]
pub struct KubectlStore;

impl SecretStore for KubectlStore {
    fn service_account(&self, namespace: &str, name: &str) -> Result<ServiceAccount> {
        kubectl_get(namespace, "serviceaccount", name)
            .with_context(|| format!("could not get service account {}/{}", namespace, name))
    }

    fn secret(&self, namespace: &str, name: &str) -> Result<Secret> {
        kubectl_get(namespace, "secret", name)
            .with_context(|| format!("could not get secret {}/{}", namespace, name))
    }
}

/// Any object we might find in a `List`. We only care about a few kinds.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind")]
enum Object {
    ServiceAccount(ServiceAccount),
    Secret(Secret),
    #[serde(other)]
    Other,
}

/// A `kubectl get -o json` style list of objects.
#[derive(Debug, Deserialize)]
struct ObjectList {
    items: Vec<Object>,
}

/// An in-memory store, for tests and for working without a cluster.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    service_accounts: BTreeMap<(String, String), ServiceAccount>,
    secrets: BTreeMap<(String, String), Secret>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    /// Load a store from the JSON output of a command like
    /// `kubectl get serviceaccounts,secrets -o json`. Objects with no
    /// namespace are placed in `default_namespace`, and objects of other kinds
    /// are ignored.
    pub fn from_list_json(json: &str, default_namespace: &str) -> Result<MemoryStore> {
        let list = serde_json::from_str(json).context("could not parse object list")?;
        MemoryStore::from_list_value(list, default_namespace)
    }

    /// Like `from_list_json`, but for a list which has already been parsed
    /// (perhaps from YAML).
    pub fn from_list_value(
        list: serde_json::Value,
        default_namespace: &str,
    ) -> Result<MemoryStore> {
        let list: ObjectList =
            serde_json::from_value(list).context("could not parse object list")?;
        let mut store = MemoryStore::new();
        for object in list.items {
            match object {
                Object::ServiceAccount(mut sa) => {
                    sa.metadata
                        .namespace
                        .get_or_insert_with(|| default_namespace.to_owned());
                    store.add_service_account(sa);
                }
                Object::Secret(mut secret) => {
                    secret
                        .metadata
                        .namespace
                        .get_or_insert_with(|| default_namespace.to_owned());
                    store.add_secret(secret);
                }
                Object::Other => {}
            }
        }
        Ok(store)
    }

    /// Add a service account, replacing any existing one with the same name.
    /// Its metadata must include a namespace.
    pub fn add_service_account(&mut self, service_account: ServiceAccount) {
        let key = store_key(&service_account.metadata);
        self.service_accounts.insert(key, service_account);
    }

    /// Add a secret, replacing any existing one with the same name. Its
    /// metadata must include a namespace.
    pub fn add_secret(&mut self, secret: Secret) {
        let key = store_key(&secret.metadata);
        self.secrets.insert(key, secret);
    }
}

/// Our lookup key for an object. Objects without a namespace end up in `""`,
/// where nobody will find them.
fn store_key(metadata: &ObjectMeta) -> (String, String) {
    (
        metadata.namespace.clone().unwrap_or_default(),
        metadata.name.clone(),
    )
}

impl SecretStore for MemoryStore {
    fn service_account(&self, namespace: &str, name: &str) -> Result<ServiceAccount> {
        self.service_accounts
            .get(&(namespace.to_owned(), name.to_owned()))
            .cloned()
            .ok_or_else(|| format_err!("service account {}/{} not found", namespace, name))
    }

    fn secret(&self, namespace: &str, name: &str) -> Result<Secret> {
        self.secrets
            .get(&(namespace.to_owned(), name.to_owned()))
            .cloned()
            .ok_or_else(|| format_err!("secret {}/{} not found", namespace, name))
    }
}

#[test]
fn load_memory_store_from_list() {
    let json = r#"{
  "apiVersion": "v1",
  "kind": "List",
  "items": [
    {
      "apiVersion": "v1",
      "kind": "ServiceAccount",
      "metadata": { "name": "default", "namespace": "kubeflow" },
      "secrets": [{ "name": "hdfs-token" }]
    },
    {
      "apiVersion": "v1",
      "kind": "Secret",
      "metadata": { "name": "hdfs-token" },
      "data": { "hadoop-secret": "" }
    },
    {
      "apiVersion": "v1",
      "kind": "ConfigMap",
      "metadata": { "name": "ignored" },
      "data": {}
    }
  ]
}"#;
    let store = MemoryStore::from_list_json(json, "kubeflow").unwrap();
    let sa = store.service_account("kubeflow", "default").unwrap();
    assert_eq!(sa.secrets[0].name, "hdfs-token");
    let secret = store.secret("kubeflow", "hdfs-token").unwrap();
    assert!(secret.has_key("hadoop-secret"));
    assert!(store.secret("other", "hdfs-token").is_err());
}
