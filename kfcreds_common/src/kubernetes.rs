//! Tools for talking to Kubernetes using `kubectl`.

use serde::de::DeserializeOwned;
use std::process::{Command, Stdio};

use crate::prelude::*;

/// Run `kubectl`, capture output as JSON, and parse it using the
/// specified type.
pub fn kubectl_parse_json<T: DeserializeOwned>(args: &[&str]) -> Result<T> {
    trace!("running kubectl {:?}", args);
    let output = Command::new("kubectl")
        .args(args)
        // Pass `stderr` through on console instead of capturing.
        .stderr(Stdio::inherit())
        .output()
        .with_context(|| format!("error starting kubectl with {:?}", args))?;
    if !output.status.success() {
        return Err(format_err!("error running kubectl with {:?}", args));
    }
    serde_json::from_slice(&output.stdout)
        .with_context(|| format!("error parsing output of kubectl {:?}", args))
}

/// Fetch a single namespaced resource of the specified `kind` and parse it.
pub fn kubectl_get<T: DeserializeOwned>(
    namespace: &str,
    kind: &str,
    name: &str,
) -> Result<T> {
    kubectl_parse_json(&["get", "--namespace", namespace, kind, name, "-o", "json"])
}
