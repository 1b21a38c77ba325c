//! Code shared between the `kfcreds` tools: the credential injection engine,
//! plus the Kubernetes plumbing it needs.

#![warn(missing_docs)]

pub mod credentials;
pub mod errors;
pub mod k8s;
pub mod kubernetes;
pub mod tracing_support;

/// Common imports used by many modules.
pub mod prelude {
    pub use anyhow::{format_err, Context as _};
    pub use serde::{Deserialize, Serialize};
    pub use std::{collections::BTreeMap, fmt};
    pub use tracing::{debug, error, info, trace, warn};

    pub use super::{Error, Result};
}

/// Error type for this crate's functions.
pub use anyhow::Error;

/// Result type for this crate's functions.
pub type Result<T, E = Error> = ::std::result::Result<T, E>;
