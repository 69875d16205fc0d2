//! Workload references
//!
//! A ScalingWindow points at the workloads it scales by `{name, namespace}`.
//! The referenced workloads are never owned by the ScalingWindow.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to a scalable workload (an `apps/v1` Deployment).
///
/// Both fields are required; the namespace is not defaulted from the
/// ScalingWindow's own namespace, so a window may scale workloads in any
/// namespace the controller has access to.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadReference {
    /// Name of the referenced Deployment
    pub name: String,

    /// Namespace of the referenced Deployment
    pub namespace: String,
}

impl WorkloadReference {
    /// Create a new reference
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

impl fmt::Display for WorkloadReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}
