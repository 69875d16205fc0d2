//! ScalingWindow CRD
//!
//! Declares a daily UTC hour window during which a set of Deployments
//! should run with a fixed replica count.

use crate::references::WorkloadReference;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[kube(
    group = "scaling.microscaler.io",
    version = "v1alpha1",
    kind = "ScalingWindow",
    namespaced,
    status = "ScalingWindowStatus",
    shortname = "sw",
    printcolumn = r#"{"name":"Start", "type":"integer", "jsonPath":".spec.start"}"#,
    printcolumn = r#"{"name":"End", "type":"integer", "jsonPath":".spec.end"}"#,
    printcolumn = r#"{"name":"Replicas", "type":"integer", "jsonPath":".spec.replicas"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ScalingWindowSpec {
    /// First hour of the window (0-23, UTC, inclusive)
    pub start: i32,

    /// Last hour of the window (0-23, UTC, inclusive)
    ///
    /// A window with `end < start` does not wrap past midnight and is never active.
    pub end: i32,

    /// Replica count applied to every referenced Deployment while the window is active
    pub replicas: i32,

    /// Deployments scaled by this window, in the order they are applied
    #[serde(default)]
    pub deployments: Vec<WorkloadReference>,
}

impl ScalingWindowSpec {
    /// Returns true if `hour` lies within `[start, end]`.
    ///
    /// Plain integer comparison: no minutes, no wraparound, no validation
    /// of the bounds.
    #[must_use]
    pub fn contains_hour(&self, hour: i32) -> bool {
        self.start <= hour && hour <= self.end
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScalingWindowStatus {
    /// When a referenced Deployment was last scaled by this window
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_scaled_time: Option<chrono::DateTime<chrono::Utc>>,

    /// The Deployment (`namespace/name`) that was last scaled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_scaled_workload: Option<String>,
}
