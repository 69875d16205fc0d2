//! Controller-specific error types.
//!
//! This module defines error types specific to the ScalingWindow Controller
//! that are not covered by upstream library errors.

use crate::cluster::ClusterError;
use kube::Error as KubeError;
use thiserror::Error;

/// Errors that can occur in the ScalingWindow Controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Fetching or persisting cluster state failed
    #[error("Cluster error: {0}")]
    Cluster(#[from] ClusterError),

    /// Kubernetes client setup error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Resource is missing metadata the controller relies on
    #[error("Invalid resource: {0}")]
    InvalidResource(String),

    /// Resource watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),
}
