//! ScalingWindow CRD Definitions
//!
//! Kubernetes Custom Resource Definitions for the scaling-window controller.

pub mod references;
pub mod scaling_window;

pub use references::*;
pub use scaling_window::*;
