//! Test utilities for unit testing the reconciler and mutator
//!
//! This module provides an in-memory cluster client, a fixed clock and
//! helpers for creating test resources.

use crate::clock::Clock;
use crate::cluster::{ClusterClient, ClusterError};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use crds::{ScalingWindow, ScalingWindowSpec, WorkloadReference};
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

type Key = (String, String);

fn key(namespace: &str, name: &str) -> Key {
    (namespace.to_string(), name.to_string())
}

fn injected_failure(what: &str) -> ClusterError {
    ClusterError::Kube(kube::Error::Service(format!("injected failure: {}", what).into()))
}

/// In-memory `ClusterClient` that records every write.
#[derive(Clone, Default)]
pub struct MockClusterClient {
    windows: Arc<Mutex<HashMap<Key, ScalingWindow>>>,
    deployments: Arc<Mutex<HashMap<Key, Deployment>>>,
    failing_window_gets: Arc<Mutex<HashSet<Key>>>,
    failing_deployment_gets: Arc<Mutex<HashSet<Key>>>,
    failing_deployment_updates: Arc<Mutex<HashSet<Key>>>,
    fail_status_updates: Arc<Mutex<bool>>,
    deployment_gets: Arc<Mutex<Vec<Key>>>,
    deployment_updates: Arc<Mutex<Vec<Deployment>>>,
    status_updates: Arc<Mutex<Vec<ScalingWindow>>>,
}

impl MockClusterClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a ScalingWindow to the mock store (for test setup)
    pub fn add_scaling_window(&self, window: ScalingWindow) {
        let k = key(
            window.metadata.namespace.as_deref().unwrap_or_default(),
            window.metadata.name.as_deref().unwrap_or_default(),
        );
        self.windows.lock().unwrap().insert(k, window);
    }

    /// Add a Deployment to the mock store (for test setup)
    pub fn add_deployment(&self, deployment: Deployment) {
        let k = key(
            deployment.metadata.namespace.as_deref().unwrap_or_default(),
            deployment.metadata.name.as_deref().unwrap_or_default(),
        );
        self.deployments.lock().unwrap().insert(k, deployment);
    }

    pub fn fail_scaling_window_get(&self, namespace: &str, name: &str) {
        self.failing_window_gets.lock().unwrap().insert(key(namespace, name));
    }

    pub fn fail_deployment_get(&self, namespace: &str, name: &str) {
        self.failing_deployment_gets.lock().unwrap().insert(key(namespace, name));
    }

    pub fn fail_deployment_update(&self, namespace: &str, name: &str) {
        self.failing_deployment_updates.lock().unwrap().insert(key(namespace, name));
    }

    pub fn fail_status_updates(&self) {
        *self.fail_status_updates.lock().unwrap() = true;
    }

    /// Current replicas of a stored Deployment
    pub fn replicas_of(&self, namespace: &str, name: &str) -> Option<i32> {
        self.deployments
            .lock()
            .unwrap()
            .get(&key(namespace, name))
            .and_then(|d| d.spec.as_ref())
            .and_then(|s| s.replicas)
    }

    /// `(namespace, name)` of every Deployment get, in call order
    pub fn deployment_gets(&self) -> Vec<(String, String)> {
        self.deployment_gets.lock().unwrap().clone()
    }

    pub fn deployment_updates(&self) -> Vec<Deployment> {
        self.deployment_updates.lock().unwrap().clone()
    }

    pub fn status_updates(&self) -> Vec<ScalingWindow> {
        self.status_updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClusterClient for MockClusterClient {
    async fn get_scaling_window(&self, namespace: &str, name: &str) -> Result<ScalingWindow, ClusterError> {
        let k = key(namespace, name);
        if self.failing_window_gets.lock().unwrap().contains(&k) {
            return Err(injected_failure("get ScalingWindow"));
        }
        self.windows
            .lock()
            .unwrap()
            .get(&k)
            .cloned()
            .ok_or_else(|| ClusterError::NotFound(format!("ScalingWindow {}/{}", namespace, name)))
    }

    async fn get_deployment(&self, workload: &WorkloadReference) -> Result<Deployment, ClusterError> {
        let k = key(&workload.namespace, &workload.name);
        self.deployment_gets.lock().unwrap().push(k.clone());
        if self.failing_deployment_gets.lock().unwrap().contains(&k) {
            return Err(injected_failure("get Deployment"));
        }
        self.deployments
            .lock()
            .unwrap()
            .get(&k)
            .cloned()
            .ok_or_else(|| ClusterError::NotFound(format!("Deployment {}", workload)))
    }

    async fn update_deployment(&self, deployment: &Deployment) -> Result<Deployment, ClusterError> {
        let k = key(
            deployment.metadata.namespace.as_deref().unwrap_or_default(),
            deployment.metadata.name.as_deref().unwrap_or_default(),
        );
        if self.failing_deployment_updates.lock().unwrap().contains(&k) {
            return Err(injected_failure("update Deployment"));
        }
        self.deployment_updates.lock().unwrap().push(deployment.clone());
        self.deployments.lock().unwrap().insert(k, deployment.clone());
        Ok(deployment.clone())
    }

    async fn update_scaling_window_status(&self, window: &ScalingWindow) -> Result<ScalingWindow, ClusterError> {
        if *self.fail_status_updates.lock().unwrap() {
            return Err(injected_failure("update ScalingWindow status"));
        }
        self.status_updates.lock().unwrap().push(window.clone());
        Ok(window.clone())
    }
}

/// Clock frozen at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Clock frozen at `hour`:30 UTC on an arbitrary day
    pub fn at_hour(hour: u32) -> Self {
        Self(Utc.with_ymd_and_hms(2024, 3, 14, hour, 30, 0).unwrap())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Helper to create test ScalingWindow CRD
pub fn create_test_scaling_window(
    name: &str,
    namespace: &str,
    start: i32,
    end: i32,
    replicas: i32,
    deployments: &[(&str, &str)],
) -> ScalingWindow {
    ScalingWindow {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        spec: ScalingWindowSpec {
            start,
            end,
            replicas,
            deployments: deployments
                .iter()
                .map(|(name, namespace)| WorkloadReference::new(*name, *namespace))
                .collect(),
        },
        status: None,
    }
}

/// Helper to create test Deployment with the given replica count
pub fn create_test_deployment(name: &str, namespace: &str, replicas: Option<i32>) -> Deployment {
    Deployment {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            resource_version: Some("1".to_string()),
            ..Default::default()
        },
        spec: Some(DeploymentSpec {
            replicas,
            ..Default::default()
        }),
        status: None,
    }
}
