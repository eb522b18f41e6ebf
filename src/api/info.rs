//! `GET /` — service banner with cluster metadata.

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::state::{timestamp, AppState};

/// Cluster identifier reported on `/`.
pub const CLUSTER: &str = "devops-project-3";

/// Capabilities this deployment is meant to demonstrate.
pub const FEATURES: [&str; 6] = [
    "EKS cluster deployment",
    "Kubernetes pods and services",
    "Helm package management",
    "Horizontal Pod Autoscaling",
    "Ingress controller",
    "Rolling deployments",
];

pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let config = &state.config;
    Json(json!({
        "message": "Hello from DevOps Project 3 - Kubernetes!",
        "hostname": state.process.hostname(),
        "timestamp": timestamp(),
        "version": config.version,
        "project": super::PROJECT,
        "features": FEATURES,
        "kubernetes_info": {
            "namespace": config.kubernetes.namespace,
            "pod_name": config.kubernetes.pod_name,
            "node_name": config.kubernetes.node_name,
            "cluster": CLUSTER,
        },
    }))
}
