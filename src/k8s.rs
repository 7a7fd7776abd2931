//! Kubernetes client for kuberoute

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use k8s_openapi::api::core::v1::{Pod, Service, ServicePort};
use k8s_openapi::api::networking::v1::{Ingress, IngressRule, IngressServiceBackend};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::Api;
use kube::api::ListParams;
use kube::config::{KubeConfigOptions, Kubeconfig};
use tracing::debug;

use crate::types::{
    BackendPort, IngressInfo, PathInfo, PodInfo, PortBinding, RuleInfo, ServiceInfo, ServiceKind,
};

/// Error surfaced while reading route objects from the cluster
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("{kind} \"{name}\" not found")]
    NotFound { kind: &'static str, name: String },

    #[error("cluster request failed")]
    Api(#[source] kube::Error),
}

impl RouteError {
    /// True for a clean "object does not exist" miss, as opposed to a
    /// transport or authorization failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Map a kube error to the route taxonomy: HTTP 404 becomes a recoverable
/// NotFound, everything else stays fatal.
fn classify(err: kube::Error, kind: &'static str, name: &str) -> RouteError {
    match err {
        kube::Error::Api(api_err) if api_err.code == 404 => RouteError::NotFound {
            kind,
            name: name.to_string(),
        },
        other => RouteError::Api(other),
    }
}

/// Read access to the cluster objects a route is resolved from, scoped to a
/// single namespace
pub trait ClusterClient {
    /// List the pods whose labels match the given selector
    async fn get_pods_by_labels(
        &self,
        selector: &BTreeMap<String, String>,
    ) -> Result<Vec<PodInfo>, RouteError>;

    /// Fetch a single service by name
    async fn get_service_by_name(&self, name: &str) -> Result<ServiceInfo, RouteError>;

    /// Fetch a single ingress by name
    async fn get_ingress_by_name(&self, name: &str) -> Result<IngressInfo, RouteError>;
}

/// Kubernetes client wrapper bound to one namespace
pub struct KubeClient {
    client: kube::Client,
    namespace: String,
}

impl KubeClient {
    /// Connect using the ambient kubeconfig, or a specific context when one
    /// is given
    pub async fn new(namespace: &str, context: Option<&str>) -> Result<Self> {
        let client = match context {
            Some(context_name) => Self::client_for_context(context_name).await?,
            None => kube::Client::try_default()
                .await
                .context("Failed to connect to cluster. Is kubectl configured?")?,
        };

        Ok(Self {
            client,
            namespace: namespace.to_string(),
        })
    }

    /// Create a kube::Client for a specific kubeconfig context
    async fn client_for_context(context_name: &str) -> Result<kube::Client> {
        let kubeconfig =
            Kubeconfig::read().context("Failed to read kubeconfig. Is kubectl configured?")?;

        let config = kube::Config::from_custom_kubeconfig(
            kubeconfig,
            &KubeConfigOptions {
                context: Some(context_name.to_string()),
                ..Default::default()
            },
        )
        .await
        .context(format!(
            "Failed to create config for context: {}",
            context_name
        ))?;

        kube::Client::try_from(config).context(format!(
            "Failed to create client for context: {}",
            context_name
        ))
    }
}

impl ClusterClient for KubeClient {
    async fn get_pods_by_labels(
        &self,
        selector: &BTreeMap<String, String>,
    ) -> Result<Vec<PodInfo>, RouteError> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), &self.namespace);

        let label_selector = selector
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(",");

        debug!(selector = %label_selector, "listing pods");

        let list = pods
            .list(&ListParams::default().labels(&label_selector))
            .await
            .map_err(RouteError::Api)?;

        Ok(list
            .items
            .into_iter()
            .map(|pod| PodInfo {
                name: pod.metadata.name.unwrap_or_default(),
            })
            .collect())
    }

    async fn get_service_by_name(&self, name: &str) -> Result<ServiceInfo, RouteError> {
        let services: Api<Service> = Api::namespaced(self.client.clone(), &self.namespace);

        debug!(service = name, "fetching service");

        let service = services
            .get(name)
            .await
            .map_err(|err| classify(err, "services", name))?;

        Ok(service_info(service))
    }

    async fn get_ingress_by_name(&self, name: &str) -> Result<IngressInfo, RouteError> {
        let ingresses: Api<Ingress> = Api::namespaced(self.client.clone(), &self.namespace);

        debug!(ingress = name, "fetching ingress");

        let ingress = ingresses
            .get(name)
            .await
            .map_err(|err| classify(err, "ingresses", name))?;

        Ok(ingress_info(ingress))
    }
}

/// Convert a k8s Service to ServiceInfo. An unset type means ClusterIP,
/// matching the API server's own defaulting.
fn service_info(service: Service) -> ServiceInfo {
    let name = service.metadata.name.unwrap_or_default();
    let spec = service.spec.unwrap_or_default();

    let kind = spec
        .type_
        .as_deref()
        .map(ServiceKind::from)
        .unwrap_or(ServiceKind::ClusterIP);

    ServiceInfo {
        name,
        kind,
        ports: spec
            .ports
            .unwrap_or_default()
            .iter()
            .map(port_binding)
            .collect(),
        selector: spec.selector.unwrap_or_default(),
        external_name: spec.external_name,
    }
}

/// Convert a k8s ServicePort to a PortBinding. An unset target port defaults
/// to the exposed port, again matching the API server.
fn port_binding(port: &ServicePort) -> PortBinding {
    let target_port = match &port.target_port {
        Some(IntOrString::Int(n)) => BackendPort::Number(*n),
        Some(IntOrString::String(s)) => BackendPort::Name(s.clone()),
        None => BackendPort::Number(port.port),
    };

    PortBinding {
        port: port.port,
        target_port,
        node_port: port.node_port,
    }
}

/// Convert a k8s Ingress to IngressInfo
fn ingress_info(ingress: Ingress) -> IngressInfo {
    let name = ingress.metadata.name.unwrap_or_default();

    let rules = ingress
        .spec
        .and_then(|spec| spec.rules)
        .unwrap_or_default()
        .into_iter()
        .map(rule_info)
        .collect();

    IngressInfo { name, rules }
}

/// Convert one ingress rule. A rule without an HTTP block yields no paths,
/// and paths backed by a Resource reference instead of a Service are skipped.
fn rule_info(rule: IngressRule) -> RuleInfo {
    let host = rule.host.unwrap_or_default();

    let paths = rule
        .http
        .map(|http| http.paths)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|path| match path.backend.service {
            Some(backend) => Some(PathInfo {
                path: path.path.unwrap_or_default(),
                port: backend_port(&backend),
                service_name: backend.name,
            }),
            None => {
                debug!("skipping path with non-service backend");
                None
            }
        })
        .collect();

    RuleInfo { host, paths }
}

fn backend_port(backend: &IngressServiceBackend) -> BackendPort {
    match &backend.port {
        Some(port) => match (&port.number, &port.name) {
            (Some(number), _) => BackendPort::Number(*number),
            (None, Some(name)) => BackendPort::Name(name.clone()),
            (None, None) => BackendPort::Number(0),
        },
        None => BackendPort::Number(0),
    }
}
