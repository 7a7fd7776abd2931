//! Route resolution: walking ingresses to services and services to pods

use tracing::debug;

use crate::k8s::{ClusterClient, RouteError};
use crate::types::{Backends, IngressRoute, PathRule, Rule, ServiceKind, ServiceRoute};

/// Resolves ingress and service routes against a cluster accessor
pub struct Resolver<C> {
    client: C,
}

impl<C: ClusterClient> Resolver<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Resolve a service down to its backing pods, or to its external
    /// hostname for ExternalName services. Pod names keep the listing order
    /// returned by the cluster.
    pub async fn resolve_service(&self, name: &str) -> Result<ServiceRoute, RouteError> {
        let service = self.client.get_service_by_name(name).await?;

        let backends = if service.kind == ServiceKind::ExternalName {
            Backends::Hostname(service.external_name.unwrap_or_default())
        } else {
            let pods = self.client.get_pods_by_labels(&service.selector).await?;
            Backends::Pods(pods.into_iter().map(|pod| pod.name).collect())
        };

        debug!(service = %service.name, "resolved service");

        Ok(ServiceRoute {
            name: service.name,
            kind: service.kind,
            ports: service.ports,
            backends,
        })
    }

    /// Resolve an ingress and every service behind its rules, in declaration
    /// order. A backend service that does not exist is recorded as unresolved
    /// rather than failing the whole route; transport errors abort
    /// immediately.
    pub async fn resolve_ingress(&self, name: &str) -> Result<IngressRoute, RouteError> {
        let ingress = self.client.get_ingress_by_name(name).await?;

        let mut rules = Vec::with_capacity(ingress.rules.len());

        for rule in ingress.rules {
            let mut paths = Vec::with_capacity(rule.paths.len());

            for path in rule.paths {
                let service = match self.resolve_service(&path.service_name).await {
                    Ok(service) => Some(service),
                    Err(err) if err.is_not_found() => {
                        debug!(service = %path.service_name, "backend service not found");
                        None
                    }
                    Err(err) => return Err(err),
                };

                paths.push(PathRule {
                    path: path.path,
                    service_name: path.service_name,
                    port: path.port,
                    service,
                });
            }

            rules.push(Rule {
                host: rule.host,
                paths,
            });
        }

        Ok(IngressRoute {
            name: ingress.name,
            rules,
        })
    }
}
