//! Shared types for kuberoute
//!
//! Two layers live here: the simplified views of cluster objects returned by
//! the accessor (`*Info`), and the resolved route tree produced by the
//! resolver and consumed by both formatters.

use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Cluster Object Views
// ============================================================================

/// Pod reference; only the name is displayed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PodInfo {
    pub name: String,
}

/// Service type as reported by the cluster
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServiceKind {
    ClusterIP,
    NodePort,
    LoadBalancer,
    ExternalName,
    Unknown,
}

impl ServiceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClusterIP => "ClusterIP",
            Self::NodePort => "NodePort",
            Self::LoadBalancer => "LoadBalancer",
            Self::ExternalName => "ExternalName",
            Self::Unknown => "Unknown",
        }
    }
}

impl From<&str> for ServiceKind {
    fn from(s: &str) -> Self {
        match s {
            "ClusterIP" => Self::ClusterIP,
            "NodePort" => Self::NodePort,
            "LoadBalancer" => Self::LoadBalancer,
            "ExternalName" => Self::ExternalName,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Port reference as declared on the wire: numeric or named.
/// The discriminant is the declared kind, not the value's shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendPort {
    Number(i32),
    Name(String),
}

impl fmt::Display for BackendPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// One exposed port of a service
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortBinding {
    pub port: i32,
    pub target_port: BackendPort,
    pub node_port: Option<i32>,
}

/// Simplified view of a Service object
#[derive(Clone, Debug)]
pub struct ServiceInfo {
    pub name: String,
    pub kind: ServiceKind,
    pub ports: Vec<PortBinding>,
    pub selector: BTreeMap<String, String>,
    pub external_name: Option<String>,
}

/// Simplified view of an Ingress object
#[derive(Clone, Debug)]
pub struct IngressInfo {
    pub name: String,
    pub rules: Vec<RuleInfo>,
}

/// One host rule of an Ingress
#[derive(Clone, Debug)]
pub struct RuleInfo {
    pub host: String,
    pub paths: Vec<PathInfo>,
}

/// One HTTP path entry of an Ingress rule
#[derive(Clone, Debug)]
pub struct PathInfo {
    pub path: String,
    pub service_name: String,
    pub port: BackendPort,
}

// ============================================================================
// Resolved Routes
// ============================================================================

/// A fully resolved route, ready for rendering
#[derive(Clone, Debug)]
pub enum Route {
    Service(ServiceRoute),
    Ingress(IngressRoute),
}

/// What a service routes to: backing pods, or an external hostname for
/// ExternalName services
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Backends {
    Pods(Vec<String>),
    Hostname(String),
}

/// Resolved view of a service and its backends
#[derive(Clone, Debug)]
pub struct ServiceRoute {
    pub name: String,
    pub kind: ServiceKind,
    pub ports: Vec<PortBinding>,
    pub backends: Backends,
}

impl ServiceRoute {
    /// Format the port list as comma-joined `<port> <targetPort>` entries.
    /// The node port is appended for any kind but ClusterIP.
    pub fn ports_string(&self) -> String {
        self.ports
            .iter()
            .map(|binding| {
                let mut entry = format!("{} {}", binding.port, binding.target_port);

                if self.kind != ServiceKind::ClusterIP {
                    if let Some(node_port) = binding.node_port {
                        entry.push(' ');
                        entry.push_str(&node_port.to_string());
                    }
                }

                entry
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Format the backends as a comma-joined pod list or the external hostname
    pub fn backends_string(&self) -> String {
        match &self.backends {
            Backends::Pods(pods) => pods.join(","),
            Backends::Hostname(hostname) => hostname.clone(),
        }
    }
}

/// Resolved view of an ingress and the services behind its rules
#[derive(Clone, Debug)]
pub struct IngressRoute {
    pub name: String,
    pub rules: Vec<Rule>,
}

impl IngressRoute {
    /// True if any resolved backend is an ExternalName service
    pub fn has_external_backend(&self) -> bool {
        self.rules.iter().any(|rule| {
            rule.paths.iter().any(|path| {
                matches!(&path.service, Some(service) if service.kind == ServiceKind::ExternalName)
            })
        })
    }
}

/// One host rule of a resolved ingress. An empty host matches any host.
#[derive(Clone, Debug)]
pub struct Rule {
    pub host: String,
    pub paths: Vec<PathRule>,
}

/// One path entry of a resolved ingress rule. `service` is `None` when the
/// declared backend does not exist in the namespace.
#[derive(Clone, Debug)]
pub struct PathRule {
    pub path: String,
    pub service_name: String,
    pub port: BackendPort,
    pub service: Option<ServiceRoute>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ports_string_cluster_ip() {
        let route = ServiceRoute {
            name: "web".to_string(),
            kind: ServiceKind::ClusterIP,
            ports: vec![
                PortBinding {
                    port: 80,
                    target_port: BackendPort::Number(80),
                    node_port: None,
                },
                PortBinding {
                    port: 443,
                    target_port: BackendPort::Name("https".to_string()),
                    node_port: None,
                },
            ],
            backends: Backends::Pods(Vec::new()),
        };

        assert_eq!(route.ports_string(), "80 80,443 https");
    }

    #[test]
    fn test_ports_string_hides_node_port_for_cluster_ip() {
        let route = ServiceRoute {
            name: "web".to_string(),
            kind: ServiceKind::ClusterIP,
            ports: vec![PortBinding {
                port: 80,
                target_port: BackendPort::Number(80),
                node_port: Some(30080),
            }],
            backends: Backends::Pods(Vec::new()),
        };

        assert_eq!(route.ports_string(), "80 80");
    }

    #[test]
    fn test_ports_string_node_port() {
        let route = ServiceRoute {
            name: "web".to_string(),
            kind: ServiceKind::NodePort,
            ports: vec![PortBinding {
                port: 80,
                target_port: BackendPort::Name("http".to_string()),
                node_port: Some(1234),
            }],
            backends: Backends::Pods(Vec::new()),
        };

        assert_eq!(route.ports_string(), "80 http 1234");
    }

    #[test]
    fn test_backends_string() {
        let pods = Backends::Pods(vec!["pod-a".to_string(), "pod-b".to_string()]);
        let route = ServiceRoute {
            name: "web".to_string(),
            kind: ServiceKind::ClusterIP,
            ports: Vec::new(),
            backends: pods,
        };
        assert_eq!(route.backends_string(), "pod-a,pod-b");

        let external = ServiceRoute {
            name: "alias".to_string(),
            kind: ServiceKind::ExternalName,
            ports: Vec::new(),
            backends: Backends::Hostname("my.external.app.com".to_string()),
        };
        assert_eq!(external.backends_string(), "my.external.app.com");
    }

    #[test]
    fn test_service_kind_round_trip() {
        assert_eq!(ServiceKind::from("NodePort"), ServiceKind::NodePort);
        assert_eq!(ServiceKind::from("NodePort").as_str(), "NodePort");
        assert_eq!(ServiceKind::from("Headless"), ServiceKind::Unknown);
    }

    #[test]
    fn test_has_external_backend() {
        let external = ServiceRoute {
            name: "alias".to_string(),
            kind: ServiceKind::ExternalName,
            ports: Vec::new(),
            backends: Backends::Hostname("my.external.app.com".to_string()),
        };

        let mut route = IngressRoute {
            name: "ing".to_string(),
            rules: vec![Rule {
                host: String::new(),
                paths: vec![PathRule {
                    path: "/".to_string(),
                    service_name: "ghost-svc".to_string(),
                    port: BackendPort::Number(80),
                    service: None,
                }],
            }],
        };
        assert!(!route.has_external_backend());

        route.rules[0].paths.push(PathRule {
            path: "/ext".to_string(),
            service_name: "alias".to_string(),
            port: BackendPort::Number(80),
            service: Some(external),
        });
        assert!(route.has_external_backend());
    }
}
