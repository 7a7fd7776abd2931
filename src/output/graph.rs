//! Tree-graph rendering with Unicode box-drawing connectors

use std::io;

use crate::types::{Backends, Route, ServiceRoute};

use super::NOT_FOUND_MARKER;

/// One rendered tree node; children are printed beneath it with connectors
struct Node {
    label: String,
    children: Vec<Node>,
}

impl Node {
    fn new(label: String) -> Self {
        Self {
            label,
            children: Vec::new(),
        }
    }

    /// Tagged label in the `[Tag]  value` form
    fn meta(tag: &str, value: &str) -> Self {
        Self::new(format!("[{}]  {}", tag, value))
    }
}

pub fn render(route: &Route, out: &mut impl io::Write) -> io::Result<()> {
    let root = match route {
        Route::Service(service) => service_node(service),
        Route::Ingress(ingress) => {
            let mut root = Node::meta("Ingress", &ingress.name);

            for rule in &ingress.rules {
                let mut host = Node::new(rule.host.clone());

                for path in &rule.paths {
                    let mut path_node = Node::new(path.path.clone());

                    let service = match &path.service {
                        Some(service) => service_node(service),
                        None => Node::meta(
                            "Service",
                            &format!("{}{}", path.service_name, NOT_FOUND_MARKER),
                        ),
                    };

                    path_node.children.push(service);
                    host.children.push(path_node);
                }

                root.children.push(host);
            }

            root
        }
    };

    writeln!(out, "{}", root.label)?;
    write_children(&root, "", out)
}

fn service_node(service: &ServiceRoute) -> Node {
    let mut node = Node::meta("Service", &service.name);

    match &service.backends {
        Backends::Pods(pods) => {
            for pod in pods {
                node.children.push(Node::meta("Pod", pod));
            }
        }
        Backends::Hostname(hostname) => {
            node.children.push(Node::meta("Hostname", hostname));
        }
    }

    node
}

fn write_children(node: &Node, prefix: &str, out: &mut impl io::Write) -> io::Result<()> {
    let last = node.children.len().saturating_sub(1);

    for (idx, child) in node.children.iter().enumerate() {
        let (connector, continuation) = if idx == last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };

        writeln!(out, "{}{}{}", prefix, connector, child.label)?;
        write_children(child, &format!("{}{}", prefix, continuation), out)?;
    }

    Ok(())
}
