mod k8s;
mod output;
mod route;
mod types;

use anyhow::Result;
use clap::{Parser, ValueEnum};

use crate::k8s::KubeClient;
use crate::output::OutputFormat;
use crate::route::Resolver;
use crate::types::Route;

const EXAMPLES: &str = "\
Examples:
  # View the route information of the service my-service
  kubectl route-info service my-service

  # View the route information of the ingress my-ingress in namespace my-namespace
  kubectl route-info ingress my-ingress --namespace my-namespace";

/// View route information from ingresses or services to pods
#[derive(Parser, Debug)]
#[command(name = "kubectl route-info")]
#[command(author, version, about, long_about = None, after_help = EXAMPLES)]
struct Args {
    /// Kind of object to resolve the route from
    #[arg(value_name = "TYPE")]
    resource: ResourceKind,

    /// Name of the ingress or service
    #[arg(value_name = "NAME")]
    name: String,

    /// Namespace to look the objects up in
    #[arg(short, long, default_value = "default")]
    namespace: String,

    /// Print the route information in a tree graph format
    #[arg(long)]
    graph: bool,

    /// Kubeconfig context to use instead of the current one
    #[arg(long)]
    context: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ResourceKind {
    Ingress,
    Service,
}

fn parse_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // clap exits with 2 on usage errors; kubectl plugins report 1
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            std::process::exit(code);
        }
    }
}

#[tokio::main]
async fn main() {
    let args = parse_args();

    // Initialize tracing for debugging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(args).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let client = KubeClient::new(&args.namespace, args.context.as_deref()).await?;
    let resolver = Resolver::new(client);

    let route = match args.resource {
        ResourceKind::Ingress => Route::Ingress(resolver.resolve_ingress(&args.name).await?),
        ResourceKind::Service => Route::Service(resolver.resolve_service(&args.name).await?),
    };

    let format = if args.graph {
        OutputFormat::Graph
    } else {
        OutputFormat::Table
    };

    output::render(&route, format, &mut std::io::stdout())?;

    Ok(())
}
