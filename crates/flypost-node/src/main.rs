mod shell;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use flypost::{Node, NodeConfig};

use shell::Shell;

#[derive(Parser)]
#[command(name = "flypost")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Peer-to-peer bulletin board node", long_about = None)]
struct Args {
    /// Listening port, overriding the config file
    #[arg(short, long)]
    port: Option<u16>,

    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Do not listen for peers, pull only
    #[arg(long)]
    no_listen: bool,
}

impl Args {
    fn node_config(&self) -> Result<NodeConfig> {
        let mut config = match &self.config {
            Some(path) => NodeConfig::load(path)?,
            None => NodeConfig::default(),
        };
        if let Some(port) = self.port {
            config.listen_port = port;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()))
        .init();

    let args = Args::parse();
    let config = args.node_config()?;

    let node = Node::new(config);
    println!("node id: ({}) : {}", node.fingerprint(), node.node_id());

    let server = if args.no_listen {
        println!("not listening, pull only");
        None
    } else {
        let handle = node.serve().await?;
        println!("listening on {}", handle.local_addr());
        Some(handle)
    };
    println!("/h lists commands");

    shell::run(Shell::new(node, server)).await
}
