//! dessert demo server.
//!
//! Serves a small greeting API to show handler binding end to end:
//!
//! ```text
//! GET  /api/ping                 → 200 "pong"
//! GET  /api/greet/{name}?shout=true → 200 {"greeting": ...}
//! POST /api/echo                 → 201 echo of the JSON or form body
//! ```

use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use dessert::config::{load_config, ServerConfig};
use dessert::lifecycle::signals::forward_ctrl_c;
use dessert::observability::{logging, metrics};
use dessert::{Controller, JsonReply, RequestContext, Server, ServerOptions, Shutdown};

#[derive(Debug, Parser)]
#[command(name = "dessert", version, about = "Demo server for type-directed handler binding")]
struct Cli {
    /// Path to a TOML config file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct GreetPath {
    name: String,
}
dessert::param!(GreetPath: PathParam);

#[derive(Debug, Deserialize)]
struct GreetOptions {
    #[serde(default)]
    shout: bool,
}
dessert::param!(GreetOptions: StructuredData);

#[derive(Debug, Deserialize, Serialize)]
struct Note {
    title: String,
    body: Option<String>,
}
dessert::param!(Note: StructuredData);

#[derive(Debug, Serialize)]
struct Greeting {
    greeting: String,
    request_id: String,
}

async fn greet(ctx: RequestContext, path: GreetPath, options: GreetOptions) -> (u16, JsonReply<Greeting>, Option<anyhow::Error>) {
    let mut greeting = format!("hello, {}", path.name);
    if options.shout {
        greeting = greeting.to_uppercase();
    }
    let reply = Greeting {
        greeting,
        request_id: ctx.request_id().to_owned(),
    };
    (200, JsonReply(reply), None)
}

async fn echo(note: Note) -> Result<(u16, JsonReply<Note>), anyhow::Error> {
    if note.title.is_empty() {
        anyhow::bail!("title must not be empty");
    }
    Ok((201, JsonReply(note)))
}

fn controllers() -> Result<Vec<Controller>, dessert::RegistrationError> {
    let mut api = Controller::base("/api");
    api.get("/ping", || async { (200u16, JsonReply("pong"), None::<anyhow::Error>) })?
        .get("/greet/{name}", greet)?
        .post("/echo", echo)?;
    Ok(vec![api])
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!("dessert v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        max_body_bytes = config.listener.max_body_bytes,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let bind_address = config.listener.bind_address.clone();
    let server = Server::new(ServerOptions {
        controllers: controllers()?,
        config,
        ..Default::default()
    })?;

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    forward_ctrl_c(shutdown.clone());
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
