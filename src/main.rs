//! proposal-node: verification and status runtime for a multi-volume
//! government proposal submission.
//!
//! Provides:
//! - Four verification checks (filenames, page counts, evidence chain,
//!   pricing work split)
//! - A shared JSON document store the checks merge their reports into
//! - Static status dashboards regenerated on demand
//! - An HTTP dispatcher that runs checks and serves the dashboards

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use proposal_node::config::Config;
use proposal_node::server::{create_router, ServerState};
use proposal_node::store::FileStore;
use proposal_node::tasks::{self, TaskContext, TaskId};

#[derive(Parser)]
#[command(name = "proposal-node")]
#[command(about = "Verification and status runtime for a multi-volume proposal submission")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "proposal-node.toml")]
    config: String,

    /// Root directory holding the status documents (overrides config)
    #[arg(short, long, env = "PROPOSAL_ROOT_DIR")]
    root: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the task dispatcher HTTP service
    Serve {
        /// Listen port (overrides config)
        #[arg(short, long, env = "PROPOSAL_PORT")]
        port: Option<u16>,
    },
    /// Run a single verification task; exits 0 on pass, 1 on fail
    Run {
        /// Task identifier, e.g. validate_filenames
        task: String,
    },
    /// Regenerate the static status pages
    Regen,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("proposal_node=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    // Load or create default config
    let mut config = if std::path::Path::new(&cli.config).exists() {
        let content = std::fs::read_to_string(&cli.config)?;
        toml::from_str(&content)?
    } else {
        info!("Config file not found, using defaults");
        Config::default()
    };

    // Apply CLI overrides
    if let Some(root) = cli.root {
        config.paths.root_dir = PathBuf::from(root);
    }

    info!("Root dir: {}", config.root_dir().display());

    let store = Arc::new(FileStore::new(config.root_dir()));
    let config = Arc::new(config);
    let ctx = TaskContext {
        config: config.clone(),
        store,
    };

    match cli.command {
        Command::Serve { port } => {
            let port = port.unwrap_or(config.server.port);
            let site_dir = config.root_dir().to_path_buf();
            let state = ServerState::new(ctx);
            let app = create_router(state, site_dir);

            let addr = SocketAddr::from(([127, 0, 0, 1], port));
            info!("Dispatcher listening on http://{}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
            Ok(())
        }
        Command::Run { task } => {
            let Some(id) = TaskId::parse(&task) else {
                anyhow::bail!(
                    "unknown task {task:?}; expected one of: {}",
                    TaskId::ALL.map(TaskId::name).join(", ")
                );
            };
            exit_with(run_blocking(id, ctx).await)
        }
        Command::Regen => exit_with(run_blocking(TaskId::RegenDashboards, ctx).await),
    }
}

async fn run_blocking(id: TaskId, ctx: TaskContext) -> tasks::TaskOutcome {
    tokio::task::spawn_blocking(move || tasks::run(id, &ctx))
        .await
        .unwrap_or_else(|err| tasks::TaskOutcome {
            ok: false,
            returncode: 1,
            stdout: String::new(),
            stderr: err.to_string(),
            task: id.name(),
        })
}

fn exit_with(outcome: tasks::TaskOutcome) -> ! {
    print!("{}", outcome.stdout);
    if !outcome.stderr.is_empty() {
        eprintln!("{}", outcome.stderr);
    }
    std::process::exit(outcome.returncode)
}
