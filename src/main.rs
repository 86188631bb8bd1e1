use std::fs;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use teamforge::cli::{
    ConfigCommands, CrewCommands, run_config_set_server, run_config_show, run_crew_categories,
    run_crew_delete, run_crew_edit, run_crew_list, run_crew_new, run_crew_show,
};
use teamforge::config::{SERVER_URL_ENV, ServerConfig};
use teamforge::server::{AppState, create_router};
use teamforge::store::{SqliteStore, Store};

#[derive(Parser)]
#[command(name = "teamforge")]
#[command(about = "A crew roster with live updates", long_about = None)]
struct Cli {
    /// Record store server URL
    #[arg(long, global = true, env = SERVER_URL_ENV)]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the record store server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(long, short, default_value = "8080")]
        port: u16,

        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,
    },

    /// Browse and edit the roster
    Crew {
        #[command(subcommand)]
        command: CrewCommands,
    },

    /// Client configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

async fn run_serve(config: ServerConfig) -> anyhow::Result<()> {
    fs::create_dir_all(&config.data_dir)?;

    let store = SqliteStore::new(config.db_path())?;
    store.initialize()?;
    info!("Database ready at {}", config.db_path().display());

    let store: Arc<dyn Store> = Arc::new(store);
    let state = Arc::new(AppState::new(store.clone()));
    let app = create_router(state);
    let addr = config.socket_addr()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close()?;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl-C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("teamforge=info".parse()?))
        .init();

    let cli = Cli::parse();
    let server = cli.server.as_deref();

    match cli.command {
        Commands::Serve {
            host,
            port,
            data_dir,
        } => {
            run_serve(ServerConfig {
                host,
                port,
                data_dir: data_dir.into(),
            })
            .await?;
        }
        Commands::Crew { command } => match command {
            CrewCommands::List {
                search,
                category,
                json,
                watch,
            } => run_crew_list(server, search, category, json, watch).await?,
            CrewCommands::Show { id, json } => run_crew_show(server, id, json).await?,
            CrewCommands::New {
                fields,
                non_interactive,
            } => run_crew_new(server, fields, non_interactive).await?,
            CrewCommands::Edit {
                id,
                fields,
                non_interactive,
            } => run_crew_edit(server, id, fields, non_interactive).await?,
            CrewCommands::Delete {
                id,
                non_interactive,
                yes,
            } => run_crew_delete(server, id, non_interactive, yes).await?,
            CrewCommands::Categories { json } => run_crew_categories(json)?,
        },
        Commands::Config { command } => match command {
            ConfigCommands::SetServer { url } => run_config_set_server(url)?,
            ConfigCommands::Show => run_config_show(server)?,
        },
    }

    Ok(())
}
