//! platform-provider - drive lifecycle and stage resources from the command line

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod display;
mod error;
mod exit_codes;

#[derive(Parser)]
#[command(name = "platform-provider")]
#[command(version)]
#[command(about = "Manage artifact platform lifecycles and lifecycle stages", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalArgs,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Platform base URL
    #[arg(long, env = "PLATFORM_URL", global = true)]
    pub url: Option<String>,

    /// Access token sent as a bearer token
    #[arg(long, env = "PLATFORM_ACCESS_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Access component version (skips discovery)
    #[arg(long, env = "PLATFORM_ACCESS_VERSION", global = true)]
    pub access_version: Option<String>,

    /// Platform version (skips discovery)
    #[arg(long, global = true)]
    pub platform_version: Option<String>,

    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,

    /// Machine-readable JSON output
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List resource types
    Types,

    /// Print the schema of a resource type
    Schema {
        /// Resource type (e.g. platform_lifecycle)
        resource_type: String,
    },

    /// Validate a configuration file
    Validate {
        resource_type: String,

        /// Configuration file (JSON object)
        config: PathBuf,
    },

    /// Show what apply would do
    Plan {
        resource_type: String,

        /// Configuration file (JSON object)
        config: PathBuf,

        /// Prior state file
        #[arg(long)]
        state: Option<PathBuf>,
    },

    /// Create, update or replace a resource
    Apply {
        resource_type: String,

        /// Configuration file (JSON object)
        config: PathBuf,

        /// State file to read and write (state goes to stdout if not set)
        #[arg(long)]
        state: Option<PathBuf>,
    },

    /// Refresh a state file from the platform
    Refresh {
        resource_type: String,

        /// State file
        #[arg(long)]
        state: PathBuf,
    },

    /// Import an existing resource
    Import {
        resource_type: String,

        /// Import identifier: `name[:project_key]` for stages, `project_key` or "" for lifecycles
        id: String,

        /// State file to write (state goes to stdout if not set)
        #[arg(long)]
        state: Option<PathBuf>,
    },

    /// Delete a resource and its state file
    Destroy {
        resource_type: String,

        /// State file
        #[arg(long)]
        state: PathBuf,
    },
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.global.debug);

    let global = cli.global;
    let result = match cli.command {
        Commands::Types => commands::types::run(&global).await,
        Commands::Schema { resource_type } => commands::schema::run(&global, &resource_type).await,
        Commands::Validate {
            resource_type,
            config,
        } => commands::validate::run(&global, &resource_type, &config).await,
        Commands::Plan {
            resource_type,
            config,
            state,
        } => commands::plan::run(&global, &resource_type, &config, state.as_deref()).await,
        Commands::Apply {
            resource_type,
            config,
            state,
        } => commands::apply::run(&global, &resource_type, &config, state.as_deref()).await,
        Commands::Refresh {
            resource_type,
            state,
        } => commands::refresh::run(&global, &resource_type, &state).await,
        Commands::Import {
            resource_type,
            id,
            state,
        } => commands::import::run(&global, &resource_type, &id, state.as_deref()).await,
        Commands::Destroy {
            resource_type,
            state,
        } => commands::destroy::run(&global, &resource_type, &state).await,
    };

    let code = match result {
        Ok(()) => exit_codes::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            code
        }
    };
    std::process::exit(code);
}
