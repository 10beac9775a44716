use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use kimaisync_core::Overrides;

mod commands;
mod prompt;

#[derive(Parser)]
#[command(
    name = "kimaisync",
    version,
    about = "Copy finished timesheets from one Kimai installation to another"
)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Config file (defaults to ~/.config/kimaisync/kimaisync.toml)
    #[arg(short = 'c', long, global = true)]
    config_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Fail instead of asking for missing settings or mappings
    #[arg(short, long, global = true)]
    non_interactive: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Connection settings; given values replace the stored ones.
#[derive(Args)]
struct ConnectionArgs {
    /// Source Kimai URL
    #[arg(long, alias = "source_url", global = true)]
    source_url: Option<String>,
    /// Source API token
    #[arg(long, alias = "source_apikey", global = true)]
    source_apikey: Option<String>,
    /// Source customer name
    #[arg(long, alias = "source_customer", global = true)]
    source_customer: Option<String>,
    /// Destination Kimai URL
    #[arg(long, alias = "destination_url", global = true)]
    destination_url: Option<String>,
    /// Destination API token
    #[arg(long, alias = "destination_apikey", global = true)]
    destination_apikey: Option<String>,
}

impl From<ConnectionArgs> for Overrides {
    fn from(args: ConnectionArgs) -> Self {
        Overrides {
            source_url: args.source_url,
            source_apikey: args.source_apikey,
            source_customer: args.source_customer,
            destination_url: args.destination_url,
            destination_apikey: args.destination_apikey,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Transfer new finished timesheets (default)
    Sync,
    /// Show the stored configuration with tokens masked
    Status,
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let store = commands::store(cli.config_file);
    let result = match cli.command.unwrap_or(Commands::Sync) {
        Commands::Sync => commands::sync::run(&store, cli.connection.into(), cli.non_interactive),
        Commands::Status => commands::status::run(&store),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
