use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxconv::core::Language;
use fxconv::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Display language (en, de, fr, es, it)
    #[arg(short, long, global = true)]
    lang: Option<Language>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Convert an amount between two currencies
    Convert {
        amount: f64,
        from: String,
        to: String,
        /// Fetch fresh rates instead of using cached ones
        #[arg(long)]
        refresh: bool,
        /// Also show one year of price history for the pair
        #[arg(long)]
        history: bool,
    },
    /// List all available exchange rates
    Rates,
    /// Show one year of price history for a currency pair
    History { base: String, target: String },
    /// Start an interactive conversion session
    Interactive,
}

impl From<Commands> for fxconv::AppCommand {
    fn from(cmd: Commands) -> fxconv::AppCommand {
        match cmd {
            Commands::Convert {
                amount,
                from,
                to,
                refresh,
                history,
            } => fxconv::AppCommand::Convert {
                amount,
                from,
                to,
                refresh,
                history,
            },
            Commands::Rates => fxconv::AppCommand::Rates,
            Commands::History { base, target } => fxconv::AppCommand::History { base, target },
            Commands::Interactive => fxconv::AppCommand::Interactive,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fxconv::cli::setup::setup().map(|path| {
            println!("Created default configuration at {}", path.display());
        }),
        Some(cmd) => {
            fxconv::run_command(cmd.into(), cli.config_path.as_deref(), cli.lang).await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
