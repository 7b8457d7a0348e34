use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "puzzlegate", version, about = "Puzzlegate CLI")]
struct Cli {
    /// Config file (defaults to ~/.config/puzzlegate/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a session, one command per line on stdin
    Play,
    /// Run a single volume challenge over a list of readings
    Challenge(commands::challenge::ChallengeArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config_path = cli.config.as_deref();
    let result = match cli.command {
        Commands::Play => commands::play::run(config_path),
        Commands::Challenge(args) => commands::challenge::run(config_path, args),
        Commands::Config { action } => commands::config::run(config_path, action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
