use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "pomotimer", version, about = "Pomodoro focus timer")]
struct Cli {
    /// Focus length for this launch (e.g. 25m, 90s, 1h). Starts focusing
    /// right away when no timer is in progress; invalid values are ignored.
    #[arg(long, global = true, value_name = "DURATION")]
    duration: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Timer(commands::timer::TimerAction),
    /// Drive the timer in the foreground until it stops running
    Watch,
    /// Completed sessions, streak and XP
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let launch = cli.duration.as_deref();
    let result = match cli.command {
        Commands::Timer(action) => commands::timer::run(action, launch),
        Commands::Watch => commands::watch::run(launch),
        Commands::Stats { json } => commands::stats::run(json),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
