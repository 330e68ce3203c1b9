//! mirrormind CLI - companion chat for a journaling app.

use clap::{Parser, Subcommand};
use mirrormind::cli;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Get the version string.
///
/// - Release builds (on a git tag): "0.1.0"
/// - Development builds: "0.1.0-dev (abc1234)"
/// - Dirty working directory: "0.1.0-dev (abc1234-dirty)"
fn version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("MIRRORMIND_GIT_HASH");
    const IS_RELEASE: &str = env!("MIRRORMIND_IS_RELEASE");

    static VERSION_STRING: std::sync::OnceLock<String> = std::sync::OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" {
            VERSION.to_string()
        } else {
            format!("{VERSION}-dev ({GIT_HASH})")
        }
    })
}

#[derive(Parser)]
#[command(name = "mirrormind")]
#[command(author, version = version(), about = "Companion chat for your journal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat interactively. Type /quit or press Ctrl-D to leave.
    Chat {
        /// User id (defaults to MIRRORMIND_USER_ID or [user] id in config).
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Send a single message and print the companion's reply.
    Say {
        /// Message text.
        text: String,

        /// User id (defaults to MIRRORMIND_USER_ID or [user] id in config).
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Show the stored conversation.
    History {
        /// User id (defaults to MIRRORMIND_USER_ID or [user] id in config).
        #[arg(short, long)]
        user: Option<String>,

        /// Print the raw message array as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show which reply rule answers a message, without storing anything.
    Reply {
        /// Message text.
        text: String,

        /// Messages in the conversation before the reply. Defaults to 2.
        #[arg(short, long, default_value = "2")]
        length: usize,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("MIRRORMIND_LOG").unwrap_or_else(|_| "warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Commands::Chat { user } => cli::chat::run(user.as_deref()),
        Commands::Say { text, user } => cli::say::run(&text, user.as_deref()),
        Commands::History { user, json } => cli::history::run(user.as_deref(), json),
        Commands::Reply { text, length } => cli::reply::run(&text, length),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("mirrormind: error: {e}");
            ExitCode::FAILURE
        }
    }
}
