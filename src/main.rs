use anyhow::Result;
use clap::{Parser, Subcommand};

use phishguard::cli::{self, AnalyzeKind};
use phishguard::{config, logging};

#[derive(Debug, Parser)]
#[command(name = "phishguard")]
#[command(about = "Terminal client for the PhishGuard risk-analysis service")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Log in and store the session
    Login {
        username: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account (does not log in)
    Signup {
        username: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// End the session
    Logout,
    /// Show session state, KPIs, and the last result
    Status,
    /// Score a piece of text or a URL
    Analyze {
        /// Text or URL to analyze
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        input: Vec<String>,
        /// Treat the input as a URL
        #[arg(long, conflicts_with = "text")]
        url: bool,
        /// Treat the input as free text
        #[arg(long)]
        text: bool,
    },
    /// Show the analysis history, most recent first
    History {
        /// Delete the whole history on the server
        #[arg(long)]
        clear: bool,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Show aggregate risk statistics
    Stats,
    /// Refresh history and statistics from the server
    Sync,
    /// Set or toggle the color theme (light, dark)
    Theme { theme: Option<String> },
    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default configuration file
    Init {
        #[arg(long)]
        force: bool,
    },
    /// Set a dotted key, e.g. `server.base_url`
    Set { key: String, value: String },
    /// Print config, store, and log locations
    Path,
}

fn main() -> Result<()> {
    let app = App::parse();
    let cfg = config::load();
    logging::init(config::log_path(&cfg));

    match app.command {
        Commands::Login { username, password } => cli::run_login(&cfg, &username, password),
        Commands::Signup { username, password } => cli::run_signup(&cfg, &username, password),
        Commands::Logout => cli::run_logout(&cfg),
        Commands::Status => cli::run_status(&cfg),
        Commands::Analyze { input, url, text } => {
            let kind = match (url, text) {
                (true, _) => AnalyzeKind::Url,
                (_, true) => AnalyzeKind::Text,
                _ => AnalyzeKind::Auto,
            };
            cli::run_analyze(&cfg, &input.join(" "), kind)
        }
        Commands::History { clear, yes } => cli::run_history(&cfg, clear, yes),
        Commands::Stats => cli::run_stats(&cfg),
        Commands::Sync => cli::run_sync(&cfg),
        Commands::Theme { theme } => cli::run_theme(&cfg, theme.as_deref()),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Path => cli::run_config_path(&cfg),
        },
    }
}
