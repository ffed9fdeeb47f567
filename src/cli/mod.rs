//! Terminal front end: command handlers and rendering.
//!
//! Each `run_*` handler builds a [`PhishGuardClient`] from the resolved
//! config, runs one command, and prints the derived [`UiState`]:
//!
//! - `phishguard login|signup|logout|status`
//! - `phishguard analyze <input> [--url|--text]`
//! - `phishguard history [--clear] [--yes]`, `stats`, `sync`
//! - `phishguard theme [light|dark]`
//! - `phishguard config show|init|set|path`

use std::io::{self, BufRead, Write};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use colored::{Color, Colorize};
use regex::Regex;

use crate::client::PhishGuardClient;
use crate::config::{self, ClientConfig};
use crate::error::ClientError;
use crate::logging;
use crate::present::risk::RiskLevel;
use crate::present::{HistoryRow, Kpis, Notice, NoticeLevel, ResultPanel, UiState};
use crate::store::theme::Theme;
use crate::submit::AnalysisRequest;
use crate::sync::SyncOutcome;

/// A single `http(s)://` URL with no whitespace.
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://\S+$").expect("valid URL regex"));

/// Width of the risk bar in columns.
const BAR_WIDTH: usize = 50;

/// How `phishguard analyze` should treat its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzeKind {
    Auto,
    Text,
    Url,
}

/// Build the request for `input`; `Auto` picks URL analysis for a lone URL.
pub fn build_request(input: &str, kind: AnalyzeKind) -> AnalysisRequest {
    match kind {
        AnalyzeKind::Url => AnalysisRequest::Url(input.trim().to_string()),
        AnalyzeKind::Text => AnalysisRequest::Text(input.to_string()),
        AnalyzeKind::Auto if URL_RE.is_match(input.trim()) => {
            AnalysisRequest::Url(input.trim().to_string())
        }
        AnalyzeKind::Auto => AnalysisRequest::Text(input.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Session commands
// ---------------------------------------------------------------------------

pub fn run_login(cfg: &ClientConfig, username: &str, password: Option<String>) -> Result<()> {
    let client = PhishGuardClient::from_config(cfg)?;
    let password = read_password(password)?;

    let session = client.login(username, &password)?;
    print_notice(&Notice::success(format!("Welcome, {}!", session.username)), client.theme());
    print_auth_line(&client.ui_state());
    Ok(())
}

pub fn run_signup(cfg: &ClientConfig, username: &str, password: Option<String>) -> Result<()> {
    let client = PhishGuardClient::from_config(cfg)?;
    let password = read_password(password)?;

    client.signup(username, &password)?;
    print_notice(
        &Notice::success("User created. Log in to continue."),
        client.theme(),
    );
    Ok(())
}

pub fn run_logout(cfg: &ClientConfig) -> Result<()> {
    let client = PhishGuardClient::from_config(cfg)?;
    if let Err(err) = client.start() {
        report_background(&err, client.theme());
    }
    if !client.session_state().is_logged_in() {
        print_notice(&Notice::info("Not logged in."), client.theme());
        return Ok(());
    }

    client.logout()?;
    print_notice(&Notice::success("Session closed."), client.theme());
    Ok(())
}

pub fn run_status(cfg: &ClientConfig) -> Result<()> {
    let client = open(cfg)?;
    let ui = client.ui_state();

    print_auth_line(&ui);
    if ui.logged_in {
        println!();
        print_kpis(&ui.kpis, ui.theme);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Analysis and resources
// ---------------------------------------------------------------------------

pub fn run_analyze(cfg: &ClientConfig, input: &str, kind: AnalyzeKind) -> Result<()> {
    let client = open(cfg)?;
    let request = build_request(input, kind);

    client.submit(request)?;

    let ui = client.ui_state();
    if let Some(panel) = &ui.result {
        print_result(panel, ui.theme);
        println!();
    }
    print_kpis(&ui.kpis, ui.theme);
    print_notice(&Notice::success("Analysis complete."), ui.theme);
    Ok(())
}

pub fn run_history(cfg: &ClientConfig, clear: bool, yes: bool) -> Result<()> {
    let client = open(cfg)?;

    if clear {
        if !yes && !confirm("Delete the whole history?")? {
            return Ok(());
        }
        client.clear_history()?;
        print_notice(&Notice::success("History cleared."), client.theme());
        return Ok(());
    }

    let ui = client.ui_state();
    if !ui.logged_in {
        return Err(ClientError::Unauthenticated.into());
    }
    print_history(&ui);
    Ok(())
}

pub fn run_stats(cfg: &ClientConfig) -> Result<()> {
    let client = open(cfg)?;
    let ui = client.ui_state();
    if !ui.logged_in {
        return Err(ClientError::Unauthenticated.into());
    }
    print_kpis(&ui.kpis, ui.theme);
    Ok(())
}

pub fn run_sync(cfg: &ClientConfig) -> Result<()> {
    let client = PhishGuardClient::from_config(cfg)?;
    let outcome = client.start()?;
    let theme = client.theme();

    match &outcome {
        SyncOutcome::NoSession => print_notice(&Notice::info("Not logged in."), theme),
        SyncOutcome::Applied(report) => {
            for (name, status) in [("history", &report.history), ("stats", &report.stats)] {
                if let crate::sync::ResourceStatus::Reset(reason) = status {
                    print_notice(
                        &Notice::error(&ClientError::Rejected(format!("{name}: {reason}"))),
                        theme,
                    );
                }
            }
            print_notice(&Notice::success(format!("Sync {outcome}.")), theme);
        }
        SyncOutcome::Superseded => print_notice(&Notice::info("Sync superseded."), theme),
    }
    Ok(())
}

pub fn run_theme(cfg: &ClientConfig, theme: Option<&str>) -> Result<()> {
    let requested = match theme {
        Some(value) => Some(
            Theme::parse(value)
                .with_context(|| format!("unknown theme '{value}', expected light or dark"))?,
        ),
        None => None,
    };

    let client = PhishGuardClient::from_config(cfg)?;
    let theme = client.set_theme(requested)?;
    print_notice(&Notice::success(format!("Theme set to {theme}.")), theme);
    Ok(())
}

// ---------------------------------------------------------------------------
// Config commands
// ---------------------------------------------------------------------------

pub fn run_config_show() -> Result<()> {
    print!("{}", config::show_effective_config()?);
    Ok(())
}

pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!("Wrote {}", path.display());
    Ok(())
}

pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    let path = config::set_config_value(key, value)?;
    println!("Set {key} = {value} in {}", path.display());
    Ok(())
}

pub fn run_config_path(cfg: &ClientConfig) -> Result<()> {
    let show = |label: &str, path: Option<std::path::PathBuf>| {
        let text = path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(unavailable)".to_string());
        println!("  {:<15} {}", label.bold(), text);
    };
    show("Global config:", config::global_config_file());
    show("Project config:", config::project_config_file());
    show("Session store:", config::store_path(cfg));
    show("Log file:", config::log_path(cfg));
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build the client and run startup (restore + sync). Startup failures are
/// shown as notices; the command then runs against whatever state is left.
fn open(cfg: &ClientConfig) -> Result<PhishGuardClient> {
    let client = PhishGuardClient::from_config(cfg)?;
    match client.start() {
        Ok(SyncOutcome::Applied(report)) if !report.is_complete() => {
            logging::warn("cli", "startup sync was partial");
        }
        Ok(_) => {}
        Err(err) => report_background(&err, client.theme()),
    }
    Ok(client)
}

fn report_background(err: &ClientError, theme: Theme) {
    print_notice(&Notice::error(err), theme);
}

fn read_password(flag: Option<String>) -> Result<String> {
    if let Some(password) = flag {
        return Ok(password);
    }
    eprint!("Password: ");
    io::stderr().flush().ok();
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn confirm(question: &str) -> Result<bool> {
    eprint!("{question} [y/N] ");
    io::stderr().flush().ok();
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read confirmation")?;
    Ok(matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn level_color(level: RiskLevel, theme: Theme) -> Color {
    match (level, theme) {
        (RiskLevel::Safe, Theme::Dark) => Color::BrightGreen,
        (RiskLevel::Safe, Theme::Light) => Color::Green,
        (RiskLevel::Warning, Theme::Dark) => Color::BrightYellow,
        (RiskLevel::Warning, Theme::Light) => Color::Yellow,
        (RiskLevel::Danger, Theme::Dark) => Color::BrightRed,
        (RiskLevel::Danger, Theme::Light) => Color::Red,
    }
}

fn heading(text: &str, theme: Theme) -> colored::ColoredString {
    match theme {
        Theme::Dark => text.bold().bright_cyan(),
        Theme::Light => text.bold().blue(),
    }
}

fn print_notice(notice: &Notice, theme: Theme) {
    match notice.level {
        NoticeLevel::Success => println!("{}", notice.message.color(level_color(RiskLevel::Safe, theme))),
        NoticeLevel::Info => println!("{}", notice.message.dimmed()),
        NoticeLevel::Error => eprintln!(
            "{}",
            notice.message.color(level_color(RiskLevel::Danger, theme))
        ),
    }
}

fn print_auth_line(ui: &UiState) {
    if ui.logged_in {
        let badge = if ui.verified { "" } else { " (unverified)" };
        println!(
            "{} {}{}   [{}]",
            "User:".bold(),
            ui.username,
            badge.dimmed(),
            ui.auth_control
        );
    } else {
        println!("{}   [{}]", "Not logged in.".dimmed(), ui.auth_control);
    }
}

fn print_kpis(kpis: &Kpis, theme: Theme) {
    println!("{}", heading("Risk Statistics", theme));
    println!("  {:<12} {}", "Analyses:".bold(), kpis.total);
    println!("  {:<12} {}", "Avg risk:".bold(), kpis.avg_risk);
    println!(
        "  {:<12} {}",
        "Safe:".bold(),
        kpis.safe.color(level_color(RiskLevel::Safe, theme))
    );
    println!(
        "  {:<12} {}",
        "Suspicious:".bold(),
        kpis.suspicious.color(level_color(RiskLevel::Warning, theme))
    );
    println!(
        "  {:<12} {}",
        "Phishing:".bold(),
        kpis.phishing.color(level_color(RiskLevel::Danger, theme))
    );
}

fn print_history(ui: &UiState) {
    println!("{}", heading("History", ui.theme));
    if let Some(placeholder) = ui.history_placeholder() {
        println!("  {}", placeholder.dimmed());
        return;
    }
    for row in &ui.history {
        print_history_row(row, ui.theme);
    }
}

fn print_history_row(row: &HistoryRow, theme: Theme) {
    println!(
        "  {:<4} {:<12} {}",
        row.kind.to_string().dimmed(),
        row.verdict.color(level_color(row.tone, theme)).bold(),
        row.timestamp.dimmed()
    );
    println!("       {}", row.input);
}

fn print_result(panel: &ResultPanel, theme: Theme) {
    let color = level_color(panel.level, theme);
    let bg = panel.background;
    println!(
        "{}",
        format!(" {} ", panel.verdict)
            .bold()
            .black()
            .on_truecolor(bg.r, bg.g, bg.b)
    );
    for reason in &panel.reasons {
        println!("  {reason}");
    }
    for finding in &panel.url_findings {
        println!("  {} {}", "url".dimmed(), finding);
    }
    for provider in &panel.providers {
        println!("  {} {}", "via".dimmed(), provider);
    }

    let column = ((panel.arrow_position / 100.0) * (BAR_WIDTH - 1) as f64).round() as usize;
    println!("  {}{}", " ".repeat(column), "▼".color(color));
    println!("  {}", risk_bar());
    println!("  {}", panel.label.color(color).bold());
}

/// Bar colored along the same gradient as the result background.
fn risk_bar() -> String {
    (0..BAR_WIDTH)
        .map(|i| {
            let p = i as f64 / (BAR_WIDTH - 1) as f64 * 100.0;
            let rgb = crate::present::risk::risk_gradient(p);
            "█".truecolor(rgb.r, rgb.g, rgb.b).to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_detects_lone_url() {
        assert_eq!(
            build_request("  http://sospechoso.com/login ", AnalyzeKind::Auto),
            AnalysisRequest::Url("http://sospechoso.com/login".to_string())
        );
        assert_eq!(
            build_request("HTTPS://Example.com", AnalyzeKind::Auto),
            AnalysisRequest::Url("HTTPS://Example.com".to_string())
        );
    }

    #[test]
    fn text_with_embedded_url_stays_text() {
        let input = "URGENTE: verifique su cuenta en http://phishing-example.com/login";
        assert_eq!(
            build_request(input, AnalyzeKind::Auto),
            AnalysisRequest::Text(input.to_string())
        );
    }

    #[test]
    fn explicit_kind_wins() {
        assert_eq!(
            build_request("http://a.io", AnalyzeKind::Text),
            AnalysisRequest::Text("http://a.io".to_string())
        );
        assert_eq!(
            build_request("a.io", AnalyzeKind::Url),
            AnalysisRequest::Url("a.io".to_string())
        );
    }

    #[test]
    fn palette_depends_on_theme() {
        assert_eq!(level_color(RiskLevel::Danger, Theme::Dark), Color::BrightRed);
        assert_eq!(level_color(RiskLevel::Danger, Theme::Light), Color::Red);
    }
}
