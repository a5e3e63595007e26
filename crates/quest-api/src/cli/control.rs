//! Operator dashboard for the external article scheduler.
//!
//! Every action maps onto [`SchedulerSupervisor`] (process control) or
//! [`ArticleReader`] (published articles). Database problems never abort a
//! command: they are printed as a status line and the view falls back to
//! empty lists and zero counts.

use anyhow::Result;
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Select;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

use quest_infra::postgres::articles::ArticleReader;
use quest_infra::scheduler::supervisor::{ControlCommand, SchedulerSupervisor};
use quest_types::config::DashboardConfig;
use quest_types::dashboard::{ArticleStats, ArticleSummary, ControlOutcome, SchedulerState};
use quest_types::error::RepositoryError;

/// Scheduler control subcommands.
#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ControlAction {
    /// Show scheduler state, article counts and estimated cost.
    Status,
    /// Launch the scheduler in the background.
    Start,
    /// Terminate the running scheduler.
    Stop,
    /// Ask the scheduler to skip generation until resumed.
    Pause,
    /// Remove the pause marker.
    Resume,
    /// List recently published articles.
    Articles {
        /// Number of articles to show.
        #[arg(short, long, default_value = "20")]
        limit: u32,
    },
    /// Article counts for all time, 24 hours, 7 days and 30 days.
    Stats,
    /// Show the tail of the scheduler log.
    Logs {
        /// Number of lines to show.
        #[arg(short = 'n', long, default_value = "50")]
        lines: usize,
    },
    /// Dry-run one generation through the control script.
    Test,
    /// Generate and publish a single article.
    Once,
    /// Interactive menu that keeps the launched scheduler attached.
    Console,
}

/// Process control plus article access for one scheduler directory.
pub struct Dashboard {
    supervisor: SchedulerSupervisor,
    articles: ArticleReader,
    base_url: String,
    cost_per_article: f64,
}

impl Dashboard {
    pub fn new(
        supervisor: SchedulerSupervisor,
        articles: ArticleReader,
        base_url: impl Into<String>,
        cost_per_article: f64,
    ) -> Self {
        Self {
            supervisor,
            articles,
            base_url: base_url.into(),
            cost_per_article,
        }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        let articles = ArticleReader::from_config(config).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "article database unavailable");
            ArticleReader::Unconfigured
        });
        Self::new(
            SchedulerSupervisor::from_config(config),
            articles,
            config.article_base_url.clone(),
            config.cost_per_article,
        )
    }

    /// Stats, or zeros plus the message to show when the query failed.
    async fn stats(&self) -> (ArticleStats, Option<String>) {
        or_report(self.articles.stats().await)
    }

    async fn recent(&self, limit: u32) -> (Vec<ArticleSummary>, Option<String>) {
        or_report(self.articles.recent(i64::from(limit)).await)
    }

    async fn status_json(&self) -> serde_json::Value {
        let (stats, error) = self.stats().await;
        json!({
            "state": self.supervisor.state(),
            "pid": self.supervisor.running_pid(),
            "paused": self.supervisor.is_paused(),
            "stats": stats,
            "estimated_cost": ArticleStats::cost(stats.total, self.cost_per_article),
            "per_day_average": stats.per_day_average(),
            "error": error,
        })
    }
}

fn or_report<T: Default>(result: Result<T, RepositoryError>) -> (T, Option<String>) {
    match result {
        Ok(value) => (value, None),
        Err(RepositoryError::Connection) => (
            T::default(),
            Some("Article database not configured (set DATABASE_URL)".to_string()),
        ),
        Err(e) => (T::default(), Some(format!("Database error: {e}"))),
    }
}

/// Run one control action.
pub async fn handle_control(action: ControlAction, config: &DashboardConfig, json: bool) -> Result<()> {
    let dashboard = Dashboard::from_config(config);
    if let ControlAction::Console = action {
        return run_console(&dashboard).await;
    }
    run_action(&dashboard, action, json).await
}

async fn run_action(dashboard: &Dashboard, action: ControlAction, json: bool) -> Result<()> {
    match action {
        ControlAction::Status => show_status(dashboard, json).await,
        ControlAction::Start => print_outcome("start", &dashboard.supervisor.start(), json),
        ControlAction::Stop => print_outcome("stop", &dashboard.supervisor.stop().await, json),
        ControlAction::Pause => print_outcome("pause", &dashboard.supervisor.pause(), json),
        ControlAction::Resume => print_outcome("resume", &dashboard.supervisor.resume(), json),
        ControlAction::Articles { limit } => show_articles(dashboard, limit, json).await,
        ControlAction::Stats => show_stats(dashboard, json).await,
        ControlAction::Logs { lines } => show_logs(dashboard, lines, json),
        ControlAction::Test => run_control_script(dashboard, ControlCommand::Test, json).await,
        ControlAction::Once => run_control_script(dashboard, ControlCommand::Once, json).await,
        ControlAction::Console => Ok(()),
    }
}

fn print_outcome(action: &str, outcome: &ControlOutcome, json: bool) -> Result<()> {
    if json {
        let body = json!({
            "action": action,
            "success": outcome.success,
            "message": outcome.message,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    if outcome.success {
        println!("  {} {}", style("✓").green().bold(), outcome.message);
    } else {
        println!("  {} {}", style("✗").red().bold(), outcome.message);
    }
    Ok(())
}

fn print_db_error(error: Option<&str>) {
    if let Some(message) = error {
        println!("  {} {}", style("!").yellow().bold(), style(message).yellow());
    }
}

fn styled_state(state: SchedulerState) -> console::StyledObject<String> {
    let text = state.to_string();
    match state {
        SchedulerState::Running => style(text).green().bold(),
        SchedulerState::Paused => style(text).yellow().bold(),
        SchedulerState::Stopped => style(text).red().bold(),
    }
}

async fn show_status(dashboard: &Dashboard, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&dashboard.status_json().await)?);
        return Ok(());
    }

    let state = dashboard.supervisor.state();
    let (stats, error) = dashboard.stats().await;

    println!();
    println!("  {} Article scheduler", style("⚡").bold());
    println!();
    println!("  {}", style("── Scheduler ──").dim());
    println!("  State: {}", styled_state(state));
    if let Some(pid) = dashboard.supervisor.running_pid() {
        println!("  PID:   {pid}");
    }
    println!("  Dir:   {}", style(dashboard.supervisor.dir().display()).dim());
    println!();

    println!("  {}", style("── Articles ──").dim());
    print_db_error(error.as_deref());
    println!("  Total:      {}", style(stats.total).bold());
    println!("  Today:      {}", stats.today);
    println!("  This week:  {}", stats.this_week);
    println!("  This month: {}", stats.this_month);
    println!("  Per day:    {:.1}", stats.per_day_average());
    println!(
        "  Est. cost:  {}",
        style(format!(
            "${:.2}",
            ArticleStats::cost(stats.total, dashboard.cost_per_article)
        ))
        .cyan()
    );
    println!();
    Ok(())
}

async fn show_stats(dashboard: &Dashboard, json: bool) -> Result<()> {
    let (stats, error) = dashboard.stats().await;

    if json {
        let body = json!({ "stats": stats, "error": error });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    print_db_error(error.as_deref());
    println!("{}", stats_table(&stats, dashboard.cost_per_article));
    Ok(())
}

fn stats_table(stats: &ArticleStats, cost_per_article: f64) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Window").fg(Color::White),
        Cell::new("Articles").fg(Color::White),
        Cell::new("Est. cost").fg(Color::White),
    ]);

    for (label, count) in [
        ("All time", stats.total),
        ("24 hours", stats.today),
        ("7 days", stats.this_week),
        ("30 days", stats.this_month),
    ] {
        table.add_row(vec![
            Cell::new(label),
            Cell::new(count),
            Cell::new(format!("${:.2}", ArticleStats::cost(count, cost_per_article))),
        ]);
    }
    table
}

async fn show_articles(dashboard: &Dashboard, limit: u32, json: bool) -> Result<()> {
    let (articles, error) = dashboard.recent(limit).await;

    if json {
        let rows: Vec<_> = articles
            .iter()
            .map(|a| {
                json!({
                    "title": a.title,
                    "slug": a.slug,
                    "role": a.role,
                    "company": a.company,
                    "salary": a.salary,
                    "published_at": a.published_at,
                    "link": a.link(&dashboard.base_url),
                })
            })
            .collect();
        let body = json!({ "articles": rows, "error": error });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    print_db_error(error.as_deref());
    if articles.is_empty() {
        println!("  {}", style("No articles published yet.").dim());
        return Ok(());
    }
    println!("{}", articles_table(&articles, &dashboard.base_url));
    Ok(())
}

fn articles_table(articles: &[ArticleSummary], base_url: &str) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Published").fg(Color::White),
        Cell::new("Title").fg(Color::White),
        Cell::new("Company").fg(Color::White),
        Cell::new("Salary").fg(Color::White),
        Cell::new("Link").fg(Color::White),
    ]);

    for article in articles {
        let published = article
            .published_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(published),
            Cell::new(&article.title),
            Cell::new(article.company.as_deref().unwrap_or("-")),
            Cell::new(article.salary.as_deref().unwrap_or("-")),
            Cell::new(article.link(base_url)).fg(Color::Cyan),
        ]);
    }
    table
}

fn show_logs(dashboard: &Dashboard, lines: usize, json: bool) -> Result<()> {
    let logs = dashboard.supervisor.logs(lines)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&json!({ "logs": logs }))?);
        return Ok(());
    }

    match logs {
        Some(text) if !text.is_empty() => println!("{text}"),
        _ => println!("  {}", style("No log output yet.").dim()),
    }
    Ok(())
}

async fn run_control_script(dashboard: &Dashboard, command: ControlCommand, json: bool) -> Result<()> {
    let spinner = ProgressBar::new_spinner();
    if !json {
        spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
        spinner.set_message(format!("Running control script ({})...", command.as_str()));
        spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    }

    let result = dashboard.supervisor.run_control(command).await;
    spinner.finish_and_clear();
    let output = result?;

    if json {
        let body = json!({ "command": command.as_str(), "output": output });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        println!("{output}");
    }
    Ok(())
}

const CONSOLE_ITEMS: [&str; 11] = [
    "Status",
    "Start",
    "Stop",
    "Pause",
    "Resume",
    "Recent articles",
    "Stats",
    "Logs",
    "Test run",
    "Generate once",
    "Quit",
];

fn console_action(index: usize) -> Option<ControlAction> {
    match index {
        0 => Some(ControlAction::Status),
        1 => Some(ControlAction::Start),
        2 => Some(ControlAction::Stop),
        3 => Some(ControlAction::Pause),
        4 => Some(ControlAction::Resume),
        5 => Some(ControlAction::Articles { limit: 20 }),
        6 => Some(ControlAction::Stats),
        7 => Some(ControlAction::Logs { lines: 50 }),
        8 => Some(ControlAction::Test),
        9 => Some(ControlAction::Once),
        _ => None,
    }
}

/// Menu loop. The supervisor lives for the whole session, so a scheduler
/// started here is held as a child handle until stopped or the console exits.
async fn run_console(dashboard: &Dashboard) -> Result<()> {
    loop {
        let state = dashboard.supervisor.state();
        println!();
        println!("  Scheduler: {}", styled_state(state));

        let selection = Select::new()
            .items(&CONSOLE_ITEMS)
            .default(0)
            .interact()?;

        let Some(action) = console_action(selection) else {
            break;
        };
        if let Err(e) = run_action(dashboard, action, false).await {
            println!("  {} {e}", style("✗").red().bold());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn dashboard(dir: &std::path::Path) -> Dashboard {
        Dashboard::new(
            SchedulerSupervisor::new(dir, "sh", "scheduler.sh", "control.sh"),
            ArticleReader::Unconfigured,
            "https://fractional.quest",
            0.05,
        )
    }

    #[test]
    fn test_or_report() {
        let (count, error) = or_report::<i64>(Ok(3));
        assert_eq!(count, 3);
        assert!(error.is_none());

        let (rows, error) = or_report::<Vec<ArticleSummary>>(Err(RepositoryError::Connection));
        assert!(rows.is_empty());
        assert!(error.unwrap().contains("DATABASE_URL"));

        let (stats, error) =
            or_report::<ArticleStats>(Err(RepositoryError::Query("relation missing".to_string())));
        assert_eq!(stats, ArticleStats::default());
        assert_eq!(error.unwrap(), "Database error: query error: relation missing");
    }

    #[tokio::test]
    async fn test_status_without_database() {
        let dir = tempfile::tempdir().unwrap();
        let dashboard = dashboard(dir.path());

        let status = dashboard.status_json().await;
        assert_eq!(status["state"], "STOPPED");
        assert_eq!(status["paused"], false);
        assert!(status["pid"].is_null());
        assert_eq!(status["stats"]["total"], 0);
        assert_eq!(status["estimated_cost"], 0.0);
        assert!(status["error"].as_str().unwrap().contains("not configured"));
    }

    #[tokio::test]
    async fn test_pause_is_reported_in_status() {
        let dir = tempfile::tempdir().unwrap();
        let dashboard = dashboard(dir.path());

        assert!(dashboard.supervisor.pause().success);
        let status = dashboard.status_json().await;
        // Paused without a running process still reads as stopped.
        assert_eq!(status["state"], "STOPPED");
        assert_eq!(status["paused"], true);
    }

    #[test]
    fn test_articles_table_renders_links() {
        let articles = vec![ArticleSummary {
            title: "Fractional CTO at Acme".to_string(),
            slug: "fractional-cto-acme".to_string(),
            role: Some("cto".to_string()),
            published_at: Some(Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap()),
            company: Some("Acme".to_string()),
            salary: None,
        }];

        let rendered = articles_table(&articles, "https://fractional.quest/").to_string();
        assert!(rendered.contains("https://fractional.quest/fractional-cto-acme"));
        assert!(rendered.contains("2026-03-01 09:30"));
        assert!(rendered.contains("Acme"));
    }

    #[test]
    fn test_stats_table_includes_costs() {
        let stats = ArticleStats {
            total: 100,
            today: 2,
            this_week: 10,
            this_month: 40,
        };
        let rendered = stats_table(&stats, 0.05).to_string();
        assert!(rendered.contains("$5.00"));
        assert!(rendered.contains("$2.00"));
        assert!(rendered.contains("24 hours"));
    }

    #[test]
    fn test_console_menu_maps_every_item() {
        for index in 0..CONSOLE_ITEMS.len() - 1 {
            assert!(console_action(index).is_some(), "item {index} has no action");
        }
        assert!(console_action(CONSOLE_ITEMS.len() - 1).is_none());
    }
}
