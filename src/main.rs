use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{Cell, Color, ContentArrangement, Table};
use configuration::{AnalysisConfig, Granularity};
use core_types::TradeRecord;
use engine::{AnalysisEngine, AnalysisReport};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => handle_analyze(args)?,
        Commands::Sessions(args) => handle_sessions(args)?,
    }

    Ok(())
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Time-based performance, risk and behaviour analysis of closed trades.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse a JSON file of closed trades.
    Analyze(AnalyzeArgs),
    /// Print the configured sessions and their overlaps.
    Sessions(SessionsArgs),
}

#[derive(Parser)]
struct AnalyzeArgs {
    /// Path to a JSON array of trade records.
    #[arg(long, short)]
    trades: PathBuf,

    /// Optional toml configuration file. Built-in defaults are used without one.
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Overrides the Sharpe ratio annualisation period.
    #[arg(long, value_enum)]
    granularity: Option<Granularity>,

    /// Print the full report as JSON instead of tables.
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct SessionsArgs {
    /// Optional toml configuration file.
    #[arg(long, short)]
    config: Option<PathBuf>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => configuration::load_config(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(AnalysisConfig::default()),
    }
}

fn handle_analyze(args: AnalyzeArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(granularity) = args.granularity {
        config.risk.granularity = granularity;
    }

    let raw = std::fs::read_to_string(&args.trades)
        .with_context(|| format!("Failed to read {}", args.trades.display()))?;
    let records: Vec<TradeRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of trade records", args.trades.display()))?;

    let engine = AnalysisEngine::new(config).context("Invalid analysis configuration")?;
    let report = engine.run(&records)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn handle_sessions(args: SessionsArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let engine = AnalysisEngine::new(config).context("Invalid analysis configuration")?;
    let calendar = engine.calendar();

    let mut table = new_table(vec!["Session", "UTC hours"]);
    for session in calendar.sessions() {
        table.add_row(vec![session.name.clone(), hours(&session.intervals)]);
    }
    println!("{table}");

    let mut table = new_table(vec!["Overlap", "Sessions", "UTC hours", "Declared"]);
    for overlap in calendar.overlaps() {
        table.add_row(vec![
            overlap.name.clone(),
            overlap.sessions.join(", "),
            hours(&overlap.intervals),
            if overlap.declared { "yes" } else { "no" }.to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

// ==============================================================================
// Report Rendering
// ==============================================================================

fn print_report(report: &AnalysisReport) {
    println!(
        "Analysed {} of {} trade records ({} excluded)\n",
        report.trades_analyzed,
        report.records_received,
        report.warnings.len()
    );
    for warning in &report.warnings {
        println!("  ! ticket {}: {}", warning.ticket, warning.reason);
    }

    let p = report.performance.as_ref();
    let mut table = new_table(vec!["Metric", "Value"]);
    table.add_row(vec!["Net profit".to_string(), number(p.map(|p| p.total_net_profit))]);
    table.add_row(vec!["Win rate".to_string(), percent(p.and_then(|p| p.win_rate))]);
    table.add_row(vec!["Profit factor".to_string(), number(p.and_then(|p| p.profit_factor))]);
    table.add_row(vec!["Expectancy".to_string(), number(p.and_then(|p| p.expectancy))]);
    table.add_row(vec![
        "Max drawdown %".to_string(),
        number(report.drawdown.as_ref().map(|d| d.max_drawdown_pct)),
    ]);
    table.add_row(vec!["Sharpe ratio".to_string(), number(report.risk.overall.sharpe_ratio)]);
    table.add_row(vec!["Value at risk".to_string(), number(report.risk.overall.value_at_risk)]);
    table.add_row(vec!["Longest win streak".to_string(), report.streaks.max_win_streak.to_string()]);
    table.add_row(vec!["Longest loss streak".to_string(), report.streaks.max_loss_streak.to_string()]);
    let score = report.score.as_ref();
    table.add_row(vec![
        "Performance score".to_string(),
        score.map_or_else(|| "-".to_string(), |s| format!("{} ({})", s.overall_score.round_dp(2), s.grade)),
    ]);
    println!("{table}");

    if let Some(score) = score {
        for strength in &score.strengths {
            println!("  + {strength}");
        }
        for weakness in &score.weaknesses {
            println!("  - {weakness}");
        }
        println!();
    }

    let mut table = new_table(vec!["Extreme", "Bucket", "Trades", "Win rate", "Avg PnL"]);
    let extremes = &report.time_extremes;
    let named = extremes
        .peak_hours
        .iter()
        .map(|s| ("Peak hour", s))
        .chain(extremes.worst_hours.iter().map(|s| ("Worst hour", s)))
        .chain(extremes.best_weekday.iter().map(|s| ("Best weekday", s)))
        .chain(extremes.worst_weekday.iter().map(|s| ("Worst weekday", s)))
        .chain(extremes.best_month.iter().map(|s| ("Best month", s)))
        .chain(extremes.worst_month.iter().map(|s| ("Worst month", s)));
    for (label, summary) in named {
        table.add_row(vec![
            Cell::new(label),
            Cell::new(summary.bucket.to_string()),
            Cell::new(summary.total_trades),
            Cell::new(percent(summary.win_rate)),
            pnl_cell(summary.average_pnl),
        ]);
    }
    println!("{table}");

    let mut table = new_table(vec!["Bucket", "Trades", "Win rate", "Total PnL", "Avg PnL", "Risk score"]);
    let timing = report
        .by_day_of_week
        .iter()
        .zip(&report.risk.by_day_of_week)
        .chain(report.by_hour.iter().zip(&report.risk.by_hour))
        .chain(report.by_session.iter().zip(&report.risk.by_session))
        .chain(report.by_overlap.iter().zip(&report.risk.by_overlap));
    for (summary, risk) in timing.filter(|(s, _)| s.has_data()) {
        table.add_row(vec![
            Cell::new(summary.bucket.to_string()),
            Cell::new(summary.total_trades),
            Cell::new(percent(summary.win_rate)),
            pnl_cell(summary.total_pnl),
            pnl_cell(summary.average_pnl),
            Cell::new(number(risk.risk_score)),
        ]);
    }
    for summary in report.by_period.iter().filter(|s| s.has_data()) {
        table.add_row(vec![
            Cell::new(summary.bucket.to_string()),
            Cell::new(summary.total_trades),
            Cell::new(percent(summary.win_rate)),
            pnl_cell(summary.total_pnl),
            pnl_cell(summary.average_pnl),
            Cell::new("-"),
        ]);
    }
    println!("{table}");

    if let Some(best) = &report.best_overlap {
        println!(
            "Best session overlap: {} ({} trades, win rate {}, score {})\n",
            best.overlap.name,
            best.summary.total_trades,
            percent(best.summary.win_rate),
            best.score.round_dp(2)
        );
    }

    let mut table = new_table(vec!["Condition", "Trades", "Win rate", "Deviation", "Total PnL"]);
    for result in report.winning_conditions.iter().chain(&report.losing_conditions) {
        table.add_row(vec![
            Cell::new(&result.label),
            Cell::new(result.total_trades),
            Cell::new(percent(result.win_rate)),
            pnl_cell(result.deviation.map(|d| d * Decimal::ONE_HUNDRED)),
            pnl_cell(Some(result.total_pnl)),
        ]);
    }
    println!("{table}");

    let mut table = new_table(vec!["Category", "Recommendation", "Severity", "Confidence", "PnL impact"]);
    for rec in &report.recommendations {
        table.add_row(vec![
            Cell::new(format!("{:?}", rec.category)),
            Cell::new(rec.kind.to_string()),
            Cell::new(rec.severity.round_dp(2)),
            Cell::new(rec.confidence.round_dp(2)),
            pnl_cell(Some(rec.estimated_pnl_impact)),
        ]);
    }
    println!("{table}");
}

fn new_table<T: Into<Cell>>(header: Vec<T>) -> Table {
    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn number(value: Option<Decimal>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.round_dp(2).to_string())
}

fn percent(value: Option<Decimal>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{}%", (v * Decimal::ONE_HUNDRED).round_dp(1)))
}

fn pnl_cell(value: Option<Decimal>) -> Cell {
    let cell = Cell::new(number(value));
    match value {
        Some(v) if v > Decimal::ZERO => cell.fg(Color::Green),
        Some(v) if v < Decimal::ZERO => cell.fg(Color::Red),
        _ => cell,
    }
}

fn hours(intervals: &[analytics::HourInterval]) -> String {
    intervals
        .iter()
        .map(|i| format!("{:02}:00-{:02}:00", i.start, i.end))
        .collect::<Vec<_>>()
        .join(", ")
}
