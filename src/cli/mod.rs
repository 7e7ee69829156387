//! Revenue Insights CLI Module
//!
//! Command-line front end over the generator, trainer, predictor and the
//! statistics library. Every command reads the same cached table and model.

use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use crate::cache::AnalyticsCache;
use crate::config::AppConfig;
use crate::data::{MonthlyRecord, MonthlyTable};
use crate::features::TARGET_MONTH;
use crate::inference::{Predictor, Scenario};
use crate::insights::{
    analysis_report, derived_metrics, loss_ratio_status, scenario_recommendations, InsightEngine,
    InsightKind, ScenarioIndicators, DEFAULT_CORRELATION_THRESHOLD, DEFAULT_RECENT_MONTHS,
};
use crate::training::TrainedModel;

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString { s.truecolor(100, 210, 120) }
fn bad(s: &str) -> ColoredString { s.truecolor(235, 100, 100) }

fn kv(key: &str, val: &str) {
    println!("  {:<24} {}", muted(key), val.white());
}

fn step_run(msg: &str) {
    eprint!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    eprintln!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn money(value: f64) -> String {
    let whole = value.abs().round() as u64;
    let digits = whole.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if value < 0.0 {
        format!("-$ {}", grouped)
    } else {
        format!("$ {}", grouped)
    }
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "revenue-insights")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Revenue model, what-if simulator and statistical insights for roadside assistance")]
#[command(long_about = None)]
pub struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Number of generated months (overrides the config)
    #[arg(long, global = true)]
    pub months: Option<usize>,

    /// Generator seed (overrides the config)
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the synthetic monthly table
    Generate {
        #[arg(short, long, value_enum, default_value = "csv")]
        format: OutputFormat,
    },

    /// Train the revenue model and report held-out metrics
    Train {
        /// Print the model as JSON
        #[arg(long)]
        json: bool,

        /// Number of drivers to list
        #[arg(long, default_value = "5")]
        top: usize,
    },

    /// Predict revenue for a what-if scenario
    Predict {
        /// Feature override, e.g. --set nps=78 (repeatable)
        #[arg(short, long = "set", value_name = "NAME=VALUE")]
        set: Vec<String>,

        /// Calendar month being simulated (defaults to the month after the data)
        #[arg(short, long)]
        month: Option<u32>,

        /// Add a 95% prediction interval
        #[arg(long)]
        interval: bool,

        /// Start from zeros instead of the latest observed month
        #[arg(long)]
        blank: bool,
    },

    /// Run the statistical analyses
    Analyze {
        /// Minimum |r| reported by the correlation screen
        #[arg(long, default_value_t = DEFAULT_CORRELATION_THRESHOLD)]
        threshold: f64,

        /// Months in the recent comparison window
        #[arg(long, default_value_t = DEFAULT_RECENT_MONTHS)]
        recent: usize,

        #[arg(long)]
        json: bool,
    },

    /// Print business insights
    Insights {
        #[arg(long)]
        json: bool,
    },
}

// ─── Shared setup ──────────────────────────────────────────────────────────────

pub fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_json_file(path)?,
        None => AppConfig::default(),
    };
    if let Some(months) = cli.months {
        config.generator.months = months;
    }
    if let Some(seed) = cli.seed {
        config.generator.seed = seed;
    }
    config.validate()?;
    Ok(config)
}

/// Parse `name=value` overrides
pub fn parse_assignments(items: &[String]) -> anyhow::Result<Vec<(String, f64)>> {
    items
        .iter()
        .map(|item| {
            let (name, value) = item
                .split_once('=')
                .ok_or_else(|| anyhow::anyhow!("expected NAME=VALUE, got '{}'", item))?;
            let value: f64 = value
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("'{}' is not a number in '{}'", value, item))?;
            Ok((name.trim().to_string(), value))
        })
        .collect()
}

/// Scenario seeded from the latest observed month
pub fn baseline_scenario(last: &MonthlyRecord) -> Scenario {
    Scenario::new()
        .with("prev_revenue", last.revenue)
        .with("attendance_count", last.attendance as f64)
        .with("average_ticket", last.average_ticket)
        .with("pct_with_parts", last.pct_with_parts)
        .with("handling_hours", last.handling_hours)
        .with("recurrence_rate", last.recurrence_rate)
        .with("nps", last.nps)
        .with("prev_loss_ratio", last.realized_loss_ratio)
        .with("interest_rate", last.interest_rate)
        .with("accident_index", last.accident_index)
}

struct Session {
    config: AppConfig,
    cache: AnalyticsCache,
}

impl Session {
    fn new(config: AppConfig) -> Self {
        let cache = AnalyticsCache::new(config.generator.clone(), config.training.clone());
        Self { config, cache }
    }

    fn table(&self) -> anyhow::Result<std::sync::Arc<MonthlyTable>> {
        let g = &self.config.generator;
        step_run(&format!("Generating {} months (seed {})", g.months, g.seed));
        let start = Instant::now();
        let table = self.cache.table(g.seed, g.months)?;
        step_done(&format!("{:?}", start.elapsed()));
        Ok(table)
    }

    fn model(&self, table: &MonthlyTable) -> anyhow::Result<std::sync::Arc<TrainedModel>> {
        step_run("Training revenue model");
        let start = Instant::now();
        let model = self.cache.model(table)?;
        step_done(&format!("{:?}", start.elapsed()));
        Ok(model)
    }
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    let session = Session::new(config);

    match cli.command {
        Commands::Generate { format } => cmd_generate(&session, format),
        Commands::Train { json, top } => cmd_train(&session, json, top),
        Commands::Predict { set, month, interval, blank } => cmd_predict(&session, &set, month, interval, blank),
        Commands::Analyze { threshold, recent, json } => cmd_analyze(&session, threshold, recent, json),
        Commands::Insights { json } => cmd_insights(&session, json),
    }
}

// ─── Commands ──────────────────────────────────────────────────────────────────

fn cmd_generate(session: &Session, format: OutputFormat) -> anyhow::Result<()> {
    let table = session.table()?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Csv => table.write_csv(&mut out)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, table.records())?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn cmd_train(session: &Session, json: bool, top: usize) -> anyhow::Result<()> {
    let table = session.table()?;
    let model = session.model(&table)?;
    if json {
        println!("{}", serde_json::to_string_pretty(model.as_ref())?);
        return Ok(());
    }

    let m = model.metrics();
    section("Model");
    kv("Training months", &m.n_train.to_string());
    kv("Test months", &m.n_test.to_string());
    kv("Split", &format!("{} | {}", model.split().last_train_date, model.split().first_test_date));
    kv("R² (test)", &format!("{:.4}", m.r2));
    kv("R² (train)", &format!("{:.4}", m.r2_train));
    kv("MAE", &money(m.mae));
    kv("RMSE", &money(m.rmse));
    kv("MAPE", &format!("{:.2}%", m.mape));

    section("Top drivers");
    for imp in model.importances().iter().take(top) {
        kv(&imp.name, &format!("{:>14.2}  {}", imp.coefficient, dim(&format!("(std effect {:.0})", imp.importance))));
    }
    println!();
    Ok(())
}

fn cmd_predict(session: &Session, set: &[String], month: Option<u32>, interval: bool, blank: bool) -> anyhow::Result<()> {
    let table = session.table()?;
    let model = session.model(&table)?;
    let last = table
        .last()
        .ok_or_else(|| anyhow::anyhow!("generated table is empty"))?;

    let mut scenario = if blank { Scenario::new() } else { baseline_scenario(last) };
    let mut target_month = month.unwrap_or(last.month % 12 + 1);
    for (name, value) in parse_assignments(set)? {
        if name == TARGET_MONTH {
            target_month = Scenario::from_map([(name, value)])?
                .target_month()
                .unwrap_or(target_month);
        } else {
            scenario.set(name, value);
        }
    }
    let scenario = scenario.with_target_month(target_month);

    let predictor = Predictor::new(&model);
    let prediction = predictor.predict(&scenario)?;

    section("Prediction");
    kv("Month", &target_month.to_string());
    kv("Revenue", &money(prediction).white().bold().to_string());
    let change = (prediction - last.revenue) / last.revenue * 100.0;
    kv("vs last month", &format!("{:+.1}%", change));
    if interval {
        let band = predictor.predict_with_interval(&scenario, &table)?;
        kv("95% interval", &format!("{} .. {}", money(band.lower), money(band.upper)));
    }

    let prev_loss = scenario.get("prev_loss_ratio").unwrap_or(0.0);
    let attendance = scenario.get("attendance_count").unwrap_or(0.0);
    let derived = derived_metrics(prediction, prev_loss, attendance);
    kv("Gross margin", &format!("{} ({:.1}%)", money(derived.gross_margin), derived.gross_margin_pct));
    kv("Realized ticket", &money(derived.realized_ticket));

    let targets = &session.config.targets;
    let status = loss_ratio_status(prev_loss, targets);
    kv("Loss ratio", &format!("{:.1}% ({})", prev_loss, status.describe()));

    let indicators = ScenarioIndicators {
        handling_hours: scenario.get("handling_hours").unwrap_or(0.0),
        recurrence_rate: scenario.get("recurrence_rate").unwrap_or(0.0),
        nps: scenario.get("nps").unwrap_or(0.0),
        prev_loss_ratio: prev_loss,
        budgeted_loss_ratio: last.budgeted_loss_ratio,
        pct_with_parts: scenario.get("pct_with_parts").unwrap_or(0.0),
    };
    let recommendations = scenario_recommendations(&indicators, targets);
    section("Recommendations");
    if recommendations.is_empty() {
        println!("  {} {}", ok("✓"), "All indicators on target");
    }
    for rec in recommendations {
        println!("  {} {}", accent("›"), rec.message);
    }
    println!();
    Ok(())
}

fn cmd_analyze(session: &Session, threshold: f64, recent: usize, json: bool) -> anyhow::Result<()> {
    let table = session.table()?;
    let report = analysis_report(&table, &session.config.targets, threshold, recent)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    section("Correlations");
    if report.correlations.is_empty() {
        println!("  {}", dim("no pair above the threshold"));
    }
    for c in &report.correlations {
        kv(
            &format!("{} ~ {}", c.first, c.second),
            &format!("r = {:+.3}  p = {:.4}  {:?}", c.r, c.p_value, c.significance),
        );
    }

    section("Trends");
    for t in &report.trends {
        kv(
            t.variable.name(),
            &format!("{} ({:+.1}%, p = {:.4})", t.trend.direction.describe(), t.trend.pct_change, t.trend.p_value),
        );
    }

    section("Loss ratio");
    let d = &report.loss_ratio_distribution;
    kv("Mean / median", &format!("{:.2}% / {:.2}%", d.mean, d.median));
    kv("Mean 95% CI", &format!("{:.2}% .. {:.2}%", report.loss_ratio_mean.lower, report.loss_ratio_mean.upper));
    kv("IQR", &format!("{:.2} .. {:.2}", d.q1, d.q3));
    kv("Outliers", &format!("{} ({:.1}%)", d.outlier_count, d.outlier_pct));
    kv("Normal", &d.is_normal().to_string());
    let cap = &report.loss_ratio_capability;
    kv("Cpk", &format!("{:.2} ({})", cap.cpk, cap.status.describe()));
    let s = &report.loss_ratio_summary;
    kv("Months within target", &format!("{} of {} ({:.1}%)", s.within_target, s.months, s.pct_within_target));
    kv("Mean gap to budget", &format!("{:+.2} pp", s.mean_deviation));

    section("Recent vs earlier");
    for c in &report.comparisons {
        kv(c.variable.name(), &format!("{:?}: {}", c.comparison.status, c.comparison.interpretation));
    }

    section("Seasonality");
    if let (Some(best), Some(worst)) = (report.seasonality.strongest_month(), report.seasonality.weakest_month()) {
        kv("Strongest month", &format!("{} ({})", best.month, money(best.revenue)));
        kv("Weakest month", &format!("{} ({})", worst.month, money(worst.revenue)));
    }
    println!();
    Ok(())
}

fn cmd_insights(session: &Session, json: bool) -> anyhow::Result<()> {
    let table = session.table()?;
    let model = session.model(&table)?;
    let insights = InsightEngine::new(session.config.targets.clone()).generate(&table, Some(model.as_ref()))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&insights)?);
        return Ok(());
    }

    section("Insights");
    for insight in &insights {
        let tag = match insight.kind {
            InsightKind::Alert | InsightKind::Attention => bad(insight.kind.label()),
            InsightKind::Success | InsightKind::Revenue | InsightKind::Opportunity => ok(insight.kind.label()),
            _ => accent(insight.kind.label()),
        };
        println!("  {} {}", tag, insight.title.white().bold());
        println!("    {}", insight.description);
        println!("    {} {}  {} {}", muted("impact"), insight.impact, muted("action"), insight.action);
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignments() {
        let parsed = parse_assignments(&["nps=78".to_string(), " handling_hours = 2.5".to_string()]).unwrap();
        assert_eq!(parsed, vec![("nps".to_string(), 78.0), ("handling_hours".to_string(), 2.5)]);
        assert!(parse_assignments(&["nps".to_string()]).is_err());
        assert!(parse_assignments(&["nps=high".to_string()]).is_err());
    }

    #[test]
    fn test_money_grouping() {
        assert_eq!(money(1_234_567.4), "$ 1,234,567");
        assert_eq!(money(999.0), "$ 999");
        assert_eq!(money(-1000.0), "-$ 1,000");
    }

    #[test]
    fn test_cli_parses_predict() {
        let cli = Cli::try_parse_from([
            "revenue-insights",
            "--seed",
            "7",
            "predict",
            "--set",
            "nps=80",
            "--month",
            "3",
            "--interval",
        ])
        .unwrap();
        assert_eq!(cli.seed, Some(7));
        let config = load_config(&cli).unwrap();
        assert_eq!(config.generator.seed, 7);
        match cli.command {
            Commands::Predict { set, month, interval, blank } => {
                assert_eq!(set, vec!["nps=80".to_string()]);
                assert_eq!(month, Some(3));
                assert!(interval);
                assert!(!blank);
            }
            _ => panic!("expected predict"),
        }
    }

    #[test]
    fn test_zero_months_rejected() {
        let cli = Cli::try_parse_from(["revenue-insights", "--months", "0", "insights"]).unwrap();
        assert!(load_config(&cli).is_err());
    }
}
