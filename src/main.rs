use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use uuid::Uuid;

use liftlog::analysis::{TrainingReport, analyze_history};
use liftlog::domain::{MainLift, Sex, Tier};
use liftlog::history::load_history;
use liftlog::records::RecordKind;
use liftlog::settings::Settings;
use liftlog::units::{WeightUnit, format_weight, parse_weight_to_kg};

/// Strength training logbook analytics.
#[derive(Parser, Debug)]
#[command(name = "liftlog")]
#[command(about = "Estimated maxes, records, volume and fatigue flags from a training log")]
#[command(version)]
struct Args {
    /// Path to the JSON training history.
    /// Can also be set via LIFTLOG_FILE environment variable.
    #[arg(value_name = "FILE", env = "LIFTLOG_FILE")]
    file: PathBuf,

    /// Sex for Wilks/DOTS coefficients (male or female).
    #[arg(long, env = "LIFTLOG_SEX")]
    sex: Option<Sex>,

    /// Display unit (kg or lb).
    #[arg(long, env = "LIFTLOG_UNIT")]
    unit: Option<WeightUnit>,

    /// Relative e1RM drop that raises a fatigue flag (0.05 = 5%).
    #[arg(long, env = "LIFTLOG_DROP_THRESHOLD")]
    drop_threshold: Option<f64>,

    /// Consecutive RPE 9.5+ sessions that raise a fatigue flag.
    #[arg(long, env = "LIFTLOG_STREAK_THRESHOLD")]
    streak_threshold: Option<usize>,

    /// Bodyweight for competition scores, in the display unit. Defaults to
    /// the latest logged bodyweight.
    #[arg(long, env = "LIFTLOG_BODYWEIGHT")]
    bodyweight: Option<f64>,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
}

impl Args {
    /// Applies command-line overrides on top of the stored settings.
    fn resolve_settings(&self, stored: Option<Settings>) -> Settings {
        let mut settings = stored.unwrap_or_default();
        if let Some(sex) = self.sex {
            settings.sex = sex;
        }
        if let Some(unit) = self.unit {
            settings.weight_unit = unit;
        }
        if let Some(threshold) = self.drop_threshold {
            settings.fatigue_drop_threshold = threshold;
        }
        if let Some(threshold) = self.streak_threshold {
            settings.rpe_streak_threshold = threshold;
        }
        settings
    }
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    let (report, settings) = load_and_analyze(&args)?;

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", json);
    } else {
        print_report(&report, &settings);
    }

    Ok(())
}

/// Loads the history file and derives the report.
fn load_and_analyze(args: &Args) -> Result<(TrainingReport, Settings)> {
    let history = load_history(&args.file)
        .with_context(|| format!("Failed to load training history from {}", args.file.display()))?;

    log::info!(
        "Loaded {} session(s) and {} record(s) from {}",
        history.sessions.len(),
        history.pr_records.len(),
        display_name(&args.file)
    );

    let settings = args.resolve_settings(history.settings.clone());
    let bodyweight_kg = args
        .bodyweight
        .map(|bw| parse_weight_to_kg(bw, settings.weight_unit));
    let report = analyze_history(
        &history.sessions,
        &history.pr_records,
        &settings,
        bodyweight_kg,
        || Uuid::new_v4().to_string(),
    );

    Ok((report, settings))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_report(report: &TrainingReport, settings: &Settings) {
    let unit = settings.weight_unit;

    println!();
    println!("=== Training Log Summary ===");
    println!();
    println!("Sessions: {}", report.session_count);
    if let (Some(first), Some(last)) = (report.first_session, report.last_session) {
        println!(
            "Date range: {} to {}",
            first.date_naive(),
            last.date_naive()
        );
    }

    println!();
    println!("=== Anchors (T1 e1RM) ===");
    println!();
    if report.anchors.is_empty() {
        println!("No anchors yet - log a T1 main lift to establish one.");
    }
    for anchor in &report.anchors {
        let points = report.trends.get(&anchor.lift).map_or(0, |t| t.len());
        println!(
            "{:15} {:>10}  ({}, {} sessions tracked)",
            anchor.lift.canonical_name(),
            format_weight(anchor.e1rm, unit),
            anchor.date.date_naive(),
            points
        );
    }

    println!();
    println!("=== Competition Scores ===");
    println!();
    match &report.competition {
        Some(scores) => {
            println!(
                "Total {} at {} bodyweight",
                format_weight(scores.total, unit),
                format_weight(scores.bodyweight, unit)
            );
            println!("Wilks: {:.2}", scores.wilks);
            println!("DOTS:  {:.2}", scores.dots);
        }
        None => println!(
            "Insufficient data (need {}, {}, {} anchors and a bodyweight)",
            MainLift::Squat,
            MainLift::Bench,
            MainLift::Deadlift
        ),
    }

    if let Some(summary) = &report.latest_session {
        println!();
        println!("=== Latest Session ({}) ===", summary.date.date_naive());
        println!();
        println!("Tonnage: {}", format_weight(summary.tonnage, unit));
        for tier in Tier::all() {
            println!("  {}: {}", tier, format_weight(summary.by_tier.get(*tier), unit));
        }
        for (name, tonnage) in &summary.by_exercise {
            let inol = summary
                .inol
                .get(name)
                .map(|r| format!("  INOL {:.2}", r.inol))
                .unwrap_or_default();
            println!("  {:20} {:>12}{}", name, format_weight(*tonnage, unit), inol);
        }
    }

    if report.volume_history.len() > 1 {
        println!();
        println!("=== Volume (last {} sessions) ===", report.volume_history.len());
        println!();
        for point in &report.volume_history {
            println!(
                "{}  T1 {:>12}  T2 {:>12}  T3 {:>12}",
                point.date.date_naive(),
                format_weight(point.by_tier.t1, unit),
                format_weight(point.by_tier.t2, unit),
                format_weight(point.by_tier.t3, unit)
            );
        }
    }

    println!();
    println!("=== Personal Records ===");
    println!();
    let mut records: Vec<_> = report.records.iter().collect();
    records.sort_by(|a, b| {
        a.exercise_name
            .cmp(&b.exercise_name)
            .then(a.reps.cmp(&b.reps))
    });
    for record in records {
        let label = match (record.kind, record.reps) {
            (RecordKind::E1rm, _) => "e1RM".to_string(),
            (RecordKind::WeightAtReps, Some(reps)) => format!("{}RM", reps),
            (RecordKind::WeightAtReps, None) => "weight".to_string(),
        };
        println!(
            "{:20} {:6} {:>10}  ({})",
            record.exercise_name,
            label,
            format_weight(record.value, unit),
            record.session_date.date_naive()
        );
    }

    println!();
    println!("=== Fatigue Flags ===");
    println!();
    if report.fatigue_flags.is_empty() {
        println!("None");
    }
    for flag in &report.fatigue_flags {
        println!("! {}", flag.message);
    }
}
