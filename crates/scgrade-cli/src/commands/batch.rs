//! The `scgrade batch` command.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use scgrade_core::batch::{grade_batch, BatchJob, BatchOutcome, BatchProgress, BatchSummary};
use scgrade_core::config::load_config_from;

use super::{build_engine, load_question};

/// Console progress reporter.
struct ConsoleProgress;

impl BatchProgress for ConsoleProgress {
    fn on_job_complete(&self, outcome: &BatchOutcome) {
        eprintln!(
            "  Done: {} {} ({:.1}%)",
            outcome.job_id,
            outcome.state,
            outcome.final_fraction * 100.0
        );
    }

    fn on_job_error(&self, job_id: &str, error: &str) {
        eprintln!("  ERROR: {job_id}: {error}");
    }

    fn on_batch_complete(&self, total: usize, completed: usize, failed: usize, elapsed: Duration) {
        eprintln!(
            "\nComplete: {completed}/{total} graded, {failed} failed ({:.1}s)",
            elapsed.as_secs_f64()
        );
    }
}

pub async fn execute(
    question_path: PathBuf,
    jobs_path: PathBuf,
    parallelism: Option<usize>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let parallelism = parallelism.unwrap_or(config.parallelism);
    anyhow::ensure!(parallelism >= 1, "parallelism must be at least 1");

    let engine = build_engine(&config);
    let question = load_question(&question_path, &engine)?;

    let content = std::fs::read_to_string(&jobs_path)
        .with_context(|| format!("failed to read jobs: {}", jobs_path.display()))?;
    let jobs: Vec<BatchJob> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse jobs JSON: {}", jobs_path.display()))?;

    eprintln!(
        "scgrade v{}: grading {} attempts on {}",
        env!("CARGO_PKG_VERSION"),
        jobs.len(),
        question.id
    );

    let summary = grade_batch(
        &engine,
        &question,
        &question.rows,
        jobs,
        parallelism,
        &ConsoleProgress,
    )
    .await;

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
        _ => print_summary(&summary),
    }

    Ok(())
}

fn print_summary(summary: &BatchSummary) {
    let mut table = Table::new();
    table.set_header(vec!["Job", "Order", "Tries", "Last", "State", "Final"]);

    for o in &summary.outcomes {
        let order = if o.edited_question {
            format!("{} (rebuilt)", o.order)
        } else {
            o.order.clone()
        };
        table.add_row(vec![
            Cell::new(&o.job_id),
            Cell::new(order),
            Cell::new(o.tries),
            Cell::new(format!("{:.1}%", o.fraction * 100.0)),
            Cell::new(o.state),
            Cell::new(format!("{:.1}%", o.final_fraction * 100.0)),
        ]);
    }
    for f in &summary.failures {
        table.add_row(vec![
            Cell::new(&f.job_id),
            Cell::new("-"),
            Cell::new("-"),
            Cell::new("-"),
            Cell::new(format!("error: {}", f.error)),
            Cell::new("-"),
        ]);
    }

    println!("{table}");
    println!(
        "Mean final grade: {:.1}% over {} graded attempt(s)",
        summary.mean_final_fraction() * 100.0,
        summary.outcomes.len()
    );
}
