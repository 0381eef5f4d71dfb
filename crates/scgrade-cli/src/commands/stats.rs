//! The `scgrade stats` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use scgrade_core::config::load_config_from;
use scgrade_core::order::Order;
use scgrade_core::statistics::compute_response_stats;

use super::{build_engine, load_question, load_responses};

pub fn execute(
    question_path: PathBuf,
    responses_path: PathBuf,
    order: String,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let engine = build_engine(&config);
    let mut question = load_question(&question_path, &engine)?;
    question.order = Some(Order::load(&order));

    let responses = load_responses(&responses_path)?;
    let stats = compute_response_stats(&engine, &question, &responses)?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Row", "Text", "Correct", "Chosen", "Crossed out", "Rate"]);
    for row in &stats.rows {
        table.add_row(vec![
            Cell::new(&row.row_id),
            Cell::new(&row.text),
            Cell::new(if row.is_correct { "yes" } else { "" }),
            Cell::new(row.selected),
            Cell::new(row.crossed_out),
            Cell::new(format!("{:.1}%", row.selection_rate * 100.0)),
        ]);
    }
    println!("{table}");
    println!(
        "Responses: {} ({} gradable) | correct {} | partial {} | incorrect {} | mean {:.1}%",
        stats.total_responses,
        stats.gradable_responses,
        stats.outcomes.correct,
        stats.outcomes.partially_correct,
        stats.outcomes.incorrect,
        stats.mean_fraction * 100.0
    );

    Ok(())
}
