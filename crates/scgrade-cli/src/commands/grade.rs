//! The `scgrade grade` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};
use rand::rngs::StdRng;
use rand::SeedableRng;

use scgrade_core::attempt::{QuestionAttempt, SubmitOutcome};
use scgrade_core::config::load_config_from;
use scgrade_core::engine::GradingEngine;
use scgrade_core::model::OutcomeState;
use scgrade_core::report::AttemptReport;
use scgrade_core::response::Response;
use scgrade_core::traits::StepData;

use super::{build_engine, load_question, load_responses};

pub struct GradeArgs {
    pub question: PathBuf,
    pub responses: Option<PathBuf>,
    pub inline_responses: Vec<String>,
    pub order: Option<String>,
    pub seed: Option<u64>,
    pub output: Option<PathBuf>,
    pub format: String,
    pub config: Option<PathBuf>,
}

pub fn execute(args: GradeArgs) -> Result<()> {
    anyhow::ensure!(
        args.responses.is_some() || !args.inline_responses.is_empty(),
        "no responses given, use --responses or --response"
    );

    let config = load_config_from(args.config.as_deref())?;
    let engine = build_engine(&config);
    let question = load_question(&args.question, &engine)?;

    let mut tries = match &args.responses {
        Some(path) => load_responses(path)?,
        None => Vec::new(),
    };
    for pairs in &args.inline_responses {
        let response = Response::parse_pairs(pairs)
            .map_err(|e| anyhow::anyhow!("invalid --response '{pairs}': {e}"))?;
        tries.push(response);
    }

    let mut attempt = match (&args.order, args.seed) {
        (Some(order), _) => QuestionAttempt::resume(
            &question,
            StepData::with_order(order.as_str()),
            &question.rows,
            config.staleness_check,
        )?,
        (None, Some(seed)) => QuestionAttempt::start(&question, &mut StdRng::seed_from_u64(seed))?,
        (None, None) => QuestionAttempt::start(&question, &mut rand::thread_rng())?,
    };
    if attempt.edited_question() {
        eprintln!("Warning: the order no longer matched the question and was rebuilt.");
    }

    for (i, response) in tries.into_iter().enumerate() {
        match attempt.submit(&engine, response)? {
            SubmitOutcome::Accepted => {}
            SubmitOutcome::Unchanged => eprintln!("  Try {}: unchanged, skipped", i + 1),
            SubmitOutcome::Invalid { message } => eprintln!("  Try {}: {message}", i + 1),
        }
    }
    if !attempt.responses().is_empty() {
        attempt.grade(&engine)?;
    }

    let report = AttemptReport::from_attempt(&engine, &attempt)?;

    if let Some(path) = &args.output {
        report.save_json(path)?;
        eprintln!("Report saved to: {}", path.display());
    }

    match args.format.as_str() {
        "markdown" | "md" => println!("{}", report.to_markdown()),
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print_text(&report, &attempt, &engine),
    }

    Ok(())
}

fn print_text(report: &AttemptReport, attempt: &QuestionAttempt, engine: &GradingEngine) {
    println!("Order: {}", report.order);

    let mut table = Table::new();
    table.set_header(vec!["Try", "Response", "Fraction", "State"]);
    for t in &report.tries {
        table.add_row(vec![
            Cell::new(t.number),
            Cell::new(&t.summary),
            Cell::new(format!("{:.1}%", t.fraction * 100.0)),
            Cell::new(t.state),
        ]);
    }
    println!("{table}");
    println!("Final grade: {:.1}%", report.final_fraction * 100.0);

    let needs_hint = report
        .tries
        .last()
        .is_some_and(|t| t.state != OutcomeState::Correct);
    if needs_hint {
        if let Some(hint) = attempt.hint(engine, report.tries.len() - 1) {
            println!("Hint: {}", hint.text.to_plain_text());
        }
    }
}
