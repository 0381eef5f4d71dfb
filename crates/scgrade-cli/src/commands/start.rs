//! The `scgrade start` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};
use rand::rngs::StdRng;
use rand::SeedableRng;

use scgrade_core::attempt::QuestionAttempt;
use scgrade_core::config::ScgradeConfig;

use super::{build_engine, load_question};

pub fn execute(question_path: PathBuf, seed: Option<u64>) -> Result<()> {
    let engine = build_engine(&ScgradeConfig::default());
    let question = load_question(&question_path, &engine)?;

    let attempt = match seed {
        Some(seed) => QuestionAttempt::start(&question, &mut StdRng::seed_from_u64(seed))?,
        None => QuestionAttempt::start(&question, &mut rand::thread_rng())?,
    };
    let order = attempt.order()?;

    println!("{}", order.persisted());

    let mut table = Table::new();
    table.set_header(vec!["Position", "Row", "Number", "Text"]);
    for (pos, row) in attempt.question().displayed_rows(order)? {
        table.add_row(vec![
            Cell::new(pos),
            Cell::new(&row.id),
            Cell::new(row.number),
            Cell::new(row.option_text.to_plain_text()),
        ]);
    }
    eprintln!("{table}");

    Ok(())
}
