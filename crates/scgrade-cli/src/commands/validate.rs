//! The `scgrade validate` command.

use std::path::PathBuf;

use anyhow::Result;

use scgrade_core::parser;

pub fn execute(question_path: PathBuf) -> Result<()> {
    let questions = if question_path.is_dir() {
        parser::load_question_directory(&question_path)?
    } else {
        vec![parser::parse_question(&question_path)?]
    };

    let registry = scgrade_strategies::default_registry();
    let mut total_warnings = 0;

    for question in &questions {
        let title = if question.name.is_empty() {
            &question.id
        } else {
            &question.name
        };
        println!(
            "Question: {title} ({} rows, {})",
            question.rows.len(),
            question.scoring_method
        );

        let warnings = parser::validate_question(question, &registry);
        for w in &warnings {
            let prefix = w
                .row_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All questions valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
