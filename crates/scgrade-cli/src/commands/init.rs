//! The `scgrade init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("scgrade.toml").exists() {
        println!("scgrade.toml already exists, skipping.");
    } else {
        std::fs::write("scgrade.toml", SAMPLE_CONFIG)?;
        println!("Created scgrade.toml");
    }

    std::fs::create_dir_all("questions")?;
    let example_path = std::path::Path::new("questions/example.toml");
    if example_path.exists() {
        println!("questions/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_QUESTION)?;
        println!("Created questions/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: scgrade validate --question questions/example.toml");
    println!("  2. Run: scgrade start --question questions/example.toml");
    println!("  3. Run: scgrade grade --question questions/example.toml --response option0=1");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# scgrade configuration

# Separator between rows in a response summary
summary_delimiter = "; "

# How persisted orders are checked on resume: "first" or "full"
staleness_check = "first"

# Max concurrent attempts in batch grading
parallelism = 4

[strings]
invalid_response = "Please select an answer or cross out at least one distractor."
crossed_out = "is crossed out"
"#;

const EXAMPLE_QUESTION: &str = r#"[question]
id = "example"
name = "Largest planet"
text = "Which planet is the largest in the solar system?"
text_format = "plain"
scoring_method = "aprime"
shuffle_answers = true
correct_row = 2
penalty = 0.1

[[rows]]
id = "mars"
number = 1
text = "Mars"
format = "plain"

[[rows]]
id = "jupiter"
number = 2
text = "Jupiter"
format = "plain"
feedback = "Jupiter is more than twice as massive as all other planets combined."

[[rows]]
id = "venus"
number = 3
text = "Venus"
format = "plain"

[[hints]]
text = "It is a gas giant."
clear_wrong = true
"#;
