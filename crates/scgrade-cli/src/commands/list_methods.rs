//! The `scgrade list-methods` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    let registry = scgrade_strategies::default_registry();

    println!("Scoring methods:");
    for name in registry.names() {
        let description = registry
            .iter()
            .find(|s| s.name() == name)
            .map(|s| s.description().to_string())
            .unwrap_or_default();
        println!("  {name}: {description}");
    }

    Ok(())
}
