//! The `clinscore init` command.

use std::path::Path;

use anyhow::{Context, Result};

use clinscore_core::config::DEFAULT_CONFIG_TOML;

pub fn execute() -> Result<()> {
    // Create clinscore.toml
    write_if_absent(Path::new("clinscore.toml"), DEFAULT_CONFIG_TOML)?;

    // Create example case set
    std::fs::create_dir_all("case-sets").context("failed to create case-sets/")?;
    write_if_absent(Path::new("case-sets/example.toml"), EXAMPLE_CASE_SET)?;

    println!("\nNext steps:");
    println!("  1. Edit clinscore.toml to choose the input policy");
    println!("  2. Run: clinscore validate --cases case-sets/example.toml");
    println!("  3. Run: clinscore run --cases case-sets/example.toml");

    Ok(())
}

fn write_if_absent(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const EXAMPLE_CASE_SET: &str = r#"[case_set]
id = "example"
name = "Example Case Set"
description = "A small case set to get started"

[[cases]]
id = "rlq-pain"
name = "Right lower quadrant pain"
description = "Tenderness and leukocytosis with migratory pain"
calculator = "alvarado"
tags = ["appendicitis"]

[cases.input]
migratory_pain = true
rlq_tenderness = true
leukocytosis = true

[[cases]]
id = "rlq-pain-air"
name = "Right lower quadrant pain, AIR"
calculator = "air"
tags = ["appendicitis"]

[cases.input]
vomiting = true
rlq_pain = true
temperature_c = 38.1
leukocytes = 11.4
neutrophils_pct = 79.0
crp_mg_l = 18.0

[[cases]]
id = "bmi"
name = "Body-mass index"
calculator = "bmi"
tags = ["nutrition"]

[cases.input]
weight_kg = 70.0
height_cm = 170.0
"#;
