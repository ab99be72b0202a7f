//! The `clinscore list` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use clinscore_core::catalogue::{by_category, catalogue, Category};

pub fn execute(category: Option<String>) -> Result<()> {
    let entries = match &category {
        Some(name) => {
            let category: Category = name.parse().map_err(anyhow::Error::msg)?;
            by_category(category)
        }
        None => catalogue(),
    };

    let mut table = Table::new();
    table.set_header(vec!["Id", "Name", "Category", "Description"]);
    for entry in &entries {
        table.add_row(vec![
            Cell::new(entry.kind),
            Cell::new(entry.name),
            Cell::new(entry.category),
            Cell::new(entry.description),
        ]);
    }

    println!("{table}");
    println!("{} calculator(s)", entries.len());

    Ok(())
}
