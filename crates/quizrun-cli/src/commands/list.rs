//! The `quizrun list` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizrun_core::{catalog, parser, QuestionKind};

use crate::config::load_config_from;

pub fn execute(database: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?.with_overrides(database, None);
    let sources = catalog::list_sources(&config.database_dir)?;

    if sources.is_empty() {
        println!(
            "No question banks found in {}. Run `quizrun init` to create a sample bank.",
            config.database_dir.display()
        );
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Bank",
        "Questions",
        "Free text",
        "Multiple select",
        "Status",
    ]);

    for source in &sources {
        match parser::load_bank(&source.path) {
            Ok(bank) => table.add_row(vec![
                Cell::new(&source.name),
                Cell::new(bank.len()),
                Cell::new(bank.count_kind(QuestionKind::FreeText)),
                Cell::new(bank.count_kind(QuestionKind::MultipleSelect)),
                Cell::new("ok"),
            ]),
            Err(e) => table.add_row(vec![
                Cell::new(&source.name),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new(format!("error: {e}")),
            ]),
        };
    }

    println!("{table}");
    Ok(())
}
