//! The `quizrun validate` command.

use std::path::PathBuf;

use anyhow::Result;

use quizrun_core::{catalog, parser, QuestionBank, QuestionKind};

pub fn execute(bank_path: PathBuf) -> Result<()> {
    let mut failures = 0;

    let banks: Vec<QuestionBank> = if bank_path.is_dir() {
        let sources = catalog::list_sources(&bank_path)?;
        anyhow::ensure!(
            !sources.is_empty(),
            "no .json question banks found in {}",
            bank_path.display()
        );
        sources
            .iter()
            .filter_map(|source| match parser::load_bank(&source.path) {
                Ok(bank) => Some(bank),
                Err(e) => {
                    println!("Bank: {}\n  ERROR: {e}", source.name);
                    failures += 1;
                    None
                }
            })
            .collect()
    } else {
        vec![parser::load_bank(&bank_path)?]
    };

    let mut total_warnings = 0;

    for bank in &banks {
        println!(
            "Bank: {} ({} questions: {} free text, {} multiple select)",
            bank.name(),
            bank.len(),
            bank.count_kind(QuestionKind::FreeText),
            bank.count_kind(QuestionKind::MultipleSelect),
        );

        let warnings = parser::validate_bank(bank);
        for w in &warnings {
            let prefix = w
                .question_id
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    anyhow::ensure!(failures == 0, "{failures} bank(s) failed to load");

    if total_warnings == 0 {
        println!("All question banks valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
