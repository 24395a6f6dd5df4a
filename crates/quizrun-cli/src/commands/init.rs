//! The `quizrun init` command.

use anyhow::{Context, Result};

pub fn execute() -> Result<()> {
    if std::path::Path::new("quizrun.toml").exists() {
        println!("quizrun.toml already exists, skipping.");
    } else {
        std::fs::write("quizrun.toml", SAMPLE_CONFIG).context("failed to write quizrun.toml")?;
        println!("Created quizrun.toml");
    }

    std::fs::create_dir_all("database").context("failed to create database directory")?;
    let sample_path = std::path::Path::new("database/sample.json");
    if sample_path.exists() {
        println!("database/sample.json already exists, skipping.");
    } else {
        std::fs::write(sample_path, SAMPLE_BANK).context("failed to write sample bank")?;
        println!("Created database/sample.json");
    }

    println!("\nNext steps:");
    println!("  1. Add your own .json banks to the database folder");
    println!("  2. Run: quizrun validate --bank database");
    println!("  3. Run: quizrun play");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizrun configuration

# Folder scanned for .json question banks
database_dir = "database"

# Uncomment for a reproducible question and option order
# seed = 42

# Print the correct answer after a wrong submission
show_feedback_answer = true
"#;

const SAMPLE_BANK: &str = r#"[
  {
    "id": 1,
    "question": "What is the capital of France?",
    "type": "dariempire",
    "answer": "Paris"
  },
  {
    "id": 2,
    "question": "Which of these are primary colours?",
    "type": "crocette",
    "options": {
      "A": "Red",
      "B": "Green",
      "C": "Blue",
      "D": "Yellow"
    },
    "answer": "A,C,D"
  },
  {
    "id": 3,
    "question": "How many days are there in a leap year?",
    "type": "dariempire",
    "answer": "366"
  },
  {
    "id": 4,
    "question": "Which planet is known as the red planet?",
    "type": "crocette",
    "options": {
      "A": "Venus",
      "B": "Mars",
      "C": "Jupiter"
    },
    "answer": "B"
  }
]
"#;
