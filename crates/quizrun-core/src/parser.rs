//! JSON question source parser.
//!
//! Loads question banks from JSON files and validates them.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use serde::Deserialize;

use crate::error::QuizError;
use crate::model::{Question, QuestionBank, QuestionBody};

/// `type` value that marks a multiple-select record.
const MULTIPLE_SELECT_TAG: &str = "crocette";

/// Options beyond this count have no display letter.
pub const MAX_OPTIONS: usize = 26;

/// One record as it appears in the source file.
#[derive(Debug, Deserialize)]
struct RawQuestion {
    id: u32,
    question: String,
    #[serde(rename = "type")]
    kind: String,
    answer: String,
    #[serde(default)]
    options: Option<BTreeMap<String, String>>,
}

/// Parse a single JSON file into a `QuestionBank` named after the file stem.
pub fn load_bank(path: &Path) -> Result<QuestionBank, QuizError> {
    let content = std::fs::read_to_string(path).map_err(|source| QuizError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let bank = parse_bank_str(&content, &name)?;
    tracing::info!(bank = bank.name(), questions = bank.len(), "loaded question bank");
    Ok(bank)
}

/// Parse a JSON string into a `QuestionBank` (useful for testing).
pub fn parse_bank_str(content: &str, name: &str) -> Result<QuestionBank, QuizError> {
    let records: Vec<serde_json::Value> = serde_json::from_str(content)
        .map_err(|e| QuizError::malformed(name, format!("expected an array of records: {e}")))?;

    let questions = records
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            let raw: RawQuestion = serde_json::from_value(value)
                .map_err(|e| QuizError::malformed(name, format!("record {}: {e}", index + 1)))?;
            convert_record(raw)
                .map_err(|reason| QuizError::malformed(name, format!("record {}: {reason}", index + 1)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(QuestionBank::new(name, questions))
}

fn convert_record(raw: RawQuestion) -> Result<Question, String> {
    let is_multiple_select = raw.kind == MULTIPLE_SELECT_TAG;

    let body = if is_multiple_select {
        let options = raw
            .options
            .filter(|o| !o.is_empty())
            .ok_or_else(|| format!("question {} is multiple select but has no options", raw.id))?;
        if options.len() > MAX_OPTIONS {
            return Err(format!(
                "question {} has {} options, at most {MAX_OPTIONS} are supported",
                raw.id,
                options.len()
            ));
        }

        let correct_keys: BTreeSet<String> = raw
            .answer
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect();

        if correct_keys.is_empty() {
            return Err(format!("question {} has no correct option keys", raw.id));
        }
        if let Some(unknown) = correct_keys.iter().find(|k| !options.contains_key(*k)) {
            return Err(format!(
                "question {} references unknown option `{unknown}`",
                raw.id
            ));
        }

        QuestionBody::MultipleSelect {
            options,
            correct_keys,
        }
    } else {
        if raw.answer.trim().is_empty() {
            return Err(format!("question {} has an empty answer", raw.id));
        }
        QuestionBody::FreeText { answer: raw.answer }
    };

    Ok(Question {
        id: raw.id,
        text: raw.question,
        body,
    })
}

/// A warning from bank validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<u32>,
    /// Warning message.
    pub message: String,
}

/// Validate a bank for issues that do not prevent loading.
pub fn validate_bank(bank: &QuestionBank) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen_ids = HashSet::new();
    for q in bank.questions() {
        if !seen_ids.insert(q.id) {
            warnings.push(ValidationWarning {
                question_id: Some(q.id),
                message: format!("duplicate question ID: {}", q.id),
            });
        }
    }

    for q in bank.questions() {
        if q.text.trim().is_empty() {
            warnings.push(ValidationWarning {
                question_id: Some(q.id),
                message: "question text is empty".into(),
            });
        }
    }

    for q in bank.questions() {
        if let QuestionBody::MultipleSelect {
            options,
            correct_keys,
        } = &q.body
        {
            if options.len() < 2 {
                warnings.push(ValidationWarning {
                    question_id: Some(q.id),
                    message: "multiple select question has a single option".into(),
                });
            } else if correct_keys.len() == options.len() {
                warnings.push(ValidationWarning {
                    question_id: Some(q.id),
                    message: "every option is marked correct".into(),
                });
            }
        }
    }

    if bank.is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "bank contains no questions".into(),
        });
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionKind;

    const VALID_JSON: &str = r#"[
        {"id": 1, "question": "Capital of Italy?", "type": "dariempire", "answer": "Rome"},
        {
            "id": 2,
            "question": "Which are rivers?",
            "type": "crocette",
            "options": {"A": "Po", "B": "Etna", "C": "Tiber"},
            "answer": "A, C"
        },
        {"id": 3, "question": "Longest river?", "type": "dariempire", "answer": "Nile"}
    ]"#;

    #[test]
    fn parse_valid_json() {
        let bank = parse_bank_str(VALID_JSON, "geo").unwrap();
        assert_eq!(bank.name(), "geo");
        assert_eq!(bank.len(), 3);
        assert_eq!(bank.questions()[0].kind(), QuestionKind::FreeText);
        assert_eq!(bank.questions()[2].kind(), QuestionKind::FreeText);

        match &bank.questions()[1].body {
            QuestionBody::MultipleSelect {
                options,
                correct_keys,
            } => {
                assert_eq!(options.len(), 3);
                let keys: Vec<&str> = correct_keys.iter().map(String::as_str).collect();
                assert_eq!(keys, vec!["A", "C"]);
            }
            other => panic!("expected multiple select, got {other:?}"),
        }
    }

    #[test]
    fn unknown_type_is_free_text() {
        let json = r#"[{"id": 7, "question": "2+2?", "type": "numeric", "answer": "4"}]"#;
        let bank = parse_bank_str(json, "math").unwrap();
        assert_eq!(bank.questions()[0].kind(), QuestionKind::FreeText);
    }

    #[test]
    fn missing_field_is_malformed() {
        let json = r#"[{"id": 1, "answer": "Rome"}]"#;
        let err = parse_bank_str(json, "broken").unwrap_err();
        assert!(matches!(err, QuizError::MalformedSource { .. }));
        assert!(err.to_string().contains("record 1"));
        assert!(err.to_string().contains("question"));
    }

    #[test]
    fn missing_type_is_malformed() {
        let json = r#"[{"id": 1, "question": "Capital of Italy?", "answer": "Rome"}]"#;
        let err = parse_bank_str(json, "untyped").unwrap_err();
        assert!(matches!(err, QuizError::MalformedSource { .. }));
        assert!(err.to_string().contains("record 1"));
        assert!(err.to_string().contains("type"));
    }

    fn options_json(count: usize) -> String {
        let options: BTreeMap<String, String> = (0..count)
            .map(|i| (format!("k{i}"), format!("option {i}")))
            .collect();
        serde_json::json!([{
            "id": 9,
            "question": "Pick the last one",
            "type": "crocette",
            "options": options,
            "answer": format!("k{}", count - 1),
        }])
        .to_string()
    }

    #[test]
    fn more_options_than_letters_is_malformed() {
        let err = parse_bank_str(&options_json(27), "wide").unwrap_err();
        assert!(matches!(err, QuizError::MalformedSource { .. }));
        assert!(err.to_string().contains("27 options, at most 26"));

        let bank = parse_bank_str(&options_json(26), "wide").unwrap();
        assert_eq!(bank.count_kind(QuestionKind::MultipleSelect), 1);
    }

    #[test]
    fn unknown_correct_key_is_malformed() {
        let json = r#"[{
            "id": 4, "question": "Pick", "type": "crocette",
            "options": {"A": "x", "B": "y"}, "answer": "A,D"
        }]"#;
        let err = parse_bank_str(json, "broken").unwrap_err();
        assert!(err.to_string().contains("unknown option `D`"));
    }

    #[test]
    fn multiple_select_without_options_is_malformed() {
        let json = r#"[{"id": 4, "question": "Pick", "type": "crocette", "answer": "A"}]"#;
        assert!(parse_bank_str(json, "broken").is_err());
    }

    #[test]
    fn empty_answers_are_malformed() {
        let free = r#"[{"id": 1, "question": "Q", "type": "dariempire", "answer": "   "}]"#;
        assert!(parse_bank_str(free, "broken").is_err());

        let multi = r#"[{
            "id": 2, "question": "Q", "type": "crocette",
            "options": {"A": "x"}, "answer": " , "
        }]"#;
        assert!(parse_bank_str(multi, "broken").is_err());
    }

    #[test]
    fn non_array_is_malformed() {
        let err = parse_bank_str(r#"{"id": 1}"#, "object").unwrap_err();
        assert!(err.to_string().contains("expected an array"));
    }

    #[test]
    fn validate_duplicates_and_blank_text() {
        let json = r#"[
            {"id": 1, "question": "  ", "type": "dariempire", "answer": "a"},
            {"id": 1, "question": "Second", "type": "dariempire", "answer": "b"}
        ]"#;
        let bank = parse_bank_str(json, "dupes").unwrap();
        let warnings = validate_bank(&bank);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate")));
        assert!(warnings.iter().any(|w| w.message.contains("empty")));
    }

    #[test]
    fn validate_degenerate_multiple_select() {
        let json = r#"[
            {"id": 1, "question": "Only one", "type": "crocette", "options": {"A": "x"}, "answer": "A"},
            {"id": 2, "question": "All", "type": "crocette", "options": {"A": "x", "B": "y"}, "answer": "A,B"}
        ]"#;
        let bank = parse_bank_str(json, "degenerate").unwrap();
        let warnings = validate_bank(&bank);
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].question_id, Some(1));
        assert_eq!(warnings[1].question_id, Some(2));
    }

    #[test]
    fn load_from_file_uses_stem_as_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("geography.json");
        std::fs::write(&path, VALID_JSON).unwrap();

        let bank = load_bank(&path).unwrap();
        assert_eq!(bank.name(), "geography");
        assert_eq!(bank.len(), 3);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = load_bank(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, QuizError::Io { .. }));
    }
}
