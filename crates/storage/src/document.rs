//! Path-addressed JSON documents and their merge semantics.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use quiz_core::model::QuizId;

use crate::repository::StorageError;

/// A stored document: a JSON object keyed by field name.
pub type Document = Map<String, Value>;

pub const QUIZZES: &str = "quizzes";
pub const USERS: &str = "users";
pub const SCORES: &str = "scores";

/// Sub-collection holding the questions of one quiz.
#[must_use]
pub fn questions_collection(quiz_id: &QuizId) -> String {
    format!("{QUIZZES}/{quiz_id}/questions")
}

/// Sub-collection used for questions by quizzes created before the rename.
#[must_use]
pub fn legacy_questions_collection(quiz_id: &QuizId) -> String {
    format!("{QUIZZES}/{quiz_id}/questoes")
}

/// Apply `patch` onto `target` key by key.
///
/// Nested objects are merged recursively; every other value (arrays
/// included) replaces what was there. Keys absent from `patch` are left
/// untouched.
pub fn merge_patch(target: &mut Document, patch: Document) {
    for (key, incoming) in patch {
        match (target.get_mut(&key), incoming) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                merge_patch(existing, incoming);
            }
            (_, incoming) => {
                target.insert(key, incoming);
            }
        }
    }
}

/// Serialize a value that must be a JSON object.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if the value is not an object.
pub fn to_document<T: Serialize>(value: &T) -> Result<Document, StorageError> {
    match serde_json::to_value(value).map_err(ser)? {
        Value::Object(map) => Ok(map),
        other => Err(StorageError::Serialization(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

/// Deserialize a document into a typed record.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if fields are missing or mistyped.
pub fn from_document<T: DeserializeOwned>(document: Document) -> Result<T, StorageError> {
    serde_json::from_value(Value::Object(document)).map_err(ser)
}

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test fixtures are objects"),
        }
    }

    #[test]
    fn merge_keeps_sibling_keys() {
        let mut target = doc(json!({
            "quiz-a": { "index": 1, "answers": ["x"], "score": 0 },
            "quiz-b": { "index": 2, "answers": ["y", "z"], "score": 1 },
        }));
        merge_patch(
            &mut target,
            doc(json!({ "quiz-a": { "index": 0, "answers": ["w"], "score": 3 } })),
        );

        assert_eq!(target["quiz-a"], json!({ "index": 0, "answers": ["w"], "score": 3 }));
        assert_eq!(target["quiz-b"], json!({ "index": 2, "answers": ["y", "z"], "score": 1 }));
    }

    #[test]
    fn merge_is_recursive_for_objects() {
        let mut target = doc(json!({ "p": { "index": 1, "keep": true } }));
        merge_patch(&mut target, doc(json!({ "p": { "index": 2 } })));
        assert_eq!(target["p"], json!({ "index": 2, "keep": true }));
    }

    #[test]
    fn merge_replaces_arrays_and_scalars() {
        let mut target = doc(json!({ "answers": ["a", "b", "c"], "n": 1 }));
        merge_patch(&mut target, doc(json!({ "answers": ["d"], "n": { "nested": 1 } })));
        assert_eq!(target["answers"], json!(["d"]));
        assert_eq!(target["n"], json!({ "nested": 1 }));
    }

    #[test]
    fn questions_collection_path() {
        let id = QuizId::new("abc").unwrap();
        assert_eq!(questions_collection(&id), "quizzes/abc/questions");
        assert_eq!(legacy_questions_collection(&id), "quizzes/abc/questoes");
    }

    #[test]
    fn to_document_rejects_non_objects() {
        let err = to_document(&vec![1, 2]).unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}
