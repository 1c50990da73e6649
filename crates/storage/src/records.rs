//! Persisted shapes of quiz documents.
//!
//! These mirror the domain types so the store can serialize them without
//! leaking storage concerns into `quiz-core`. Field names follow the hosted
//! database layout; the older Portuguese field names are still accepted on
//! read. Legacy questions live under `questoes`, which
//! [`QuizStore::fetch_questions`](crate::QuizStore::fetch_questions) falls back to.

use serde::{Deserialize, Serialize};

use quiz_core::model::{ProgressRecord, Question, QuestionError, QuizId, ScoreRecord, UserId};

/// `quizzes/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizDocument {
    #[serde(default, alias = "nomeQuizz")]
    pub name: String,
    #[serde(default, alias = "userId", skip_serializing_if = "Option::is_none")]
    pub owner_user_id: Option<String>,
}

/// Name and owner of a quiz, without its questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizHeader {
    pub name: String,
    pub owner: Option<UserId>,
}

impl QuizDocument {
    /// An owner id that is blank or not a valid path segment is treated as unknown.
    #[must_use]
    pub fn into_header(self) -> QuizHeader {
        QuizHeader {
            name: self.name,
            owner: self.owner_user_id.and_then(|raw| UserId::new(raw).ok()),
        }
    }
}

/// `quizzes/{id}/questions/{questionId}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDocument {
    #[serde(alias = "pergunta")]
    pub prompt: String,
    #[serde(alias = "opcoes")]
    pub options: Vec<String>,
    #[serde(alias = "respostaCorreta")]
    pub correct_option: String,
}

impl QuestionDocument {
    #[must_use]
    pub fn from_question(question: &Question) -> Self {
        Self {
            prompt: question.prompt().to_owned(),
            options: question.options().to_vec(),
            correct_option: question.correct_option().to_owned(),
        }
    }

    /// Convert the record back into a domain `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the stored question is malformed.
    pub fn into_question(self) -> Result<Question, QuestionError> {
        Question::new(self.prompt, self.options, self.correct_option)
    }
}

/// Entry stored under `users/{uid}` at key `{quizId}`.
///
/// Saves merge into the existing entry, so an entry first written with the
/// older field names keeps them next to the current ones. The current names
/// win when both are present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredProgress")]
pub struct ProgressDocument {
    pub index: usize,
    /// Unanswered slots are stored as empty strings.
    pub answers: Vec<String>,
    pub score: u32,
}

#[derive(Deserialize)]
struct StoredProgress {
    #[serde(default)]
    index: Option<usize>,
    #[serde(default, rename = "currentQuestionIndex")]
    legacy_index: Option<usize>,
    #[serde(default)]
    answers: Option<Vec<String>>,
    #[serde(default, rename = "userAnswers")]
    legacy_answers: Option<Vec<String>>,
    #[serde(default)]
    score: Option<u32>,
}

impl From<StoredProgress> for ProgressDocument {
    fn from(stored: StoredProgress) -> Self {
        Self {
            index: stored.index.or(stored.legacy_index).unwrap_or_default(),
            answers: stored
                .answers
                .or(stored.legacy_answers)
                .unwrap_or_default(),
            score: stored.score.unwrap_or_default(),
        }
    }
}

impl ProgressDocument {
    #[must_use]
    pub fn from_progress(progress: &ProgressRecord) -> Self {
        Self {
            index: progress.current_index,
            answers: progress
                .answers
                .iter()
                .map(|answer| answer.clone().unwrap_or_default())
                .collect(),
            score: progress.score,
        }
    }

    #[must_use]
    pub fn into_progress(self) -> ProgressRecord {
        ProgressRecord {
            current_index: self.index,
            answers: self
                .answers
                .into_iter()
                .map(|answer| (!answer.is_empty()).then_some(answer))
                .collect(),
            score: self.score,
        }
    }
}

/// `scores/{autoId}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreDocument {
    pub user_id: String,
    pub quiz_id: String,
    pub score: u32,
}

impl ScoreDocument {
    #[must_use]
    pub fn from_record(record: &ScoreRecord) -> Self {
        Self {
            user_id: record.user_id.to_string(),
            quiz_id: record.quiz_id.to_string(),
            score: record.score,
        }
    }

    /// # Errors
    ///
    /// Returns `ParseIdError` if either stored id is malformed.
    pub fn into_record(self) -> Result<ScoreRecord, quiz_core::model::ParseIdError> {
        Ok(ScoreRecord::new(
            UserId::new(self.user_id)?,
            QuizId::new(self.quiz_id)?,
            self.score,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn quiz_document_reads_legacy_field_names() {
        let doc: QuizDocument =
            serde_json::from_value(json!({ "nomeQuizz": "Math Basics", "userId": "owner-1" }))
                .unwrap();
        let header = doc.into_header();
        assert_eq!(header.name, "Math Basics");
        assert_eq!(header.owner, Some(UserId::new("owner-1").unwrap()));
    }

    #[test]
    fn quiz_document_without_owner() {
        let doc: QuizDocument = serde_json::from_value(json!({ "name": "Solo" })).unwrap();
        assert_eq!(doc.clone().into_header().owner, None);
        assert_eq!(serde_json::to_value(&doc).unwrap(), json!({ "name": "Solo" }));

        let blank: QuizDocument =
            serde_json::from_value(json!({ "name": "Blank", "ownerUserId": "" })).unwrap();
        assert_eq!(blank.into_header().owner, None);
    }

    #[test]
    fn question_document_accepts_both_layouts() {
        let legacy: QuestionDocument = serde_json::from_value(json!({
            "pergunta": "2 + 2?",
            "opcoes": ["2", "3", "4"],
            "respostaCorreta": "4",
        }))
        .unwrap();
        let current: QuestionDocument = serde_json::from_value(json!({
            "prompt": "2 + 2?",
            "options": ["2", "3", "4"],
            "correctOption": "4",
        }))
        .unwrap();
        assert_eq!(legacy, current);
        assert_eq!(current.into_question().unwrap().correct_option(), "4");
    }

    #[test]
    fn progress_document_maps_blank_answers_to_unanswered() {
        let doc: ProgressDocument = serde_json::from_value(json!({
            "currentQuestionIndex": 1,
            "userAnswers": ["4", ""],
            "score": 1,
        }))
        .unwrap();
        let progress = doc.into_progress();
        assert_eq!(progress.current_index, 1);
        assert_eq!(progress.answers, vec![Some("4".to_string()), None]);

        let written = serde_json::to_value(ProgressDocument::from_progress(&progress)).unwrap();
        assert_eq!(written, json!({ "index": 1, "answers": ["4", ""], "score": 1 }));
    }

    #[test]
    fn progress_document_prefers_current_names_over_legacy() {
        let doc: ProgressDocument = serde_json::from_value(json!({
            "currentQuestionIndex": 1,
            "userAnswers": ["4", ""],
            "index": 0,
            "answers": ["4", "B"],
            "score": 2,
        }))
        .unwrap();
        assert_eq!(doc.index, 0);
        assert_eq!(doc.answers, vec!["4".to_string(), "B".to_string()]);
        assert_eq!(doc.score, 2);
    }

    #[test]
    fn score_document_uses_camel_case() {
        let record = ScoreRecord::new(
            UserId::new("owner-1").unwrap(),
            QuizId::new("math").unwrap(),
            2,
        );
        let value = serde_json::to_value(ScoreDocument::from_record(&record)).unwrap();
        assert_eq!(value, json!({ "userId": "owner-1", "quizId": "math", "score": 2 }));
    }
}
