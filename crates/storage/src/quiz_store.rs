use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use quiz_core::model::{ProgressRecord, Question, Quiz, QuizId, ScoreRecord, UserId};

use crate::document::{
    Document, QUIZZES, SCORES, USERS, from_document, legacy_questions_collection,
    questions_collection, to_document,
};
use crate::records::{
    ProgressDocument, QuestionDocument, QuizDocument, QuizHeader, ScoreDocument,
};
use crate::repository::{DocumentStore, StorageError};

/// Typed access to quizzes, per-user progress and score records.
#[derive(Clone)]
pub struct QuizStore {
    documents: Arc<dyn DocumentStore>,
}

impl QuizStore {
    #[must_use]
    pub fn new(documents: Arc<dyn DocumentStore>) -> Self {
        Self { documents }
    }

    /// Fetch the quiz document (name and owner).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend or decoding failures.
    pub async fn fetch_header(&self, quiz_id: &QuizId) -> Result<Option<QuizHeader>, StorageError> {
        let Some(document) = self.documents.get_document(QUIZZES, quiz_id.as_str()).await? else {
            return Ok(None);
        };
        let quiz: QuizDocument = from_document(document)?;
        Ok(Some(quiz.into_header()))
    }

    /// Fetch the questions of a quiz in document-id order.
    ///
    /// Quizzes with nothing under `questions` are read from the older
    /// `questoes` sub-collection. Malformed questions are skipped with a
    /// warning instead of failing the load.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    pub async fn fetch_questions(&self, quiz_id: &QuizId) -> Result<Vec<Question>, StorageError> {
        let mut documents = self
            .documents
            .list_documents(&questions_collection(quiz_id))
            .await?;
        if documents.is_empty() {
            documents = self
                .documents
                .list_documents(&legacy_questions_collection(quiz_id))
                .await?;
        }

        let mut questions = Vec::with_capacity(documents.len());
        for (question_id, document) in documents {
            let parsed = from_document::<QuestionDocument>(document)
                .map_err(|e| e.to_string())
                .and_then(|doc| doc.into_question().map_err(|e| e.to_string()));
            match parsed {
                Ok(question) => questions.push(question),
                Err(error) => {
                    warn!(quiz_id = %quiz_id, %question_id, %error, "skipping malformed question");
                }
            }
        }
        Ok(questions)
    }

    /// Fetch header and questions one after the other.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend or decoding failures.
    pub async fn fetch_quiz(&self, quiz_id: &QuizId) -> Result<Option<Quiz>, StorageError> {
        let Some(header) = self.fetch_header(quiz_id).await? else {
            return Ok(None);
        };
        let questions = self.fetch_questions(quiz_id).await?;
        Ok(Some(Quiz::new(
            quiz_id.clone(),
            header.name,
            questions,
            header.owner,
        )))
    }

    /// Stored progress of `user_id` on `quiz_id`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend or decoding failures.
    pub async fn fetch_progress(
        &self,
        user_id: &UserId,
        quiz_id: &QuizId,
    ) -> Result<Option<ProgressRecord>, StorageError> {
        let Some(mut user) = self.documents.get_document(USERS, user_id.as_str()).await? else {
            return Ok(None);
        };
        let Some(entry) = user.remove(quiz_id.as_str()) else {
            return Ok(None);
        };
        let Value::Object(entry) = entry else {
            return Err(StorageError::Serialization(format!(
                "progress for {quiz_id} is not an object"
            )));
        };
        let progress: ProgressDocument = from_document(entry)?;
        Ok(Some(progress.into_progress()))
    }

    /// Merge the progress of one quiz into the user document.
    ///
    /// Progress stored for other quizzes in the same document is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub async fn save_progress(
        &self,
        user_id: &UserId,
        quiz_id: &QuizId,
        progress: &ProgressRecord,
    ) -> Result<(), StorageError> {
        let entry = to_document(&ProgressDocument::from_progress(progress))?;
        let mut patch = Document::new();
        patch.insert(quiz_id.to_string(), Value::Object(entry));
        self.documents
            .upsert_document(USERS, user_id.as_str(), patch)
            .await?;
        debug!(user_id = %user_id, quiz_id = %quiz_id, index = progress.current_index, "progress saved");
        Ok(())
    }

    /// Append a score record and return its store id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub async fn append_score(&self, record: &ScoreRecord) -> Result<String, StorageError> {
        let document = to_document(&ScoreDocument::from_record(record))?;
        self.documents.add_document(SCORES, document).await
    }

    /// All score records written for a quiz.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend or decoding failures.
    pub async fn list_scores(&self, quiz_id: &QuizId) -> Result<Vec<ScoreRecord>, StorageError> {
        let documents = self.documents.list_documents(SCORES).await?;
        let mut scores = Vec::new();
        for (_id, document) in documents {
            let score: ScoreDocument = from_document(document)?;
            if score.quiz_id != quiz_id.as_str() {
                continue;
            }
            let record = score
                .into_record()
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            scores.push(record);
        }
        Ok(scores)
    }

    /// Write a quiz and its questions.
    ///
    /// Question ids are zero-padded positions so listing preserves order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if any write fails.
    pub async fn put_quiz(&self, quiz: &Quiz) -> Result<(), StorageError> {
        let header = QuizDocument {
            name: quiz.name().to_owned(),
            owner_user_id: quiz.owner().map(ToString::to_string),
        };
        self.documents
            .upsert_document(QUIZZES, quiz.id().as_str(), to_document(&header)?)
            .await?;

        for (position, question) in quiz.questions().iter().enumerate() {
            self.put_question(quiz.id(), position, question).await?;
        }
        Ok(())
    }

    /// Write one question at `position` (0-based), replacing what was there.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub async fn put_question(
        &self,
        quiz_id: &QuizId,
        position: usize,
        question: &Question,
    ) -> Result<(), StorageError> {
        let document = to_document(&QuestionDocument::from_question(question))?;
        self.documents
            .upsert_document(
                &questions_collection(quiz_id),
                &question_doc_id(position),
                document,
            )
            .await
    }
}

fn question_doc_id(position: usize) -> String {
    format!("q{position:04}")
}
