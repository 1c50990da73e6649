//! Sample quizzes for local development and smoke tests.

use quiz_core::model::{Question, Quiz, QuizId, UserId};

use crate::quiz_store::QuizStore;
use crate::repository::StorageError;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SeedError {
    #[error(transparent)]
    Model(#[from] quiz_core::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

fn options(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

/// Built-in quizzes, all owned by `owner` when given.
///
/// # Errors
///
/// Returns `quiz_core::Error` if a sample question or id is malformed.
pub fn sample_quizzes(owner: Option<&UserId>) -> Result<Vec<Quiz>, quiz_core::Error> {
    let math = Quiz::new(
        QuizId::new("math-basics")?,
        "Math Basics",
        vec![
            Question::new("What is 2 + 2?", options(&["2", "3", "4"]), "4")?,
            Question::new("Which letter comes first?", options(&["A", "B"]), "A")?,
        ],
        owner.cloned(),
    );

    let capitals = Quiz::new(
        QuizId::new("capitals")?,
        "World Capitals",
        vec![
            Question::new(
                "Capital of Brazil?",
                options(&["Rio de Janeiro", "Brasilia", "Sao Paulo"]),
                "Brasilia",
            )?,
            Question::new(
                "Capital of Japan?",
                options(&["Kyoto", "Osaka", "Tokyo"]),
                "Tokyo",
            )?,
            Question::new(
                "Capital of Canada?",
                options(&["Toronto", "Ottawa", "Vancouver", "Montreal"]),
                "Ottawa",
            )?,
        ],
        owner.cloned(),
    );

    Ok(vec![math, capitals])
}

/// Write the sample quizzes; existing documents with the same ids are merged over.
///
/// # Errors
///
/// Returns `SeedError` if building or storing a quiz fails.
pub async fn seed_samples(store: &QuizStore, owner: Option<&UserId>) -> Result<Vec<QuizId>, SeedError> {
    let quizzes = sample_quizzes(owner)?;
    let mut ids = Vec::with_capacity(quizzes.len());
    for quiz in &quizzes {
        store.put_quiz(quiz).await?;
        ids.push(quiz.id().clone());
    }
    Ok(ids)
}
