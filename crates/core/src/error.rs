use thiserror::Error;

use crate::model::{ParseIdError, ParsePolicyError, QuestionError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Id(#[from] ParseIdError),
    #[error(transparent)]
    Policy(#[from] ParsePolicyError),
}
