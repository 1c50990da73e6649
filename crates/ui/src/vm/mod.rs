mod quiz_vm;

pub use quiz_vm::{QuizIntent, QuizLoad, QuizVm, start_quiz};
