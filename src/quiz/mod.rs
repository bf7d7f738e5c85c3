//! Quizzes over search results

mod engine;
mod progress;
mod spec;

pub use engine::{QuizEngine, ResponseStatus};
pub use progress::QuizProgress;
pub use spec::{QuestionOrder, QuizSpec, QuizType};
