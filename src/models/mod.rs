pub mod grade;
pub mod loaders;
pub mod quiz;

pub use grade::{GradedQuestion, QuizResult};
pub use loaders::load_quiz_job;
pub use quiz::{
    Difficulty, MatchingPair, Question, QuestionType, QuestionView, QuizConfiguration,
    UploadedDocument, UserAnswer,
};
