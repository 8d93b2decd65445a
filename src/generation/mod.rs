// src/generation/mod.rs
//
// The exercise-generation pipeline: prompt construction, the outbound
// text-generation client, and the reply parser.

pub mod client;
pub mod parser;
pub mod prompt;

pub use client::{OpenAiGenerator, QuestionGenerator};
pub use parser::{ParsedQuestion, ParserPolicy, parse_questions};
pub use prompt::ExercisePrompt;
