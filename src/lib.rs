pub mod cache;
pub mod commands;
pub mod error;
pub mod export;
pub mod generator;
pub mod llm;
pub mod palette;
pub mod parser;
pub mod question;
pub mod utils;

pub use cache::{CacheEntry, GenerationCache};
pub use error::{GenerationError, GenerationResult};
pub use generator::QuizGenerator;
pub use parser::Identity;
pub use question::{Credential, GenerationRequest, Question};
