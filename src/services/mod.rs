pub mod llm;
pub mod prompts;
pub mod stats;
pub mod summary_generator;
pub mod tag_extractor;
