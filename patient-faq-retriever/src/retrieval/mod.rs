pub mod namespace;
pub mod ranking;
pub mod scoring;
pub mod search_engine;
pub mod tokenizer;
