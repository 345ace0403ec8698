pub mod clustering;
pub mod hierarchy;
pub mod tfidf;
pub mod tokenizer;
