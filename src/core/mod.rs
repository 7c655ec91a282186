// src/core/mod.rs
pub mod engine;
pub mod index;
pub mod phonetics;
pub mod types;
pub mod word_list;
