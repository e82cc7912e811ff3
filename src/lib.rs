pub mod cli;
pub mod error;
pub mod rewrite;
pub mod rules;
pub mod target;
