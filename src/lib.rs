pub mod cli;
pub mod config;
pub mod engine;
pub mod observers;
pub mod output;
pub mod report;
pub mod states;
pub mod stream;
