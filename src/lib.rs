pub mod app;
pub mod assistant;
pub mod commands;
pub mod config;
pub mod function;
pub mod llm;
pub mod logging;
pub mod palette;
pub mod quiz;
pub mod section;
pub mod speech;
pub mod tui;
pub mod utils;
