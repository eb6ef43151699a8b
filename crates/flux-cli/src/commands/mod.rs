pub mod config;
pub mod interactive;
pub mod search;
mod utils;
