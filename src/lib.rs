pub mod config;
pub mod constants;
pub mod episode;
pub mod queue;
pub mod utils;
