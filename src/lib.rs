pub mod config;
pub mod engine;
pub mod feed;
pub mod history;
pub mod output;
pub mod pipeline;
pub mod season;
