pub mod config;
pub mod fetch;
pub mod ingest;
pub mod output;
pub mod pipeline;
pub mod wind;
