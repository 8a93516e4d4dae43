pub mod config;
pub mod evaluate;
pub mod migrate;
