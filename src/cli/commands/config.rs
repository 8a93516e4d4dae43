//! Config inspection CLI command.

use anyhow::Result;

use crate::domain::models::Config;

pub fn execute(config: &Config, json_mode: bool) -> Result<()> {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(config)?);
    } else {
        println!("database.url: {}", config.database.url);
        println!("database.max_connections: {}", config.database.max_connections);
        println!("logging.level: {}", config.logging.level);
        println!("logging.format: {}", config.logging.format);
        println!("queue.capacity: {}", config.queue.capacity);
    }
    Ok(())
}
