//! Migration CLI command.

use anyhow::Result;
use tracing::info;

use crate::domain::models::Config;
use crate::infrastructure::database::DatabaseConnection;

pub async fn execute(config: &Config, json_mode: bool) -> Result<()> {
    let db = DatabaseConnection::new(&config.database.url, config.database.max_connections).await?;
    db.migrate().await?;
    db.close().await;

    if json_mode {
        println!("{}", serde_json::json!({ "status": "ok" }));
    } else {
        info!(database = %config.database.url, "migrations applied");
        println!("Migrations applied to {}", config.database.url);
    }
    Ok(())
}
