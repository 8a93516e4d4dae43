//! Evaluation dispatch CLI command.
//!
//! Reads one `EvaluationEvent` as JSON, runs it through a freshly started
//! engine, and prints the resolved next attempt. Intended for operational
//! replay and local testing; production traffic arrives through the library
//! API.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::application::Engine;
use crate::domain::models::{Config, EvaluationEvent};

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Path to the event JSON; reads stdin when omitted
    #[arg(long)]
    pub file: Option<PathBuf>,
}

pub async fn execute(args: EvaluateArgs, config: &Config, json_mode: bool) -> Result<()> {
    let raw = match args.file {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read event from stdin")?;
            buf
        }
    };
    let event: EvaluationEvent =
        serde_json::from_str(&raw).context("Failed to parse evaluation event")?;

    let engine = Engine::start(config).await?;
    let outcome = engine.dispatcher().handle(&event).await?;
    engine.shutdown().await;

    if json_mode {
        println!(
            "{}",
            serde_json::json!({ "next_attempt": outcome.next_attempt })
        );
    } else {
        match outcome.next_attempt {
            Some(attempt) => println!(
                "Next attempt for element {}: id {} value {}",
                attempt.element_id, attempt.id, attempt.value
            ),
            None => println!("No next attempt resolved"),
        }
    }
    Ok(())
}
