//! `cachefront edge-eval` -- run the edge decision function locally.
//!
//! Feeds a CloudFront-shaped event JSON file through the same decision
//! logic the deployed authenticator runs, and prints the outcome: the
//! forwarded request, or the 401 response. Useful for checking header
//! wiring and credential values before a deploy.

use std::path::Path;

use anyhow::Context;
use cachefront_core::edge;
use cachefront_types::edge::{EdgeDecision, EdgeEvent};

use super::Cli;

pub async fn eval(cli: &Cli, event_path: &Path) -> anyhow::Result<()> {
    let content = tokio::fs::read_to_string(event_path)
        .await
        .with_context(|| format!("reading {}", event_path.display()))?;
    let event: EdgeEvent = serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", event_path.display()))?;

    let decision = edge::handle_event(event).context("malformed event")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&decision)?);
        return Ok(());
    }

    match &decision {
        EdgeDecision::Forward(request) => {
            println!(
                "{} request forwarded to origin ({} {})",
                console::style("pass").green().bold(),
                request.method,
                request.uri,
            );
        }
        EdgeDecision::Reject(response) => {
            println!(
                "{} {} {}",
                console::style("reject").red().bold(),
                response.status,
                response.status_description,
            );
        }
    }
    if !cli.quiet {
        println!("{}", serde_json::to_string_pretty(&decision)?);
    }
    Ok(())
}
