//! `cachefront output` -- print the published URL from existing state.

use anyhow::Context;
use cachefront_core::topology;
use cachefront_infra::config;
use cachefront_infra::secret::chain::build_secret_chain;
use cachefront_infra::state::LocalStateBackend;

use super::{Cli, display_url};

pub async fn show(cli: &Cli, show_secrets: bool) -> anyhow::Result<()> {
    let config = config::load_config(&cli.config)
        .await
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let credentials = build_secret_chain(&config.credentials)
        .resolve()
        .await
        .context("resolving credentials")?;

    let path = super::stack::state_path(cli, &config.settings.project)?;
    let backend = LocalStateBackend::open(path, &config.settings)
        .await
        .context("opening state backend")?;

    let domain = backend
        .resource_state(topology::DISTRIBUTION)
        .and_then(|state| state.output("domainName").map(String::from))
        .context("no provisioned distribution in state; run `cachefront up` first")?;
    let url = display_url(&domain, credentials.as_ref(), show_secrets);

    if cli.json {
        let out = serde_json::json!({ "url": url });
        println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
    } else {
        println!("{url}");
    }
    Ok(())
}
