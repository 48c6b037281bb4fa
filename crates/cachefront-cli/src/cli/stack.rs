//! Stack lifecycle commands: `up`, `preview`, `destroy`.

use std::path::PathBuf;

use anyhow::Context;
use cachefront_core::provider::ApplyAction;
use cachefront_core::topology::{self, StackPlan};
use cachefront_core::engine;
use cachefront_infra::config::{self, ConfigFile};
use cachefront_infra::secret::chain::build_secret_chain;
use cachefront_infra::state::{LocalStateBackend, default_state_path};
use cachefront_types::config::StackSettings;
use cachefront_types::secret::Credentials;
use comfy_table::{Table, presets::UTF8_FULL_CONDENSED};
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;

use super::{Cli, display_url};

/// Everything a stack command needs: settings, resolved credentials, and
/// the opened state backend.
struct StackContext {
    settings: StackSettings,
    credentials: Option<Credentials>,
    backend: LocalStateBackend,
}

async fn load(cli: &Cli, prompt_credentials: bool) -> anyhow::Result<StackContext> {
    let config = config::load_config(&cli.config)
        .await
        .with_context(|| format!("loading {}", cli.config.display()))?;

    let credentials = if prompt_credentials {
        prompt_for_credentials()?
    } else {
        build_secret_chain(&config.credentials)
            .resolve()
            .await
            .context("resolving credentials")?
    };
    if credentials.is_none() {
        tracing::info!("no credential pair configured, edge authentication disabled");
    }

    let backend = open_backend(cli, &config).await?;
    Ok(StackContext {
        settings: config.settings,
        credentials,
        backend,
    })
}

async fn open_backend(cli: &Cli, config: &ConfigFile) -> anyhow::Result<LocalStateBackend> {
    let path = state_path(cli, &config.settings.project)?;
    LocalStateBackend::open(path, &config.settings)
        .await
        .context("opening state backend")
}

pub(crate) fn state_path(cli: &Cli, project: &str) -> anyhow::Result<PathBuf> {
    match &cli.state {
        Some(path) => Ok(path.clone()),
        None => Ok(default_state_path(project)?),
    }
}

/// Read both credentials interactively. An empty answer to either prompt
/// disables authentication, same as an absent secret.
fn prompt_for_credentials() -> anyhow::Result<Option<Credentials>> {
    let username: String = dialoguer::Input::new()
        .with_prompt("Basic-auth username (empty to disable)")
        .allow_empty(true)
        .interact_text()?;
    let password = dialoguer::Password::new()
        .with_prompt("Basic-auth password")
        .allow_empty_password(true)
        .interact()?;
    Ok(Credentials::from_parts(Some(username), Some(password)))
}

fn spinner(cli: &Cli, message: &'static str) -> Option<ProgressBar> {
    if cli.quiet || cli.json {
        return None;
    }
    let bar = ProgressBar::new_spinner().with_message(message);
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.enable_steady_tick(std::time::Duration::from_millis(100));
    Some(bar)
}

fn print_summary(cli: &Cli, summary: &engine::ApplySummary, url: Option<&str>) {
    if cli.json {
        let out = serde_json::json!({
            "actions": summary
                .actions
                .iter()
                .map(|(name, action)| serde_json::json!({
                    "resource": name.as_str(),
                    "action": action,
                }))
                .collect::<Vec<_>>(),
            "removed": summary.removed.iter().map(|n| n.as_str()).collect::<Vec<_>>(),
            "url": url,
        });
        // to_string_pretty on a just-built Value cannot fail
        println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
        return;
    }
    if cli.quiet {
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["RESOURCE", "ACTION"]);
    for (name, action) in &summary.actions {
        let styled = match action {
            ApplyAction::Create => console::style(action.to_string()).green(),
            ApplyAction::Update => console::style(action.to_string()).yellow(),
            ApplyAction::Unchanged => console::style(action.to_string()).dim(),
        };
        table.add_row(vec![name.to_string(), styled.to_string()]);
    }
    for name in &summary.removed {
        table.add_row(vec![
            name.to_string(),
            console::style("removed").red().to_string(),
        ]);
    }
    println!("{table}");

    if let Some(url) = url {
        println!();
        println!("  url: {}", console::style(url).cyan().bold());
    }
}

pub async fn up(
    cli: &Cli,
    prompt_credentials: bool,
    show_secrets: bool,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let ctx = load(cli, prompt_credentials).await?;
    let mut plan: StackPlan = topology::build_stack(&ctx.settings, ctx.credentials.clone())?;

    let bar = spinner(cli, "provisioning stack...");
    let result = engine::apply(&mut plan.graph, &ctx.backend, cancel).await;
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }
    let summary = result.context("provisioning failed")?;

    let domain = ctx
        .backend
        .resource_state(topology::DISTRIBUTION)
        .and_then(|state| state.output("domainName").map(String::from))
        .context("distribution produced no domain name")?;
    let url = display_url(&domain, ctx.credentials.as_ref(), show_secrets);

    print_summary(cli, &summary, Some(&url));
    Ok(())
}

pub async fn preview(
    cli: &Cli,
    prompt_credentials: bool,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let ctx = load(cli, prompt_credentials).await?;
    let mut plan = topology::build_stack(&ctx.settings, ctx.credentials)?;

    let summary = engine::preview(&mut plan.graph, &ctx.backend, cancel)
        .await
        .context("preview failed")?;

    print_summary(cli, &summary, None);
    Ok(())
}

pub async fn destroy(cli: &Cli, force: bool, cancel: &CancellationToken) -> anyhow::Result<()> {
    let ctx = load(cli, false).await?;
    if ctx.backend.is_empty() {
        if !cli.quiet && !cli.json {
            println!("nothing to destroy");
        }
        return Ok(());
    }

    if !force {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!(
                "Delete every resource of project '{}'?",
                ctx.settings.project
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            return Ok(());
        }
    }

    // The graph is rebuilt only to recover the dependency order; destroy
    // never materializes configs.
    let plan = topology::build_stack(&ctx.settings, ctx.credentials)?;
    let deleted = engine::destroy(&plan.graph, &ctx.backend, cancel)
        .await
        .context("destroy failed")?;

    if cli.json {
        let out = serde_json::json!({
            "deleted": deleted.iter().map(|n| n.as_str()).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
    } else if !cli.quiet {
        for name in &deleted {
            println!("  {} {name}", console::style("deleted").red());
        }
        println!("{} resource(s) deleted", deleted.len());
    }
    Ok(())
}
