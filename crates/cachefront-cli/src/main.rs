//! cachefront CLI entry point.
//!
//! Binary name: `cachefront`
//!
//! Parses CLI arguments, initializes tracing, then dispatches to the
//! appropriate command handler. A Ctrl-C handler trips the cancellation
//! token; an in-flight run stops at the next wave boundary and leaves
//! partially provisioned resources for the next reconciling run.

mod cli;

use clap::Parser;
use clap_complete::generate;
use tokio_util::sync::CancellationToken;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,cachefront=debug",
        _ => "trace",
    };
    cachefront_observe::tracing_setup::init_tracing(filter, cli.json, cli.otel)
        .map_err(|err| anyhow::anyhow!("failed to initialize tracing: {err}"))?;

    // Shell completions don't need config or state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "cachefront", &mut std::io::stdout());
        return Ok(());
    }

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received, stopping at the next wave boundary");
                cancel.cancel();
            }
        });
    }

    let result = match &cli.command {
        Commands::Up {
            prompt_credentials,
            show_secrets,
        } => cli::stack::up(&cli, *prompt_credentials, *show_secrets, &cancel).await,

        Commands::Preview { prompt_credentials } => {
            cli::stack::preview(&cli, *prompt_credentials, &cancel).await
        }

        Commands::Destroy { force } => cli::stack::destroy(&cli, *force, &cancel).await,

        Commands::Output { show_secrets } => cli::output::show(&cli, *show_secrets).await,

        Commands::EdgeEval { event } => cli::edge::eval(&cli, event).await,

        Commands::Completions { .. } => unreachable!("handled above"),
    };

    cachefront_observe::tracing_setup::shutdown_tracing();
    result
}
