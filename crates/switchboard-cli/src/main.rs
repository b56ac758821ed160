//! Switchboard CLI - routes one support request to a specialized handler.
//!
//! Collects the session attributes (from flags or prompts), runs a single
//! session against the configured reasoning backend and prints the result.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use switchboard_config::{Config, RoutingStrategy};
use switchboard_runtime::config_bridge;
use switchboard_runtime::{Dispatcher, Engine, HandlerCatalog};
use tokio_util::sync::CancellationToken;
use tracing::debug;

mod prompts;
mod theme;

use prompts::{Provided, parse_yes_no};
use theme::{Theme, print_banner};

/// Switchboard - support request routing
#[derive(Parser)]
#[command(name = "switchboard")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Your name
    #[arg(long)]
    name: Option<String>,

    /// Premium user (yes/no)
    #[arg(long, value_parser = parse_yes_no)]
    premium: Option<bool>,

    /// Issue type: billing, technical or general
    #[arg(long)]
    issue_type: Option<String>,

    /// Description of the issue
    #[arg(long)]
    request: Option<String>,

    /// Path to a configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the routing strategy
    #[arg(long, value_enum)]
    routing: Option<RoutingArg>,

    /// Print the session report as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum RoutingArg {
    Table,
    Llm,
}

impl From<RoutingArg> for RoutingStrategy {
    fn from(arg: RoutingArg) -> Self {
        match arg {
            RoutingArg::Table => Self::Table,
            RoutingArg::Llm => Self::Llm,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let resolved = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    let mut cfg = resolved.config;
    if let Some(routing) = cli.routing {
        cfg.routing.strategy = routing.into();
    }

    let mut log_config = config_bridge::to_log_config(&cfg);
    if cli.verbose {
        "debug".clone_into(&mut log_config.level);
    }
    if let Err(e) = switchboard_telemetry::setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }
    debug!(files = ?resolved.loaded_files, "configuration loaded");

    print_banner();
    let (ctx, request) = prompts::collect(Provided {
        name: cli.name,
        premium: cli.premium,
        issue_type: cli.issue_type,
        request: cli.request,
    })?;

    let llm = Arc::new(
        config_bridge::build_provider(&cfg).context("failed to configure the reasoning backend")?,
    );
    let catalog = HandlerCatalog::standard();
    let router = config_bridge::build_router(&cfg, &catalog, Arc::clone(&llm));
    let dispatcher = Dispatcher::new(
        router,
        Engine::new(llm, config_bridge::to_engine_config(&cfg)),
    );

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    println!("\n{}", Theme::status("Routing your query..."));
    let report = dispatcher.handle_with_cancel(&ctx, &request, &cancel).await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    println!("\n{}", Theme::header("Final Output:"));
    if report.is_success() {
        println!("{}", Theme::success(&report.final_text()));
        Ok(ExitCode::SUCCESS)
    } else {
        println!("{}", Theme::error(&report.final_text()));
        if let Err(error) = &report.outcome {
            debug!(kind = %error.kind(), %error, "session failed");
        }
        Ok(ExitCode::FAILURE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "switchboard",
            "--name",
            "Ava",
            "--premium",
            "yes",
            "--issue-type",
            "billing",
            "--request",
            "please refund me",
            "--routing",
            "llm",
        ])
        .unwrap();

        assert_eq!(cli.name.as_deref(), Some("Ava"));
        assert_eq!(cli.premium, Some(true));
        assert!(matches!(cli.routing, Some(RoutingArg::Llm)));
        assert!(!cli.json);
    }

    #[test]
    fn test_cli_rejects_bad_premium() {
        assert!(Cli::try_parse_from(["switchboard", "--premium", "sometimes"]).is_err());
    }

    #[test]
    fn test_routing_arg_conversion() {
        assert_eq!(RoutingStrategy::from(RoutingArg::Table), RoutingStrategy::Table);
    }
}
