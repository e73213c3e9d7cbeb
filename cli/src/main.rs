//! CLI entrypoint for denkeeper
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Result, anyhow, bail};
use clap::Parser;
use denkeeper_application::{AuditLog, WorkflowCoordinator};
use denkeeper_infrastructure::{
    ConfigLoader, FileLoggingConfig, InMemoryRelationshipStore, InMemorySubmissionStore,
    JsonlAuditLog, RoleDirectory,
};
use denkeeper_presentation::{Cli, ConsoleNotifier, HostCommand, SimulationHost};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    // === Configuration ===
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };

    // Keep the guard alive so the file writer flushes on exit.
    let _log_guard = init_tracing(cli.verbose, &config.logging);

    let issues = config.validate();
    for issue in issues.iter().filter(|i| i.is_warning()) {
        warn!("Config: {}", issue);
    }
    let errors: Vec<String> = issues
        .iter()
        .filter(|i| !i.is_warning())
        .map(|i| i.to_string())
        .collect();
    if !errors.is_empty() {
        bail!("Invalid configuration:\n  {}", errors.join("\n  "));
    }

    info!("Starting denkeeper");

    // === Dependency Injection ===
    let notifier = Arc::new(ConsoleNotifier::new());
    let authorizer = Arc::new(RoleDirectory::new(config.roles.capability_roles()));

    let mut coordinator = WorkflowCoordinator::new(
        config.to_workflow_config(),
        Arc::new(InMemoryRelationshipStore::new()),
        Arc::new(InMemorySubmissionStore::new()),
        notifier.clone(),
        authorizer.clone(),
    );

    if let Some(path) = cli.audit_log.as_ref().or(config.logging.audit_file.as_ref()) {
        let audit = JsonlAuditLog::open(path)
            .ok_or_else(|| anyhow!("Cannot open audit log {}", path.display()))?;
        info!("Recording decisions to {}", audit.path().display());
        let audit: Arc<dyn AuditLog> = Arc::new(audit);
        coordinator = coordinator.with_audit_log(audit);
    }

    let coordinator = Arc::new(coordinator);
    let sweeper = coordinator.spawn_sweeper();
    let host = SimulationHost::new(Arc::clone(&coordinator), notifier, authorizer);

    if !cli.quiet {
        println!("denkeeper {} - type 'help' for commands", env!("CARGO_PKG_VERSION"));
        println!();
        println!("{}", HostCommand::HELP);
        println!();
    }

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    tokio::select! {
        result = host.run(stdin) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted");
            host.finish().await;
        }
    }

    if let Err(e) = sweeper.await {
        warn!("Sweeper ended abnormally: {}", e);
    }
    info!("denkeeper stopped");
    Ok(())
}

/// Install the stderr subscriber, plus a daily-rolling file layer when a
/// log directory is configured.
fn init_tracing(verbose: u8, logging: &FileLoggingConfig) -> Option<WorkerGuard> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let (file_layer, guard) = match &logging.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, &logging.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    guard
}
