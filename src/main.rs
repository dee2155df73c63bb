//! Importer - product CSV import coordinator
//!
//! Uploads catalog files to the import service, follows their progress, and
//! manages products and webhooks from the command line.
//!
//! ## Usage
//!
//! ```bash
//! # Upload a file and follow the import
//! importer upload products.csv
//!
//! # Watch the import job table, failed jobs only
//! importer jobs --watch --status failed
//!
//! # Send a test event to webhook 3
//! importer webhooks test 3
//!
//! # Against another server, with verbose logging
//! importer -v --base-url http://imports.internal:8000 products list
//! ```

mod prompt;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use importer_client::{ClientError, HttpImportApi};
use importer_config::ImporterConfig;
use importer_core::{ImportStatus, ImporterError, ProductFilter, init_logging};
use importer_tracker::{AutoConfirm, ImportCoordinator, TrackerError, TrackerSettings, View};
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info};

use crate::prompt::StdinConfirm;

/// Product import coordinator
///
/// Uploads CSV files to the import service, tracks import progress and
/// manages the product catalog and its webhooks.
#[derive(Parser, Debug)]
#[command(name = "importer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging (increases log level)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Directory for log files (defaults to ~/.importer/logs/)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Config file (defaults to ~/.importer/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Import service URL, overriding the config file
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a CSV file and follow the import until it finishes
    Upload { file: PathBuf },

    /// Show import jobs
    Jobs {
        /// Keep refreshing until interrupted
        #[arg(long)]
        watch: bool,
        /// Only jobs in this status (pending, processing, completed, failed)
        #[arg(long)]
        status: Option<ImportStatus>,
    },

    /// Browse and delete products
    #[command(subcommand)]
    Products(ProductsCommand),

    /// Manage webhooks
    #[command(subcommand)]
    Webhooks(WebhooksCommand),
}

#[derive(Subcommand, Debug)]
enum ProductsCommand {
    /// List one page of products
    List(ProductListArgs),
    /// Delete one product
    Delete { id: i64 },
    /// Delete every product
    DeleteAll {
        /// Skip the typed confirmation
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
struct ProductListArgs {
    #[arg(long, default_value_t = 1)]
    page: u32,
    /// Partial SKU match
    #[arg(long)]
    sku: Option<String>,
    /// Partial name match
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    active: Option<bool>,
}

#[derive(Subcommand, Debug)]
enum WebhooksCommand {
    /// List webhooks with their last response
    List,
    /// Send a test event to a webhook
    Test { id: i64 },
    /// Show recent deliveries of a webhook
    Logs {
        id: i64,
        #[arg(long, default_value_t = 50)]
        limit: u32,
    },
    /// Delete a webhook
    Delete { id: i64 },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match init_logging(cli.log_dir.clone(), cli.verbose > 0) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::from(1);
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("importer error: {:#}", e);
            eprintln!("Error: {:#}", e);
            if let Some(hint) = hint(&e) {
                eprintln!("Hint: {}", hint);
            }
            ExitCode::from(1)
        }
    }
}

/// Advice for errors whose message alone does not say what to do.
fn hint(e: &anyhow::Error) -> Option<String> {
    if let Some(err) = e.downcast_ref::<ImporterError>() {
        return err.guidance().map(str::to_string);
    }
    e.downcast_ref::<TrackerError>()
        .and_then(TrackerError::client_error)
        .or_else(|| e.downcast_ref::<ClientError>())
        // Server answers already carry their detail in the message.
        .filter(|client| client.status().is_none())
        .map(ClientError::friendly_message)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = ImporterConfig::load(cli.config.as_deref()).context("loading config")?;
    if let Some(url) = cli.base_url {
        config = config.with_base_url(url);
        config.validate()?;
    }
    info!(base_url = %config.server.base_url, "starting importer");

    let api = Arc::new(HttpImportApi::from_config(&config.server)?);
    let settings = TrackerSettings::from_config(&config);
    let skip_confirm = matches!(cli.command, Command::Products(ProductsCommand::DeleteAll { yes: true }));
    let coordinator = if skip_confirm {
        ImportCoordinator::new(api, settings).with_confirmation(Arc::new(AutoConfirm::accept_all()))
    } else {
        ImportCoordinator::new(api, settings).with_confirmation(Arc::new(StdinConfirm))
    };
    print_notifications(&coordinator);

    let result = match cli.command {
        Command::Upload { file } => upload(&coordinator, file).await,
        Command::Jobs { watch, status } => jobs(&coordinator, watch, status).await,
        Command::Products(command) => products(&coordinator, command).await,
        Command::Webhooks(command) => webhooks(&coordinator, command).await,
    };

    coordinator.shutdown();
    // Let the printer drain what was emitted last.
    tokio::task::yield_now().await;
    result
}

/// Echo notifications to stderr as they are emitted.
fn print_notifications(coordinator: &ImportCoordinator) {
    let mut notifications = coordinator.notifier().subscribe();
    tokio::spawn(async move {
        loop {
            match notifications.recv().await {
                Ok(notification) => eprintln!("{}", notification.format_compact()),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    });
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

async fn upload(coordinator: &ImportCoordinator, file: PathBuf) -> anyhow::Result<()> {
    let task_id = coordinator.upload(Some(file.as_path())).await?;
    println!("Tracking import {}", task_id);

    let poll_interval = coordinator.settings().poll_interval;
    let mut last_line = String::new();
    let interrupted = tokio::select! {
        _ = async {
            loop {
                tokio::time::sleep(poll_interval / 2).await;
                // Read before printing so the terminal update is shown.
                let armed = coordinator.poller().is_armed();
                if let Some(view) = coordinator.progress_view() {
                    let line = render::progress_line(&view);
                    if line != last_line {
                        println!("{}", line);
                        last_line = line;
                    }
                }
                if !armed {
                    break;
                }
            }
        } => false,
        _ = shutdown_signal() => true,
    };
    if interrupted {
        println!("Stopped tracking {}; the import continues on the server", task_id);
        return Ok(());
    }

    match coordinator.snapshot().progress {
        Some(task) if task.status == ImportStatus::Failed => bail!("import {} failed", task_id),
        Some(task) if task.status == ImportStatus::Completed => Ok(()),
        _ => bail!("lost track of import {}", task_id),
    }
}

async fn jobs(
    coordinator: &ImportCoordinator,
    watch: bool,
    status: Option<ImportStatus>,
) -> anyhow::Result<()> {
    coordinator.filter_jobs(status).await?;
    if !watch {
        render::print_jobs(&coordinator.jobs_table());
        return Ok(());
    }

    coordinator.switch_view(View::Jobs).await;
    let refresh = coordinator.settings().jobs_refresh_interval;
    let mut shown = coordinator.jobs_table();
    render::print_jobs(&shown);

    tokio::select! {
        _ = async {
            loop {
                tokio::time::sleep(refresh).await;
                let table = coordinator.jobs_table();
                if table != shown {
                    println!();
                    render::print_jobs(&table);
                    shown = table;
                }
            }
        } => {}
        _ = shutdown_signal() => {}
    }
    Ok(())
}

async fn products(coordinator: &ImportCoordinator, command: ProductsCommand) -> anyhow::Result<()> {
    match command {
        ProductsCommand::List(args) => {
            let filter = ProductFilter {
                sku: args.sku,
                name: args.name,
                is_active: args.active,
                ..ProductFilter::default()
            };
            let mut page = coordinator.filter_products(filter).await?;
            if args.page > 1 {
                page = coordinator.go_to_page(args.page).await?;
            }
            render::print_products(&coordinator.product_rows(), page.page, page.pages, page.total);
        }
        ProductsCommand::Delete { id } => coordinator.delete_product(id).await?,
        ProductsCommand::DeleteAll { .. } => {
            coordinator.delete_all_products().await?;
        }
    }
    Ok(())
}

async fn webhooks(coordinator: &ImportCoordinator, command: WebhooksCommand) -> anyhow::Result<()> {
    match command {
        WebhooksCommand::List => {
            coordinator.load_webhooks().await?;
            render::print_webhooks(&coordinator.webhook_rows());
        }
        WebhooksCommand::Test { id } => {
            coordinator.load_webhooks().await?;
            let outcome = coordinator.test_webhook(id).await;
            // The list reload lands before the button restore unless the test was slow.
            while coordinator.pending_button_restores() > 0 {
                tokio::time::sleep(coordinator.settings().webhook_reload_delay / 4).await;
            }
            let rows = coordinator.webhook_rows();
            render::print_webhooks(&rows.into_iter().filter(|r| r.id == id).collect::<Vec<_>>());
            if !outcome?.success {
                bail!("webhook {} did not accept the test event", id);
            }
        }
        WebhooksCommand::Logs { id, limit } => {
            let logs = coordinator.webhook_logs(id, 0, limit).await?;
            render::print_webhook_logs(&logs);
        }
        WebhooksCommand::Delete { id } => coordinator.delete_webhook(id).await?,
    }
    Ok(())
}
