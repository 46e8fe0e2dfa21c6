//! CLI layer: argument parsing, logging setup, and command dispatch.

pub mod args;
mod serve;
mod tickets;

pub use args::*;

use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tokio::io::AsyncReadExt;

use ticket_search::extension::protocol::Activity;
use ticket_search::extension::server::answer_activity;
use ticket_search::{ExtensionError, QueryDispatcher, TicketIndex, TracingTelemetry};

// ─── CLI ─────────────────────────────────────────────────────────────

/// Messaging-extension ticket search: answers composeExtension/query activities
#[derive(Parser, Debug)]
#[command(name = "ticket-search", version, about, after_help = "\
Run 'ticket-search <COMMAND> --help' for detailed options and examples.\n\
Common options: -t <FILE> (ticket file), -a <NAME> (assignee for 'assignedrequests')")]
pub(crate) struct Cli {
    /// Log level for stderr output (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Log line format for stderr output
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Serve activities over stdio (one JSON activity per line).
    Serve(ServeArgs),

    /// Answer a single activity and print the response.
    Query(QueryArgs),

    /// Validate a ticket file and print a summary.
    Tickets(TicketsArgs),
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

// ─── Main entry point ───────────────────────────────────────────────

pub fn run() {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_format);

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to start async runtime: {}", e);
            std::process::exit(1);
        }
    };

    let result = runtime.block_on(async {
        match cli.command {
            Commands::Serve(args) => serve::cmd_serve(args).await,
            Commands::Query(args) => cmd_query(args).await,
            Commands::Tickets(args) => tickets::cmd_tickets(args).await,
        }
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn parse_log_level(level: &str) -> tracing::Level {
    match level {
        "error" => tracing::Level::ERROR,
        "warn" => tracing::Level::WARN,
        "debug" => tracing::Level::DEBUG,
        "trace" => tracing::Level::TRACE,
        _ => tracing::Level::INFO,
    }
}

/// Install the stderr subscriber. stdout is reserved for protocol output.
fn init_logging(level: &str, format: LogFormat) {
    let builder = tracing_subscriber::fmt()
        .with_max_level(parse_log_level(level))
        .with_target(true)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Load the ticket file and wire a dispatcher around it.
pub(crate) async fn build_dispatcher(args: &BackendArgs) -> Result<QueryDispatcher, ExtensionError> {
    if args.page_size == 0 {
        return Err(ExtensionError::InvalidArgs("--page-size must be at least 1".to_string()));
    }
    let index = TicketIndex::load(&args.tickets)
        .await?
        .with_assignee(args.assignee.clone())
        .with_page_size(args.page_size);
    if index.assignee().is_none() {
        tracing::warn!("No --assignee given; 'assignedrequests' will return no tickets");
    }
    Ok(QueryDispatcher::new(Arc::new(index), Arc::new(TracingTelemetry)))
}

// ─── Small commands ─────────────────────────────────────────────────

async fn cmd_query(args: QueryArgs) -> Result<(), ExtensionError> {
    let dispatcher = build_dispatcher(&args.backend).await?;

    let raw = match &args.activity {
        Some(path) => tokio::fs::read_to_string(path).await?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await?;
            buf
        }
    };
    let activity: Activity = serde_json::from_str(&raw)
        .map_err(|e| ExtensionError::InvalidArgs(format!("Activity is not valid JSON: {}", e)))?;

    if let Some(reply) = answer_activity(&dispatcher, activity).await {
        println!("{}", reply);
    }
    Ok(())
}
