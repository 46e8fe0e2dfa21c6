//! CLI argument structs for all subcommands.

use std::path::PathBuf;

use clap::{Args, Parser};

use ticket_search::tickets::DEFAULT_PAGE_SIZE;

/// Options shared by every command that builds a ticket backend.
#[derive(Args, Debug, Clone)]
pub struct BackendArgs {
    /// Ticket file: JSON array of {title, assignedToName, status, dateCreated}
    #[arg(short, long)]
    pub tickets: PathBuf,

    /// User whose tickets the 'assignedrequests' command returns
    #[arg(short, long)]
    pub assignee: Option<String>,

    /// Page size used when a query carries no count
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: u32,
}

#[derive(Parser, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub backend: BackendArgs,
}

#[derive(Parser, Debug)]
#[command(after_long_help = r#"EXAMPLES:
  From a file:   ticket-search query -t tickets.json --activity activity.json
  From stdin:    echo '{"type":"invoke","name":"composeExtension/query","value":{"commandId":"recents"}}' | ticket-search query -t tickets.json

NOTES:
  - Prints the invoke response as JSON.
  - Prints nothing when the activity is not a composeExtension/query."#)]
pub struct QueryArgs {
    #[command(flatten)]
    pub backend: BackendArgs,

    /// Activity JSON file (reads stdin when omitted)
    #[arg(long)]
    pub activity: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct TicketsArgs {
    /// Ticket file to validate and summarize
    #[arg(short, long)]
    pub tickets: PathBuf,
}
