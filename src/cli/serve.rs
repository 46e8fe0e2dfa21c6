//! Stdio server startup.

use tracing::info;

use ticket_search::extension::server::run_server;
use ticket_search::ExtensionError;

use super::args::ServeArgs;
use super::build_dispatcher;

pub async fn cmd_serve(args: ServeArgs) -> Result<(), ExtensionError> {
    info!(
        tickets = %args.backend.tickets.display(),
        assignee = args.backend.assignee.as_deref().unwrap_or(""),
        page_size = args.backend.page_size,
        "Starting extension query server"
    );
    let dispatcher = build_dispatcher(&args.backend).await?;
    run_server(dispatcher).await
}
