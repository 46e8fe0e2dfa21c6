//! tickets command: load a ticket file and print what it contains.

use ticket_search::tickets::TicketSummary;
use ticket_search::{ExtensionError, TicketIndex};

use super::args::TicketsArgs;

pub async fn cmd_tickets(args: TicketsArgs) -> Result<(), ExtensionError> {
    let index = TicketIndex::load(&args.tickets).await?;
    print!("{}", render_summary(&args.tickets.display().to_string(), &index.summary()));
    Ok(())
}

fn render_summary(path: &str, summary: &TicketSummary) -> String {
    let mut out = format!(
        "Tickets in {}: {} ({} open, {} closed, {} untitled)\n",
        path, summary.total, summary.open, summary.closed, summary.untitled
    );
    if summary.assignees.is_empty() {
        out.push_str("  No assignees\n");
    } else {
        out.push_str(&format!("  Assignees ({}):\n", summary.assignees.len()));
        for name in &summary.assignees {
            out.push_str(&format!("    {}\n", name));
        }
    }
    out
}
