use owo_colors::OwoColorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::sync::stats::breakdown_percentage;
use crate::types::{Category, Priority, Ticket, TicketStats};

use super::data_formatting::{
    DESCRIPTION_EXCERPT_LEN, format_timestamp, percentage_bar, truncate_description,
};
use super::{format_priority_colored, format_status_colored};

const BAR_WIDTH: usize = 20;

/// Format a ticket for single-line display with colors
pub fn format_ticket_line(ticket: &Ticket) -> String {
    let id = format!("#{:<5}", ticket.id);
    format!(
        "{} {} {} {} - {}",
        id.cyan(),
        format_status_colored(ticket.status),
        format_priority_colored(ticket.priority),
        ticket.category.label().dimmed(),
        ticket.title
    )
}

/// Multi-line card: header line, description excerpt and creation time.
pub fn format_ticket_card(ticket: &Ticket) -> String {
    format!(
        "{}\n  {}\n  {}",
        format_ticket_line(ticket),
        truncate_description(&ticket.description, DESCRIPTION_EXCERPT_LEN),
        format_timestamp(ticket.created_at).dimmed()
    )
}

#[derive(Tabled)]
struct TicketRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Category")]
    category: &'static str,
    #[tabled(rename = "Priority")]
    priority: &'static str,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Created")]
    created: String,
}

/// Plain table of tickets, without colors so column widths stay exact.
pub fn format_ticket_table(tickets: &[Ticket]) -> String {
    let rows = tickets.iter().map(|ticket| TicketRow {
        id: ticket.id,
        title: ticket.title.clone(),
        category: ticket.category.label(),
        priority: ticket.priority.label(),
        status: ticket.status.label(),
        created: format_timestamp(ticket.created_at),
    });
    Table::new(rows).with(Style::rounded()).to_string()
}

fn breakdown_line(label: &str, value: u64, total: u64) -> String {
    let percent = breakdown_percentage(value, total);
    format!(
        "  {:<10} {} {:>3}% ({})",
        label,
        percentage_bar(percent, BAR_WIDTH),
        percent,
        value
    )
}

/// Statistics dashboard as text.
pub fn format_stats(stats: &TicketStats) -> String {
    let total = stats.total_tickets;
    let mut out = String::new();

    out.push_str(&format!("{}\n", "Ticket statistics".cyan().bold()));
    out.push_str(&format!("  Total:        {total}\n"));
    out.push_str(&format!("  Open:         {}\n", stats.open_tickets));
    out.push_str(&format!("  In progress:  {}\n", stats.in_progress_tickets));
    out.push_str(&format!("  Resolved:     {}\n", stats.resolved_tickets));
    out.push_str(&format!("  Avg per day:  {:.1}\n", stats.avg_tickets_per_day));

    out.push_str(&format!("\n{}\n", "By priority".cyan()));
    for priority in Priority::ALL {
        let value = stats.priority_breakdown.get(priority);
        out.push_str(&breakdown_line(priority.label(), value, total));
        out.push('\n');
    }

    out.push_str(&format!("\n{}\n", "By category".cyan()));
    for category in Category::ALL {
        let value = stats.category_breakdown.get(category);
        out.push_str(&breakdown_line(category.label(), value, total));
        out.push('\n');
    }
    out
}
