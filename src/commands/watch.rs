use std::sync::Arc;

use owo_colors::OwoColorize;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::Config;
use crate::display::format_ticket_card;
use crate::error::Result;
use crate::session::DeskSession;
use crate::sync::{CollectionState, FilterCriteria};

const HELP: &str = "Type to search. /clear resets filters, /refresh reloads, /quit exits.";

/// Live ticket list. The first load is printed, then each stdin line is fed
/// through the debounced search input and the list is reprinted whenever it
/// changes. Ends at `/quit` or end of input.
pub async fn cmd_watch(criteria: FilterCriteria) -> Result<()> {
    let config = Config::load()?;
    let session = DeskSession::connect_with_filters(config, criteria)?;
    let _tasks = session.start();

    let mut state_rx = session.collection().subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    eprintln!("{}", HELP.dimmed());

    let first = state_rx
        .wait_for(|s| !s.loading && (s.loaded || s.error.is_some()))
        .await
        .map(|state| state.clone());
    if let Ok(state) = first {
        render(&session, &state);
    }

    loop {
        tokio::select! {
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = state_rx.borrow_and_update().clone();
                render(&session, &state);
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match line.trim() {
                    "/quit" | "/q" => break,
                    "/clear" => session.search().clear_filters(),
                    "/refresh" => {
                        let collection = Arc::clone(session.collection());
                        let stats = Arc::clone(session.stats());
                        tokio::spawn(async move {
                            tokio::join!(collection.refresh(), stats.refresh());
                        });
                    }
                    _ => session.search().on_input(line.as_str()),
                }
            }
        }
    }
    Ok(())
}

fn render(session: &DeskSession, state: &CollectionState) {
    if state.loading {
        return;
    }

    println!("{}", describe_criteria(&state.criteria).bold());
    if let Some(message) = state.error_message() {
        println!("{}", message.red());
    }
    if state.tickets.is_empty() {
        if state.loaded {
            println!("{}", session.collection().empty_message().dimmed());
        }
    } else {
        for ticket in &state.tickets {
            println!("{}", format_ticket_card(ticket));
        }
    }
    println!();
}

fn describe_criteria(criteria: &FilterCriteria) -> String {
    if !criteria.has_active_filters() {
        return "All tickets".to_string();
    }
    let parts: Vec<String> = criteria
        .query_pairs()
        .into_iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect();
    format!("Tickets ({})", parts.join(", "))
}
