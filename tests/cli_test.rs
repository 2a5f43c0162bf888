#[path = "common/mod.rs"]
mod common;

use common::DeskTest;
use mockito::Matcher;
use std::fs;

const TICKETS_JSON: &str = r#"[
    {
        "id": 7,
        "title": "Refund not received",
        "description": "Ordered in March, still waiting",
        "category": "billing",
        "priority": "high",
        "status": "open",
        "created_at": "2025-03-04T14:30:00Z"
    },
    {
        "id": 3,
        "title": "Cannot log in",
        "description": "Password reset email never arrives",
        "category": "account",
        "priority": "critical",
        "status": "in_progress",
        "created_at": "2025-03-01T09:00:00Z"
    }
]"#;

/// A test directory whose config points at `api_url`.
fn desk_for(api_url: &str) -> DeskTest {
    let desk = DeskTest::new();
    desk.run_success(&["config", "set", "api_url", api_url]);
    desk
}

/// A base URL on a port nothing listens on.
fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api")
}

// ============================================================================
// Config command tests
// ============================================================================

#[test]
fn test_config_show_defaults() {
    let desk = DeskTest::new();

    let output = desk.run_success(&["config", "show"]);
    assert!(output.contains("Configuration"));
    assert!(output.contains("http://localhost:8000/api"));
    assert!(output.contains("search_debounce_ms"));
}

#[test]
fn test_config_show_json() {
    let desk = DeskTest::new();

    let output = desk.run_success(&["config", "show", "--json"]);
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(json["api_url"], "http://localhost:8000/api");
    assert_eq!(json["request_timeout_secs"], 10);
    assert_eq!(json["require_category_priority"], true);
}

#[test]
fn test_config_set_and_get() {
    let desk = DeskTest::new();

    desk.run_success(&["config", "set", "classify_min_chars", "20"]);
    let output = desk.run_success(&["config", "get", "classify_min_chars"]);
    assert_eq!(output.trim(), "20");

    let config_path = desk.temp_dir.path().join(".ticketdesk").join("config.yaml");
    let content = fs::read_to_string(config_path).unwrap();
    assert!(content.contains("classify_min_chars: 20"));
}

#[test]
fn test_config_set_invalid_key() {
    let desk = DeskTest::new();

    let stderr = desk.run_failure(&["config", "set", "theme", "dark"]);
    assert!(stderr.contains("unknown config key"));
}

#[test]
fn test_config_set_rejects_zero_timeout() {
    let desk = DeskTest::new();

    let stderr = desk.run_failure(&["config", "set", "request_timeout_secs", "0"]);
    assert!(stderr.contains("greater than 0"));
    assert!(!desk.temp_dir.path().join(".ticketdesk").exists());
}

#[test]
fn test_config_set_rejects_bad_value() {
    let desk = DeskTest::new();

    let stderr = desk.run_failure(&["config", "set", "close_on_success", "maybe"]);
    assert!(stderr.contains("invalid value 'maybe'"));
}

#[test]
fn test_config_path() {
    let desk = DeskTest::new();

    let output = desk.run_success(&["config", "path"]);
    assert!(output.contains(".ticketdesk"));
}

// ============================================================================
// Argument validation
// ============================================================================

#[test]
fn test_invalid_status_value() {
    let desk = DeskTest::new();

    let stderr = desk.run_failure(&["status", "4", "done"]);
    assert!(stderr.contains("Invalid status"));
}

#[test]
fn test_invalid_category_filter() {
    let desk = DeskTest::new();

    let stderr = desk.run_failure(&["ls", "--category", "sales"]);
    assert!(stderr.contains("Invalid category"));
}

#[test]
fn test_completions_bash() {
    let desk = DeskTest::new();

    let output = desk.run_success(&["completions", "bash"]);
    assert!(output.contains("_ticketdesk"));
}

// ============================================================================
// Commands against a ticket service
// ============================================================================

#[test]
fn test_ls_sends_filters_and_prints_table() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/api/tickets/")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("category".into(), "billing".into()),
            Matcher::UrlEncoded("search".into(), "refund".into()),
        ]))
        .with_status(200)
        .with_body(TICKETS_JSON)
        .create();
    let desk = desk_for(&format!("{}/api", server.url()));

    let output = desk.run_success(&["ls", "--category", "billing", "--search", "refund"]);

    mock.assert();
    assert!(output.contains("Refund not received"));
    assert!(output.contains("Billing"));
}

#[test]
fn test_ls_json_keeps_service_order() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/api/tickets/")
        .with_status(200)
        .with_body(TICKETS_JSON)
        .create();
    let desk = desk_for(&format!("{}/api", server.url()));

    let output = desk.run_success(&["ls", "--json"]);
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();
    let ids: Vec<u64> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![7, 3]);
}

#[test]
fn test_ls_empty_with_filters() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/api/tickets/")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("[]")
        .create();
    let desk = desk_for(&format!("{}/api", server.url()));

    let output = desk.run_success(&["ls", "--priority", "low"]);
    assert!(output.contains("No tickets match your filters."));
}

#[test]
fn test_ls_unreachable_service() {
    let desk = desk_for(&unreachable_url());

    let stderr = desk.run_failure(&["ls"]);
    assert!(stderr.contains("Failed to load tickets. Please try again."));
}

#[test]
fn test_status_change_is_confirmed() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/api/tickets/")
        .with_status(200)
        .with_body(TICKETS_JSON)
        .create();
    let patch = server
        .mock("PATCH", "/api/tickets/7/")
        .match_body(Matcher::Json(serde_json::json!({ "status": "resolved" })))
        .with_status(200)
        .with_body(
            r#"{"id": 7, "title": "Refund not received", "description": "Ordered in March, still waiting",
                "category": "billing", "priority": "high", "status": "resolved",
                "created_at": "2025-03-04T14:30:00Z"}"#,
        )
        .create();
    let desk = desk_for(&format!("{}/api", server.url()));

    let output = desk.run_success(&["status", "7", "resolved", "--json"]);

    patch.assert();
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(json["previous_status"], "open");
    assert_eq!(json["new_status"], "resolved");
}

#[test]
fn test_failed_status_change_reports_revert() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/api/tickets/")
        .with_status(200)
        .with_body(TICKETS_JSON)
        .create();
    server
        .mock("PATCH", "/api/tickets/7/")
        .with_status(500)
        .create();
    let desk = desk_for(&format!("{}/api", server.url()));

    let stderr = desk.run_failure(&["status", "7", "closed"]);
    assert!(stderr.contains("Failed to update ticket #7"));
    assert!(stderr.contains("Open"));
}

#[test]
fn test_create_with_manual_choices_skips_classifier() {
    let mut server = mockito::Server::new();
    let classify = server
        .mock("POST", "/api/tickets/classify/")
        .expect(0)
        .create();
    let create = server
        .mock("POST", "/api/tickets/")
        .match_body(Matcher::Json(serde_json::json!({
            "title": "Login broken",
            "description": "Cannot log in since today",
            "category": "account",
            "priority": "high",
        })))
        .with_status(201)
        .with_body(
            r#"{"id": 12, "title": "Login broken", "description": "Cannot log in since today",
                "category": "account", "priority": "high", "status": "open",
                "created_at": "2025-03-05T08:00:00Z"}"#,
        )
        .create();
    let desk = desk_for(&format!("{}/api", server.url()));

    let output = desk.run_success(&[
        "create",
        "Login broken",
        "-d",
        "Cannot log in since today",
        "-c",
        "account",
        "-p",
        "high",
        "--no-classify",
    ]);

    create.assert();
    classify.assert();
    assert!(output.contains("Ticket created successfully!"));
    assert!(output.contains("#12"));
}

#[test]
fn test_create_shows_server_field_errors() {
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/api/tickets/")
        .with_status(400)
        .with_body(r#"{"title": ["Ensure this field has no more than 200 characters."]}"#)
        .create();
    let desk = desk_for(&format!("{}/api", server.url()));

    let stderr = desk.run_failure(&[
        "create",
        "Login broken",
        "-d",
        "Cannot log in since today",
        "-c",
        "account",
        "-p",
        "high",
        "--no-classify",
    ]);
    assert!(stderr.contains("title: Ensure this field has no more than 200 characters."));
}

#[test]
fn test_create_without_choices_is_rejected_locally() {
    let desk = desk_for(&unreachable_url());

    let stderr = desk.run_failure(&[
        "create",
        "Login broken",
        "-d",
        "Cannot log in since today",
        "--no-classify",
    ]);
    assert!(stderr.contains("Please fill in all fields."));
}

#[test]
fn test_stats_dashboard() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/api/tickets/stats/")
        .with_status(200)
        .with_body(
            r#"{"total_tickets": 4, "open_tickets": 2, "in_progress_tickets": 1,
                "resolved_tickets": 1, "avg_tickets_per_day": 0.5,
                "priority_breakdown": {"low": 0, "medium": 1, "high": 2, "critical": 1},
                "category_breakdown": {"billing": 2, "technical": 1, "account": 1, "general": 0}}"#,
        )
        .create();
    let desk = desk_for(&format!("{}/api", server.url()));

    let output = desk.run_success(&["stats"]);
    assert!(output.contains("Total:        4"));
    assert!(output.contains(" 50% (2)"));
}

#[test]
fn test_stats_failure() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/api/tickets/stats/")
        .with_status(503)
        .create();
    let desk = desk_for(&format!("{}/api", server.url()));

    let stderr = desk.run_failure(&["stats"]);
    assert!(stderr.contains("Failed to load statistics."));
}

#[test]
fn test_classify_prints_suggestion() {
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/api/tickets/classify/")
        .with_status(200)
        .with_body(r#"{"suggested_category": "billing", "suggested_priority": "high"}"#)
        .create();
    let desk = desk_for(&format!("{}/api", server.url()));

    let output = desk.run_success(&["classify", "I was charged twice this month", "--json"]);
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();
    insta::assert_debug_snapshot!(
        (&json["suggested_category"], &json["suggested_priority"]),
        @r#"
    (
        String("billing"),
        String("high"),
    )
    "#
    );
}

#[test]
fn test_watch_prints_first_load_and_exits_at_end_of_input() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/api/tickets/")
        .match_query(Matcher::UrlEncoded("status".into(), "open".into()))
        .with_status(200)
        .with_body(TICKETS_JSON)
        .expect_at_least(1)
        .create();
    server
        .mock("GET", "/api/tickets/stats/")
        .with_status(503)
        .create();
    let desk = desk_for(&format!("{}/api", server.url()));

    let output = desk.run_success(&["watch", "--status", "open"]);

    mock.assert();
    assert!(output.contains("Tickets (status=open)"));
    assert!(output.contains("Refund not received"));
    assert!(output.contains("Cannot log in"));
}

#[test]
fn test_watch_reports_unreachable_service() {
    let desk = desk_for(&unreachable_url());

    let output = desk.run_success(&["watch"]);
    assert!(output.contains("All tickets"));
    assert!(output.contains("Failed to load tickets. Please try again."));
}
