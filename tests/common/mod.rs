#![allow(dead_code)]

use std::process::{Command, Output};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use jiff::Timestamp;
use parking_lot::Mutex;
use tempfile::TempDir;
use tokio::sync::{oneshot, watch};

use ticketdesk::remote::{NewTicket, TicketService, TicketUpdate};
use ticketdesk::sync::FilterCriteria;
use ticketdesk::{
    Category, CategoryBreakdown, ClassificationSuggestion, FieldErrors, Priority,
    PriorityBreakdown, Result, Status, Ticket, TicketDeskError, TicketId, TicketStats,
};

/// Generous bound for service calls in tests that use real time.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// CLI runner
// ============================================================================

/// Helper struct to run ticketdesk commands in an isolated temp directory
pub struct DeskTest {
    pub temp_dir: TempDir,
    binary_path: String,
}

impl DeskTest {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        DeskTest {
            temp_dir,
            binary_path: env!("CARGO_BIN_EXE_ticketdesk").to_string(),
        }
    }

    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(&self.binary_path)
            .args(args)
            .current_dir(self.temp_dir.path())
            .env("HOME", self.temp_dir.path())
            .env("XDG_CONFIG_HOME", self.temp_dir.path().join(".config"))
            .env("NO_COLOR", "1")
            .env_remove("TICKETDESK_API_URL")
            .env_remove("TICKETDESK_TIMEOUT_SECS")
            .output()
            .expect("Failed to execute ticketdesk command")
    }

    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            panic!(
                "Command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
                args,
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    pub fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "Command {:?} should have failed\nstdout: {}",
            args,
            String::from_utf8_lossy(&output.stdout)
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn ticket(id: TicketId, title: &str, category: Category, priority: Priority) -> Ticket {
    Ticket {
        id,
        title: title.to_string(),
        description: format!("Details about {}", title.to_lowercase()),
        category,
        priority,
        status: Status::Open,
        created_at: Timestamp::from_second(1_740_000_000 + id as i64 * 60)
            .expect("valid timestamp"),
    }
}

pub fn with_status(mut ticket: Ticket, status: Status) -> Ticket {
    ticket.status = status;
    ticket
}

pub fn sample_tickets() -> Vec<Ticket> {
    vec![
        ticket(1, "Refund not received", Category::Billing, Priority::High),
        ticket(2, "Cannot log in", Category::Account, Priority::Critical),
        with_status(
            ticket(3, "Invoice shows wrong amount", Category::Billing, Priority::Medium),
            Status::Resolved,
        ),
        with_status(
            ticket(4, "App crashes on upload", Category::Technical, Priority::High),
            Status::InProgress,
        ),
        ticket(5, "Feature question", Category::General, Priority::Low),
    ]
}

pub fn suggestion(category: Category, priority: Priority) -> ClassificationSuggestion {
    ClassificationSuggestion {
        suggested_category: category,
        suggested_priority: priority,
    }
}

/// Let spawned tasks run until they block again.
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

/// Wait until a watched state satisfies `predicate`, failing the test after a
/// while instead of hanging.
pub async fn wait_for_state<T, F>(rx: &mut watch::Receiver<T>, predicate: F) -> T
where
    T: Clone,
    F: FnMut(&T) -> bool,
{
    match tokio::time::timeout(Duration::from_secs(5), rx.wait_for(predicate)).await {
        Ok(Ok(state)) => state.clone(),
        Ok(Err(_)) => panic!("state sender dropped"),
        Err(_) => panic!("timed out waiting for state"),
    }
}

// ============================================================================
// In-memory ticket service
// ============================================================================

/// Ticket service with the server's semantics, backed by a vector.
#[derive(Default)]
pub struct InMemoryService {
    tickets: Mutex<Vec<Ticket>>,
    suggestion: Mutex<Option<ClassificationSuggestion>>,
    create_errors: Mutex<Option<FieldErrors>>,
    fail_lists: AtomicBool,
    fail_creates: AtomicBool,
    fail_updates: AtomicBool,
    fail_stats: AtomicBool,
    pub list_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    pub stats_calls: AtomicUsize,
    pub classify_calls: AtomicUsize,
}

impl InMemoryService {
    pub fn new(tickets: Vec<Ticket>) -> Arc<Self> {
        Arc::new(Self {
            tickets: Mutex::new(tickets),
            ..Self::default()
        })
    }

    pub fn tickets(&self) -> Vec<Ticket> {
        self.tickets.lock().clone()
    }

    pub fn set_suggestion(&self, suggestion: Option<ClassificationSuggestion>) {
        *self.suggestion.lock() = suggestion;
    }

    pub fn reject_creates_with(&self, errors: FieldErrors) {
        *self.create_errors.lock() = Some(errors);
    }

    pub fn fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    pub fn fail_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::SeqCst);
    }

    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    pub fn fail_stats(&self, fail: bool) {
        self.fail_stats.store(fail, Ordering::SeqCst);
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

fn unreachable_error() -> TicketDeskError {
    TicketDeskError::NetworkFailure("connection refused".to_string())
}

#[async_trait]
impl TicketService for InMemoryService {
    async fn list_tickets(&self, criteria: &FilterCriteria) -> Result<Vec<Ticket>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(unreachable_error());
        }
        let mut tickets: Vec<Ticket> = self
            .tickets
            .lock()
            .iter()
            .filter(|t| criteria.matches(t))
            .cloned()
            .collect();
        tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tickets)
    }

    async fn create_ticket(&self, new: &NewTicket) -> Result<Ticket> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(unreachable_error());
        }
        if let Some(errors) = self.create_errors.lock().clone() {
            return Err(TicketDeskError::ValidationFailure(errors));
        }

        let mut tickets = self.tickets.lock();
        let id = tickets.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        let created = Ticket {
            id,
            title: new.title.clone(),
            description: new.description.clone(),
            category: new.category.unwrap_or(Category::General),
            priority: new.priority.unwrap_or(Priority::Medium),
            status: Status::Open,
            created_at: Timestamp::from_second(1_750_000_000 + id as i64 * 60)
                .expect("valid timestamp"),
        };
        tickets.push(created.clone());
        Ok(created)
    }

    async fn update_ticket(&self, id: TicketId, update: &TicketUpdate) -> Result<Ticket> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(unreachable_error());
        }
        let mut tickets = self.tickets.lock();
        let Some(ticket) = tickets.iter_mut().find(|t| t.id == id) else {
            return Err(TicketDeskError::ServerFailure {
                status: 404,
                message: "Not found.".to_string(),
            });
        };
        if let Some(status) = update.status {
            ticket.status = status;
        }
        if let Some(category) = update.category {
            ticket.category = category;
        }
        if let Some(priority) = update.priority {
            ticket.priority = priority;
        }
        if let Some(title) = &update.title {
            ticket.title = title.clone();
        }
        if let Some(description) = &update.description {
            ticket.description = description.clone();
        }
        Ok(ticket.clone())
    }

    async fn fetch_stats(&self) -> Result<TicketStats> {
        self.stats_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_stats.load(Ordering::SeqCst) {
            return Err(unreachable_error());
        }
        let tickets = self.tickets.lock();
        let count = |f: &dyn Fn(&Ticket) -> bool| tickets.iter().filter(|t| f(*t)).count() as u64;
        Ok(TicketStats {
            total_tickets: tickets.len() as u64,
            open_tickets: count(&|t| t.status == Status::Open),
            in_progress_tickets: count(&|t| t.status == Status::InProgress),
            resolved_tickets: count(&|t| t.status == Status::Resolved),
            avg_tickets_per_day: tickets.len() as f64,
            priority_breakdown: PriorityBreakdown {
                low: count(&|t| t.priority == Priority::Low),
                medium: count(&|t| t.priority == Priority::Medium),
                high: count(&|t| t.priority == Priority::High),
                critical: count(&|t| t.priority == Priority::Critical),
            },
            category_breakdown: CategoryBreakdown {
                billing: count(&|t| t.category == Category::Billing),
                technical: count(&|t| t.category == Category::Technical),
                account: count(&|t| t.category == Category::Account),
                general: count(&|t| t.category == Category::General),
            },
        })
    }

    async fn classify(&self, _description: &str) -> Result<ClassificationSuggestion> {
        self.classify_calls.fetch_add(1, Ordering::SeqCst);
        (*self.suggestion.lock()).ok_or_else(|| {
            TicketDeskError::ClassificationUnavailable("no suggestion".to_string())
        })
    }
}

// ============================================================================
// Scripted ticket service
// ============================================================================

/// A call received by `ScriptedService`.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List(FilterCriteria),
    Create(NewTicket),
    Update(TicketId, TicketUpdate),
    Stats,
    Classify(String),
}

/// The answer a test gives to a pending call.
pub enum Reply {
    Tickets(Vec<Ticket>),
    Ticket(Ticket),
    Stats(TicketStats),
    Suggestion(ClassificationSuggestion),
    Fail(TicketDeskError),
}

struct PendingCall {
    call: Call,
    reply: Option<oneshot::Sender<Reply>>,
}

/// Ticket service whose calls stay in flight until the test resolves them,
/// so tests decide the completion order.
#[derive(Default)]
pub struct ScriptedService {
    calls: Mutex<Vec<PendingCall>>,
}

impl ScriptedService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn call(&self, index: usize) -> Call {
        self.calls.lock()[index].call.clone()
    }

    pub fn resolve(&self, index: usize, reply: Reply) {
        let sender = self.calls.lock()[index]
            .reply
            .take()
            .expect("call already resolved");
        let _ = sender.send(reply);
    }

    /// Yield until at least `n` calls have been received.
    pub async fn wait_for_calls(&self, n: usize) {
        for _ in 0..1000 {
            if self.call_count() >= n {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!(
            "expected {n} calls, got {}: {:?}",
            self.call_count(),
            self.calls.lock().iter().map(|c| c.call.clone()).collect::<Vec<_>>()
        );
    }

    async fn dispatch(&self, call: Call) -> Result<Reply> {
        let (tx, rx) = oneshot::channel();
        self.calls.lock().push(PendingCall {
            call,
            reply: Some(tx),
        });
        match rx.await {
            Ok(Reply::Fail(e)) => Err(e),
            Ok(reply) => Ok(reply),
            Err(_) => Err(unreachable_error()),
        }
    }
}

#[async_trait]
impl TicketService for ScriptedService {
    async fn list_tickets(&self, criteria: &FilterCriteria) -> Result<Vec<Ticket>> {
        match self.dispatch(Call::List(criteria.clone())).await? {
            Reply::Tickets(tickets) => Ok(tickets),
            _ => panic!("list_tickets needs Reply::Tickets"),
        }
    }

    async fn create_ticket(&self, ticket: &NewTicket) -> Result<Ticket> {
        match self.dispatch(Call::Create(ticket.clone())).await? {
            Reply::Ticket(ticket) => Ok(ticket),
            _ => panic!("create_ticket needs Reply::Ticket"),
        }
    }

    async fn update_ticket(&self, id: TicketId, update: &TicketUpdate) -> Result<Ticket> {
        match self.dispatch(Call::Update(id, update.clone())).await? {
            Reply::Ticket(ticket) => Ok(ticket),
            _ => panic!("update_ticket needs Reply::Ticket"),
        }
    }

    async fn fetch_stats(&self) -> Result<TicketStats> {
        match self.dispatch(Call::Stats).await? {
            Reply::Stats(stats) => Ok(stats),
            _ => panic!("fetch_stats needs Reply::Stats"),
        }
    }

    async fn classify(&self, description: &str) -> Result<ClassificationSuggestion> {
        match self.dispatch(Call::Classify(description.to_string())).await? {
            Reply::Suggestion(suggestion) => Ok(suggestion),
            _ => panic!("classify needs Reply::Suggestion"),
        }
    }
}
