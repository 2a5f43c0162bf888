pub mod cli;
pub mod commands;
pub mod config;
pub mod display;
pub mod error;
pub mod remote;
pub mod session;
pub mod sync;
pub mod types;

pub use config::Config;
pub use error::{ErrorKind, Result, TicketDeskError};
pub use remote::{FieldErrors, HttpTicketService, NewTicket, TicketService, TicketUpdate};
pub use session::{DeskSession, SessionTasks};
pub use sync::{
    ClassificationController, ClassifyOutcome, CollectionState, CreationPolicy, FilterCriteria,
    FilterPatch, FilterState, FormState, InvalidationCoordinator, InvalidationToken,
    MutationOutcome, SearchInput, StatsState, StatsView, SubmitOutcome, TicketCollection,
    TicketCreationController, TicketForm,
};
pub use types::{
    Category, CategoryBreakdown, ClassificationSuggestion, Priority, PriorityBreakdown, Status,
    Ticket, TicketId, TicketStats,
};
