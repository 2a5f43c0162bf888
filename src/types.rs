use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TicketDeskError;

pub const TICKETDESK_DIR: &str = ".ticketdesk";

/// Maximum title length accepted by the ticket service.
pub const MAX_TITLE_LEN: usize = 200;

/// Server-assigned ticket identifier.
pub type TicketId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Billing,
    Technical,
    Account,
    General,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Billing,
        Category::Technical,
        Category::Account,
        Category::General,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Billing => "Billing",
            Category::Technical => "Technical",
            Category::Account => "Account",
            Category::General => "General",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Billing => write!(f, "billing"),
            Category::Technical => write!(f, "technical"),
            Category::Account => write!(f, "account"),
            Category::General => write!(f, "general"),
        }
    }
}

impl FromStr for Category {
    type Err = TicketDeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "billing" => Ok(Category::Billing),
            "technical" => Ok(Category::Technical),
            "account" => Ok(Category::Account),
            "general" => Ok(Category::General),
            _ => Err(TicketDeskError::InvalidCategory(s.to_string())),
        }
    }
}

pub const VALID_CATEGORIES: &[&str] = &["billing", "technical", "account", "general"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Critical,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Critical => "Critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
            Priority::Critical => write!(f, "critical"),
        }
    }
}

impl FromStr for Priority {
    type Err = TicketDeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "critical" => Ok(Priority::Critical),
            _ => Err(TicketDeskError::InvalidPriority(s.to_string())),
        }
    }
}

pub const VALID_PRIORITIES: &[&str] = &["low", "medium", "high", "critical"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Open,
        Status::InProgress,
        Status::Resolved,
        Status::Closed,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Status::Open => "Open",
            Status::InProgress => "In Progress",
            Status::Resolved => "Resolved",
            Status::Closed => "Closed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Open => write!(f, "open"),
            Status::InProgress => write!(f, "in_progress"),
            Status::Resolved => write!(f, "resolved"),
            Status::Closed => write!(f, "closed"),
        }
    }
}

impl FromStr for Status {
    type Err = TicketDeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "open" => Ok(Status::Open),
            "in_progress" => Ok(Status::InProgress),
            "resolved" => Ok(Status::Resolved),
            "closed" => Ok(Status::Closed),
            _ => Err(TicketDeskError::InvalidStatus(s.to_string())),
        }
    }
}

pub const VALID_STATUSES: &[&str] = &["open", "in_progress", "resolved", "closed"];

/// A ticket as owned by the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub status: Status,
    pub created_at: Timestamp,
}

/// AI-suggested classification for a description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationSuggestion {
    pub suggested_category: Category,
    pub suggested_priority: Priority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PriorityBreakdown {
    pub low: u64,
    pub medium: u64,
    pub high: u64,
    pub critical: u64,
}

impl PriorityBreakdown {
    pub fn get(&self, priority: Priority) -> u64 {
        match priority {
            Priority::Low => self.low,
            Priority::Medium => self.medium,
            Priority::High => self.high,
            Priority::Critical => self.critical,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub billing: u64,
    pub technical: u64,
    pub account: u64,
    pub general: u64,
}

impl CategoryBreakdown {
    pub fn get(&self, category: Category) -> u64 {
        match category {
            Category::Billing => self.billing,
            Category::Technical => self.technical,
            Category::Account => self.account,
            Category::General => self.general,
        }
    }
}

/// Aggregate statistics over the whole ticket store.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TicketStats {
    pub total_tickets: u64,
    pub open_tickets: u64,
    pub in_progress_tickets: u64,
    pub resolved_tickets: u64,
    pub avg_tickets_per_day: f64,
    pub priority_breakdown: PriorityBreakdown,
    pub category_breakdown: CategoryBreakdown,
}
