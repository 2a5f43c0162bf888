use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::io;
use std::str::FromStr;

use crate::sync::FilterCriteria;
use crate::types::{
    Category, Priority, Status, TicketId, VALID_CATEGORIES, VALID_PRIORITIES, VALID_STATUSES,
};

#[derive(Parser)]
#[command(name = "ticketdesk")]
#[command(about = "Support-ticket client with AI-assisted triage")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Filters shared by `ls` and `watch`
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Category: billing, technical, account, general
    #[arg(short, long, value_parser = parse_category)]
    pub category: Option<Category>,

    /// Priority: low, medium, high, critical
    #[arg(short, long, value_parser = parse_priority)]
    pub priority: Option<Priority>,

    /// Status: open, in_progress, resolved, closed
    #[arg(short, long, value_parser = parse_status)]
    pub status: Option<Status>,

    /// Case-insensitive text matched against title and description
    #[arg(long, default_value = "")]
    pub search: String,
}

impl From<FilterArgs> for FilterCriteria {
    fn from(args: FilterArgs) -> Self {
        FilterCriteria {
            category: args.category,
            priority: args.priority,
            status: args.status,
            search: args.search,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List tickets
    #[command(visible_alias = "l")]
    Ls {
        #[command(flatten)]
        filters: FilterArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Submit a new ticket
    #[command(visible_alias = "c")]
    Create {
        /// Ticket title (at most 200 characters)
        title: String,

        /// Description text
        #[arg(short, long)]
        description: String,

        /// Category; when omitted the classifier suggests one
        #[arg(short, long, value_parser = parse_category)]
        category: Option<Category>,

        /// Priority; when omitted the classifier suggests one
        #[arg(short, long, value_parser = parse_priority)]
        priority: Option<Priority>,

        /// Skip the classification suggestion
        #[arg(long)]
        no_classify: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set ticket status
    Status {
        /// Ticket ID
        id: TicketId,

        /// New status (open, in_progress, resolved, closed)
        #[arg(value_parser = parse_status)]
        status: Status,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show aggregate statistics
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Suggest a category and priority for a description
    Classify {
        /// Description text
        description: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Live ticket list with search read from stdin
    #[command(visible_alias = "w")]
    Watch {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for [possible values: bash, zsh, fish, powershell, elvish]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a configuration value
    Get {
        key: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set a configuration value
    Set {
        key: String,
        value: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print config file locations
    Path {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    /// Execute the command, dispatching to the appropriate handler.
    pub async fn run(self) -> crate::error::Result<()> {
        use crate::commands::{
            CreateOptions, cmd_classify, cmd_config_get, cmd_config_path, cmd_config_set,
            cmd_config_show, cmd_create, cmd_ls, cmd_stats, cmd_status, cmd_watch,
        };

        match self {
            Commands::Ls { filters, json } => cmd_ls(filters.into(), json).await,

            Commands::Create {
                title,
                description,
                category,
                priority,
                no_classify,
                json,
            } => {
                cmd_create(CreateOptions {
                    title,
                    description,
                    category,
                    priority,
                    classify: !no_classify,
                    output_json: json,
                })
                .await
            }

            Commands::Status { id, status, json } => cmd_status(id, status, json).await,
            Commands::Stats { json } => cmd_stats(json).await,
            Commands::Classify { description, json } => cmd_classify(&description, json).await,
            Commands::Watch { filters } => cmd_watch(filters.into()).await,

            Commands::Config { action } => match action {
                ConfigAction::Show { json } => cmd_config_show(json),
                ConfigAction::Get { key, json } => cmd_config_get(&key, json),
                ConfigAction::Set { key, value, json } => cmd_config_set(&key, &value, json),
                ConfigAction::Path { json } => cmd_config_path(json),
            },

            Commands::Completions { shell } => {
                generate_completions(shell);
                Ok(())
            }
        }
    }
}

/// Generic validation helper for parsing values with a standard error message format.
fn parse_with_validation<T, F>(
    s: &str,
    parser: F,
    field_name: &str,
    valid_values: &[&str],
) -> Result<T, String>
where
    F: FnOnce(&str) -> Result<T, String>,
{
    parser(s).map_err(|_| {
        format!(
            "Invalid {}. Must be one of: {}",
            field_name,
            valid_values.join(", ")
        )
    })
}

fn parse_category(s: &str) -> Result<Category, String> {
    parse_with_validation(
        s,
        |v| Category::from_str(v).map_err(|_| String::new()),
        "category",
        VALID_CATEGORIES,
    )
}

fn parse_priority(s: &str) -> Result<Priority, String> {
    parse_with_validation(
        s,
        |v| Priority::from_str(v).map_err(|_| String::new()),
        "priority",
        VALID_PRIORITIES,
    )
}

fn parse_status(s: &str) -> Result<Status, String> {
    parse_with_validation(
        s,
        |v| Status::from_str(v).map_err(|_| String::new()),
        "status",
        VALID_STATUSES,
    )
}

pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "ticketdesk", &mut io::stdout());
}
