use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "goat")]
#[command(about = "Build ranked lists from tiers and grid slots", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Directory holding sessions and local backlog data (or set GOAT_DATA_DIR)
    #[arg(long, value_name = "DIR", env = "GOAT_DATA_DIR", global = true)]
    pub data_dir: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List session operations
    Session(SessionCommand),
    /// Apply a drag-end event to a list
    Drag(DragArgs),
    /// Grid operations
    Grid(GridCommand),
    /// Backlog operations
    Backlog(BacklogCommand),
    /// Backend sync
    Sync(SyncCommand),
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// Session commands
#[derive(Args)]
pub struct SessionCommand {
    #[command(subcommand)]
    pub action: SessionAction,
}

#[derive(Subcommand)]
pub enum SessionAction {
    /// Open a list, creating its session if needed
    Open {
        list_id: String,
        /// Number of grid slots for a new session
        #[arg(long)]
        size: Option<usize>,
    },
    /// Show a session (defaults to the active one)
    Show { list_id: Option<String> },
    /// List all stored sessions
    List,
    /// Show grid progress of a session
    Progress { list_id: Option<String> },
    /// Delete a session
    Delete { list_id: String },
}

#[derive(Args)]
pub struct DragArgs {
    pub list_id: String,
    /// Id of the dragged element, e.g. an item id, grid-3 or tier-item-x
    #[arg(long)]
    pub active: String,
    /// Id of the drop target, e.g. grid-0, tier-S, unranked-pool or compare
    #[arg(long)]
    pub over: Option<String>,
}

// Grid commands
#[derive(Args)]
pub struct GridCommand {
    #[command(subcommand)]
    pub action: GridAction,
}

#[derive(Subcommand)]
pub enum GridAction {
    /// Empty every slot and release the placed items
    Clear { list_id: String },
}

// Backlog commands
#[derive(Args)]
pub struct BacklogCommand {
    #[command(subcommand)]
    pub action: BacklogAction,
}

#[derive(Subcommand)]
pub enum BacklogAction {
    /// Fetch a group from the backend and merge it with local changes
    Load {
        list_id: String,
        #[arg(long)]
        group: String,
    },
    /// Add an item to a group locally
    Add(BacklogAddArgs),
    /// Remove an item from a group locally
    Remove {
        list_id: String,
        #[arg(long)]
        group: String,
        #[arg(long)]
        id: String,
    },
    /// List the available items of a group
    Items {
        list_id: String,
        #[arg(long)]
        group: String,
    },
}

#[derive(Args)]
pub struct BacklogAddArgs {
    pub list_id: String,
    #[arg(long)]
    pub group: String,
    #[arg(long)]
    pub id: String,
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub category: Option<String>,
    /// Comma-separated tags
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,
}

// Sync commands
#[derive(Args)]
pub struct SyncCommand {
    #[command(subcommand)]
    pub action: SyncAction,
}

#[derive(Subcommand)]
pub enum SyncAction {
    /// Sync every loaded group of a list with the backend
    Run {
        list_id: String,
        /// Wait out the debounce window before syncing
        #[arg(long)]
        debounced: bool,
    },
    /// Report items removed locally that the backend still has
    Conflicts { list_id: String },
    /// Resolve conflicts with use-remote or keep-local
    Resolve {
        list_id: String,
        #[arg(long)]
        strategy: String,
    },
}
