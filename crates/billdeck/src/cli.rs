//! Clap derive structures for the `billdeck` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Values with domain grammar (prices, adjustments, dates) stay strings
//! here and are parsed by the command handlers.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// billdeck -- billboard sales from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "billdeck",
    version,
    about = "Billboard sales CRM: sites, bookings, reports and proposal decks",
    long_about = "Browse billboard inventory, track bookings and weekly reports,\n\
        and build priced proposal decks with photos and map snapshots.\n\n\
        Media and the last booking list are cached locally so decks and\n\
        dashboards keep working when the CRM is unreachable.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Server profile to use
    #[arg(long, short = 'p', env = "BILLDECK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// CRM API base URL (overrides profile)
    #[arg(long, short = 's', env = "BILLDECK_SERVER", global = true)]
    pub server: Option<String>,

    /// Bearer token (overrides keyring and profile)
    #[arg(long, env = "BILLDECK_TOKEN", global = true, hide_env = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "BILLDECK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "BILLDECK_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "BILLDECK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Offline cache database (overrides profile)
    #[arg(long, env = "BILLDECK_CACHE_PATH", global = true)]
    pub cache_path: Option<PathBuf>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Browse billboard site inventory
    #[command(alias = "s")]
    Sites(SitesArgs),

    /// Track bookings and contracts
    #[command(alias = "b")]
    Bookings(BookingsArgs),

    /// Manage advertiser accounts
    #[command(alias = "cl")]
    Clients(ClientsArgs),

    /// Weekly AE activity reports
    #[command(alias = "r")]
    Reports(ReportsArgs),

    /// Booking, revenue and occupancy summary
    #[command(alias = "dash")]
    Dashboard,

    /// Build priced proposal decks
    Deck(DeckArgs),

    /// Inspect and maintain the offline cache
    Cache(CacheArgs),

    /// Reference data: users, companies, mediums, settings
    #[command(alias = "ref")]
    Reference(ReferenceArgs),

    /// Show the logged-in user
    Whoami,

    /// Log in and store the session token
    Login(LoginArgs),

    /// Forget the stored session token
    Logout,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SITES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Site filter flags, shared by `sites list` and `deck build`.
///
/// Each repeated flag is one category; a site must pass every category
/// that has a value.
#[derive(Debug, Args, Default)]
pub struct SiteFilterArgs {
    /// Area (repeatable, matches any)
    #[arg(long = "area", value_name = "AREA")]
    pub areas: Vec<String>,

    /// Landmark (repeatable, matches any)
    #[arg(long = "landmark", value_name = "LANDMARK")]
    pub landmarks: Vec<String>,

    /// Site owner (repeatable, matches any)
    #[arg(long = "owner", value_name = "OWNER")]
    pub owners: Vec<String>,

    /// Price range, e.g. "100000..250000", "..80000", "150000.."
    #[arg(long, value_name = "MIN..MAX")]
    pub price: Option<String>,

    /// Available on or after this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub available_from: Option<String>,

    /// Available on or before this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub available_until: Option<String>,

    /// Free-text search over code, name, area and landmarks
    #[arg(long, value_name = "TEXT")]
    pub search: Option<String>,
}

#[derive(Debug, Args)]
pub struct SitesArgs {
    #[command(subcommand)]
    pub command: SitesCommand,
}

#[derive(Debug, Subcommand)]
pub enum SitesCommand {
    /// List sites matching the filters
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        filter: SiteFilterArgs,

        /// Bypass the in-memory copy and refetch
        #[arg(long)]
        refresh: bool,
    },

    /// Get site details
    Get {
        /// Site code
        code: String,
    },

    /// Show the selectable filter values across the inventory
    Filters,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  BOOKINGS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct BookingsArgs {
    #[command(subcommand)]
    pub command: BookingsCommand,
}

/// Booking fields for create and update.
#[derive(Debug, Args)]
pub struct BookingFields {
    /// Site code
    #[arg(long)]
    pub site: Option<String>,

    /// Client name
    #[arg(long)]
    pub client: Option<String>,

    /// Account executive (repeatable)
    #[arg(long = "ae", value_name = "AE")]
    pub account_executives: Vec<String>,

    /// Contract start (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub start: Option<String>,

    /// Contract end (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub end: Option<String>,

    /// Monthly rate in the base currency
    #[arg(long)]
    pub rate: Option<f64>,

    /// Status: new, renewal, queueing, ongoing, ended, cancelled
    #[arg(long)]
    pub status: Option<String>,

    #[arg(long)]
    pub remarks: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum BookingsCommand {
    /// List bookings (served from the offline copy when the CRM is down)
    #[command(alias = "ls")]
    List {
        /// Only this status
        #[arg(long)]
        status: Option<String>,

        /// Only bookings handled by this AE
        #[arg(long = "ae", value_name = "AE")]
        account_executive: Option<String>,

        /// Only bookings on this site
        #[arg(long)]
        site: Option<String>,

        /// Only active bookings ending within 30 days
        #[arg(long)]
        expiring: bool,
    },

    /// Create a booking
    Create(BookingFields),

    /// Update a booking; unspecified fields keep their current value
    Update {
        /// Booking ID
        id: String,

        #[command(flatten)]
        fields: BookingFields,
    },

    /// Cancel a booking
    Cancel {
        /// Booking ID
        id: String,

        /// Reason recorded with the cancellation
        #[arg(long)]
        reason: Option<String>,
    },

    /// Counts and revenue by status and AE
    Summary,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CLIENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ClientsArgs {
    #[command(subcommand)]
    pub command: ClientsCommand,
}

#[derive(Debug, Args)]
pub struct ClientFields {
    /// Client name
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub company: Option<String>,

    #[arg(long)]
    pub industry: Option<String>,

    /// Contact person
    #[arg(long)]
    pub contact: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    /// Handling account executive
    #[arg(long = "ae", value_name = "AE")]
    pub account_executive: Option<String>,

    #[arg(long)]
    pub status: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum ClientsCommand {
    /// List clients
    #[command(alias = "ls")]
    List {
        /// Case-insensitive match on name, company or contact
        #[arg(long)]
        search: Option<String>,
    },

    /// Get client details
    Get {
        /// Client ID
        id: String,
    },

    /// Create a client
    Create(ClientFields),

    /// Update a client; unspecified fields keep their current value
    Update {
        /// Client ID
        id: String,

        #[command(flatten)]
        fields: ClientFields,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  REPORTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ReportsArgs {
    #[command(subcommand)]
    pub command: ReportsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ReportsCommand {
    /// List reports, optionally for the week containing a date
    #[command(alias = "ls")]
    List {
        /// Any date in the week (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        week: Option<String>,
    },

    /// Submit a weekly activity report
    Submit {
        /// Account executive
        #[arg(long = "ae", value_name = "AE")]
        account_executive: String,

        /// Any date in the reported week (defaults to today)
        #[arg(long, value_name = "DATE")]
        week: Option<String>,

        /// What was done (call, meeting, site visit, ...)
        #[arg(long)]
        activity: String,

        #[arg(long)]
        client: Option<String>,

        #[arg(long)]
        remarks: Option<String>,
    },

    /// Report counts per week and AE
    Summary {
        /// Any date in the week (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        week: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DECK
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DeckArgs {
    #[command(subcommand)]
    pub command: DeckCommand,
}

#[derive(Debug, Subcommand)]
pub enum DeckCommand {
    /// Price a proposal deck from explicit sites or filters
    Build(DeckBuildArgs),
}

#[derive(Debug, Args)]
pub struct DeckBuildArgs {
    /// Deck title
    #[arg(long)]
    pub title: String,

    /// Client the proposal is for
    #[arg(long)]
    pub client: Option<String>,

    /// Site codes, in slide order (repeatable; overrides filters)
    #[arg(long = "site", value_name = "CODE")]
    pub sites: Vec<String>,

    #[command(flatten)]
    pub filter: SiteFilterArgs,

    /// Price adjustment, applied in order (repeatable).
    /// Grammar: [+|-]AMOUNT[%][@all|@MIN..MAX|@CODE,CODE]
    #[arg(long = "adjust", value_name = "RULE", allow_hyphen_values = true)]
    pub adjustments: Vec<String>,

    /// Quote in another currency: CODE:RATE (units of base per 1 CODE)
    #[arg(long, value_name = "CODE:RATE")]
    pub currency: Option<String>,

    /// Lease duration for the rate table: MONTHS[:DISCOUNT[%]] (repeatable).
    /// Flat discounts are in the base currency, like --adjust amounts
    #[arg(long = "duration", value_name = "MONTHS[:DISCOUNT]")]
    pub durations: Vec<String>,

    /// Attach photos and map snapshots through the offline cache
    #[arg(long)]
    pub media: bool,

    /// Write the full deck (including media) as JSON to this file
    #[arg(long, value_name = "PATH")]
    pub save: Option<PathBuf>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CACHE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommand,
}

#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// Refresh bookings and prefetch media for every site
    Sync,

    /// Show cached entry counts and freshness
    Status,

    /// Drop stale media entries
    Purge,

    /// Drop every cached entry
    Clear,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  REFERENCE DATA
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ReferenceArgs {
    #[command(subcommand)]
    pub command: ReferenceCommand,
}

#[derive(Debug, Subcommand)]
pub enum ReferenceCommand {
    /// CRM users
    Users,
    /// Companies
    Companies,
    /// Advertising mediums
    Mediums,
    /// Backend settings
    Settings,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LOGIN
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Username (defaults to the profile's username, then prompts)
    #[arg(long, short = 'u')]
    pub username: Option<String>,

    /// Print the token instead of storing it in the keyring
    #[arg(long)]
    pub print_token: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Set a value on the active profile
    Set {
        /// Profile key (server, username, timeout, currency, map_zoom, ...)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },

    /// Store a token in the system keyring
    SetToken {
        /// Profile name (defaults to the active profile)
        #[arg(long)]
        profile: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
