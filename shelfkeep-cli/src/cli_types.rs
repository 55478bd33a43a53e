//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use shelfkeep_catalog::RecordKind;
use shelfkeep_import::{IdPolicy, SourceFormat};
use shelfkeep_lib::BackendKind;

#[derive(Parser)]
#[command(name = "shelfkeep")]
#[command(about = "Track a figure collection, wishlist and customs", long_about = None)]
pub(crate) struct Cli {
    /// Directory holding the collection data (overrides settings and $SHELFKEEP_DATA_DIR)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Storage backend: file, sqlite or memory
    #[arg(long, global = true)]
    pub backend: Option<BackendKind>,

    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write log output to a file (ANSI codes stripped)
    #[arg(long, global = true)]
    pub logfile: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Input format for `import`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum FormatArg {
    /// JSON if the text starts with `[` or `{`, otherwise CSV
    Auto,
    Csv,
    Json,
}

impl FormatArg {
    pub fn source_format(self) -> Option<SourceFormat> {
        match self {
            Self::Auto => None,
            Self::Csv => Some(SourceFormat::Delimited),
            Self::Json => Some(SourceFormat::Json),
        }
    }
}

/// Output format for `export`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ExportFormat {
    Csv,
    Json,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Import records from a CSV or JSON file (or stdin)
    Import {
        /// Collection to import into: figures, wishlist or customs
        kind: RecordKind,

        /// File to read; omit or use '-' for stdin
        file: Option<PathBuf>,

        /// Input format
        #[arg(long, value_enum, default_value = "auto")]
        format: FormatArg,

        /// How records without an id are numbered: batch or continue
        #[arg(long)]
        id_policy: Option<IdPolicy>,
    },

    /// Fetch a published Google Sheet (or any CSV URL) and import it
    Sheet {
        /// Collection to import into
        kind: RecordKind,

        /// Sheet id or URL (defaults to sync.sheet_id from settings)
        source: Option<String>,

        /// Sheet tab id
        #[arg(long)]
        gid: Option<String>,

        /// How records without an id are numbered: batch or continue
        #[arg(long)]
        id_policy: Option<IdPolicy>,
    },

    /// List the records of a collection
    List {
        kind: RecordKind,

        /// Field to sort by (e.g., name, price, ranking)
        #[arg(long)]
        sort: Option<String>,

        /// Sort descending
        #[arg(long)]
        desc: bool,

        /// Case-insensitive text to look for in any field
        #[arg(short, long)]
        search: Option<String>,

        /// Only records where FIELD equals VALUE (repeatable)
        #[arg(long = "where", value_name = "FIELD=VALUE")]
        filters: Vec<String>,

        /// Show every field of each record
        #[arg(long)]
        full: bool,
    },

    /// Show counts and price totals
    Stats {
        /// Collection to summarize (default: all)
        kind: Option<RecordKind>,
    },

    /// Add one record
    Add {
        kind: RecordKind,

        /// Field assignment (repeatable), e.g. --set name="Freddy Krueger" --set price=45000
        #[arg(long = "set", value_name = "FIELD=VALUE", required = true)]
        fields: Vec<String>,
    },

    /// Remove the record with the given id
    Remove { kind: RecordKind, id: String },

    /// Write a collection as CSV or JSON
    Export {
        kind: RecordKind,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,
    },

    /// Push a collection to the configured webhook
    Sync {
        kind: RecordKind,

        /// Webhook URL (overrides settings and $SHELFKEEP_WEBHOOK_URL)
        #[arg(long)]
        webhook: Option<String>,
    },

    /// Show import history
    History {
        /// Number of most recent imports to show
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show resolved settings and where each came from
    Show,

    /// Print the settings file path
    Path,

    /// Set a value in the settings file (empty value resets it)
    Set {
        /// Dotted key, e.g. storage.backend or sync.webhook_url
        key: String,
        value: String,
    },
}
