use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Returns the version string, including git hash and commit date for non-release builds.
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "notekeep", bin_name = "notekeep", version = get_version())]
#[command(about = "Short notes kept on this device, with portable backups", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding notes.json and config.json
    #[arg(long, global = true, env = "NOTEKEEP_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Verbose output (debug logs on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new note
    #[command(alias = "n")]
    Create {
        /// Title of the note
        title: Option<String>,

        /// Body of the note
        content: Option<String>,

        /// Tag to attach (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Background color token, e.g. "#ffcc00"
        #[arg(long)]
        color: Option<String>,

        /// Pin the note
        #[arg(long)]
        pin: bool,

        /// Image file to embed (repeatable)
        #[arg(long = "image")]
        images: Vec<PathBuf>,
    },

    /// List notes, pinned first then most recently edited
    #[command(alias = "ls")]
    List {
        /// Case-insensitive search over title, body and tags
        #[arg(short, long)]
        search: Option<String>,

        /// Only notes carrying this tag
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// Show one or more notes in full
    #[command(alias = "v")]
    View {
        /// Note ids or unique id prefixes
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Change a note
    #[command(alias = "e")]
    Update {
        /// Note id or unique id prefix
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        content: Option<String>,

        #[arg(long, conflicts_with = "clear_color")]
        color: Option<String>,

        /// Remove the note's color
        #[arg(long)]
        clear_color: bool,

        /// Tag to add (repeatable)
        #[arg(long = "tag")]
        add_tags: Vec<String>,

        /// Tag to remove (repeatable)
        #[arg(long = "untag")]
        remove_tags: Vec<String>,

        /// Image file to append (repeatable)
        #[arg(long = "image")]
        add_images: Vec<PathBuf>,

        /// Position of an image to remove, starting at 0 (repeatable)
        #[arg(long = "remove-image")]
        remove_images: Vec<usize>,
    },

    /// Delete one or more notes
    #[command(alias = "rm")]
    Delete {
        /// Note ids or unique id prefixes
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Pin one or more notes
    #[command(alias = "p")]
    Pin {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Unpin one or more notes
    #[command(alias = "u")]
    Unpin {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Write a backup archive of all notes
    Export {
        /// Target file or directory (defaults to a timestamped file here)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace all notes with those recovered from backups
    Import {
        /// Archives, JSON files, or directories containing them
        #[arg(required = true, num_args = 1..)]
        paths: Vec<PathBuf>,
    },

    /// Get or set configuration
    Config {
        /// Configuration key (export-prefix, import-extensions)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },
}
