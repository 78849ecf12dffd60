//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum, ValueHint};

use crate::application::RuleColumn;

/// Searchable, sortable rule list for asset layout rules
#[derive(Parser, Debug)]
#[command(name = "ruletree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Rules file (default: from config)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub rules: Option<PathBuf>,

    /// View state file (default: from config)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub state: Option<PathBuf>,

    /// Project directory holding .ruletree.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the rule list
    List {
        /// Only show rules whose columns contain this text
        #[arg(long)]
        search: Option<String>,
        /// Sort by column (natural order)
        #[arg(long, value_enum)]
        sort: Option<SortColumn>,
        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,
        /// Select the rule with this name (refreshes its summaries)
        #[arg(long)]
        select: Option<String>,
        /// Output width in characters
        #[arg(long, default_value_t = 100)]
        width: u16,
    },

    /// Add a label rule
    Add {
        /// Rule name
        name: String,
        /// Position in the list (default: end)
        #[arg(short, long)]
        index: Option<usize>,
        /// Asset group (repeatable)
        #[arg(short, long = "group")]
        groups: Vec<String>,
        /// Constant label assigned by the rule
        #[arg(short, long)]
        label: Option<String>,
    },

    /// Remove a label rule
    Remove {
        /// Rule name
        name: String,
    },

    /// Rename a label rule
    Rename {
        /// Current name
        old: String,
        /// New name
        new: String,
    },

    /// Show rows as tree
    Tree,

    /// Manage persisted view state
    State {
        #[command(subcommand)]
        command: StateCommands,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum StateCommands {
    /// Print persisted state
    Show,
    /// Delete persisted state
    Reset,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print effective settings
    Show,
    /// Print global config file location
    Path,
    /// Print a config template
    Template,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Name,
    Groups,
    Rule,
}

impl From<SortColumn> for RuleColumn {
    fn from(column: SortColumn) -> Self {
        match column {
            SortColumn::Name => RuleColumn::Name,
            SortColumn::Groups => RuleColumn::AssetGroups,
            SortColumn::Rule => RuleColumn::LabelRule,
        }
    }
}
