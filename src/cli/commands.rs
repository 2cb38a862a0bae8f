use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::types::Provider;
use crate::view::SortField;

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Store a GitHub token for later commands
    Login {
        /// Personal access token (prompted for when omitted)
        #[arg(long)]
        token: Option<String>,

        /// Skip interactive prompts (requires --token)
        #[arg(long)]
        non_interactive: bool,
    },

    /// Forget the stored token
    Logout,

    /// Show who is logged in
    Status,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SortArg {
    Title,
    Updated,
}

impl From<SortArg> for SortField {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Title => SortField::Title,
            SortArg::Updated => SortField::UpdatedAt,
        }
    }
}

/// Fields shared by `add` and `edit`.
#[derive(Args, Default)]
pub struct PromptFields {
    /// Prompt title
    #[arg(long)]
    pub title: Option<String>,

    /// Short description
    #[arg(long)]
    pub description: Option<String>,

    /// Prompt body
    #[arg(long, conflicts_with = "content_file")]
    pub content: Option<String>,

    /// Read the prompt body from a file ('-' for stdin)
    #[arg(long)]
    pub content_file: Option<PathBuf>,

    /// Tag (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Model provider
    #[arg(long)]
    pub provider: Option<Provider>,

    /// Model identifier (defaults to the provider's first model)
    #[arg(long)]
    pub model: Option<String>,
}
