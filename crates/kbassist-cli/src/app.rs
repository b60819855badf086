//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "kbassist")]
#[command(
    author,
    version,
    about = "Ask questions against your enterprise knowledge base"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask a question; documents are retrieved when needed
    Ask(AskArgs),

    /// Ask about specific documents by id
    Doc(DocArgs),

    /// Keyword search in the knowledge base
    Search(SearchArgs),

    /// Show how a question is classified
    Intent(TextArgs),

    /// Extract search keywords from a question
    Keywords(TextArgs),

    /// Expand a query with keywords and suggestions
    Enhance(TextArgs),

    /// Show or initialise the configuration
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct AskArgs {
    /// Question text
    #[arg(required = true)]
    pub question: Vec<String>,

    /// Print the answer as it is generated
    #[arg(long)]
    pub stream: bool,

    /// Maximum documents used as context
    #[arg(long)]
    pub max_documents: Option<usize>,

    /// Do not fetch document bodies into the context
    #[arg(long)]
    pub no_content: bool,

    /// Skip classification and retrieval; answer as a general assistant
    #[arg(long, conflicts_with_all = ["stream", "max_documents", "no_content"])]
    pub general: bool,
}

#[derive(Args)]
pub struct DocArgs {
    /// Document id
    pub id: i64,

    /// Question text
    #[arg(required = true)]
    pub question: Vec<String>,

    /// Additional document ids to answer from together
    #[arg(long = "with", value_name = "ID")]
    pub with: Vec<i64>,

    /// Print the answer as it is generated
    #[arg(long)]
    pub stream: bool,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Search keyword
    pub keyword: String,

    /// Number of results
    #[arg(short = 'n', long, default_value = "10")]
    pub limit: usize,

    /// Reorder results by relevance to this question
    #[arg(long, value_name = "QUESTION")]
    pub rank: Option<String>,
}

#[derive(Args)]
pub struct TextArgs {
    #[arg(required = true)]
    pub text: Vec<String>,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Write the current configuration to the config file
    #[arg(long)]
    pub init: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Cli,
    Json,
    Md,
}
