//! Clap derive structures for the `bsp` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// bsp -- provision sites, users, and access keys on BSP
#[derive(Debug, Parser)]
#[command(
    name = "bsp",
    version,
    about = "Provision BSP sites, users, and access keys",
    long_about = "Idempotent provisioning for BSP.\n\n\
        Creates sites, resolves enterprise units, creates site-controller users,\n\
        and issues their access keys. Progress is saved after every step, so a\n\
        failed run can simply be repeated.",
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
    /// Profile in the secret file
    #[arg(long, short = 'p', env = "BSP_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Secret file with per-profile host and credentials
    #[arg(long, env = "BSP_SECRET_FILE", global = true)]
    pub secret_file: Option<PathBuf>,

    /// Gateway host (overrides profile)
    #[arg(long, env = "BSP_HOST", global = true)]
    pub host: Option<String>,

    /// Gateway port (overrides profile)
    #[arg(long, env = "BSP_PORT", global = true)]
    pub port: Option<u16>,

    /// Use plain HTTP instead of HTTPS
    #[arg(long, env = "BSP_NO_TLS", global = true)]
    pub no_tls: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "BSP_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds [default: profile value, else 30]
    #[arg(long, env = "BSP_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "BSP_OUTPUT",
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
    /// Create or update every site in the input file
    Provision(ProvisionArgs),

    /// Dump sites, users, groups, memberships, and role grants to JSON
    Export(ExportArgs),

    /// Convert a CSV export into a provisioning input file
    Parse(ParseArgs),

    /// Check a state file against an input file (offline)
    Verify(VerifyArgs),

    /// Submit and look up transaction documents
    #[command(alias = "tx")]
    Transaction(TransactionArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Provisioning ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProvisionArgs {
    /// Input file listing the desired sites
    #[arg(long, short = 'i', default_value = "input/provisioner-input.json")]
    pub input: PathBuf,

    /// Directory for the state file and per-site key files
    #[arg(long, short = 'd', default_value = "output")]
    pub output_dir: PathBuf,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Directory the exported-*.json files are written to
    #[arg(long, short = 'd', default_value = "output")]
    pub output_dir: PathBuf,
}

#[derive(Debug, Args)]
pub struct ParseArgs {
    /// CSV file with a header row
    #[arg(long, default_value = "input/input_data.csv")]
    pub csv: PathBuf,

    /// Input file to write
    #[arg(long = "out", default_value = "input/provisioner-input.json")]
    pub out: PathBuf,
}

#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// Input file the state is checked against
    #[arg(long, short = 'i', default_value = "input/provisioner-input.json")]
    pub input: PathBuf,

    /// State file written by `bsp provision`
    #[arg(long, default_value = "output/provisioner-output.json")]
    pub state: PathBuf,
}

// ── Transactions ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TransactionArgs {
    #[command(subcommand)]
    pub command: TransactionCommand,
}

#[derive(Debug, Subcommand)]
pub enum TransactionCommand {
    /// Submit an NAXML transaction document
    Submit {
        /// XML file to upload
        file: PathBuf,
    },

    /// Fetch a transaction document
    Get {
        /// Transaction document ID
        id: String,
    },

    /// Check whether a transaction document exists (exit code 4 if not)
    Exists {
        /// Transaction document ID
        id: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
