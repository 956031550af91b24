use std::path::PathBuf;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{CommandFactory, Parser, Subcommand};

pub use crate::cli_ops::*;

fn cli_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::BrightCyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightGreen.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::BrightMagenta.on_default())
}

#[derive(Debug, Parser)]
#[command(name = "phub")]
#[command(bin_name = "phub")]
#[command(version)]
#[command(about = "A local-first project bookmark and budget organizer")]
#[command(styles = cli_styles())]
pub struct Cli {
    #[arg(
        short = 'd',
        long,
        env = "PROJECTHUB_DB_PATH",
        help = "Path to the SQLite state database (defaults to <root>/.projecthub/state.sqlite)."
    )]
    pub db: Option<String>,

    #[arg(
        short = 'C',
        long,
        env = "PROJECTHUB_ROOT",
        default_value = ".",
        help = "Workspace root that contains .projecthub/."
    )]
    pub root: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "Manage projects: create, edit, reorder, select.")]
    Project(ProjectArgs),
    #[command(about = "Manage links in a project.")]
    Link(LinkArgs),
    #[command(about = "List the selected project's links with filtering and sorting.")]
    Ls(ListArgs),
    #[command(about = "Manage the global tag collection.")]
    Tag(TagArgs),
    #[command(about = "Track monthly income and expense entries per project.")]
    Finance(FinanceArgs),
    #[command(about = "Show the selected project's finance totals.")]
    Totals(TotalsArgs),
    #[command(about = "Set the interface locale stored with the state.")]
    Locale(LocaleArgs),
    #[command(about = "Export the whole state as a dated JSON file.")]
    Export(ExportArgs),
    #[command(about = "Replace the whole state from a JSON export.")]
    Import(ImportArgs),
    #[command(about = "Export the filtered link list as CSV.")]
    Csv(CsvArgs),
    #[command(about = "Replace the state with the built-in demo data.")]
    Reset(ResetArgs),
    #[command(about = "Inspect the stored document for anomalies.")]
    Doctor(DoctorArgs),
    #[command(about = "Generate or install shell completions.")]
    Completions(CompletionsArgs),
}

pub fn styled_command() -> clap::Command {
    Cli::command()
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
