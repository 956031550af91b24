use std::path::PathBuf;

use clap::{Args, Subcommand};

#[derive(Debug, Args)]
#[command(about = "Project commands.")]
pub struct ProjectArgs {
    #[command(subcommand)]
    pub command: ProjectSubcommands,
}

#[derive(Debug, Subcommand)]
pub enum ProjectSubcommands {
    #[command(about = "Create a project and select it.")]
    New(ProjectNewArgs),
    #[command(about = "Edit a project's title and description.")]
    Edit(ProjectEditArgs),
    #[command(about = "Delete a project and every link it owns.")]
    Rm(ProjectRmArgs),
    #[command(about = "Move a project immediately before another one.")]
    Mv(ProjectMvArgs),
    #[command(about = "Select the project later commands operate on.")]
    Select(ProjectSelectArgs),
    #[command(about = "List projects in display order.")]
    Ls(JsonArgs),
}

#[derive(Debug, Args)]
pub struct ProjectNewArgs {
    #[arg(help = "Project title.")]
    pub title: String,

    #[arg(short = 'D', long = "desc", help = "Short description.")]
    pub desc: Option<String>,
}

#[derive(Debug, Args)]
pub struct ProjectEditArgs {
    #[arg(help = "Project id.")]
    pub id: String,

    #[arg(help = "New title.")]
    pub title: String,

    #[arg(short = 'D', long = "desc", help = "New short description.")]
    pub desc: Option<String>,
}

#[derive(Debug, Args)]
pub struct ProjectRmArgs {
    #[arg(help = "Project id.")]
    pub id: String,
}

#[derive(Debug, Args)]
pub struct ProjectMvArgs {
    #[arg(help = "Project id to move.")]
    pub source: String,

    #[arg(help = "Project id the source is placed before.")]
    pub target: String,
}

#[derive(Debug, Args)]
pub struct ProjectSelectArgs {
    #[arg(help = "Project id.")]
    pub id: String,
}

#[derive(Debug, Args)]
#[command(about = "Link commands.")]
pub struct LinkArgs {
    #[command(subcommand)]
    pub command: LinkSubcommands,
}

#[derive(Debug, Subcommand)]
pub enum LinkSubcommands {
    #[command(about = "Add a link to the selected (or named) project.")]
    Add(LinkAddArgs),
    #[command(about = "Replace a link's fields.")]
    Edit(LinkEditArgs),
    #[command(about = "Delete a link.")]
    Rm(LinkRmArgs),
}

#[derive(Debug, Args)]
pub struct LinkAddArgs {
    #[arg(help = "Link title.")]
    pub title: String,

    #[arg(help = "Link URL.")]
    pub url: String,

    #[arg(short = 'D', long = "desc", help = "Description text.")]
    pub desc: Option<String>,

    #[arg(short = 't', long = "tag", help = "Tag id or name; repeatable.")]
    pub tags: Vec<String>,

    #[arg(short = 'p', long, help = "Project id (defaults to the selection).")]
    pub project: Option<String>,
}

#[derive(Debug, Args)]
pub struct LinkEditArgs {
    #[arg(help = "Link id.")]
    pub id: String,

    #[arg(help = "New title.")]
    pub title: String,

    #[arg(help = "New URL.")]
    pub url: String,

    #[arg(short = 'D', long = "desc", help = "New description text.")]
    pub desc: Option<String>,

    #[arg(short = 't', long = "tag", help = "Tag id or name; repeatable.")]
    pub tags: Vec<String>,
}

#[derive(Debug, Args)]
pub struct LinkRmArgs {
    #[arg(help = "Link id.")]
    pub id: String,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(short = 't', long = "tag", help = "Keep links carrying this tag; repeatable, all must match.")]
    pub tags: Vec<String>,

    #[arg(short = 'n', long = "domain", help = "Keep links from this domain; repeatable.")]
    pub domains: Vec<String>,

    #[arg(
        short = 's',
        long,
        default_value = "title-asc",
        help = "Sort key: title-asc, title-desc, domain-asc, domain-desc."
    )]
    pub sort: String,

    #[arg(short = 'j', long, help = "Render machine-readable JSON.")]
    pub json: bool,
}

#[derive(Debug, Args)]
#[command(about = "Tag commands.")]
pub struct TagArgs {
    #[command(subcommand)]
    pub command: TagSubcommands,
}

#[derive(Debug, Subcommand)]
pub enum TagSubcommands {
    #[command(about = "Add a tag.")]
    Add(TagAddArgs),
    #[command(about = "Rename a tag everywhere.")]
    Rename(TagRenameArgs),
    #[command(about = "Delete a tag and detach it from every link.")]
    Rm(TagRmArgs),
    #[command(about = "List tags with usage counts.")]
    Ls(JsonArgs),
}

#[derive(Debug, Args)]
pub struct TagAddArgs {
    #[arg(help = "Tag name.")]
    pub name: String,
}

#[derive(Debug, Args)]
pub struct TagRenameArgs {
    #[arg(help = "Tag id or current name.")]
    pub tag: String,

    #[arg(help = "New name.")]
    pub name: String,
}

#[derive(Debug, Args)]
pub struct TagRmArgs {
    #[arg(help = "Tag id or name.")]
    pub tag: String,
}

#[derive(Debug, Args)]
#[command(about = "Finance commands.")]
pub struct FinanceArgs {
    #[command(subcommand)]
    pub command: FinanceSubcommands,
}

#[derive(Debug, Subcommand)]
pub enum FinanceSubcommands {
    #[command(about = "Record a monthly entry (expenses negative, income positive).")]
    Add(FinanceAddArgs),
    #[command(about = "Delete a finance entry.")]
    Rm(FinanceRmArgs),
    #[command(about = "List a project's finance entries.")]
    Ls(FinanceLsArgs),
}

#[derive(Debug, Args)]
pub struct FinanceAddArgs {
    #[arg(help = "Entry kind: expense or income.")]
    pub kind: String,

    #[arg(allow_hyphen_values = true, help = "Signed amount, e.g. -1200 or 1500.")]
    pub amount: String,

    #[arg(short = 'm', long, help = "Comment shown with the entry.")]
    pub comment: Option<String>,

    #[arg(short = 'p', long, help = "Project id (defaults to the selection).")]
    pub project: Option<String>,
}

#[derive(Debug, Args)]
pub struct FinanceRmArgs {
    #[arg(help = "Entry kind: expense or income.")]
    pub kind: String,

    #[arg(help = "Entry id.")]
    pub item_id: String,

    #[arg(short = 'p', long, help = "Project id (defaults to the selection).")]
    pub project: Option<String>,
}

#[derive(Debug, Args)]
pub struct FinanceLsArgs {
    #[arg(short = 'p', long, help = "Project id (defaults to the selection).")]
    pub project: Option<String>,

    #[arg(short = 'j', long, help = "Render machine-readable JSON.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct TotalsArgs {
    #[arg(short = 'j', long, help = "Render machine-readable JSON.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct LocaleArgs {
    #[arg(help = "Locale: ru or en.")]
    pub locale: String,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[arg(short = 'o', long, help = "Directory the export is written into.")]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    #[arg(help = "JSON export file to load.")]
    pub file: PathBuf,
}

#[derive(Debug, Args)]
pub struct CsvArgs {
    #[arg(short = 'o', long, help = "Output file (defaults to <project title>.csv).")]
    pub out: Option<PathBuf>,

    #[arg(short = 't', long = "tag", help = "Keep links carrying this tag; repeatable, all must match.")]
    pub tags: Vec<String>,

    #[arg(short = 'n', long = "domain", help = "Keep links from this domain; repeatable.")]
    pub domains: Vec<String>,

    #[arg(
        short = 's',
        long,
        default_value = "title-asc",
        help = "Sort key: title-asc, title-desc, domain-asc, domain-desc."
    )]
    pub sort: String,
}

#[derive(Debug, Args)]
pub struct ResetArgs {
    #[arg(short = 'k', long = "keep-locale", help = "Carry the current locale over.")]
    pub keep_locale: bool,
}

#[derive(Debug, Args)]
pub struct DoctorArgs {
    #[arg(short = 'j', long, help = "Render machine-readable JSON.")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    #[arg(help = "Shell name (bash, zsh, fish). Auto-detected if omitted.")]
    pub shell: Option<String>,

    #[arg(
        short = 'i',
        long = "install",
        help = "Write completions to the canonical path for the shell."
    )]
    pub install: bool,
}

#[derive(Debug, Args)]
pub struct JsonArgs {
    #[arg(short = 'j', long, help = "Render machine-readable JSON.")]
    pub json: bool,
}
