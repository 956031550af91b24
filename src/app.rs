use std::error::Error;
use std::fmt;
use std::path::Path;

use url::Url;

use crate::config::ConfigError;
use crate::export::{self, ExportError, ImportError};
use crate::mutate;
use crate::normalize::normalize;
use crate::seed;
use crate::state::{AppState, FinanceKind, Locale, Tag};
use crate::store::{self, StoreError};
use crate::views;
use crate::writer::StateWriter;

/// Owns the canonical state and the debounced persister. Mutating
/// methods validate user input, apply a pure transition, and schedule
/// a write; unknown ids on the core update/delete paths stay silent
/// no-ops so repeated invocations are harmless.
pub struct App {
    state: AppState,
    writer: StateWriter,
}

#[derive(Debug)]
pub enum AppError {
    Store(StoreError),
    Config(ConfigError),
    Import(ImportError),
    Export(ExportError),
    InvalidArgument(String),
    NotFound(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Store(err) => write!(f, "storage error: {}", err),
            AppError::Config(err) => write!(f, "{}", err),
            AppError::Import(err) => write!(f, "import error: {}", err),
            AppError::Export(err) => write!(f, "export error: {}", err),
            AppError::InvalidArgument(message) => write!(f, "{}", message),
            AppError::NotFound(what) => write!(f, "{} not found", what),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AppError::Store(err) => Some(err),
            AppError::Config(err) => Some(err),
            AppError::Import(err) => Some(err),
            AppError::Export(err) => Some(err),
            AppError::InvalidArgument(_) => None,
            AppError::NotFound(_) => None,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        AppError::Store(value)
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        AppError::Config(value)
    }
}

impl From<ImportError> for AppError {
    fn from(value: ImportError) -> Self {
        AppError::Import(value)
    }
}

impl From<ExportError> for AppError {
    fn from(value: ExportError) -> Self {
        AppError::Export(value)
    }
}

impl App {
    /// Loads the stored document (normalizing it), or seeds demo data
    /// when nothing usable is stored. The initial state is scheduled
    /// for persistence exactly like any other state value.
    pub fn open(db_path: &str, seed_locale: Option<Locale>) -> Result<Self, AppError> {
        let conn = store::open_connection(db_path)?;
        let state = store::load_raw(&conn)
            .and_then(|raw| normalize(&raw))
            .unwrap_or_else(|| {
                let mut fresh = seed::demo_state();
                if let Some(locale) = seed_locale {
                    fresh.locale = locale;
                }
                fresh
            });
        let writer = StateWriter::spawn(conn);
        writer.schedule(&state);
        Ok(Self { state, writer })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Write any pending snapshot before the process exits.
    pub fn flush(&self) -> Result<(), AppError> {
        self.writer.flush().map_err(AppError::from)
    }

    fn apply(&mut self, next: AppState) {
        self.state = next;
        self.writer.schedule(&self.state);
    }

    pub fn create_project(&mut self, title: &str, short_description: &str) -> Result<(), AppError> {
        let title = required(title, "project title")?;
        self.apply(mutate::create_project(
            &self.state,
            &title,
            short_description.trim(),
        ));
        Ok(())
    }

    pub fn update_project(
        &mut self,
        id: &str,
        title: &str,
        short_description: &str,
    ) -> Result<(), AppError> {
        let title = required(title, "project title")?;
        self.apply(mutate::update_project(
            &self.state,
            id,
            &title,
            short_description.trim(),
        ));
        Ok(())
    }

    pub fn delete_project(&mut self, id: &str) {
        self.apply(mutate::delete_project(&self.state, id));
    }

    pub fn reorder_projects(&mut self, source_id: &str, target_id: &str) {
        self.apply(mutate::reorder_projects(&self.state, source_id, target_id));
    }

    pub fn select_project(&mut self, id: &str) -> Result<(), AppError> {
        if self.state.project(id).is_none() {
            return Err(AppError::NotFound(format!("project '{id}'")));
        }
        self.apply(mutate::select_project(&self.state, id));
        Ok(())
    }

    /// Project a mutating command operates on: an explicit id, or the
    /// current selection.
    pub fn resolve_project(&self, explicit: Option<&str>) -> Result<String, AppError> {
        match explicit {
            Some(id) => self
                .state
                .project(id)
                .map(|project| project.id.clone())
                .ok_or_else(|| AppError::NotFound(format!("project '{id}'"))),
            None => self
                .state
                .selected_project_id
                .clone()
                .ok_or_else(|| AppError::InvalidArgument("no project selected".to_string())),
        }
    }

    pub fn add_finance_item(
        &mut self,
        project: Option<&str>,
        kind: FinanceKind,
        amount: f64,
        comment: &str,
    ) -> Result<(), AppError> {
        let project_id = self.resolve_project(project)?;
        if !amount.is_finite() || amount == 0.0 {
            return Err(AppError::InvalidArgument(
                "enter a valid non-zero amount".to_string(),
            ));
        }
        match kind {
            FinanceKind::Expense if amount >= 0.0 => {
                return Err(AppError::InvalidArgument(
                    "expense amount must be negative".to_string(),
                ));
            }
            FinanceKind::Income if amount <= 0.0 => {
                return Err(AppError::InvalidArgument(
                    "income amount must be positive".to_string(),
                ));
            }
            _ => {}
        }
        self.apply(mutate::add_finance_item(
            &self.state,
            &project_id,
            kind,
            amount,
            comment.trim(),
        ));
        Ok(())
    }

    pub fn delete_finance_item(
        &mut self,
        project: Option<&str>,
        kind: FinanceKind,
        item_id: &str,
    ) -> Result<(), AppError> {
        let project_id = self.resolve_project(project)?;
        self.apply(mutate::delete_finance_item(
            &self.state,
            &project_id,
            kind,
            item_id,
        ));
        Ok(())
    }

    pub fn add_link(
        &mut self,
        project: Option<&str>,
        title: &str,
        description: &str,
        url: &str,
        tag_refs: &[String],
    ) -> Result<(), AppError> {
        let project_id = self.resolve_project(project)?;
        let title = required(title, "link title")?;
        let url = valid_url(url)?;
        let tags = self.resolve_tag_refs(tag_refs)?;
        self.apply(mutate::add_link(
            &self.state,
            &project_id,
            &title,
            description.trim(),
            &url,
            tags,
        ));
        Ok(())
    }

    pub fn update_link(
        &mut self,
        link_id: &str,
        title: &str,
        description: &str,
        url: &str,
        tag_refs: &[String],
    ) -> Result<(), AppError> {
        let title = required(title, "link title")?;
        let url = valid_url(url)?;
        let tags = self.resolve_tag_refs(tag_refs)?;
        self.apply(mutate::update_link(
            &self.state,
            link_id,
            &title,
            description.trim(),
            &url,
            tags,
        ));
        Ok(())
    }

    pub fn delete_link(&mut self, link_id: &str) {
        self.apply(mutate::delete_link(&self.state, link_id));
    }

    /// Wholesale tag replacement with the cascading cleanup sweep.
    pub fn replace_tags(&mut self, tags: Vec<Tag>) {
        self.apply(mutate::replace_tags(&self.state, tags));
    }

    pub fn add_tag(&mut self, name: &str) -> Result<(), AppError> {
        let name = required(name, "tag name")?;
        let mut tags = self.state.tags.clone();
        tags.push(Tag {
            id: crate::ids::tag_id(),
            name,
        });
        self.replace_tags(tags);
        Ok(())
    }

    pub fn rename_tag(&mut self, tag_ref: &str, name: &str) -> Result<(), AppError> {
        let name = required(name, "tag name")?;
        let id = self.resolve_tag(tag_ref)?;
        let tags = self
            .state
            .tags
            .iter()
            .map(|tag| {
                if tag.id == id {
                    Tag {
                        id: tag.id.clone(),
                        name: name.clone(),
                    }
                } else {
                    tag.clone()
                }
            })
            .collect();
        self.replace_tags(tags);
        Ok(())
    }

    pub fn delete_tag(&mut self, tag_ref: &str) -> Result<(), AppError> {
        let id = self.resolve_tag(tag_ref)?;
        let tags = self
            .state
            .tags
            .iter()
            .filter(|tag| tag.id != id)
            .cloned()
            .collect();
        self.replace_tags(tags);
        Ok(())
    }

    pub fn set_locale(&mut self, locale: Locale) {
        self.apply(mutate::set_locale(&self.state, locale));
    }

    /// Replace everything with the demo seed, optionally carrying the
    /// previous locale over.
    pub fn reset(&mut self, preserve_locale: bool) {
        let mut fresh = seed::demo_state();
        if preserve_locale {
            fresh.locale = self.state.locale;
        }
        self.apply(fresh);
    }

    /// Parse, normalize, and atomically replace the whole state. A
    /// rejected file leaves the current state untouched.
    pub fn import_from(&mut self, path: &Path) -> Result<(), AppError> {
        let imported = export::import_state(path)?;
        self.apply(imported);
        Ok(())
    }

    pub fn export_to(&self, dir: &Path) -> Result<std::path::PathBuf, AppError> {
        export::export_state(&self.state, dir).map_err(AppError::from)
    }

    pub fn totals(&self) -> views::Totals {
        views::current_totals(&self.state)
    }

    /// Tags may be referenced by id or exact name. Names shared by
    /// several tags are rejected as ambiguous.
    pub fn resolve_tag(&self, tag_ref: &str) -> Result<String, AppError> {
        if let Some(tag) = self.state.tag(tag_ref) {
            return Ok(tag.id.clone());
        }
        let matches: Vec<&Tag> = self
            .state
            .tags
            .iter()
            .filter(|tag| tag.name == tag_ref)
            .collect();
        match matches.as_slice() {
            [] => Err(AppError::NotFound(format!("tag '{tag_ref}'"))),
            [tag] => Ok(tag.id.clone()),
            _ => Err(AppError::InvalidArgument(format!(
                "tag name '{tag_ref}' is ambiguous; use its id"
            ))),
        }
    }

    fn resolve_tag_refs(&self, tag_refs: &[String]) -> Result<Vec<String>, AppError> {
        tag_refs
            .iter()
            .map(|tag_ref| self.resolve_tag(tag_ref))
            .collect()
    }
}

fn required(value: &str, what: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(AppError::InvalidArgument(format!("{what} is required")))
    } else {
        Ok(trimmed.to_string())
    }
}

fn valid_url(value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    let parsed = Url::parse(trimmed)
        .map_err(|_| AppError::InvalidArgument("enter a valid URL".to_string()))?;
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(AppError::InvalidArgument("enter a valid URL".to_string()));
    }
    Ok(trimmed.to_string())
}
