use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use time::{Date, OffsetDateTime};

use crate::normalize::normalize;
use crate::state::{AppState, LinkItem};

const EXPORT_PREFIX: &str = "projecthub-db";
const TAG_JOINER: &str = " | ";

#[derive(Debug)]
pub enum ExportError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Io(err) => write!(f, "I/O error: {}", err),
            ExportError::Json(err) => write!(f, "JSON error: {}", err),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ExportError::Io(err) => Some(err),
            ExportError::Json(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ExportError {
    fn from(value: std::io::Error) -> Self {
        ExportError::Io(value)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(value: serde_json::Error) -> Self {
        ExportError::Json(value)
    }
}

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Rejected,
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "I/O error: {}", err),
            ImportError::Json(err) => write!(f, "JSON parse error: {}", err),
            ImportError::Rejected => write!(
                f,
                "file is not a valid state document (projects, links, and tags must be lists)"
            ),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Json(err) => Some(err),
            ImportError::Rejected => None,
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(value: std::io::Error) -> Self {
        ImportError::Io(value)
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(value: serde_json::Error) -> Self {
        ImportError::Json(value)
    }
}

pub fn export_file_name(date: Date) -> String {
    format!(
        "{}-{:04}-{:02}-{:02}.json",
        EXPORT_PREFIX,
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Pretty-prints the whole aggregate to
/// `<dir>/projecthub-db-YYYY-MM-DD.json` and returns the path.
pub fn export_state(state: &AppState, dir: &Path) -> Result<PathBuf, ExportError> {
    let path = dir.join(export_file_name(OffsetDateTime::now_utc().date()));
    let document = serde_json::to_string_pretty(state)?;
    fs::create_dir_all(dir)?;
    fs::write(&path, document)?;
    Ok(path)
}

/// Parses a user-supplied file and runs it through the normalizer. A
/// rejection leaves the caller's state untouched by construction: no
/// state is produced to replace it with.
pub fn import_state(path: &Path) -> Result<AppState, ImportError> {
    let text = fs::read_to_string(path)?;
    let raw: serde_json::Value = serde_json::from_str(&text)?;
    normalize(&raw).ok_or(ImportError::Rejected)
}

/// Header plus one row per link; tag ids resolve to names, unknown ids
/// are skipped rather than rendered.
pub fn csv_rows(state: &AppState, links: &[&LinkItem]) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(links.len() + 1);
    rows.push(
        ["Title", "Description", "URL", "Domain", "Tags"]
            .into_iter()
            .map(str::to_string)
            .collect(),
    );
    for link in links {
        let tag_names: Vec<&str> = link
            .tags
            .iter()
            .filter_map(|tag_id| state.tag(tag_id))
            .map(|tag| tag.name.as_str())
            .collect();
        rows.push(vec![
            link.title.clone(),
            link.description.clone(),
            link.url.clone(),
            link.domain.clone(),
            tag_names.join(TAG_JOINER),
        ]);
    }
    rows
}

pub fn csv_document(rows: &[Vec<String>]) -> String {
    rows.iter()
        .map(|row| {
            row.iter()
                .map(|field| escape_csv_field(field))
                .collect::<Vec<String>>()
                .join(",")
        })
        .collect::<Vec<String>>()
        .join("\n")
}

pub fn write_csv(path: &Path, rows: &[Vec<String>]) -> Result<(), ExportError> {
    fs::write(path, csv_document(rows))?;
    Ok(())
}

/// Default CSV file name for a project; path separators in the title
/// are flattened so the name stays a plain file name.
pub fn csv_file_name(project_title: &str) -> String {
    let safe: String = project_title
        .chars()
        .map(|ch| if ch == '/' || ch == '\\' { '-' } else { ch })
        .collect();
    format!("{safe}.csv")
}

fn escape_csv_field(field: &str) -> String {
    if field.contains('"') || field.contains(',') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
