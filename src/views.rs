//! Pure read-side derivations over the canonical state. Nothing here
//! caches or mutates; every view is recomputed from the aggregate it
//! is handed.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::state::{AppState, LinkItem, Project};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkFilter {
    /// Tag ids a link must carry all of. Empty means no constraint.
    pub tags: Vec<String>,
    /// Domains a link must be one of. Empty means no constraint.
    pub domains: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOption {
    #[default]
    TitleAsc,
    TitleDesc,
    DomainAsc,
    DomainDesc,
}

impl SortOption {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOption::TitleAsc => "title-asc",
            SortOption::TitleDesc => "title-desc",
            SortOption::DomainAsc => "domain-asc",
            SortOption::DomainDesc => "domain-desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSortOptionError(pub String);

impl fmt::Display for ParseSortOptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown sort '{}', expected title-asc, title-desc, domain-asc, or domain-desc",
            self.0
        )
    }
}

impl Error for ParseSortOptionError {}

impl FromStr for SortOption {
    type Err = ParseSortOptionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "title-asc" => Ok(SortOption::TitleAsc),
            "title-desc" => Ok(SortOption::TitleDesc),
            "domain-asc" => Ok(SortOption::DomainAsc),
            "domain-desc" => Ok(SortOption::DomainDesc),
            other => Err(ParseSortOptionError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub total_expenses: f64,
    pub total_income: f64,
    pub profit: f64,
}

pub fn ordered_projects(state: &AppState) -> Vec<&Project> {
    let mut projects: Vec<&Project> = state.projects.iter().collect();
    projects.sort_by_key(|project| project.order_index);
    projects
}

pub fn current_project(state: &AppState) -> Option<&Project> {
    let selected = state.selected_project_id.as_deref()?;
    state.projects.iter().find(|project| project.id == selected)
}

/// Links belonging to the currently selected project, in storage order.
pub fn project_links(state: &AppState) -> Vec<&LinkItem> {
    let Some(project) = current_project(state) else {
        return Vec::new();
    };
    state
        .links
        .iter()
        .filter(|link| link.project_id == project.id)
        .collect()
}

/// Distinct domains among the current project's links, ascending.
pub fn domains(state: &AppState) -> Vec<String> {
    let set: BTreeSet<&str> = project_links(state)
        .iter()
        .map(|link| link.domain.as_str())
        .collect();
    set.into_iter().map(str::to_string).collect()
}

/// The current project's links, narrowed by the filter (all named tags
/// present, domain in the named set) and sorted by the active key.
pub fn filtered_links<'state>(
    state: &'state AppState,
    filter: &LinkFilter,
    sort: SortOption,
) -> Vec<&'state LinkItem> {
    let mut list = project_links(state);
    if !filter.tags.is_empty() {
        list.retain(|link| {
            filter
                .tags
                .iter()
                .all(|tag_id| link.tags.iter().any(|id| id == tag_id))
        });
    }
    if !filter.domains.is_empty() {
        list.retain(|link| filter.domains.iter().any(|domain| domain == &link.domain));
    }
    list.sort_by(|a, b| match sort {
        SortOption::TitleAsc => compare_text(&a.title, &b.title),
        SortOption::TitleDesc => compare_text(&b.title, &a.title),
        SortOption::DomainAsc => compare_text(&a.domain, &b.domain),
        SortOption::DomainDesc => compare_text(&b.domain, &a.domain),
    });
    list
}

pub fn totals(project: &Project) -> Totals {
    let total_expenses: f64 = project
        .monthly_operating_costs
        .iter()
        .map(|item| item.amount)
        .sum();
    let total_income: f64 = project.monthly_income.iter().map(|item| item.amount).sum();
    Totals {
        total_expenses,
        total_income,
        // Expenses carry their sign, so profit is a plain sum.
        profit: total_income + total_expenses,
    }
}

pub fn current_totals(state: &AppState) -> Totals {
    current_project(state).map_or(
        Totals {
            total_expenses: 0.0,
            total_income: 0.0,
            profit: 0.0,
        },
        totals,
    )
}

/// Case-insensitive ordering with a case-sensitive tiebreak, standing
/// in for collation-aware comparison.
fn compare_text(a: &str, b: &str) -> Ordering {
    let folded = a.to_lowercase().cmp(&b.to_lowercase());
    if folded == Ordering::Equal {
        a.cmp(b)
    } else {
        folded
    }
}
