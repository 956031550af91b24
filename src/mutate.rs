//! Pure state transitions. Every function takes the current aggregate
//! and returns a replacement; callers swap the canonical state
//! wholesale so readers always observe a consistent snapshot.
//!
//! Referential invariants are enforced procedurally here: project
//! deletion cascades to links and re-compacts order ranks, tag
//! replacement strips dangling tag ids from every link. Unknown ids
//! are no-ops, not errors; input validation lives in the `App` shell.

use crate::ids;
use crate::state::{AppState, FinanceKind, IncomeExpenseItem, LinkItem, Project, Tag};
use crate::weburl;

pub fn create_project(state: &AppState, title: &str, short_description: &str) -> AppState {
    let mut next = state.clone();
    let project = Project {
        id: ids::project_id(),
        title: title.to_string(),
        short_description: short_description.to_string(),
        monthly_operating_costs: Vec::new(),
        monthly_income: Vec::new(),
        order_index: next.projects.len() as i64,
    };
    next.selected_project_id = Some(project.id.clone());
    next.projects.push(project);
    next
}

pub fn update_project(
    state: &AppState,
    id: &str,
    title: &str,
    short_description: &str,
) -> AppState {
    let mut next = state.clone();
    if let Some(project) = next.projects.iter_mut().find(|project| project.id == id) {
        project.title = title.to_string();
        project.short_description = short_description.to_string();
    }
    next
}

pub fn delete_project(state: &AppState, id: &str) -> AppState {
    let mut next = state.clone();
    next.projects.retain(|project| project.id != id);
    for (index, project) in next.projects.iter_mut().enumerate() {
        project.order_index = index as i64;
    }
    next.links.retain(|link| link.project_id != id);
    if next.selected_project_id.as_deref() == Some(id) {
        next.selected_project_id = next.projects.first().map(|project| project.id.clone());
    }
    next
}

/// Moves `source_id` immediately before `target_id`'s prior position.
/// Dropping a project onto a later one therefore lands *before* the
/// target; that insertion rule is load-bearing for drag ordering and
/// is kept as-is.
pub fn reorder_projects(state: &AppState, source_id: &str, target_id: &str) -> AppState {
    if source_id == target_id {
        return state.clone();
    }

    let mut sorted = state.projects.clone();
    sorted.sort_by_key(|project| project.order_index);
    let Some(source_index) = sorted.iter().position(|project| project.id == source_id) else {
        return state.clone();
    };
    let moved = sorted.remove(source_index);
    let Some(target_index) = sorted.iter().position(|project| project.id == target_id) else {
        return state.clone();
    };
    sorted.insert(target_index, moved);
    for (index, project) in sorted.iter_mut().enumerate() {
        project.order_index = index as i64;
    }

    let mut next = state.clone();
    next.projects = sorted;
    next
}

pub fn add_finance_item(
    state: &AppState,
    project_id: &str,
    kind: FinanceKind,
    amount: f64,
    comment: &str,
) -> AppState {
    let mut next = state.clone();
    if let Some(project) = next
        .projects
        .iter_mut()
        .find(|project| project.id == project_id)
    {
        let item = IncomeExpenseItem {
            id: match kind {
                FinanceKind::Expense => ids::cost_id(),
                FinanceKind::Income => ids::income_id(),
            },
            amount,
            comment: comment.to_string(),
        };
        match kind {
            FinanceKind::Expense => project.monthly_operating_costs.push(item),
            FinanceKind::Income => project.monthly_income.push(item),
        }
    }
    next
}

pub fn delete_finance_item(
    state: &AppState,
    project_id: &str,
    kind: FinanceKind,
    item_id: &str,
) -> AppState {
    let mut next = state.clone();
    if let Some(project) = next
        .projects
        .iter_mut()
        .find(|project| project.id == project_id)
    {
        match kind {
            FinanceKind::Expense => project
                .monthly_operating_costs
                .retain(|item| item.id != item_id),
            FinanceKind::Income => project.monthly_income.retain(|item| item.id != item_id),
        }
    }
    next
}

pub fn add_link(
    state: &AppState,
    project_id: &str,
    title: &str,
    description: &str,
    url: &str,
    tags: Vec<String>,
) -> AppState {
    let mut next = state.clone();
    next.links.push(LinkItem {
        id: ids::link_id(),
        project_id: project_id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        domain: weburl::extract_domain(url),
        icon_cache: weburl::favicon_proxy(url),
        url: url.to_string(),
        tags,
    });
    next
}

pub fn update_link(
    state: &AppState,
    link_id: &str,
    title: &str,
    description: &str,
    url: &str,
    tags: Vec<String>,
) -> AppState {
    let mut next = state.clone();
    if let Some(link) = next.links.iter_mut().find(|link| link.id == link_id) {
        link.title = title.to_string();
        link.description = description.to_string();
        link.url = url.to_string();
        link.tags = tags;
        link.domain = weburl::extract_domain(url);
        link.icon_cache = weburl::favicon_proxy(url);
    }
    next
}

pub fn delete_link(state: &AppState, link_id: &str) -> AppState {
    let mut next = state.clone();
    next.links.retain(|link| link.id != link_id);
    next
}

/// Replaces the tag collection wholesale, then strips every link's tag
/// list down to ids that still exist. Rename, delete, and add all go
/// through this one sweep.
pub fn replace_tags(state: &AppState, tags: Vec<Tag>) -> AppState {
    let mut next = state.clone();
    next.tags = tags;
    let live: std::collections::HashSet<&str> =
        next.tags.iter().map(|tag| tag.id.as_str()).collect();
    for link in &mut next.links {
        link.tags.retain(|tag_id| live.contains(tag_id.as_str()));
    }
    next
}

pub fn select_project(state: &AppState, project_id: &str) -> AppState {
    let mut next = state.clone();
    if next.projects.iter().any(|project| project.id == project_id) {
        next.selected_project_id = Some(project_id.to_string());
    }
    next
}

pub fn set_locale(state: &AppState, locale: crate::state::Locale) -> AppState {
    let mut next = state.clone();
    next.locale = locale;
    next
}
