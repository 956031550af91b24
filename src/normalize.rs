use std::collections::{BTreeMap, HashSet};

use serde_json::Value;

use crate::ids;
use crate::state::{AppState, IncomeExpenseItem, LinkItem, Locale, Project, Tag};
use crate::weburl;

/// Repair an arbitrary JSON document into a well-formed [`AppState`].
///
/// Returns `None` only for the top-level shape rejection: the input is
/// not an object, or any of `projects`/`links`/`tags` is not an array.
/// Everything below that degrades to defaulting or omission. Links
/// whose `projectId` does not name a surviving project are dropped,
/// not repaired.
pub fn normalize(raw: &Value) -> Option<AppState> {
    let candidate = raw.as_object()?;
    let raw_projects = candidate.get("projects")?.as_array()?;
    let raw_links = candidate.get("links")?.as_array()?;
    let raw_tags = candidate.get("tags")?.as_array()?;

    let mut projects: Vec<Project> = raw_projects
        .iter()
        .enumerate()
        .map(|(index, project)| normalize_project(project, index))
        .collect();
    projects.sort_by_key(|project| project.order_index);

    let tags: Vec<Tag> = raw_tags.iter().map(normalize_tag).collect();

    let valid_project_ids: HashSet<&str> =
        projects.iter().map(|project| project.id.as_str()).collect();

    let links: Vec<LinkItem> = raw_links
        .iter()
        .filter_map(|link| normalize_link(link, &valid_project_ids))
        .collect();

    let locale = match candidate.get("locale").and_then(Value::as_str) {
        Some("en") => Locale::En,
        _ => Locale::Ru,
    };

    let selected_project_id = candidate
        .get("selectedProjectId")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty() && valid_project_ids.contains(id))
        .map(str::to_string)
        .or_else(|| projects.first().map(|project| project.id.clone()));

    Some(AppState {
        locale,
        projects,
        links,
        tags,
        selected_project_id,
        favicon_cache: normalize_favicon_cache(candidate.get("faviconCache")),
    })
}

fn normalize_project(raw: &Value, index: usize) -> Project {
    Project {
        id: nonempty_string(raw.get("id")).unwrap_or_else(ids::project_id),
        title: nonempty_string(raw.get("title")).unwrap_or_else(|| "Untitled".to_string()),
        short_description: nonempty_string(raw.get("shortDescription")).unwrap_or_default(),
        monthly_operating_costs: normalize_finance_list(raw.get("monthlyOperatingCosts"), "cost"),
        monthly_income: normalize_finance_list(raw.get("monthlyIncome"), "income"),
        order_index: raw
            .get("orderIndex")
            .and_then(Value::as_f64)
            .map_or(index as i64, |value| value as i64),
    }
}

fn normalize_finance_list(raw: Option<&Value>, id_prefix: &str) -> Vec<IncomeExpenseItem> {
    let Some(items) = raw.and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .map(|item| IncomeExpenseItem {
            id: nonempty_string(item.get("id")).unwrap_or_else(|| ids::new_id(id_prefix)),
            amount: coerce_amount(item.get("amount")),
            comment: nonempty_string(item.get("comment")).unwrap_or_default(),
        })
        .collect()
}

fn normalize_tag(raw: &Value) -> Tag {
    Tag {
        id: nonempty_string(raw.get("id")).unwrap_or_else(ids::tag_id),
        name: nonempty_string(raw.get("name")).unwrap_or_else(|| "tag".to_string()),
    }
}

fn normalize_link(raw: &Value, valid_project_ids: &HashSet<&str>) -> Option<LinkItem> {
    let project_id = nonempty_string(raw.get("projectId"))
        .filter(|id| valid_project_ids.contains(id.as_str()))?;

    let url = nonempty_string(raw.get("url")).unwrap_or_default();
    let tags = raw
        .get("tags")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Some(LinkItem {
        id: nonempty_string(raw.get("id")).unwrap_or_else(ids::link_id),
        project_id,
        title: nonempty_string(raw.get("title")).unwrap_or_else(|| "Untitled".to_string()),
        description: nonempty_string(raw.get("description")).unwrap_or_default(),
        domain: nonempty_string(raw.get("domain"))
            .unwrap_or_else(|| weburl::extract_domain(&url)),
        icon_cache: nonempty_string(raw.get("iconCache"))
            .unwrap_or_else(|| weburl::icon_for(&url)),
        url,
        tags,
    })
}

fn normalize_favicon_cache(raw: Option<&Value>) -> BTreeMap<String, String> {
    let Some(entries) = raw.and_then(Value::as_object) else {
        return BTreeMap::new();
    };
    entries
        .iter()
        .filter_map(|(key, value)| {
            value
                .as_str()
                .map(|value| (key.clone(), value.to_string()))
        })
        .collect()
}

fn nonempty_string(raw: Option<&Value>) -> Option<String> {
    raw.and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Numeric coercion in the style of the persisted document's producer:
/// numbers pass through, numeric strings parse, everything else is 0.
fn coerce_amount(raw: Option<&Value>) -> f64 {
    match raw {
        Some(Value::Number(number)) => number.as_f64().filter(|n| n.is_finite()).unwrap_or(0.0),
        Some(Value::String(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().ok().filter(|n| n.is_finite()).unwrap_or(0.0)
            }
        }
        Some(Value::Bool(true)) => 1.0,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::normalize;
    use crate::seed;
    use crate::state::Locale;
    use crate::weburl::DEFAULT_FAVICON;

    #[test]
    fn rejects_non_objects_and_missing_collections() {
        assert!(normalize(&json!(null)).is_none());
        assert!(normalize(&json!("state")).is_none());
        assert!(normalize(&json!([])).is_none());
        assert!(normalize(&json!({})).is_none());
        assert!(normalize(&json!({"projects": [], "links": []})).is_none());
        assert!(normalize(&json!({"projects": {}, "links": [], "tags": []})).is_none());
    }

    #[test]
    fn accepts_the_minimal_empty_document() {
        let state = normalize(&json!({"projects": [], "links": [], "tags": []}))
            .expect("empty collections should normalize");
        assert!(state.projects.is_empty());
        assert!(state.links.is_empty());
        assert!(state.tags.is_empty());
        assert_eq!(state.locale, Locale::Ru);
        assert!(state.selected_project_id.is_none());
        assert!(state.favicon_cache.is_empty());
    }

    #[test]
    fn fills_project_defaults_and_coerces_amounts() {
        let state = normalize(&json!({
            "projects": [{
                "title": "",
                "monthlyOperatingCosts": [
                    {"amount": "-120.5", "comment": "hosting"},
                    {"amount": "not a number"},
                    {"amount": -30}
                ],
                "monthlyIncome": "nope"
            }],
            "links": [],
            "tags": []
        }))
        .expect("document should normalize");

        let project = &state.projects[0];
        assert!(project.id.starts_with("project-"));
        assert_eq!(project.title, "Untitled");
        assert_eq!(project.short_description, "");
        assert_eq!(project.order_index, 0);
        let amounts: Vec<f64> = project
            .monthly_operating_costs
            .iter()
            .map(|item| item.amount)
            .collect();
        assert_eq!(amounts, vec![-120.5, 0.0, -30.0]);
        assert!(project.monthly_operating_costs[1].id.starts_with("cost-"));
        assert!(project.monthly_income.is_empty());
    }

    #[test]
    fn sorts_projects_by_order_index_with_positional_fallback() {
        let state = normalize(&json!({
            "projects": [
                {"id": "p-b", "title": "B", "orderIndex": 2},
                {"id": "p-a", "title": "A", "orderIndex": "broken"},
                {"id": "p-c", "title": "C", "orderIndex": -1}
            ],
            "links": [],
            "tags": []
        }))
        .expect("document should normalize");

        let ids: Vec<&str> = state.projects.iter().map(|p| p.id.as_str()).collect();
        // p-a falls back to its positional index 1, p-c keeps -1.
        assert_eq!(ids, vec!["p-c", "p-a", "p-b"]);
        assert_eq!(state.selected_project_id.as_deref(), Some("p-c"));
    }

    #[test]
    fn drops_links_with_missing_or_unknown_project() {
        let state = normalize(&json!({
            "projects": [{"id": "p-1", "title": "One"}],
            "links": [
                {"title": "kept", "projectId": "p-1", "url": "https://www.example.com/x"},
                {"title": "orphan", "projectId": "p-404", "url": "https://example.com"},
                {"title": "no project", "url": "https://example.com"}
            ],
            "tags": []
        }))
        .expect("document should normalize");

        assert_eq!(state.links.len(), 1);
        let link = &state.links[0];
        assert_eq!(link.title, "kept");
        assert_eq!(link.domain, "example.com");
        assert!(link.icon_cache.contains("favicons"));
    }

    #[test]
    fn surviving_links_get_defaults_and_placeholder_icon() {
        let state = normalize(&json!({
            "projects": [{"id": "p-1", "title": "One"}],
            "links": [{"projectId": "p-1", "tags": ["t-1", 7, null, "t-2"]}],
            "tags": []
        }))
        .expect("document should normalize");

        let link = &state.links[0];
        assert!(link.id.starts_with("link-"));
        assert_eq!(link.title, "Untitled");
        assert_eq!(link.url, "");
        assert_eq!(link.domain, "");
        assert_eq!(link.icon_cache, DEFAULT_FAVICON);
        assert_eq!(link.tags, vec!["t-1".to_string(), "t-2".to_string()]);
    }

    #[test]
    fn existing_domain_and_icon_are_kept_verbatim() {
        let state = normalize(&json!({
            "projects": [{"id": "p-1", "title": "One"}],
            "links": [{
                "projectId": "p-1",
                "url": "https://www.github.com",
                "domain": "already-set.example",
                "iconCache": "https://icons.example/cached"
            }],
            "tags": []
        }))
        .expect("document should normalize");

        assert_eq!(state.links[0].domain, "already-set.example");
        assert_eq!(state.links[0].icon_cache, "https://icons.example/cached");
    }

    #[test]
    fn tag_defaults_apply() {
        let state = normalize(&json!({
            "projects": [],
            "links": [],
            "tags": [{"name": "backend"}, {"id": "t-2"}, {}]
        }))
        .expect("document should normalize");

        assert_eq!(state.tags.len(), 3);
        assert_eq!(state.tags[0].name, "backend");
        assert!(state.tags[0].id.starts_with("tag-"));
        assert_eq!(state.tags[1].name, "tag");
        assert_eq!(state.tags[2].name, "tag");
    }

    #[test]
    fn locale_defaults_to_ru_unless_exactly_en() {
        let base = json!({"projects": [], "links": [], "tags": []});
        let mut en = base.clone();
        en["locale"] = json!("en");
        let mut odd = base.clone();
        odd["locale"] = json!("EN");

        assert_eq!(normalize(&base).expect("should normalize").locale, Locale::Ru);
        assert_eq!(normalize(&en).expect("should normalize").locale, Locale::En);
        assert_eq!(normalize(&odd).expect("should normalize").locale, Locale::Ru);
    }

    #[test]
    fn unknown_selection_falls_back_to_first_sorted_project() {
        let state = normalize(&json!({
            "projects": [
                {"id": "p-2", "title": "Two", "orderIndex": 1},
                {"id": "p-1", "title": "One", "orderIndex": 0}
            ],
            "links": [],
            "tags": [],
            "selectedProjectId": "p-404"
        }))
        .expect("document should normalize");
        assert_eq!(state.selected_project_id.as_deref(), Some("p-1"));

        let kept = normalize(&json!({
            "projects": [
                {"id": "p-2", "title": "Two", "orderIndex": 1},
                {"id": "p-1", "title": "One", "orderIndex": 0}
            ],
            "links": [],
            "tags": [],
            "selectedProjectId": "p-2"
        }))
        .expect("document should normalize");
        assert_eq!(kept.selected_project_id.as_deref(), Some("p-2"));
    }

    #[test]
    fn favicon_cache_keeps_only_string_entries() {
        let state = normalize(&json!({
            "projects": [],
            "links": [],
            "tags": [],
            "faviconCache": {"https://a.example": "icon-a", "https://b.example": 7}
        }))
        .expect("document should normalize");
        assert_eq!(state.favicon_cache.len(), 1);
        assert_eq!(
            state.favicon_cache.get("https://a.example").map(String::as_str),
            Some("icon-a")
        );
    }

    #[test]
    fn normalizing_a_valid_state_is_the_identity() {
        let state = seed::demo_state();
        let value = serde_json::to_value(&state).expect("state should serialize");
        let back = normalize(&value).expect("valid state should normalize");
        assert_eq!(back, state);
    }
}
