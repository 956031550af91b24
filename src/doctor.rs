//! Read-only health report over the raw stored document, before any
//! normalization repairs it. Anomalies listed here are exactly the
//! ones the normalizer would silently fix; the report makes them
//! visible without changing anything.

use serde::Serialize;
use serde_json::Value;

use crate::normalize;

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct DoctorReport {
    pub document_present: bool,
    pub normalizable: bool,
    pub project_count: usize,
    pub link_count: usize,
    pub tag_count: usize,
    pub orphan_links: Vec<String>,
    pub dangling_tag_refs: Vec<String>,
    pub dangling_selection: Option<String>,
    pub non_dense_order: bool,
    pub sign_violations: Vec<String>,
}

impl DoctorReport {
    pub fn is_clean(&self) -> bool {
        self.orphan_links.is_empty()
            && self.dangling_tag_refs.is_empty()
            && self.dangling_selection.is_none()
            && !self.non_dense_order
            && self.sign_violations.is_empty()
    }
}

pub fn inspect(raw: Option<&Value>) -> DoctorReport {
    let Some(raw) = raw else {
        return DoctorReport::default();
    };
    let mut report = DoctorReport {
        document_present: true,
        normalizable: normalize::normalize(raw).is_some(),
        ..DoctorReport::default()
    };

    let projects = array_of(raw, "projects");
    let links = array_of(raw, "links");
    let tags = array_of(raw, "tags");
    report.project_count = projects.len();
    report.link_count = links.len();
    report.tag_count = tags.len();

    let project_ids: Vec<&str> = projects.iter().filter_map(|p| str_field(p, "id")).collect();
    let tag_ids: Vec<&str> = tags.iter().filter_map(|t| str_field(t, "id")).collect();

    for (index, link) in links.iter().enumerate() {
        let label = str_field(link, "id")
            .or_else(|| str_field(link, "title"))
            .map_or_else(|| format!("links[{index}]"), str::to_string);
        match str_field(link, "projectId") {
            Some(project_id) if project_ids.contains(&project_id) => {}
            Some(project_id) => report
                .orphan_links
                .push(format!("{label} -> project '{project_id}'")),
            None => report.orphan_links.push(format!("{label} -> no project")),
        }
        if let Some(link_tags) = link.get("tags").and_then(Value::as_array) {
            for tag in link_tags.iter().filter_map(Value::as_str) {
                if !tag_ids.contains(&tag) {
                    report
                        .dangling_tag_refs
                        .push(format!("{label} -> tag '{tag}'"));
                }
            }
        }
    }

    if let Some(selected) = raw.get("selectedProjectId").and_then(Value::as_str) {
        if !project_ids.contains(&selected) {
            report.dangling_selection = Some(selected.to_string());
        }
    }

    let mut ranks: Vec<i64> = projects
        .iter()
        .filter_map(|p| p.get("orderIndex").and_then(Value::as_i64))
        .collect();
    ranks.sort_unstable();
    report.non_dense_order = ranks.len() != projects.len()
        || ranks
            .iter()
            .enumerate()
            .any(|(expected, rank)| *rank != expected as i64);

    for project in &projects {
        let label = str_field(project, "id")
            .or_else(|| str_field(project, "title"))
            .unwrap_or("project");
        for cost in project
            .get("monthlyOperatingCosts")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
        {
            if cost
                .get("amount")
                .and_then(Value::as_f64)
                .is_some_and(|a| a >= 0.0)
            {
                report
                    .sign_violations
                    .push(format!("{label}: non-negative expense"));
            }
        }
        for income in project
            .get("monthlyIncome")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
        {
            if income
                .get("amount")
                .and_then(Value::as_f64)
                .is_some_and(|a| a <= 0.0)
            {
                report
                    .sign_violations
                    .push(format!("{label}: non-positive income"));
            }
        }
    }

    report
}

fn array_of<'doc>(raw: &'doc Value, key: &str) -> Vec<&'doc Value> {
    raw.get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().collect())
        .unwrap_or_default()
}

fn str_field<'doc>(raw: &'doc Value, key: &str) -> Option<&'doc str> {
    raw.get(key).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::inspect;
    use crate::seed;

    #[test]
    fn missing_document_reports_absence() {
        let report = inspect(None);
        assert!(!report.document_present);
        assert!(!report.normalizable);
    }

    #[test]
    fn a_valid_state_is_clean() {
        let value = serde_json::to_value(seed::demo_state()).expect("seed should serialize");
        let report = inspect(Some(&value));
        assert!(report.document_present);
        assert!(report.normalizable);
        assert!(report.is_clean());
        assert_eq!(report.project_count, 1);
        assert_eq!(report.link_count, 6);
        assert_eq!(report.tag_count, 6);
    }

    #[test]
    fn anomalies_are_enumerated_without_repair() {
        let value = json!({
            "projects": [
                {"id": "p-1", "title": "One", "orderIndex": 0,
                 "monthlyOperatingCosts": [{"id": "c-1", "amount": 5}],
                 "monthlyIncome": [{"id": "i-1", "amount": -5}]},
                {"id": "p-2", "title": "Two", "orderIndex": 3}
            ],
            "links": [
                {"id": "l-1", "projectId": "p-404", "tags": []},
                {"id": "l-2", "projectId": "p-1", "tags": ["t-404"]}
            ],
            "tags": [{"id": "t-1", "name": "kept"}],
            "selectedProjectId": "p-404"
        });
        let report = inspect(Some(&value));
        assert!(report.normalizable);
        assert!(!report.is_clean());
        assert_eq!(report.orphan_links, vec!["l-1 -> project 'p-404'"]);
        assert_eq!(report.dangling_tag_refs, vec!["l-2 -> tag 't-404'"]);
        assert_eq!(report.dangling_selection.as_deref(), Some("p-404"));
        assert!(report.non_dense_order);
        assert_eq!(
            report.sign_violations,
            vec!["p-1: non-negative expense", "p-1: non-positive income"]
        );
    }

    #[test]
    fn unnormalizable_documents_are_still_inspected() {
        let value = json!({"projects": "broken", "links": [], "tags": []});
        let report = inspect(Some(&value));
        assert!(report.document_present);
        assert!(!report.normalizable);
        assert_eq!(report.project_count, 0);
    }
}
