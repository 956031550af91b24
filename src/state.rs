use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Ru,
    En,
}

impl Locale {
    pub fn as_str(self) -> &'static str {
        match self {
            Locale::Ru => "ru",
            Locale::En => "en",
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale::Ru
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLocaleError(pub String);

impl fmt::Display for ParseLocaleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown locale '{}', expected 'ru' or 'en'", self.0)
    }
}

impl Error for ParseLocaleError {}

impl FromStr for Locale {
    type Err = ParseLocaleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ru" => Ok(Locale::Ru),
            "en" => Ok(Locale::En),
            other => Err(ParseLocaleError(other.to_string())),
        }
    }
}

/// Which of a project's two finance lists an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinanceKind {
    Expense,
    Income,
}

impl FinanceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FinanceKind::Expense => "expense",
            FinanceKind::Income => "income",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFinanceKindError(pub String);

impl fmt::Display for ParseFinanceKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown finance kind '{}', expected 'expense' or 'income'",
            self.0
        )
    }
}

impl Error for ParseFinanceKindError {}

impl FromStr for FinanceKind {
    type Err = ParseFinanceKindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "expense" | "expenses" | "cost" | "costs" => Ok(FinanceKind::Expense),
            "income" => Ok(FinanceKind::Income),
            other => Err(ParseFinanceKindError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeExpenseItem {
    pub id: String,
    pub amount: f64,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub short_description: String,
    pub monthly_operating_costs: Vec<IncomeExpenseItem>,
    pub monthly_income: Vec<IncomeExpenseItem>,
    pub order_index: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkItem {
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub tags: Vec<String>,
    pub domain: String,
    pub icon_cache: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
}

/// The whole aggregate. This is the single unit of persistence: every
/// mutation replaces it wholesale and the serialized form doubles as
/// the export/import file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub locale: Locale,
    pub projects: Vec<Project>,
    pub links: Vec<LinkItem>,
    pub tags: Vec<Tag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_project_id: Option<String>,
    pub favicon_cache: BTreeMap<String, String>,
}

impl AppState {
    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|project| project.id == id)
    }

    pub fn tag(&self, id: &str) -> Option<&Tag> {
        self.tags.iter().find(|tag| tag.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persisted_field_names_match_the_original_document_shape() {
        let state = AppState {
            locale: Locale::En,
            projects: vec![Project {
                id: "project-1".into(),
                title: "Demo".into(),
                short_description: "".into(),
                monthly_operating_costs: vec![IncomeExpenseItem {
                    id: "cost-1".into(),
                    amount: -10.0,
                    comment: "hosting".into(),
                }],
                monthly_income: vec![],
                order_index: 0,
            }],
            links: vec![LinkItem {
                id: "link-1".into(),
                project_id: "project-1".into(),
                title: "Repo".into(),
                description: "".into(),
                url: "https://example.com".into(),
                tags: vec![],
                domain: "example.com".into(),
                icon_cache: "https://icons.example/e".into(),
            }],
            tags: vec![],
            selected_project_id: Some("project-1".into()),
            favicon_cache: BTreeMap::new(),
        };

        let value = serde_json::to_value(&state).expect("state should serialize");
        assert_eq!(value["locale"], "en");
        assert!(value["projects"][0]["shortDescription"].is_string());
        assert!(value["projects"][0]["monthlyOperatingCosts"].is_array());
        assert!(value["projects"][0]["monthlyIncome"].is_array());
        assert!(value["projects"][0]["orderIndex"].is_number());
        assert!(value["links"][0]["projectId"].is_string());
        assert!(value["links"][0]["iconCache"].is_string());
        assert_eq!(value["selectedProjectId"], "project-1");
        assert!(value["faviconCache"].is_object());
    }

    #[test]
    fn absent_selection_is_omitted_from_the_document() {
        let state = AppState {
            locale: Locale::Ru,
            projects: vec![],
            links: vec![],
            tags: vec![],
            selected_project_id: None,
            favicon_cache: BTreeMap::new(),
        };
        let value = serde_json::to_value(&state).expect("state should serialize");
        assert!(value.get("selectedProjectId").is_none());
    }

    #[test]
    fn finance_kind_parses_common_spellings() {
        assert_eq!("expense".parse::<FinanceKind>(), Ok(FinanceKind::Expense));
        assert_eq!("costs".parse::<FinanceKind>(), Ok(FinanceKind::Expense));
        assert_eq!("income".parse::<FinanceKind>(), Ok(FinanceKind::Income));
        assert!("profit".parse::<FinanceKind>().is_err());
    }

    #[test]
    fn locale_round_trips_through_serde() {
        let json = serde_json::to_string(&Locale::En).expect("locale should serialize");
        assert_eq!(json, "\"en\"");
        let back: Locale = serde_json::from_str(&json).expect("locale should deserialize");
        assert_eq!(back, Locale::En);
    }
}
