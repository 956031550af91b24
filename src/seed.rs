use std::collections::BTreeMap;

use crate::ids;
use crate::state::{AppState, IncomeExpenseItem, LinkItem, Locale, Project, Tag};
use crate::weburl::favicon_proxy;

/// Fallback state used on first start and on explicit reset: one
/// fully furnished project so every surface has something to show.
/// Ids are freshly generated per call; everything else is fixed.
pub fn demo_state() -> AppState {
    let tags: Vec<Tag> = ["backend", "frontend", "design", "infra", "management", "analytics"]
        .into_iter()
        .map(|name| Tag {
            id: ids::tag_id(),
            name: name.to_string(),
        })
        .collect();

    let project_id = ids::project_id();
    let project = Project {
        id: project_id.clone(),
        title: "Loyalty Platform Web App".to_string(),
        short_description: "Production web app for customer loyalty management: catalog, rewards, admin panel, and analytics.".to_string(),
        monthly_operating_costs: vec![
            cost(-1200.0, "Vercel Pro + edge functions"),
            cost(-450.0, "Atlassian (Jira + Confluence)"),
            cost(-250.0, "Sentry + log retention"),
            cost(-320.0, "DesignOps tools (Figma/Framer)"),
        ],
        monthly_income: vec![
            income(6200.0, "B2B subscription plans"),
            income(1800.0, "Enterprise support add-on"),
        ],
        order_index: 0,
    };

    let links = vec![
        link(
            &project_id,
            "GitHub Monorepo",
            "Main repository with web app, API gateway, and shared packages",
            "https://github.com/vercel/next.js",
            vec![tags[0].id.clone(), tags[1].id.clone()],
            "github.com",
            "https://github.com",
        ),
        link(
            &project_id,
            "Staging Environment",
            "Pre-production deployment for QA and acceptance testing",
            "https://vercel.com",
            vec![tags[3].id.clone()],
            "vercel.com",
            "https://vercel.com",
        ),
        link(
            &project_id,
            "Jira Roadmap",
            "Sprint board, backlog, delivery milestones, and incidents",
            "https://www.atlassian.com/software/jira",
            vec![tags[4].id.clone()],
            "atlassian.com",
            "https://www.atlassian.com/software/jira",
        ),
        link(
            &project_id,
            "Figma System",
            "UI kit, component states, and handoff specs for frontend",
            "https://www.figma.com",
            vec![tags[2].id.clone(), tags[1].id.clone()],
            "figma.com",
            "https://www.figma.com",
        ),
        link(
            &project_id,
            "Sentry Dashboard",
            "Runtime errors, alerts, and release health tracking",
            "https://sentry.io",
            vec![tags[3].id.clone()],
            "sentry.io",
            "https://sentry.io",
        ),
        link(
            &project_id,
            "Product Analytics",
            "Funnels and retention reports for conversion optimization",
            "https://mixpanel.com",
            vec![tags[5].id.clone()],
            "mixpanel.com",
            "https://mixpanel.com",
        ),
    ];

    AppState {
        locale: Locale::En,
        projects: vec![project],
        links,
        tags,
        selected_project_id: Some(project_id),
        favicon_cache: BTreeMap::new(),
    }
}

fn cost(amount: f64, comment: &str) -> IncomeExpenseItem {
    IncomeExpenseItem {
        id: ids::cost_id(),
        amount,
        comment: comment.to_string(),
    }
}

fn income(amount: f64, comment: &str) -> IncomeExpenseItem {
    IncomeExpenseItem {
        id: ids::income_id(),
        amount,
        comment: comment.to_string(),
    }
}

fn link(
    project_id: &str,
    title: &str,
    description: &str,
    url: &str,
    tags: Vec<String>,
    domain: &str,
    icon_target: &str,
) -> LinkItem {
    LinkItem {
        id: ids::link_id(),
        project_id: project_id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        url: url.to_string(),
        tags,
        domain: domain.to_string(),
        icon_cache: favicon_proxy(icon_target),
    }
}
