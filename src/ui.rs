use std::io::{self, IsTerminal};

use crate::state::{AppState, LinkItem, Project, Tag};
use crate::views::{LinkFilter, SortOption, Totals};

pub fn print_project_list(projects: &[&Project], selected: Option<&str>) {
    let palette = Palette::auto();
    println!("{}", palette.heading("Projects"));
    if projects.is_empty() {
        println!("{}", palette.dim("no projects yet"));
        return;
    }
    for project in projects {
        let marker = if selected == Some(project.id.as_str()) {
            "*"
        } else {
            " "
        };
        let mut line = format!(
            "{} {} {}",
            marker,
            palette.id(&project.id),
            project.title
        );
        if !project.short_description.is_empty() {
            line.push(' ');
            line.push_str(&palette.dim(&project.short_description));
        }
        println!("{line}");
    }
    println!("{}", palette.dim(&format!("{} project(s)", projects.len())));
}

pub fn print_link_list(
    links: &[&LinkItem],
    state: &AppState,
    filter: &LinkFilter,
    sort: SortOption,
) {
    let palette = Palette::auto();
    println!("{}", palette.heading("Links"));
    if let Some(summary) = filter_summary(state, filter, sort) {
        println!("{}", palette.dim(&format!("filters: {summary}")));
    }
    if links.is_empty() {
        println!("{}", palette.dim("no links matched"));
        return;
    }
    for link in links {
        println!("{}", format_link_row(link, state, &palette));
    }
    println!("{}", palette.dim(&format!("{} link(s)", links.len())));
}

fn format_link_row(link: &LinkItem, state: &AppState, palette: &Palette) -> String {
    let mut line = format!(
        "{} {} {}",
        palette.id(&link.id),
        palette.domain(&link.domain),
        link.title
    );
    if !link.description.is_empty() {
        line.push(' ');
        line.push_str(&palette.dim(&link.description));
    }
    let names: Vec<&str> = link
        .tags
        .iter()
        .filter_map(|tag_id| state.tag(tag_id))
        .map(|tag| tag.name.as_str())
        .collect();
    if !names.is_empty() {
        line.push(' ');
        line.push_str(&palette.tags(&format!("#{}", names.join(" #"))));
    }
    line
}

pub fn print_tag_list(tags: &[Tag], state: &AppState) {
    let palette = Palette::auto();
    println!("{}", palette.heading("Tags"));
    if tags.is_empty() {
        println!("{}", palette.dim("no tags defined"));
        return;
    }
    for tag in tags {
        let used = state
            .links
            .iter()
            .filter(|link| link.tags.iter().any(|id| id == &tag.id))
            .count();
        println!(
            "{} {} {}",
            palette.id(&tag.id),
            tag.name,
            palette.dim(&format!("{used} link(s)"))
        );
    }
}

pub fn print_finance(project: &Project) {
    let palette = Palette::auto();
    println!("{}", palette.heading(&format!("Finance: {}", project.title)));
    println!("{}", palette.dim("monthly operating costs:"));
    if project.monthly_operating_costs.is_empty() {
        println!("{}", palette.dim("  none"));
    }
    for item in &project.monthly_operating_costs {
        println!(
            "  {} {} {}",
            palette.id(&item.id),
            palette.expense(&format_amount(item.amount)),
            item.comment
        );
    }
    println!("{}", palette.dim("monthly income:"));
    if project.monthly_income.is_empty() {
        println!("{}", palette.dim("  none"));
    }
    for item in &project.monthly_income {
        println!(
            "  {} {} {}",
            palette.id(&item.id),
            palette.income(&format_amount(item.amount)),
            item.comment
        );
    }
}

pub fn print_totals(totals: &Totals) {
    let palette = Palette::auto();
    println!("{}", palette.heading("Totals"));
    println!(
        "expenses: {}",
        palette.expense(&format_amount(totals.total_expenses))
    );
    println!(
        "income:   {}",
        palette.income(&format_amount(totals.total_income))
    );
    let profit = format_amount(totals.profit);
    let painted = if totals.profit >= 0.0 {
        palette.income(&profit)
    } else {
        palette.expense(&profit)
    };
    println!("profit:   {painted}");
}

fn filter_summary(state: &AppState, filter: &LinkFilter, sort: SortOption) -> Option<String> {
    let mut parts = Vec::new();
    if !filter.tags.is_empty() {
        let names: Vec<&str> = filter
            .tags
            .iter()
            .map(|tag_id| {
                state
                    .tag(tag_id)
                    .map_or(tag_id.as_str(), |tag| tag.name.as_str())
            })
            .collect();
        parts.push(format!("tags={}", names.join(",")));
    }
    if !filter.domains.is_empty() {
        parts.push(format!("domains={}", filter.domains.join(",")));
    }
    if sort != SortOption::default() {
        parts.push(format!("sort={}", sort.as_str()));
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

/// Whole amounts print without a fraction; everything else keeps two
/// decimal places.
pub fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

struct Palette {
    enabled: bool,
}

impl Palette {
    fn auto() -> Self {
        let enabled = std::env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal();
        Self { enabled }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.enabled {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn heading(&self, text: &str) -> String {
        self.paint("1;36", text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint("2", text)
    }

    fn id(&self, text: &str) -> String {
        self.paint("1;94", text)
    }

    fn domain(&self, text: &str) -> String {
        self.paint("35", &format!("[{text}]"))
    }

    fn tags(&self, text: &str) -> String {
        self.paint("90", text)
    }

    fn expense(&self, text: &str) -> String {
        self.paint("31", text)
    }

    fn income(&self, text: &str) -> String {
        self.paint("32", text)
    }
}
