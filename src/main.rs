mod app;
mod cli;
mod cli_ops;
mod completions;
mod config;
mod doctor;
mod export;
mod ids;
mod mutate;
mod normalize;
mod seed;
mod state;
mod store;
mod ui;
mod views;
mod weburl;
mod writer;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn print_json(value: &impl serde::Serialize) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).expect("json serialization should work")
    );
}

fn run() -> Result<(), app::AppError> {
    use clap::Parser;
    use cli::{Commands, FinanceSubcommands, LinkSubcommands, ProjectSubcommands, TagSubcommands};

    let cli = cli::Cli::parse();

    if let Commands::Completions(args) = &cli.command {
        return completions::run_completions_command(args.shell.as_deref(), args.install);
    }

    let config = config::Config::load(&cli.root)?;
    let db_path = cli.db.clone().unwrap_or_else(|| config.db_path.clone());

    // Doctor reads the raw document without seeding anything.
    if let Commands::Doctor(args) = &cli.command {
        let conn = store::open_connection(&db_path)?;
        let raw = store::load_raw(&conn);
        let report = doctor::inspect(raw.as_ref());
        if args.json {
            print_json(&report);
        } else {
            print_doctor_report(&report);
        }
        return Ok(());
    }

    let mut app = app::App::open(&db_path, config.seed_locale)?;

    match cli.command {
        Commands::Project(args) => match args.command {
            ProjectSubcommands::New(new) => {
                app.create_project(&new.title, new.desc.as_deref().unwrap_or_default())?;
                let id = app.state().selected_project_id.clone().unwrap_or_default();
                println!("project created: {id}");
            }
            ProjectSubcommands::Edit(edit) => {
                app.update_project(
                    &edit.id,
                    &edit.title,
                    edit.desc.as_deref().unwrap_or_default(),
                )?;
                println!("project updated");
            }
            ProjectSubcommands::Rm(rm) => {
                app.delete_project(&rm.id);
                println!("project deleted");
            }
            ProjectSubcommands::Mv(mv) => {
                app.reorder_projects(&mv.source, &mv.target);
                println!("projects reordered");
            }
            ProjectSubcommands::Select(select) => {
                app.select_project(&select.id)?;
                println!("project selected");
            }
            ProjectSubcommands::Ls(ls) => {
                let ordered = views::ordered_projects(app.state());
                if ls.json {
                    print_json(&ordered);
                } else {
                    ui::print_project_list(&ordered, app.state().selected_project_id.as_deref());
                }
            }
        },
        Commands::Link(args) => match args.command {
            LinkSubcommands::Add(add) => {
                app.add_link(
                    add.project.as_deref(),
                    &add.title,
                    add.desc.as_deref().unwrap_or_default(),
                    &add.url,
                    &add.tags,
                )?;
                let id = app
                    .state()
                    .links
                    .last()
                    .map(|link| link.id.clone())
                    .unwrap_or_default();
                println!("link added: {id}");
            }
            LinkSubcommands::Edit(edit) => {
                app.update_link(
                    &edit.id,
                    &edit.title,
                    edit.desc.as_deref().unwrap_or_default(),
                    &edit.url,
                    &edit.tags,
                )?;
                println!("link updated");
            }
            LinkSubcommands::Rm(rm) => {
                app.delete_link(&rm.id);
                println!("link deleted");
            }
        },
        Commands::Ls(args) => {
            let filter = link_filter(&app, &args.tags, &args.domains)?;
            let sort = parse_sort(&args.sort)?;
            let links = views::filtered_links(app.state(), &filter, sort);
            if args.json {
                print_json(&links);
            } else {
                ui::print_link_list(&links, app.state(), &filter, sort);
            }
        }
        Commands::Tag(args) => match args.command {
            TagSubcommands::Add(add) => {
                app.add_tag(&add.name)?;
                println!("tag added");
            }
            TagSubcommands::Rename(rename) => {
                app.rename_tag(&rename.tag, &rename.name)?;
                println!("tag renamed");
            }
            TagSubcommands::Rm(rm) => {
                app.delete_tag(&rm.tag)?;
                println!("tag deleted");
            }
            TagSubcommands::Ls(ls) => {
                if ls.json {
                    print_json(&app.state().tags);
                } else {
                    ui::print_tag_list(&app.state().tags, app.state());
                }
            }
        },
        Commands::Finance(args) => match args.command {
            FinanceSubcommands::Add(add) => {
                let kind = parse_kind(&add.kind)?;
                let amount = parse_amount(&add.amount)?;
                app.add_finance_item(
                    add.project.as_deref(),
                    kind,
                    amount,
                    add.comment.as_deref().unwrap_or_default(),
                )?;
                println!("{} recorded", kind.as_str());
            }
            FinanceSubcommands::Rm(rm) => {
                let kind = parse_kind(&rm.kind)?;
                app.delete_finance_item(rm.project.as_deref(), kind, &rm.item_id)?;
                println!("{} entry deleted", kind.as_str());
            }
            FinanceSubcommands::Ls(ls) => {
                let project_id = app.resolve_project(ls.project.as_deref())?;
                let Some(project) = app.state().project(&project_id) else {
                    return Err(app::AppError::NotFound(format!("project '{project_id}'")));
                };
                if ls.json {
                    print_json(&serde_json::json!({
                        "monthlyOperatingCosts": project.monthly_operating_costs,
                        "monthlyIncome": project.monthly_income,
                    }));
                } else {
                    ui::print_finance(project);
                }
            }
        },
        Commands::Totals(args) => {
            let totals = app.totals();
            if args.json {
                print_json(&totals);
            } else {
                ui::print_totals(&totals);
            }
        }
        Commands::Locale(args) => {
            let locale: state::Locale =
                args.locale
                    .parse()
                    .map_err(|err: state::ParseLocaleError| {
                        app::AppError::InvalidArgument(err.to_string())
                    })?;
            app.set_locale(locale);
            println!("locale set to {}", locale.as_str());
        }
        Commands::Export(args) => {
            let dir = args.out.unwrap_or_else(|| config.export_dir.clone());
            let path = app.export_to(&dir)?;
            println!("database exported to {}", path.display());
        }
        Commands::Import(args) => {
            app.import_from(&args.file)?;
            println!("database imported");
        }
        Commands::Csv(args) => {
            let filter = link_filter(&app, &args.tags, &args.domains)?;
            let sort = parse_sort(&args.sort)?;
            let Some(project) = views::current_project(app.state()) else {
                return Err(app::AppError::InvalidArgument(
                    "no project selected".to_string(),
                ));
            };
            let links = views::filtered_links(app.state(), &filter, sort);
            let rows = export::csv_rows(app.state(), &links);
            let out = args
                .out
                .unwrap_or_else(|| config.export_dir.join(export::csv_file_name(&project.title)));
            export::write_csv(&out, &rows)?;
            println!("csv exported to {}", out.display());
        }
        Commands::Reset(args) => {
            app.reset(args.keep_locale);
            println!("database reset");
        }
        // Both are dispatched before the App opens.
        Commands::Doctor(_) | Commands::Completions(_) => {}
    }

    app.flush()
}

fn parse_kind(raw: &str) -> Result<state::FinanceKind, app::AppError> {
    raw.parse().map_err(|err: state::ParseFinanceKindError| {
        app::AppError::InvalidArgument(err.to_string())
    })
}

fn parse_sort(raw: &str) -> Result<views::SortOption, app::AppError> {
    raw.parse().map_err(|err: views::ParseSortOptionError| {
        app::AppError::InvalidArgument(err.to_string())
    })
}

/// Amounts arrive as user text; embedded spaces (thousands grouping)
/// are tolerated.
fn parse_amount(raw: &str) -> Result<f64, app::AppError> {
    let cleaned: String = raw.chars().filter(|ch| !ch.is_whitespace()).collect();
    let parsed = cleaned
        .parse::<f64>()
        .map_err(|_| app::AppError::InvalidArgument("enter a valid amount".to_string()))?;
    if !parsed.is_finite() {
        return Err(app::AppError::InvalidArgument(
            "enter a valid amount".to_string(),
        ));
    }
    Ok(parsed)
}

fn link_filter(
    app: &app::App,
    tag_refs: &[String],
    domains: &[String],
) -> Result<views::LinkFilter, app::AppError> {
    let tags = tag_refs
        .iter()
        .map(|tag_ref| app.resolve_tag(tag_ref))
        .collect::<Result<Vec<String>, app::AppError>>()?;
    Ok(views::LinkFilter {
        tags,
        domains: domains.to_vec(),
    })
}

fn print_doctor_report(report: &doctor::DoctorReport) {
    if !report.document_present {
        println!("no stored document; a fresh start would seed demo data");
        return;
    }
    println!(
        "document: present, {}",
        if report.normalizable {
            "normalizable"
        } else {
            "NOT normalizable (import would be rejected)"
        }
    );
    println!(
        "counts: {} project(s), {} link(s), {} tag(s)",
        report.project_count, report.link_count, report.tag_count
    );
    if report.is_clean() {
        println!("no anomalies found");
        return;
    }
    for orphan in &report.orphan_links {
        println!("orphan link: {orphan}");
    }
    for dangling in &report.dangling_tag_refs {
        println!("dangling tag reference: {dangling}");
    }
    if let Some(selected) = &report.dangling_selection {
        println!("selected project '{selected}' does not exist");
    }
    if report.non_dense_order {
        println!("project order ranks are not a dense 0..N-1 sequence");
    }
    for violation in &report.sign_violations {
        println!("sign violation: {violation}");
    }
}
