use std::sync::Arc;

use inquire::{MultiSelect, Select, Text};
use serde::Serialize;

use super::commands::FormFields;
use super::connect;
use super::pickers::{SkillOption, confirm_action, print_listing, print_member, skill_options};
use crate::client::RecordStore;
use crate::error::Error;
use crate::roster::{CrewForm, DetailState, MemberDetail, Navigation, RosterView};
use crate::types::{Category, Role};

fn print_json(view: &RosterView) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&view.visible())?);
    Ok(())
}

pub async fn run_crew_list(
    server: Option<&str>,
    search: Option<String>,
    category: Option<String>,
    json: bool,
    watch: bool,
) -> anyhow::Result<()> {
    let store: Arc<dyn RecordStore> = Arc::new(connect(server)?);
    let mut view = RosterView::new(store);
    if let Some(query) = search {
        view.set_query(query);
    }
    if let Some(category) = category {
        // FromStr for CategoryFilter never fails.
        view.set_category(category.parse().unwrap_or_default());
    }

    let show = |view: &RosterView| {
        if json {
            print_json(view)
        } else {
            print_listing(view);
            Ok(())
        }
    };

    if !watch {
        view.refresh().await?;
        return show(&view);
    }

    view.activate().await?;
    show(&view)?;
    if !json {
        println!("Watching for changes. Press Ctrl+C to stop.");
    }

    loop {
        tokio::select! {
            more = view.sync_once() => {
                if !more {
                    tracing::warn!("Change channel closed by server");
                    break;
                }
                show(&view)?;
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    view.deactivate();
    Ok(())
}

pub async fn run_crew_show(server: Option<&str>, id: String, json: bool) -> anyhow::Result<()> {
    let store = connect(server)?;
    let mut detail = MemberDetail::new(id);

    detail.load(&store).await;
    match detail.state() {
        DetailState::Loaded(member) => {
            if json {
                println!("{}", serde_json::to_string_pretty(member)?);
            } else {
                print_member(member);
            }
            Ok(())
        }
        DetailState::NotFound => anyhow::bail!("Crewmate not found: {}", detail.id()),
        DetailState::Failed(message) => anyhow::bail!("Failed to load crewmate: {message}"),
        DetailState::Loading => anyhow::bail!("Crewmate {} did not finish loading", detail.id()),
    }
}

pub async fn run_crew_new(
    server: Option<&str>,
    fields: FormFields,
    non_interactive: bool,
) -> anyhow::Result<()> {
    let store = connect(server)?;
    let mut form = CrewForm::create();

    fill_form(&mut form, fields, non_interactive)?;
    form.submit(&store).await?;

    println!();
    println!("Added '{}' to the roster", form.name().trim());
    println!();

    Ok(())
}

pub async fn run_crew_edit(
    server: Option<&str>,
    id: String,
    fields: FormFields,
    non_interactive: bool,
) -> anyhow::Result<()> {
    let store = connect(server)?;
    let mut form = CrewForm::edit(id.clone());

    load_form(&mut form, &store, &id).await?;
    fill_form(&mut form, fields, non_interactive)?;

    if let Navigation::Detail(id) = form.submit(&store).await? {
        println!();
        println!("Saved changes to '{}' ({id})", form.name().trim());
        println!();
    }

    Ok(())
}

pub async fn run_crew_delete(
    server: Option<&str>,
    id: String,
    non_interactive: bool,
    yes: bool,
) -> anyhow::Result<()> {
    let store = connect(server)?;
    let mut form = CrewForm::edit(id.clone());

    load_form(&mut form, &store, &id).await?;
    let name = form.name().to_string();

    let mut prompt_error = None;
    let outcome = form
        .delete(&store, |message| {
            match confirm_action(&format!("{message} ({name})"), yes, non_interactive) {
                Ok(confirmed) => confirmed,
                Err(e) => {
                    prompt_error = Some(e);
                    false
                }
            }
        })
        .await;
    if let Some(e) = prompt_error {
        return Err(e);
    }

    match outcome? {
        Some(_) => {
            println!();
            println!("Deleted '{name}'");
            println!();
        }
        None => println!("Cancelled."),
    }

    Ok(())
}

#[derive(Serialize)]
struct CategoryOutput {
    category: String,
    skills: &'static [&'static str],
    levels: &'static [&'static str],
}

pub fn run_crew_categories(json: bool) -> anyhow::Result<()> {
    let categories: Vec<CategoryOutput> = Category::KNOWN
        .iter()
        .map(|category| CategoryOutput {
            category: category.to_string(),
            skills: category.taxonomy().skills,
            levels: category.taxonomy().levels,
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&categories)?);
        return Ok(());
    }

    println!();
    for output in &categories {
        println!("{}", output.category);
        println!("  Skills: {}", output.skills.join(", "));
        println!("  Levels: {}", output.levels.join(", "));
        println!();
    }

    Ok(())
}

async fn load_form(form: &mut CrewForm, store: &dyn RecordStore, id: &str) -> anyhow::Result<()> {
    match form.load(store).await {
        Ok(()) => Ok(()),
        Err(Error::NotFound) => anyhow::bail!("Crewmate not found: {id}"),
        Err(e) => Err(e.into()),
    }
}

/// Applies flag values, prompting for the rest unless `non_interactive`.
/// Category goes before skills and level since it decides their vocabulary.
fn fill_form(form: &mut CrewForm, fields: FormFields, non_interactive: bool) -> anyhow::Result<()> {
    match fields.name {
        Some(name) => form.set_name(name),
        None if !non_interactive => {
            let name = Text::new("Name:")
                .with_initial_value(form.name())
                .with_validator(|input: &str| {
                    if input.trim().is_empty() {
                        Err("Name cannot be empty".into())
                    } else {
                        Ok(inquire::validator::Validation::Valid)
                    }
                })
                .prompt()?;
            form.set_name(name);
        }
        None => {}
    }

    match fields.category {
        Some(raw) => {
            let category = Category::parse_known(&raw)
                .ok_or_else(|| anyhow::anyhow!("Unknown category: {raw}"))?;
            form.select_category(category);
        }
        None if !non_interactive => {
            let cursor = Category::KNOWN
                .iter()
                .position(|c| c == form.category())
                .unwrap_or(0);
            let category = Select::new("Category:", Category::KNOWN.to_vec())
                .with_starting_cursor(cursor)
                .prompt()?;
            form.select_category(category);
        }
        None => {}
    }

    match fields.role {
        Some(raw) => form.select_role(raw.parse::<Role>().map_err(anyhow::Error::msg)?),
        None if !non_interactive => {
            let cursor = form
                .attributes()
                .role
                .and_then(|role| Role::ALL.iter().position(|r| *r == role))
                .unwrap_or(0);
            let role = Select::new("Role:", Role::ALL.to_vec())
                .with_starting_cursor(cursor)
                .prompt()?;
            form.select_role(role);
        }
        None => {}
    }

    if !fields.skills.is_empty() {
        set_skills(form, &fields.skills);
    } else if !non_interactive {
        let options = skill_options(form.skill_choices(), &form.attributes().skills);
        let selected: Vec<usize> = options
            .iter()
            .enumerate()
            .filter(|(_, option)| form.attributes().has_skill(&option.name))
            .map(|(i, _)| i)
            .collect();
        let picked: Vec<SkillOption> = MultiSelect::new("Skills:", options)
            .with_default(&selected)
            .with_help_message("Space to toggle, Enter to confirm")
            .prompt()?;
        let names: Vec<String> = picked.into_iter().map(|option| option.name).collect();
        set_skills(form, &names);
    }

    match fields.level {
        Some(level) => {
            let category = form.category();
            if !category.taxonomy().has_level(&level) {
                anyhow::bail!(
                    "Unknown level for {}: {level} (expected one of: {})",
                    category.label(),
                    form.level_choices().join(", ")
                );
            }
            form.select_level(level);
        }
        None if !non_interactive => {
            let choices = form.level_choices().to_vec();
            let cursor = form
                .attributes()
                .level
                .as_deref()
                .and_then(|level| choices.iter().position(|c| *c == level))
                .unwrap_or(0);
            let level = Select::new("Level:", choices)
                .with_starting_cursor(cursor)
                .prompt()?;
            form.select_level(level);
        }
        None => {}
    }

    match fields.notes {
        Some(notes) => form.set_notes(notes),
        None if !non_interactive => {
            let current = form.attributes().notes.clone().unwrap_or_default();
            let notes = Text::new("Notes (optional):")
                .with_initial_value(&current)
                .prompt()?;
            form.set_notes(notes);
        }
        None => {}
    }

    Ok(())
}

/// Makes `skills` the selection, in that order, by toggling.
fn set_skills(form: &mut CrewForm, skills: &[String]) {
    for skill in form.attributes().skills.clone() {
        form.toggle_skill(&skill);
    }
    for skill in skills {
        if !form.attributes().has_skill(skill) {
            form.toggle_skill(skill);
        }
    }
}
