use std::fmt;

use chrono::{DateTime, Utc};

use crate::roster::{CategoryFilter, EmptyHint, RosterView};
use crate::types::CrewMember;

/// Skills shown on a listing card before collapsing into "+N".
pub const CARD_SKILL_PREVIEW: usize = 3;

/// Crewmate as a one-line listing card.
pub struct MemberCard<'a> {
    pub member: &'a CrewMember,
}

impl fmt::Display for MemberCard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let member = self.member;
        write!(
            f,
            "[{}] {}  {} / {}  {}",
            member.initial(),
            member.name,
            member.category.label(),
            member.attributes.role_label(),
            member.attributes.level_label()
        )?;

        let (shown, hidden) = member.attributes.skill_preview(CARD_SKILL_PREVIEW);
        if !shown.is_empty() {
            write!(f, "  {}", shown.join(", "))?;
        }
        if hidden > 0 {
            write!(f, " +{hidden}")?;
        }
        Ok(())
    }
}

/// Skill offered in the multi-select, marked when it falls outside the
/// current category's vocabulary.
#[derive(Clone)]
pub struct SkillOption {
    pub name: String,
    pub in_vocabulary: bool,
}

impl fmt::Display for SkillOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.in_vocabulary {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} (other category)", self.name)
        }
    }
}

/// Vocabulary of `choices` followed by any `selected` skill it lacks.
#[must_use]
pub fn skill_options(choices: &[&str], selected: &[String]) -> Vec<SkillOption> {
    let mut options: Vec<SkillOption> = choices
        .iter()
        .map(|name| SkillOption {
            name: (*name).to_string(),
            in_vocabulary: true,
        })
        .collect();
    for skill in selected {
        if !choices.contains(&skill.as_str()) {
            options.push(SkillOption {
                name: skill.clone(),
                in_vocabulary: false,
            });
        }
    }
    options
}

pub fn print_listing(view: &RosterView) {
    let visible = view.visible();

    println!();
    let filter = match view.category() {
        CategoryFilter::All => String::new(),
        category => format!(" in {category}"),
    };
    let search = if view.query().is_empty() {
        String::new()
    } else {
        format!(" matching \"{}\"", view.query())
    };
    println!(
        "Showing {} of {} crewmates{filter}{search}",
        visible.len(),
        view.total()
    );
    println!();

    match view.empty_hint() {
        Some(EmptyHint::NoMembers) => {
            println!("  No crewmates yet. Add one with 'teamforge crew new'.");
        }
        Some(EmptyHint::NoMatches) => {
            println!("  No crewmates match the current search or category.");
        }
        None => {
            for member in visible {
                println!("  {}  {}", MemberCard { member }, member.id);
            }
        }
    }
    println!();
}

pub fn print_member(member: &CrewMember) {
    println!();
    println!("{} ({})", member.name, member.id);
    println!();
    println!("  Category: {}", member.category.label());
    println!("  Role:     {}", member.attributes.role_label());
    println!("  Level:    {}", member.attributes.level_label());
    if member.attributes.skills.is_empty() {
        println!("  Skills:   none");
    } else {
        println!("  Skills:   {}", member.attributes.skills.join(", "));
    }
    if let Some(notes) = &member.attributes.notes {
        println!("  Notes:    {notes}");
    }
    println!("  Added:    {}", format_relative_time(&member.created_at));
    println!("  Updated:  {}", format_relative_time(&member.updated_at));
    println!();
}

/// Format a datetime as relative time (e.g., "2 days ago")
#[must_use]
pub fn format_relative_time(dt: &DateTime<Utc>) -> String {
    let diff = Utc::now().signed_duration_since(*dt);

    let (count, unit) = if diff.num_seconds() < 0 {
        return "in the future".to_string();
    } else if diff.num_seconds() < 60 {
        return "just now".to_string();
    } else if diff.num_minutes() < 60 {
        (diff.num_minutes(), "minute")
    } else if diff.num_hours() < 24 {
        (diff.num_hours(), "hour")
    } else if diff.num_days() < 30 {
        (diff.num_days(), "day")
    } else if diff.num_days() < 365 {
        (diff.num_days() / 30, "month")
    } else {
        (diff.num_days() / 365, "year")
    };

    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}

/// Confirm a destructive action, respecting --yes and non-interactive mode
pub fn confirm_action(message: &str, yes: bool, non_interactive: bool) -> anyhow::Result<bool> {
    if yes {
        Ok(true)
    } else if non_interactive {
        anyhow::bail!("--yes is required for destructive operations in non-interactive mode");
    } else {
        Ok(inquire::Confirm::new(message)
            .with_default(false)
            .prompt()?)
    }
}
