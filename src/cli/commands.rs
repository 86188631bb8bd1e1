use clap::{Args, Subcommand};

#[derive(Subcommand)]
pub enum CrewCommands {
    /// List crewmates, newest first
    List {
        /// Case-insensitive substring of the name
        #[arg(long, short)]
        search: Option<String>,

        /// Category to show ("All", "Dev", "Space", "Pirate", "Default")
        #[arg(long, short)]
        category: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Keep running and reprint the listing on every change
        #[arg(long, short)]
        watch: bool,
    },

    /// Show one crewmate
    Show {
        /// Crewmate ID
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a new crewmate
    New {
        #[command(flatten)]
        fields: FormFields,

        /// Skip interactive prompts (requires --name and --role)
        #[arg(long)]
        non_interactive: bool,
    },

    /// Edit an existing crewmate
    Edit {
        /// Crewmate ID
        id: String,

        #[command(flatten)]
        fields: FormFields,

        /// Skip interactive prompts and keep unspecified fields
        #[arg(long)]
        non_interactive: bool,
    },

    /// Delete a crewmate
    Delete {
        /// Crewmate ID
        id: String,

        /// Skip interactive prompts (requires --yes)
        #[arg(long)]
        non_interactive: bool,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Print the skill and level vocabulary of each category
    Categories {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Field values accepted by `crew new` and `crew edit`.
#[derive(Args, Default)]
pub struct FormFields {
    /// Display name
    #[arg(long)]
    pub name: Option<String>,

    /// Category ("Dev", "Space", "Pirate", "Default")
    #[arg(long)]
    pub category: Option<String>,

    /// Role ("Leader", "Engineer", "Pilot", "Medic", "Scout")
    #[arg(long)]
    pub role: Option<String>,

    /// Skill to select (repeatable; replaces the current selection)
    #[arg(long = "skill")]
    pub skills: Vec<String>,

    /// Level within the category
    #[arg(long)]
    pub level: Option<String>,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Save the record store server URL
    SetServer {
        /// Base URL, e.g. "http://127.0.0.1:8080"
        url: String,
    },

    /// Show the resolved client configuration
    Show,
}
