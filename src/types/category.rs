use std::fmt;

use serde::{Deserialize, Serialize};

/// Skill vocabulary and ordered level progression for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Taxonomy {
    pub skills: &'static [&'static str],
    pub levels: &'static [&'static str],
}

impl Taxonomy {
    #[must_use]
    pub fn first_level(&self) -> &'static str {
        self.levels[0]
    }

    #[must_use]
    pub fn has_level(&self, level: &str) -> bool {
        self.levels.contains(&level)
    }
}

const DEV: Taxonomy = Taxonomy {
    skills: &[
        "React",
        "Node.js",
        "Python",
        "Go",
        "Vue",
        "Angular",
        "TypeScript",
        "Django",
        "Flask",
        "Express",
        "GraphQL",
        "SQL",
        "MongoDB",
        "Docker",
        "Kubernetes",
        "AWS",
        "Firebase",
        "Next.js",
        "Tailwind CSS",
        "Redux",
    ],
    levels: &["Intern", "Junior", "Mid-level", "Senior", "Lead"],
};

const SPACE: Taxonomy = Taxonomy {
    skills: &["Piloting", "Astrogation", "Engineering", "Combat", "Repair"],
    levels: &["Cadet", "Pilot", "Officer", "Commander"],
};

const PIRATE: Taxonomy = Taxonomy {
    skills: &["Swordsmanship", "Navigation", "Intimidation", "Treasure Hunting"],
    levels: &["Deckhand", "Buccaneer", "First Mate", "Captain"],
};

// Also used for any category value the taxonomy does not know.
const DEFAULT: Taxonomy = Taxonomy {
    skills: &["Communication", "Leadership", "Problem Solving", "Teamwork"],
    levels: &["Novice", "Intermediate", "Adept", "Expert"],
};

/// Classification of a crewmate. Values read from the store that match none of
/// the known names are kept verbatim in `Other` so they are never rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    #[default]
    Dev,
    Space,
    Pirate,
    Default,
    Other(String),
}

impl Category {
    pub const KNOWN: [Category; 4] = [
        Category::Dev,
        Category::Space,
        Category::Pirate,
        Category::Default,
    ];

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Dev => "Dev",
            Self::Space => "Space",
            Self::Pirate => "Pirate",
            Self::Default => "Default",
            Self::Other(raw) => raw,
        }
    }

    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Taxonomy used for rendering and editing. Unknown categories use the
    /// `Default` entry.
    #[must_use]
    pub fn taxonomy(&self) -> &'static Taxonomy {
        match self {
            Self::Dev => &DEV,
            Self::Space => &SPACE,
            Self::Pirate => &PIRATE,
            Self::Default | Self::Other(_) => &DEFAULT,
        }
    }

    /// Name for display; a blank stored value reads as "Uncategorized".
    #[must_use]
    pub fn label(&self) -> &str {
        let raw = self.as_str();
        if raw.trim().is_empty() {
            "Uncategorized"
        } else {
            raw
        }
    }

    /// Case-insensitive lookup of a known category name.
    #[must_use]
    pub fn parse_known(s: &str) -> Option<Self> {
        Self::KNOWN
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Dev" => Self::Dev,
            "Space" => Self::Space,
            "Pirate" => Self::Pirate,
            "Default" => Self::Default,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self {
        match c {
            Category::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
