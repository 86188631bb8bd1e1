use std::fmt;
use std::str::FromStr;

use crate::types::{Category, CrewMember};

/// Category selection for the listing, including the "All" sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    /// Filter chips in display order.
    #[must_use]
    pub fn choices() -> Vec<CategoryFilter> {
        std::iter::once(Self::All)
            .chain(Category::KNOWN.into_iter().map(Self::Only))
            .collect()
    }

    #[must_use]
    pub fn matches(&self, category: &Category) -> bool {
        match self {
            Self::All => true,
            Self::Only(selected) => selected == category,
        }
    }

    #[must_use]
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("All"),
            Self::Only(category) => write!(f, "{category}"),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        Ok(Self::Only(
            Category::parse_known(s).unwrap_or_else(|| Category::from(s)),
        ))
    }
}

/// Case-insensitive substring match on the name. An empty query matches.
#[must_use]
pub fn matches_search(member: &CrewMember, query: &str) -> bool {
    member.name.to_lowercase().contains(&query.to_lowercase())
}

/// Members passing both the search and the category predicate, in their
/// original order.
#[must_use]
pub fn filter_members<'a>(
    members: &'a [CrewMember],
    query: &str,
    category: &CategoryFilter,
) -> Vec<&'a CrewMember> {
    members
        .iter()
        .filter(|m| matches_search(m, query) && category.matches(&m.category))
        .collect()
}
