//! Searching, filtering and ordering the quiz list.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::models::{Difficulty, Quiz};

/// Order of the filtered quiz list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Hardest first.
    #[default]
    Difficulty,
    Title,
    /// Shortest time limit first.
    Shortest,
    /// Most recently created (highest id) first.
    Newest,
}

impl SortOrder {
    pub const ALL: [SortOrder; 4] = [
        SortOrder::Difficulty,
        SortOrder::Title,
        SortOrder::Shortest,
        SortOrder::Newest,
    ];

    /// The following order, wrapping around.
    pub fn cycle(self) -> Self {
        let index = Self::ALL.iter().position(|o| *o == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SortOrder::Difficulty => "difficulty",
            SortOrder::Title => "title",
            SortOrder::Shortest => "shortest",
            SortOrder::Newest => "newest",
        };
        f.pad(label)
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortOrder::ALL
            .into_iter()
            .find(|o| o.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown sort order: {}", s))
    }
}

/// Search text plus category/difficulty filters and an order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    pub search: String,
    pub category: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub sort: SortOrder,
}

impl CatalogFilter {
    /// Case-insensitive search over title, description and category.
    pub fn matches(&self, quiz: &Quiz) -> bool {
        let needle = self.search.trim().to_lowercase();
        let found = needle.is_empty()
            || [&quiz.title, &quiz.description, &quiz.category]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));

        found
            && self
                .category
                .as_ref()
                .is_none_or(|category| quiz.category == *category)
            && self
                .difficulty
                .is_none_or(|difficulty| quiz.difficulty == difficulty)
    }

    pub fn apply<'a>(&self, quizzes: &'a [Quiz]) -> Vec<&'a Quiz> {
        let mut selected: Vec<&Quiz> = quizzes.iter().filter(|q| self.matches(q)).collect();
        match self.sort {
            SortOrder::Difficulty => selected.sort_by_key(|q| Reverse(q.difficulty.rank())),
            SortOrder::Title => selected.sort_by_key(|q| q.title.to_lowercase()),
            SortOrder::Shortest => selected.sort_by_key(|q| q.time_limit),
            SortOrder::Newest => selected.sort_by_key(|q| Reverse(q.id)),
        }
        selected
    }

    /// Step the category filter through `None` and each known category.
    pub fn cycle_category(&mut self, categories: &[CategorySummary]) {
        let position = self
            .category
            .as_ref()
            .and_then(|current| categories.iter().position(|c| c.name == *current));
        self.category = match position {
            None => categories.first().map(|c| c.name.clone()),
            Some(i) => categories.get(i + 1).map(|c| c.name.clone()),
        };
    }

    /// Step the difficulty filter through `None`, Easy, Medium, Hard.
    pub fn cycle_difficulty(&mut self) {
        self.difficulty = match self.difficulty {
            None => Some(Difficulty::Easy),
            Some(Difficulty::Easy) => Some(Difficulty::Medium),
            Some(Difficulty::Medium) => Some(Difficulty::Hard),
            Some(Difficulty::Hard) => None,
        };
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySummary {
    pub name: String,
    pub quizzes: usize,
}

/// Distinct categories with their quiz counts, alphabetically.
pub fn categories(quizzes: &[Quiz]) -> Vec<CategorySummary> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for quiz in quizzes {
        *counts.entry(quiz.category.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(name, quizzes)| CategorySummary {
            name: name.to_string(),
            quizzes,
        })
        .collect()
}
