//! Gallery filtering: category chips, typed tag filters and year order.

use super::Project;
use anyhow::{Result, bail};
use serde::Serialize;
use std::{collections::BTreeSet, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Problem,
    Ui,
    Frontend,
}

impl Category {
    pub const ALL: [Self; 3] = [Self::Problem, Self::Ui, Self::Frontend];

    pub const fn key(self) -> &'static str {
        match self {
            Self::Problem => "problem",
            Self::Ui => "ui",
            Self::Frontend => "frontend",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Problem => "Problem Solving & Research",
            Self::Ui => "UI Design & Prototypes",
            Self::Frontend => "Frontend Development",
        }
    }

    /// Lowercased project tags that place a project in this category.
    pub const fn match_tags(self) -> &'static [&'static str] {
        match self {
            Self::Problem => &["problem", "research", "ux-research", "user-research"],
            Self::Ui => &["ui design", "ui", "design"],
            Self::Frontend => &["frontend", "javascript", "js", "css", "html"],
        }
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase();
        match Self::ALL.into_iter().find(|c| c.key() == key) {
            Some(category) => Ok(category),
            None => bail!("unknown category `{s}` (expected problem, ui or frontend)"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

impl SortOrder {
    pub const fn toggled(self) -> Self {
        match self {
            Self::Newest => Self::Oldest,
            Self::Oldest => Self::Newest,
        }
    }
}

impl FromStr for SortOrder {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newest" | "new" | "desc" => Ok(Self::Newest),
            "oldest" | "old" | "asc" => Ok(Self::Oldest),
            _ => bail!("unknown order `{s}` (expected newest or oldest)"),
        }
    }
}

/// Current gallery selection. An empty filter shows everything, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GalleryFilter {
    pub categories: BTreeSet<Category>,
    /// Lowercased; every one must be present on a project.
    pub tags: Vec<String>,
    pub order: SortOrder,
}

impl GalleryFilter {
    /// Chip click: add or remove a category.
    pub fn toggle_category(&mut self, category: Category) {
        if !self.categories.remove(&category) {
            self.categories.insert(category);
        }
    }

    /// Typed tag: trimmed, lowercased, deduplicated. Blank input is ignored.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() || self.tags.contains(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    pub fn remove_tag(&mut self, tag: &str) {
        let tag = tag.trim().to_lowercase();
        self.tags.retain(|t| *t != tag);
    }

    pub fn matches(&self, project: &Project) -> bool {
        let tags: Vec<String> = project.normalized_tags().collect();

        let in_category = self.categories.is_empty()
            || self
                .categories
                .iter()
                .flat_map(|c| c.match_tags())
                .any(|wanted| tags.iter().any(|t| t == wanted));

        in_category && self.tags.iter().all(|wanted| tags.contains(wanted))
    }

    /// Matching projects in the selected year order (stable for equal years).
    pub fn apply<'a>(&self, projects: &'a [Project]) -> Vec<&'a Project> {
        let mut out: Vec<&Project> = projects.iter().filter(|p| self.matches(p)).collect();
        match self.order {
            SortOrder::Newest => out.sort_by_key(|p| std::cmp::Reverse(p.year_value())),
            SortOrder::Oldest => out.sort_by_key(|p| p.year_value()),
        }
        out
    }
}
