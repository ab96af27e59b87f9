//! Post dates: LinkedIn relative ages, filename hints, calendar dates.

use super::html::Document;
use super::select::Selector;
use chrono::NaiveDate;
use regex::Regex;
use std::{fmt, sync::LazyLock};

/// `5mo •`, `3w`, `2d`, `1yr`, `4h`, `10m`
static COMPACT_AGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d+)\s?(mo|yr|y|w|d|h|m)\b").unwrap());

/// `5 months ago`, `a week ago`, `1 year ago`
static LONG_AGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+|an?|one)\s+(minute|hour|day|week|month|year)s?\s+ago\b").unwrap()
});

/// `5-months-ago-post-3`
static FILENAME_AGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d+)-(minute|hour|day|week|month|year)s?-ago\b").unwrap()
});

/// `2025-09-26-1`
static FILENAME_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2})(?:[-_.]|$)").unwrap());

static ACTOR_SUB_DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".update-components-actor__sub-description").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AgeUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl AgeUnit {
    fn from_compact(unit: &str) -> Option<Self> {
        Some(match unit.to_ascii_lowercase().as_str() {
            "m" => Self::Minute,
            "h" => Self::Hour,
            "d" => Self::Day,
            "w" => Self::Week,
            "mo" => Self::Month,
            "y" | "yr" => Self::Year,
            _ => return None,
        })
    }

    fn from_word(unit: &str) -> Option<Self> {
        Some(match unit.to_ascii_lowercase().trim_end_matches('s') {
            "minute" => Self::Minute,
            "hour" => Self::Hour,
            "day" => Self::Day,
            "week" => Self::Week,
            "month" => Self::Month,
            "year" => Self::Year,
            _ => return None,
        })
    }

    const fn word(self) -> &'static str {
        match self {
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// Whole days per unit; sub-day units count as zero.
    const fn days(self) -> i64 {
        match self {
            Self::Minute | Self::Hour => 0,
            Self::Day => 1,
            Self::Week => 7,
            Self::Month => 30,
            Self::Year => 365,
        }
    }
}

/// Age of a post relative to when it was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostAge {
    pub amount: u32,
    pub unit: AgeUnit,
}

impl PostAge {
    pub const fn new(amount: u32, unit: AgeUnit) -> Self {
        Self { amount, unit }
    }

    /// Approximate age in days, used for ordering.
    pub const fn approx_days(&self) -> i64 {
        self.amount as i64 * self.unit.days()
    }

    /// Finer ordering inside the same day: minutes before hours.
    const fn approx_minutes(&self) -> i64 {
        match self.unit {
            AgeUnit::Minute => self.amount as i64,
            AgeUnit::Hour => self.amount as i64 * 60,
            _ => self.approx_days() * 24 * 60,
        }
    }
}

impl fmt::Display for PostAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = if self.amount == 1 { "" } else { "s" };
        write!(f, "{} {}{} ago", self.amount, self.unit.word(), plural)
    }
}

/// Where a post sits in time, as far as the capture tells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostDate {
    Relative(PostAge),
    Calendar(NaiveDate),
    Unknown,
}

impl PostDate {
    /// Label shown on the card.
    pub fn label(&self) -> String {
        match self {
            Self::Relative(age) => age.to_string(),
            Self::Calendar(date) => date.format("%b %-d, %Y").to_string(),
            Self::Unknown => "unknown".to_owned(),
        }
    }

    /// Age in minutes as of `today`; `None` when unknown.
    pub fn sort_key(&self, today: NaiveDate) -> Option<i64> {
        match self {
            Self::Relative(age) => Some(age.approx_minutes()),
            Self::Calendar(date) => Some((today - *date).num_days() * 24 * 60),
            Self::Unknown => None,
        }
    }
}

/// Parse a relative age, accepting compact and long forms.
pub fn parse_relative(text: &str) -> Option<PostAge> {
    parse_long(text).or_else(|| parse_compact(text))
}

/// Long form only: "5 months ago", "a week ago".
pub fn parse_long(text: &str) -> Option<PostAge> {
    let caps = LONG_AGE.captures(text)?;
    let amount = match caps[1].to_ascii_lowercase().as_str() {
        "a" | "an" | "one" => 1,
        digits => digits.parse().ok()?,
    };
    Some(PostAge::new(amount, AgeUnit::from_word(&caps[2])?))
}

fn parse_compact(text: &str) -> Option<PostAge> {
    let caps = COMPACT_AGE.captures(text)?;
    let amount = caps[1].parse().ok()?;
    Some(PostAge::new(amount, AgeUnit::from_compact(&caps[2])?))
}

/// Age shown in the capture itself.
///
/// Compact forms like `5mo` are only trusted inside the actor
/// sub-description; elsewhere they collide with ordinary text ("3d printing").
pub fn extract_age(doc: &Document) -> Option<PostAge> {
    doc.select_all(&ACTOR_SUB_DESCRIPTION)
        .find_map(|el| parse_relative(&el.text_content()))
        .or_else(|| parse_long(&doc.text_content()))
}

/// Date encoded in a capture's file name.
///
/// - `5-months-ago-post-3.html` → relative age
/// - `2025-09-26-1.html` → calendar date
pub fn hint_from_filename(name: &str) -> Option<PostDate> {
    if let Some(caps) = FILENAME_AGE.captures(name) {
        let amount = caps[1].parse().ok()?;
        let unit = AgeUnit::from_word(&caps[2])?;
        return Some(PostDate::Relative(PostAge::new(amount, unit)));
    }
    let caps = FILENAME_DATE.captures(name)?;
    NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d")
        .ok()
        .map(PostDate::Calendar)
}
