//! Section markup contract of the built page.
//!
//! ```html
//! <section data-vs-section="intro-scrub" data-vs-mode="scrub" data-vs-ranges="[199,249]">
//! ```
//!
//! A section with an unknown mode or unreadable ranges is kept with no
//! range, so indices stay aligned with the page, and the controller skips it.

use super::frames::{FrameMode, FrameRange, FrameTable};
use crate::feed::{html::Document, select::Selector};
use std::sync::LazyLock;

static SECTIONS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[data-vs-section]").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSpec {
    pub key: String,
    /// `None` when the markup is malformed.
    pub range: Option<FrameRange>,
}

impl SectionSpec {
    pub fn parse(key: &str, mode_attr: Option<&str>, ranges_attr: Option<&str>) -> Self {
        let range = FrameMode::from_attr(mode_attr).and_then(|mode| {
            let (start, end) = parse_ranges(ranges_attr?)?;
            Some(FrameRange::new(key, start, end, mode))
        });
        Self {
            key: key.to_owned(),
            range,
        }
    }

    pub fn mode(&self) -> Option<FrameMode> {
        self.range.as_ref().map(|r| r.mode)
    }
}

/// `[start, end]` with `1 <= start <= end`.
fn parse_ranges(attr: &str) -> Option<(u32, u32)> {
    let [start, end]: [u32; 2] = serde_json::from_str(attr).ok()?;
    (start >= 1 && start <= end).then_some((start, end))
}

/// Every `[data-vs-section]` element, in page order.
pub fn scan_sections(doc: &Document) -> Vec<SectionSpec> {
    doc.select_all(&SECTIONS)
        .map(|el| {
            SectionSpec::parse(
                el.attr("data-vs-section").unwrap_or_default(),
                el.attr("data-vs-mode"),
                el.attr("data-vs-ranges"),
            )
        })
        .collect()
}

/// Differences between the page's sections and the frame table.
pub fn audit_sections(table: &FrameTable, sections: &[SectionSpec]) -> Vec<String> {
    let mut problems = Vec::new();
    for section in sections {
        let Some(range) = &section.range else {
            problems.push(format!(
                "section `{}` has malformed data-vs-mode/data-vs-ranges",
                section.key
            ));
            continue;
        };
        match table.get(&section.key) {
            None => problems.push(format!("section `{}` is not in the frame table", section.key)),
            Some(expected)
                if (expected.start_frame, expected.end_frame, expected.mode)
                    != (range.start_frame, range.end_frame, range.mode) =>
            {
                problems.push(format!(
                    "section `{}` is {} {}..={}, frame table says {} {}..={}",
                    section.key,
                    range.mode,
                    range.start_frame,
                    range.end_frame,
                    expected.mode,
                    expected.start_frame,
                    expected.end_frame
                ));
            }
            Some(_) => {}
        }
    }
    problems
}
