//! Frame table and frame/time arithmetic for the background video.
//!
//! Frames are 1-indexed: frame `f` is shown at `(f - 1) / fps` seconds.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Frame rates outside this open interval are treated as bogus metadata.
const FPS_BOUNDS: (f64, f64) = (1.0, 120.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameMode {
    /// Ping-pong between the range ends while the section is in view.
    Loop,
    /// Follow scroll position through the range.
    Scrub,
}

impl FrameMode {
    /// `data-vs-mode` value; a missing attribute means loop.
    pub fn from_attr(attr: Option<&str>) -> Option<Self> {
        match attr.map(str::trim) {
            None | Some("loop") => Some(Self::Loop),
            Some("scrub") => Some(Self::Scrub),
            Some(_) => None,
        }
    }
}

impl fmt::Display for FrameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Loop => "loop",
            Self::Scrub => "scrub",
        })
    }
}

/// Named, inclusive span of frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameRange {
    pub name: String,
    pub start_frame: u32,
    pub end_frame: u32,
    pub mode: FrameMode,
}

impl FrameRange {
    pub fn new(name: impl Into<String>, start_frame: u32, end_frame: u32, mode: FrameMode) -> Self {
        Self {
            name: name.into(),
            start_frame,
            end_frame,
            mode,
        }
    }

    pub fn start_time(&self, fps: f64) -> f64 {
        frame_to_time(self.start_frame, fps)
    }

    pub fn end_time(&self, fps: f64) -> f64 {
        frame_to_time(self.end_frame, fps)
    }

    /// Number of frames, both ends included.
    pub const fn len(&self) -> u32 {
        self.end_frame.saturating_sub(self.start_frame) + 1
    }

    pub const fn contains(&self, frame: u32) -> bool {
        self.start_frame <= frame && frame <= self.end_frame
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameTableError {
    #[error("frame table is empty")]
    Empty,

    #[error("range `{name}` is inverted or starts at 0 ({start}..={end})")]
    InvalidRange { name: String, start: u32, end: u32 },

    #[error("first range `{name}` starts at frame {start}, expected 1")]
    NotFromOne { name: String, start: u32 },

    #[error("range `{name}` starts at frame {found}, expected {expected}")]
    NotContiguous {
        name: String,
        expected: u32,
        found: u32,
    },

    #[error("last range ends at frame {end}, but the video has {total} frames")]
    WrongEnd { end: u32, total: u32 },
}

/// The video's timeline: contiguous ranges covering every frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameTable {
    total_frames: u32,
    ranges: Vec<FrameRange>,
}

impl FrameTable {
    pub fn new(total_frames: u32, ranges: Vec<FrameRange>) -> Self {
        Self {
            total_frames,
            ranges,
        }
    }

    /// The site's timeline, checked against a video of `total_frames` frames.
    pub fn default_site(total_frames: u32) -> Self {
        use FrameMode::{Loop, Scrub};
        const SITE: [(&str, u32, u32, FrameMode); 12] = [
            ("opening", 1, 48, Scrub),
            ("intro", 49, 198, Loop),
            ("intro-scrub", 199, 249, Scrub),
            ("about", 250, 399, Loop),
            ("about-scrub", 400, 450, Scrub),
            ("projects", 451, 600, Loop),
            ("projects-scrub", 601, 649, Scrub),
            ("posts", 650, 799, Loop),
            ("posts-scrub", 800, 848, Scrub),
            ("events", 849, 998, Loop),
            ("events-scrub", 999, 1049, Scrub),
            ("contact", 1050, 1199, Loop),
        ];

        let ranges = SITE
            .iter()
            .map(|&(name, start, end, mode)| FrameRange::new(name, start, end, mode))
            .collect();
        Self::new(total_frames, ranges)
    }

    pub fn validate(&self) -> Result<(), FrameTableError> {
        let first = self.ranges.first().ok_or(FrameTableError::Empty)?;
        if first.start_frame != 1 {
            return Err(FrameTableError::NotFromOne {
                name: first.name.clone(),
                start: first.start_frame,
            });
        }

        let mut previous_end = 0;
        for range in &self.ranges {
            if range.start_frame == 0 || range.start_frame > range.end_frame {
                return Err(FrameTableError::InvalidRange {
                    name: range.name.clone(),
                    start: range.start_frame,
                    end: range.end_frame,
                });
            }
            if range.start_frame != previous_end + 1 {
                return Err(FrameTableError::NotContiguous {
                    name: range.name.clone(),
                    expected: previous_end + 1,
                    found: range.start_frame,
                });
            }
            previous_end = range.end_frame;
        }

        if previous_end != self.total_frames {
            return Err(FrameTableError::WrongEnd {
                end: previous_end,
                total: self.total_frames,
            });
        }
        Ok(())
    }

    pub const fn total_frames(&self) -> u32 {
        self.total_frames
    }

    pub fn ranges(&self) -> &[FrameRange] {
        &self.ranges
    }

    pub fn get(&self, name: &str) -> Option<&FrameRange> {
        self.ranges.iter().find(|range| range.name == name)
    }

    /// One-shot range played on load.
    pub fn opening(&self) -> Option<&FrameRange> {
        self.get("opening").or_else(|| self.ranges.first())
    }

    /// First loop after the opening.
    pub fn intro(&self) -> Option<&FrameRange> {
        let opening_end = self.opening().map_or(0, |r| r.end_frame);
        self.ranges
            .iter()
            .find(|range| range.mode == FrameMode::Loop && range.start_frame > opening_end)
    }
}

/// Seconds at which `frame` is shown. Frame 0 is treated as frame 1.
#[inline]
pub fn frame_to_time(frame: u32, fps: f64) -> f64 {
    f64::from(frame.saturating_sub(1)) / fps
}

/// Frame shown at `time` seconds (nearest frame).
#[inline]
pub fn time_to_frame(time: f64, fps: f64) -> u32 {
    ((time.max(0.0) * fps).round() as u32).saturating_add(1)
}

/// Frame rate from frame count and duration, or `fallback` when the
/// duration is missing or implausible.
pub fn estimate_fps(total_frames: u32, duration: Option<f64>, fallback: f64) -> f64 {
    let Some(duration) = duration else {
        return fallback;
    };
    let fps = f64::from(total_frames) / duration;
    if fps.is_finite() && fps > FPS_BOUNDS.0 && fps < FPS_BOUNDS.1 {
        fps
    } else {
        fallback
    }
}

/// Progress (0..=1) of the viewport centre through a section.
///
/// A zero-height section counts as fully scrolled.
pub fn scrub_progress(viewport_center: f64, section_top: f64, section_height: f64) -> f64 {
    if section_height <= 0.0 {
        return 1.0;
    }
    ((viewport_center - section_top) / section_height).clamp(0.0, 1.0)
}

/// Frame for a scrub `progress` through `range`.
pub fn scrub_target_frame(range: &FrameRange, progress: f64) -> u32 {
    let start = f64::from(range.start_frame);
    let end = f64::from(range.end_frame);
    (start + (end - start) * progress.clamp(0.0, 1.0)).round() as u32
}
