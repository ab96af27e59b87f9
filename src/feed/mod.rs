//! Post ingestion from saved LinkedIn captures.
//!
//! Each `*.html` file in the posts folder is one captured post. A capture
//! becomes a [`Post`] when it has enough body text; the image and date are
//! best effort.

pub mod date;
pub mod extract;
pub mod html;
pub mod select;
mod store;

pub use store::PostStore;

use crate::{
    config::FeedConfig,
    log,
    utils::text::{char_len, ellipsize},
};
use chrono::NaiveDate;
use date::PostDate;
use html::Document;
use rayon::prelude::*;
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Title shared by every ingested post.
pub const POST_TITLE: &str = "LinkedIn Post";

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed markup at byte {position}: {message}")]
    Markup { position: u64, message: String },

    #[error("no post text longer than {min_chars} characters")]
    NoContent { min_chars: usize },
}

/// One post card.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// File stem of the capture.
    pub id: String,
    pub title: String,
    /// Card text, cut to `max_text_chars`.
    pub text: String,
    pub image: Option<String>,
    /// Display label: "5 months ago", "Sep 26, 2025" or "unknown".
    pub date: String,
    /// Untruncated text for the detail view.
    pub full_text: String,
    #[serde(skip)]
    pub dated: PostDate,
}

/// Build a post from one capture.
pub fn parse_post(html: &str, filename: &str, config: &FeedConfig) -> Result<Post, ParseError> {
    let doc = Document::parse(html)?;

    let full_text = extract::extract_text(&doc, config.min_text_chars).ok_or(
        ParseError::NoContent {
            min_chars: config.min_text_chars,
        },
    )?;
    let text = ellipsize(&full_text, config.max_text_chars);
    let image = extract::extract_image(&doc);

    let dated = date::extract_age(&doc)
        .map(PostDate::Relative)
        .or_else(|| date::hint_from_filename(filename))
        .unwrap_or(PostDate::Unknown);

    Ok(Post {
        id: post_id(filename),
        title: POST_TITLE.to_owned(),
        text,
        image,
        date: dated.label(),
        full_text,
        dated,
    })
}

fn post_id(filename: &str) -> String {
    filename
        .strip_suffix(".html")
        .unwrap_or(filename)
        .to_owned()
}

/// Capture files in `dir`, skipping scraper leftovers.
fn capture_files(dir: &Path, skip_marker: &str) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| {
                    name.ends_with(".html") && (skip_marker.is_empty() || !name.contains(skip_marker))
                })
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Parse every capture in `dir`, newest first.
///
/// A file that fails to read or parse is logged and left out. A missing
/// folder gives an empty list.
pub fn load_posts(dir: &Path, config: &FeedConfig, today: NaiveDate) -> Vec<Post> {
    let files = match capture_files(dir, &config.skip_marker) {
        Ok(files) => files,
        Err(err) => {
            if dir.exists() {
                log!("feed"; "cannot read {}: {}", dir.display(), err);
            }
            return Vec::new();
        }
    };

    let mut posts: Vec<Post> = files
        .par_iter()
        .filter_map(|path| {
            let filename = path.file_name()?.to_str()?;
            let result = fs::read_to_string(path)
                .map_err(|err| err.to_string())
                .and_then(|html| parse_post(&html, filename, config).map_err(|err| err.to_string()));
            match result {
                Ok(post) => Some(post),
                Err(err) => {
                    log!("feed"; "skipped {}: {}", filename, err);
                    None
                }
            }
        })
        .collect();

    sort_newest_first(&mut posts, today);
    posts
}

/// Newest first; unknown dates last; ties by id.
pub fn sort_newest_first(posts: &mut [Post], today: NaiveDate) {
    posts.sort_by(|a, b| {
        let (ka, kb) = (a.dated.sort_key(today), b.dated.sort_key(today));
        match (ka, kb) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }
        .then_with(|| a.id.cmp(&b.id))
    });
}

/// Demo posts shown when nothing could be ingested.
pub fn placeholder_posts() -> Vec<Post> {
    const DEMO: [(&str, &str, u32); 3] = [
        (
            "placeholder-1",
            "Wrapped up a new case study on designing calm, scroll-driven interfaces. \
             The full write-up is in the projects section.",
            2,
        ),
        (
            "placeholder-2",
            "Spent the week prototyping a gallery with tag filters and keyboard \
             navigation. Small details, big difference in how it feels.",
            5,
        ),
        (
            "placeholder-3",
            "Sharing a few notes from a frontend meetup: performance budgets, \
             accessible carousels and why motion should always be optional.",
            9,
        ),
    ];

    DEMO.iter()
        .map(|&(id, text, weeks)| {
            let dated = PostDate::Relative(date::PostAge::new(weeks, date::AgeUnit::Week));
            Post {
                id: id.to_owned(),
                title: POST_TITLE.to_owned(),
                text: text.to_owned(),
                image: None,
                date: dated.label(),
                full_text: text.to_owned(),
                dated,
            }
        })
        .collect()
}

/// [`load_posts`], falling back to [`placeholder_posts`] when enabled and
/// nothing was ingested.
pub fn load_posts_or_placeholders(dir: &Path, config: &FeedConfig, today: NaiveDate) -> Vec<Post> {
    let posts = load_posts(dir, config, today);
    if posts.is_empty() && config.placeholders {
        log!("feed"; "no posts in {}, using placeholders", dir.display());
        return placeholder_posts();
    }
    posts
}

/// One-line summary used by the `posts` command.
pub fn summarize(post: &Post) -> String {
    let marker = if post.image.is_some() { "img" } else { "---" };
    let preview = ellipsize(&post.text, 60);
    format!(
        "{:<28} {:<14} {} {:>4}c  {}",
        post.id,
        post.date,
        marker,
        char_len(&post.full_text),
        preview
    )
}
