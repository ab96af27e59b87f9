//! Resolve an image file name from metadata to one of a project's image URLs.

use crate::utils::text::strip_extension;
use std::borrow::Cow;

/// How forgiving the basename comparison is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Match {
    /// Basename equal, prefix or substring (covers and heroes).
    Loose,
    /// Basename equal only (slides and carousel images).
    Exact,
}

/// Pick the image `name` refers to, falling back to the first image.
///
/// Tried in order: decoded file name equals `name`, URL contains `name`,
/// decoded URL contains `name`, basename (without extension) match per
/// `mode`, first image.
pub fn resolve_image<'a>(images: &'a [String], name: Option<&str>, mode: Match) -> Option<&'a str> {
    let first = images.first().map(String::as_str);
    let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
        return first;
    };

    let found = images
        .iter()
        .find(|url| file_name(url) == name)
        .or_else(|| images.iter().find(|url| url.contains(name)))
        .or_else(|| images.iter().find(|url| decode(url).contains(name)))
        .or_else(|| {
            let wanted = strip_extension(name);
            images.iter().find(|url| {
                let file = file_name(url);
                let base = strip_extension(&file);
                match mode {
                    Match::Exact => base == wanted,
                    Match::Loose => base == wanted || base.starts_with(wanted) || base.contains(wanted),
                }
            })
        });

    found.map(String::as_str).or(first)
}

/// Last path segment of `url`, percent-decoded.
fn file_name(url: &str) -> Cow<'_, str> {
    decode(url.rsplit('/').next().unwrap_or(url))
}

fn decode(url: &str) -> Cow<'_, str> {
    urlencoding::decode(url).unwrap_or(Cow::Borrowed(url))
}
