//! Project catalogue loaded from `projects/<slug>/`.
//!
//! ```text
//! projects/
//! ├── electrician-app/
//! │   ├── metadata.json      # optional
//! │   ├── Electrician4.png
//! │   └── flow.svg
//! └── ...
//! ```

pub mod cover;
pub mod gallery;
pub mod section;

pub use gallery::{Category, GalleryFilter, SortOrder};
pub use section::Section;

use crate::{log, utils::path::url_for};
use cover::{Match, resolve_image};
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use walkdir::WalkDir;

pub const METADATA_FILE: &str = "metadata.json";

/// Image extensions picked up from a project folder.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "svg", "webp"];

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("cannot read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid {path}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// `year` as written in metadata: `2024` or `"2024"` (or `"2023-2024"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Year {
    Number(i64),
    Text(String),
}

impl Year {
    /// Numeric value for sorting; leading digits of text, else 0.
    pub fn value(&self) -> i64 {
        match self {
            Self::Number(n) => *n,
            Self::Text(text) => {
                let digits: String = text
                    .trim()
                    .chars()
                    .take_while(char::is_ascii_digit)
                    .collect();
                digits.parse().unwrap_or(0)
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct Metadata {
    title: Option<String>,
    year: Option<Year>,
    description: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    cover: Option<String>,
    hero: Option<String>,
    #[serde(default)]
    sections: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Project {
    /// Folder name.
    pub slug: String,
    pub title: String,
    pub year: Option<Year>,
    pub description: String,
    pub tags: Vec<String>,
    /// Always one of `images`.
    pub cover: Option<String>,
    pub images: Vec<String>,
    pub sections: Vec<Section>,
}

impl Project {
    pub fn year_value(&self) -> i64 {
        self.year.as_ref().map_or(0, Year::value)
    }

    /// Lowercased tags.
    pub fn normalized_tags(&self) -> impl Iterator<Item = String> + '_ {
        self.tags.iter().map(|t| t.trim().to_lowercase())
    }
}

/// Load every project folder under `dir`, newest first.
///
/// `url_prefix` is the public path the folder is served under
/// (`/projects`). A folder that fails to load is logged and skipped.
pub fn load_projects(dir: &Path, url_prefix: &str) -> Vec<Project> {
    let folders = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_dir());

    let mut projects: Vec<Project> = folders
        .filter_map(|entry| {
            let slug = entry.file_name().to_str()?.to_owned();
            if slug.starts_with('.') {
                return None;
            }
            match load_project(entry.path(), &slug, url_prefix) {
                Ok(project) => project,
                Err(err) => {
                    log!("projects"; "skipped {}: {:#}", slug, anyhow::Error::from(err));
                    None
                }
            }
        })
        .collect();

    projects.sort_by(|a, b| {
        b.year_value()
            .cmp(&a.year_value())
            .then_with(|| a.slug.cmp(&b.slug))
    });
    projects
}

/// Load one folder. `Ok(None)` for a folder with neither metadata nor images.
pub fn load_project(folder: &Path, slug: &str, url_prefix: &str) -> Result<Option<Project>, ProjectError> {
    let images = image_urls(folder, slug, url_prefix);

    let metadata_path = folder.join(METADATA_FILE);
    let metadata = if metadata_path.is_file() {
        let content = fs::read_to_string(&metadata_path).map_err(|source| ProjectError::Io {
            path: metadata_path.clone(),
            source,
        })?;
        serde_json::from_str::<Metadata>(&content).map_err(|source| ProjectError::Metadata {
            path: metadata_path,
            source,
        })?
    } else if images.is_empty() {
        return Ok(None);
    } else {
        Metadata::default()
    };

    let cover_name = metadata.cover.as_deref().or(metadata.hero.as_deref());
    let cover = resolve_image(&images, cover_name, Match::Loose).map(str::to_owned);
    let sections = metadata
        .sections
        .into_iter()
        .filter_map(|value| Section::from_value(value, &images))
        .collect();

    Ok(Some(Project {
        slug: slug.to_owned(),
        title: metadata.title.unwrap_or_else(|| slug.to_owned()),
        year: metadata.year,
        description: metadata.description.unwrap_or_default(),
        tags: metadata.tags,
        cover,
        images,
        sections,
    }))
}

/// Public URLs of the images directly inside `folder`, sorted by file name.
fn image_urls(folder: &Path, slug: &str, url_prefix: &str) -> Vec<String> {
    WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let name = entry.file_name().to_str()?;
            let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
            IMAGE_EXTENSIONS
                .contains(&ext.as_str())
                .then(|| url_for(url_prefix, &[slug, name]))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_year_value() {
        assert_eq!(Year::Number(2024).value(), 2024);
        assert_eq!(Year::Text("2023".into()).value(), 2023);
        assert_eq!(Year::Text(" 2022-2023".into()).value(), 2022);
        assert_eq!(Year::Text("soon".into()).value(), 0);
    }

    #[test]
    fn test_load_projects() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        write(
            root,
            "electrician/metadata.json",
            r#"{ "title": "Electrician App", "year": 2024, "tags": ["UI", "frontend"],
                 "cover": "Electrician4.png", "description": "Booking flow" }"#,
        );
        write(root, "electrician/a.png", "");
        write(root, "electrician/Electrician4.png", "");
        write(root, "electrician/notes.txt", "");

        write(root, "research/metadata.json", r#"{ "title": "Research", "year": "2022" }"#);
        write(root, "images-only/My Shot.jpg", "");
        write(root, "empty/readme.md", "");

        let projects = load_projects(root, "/projects");
        let slugs: Vec<_> = projects.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["electrician", "research", "images-only"]);

        let electrician = &projects[0];
        assert_eq!(electrician.title, "Electrician App");
        assert_eq!(
            electrician.images,
            vec![
                "/projects/electrician/Electrician4.png",
                "/projects/electrician/a.png"
            ]
        );
        assert_eq!(
            electrician.cover.as_deref(),
            Some("/projects/electrician/Electrician4.png")
        );

        let research = &projects[1];
        assert!(research.images.is_empty());
        assert_eq!(research.cover, None);

        let images_only = &projects[2];
        assert_eq!(images_only.title, "images-only");
        assert_eq!(
            images_only.cover.as_deref(),
            Some("/projects/images-only/My%20Shot.jpg")
        );
    }

    #[test]
    fn test_broken_metadata_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "bad/metadata.json", "{ not json");
        write(dir.path(), "good/metadata.json", r#"{ "title": "Good" }"#);

        let projects = load_projects(dir.path(), "/projects");
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].slug, "good");

        let err = load_project(&dir.path().join("bad"), "bad", "/projects").unwrap_err();
        assert!(matches!(err, ProjectError::Metadata { .. }));
    }

    #[test]
    fn test_hero_used_when_no_cover() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "p/metadata.json", r#"{ "hero": "wide" }"#);
        write(dir.path(), "p/a.png", "");
        write(dir.path(), "p/wide-shot.png", "");

        let project = load_project(&dir.path().join("p"), "p", "/projects")
            .unwrap()
            .unwrap();
        assert_eq!(project.cover.as_deref(), Some("/projects/p/wide-shot.png"));
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_projects(&dir.path().join("nope"), "/projects").is_empty());
    }
}
