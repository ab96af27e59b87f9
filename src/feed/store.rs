//! Cached post list for the server.
//!
//! Parsing every capture on each request is wasteful, so the parsed list and
//! its JSON are kept until the posts folder changes. A change is detected by
//! fingerprinting file names, sizes and modification times.

use super::{Post, load_posts_or_placeholders};
use crate::config::FeedConfig;
use parking_lot::RwLock;
use std::{
    collections::hash_map::DefaultHasher,
    fs,
    hash::{Hash, Hasher},
    path::{Path, PathBuf},
    sync::Arc,
    time::UNIX_EPOCH,
};

#[derive(Debug)]
struct Snapshot {
    fingerprint: u64,
    posts: Arc<Vec<Post>>,
    /// Serialized `posts`, built on first request.
    json: Option<Arc<str>>,
}

/// Thread-safe, self-refreshing post cache.
#[derive(Debug)]
pub struct PostStore {
    dir: PathBuf,
    config: FeedConfig,
    snapshot: RwLock<Option<Snapshot>>,
}

impl PostStore {
    pub fn new(dir: impl Into<PathBuf>, config: FeedConfig) -> Self {
        Self {
            dir: dir.into(),
            config,
            snapshot: RwLock::new(None),
        }
    }

    /// Current posts, reloading first if the folder changed.
    pub fn posts(&self) -> Arc<Vec<Post>> {
        let fingerprint = fingerprint(&self.dir);
        if let Some(snapshot) = self.snapshot.read().as_ref()
            && snapshot.fingerprint == fingerprint
        {
            return Arc::clone(&snapshot.posts);
        }

        let today = chrono::Local::now().date_naive();
        let posts = Arc::new(load_posts_or_placeholders(&self.dir, &self.config, today));
        *self.snapshot.write() = Some(Snapshot {
            fingerprint,
            posts: Arc::clone(&posts),
            json: None,
        });
        posts
    }

    /// Look up one post by id.
    pub fn find(&self, id: &str) -> Option<Post> {
        self.posts().iter().find(|post| post.id == id).cloned()
    }

    /// Current posts as a JSON array.
    pub fn posts_json(&self) -> serde_json::Result<Arc<str>> {
        let posts = self.posts();
        if let Some(json) = self
            .snapshot
            .read()
            .as_ref()
            .filter(|s| Arc::ptr_eq(&s.posts, &posts))
            .and_then(|s| s.json.clone())
        {
            return Ok(json);
        }

        let json: Arc<str> = serde_json::to_string(posts.as_slice())?.into();
        if let Some(snapshot) = self.snapshot.write().as_mut()
            && Arc::ptr_eq(&snapshot.posts, &posts)
        {
            snapshot.json = Some(Arc::clone(&json));
        }
        Ok(json)
    }
}

/// Hash of (name, size, mtime) for every entry of `dir`, order-independent.
fn fingerprint(dir: &Path) -> u64 {
    let mut entries: Vec<(String, u64, u128)> = match fs::read_dir(dir) {
        Ok(read) => read
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let meta = entry.metadata().ok()?;
                let mtime = meta
                    .modified()
                    .ok()
                    .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                    .map_or(0, |d| d.as_nanos());
                Some((entry.file_name().to_string_lossy().into_owned(), meta.len(), mtime))
            })
            .collect(),
        Err(_) => Vec::new(),
    };
    entries.sort();

    let mut hasher = DefaultHasher::new();
    entries.hash(&mut hasher);
    hasher.finish()
}
