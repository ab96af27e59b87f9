//! URL ↔ filesystem path helpers.

use std::path::{Component, Path, PathBuf};

/// Join a decoded request path onto `root`, refusing anything that could
/// escape it (`..`, absolute segments, drive prefixes).
pub fn safe_join(root: &Path, request_path: &str) -> Option<PathBuf> {
    let relative = Path::new(request_path.trim_start_matches('/'));
    let mut out = root.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(out)
}

/// Build a URL path from a prefix and raw segments, percent-encoding each segment.
///
/// `url_for("/projects", &["My App", "cover 1.png"])` → `/projects/My%20App/cover%201.png`
pub fn url_for(prefix: &str, segments: &[&str]) -> String {
    let mut url = prefix.trim_end_matches('/').to_owned();
    for segment in segments {
        url.push('/');
        url.push_str(&urlencoding::encode(segment));
    }
    url
}
