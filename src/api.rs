//! JSON api mounted under `/api`.
//!
//! Routing is a pure function of method, path, query and body so it can be
//! exercised without a socket; `serve` only moves bytes in and out.
//!
//! | Route                      | Body                              |
//! |----------------------------|-----------------------------------|
//! | `GET  /api/posts`          | `{ success, posts[, page] }`      |
//! | `GET  /api/posts/:id`      | `{ success, post }`               |
//! | `GET  /api/projects`       | `{ success, projects }`           |
//! | `GET  /api/projects/:slug` | `{ success, project }`            |
//! | `GET  /api/contact`        | `{ success, relay }`              |
//! | `POST /api/contact`        | `{ success, message }`            |

use crate::{
    carousel::{NavPolicy, Pager, visible_count},
    config::{ContactConfig, SiteConfig},
    contact::{ContactForm, ContactReply},
    feed::{Post, PostStore},
    log,
    project::{Category, GalleryFilter, Project, SortOrder, load_projects},
    serve::PROJECTS_MOUNT,
};
use serde::Serialize;
use std::{borrow::Cow, path::PathBuf};
use tiny_http::Method;

pub const API_MOUNT: &str = "/api";

/// Status and serialized JSON body of one api call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiReply {
    pub status: u16,
    pub body: String,
}

impl ApiReply {
    fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self { status, body },
            Err(err) => Self::internal(&err),
        }
    }

    fn error(status: u16, message: impl Into<String>) -> Self {
        Self::json(status, &ApiResponse::err(message))
    }

    fn internal(err: &dyn std::fmt::Display) -> Self {
        log!("api"; "internal error: {err}");
        Self {
            status: 500,
            body: r#"{"success":false,"message":"Internal server error"}"#.to_owned(),
        }
    }
}

/// Common response envelope; unset fields are left out.
#[derive(Debug, Default, Serialize)]
struct ApiResponse<'a> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    posts: Option<&'a [Post]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<PageInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    post: Option<&'a Post>,
    #[serde(skip_serializing_if = "Option::is_none")]
    projects: Option<Vec<&'a Project>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    project: Option<&'a Project>,
    #[serde(skip_serializing_if = "Option::is_none")]
    relay: Option<&'a str>,
}

impl ApiResponse<'_> {
    fn ok() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
struct PageInfo {
    current: usize,
    count: usize,
    visible: usize,
}

/// Decoded `key=value` pairs of a query string, in order.
#[derive(Debug, Default)]
struct Query(Vec<(String, String)>);

impl Query {
    fn parse(query: &str) -> Self {
        let pairs = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode_component(key), decode_component(value))
            })
            .collect();
        Self(pairs)
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.all(key).next()
    }

    fn all<'a, 'k>(&'a self, key: &'k str) -> impl Iterator<Item = &'a str> + use<'a, 'k> {
        self.0
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

fn decode_component(raw: &str) -> String {
    let raw = raw.replace('+', " ");
    urlencoding::decode(&raw)
        .map(Cow::into_owned)
        .unwrap_or_default()
}

// ============================================================================
// Router
// ============================================================================

pub struct Api {
    posts: PostStore,
    projects_dir: PathBuf,
    contact: ContactConfig,
}

impl Api {
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            posts: PostStore::new(&config.paths.posts, config.feed.clone()),
            projects_dir: config.paths.projects.clone(),
            contact: config.contact.clone(),
        }
    }

    /// Handle a request whose path starts with [`API_MOUNT`].
    pub fn handle(&self, method: &Method, path: &str, query: &str, body: &[u8]) -> ApiReply {
        let route = path.strip_prefix(API_MOUNT).unwrap_or(path).trim_matches('/');
        let segments: Vec<&str> = route.split('/').collect();

        match (method, segments.as_slice()) {
            (Method::Get, ["posts"]) => self.list_posts(&Query::parse(query)),
            (Method::Get, ["posts", id]) => self.get_post(&decode_component(id)),
            (Method::Get, ["projects"]) => self.list_projects(&Query::parse(query)),
            (Method::Get, ["projects", slug]) => self.get_project(&decode_component(slug)),
            (Method::Get, ["contact"]) => ApiReply::json(
                200,
                &ApiResponse {
                    relay: Some(&self.contact.relay_url),
                    ..ApiResponse::ok()
                },
            ),
            (Method::Post, ["contact"]) => self.submit_contact(body),
            (_, ["posts" | "projects"] | ["posts" | "projects", _] | ["contact"]) => {
                ApiReply::error(405, "Method not allowed")
            }
            _ => ApiReply::error(404, "Not found"),
        }
    }

    fn list_posts(&self, query: &Query) -> ApiReply {
        let (width, page) = (query.get("width"), query.get("page"));
        if width.is_none() && page.is_none() {
            return match self.posts.posts_json() {
                Ok(json) => ApiReply {
                    status: 200,
                    body: format!(r#"{{"success":true,"posts":{json}}}"#),
                },
                Err(err) => ApiReply::internal(&err),
            };
        }

        let Ok(width) = width.map_or(Ok(u32::MAX), str::parse::<u32>) else {
            return ApiReply::error(400, "Invalid width");
        };
        let Ok(page) = page.map_or(Ok(0), str::parse::<usize>) else {
            return ApiReply::error(400, "Invalid page");
        };

        let posts = self.posts.posts();
        let mut pager = Pager::new(posts.len(), visible_count(width), NavPolicy::Saturate);
        pager.go_to(page);

        ApiReply::json(
            200,
            &ApiResponse {
                posts: Some(&posts[pager.page_range()]),
                page: Some(PageInfo {
                    current: pager.current(),
                    count: pager.page_count(),
                    visible: pager.visible(),
                }),
                ..ApiResponse::ok()
            },
        )
    }

    fn get_post(&self, id: &str) -> ApiReply {
        match self.posts.find(id) {
            Some(post) => ApiReply::json(
                200,
                &ApiResponse {
                    post: Some(&post),
                    ..ApiResponse::ok()
                },
            ),
            None => ApiReply::error(404, "Post not found"),
        }
    }

    fn list_projects(&self, query: &Query) -> ApiReply {
        let mut filter = GalleryFilter::default();
        for key in query.all("category").flat_map(|v| v.split(',')) {
            match key.parse::<Category>() {
                Ok(category) => {
                    filter.categories.insert(category);
                }
                Err(err) => return ApiReply::error(400, format!("{err}")),
            }
        }
        for tag in query.all("tag") {
            filter.add_tag(tag);
        }
        if let Some(order) = query.get("order") {
            match order.parse::<SortOrder>() {
                Ok(order) => filter.order = order,
                Err(err) => return ApiReply::error(400, format!("{err}")),
            }
        }

        let projects = load_projects(&self.projects_dir, PROJECTS_MOUNT);
        ApiReply::json(
            200,
            &ApiResponse {
                projects: Some(filter.apply(&projects)),
                ..ApiResponse::ok()
            },
        )
    }

    fn get_project(&self, slug: &str) -> ApiReply {
        let projects = load_projects(&self.projects_dir, PROJECTS_MOUNT);
        match projects.iter().find(|p| p.slug == slug) {
            Some(project) => ApiReply::json(
                200,
                &ApiResponse {
                    project: Some(project),
                    ..ApiResponse::ok()
                },
            ),
            None => ApiReply::error(404, "Project not found"),
        }
    }

    fn submit_contact(&self, body: &[u8]) -> ApiReply {
        match ContactForm::from_body(body, self.contact.max_body_bytes) {
            Ok(form) => {
                log!("contact"; "message from {} <{}> ({} chars)", form.name, form.email, form.message.chars().count());
                ApiReply::json(200, &ContactReply::accepted())
            }
            Err(err) => ApiReply::json(err.status(), &ContactReply::rejected(&err)),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::fs;
    use tempfile::TempDir;

    fn api(dir: &TempDir) -> Api {
        let mut config = SiteConfig::default();
        config.paths.posts = dir.path().join("posts");
        config.paths.projects = dir.path().join("projects");
        config.contact.max_body_bytes = 256;
        fs::create_dir_all(&config.paths.posts).unwrap();
        fs::create_dir_all(&config.paths.projects).unwrap();
        Api::new(&config)
    }

    fn add_project(dir: &TempDir, slug: &str, metadata: &str) {
        let folder = dir.path().join("projects").join(slug);
        fs::create_dir_all(&folder).unwrap();
        fs::write(folder.join("metadata.json"), metadata).unwrap();
        fs::write(folder.join("cover.png"), b"png").unwrap();
    }

    fn call(api: &Api, method: Method, url: &str, body: &str) -> (u16, Value) {
        let (path, query) = url.split_once('?').unwrap_or((url, ""));
        let reply = api.handle(&method, path, query, body.as_bytes());
        (reply.status, serde_json::from_str(&reply.body).unwrap())
    }

    #[test]
    fn test_list_posts_falls_back_to_placeholders() {
        let dir = TempDir::new().unwrap();
        let (status, body) = call(&api(&dir), Method::Get, "/api/posts", "");

        assert_eq!(status, 200);
        assert_eq!(body["success"], true);
        assert_eq!(body["posts"].as_array().unwrap().len(), 3);
        assert_eq!(body["posts"][0]["id"], "placeholder-1");
        assert!(body["posts"][0].get("fullText").is_some());
        assert!(body.get("page").is_none());
    }

    #[test]
    fn test_list_posts_paginated() {
        let dir = TempDir::new().unwrap();
        let api = api(&dir);

        let (_, body) = call(&api, Method::Get, "/api/posts?width=400&page=1", "");
        assert_eq!(body["page"]["visible"], 1);
        assert_eq!(body["page"]["count"], 3);
        assert_eq!(body["page"]["current"], 1);
        assert_eq!(body["posts"][0]["id"], "placeholder-2");

        // past the end saturates
        let (_, body) = call(&api, Method::Get, "/api/posts?width=600&page=9", "");
        assert_eq!(body["page"]["current"], 1);
        assert_eq!(body["posts"].as_array().unwrap().len(), 1);

        let (_, body) = call(&api, Method::Get, "/api/posts?page=0", "");
        assert_eq!(body["page"]["visible"], 3);

        let (status, body) = call(&api, Method::Get, "/api/posts?width=wide", "");
        assert_eq!(status, 400);
        assert_eq!(body["message"], "Invalid width");
    }

    #[test]
    fn test_get_post_and_not_found() {
        let dir = TempDir::new().unwrap();
        let api = api(&dir);

        let (status, body) = call(&api, Method::Get, "/api/posts/placeholder-3", "");
        assert_eq!(status, 200);
        assert_eq!(body["post"]["id"], "placeholder-3");

        let (status, body) = call(&api, Method::Get, "/api/posts/missing", "");
        assert_eq!(status, 404);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Post not found");
    }

    #[test]
    fn test_list_projects_with_filters() {
        let dir = TempDir::new().unwrap();
        add_project(&dir, "shop", r#"{"title":"Shop","year":2021,"tags":["Frontend"]}"#);
        add_project(&dir, "study", r#"{"title":"Study","year":2023,"tags":["research"]}"#);
        add_project(&dir, "site", r#"{"title":"Site","year":"2024","tags":["frontend","figma"]}"#);
        let api = api(&dir);

        let slugs = |body: &Value| -> Vec<String> {
            body["projects"]
                .as_array()
                .unwrap()
                .iter()
                .map(|p| p["slug"].as_str().unwrap().to_owned())
                .collect()
        };

        let (_, body) = call(&api, Method::Get, "/api/projects", "");
        assert_eq!(slugs(&body), ["site", "study", "shop"]);

        let (_, body) = call(&api, Method::Get, "/api/projects?category=frontend&order=oldest", "");
        assert_eq!(slugs(&body), ["shop", "site"]);

        let (_, body) = call(&api, Method::Get, "/api/projects?tag=Figma", "");
        assert_eq!(slugs(&body), ["site"]);

        let (status, _) = call(&api, Method::Get, "/api/projects?category=games", "");
        assert_eq!(status, 400);
        let (status, _) = call(&api, Method::Get, "/api/projects?order=sideways", "");
        assert_eq!(status, 400);
    }

    #[test]
    fn test_get_project() {
        let dir = TempDir::new().unwrap();
        add_project(&dir, "my app", r#"{"title":"My App","year":2022}"#);
        let api = api(&dir);

        let (status, body) = call(&api, Method::Get, "/api/projects/my%20app", "");
        assert_eq!(status, 200);
        assert_eq!(body["project"]["title"], "My App");
        assert_eq!(body["project"]["cover"], "/projects/my%20app/cover.png");

        let (status, _) = call(&api, Method::Get, "/api/projects/nope", "");
        assert_eq!(status, 404);
    }

    #[test]
    fn test_contact_submission() {
        let dir = TempDir::new().unwrap();
        let api = api(&dir);

        let (status, body) = call(
            &api,
            Method::Post,
            "/api/contact",
            r#"{"name":"Ada","email":"ada@example.com","message":"Hello"}"#,
        );
        assert_eq!(status, 200);
        assert_eq!(body["message"], "Message received successfully");

        let (status, body) = call(&api, Method::Post, "/api/contact", r#"{"name":"Ada"}"#);
        assert_eq!(status, 400);
        assert_eq!(body["message"], "All fields are required");

        let (status, _) = call(&api, Method::Post, "/api/contact", "not json");
        assert_eq!(status, 400);

        let big = format!(r#"{{"name":"a","email":"b","message":"{}"}}"#, "x".repeat(300));
        let (status, body) = call(&api, Method::Post, "/api/contact", &big);
        assert_eq!(status, 413);
        assert_eq!(body["success"], false);
    }

    #[test]
    fn test_contact_relay() {
        let dir = TempDir::new().unwrap();
        let (status, body) = call(&api(&dir), Method::Get, "/api/contact", "");
        assert_eq!(status, 200);
        assert!(body["relay"].as_str().unwrap().starts_with("https://"));
    }

    #[test]
    fn test_unknown_route_and_method() {
        let dir = TempDir::new().unwrap();
        let api = api(&dir);

        let (status, body) = call(&api, Method::Get, "/api/nothing", "");
        assert_eq!(status, 404);
        assert_eq!(body["message"], "Not found");

        let (status, _) = call(&api, Method::Delete, "/api/posts", "");
        assert_eq!(status, 405);
        let (status, _) = call(&api, Method::Get, "/api", "");
        assert_eq!(status, 404);
    }

    #[test]
    fn test_query_decoding() {
        let query = Query::parse("tag=ui+design&tag=a%2Fb&empty&category=ui");
        assert_eq!(query.all("tag").collect::<Vec<_>>(), ["ui design", "a/b"]);
        assert_eq!(query.get("empty"), Some(""));
        assert_eq!(query.get("category"), Some("ui"));
        assert_eq!(query.get("missing"), None);
    }
}
