//! Static build output and its routing fallbacks.
//!
//! A request path is looked up, in order, as an exact file, as the same path
//! with `.html` appended (unless it already ends in `.html`) and as a
//! directory holding `index.html`. Anything else falls back to the root
//! `index.html` so client-side routes still load the application.

use std::path::{Path, PathBuf};

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::state::AppState;

const INDEX: &str = "index.html";

/// Build output directory.
#[derive(Debug, Clone)]
pub struct StaticSite {
    root: PathBuf,
}

/// Outcome of looking up a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// A file matching the request.
    File(PathBuf),
    /// The root `index.html`, served for unmatched paths.
    Fallback(PathBuf),
    /// Not even the fallback exists.
    NotFound,
}

impl StaticSite {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a request path onto a file of the build output.
    ///
    /// Paths with `..` segments never match anything but the fallback.
    pub async fn resolve(&self, request_path: &str) -> Resolved {
        if let Some(relative) = relative_path(request_path) {
            let exact = self.root.join(&relative);
            if is_file(&exact).await {
                return Resolved::File(exact);
            }
            if !relative.ends_with(".html") {
                let with_extension = self.root.join(format!("{relative}.html"));
                if is_file(&with_extension).await {
                    return Resolved::File(with_extension);
                }
            }
            let directory_index = exact.join(INDEX);
            if is_file(&directory_index).await {
                return Resolved::File(directory_index);
            }
        }

        let fallback = self.root.join(INDEX);
        if is_file(&fallback).await {
            Resolved::Fallback(fallback)
        } else {
            Resolved::NotFound
        }
    }
}

/// Normalised path below the site root; `None` when it tries to climb out.
fn relative_path(request_path: &str) -> Option<String> {
    let mut segments = Vec::new();
    for segment in request_path.split('/') {
        match segment {
            "" | "." => {}
            ".." => return None,
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        return Some(INDEX.to_string());
    }
    Some(segments.join("/"))
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|metadata| metadata.is_file())
}

/// Content type of a file, from its extension.
#[must_use]
pub fn content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "html" => "text/html",
        "js" => "application/javascript",
        "css" => "text/css",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "eot" => "application/vnd.ms-fontobject",
        _ => "text/plain",
    }
}

/// Fallback handler serving the build output.
///
/// Files go out through [`ServeFile`] with the content type from
/// [`content_type`]; the client fallback is always `text/html`.
pub(crate) async fn serve(State(state): State<AppState>, request: Request) -> Response {
    let (path, mime) = match state.site.resolve(request.uri().path()).await {
        Resolved::File(path) => {
            tracing::debug!(path = %path.display(), "serving file");
            let mime = content_type(&path);
            (path, mime)
        }
        Resolved::Fallback(path) => {
            tracing::debug!(request = request.uri().path(), "serving client fallback");
            (path, "text/html")
        }
        Resolved::NotFound => return (StatusCode::NOT_FOUND, "File not found").into_response(),
    };
    match ServeFile::new_with_mime(
        path,
        &mime.parse().expect("content types are valid MIME strings"),
    )
        .oneshot(request)
        .await
    {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site_with(files: &[&str]) -> (tempfile::TempDir, StaticSite) {
        let dir = tempfile::tempdir().unwrap();
        for file in files {
            let path = dir.path().join(file);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, file.as_bytes()).unwrap();
        }
        let site = StaticSite::new(dir.path());
        (dir, site)
    }

    #[tokio::test]
    async fn should_map_root_to_index() {
        let (dir, site) = site_with(&["index.html"]);
        assert_eq!(
            site.resolve("/").await,
            Resolved::File(dir.path().join("index.html"))
        );
    }

    #[tokio::test]
    async fn should_prefer_exact_file_over_html_suffix() {
        let (dir, site) = site_with(&["index.html", "about", "about.html"]);
        assert_eq!(
            site.resolve("/about").await,
            Resolved::File(dir.path().join("about"))
        );
    }

    #[tokio::test]
    async fn should_try_html_suffix_then_directory_index() {
        let (dir, site) = site_with(&["index.html", "settings.html", "wifi/index.html"]);
        assert_eq!(
            site.resolve("/settings").await,
            Resolved::File(dir.path().join("settings.html"))
        );
        assert_eq!(
            site.resolve("/wifi").await,
            Resolved::File(dir.path().join("wifi").join("index.html"))
        );
    }

    #[tokio::test]
    async fn should_not_append_html_twice() {
        let (dir, site) = site_with(&["index.html", "page.html.html"]);
        assert_eq!(
            site.resolve("/page.html").await,
            Resolved::Fallback(dir.path().join("index.html"))
        );
    }

    #[tokio::test]
    async fn should_fall_back_to_root_index() {
        let (dir, site) = site_with(&["index.html"]);
        assert_eq!(
            site.resolve("/settings").await,
            Resolved::Fallback(dir.path().join("index.html"))
        );
    }

    #[tokio::test]
    async fn should_report_not_found_without_index() {
        let (_dir, site) = site_with(&["app.js"]);
        assert_eq!(site.resolve("/missing").await, Resolved::NotFound);
    }

    #[tokio::test]
    async fn should_never_escape_the_root() {
        let outer = tempfile::tempdir().unwrap();
        std::fs::write(outer.path().join("secret.txt"), "secret").unwrap();
        let root = outer.path().join("dist");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(root.join("index.html"), "index").unwrap();
        let site = StaticSite::new(&root);

        assert_eq!(
            site.resolve("/../secret.txt").await,
            Resolved::Fallback(root.join("index.html"))
        );
    }

    #[test]
    fn should_map_extensions_to_content_types() {
        assert_eq!(content_type(Path::new("a/app.JS")), "application/javascript");
        assert_eq!(content_type(Path::new("logo.svg")), "image/svg+xml");
        assert_eq!(content_type(Path::new("photo.jpeg")), "image/jpeg");
        assert_eq!(content_type(Path::new("font.eot")), "application/vnd.ms-fontobject");
        assert_eq!(content_type(Path::new("favicon.ico")), "image/x-icon");
        assert_eq!(content_type(Path::new("README")), "text/plain");
        assert_eq!(content_type(Path::new("data.wasm")), "text/plain");
    }
}
