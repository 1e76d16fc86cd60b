use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
};
use folio_content::{Author, Collection, Document, Homepage};
use folio_runtime_config::SiteRuntimeConfig;
use folio_server::{AppState, ContentSource, FsContentSource, SourceError, build_router};
use http::{Request, Response, StatusCode, header};
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::sync::Notify;
use tower::ServiceExt;

fn write_json(root: &Path, relative: &str, value: Value) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().expect("parent")).expect("dir");
    fs::write(path, serde_json::to_vec(&value).expect("json")).expect("write");
}

fn content_dir() -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    write_json(
        root,
        "globals/homepage.json",
        json!({
            "mainTitle": "Welcome",
            "mainDescription": "Notes and essays",
            "sections": [
                {"sectionTitle": "Writing", "links": [
                    {"label": "Posts", "linkType": "internal",
                     "internalPage": {"relationTo": "pages", "value": {"slug": "posts"}}}
                ]}
            ]
        }),
    );
    write_json(
        root,
        "posts/hello.json",
        json!({
            "slug": "hello",
            "title": "Hello there",
            "_status": "published",
            "authors": ["u1"]
        }),
    );
    write_json(
        root,
        "posts/wip.json",
        json!({"slug": "wip", "title": "Not yet", "_status": "draft"}),
    );
    write_json(root, "pages/about.json", json!({"slug": "about", "title": "About"}));
    write_json(root, "users/u1.json", json!({"id": "u1", "name": "Upasana"}));
    dir
}

fn config(secrets: bool) -> SiteRuntimeConfig {
    let mut config = SiteRuntimeConfig::default();
    if secrets {
        config.server.revalidate_secret = Some("hook-secret".to_string());
        config.server.preview_secret = Some("preview-secret".to_string());
    }
    config
}

fn state(dir: &TempDir, config: &SiteRuntimeConfig) -> AppState {
    AppState::new(Arc::new(FsContentSource::new(dir.path())), config)
}

async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
        .await
        .expect("response")
}

async fn get_with_cookie(app: Router, uri: &str, cookie: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .expect("request"),
    )
    .await
    .expect("response")
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf8")
}

fn revalidate_request(token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/revalidate")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(serde_json::to_vec(&body).expect("json")))
        .expect("request")
}

#[tokio::test]
async fn homepage_renders_and_honours_etag() {
    let dir = content_dir();
    let state = state(&dir, &config(false));
    let app = build_router(state.clone());

    let response = get(app.clone(), "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let etag = response
        .headers()
        .get(header::ETAG)
        .expect("etag")
        .to_str()
        .expect("ascii")
        .to_string();
    let html = body_text(response).await;
    assert!(html.contains("Welcome"));
    assert!(html.contains(r#"href="/posts""#));
    assert!(state.cache.contains("/"));

    let revisit = app
        .oneshot(
            Request::builder()
                .uri("/")
                .header(header::IF_NONE_MATCH, etag)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(revisit.status(), StatusCode::NOT_MODIFIED);
}

#[tokio::test]
async fn missing_homepage_shows_placeholder_without_caching() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = state(&dir, &config(false));
    let response = get(build_router(state.clone()), "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("content not found"));
    assert!(state.cache.is_empty());
}

#[tokio::test]
async fn published_post_renders_with_author() {
    let dir = content_dir();
    let response = get(build_router(state(&dir, &config(false))), "/posts/hello").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Hello there"));
    assert!(html.contains("Upasana"));
}

#[tokio::test]
async fn pages_live_at_the_root() {
    let dir = content_dir();
    let response = get(build_router(state(&dir, &config(false))), "/about").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("About"));
}

#[tokio::test]
async fn drafts_and_missing_documents_are_not_found() {
    let dir = content_dir();
    let state = state(&dir, &config(false));
    let app = build_router(state.clone());
    assert_eq!(
        get(app.clone(), "/posts/wip").await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        get(app, "/technical_posts/nothing").await.status(),
        StatusCode::NOT_FOUND
    );
    assert!(state.cache.is_empty());
}

#[tokio::test]
async fn cache_disabled_still_serves_pages() {
    let dir = content_dir();
    let mut config = config(false);
    config.cache.enabled = false;
    let state = state(&dir, &config);
    let response = get(build_router(state.clone()), "/posts/hello").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(header::ETAG));
    assert!(state.cache.is_empty());
}

#[tokio::test]
async fn revalidate_requires_bearer_secret() {
    let dir = content_dir();
    let app = build_router(state(&dir, &config(true)));
    let body = json!({"global": "homepage"});

    let response = app
        .clone()
        .oneshot(revalidate_request(None, body.clone()))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(revalidate_request(Some("wrong"), body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unpublish_webhook_evicts_cached_post() {
    let dir = content_dir();
    let state = state(&dir, &config(true));
    let app = build_router(state.clone());

    assert_eq!(get(app.clone(), "/posts/hello").await.status(), StatusCode::OK);
    assert_eq!(get(app.clone(), "/about").await.status(), StatusCode::OK);
    assert!(state.cache.contains("/posts/hello"));

    let response = app
        .oneshot(revalidate_request(
            Some("hook-secret"),
            json!({
                "collection": "posts",
                "doc": {"slug": "hello", "_status": "draft"},
                "previousDoc": {"slug": "hello", "_status": "published"}
            }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let outcome: Value = serde_json::from_str(&body_text(response).await).expect("json");
    assert_eq!(outcome["paths"], json!(["/posts/hello"]));
    assert_eq!(outcome["tags"], json!(["posts-sitemap"]));

    assert!(!state.cache.contains("/posts/hello"));
    assert!(state.cache.contains("/about"));
}

#[tokio::test]
async fn revalidate_rejects_unknown_collection() {
    let dir = content_dir();
    let app = build_router(state(&dir, &config(false)));
    let response = app
        .oneshot(revalidate_request(
            None,
            json!({"collection": "recipes", "doc": {"slug": "soup"}}),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Delegates to the filesystem but holds every document fetch until released.
struct GatedSource {
    inner: FsContentSource,
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl ContentSource for GatedSource {
    async fn homepage(&self) -> Result<Option<Homepage>, SourceError> {
        self.inner.homepage().await
    }

    async fn document(
        &self,
        collection: Collection,
        slug: &str,
    ) -> Result<Option<Document>, SourceError> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.document(collection, slug).await
    }

    async fn authors(&self, ids: &[&str]) -> Result<HashMap<String, Author>, SourceError> {
        self.inner.authors(ids).await
    }
}

#[tokio::test]
async fn render_racing_a_revalidation_is_not_cached() {
    let dir = content_dir();
    let source = Arc::new(GatedSource {
        inner: FsContentSource::new(dir.path()),
        entered: Notify::new(),
        release: Notify::new(),
    });
    let state = AppState::new(source.clone(), &config(true));
    let app = build_router(state.clone());

    let pending = tokio::spawn(get(app.clone(), "/posts/hello"));
    source.entered.notified().await;
    let response = app
        .clone()
        .oneshot(revalidate_request(
            Some("hook-secret"),
            json!({"collection": "posts", "doc": {"slug": "hello", "_status": "published"}}),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    source.release.notify_one();

    let response = pending.await.expect("join");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Hello there"));
    assert!(!state.cache.contains("/posts/hello"));

    source.release.notify_one();
    assert_eq!(get(app, "/posts/hello").await.status(), StatusCode::OK);
    assert!(state.cache.contains("/posts/hello"));
}

#[tokio::test]
async fn malformed_content_still_renders() {
    let dir = content_dir();
    write_json(
        dir.path(),
        "posts/messy.json",
        json!({
            "slug": "messy",
            "title": "Still here",
            "_status": "published",
            "authors": [42, [1, 2]],
            "meta": "oops",
            "layout": [
                {"blockType": "own-content-matrix", "rows": [
                    {"rowTitle": null, "columns": [
                        {"size": 6, "contentElements": [
                            {"blockType": "link-element", "linkText": null,
                             "link": {"linkType": "internal", "internalPage": "abc"}},
                            {"blockType": "media-element", "media": 17},
                            "junk",
                            {"blockType": "richtext-element", "richText": {"root": {"children": [
                                {"type": "paragraph", "children": [{"type": "text", "text": "Body survives"}]}
                            ]}}}
                        ]}
                    ]},
                    5
                ]},
                {"blockType": "hero", "title": 3}
            ]
        }),
    );
    let response = get(build_router(state(&dir, &config(false))), "/posts/messy").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Still here"));
    assert!(html.contains("Body survives"));
}

#[tokio::test]
async fn preview_redirects_with_valid_secret() {
    let dir = content_dir();
    let app = build_router(state(&dir, &config(true)));

    let response = get(
        app.clone(),
        "/next/preview?path=%2Fposts%2Fwip&previewSecret=preview-secret",
    )
    .await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers().get(header::LOCATION).expect("location"),
        "/posts/wip"
    );
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("set-cookie")
        .to_str()
        .expect("ascii");
    assert!(cookie.starts_with("folio_preview="));
    assert!(cookie.contains("HttpOnly"));
    assert!(!cookie.contains("preview-secret"));

    let response = get(app.clone(), "/next/preview?path=%2Fposts%2Fwip&previewSecret=nope").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    for path in ["https%3A%2F%2Fevil.example", "%2F%2Fevil.example", "%2F%5Cevil.example"] {
        let response = get(
            app.clone(),
            &format!("/next/preview?path={path}&previewSecret=preview-secret"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{path}");
    }
}

#[tokio::test]
async fn preview_cookie_shows_drafts_without_caching() {
    let dir = content_dir();
    let state = state(&dir, &config(true));
    let app = build_router(state.clone());

    let response = get(
        app.clone(),
        "/next/preview?path=%2Fposts%2Fwip&previewSecret=preview-secret",
    )
    .await;
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("set-cookie")
        .to_str()
        .expect("ascii")
        .split(';')
        .next()
        .expect("cookie pair")
        .to_string();
    let location = response
        .headers()
        .get(header::LOCATION)
        .expect("location")
        .to_str()
        .expect("ascii")
        .to_string();

    let response = get_with_cookie(app.clone(), &location, &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).expect("cache-control"),
        "private, no-store"
    );
    assert!(body_text(response).await.contains("Not yet"));

    let response = get_with_cookie(app.clone(), "/posts/hello", &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(state.cache.is_empty());

    let forged = get_with_cookie(app.clone(), "/posts/wip", "folio_preview=preview-secret").await;
    assert_eq!(forged.status(), StatusCode::NOT_FOUND);
    assert_eq!(get(app.clone(), "/posts/wip").await.status(), StatusCode::NOT_FOUND);

    let response = get(app, "/next/exit-preview").await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    let cleared = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("set-cookie")
        .to_str()
        .expect("ascii");
    assert!(cleared.contains("Max-Age=0"));
}

#[tokio::test]
async fn preview_is_closed_without_configured_secret() {
    let dir = content_dir();
    let response = get(
        build_router(state(&dir, &config(false))),
        "/next/preview?path=%2F&previewSecret=",
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
