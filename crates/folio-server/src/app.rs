//! HTTP surface: rendered pages, the revalidation webhook and draft preview.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use folio_content::{Collection, ContentError, Document, document_path};
use folio_renderer::{PageRenderer, RenderContext, RenderedPage, SiteDefaults, SiteRenderer};
use folio_revalidate::{
    CachedPage, HOMEPAGE_PATH, HOMEPAGE_TAG, MemoryRenderCache, RevalidationRequest, sha256_hex,
};
use folio_runtime_config::SiteRuntimeConfig;
use http::{HeaderMap, HeaderValue, StatusCode, header};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, warn};

use crate::source::ContentSource;

/// Cookie that turns on draft mode. Its value is the sha256 of the preview
/// secret.
pub const PREVIEW_COOKIE: &str = "folio_preview";

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn ContentSource>,
    pub renderer: Arc<SiteRenderer>,
    pub cache: MemoryRenderCache,
    pub cache_enabled: bool,
    pub revalidate_secret: Option<String>,
    pub preview_secret: Option<String>,
}

impl AppState {
    pub fn new(source: Arc<dyn ContentSource>, config: &SiteRuntimeConfig) -> Self {
        let context = RenderContext::new(config.link_policy()).with_site(SiteDefaults {
            title: config.site.title.clone(),
            default_icon: config.site.default_icon.clone(),
        });
        Self {
            source,
            renderer: Arc::new(SiteRenderer::new(context)),
            cache: MemoryRenderCache::new(),
            cache_enabled: config.cache.enabled,
            revalidate_secret: config.server.revalidate_secret.clone(),
            preview_secret: config.server.preview_secret.clone(),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(homepage))
        .route("/posts/{slug}", get(post_page))
        .route("/technical_posts/{slug}", get(technical_post_page))
        .route("/{slug}", get(page))
        .route("/api/revalidate", post(revalidate))
        .route("/next/preview", get(preview))
        .route("/next/exit-preview", get(exit_preview))
        .with_state(state)
}

async fn homepage(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(cached) = state.cached(HOMEPAGE_PATH) {
        return html_response(StatusCode::OK, &cached, &headers);
    }
    let generation = state.cache.generation();
    match state.source.homepage().await {
        Ok(Some(homepage)) => {
            let rendered = state.renderer.homepage(Some(&homepage));
            let tags = vec![HOMEPAGE_TAG.to_string()];
            let page = state.store(generation, HOMEPAGE_PATH, &rendered, tags);
            html_response(StatusCode::OK, &page, &headers)
        }
        Ok(None) => {
            warn!("homepage global not found; rendering placeholder");
            uncached(StatusCode::OK, &state.renderer.homepage(None), &headers)
        }
        Err(err) => {
            error!(error = %err, "error fetching homepage content");
            uncached(StatusCode::OK, &state.renderer.homepage(None), &headers)
        }
    }
}

async fn post_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Response {
    document_page(state, Collection::Posts, slug, headers).await
}

async fn technical_post_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Response {
    document_page(state, Collection::TechnicalPosts, slug, headers).await
}

async fn page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Response {
    document_page(state, Collection::Pages, slug, headers).await
}

async fn document_page(
    state: AppState,
    collection: Collection,
    slug: String,
    headers: HeaderMap,
) -> Response {
    let path = document_path(collection, &slug);
    let draft_mode = state.draft_mode(&headers);
    if !draft_mode && let Some(cached) = state.cached(&path) {
        return html_response(StatusCode::OK, &cached, &headers);
    }
    let generation = state.cache.generation();
    match fetch_document(&state, collection, &slug, draft_mode).await {
        Ok(Some(document)) if draft_mode => {
            debug!(%path, "rendering in draft mode");
            let rendered = state.renderer.document(&document);
            let mut response = uncached(StatusCode::OK, &rendered, &headers);
            response.headers_mut().insert(
                header::CACHE_CONTROL,
                HeaderValue::from_static("private, no-store"),
            );
            response
        }
        Ok(Some(document)) => {
            let rendered = state.renderer.document(&document);
            let tags = vec![collection.sitemap_tag()];
            let page = state.store(generation, &path, &rendered, tags);
            html_response(StatusCode::OK, &page, &headers)
        }
        Ok(None) => {
            debug!(%path, "no public document");
            uncached(StatusCode::NOT_FOUND, &state.renderer.not_found(), &headers)
        }
        Err(err) => {
            error!(%path, error = %err, "error fetching document");
            uncached(
                StatusCode::SERVICE_UNAVAILABLE,
                &state.renderer.not_found(),
                &headers,
            )
        }
    }
}

/// Document with its authors populated. Drafts are only returned when
/// `include_drafts` is set.
pub async fn fetch_document(
    state: &AppState,
    collection: Collection,
    slug: &str,
    include_drafts: bool,
) -> Result<Option<Document>, ContentError> {
    let Some(mut document) = state.source.document(collection, slug).await? else {
        return Ok(None);
    };
    if !include_drafts && !document.is_public() {
        return Ok(None);
    }
    let missing = document.unresolved_author_ids();
    let directory = if missing.is_empty() {
        Default::default()
    } else {
        state.source.authors(&missing).await?
    };
    document.populate_authors(&directory);
    Ok(Some(document))
}

async fn revalidate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<RevalidationRequest>,
) -> Response {
    if let Some(secret) = &state.revalidate_secret
        && bearer_token(&headers) != Some(secret.as_str())
    {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "invalid revalidation secret"})),
        )
            .into_response();
    }
    match request.dispatch(&state.cache) {
        Ok(outcome) => Json(outcome).into_response(),
        Err(err) => {
            warn!(error = %err, "rejected revalidation request");
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": err.to_string()})),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PreviewQuery {
    #[serde(default)]
    path: String,
    #[serde(default)]
    preview_secret: String,
}

/// Checks the secret, sets the draft-mode cookie and redirects to the page.
async fn preview(State(state): State<AppState>, Query(query): Query<PreviewQuery>) -> Response {
    let Some(secret) = state
        .preview_secret
        .as_deref()
        .filter(|secret| *secret == query.preview_secret)
    else {
        return (StatusCode::UNAUTHORIZED, "invalid preview secret").into_response();
    };
    if !is_site_relative(&query.path) {
        return (StatusCode::BAD_REQUEST, "preview path must be site-relative").into_response();
    }
    let cookie = format!(
        "{PREVIEW_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
        sha256_hex(secret.as_bytes())
    );
    let mut response = Redirect::temporary(&query.path).into_response();
    if let Ok(cookie) = HeaderValue::from_str(&cookie) {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    response
}

async fn exit_preview() -> Response {
    let mut response = Redirect::temporary("/").into_response();
    response.headers_mut().insert(
        header::SET_COOKIE,
        HeaderValue::from_static("folio_preview=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"),
    );
    response
}

// Browsers read `\` as `/`, so `/\host` is protocol-relative too.
fn is_site_relative(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.chars().any(|c| c == '\\' || c.is_control())
}

impl AppState {
    fn cached(&self, path: &str) -> Option<CachedPage> {
        if !self.cache_enabled {
            return None;
        }
        let hit = self.cache.get(path);
        if hit.is_some() {
            debug!(%path, "render cache hit");
        }
        hit
    }

    /// True when the request carries a draft-mode cookie for the configured
    /// preview secret.
    pub fn draft_mode(&self, headers: &HeaderMap) -> bool {
        let Some(secret) = self.preview_secret.as_deref() else {
            return false;
        };
        let expected = sha256_hex(secret.as_bytes());
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .any(|(name, value)| name == PREVIEW_COOKIE && value == expected)
    }

    // `generation` is read before the fetch; an invalidation since then
    // means this render may be stale and must not be cached.
    fn store(
        &self,
        generation: u64,
        path: &str,
        rendered: &RenderedPage,
        tags: Vec<String>,
    ) -> CachedPage {
        let html = rendered.html();
        if self.cache_enabled {
            self.cache.insert_if_current(generation, path, html, tags)
        } else {
            CachedPage::new(html, tags)
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

fn uncached(status: StatusCode, rendered: &RenderedPage, headers: &HeaderMap) -> Response {
    html_response(status, &CachedPage::new(rendered.html(), Vec::new()), headers)
}

fn html_response(status: StatusCode, page: &CachedPage, headers: &HeaderMap) -> Response {
    let etag = HeaderValue::from_str(&page.etag).ok();
    let not_modified = status == StatusCode::OK
        && headers
            .get(header::IF_NONE_MATCH)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| page.matches(value));
    let mut response = if not_modified {
        StatusCode::NOT_MODIFIED.into_response()
    } else {
        (
            status,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            page.html.clone(),
        )
            .into_response()
    };
    if let Some(etag) = etag {
        response.headers_mut().insert(header::ETAG, etag);
    }
    response
}
