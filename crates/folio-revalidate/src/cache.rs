//! Path-keyed cache of rendered pages.

use std::collections::{BTreeSet, HashMap};
use std::fmt::Write;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Sink for invalidations. The revalidation hooks only ever talk to this.
pub trait Revalidator: Send + Sync {
    fn revalidate_path(&self, path: &str);
    fn revalidate_tag(&self, tag: &str);
}

/// One cached render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CachedPage {
    pub html: String,
    pub etag: String,
    pub tags: Vec<String>,
}

impl CachedPage {
    pub fn new(html: String, tags: Vec<String>) -> Self {
        let etag = etag_for(&html);
        Self { html, etag, tags }
    }

    /// True when an `If-None-Match` header value covers this page.
    pub fn matches(&self, if_none_match: &str) -> bool {
        if_none_match
            .split(',')
            .map(|candidate| candidate.trim().trim_start_matches("W/"))
            .any(|candidate| candidate == "*" || candidate == self.etag)
    }
}

/// Strong ETag: quoted sha256 of the body.
pub fn etag_for(body: &str) -> String {
    format!("\"{}\"", sha256_hex(body.as_bytes()))
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(&mut out, "{byte:02x}");
    }
    out
}

#[derive(Debug, Default)]
struct CacheState {
    pages: HashMap<String, CachedPage>,
    tagged: HashMap<String, BTreeSet<String>>,
    generation: u64,
}

impl CacheState {
    fn unindex(&mut self, path: &str, tags: &[String]) {
        for tag in tags {
            if let Some(paths) = self.tagged.get_mut(tag) {
                paths.remove(path);
                if paths.is_empty() {
                    self.tagged.remove(tag);
                }
            }
        }
    }

    fn store(&mut self, path: &str, page: CachedPage) {
        if let Some(previous) = self.pages.remove(path) {
            self.unindex(path, &previous.tags);
        }
        for tag in &page.tags {
            self.tagged
                .entry(tag.clone())
                .or_default()
                .insert(path.to_string());
        }
        self.pages.insert(path.to_string(), page);
    }
}

/// In-process render cache shared between request handlers.
///
/// Clones share the same storage. Every invalidation bumps a generation
/// counter; a render that started before an invalidation can be stored with
/// [`MemoryRenderCache::insert_if_current`] so it never outlives the write
/// that invalidated it.
#[derive(Debug, Clone, Default)]
pub struct MemoryRenderCache {
    state: Arc<Mutex<CacheState>>,
}

impl MemoryRenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    // A poisoned lock only means a handler panicked mid-insert; the maps are
    // still usable.
    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, path: &str) -> Option<CachedPage> {
        self.state().pages.get(path).cloned()
    }

    /// Current invalidation generation. Read it before fetching content.
    pub fn generation(&self) -> u64 {
        self.state().generation
    }

    pub fn insert(&self, path: &str, html: String, tags: Vec<String>) -> CachedPage {
        let page = CachedPage::new(html, tags);
        self.state().store(path, page.clone());
        page
    }

    /// Stores the page only if nothing was invalidated since `generation`
    /// was read. The page is returned either way so it can still be served.
    pub fn insert_if_current(
        &self,
        generation: u64,
        path: &str,
        html: String,
        tags: Vec<String>,
    ) -> CachedPage {
        let page = CachedPage::new(html, tags);
        let mut state = self.state();
        if state.generation == generation {
            state.store(path, page.clone());
        }
        page
    }

    pub fn contains(&self, path: &str) -> bool {
        self.state().pages.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.state().pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached paths, sorted.
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.state().pages.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Tags with at least one cached path, sorted.
    pub fn tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.state().tagged.keys().cloned().collect();
        tags.sort();
        tags
    }

    /// Drops one path. Returns whether anything was cached there.
    pub fn remove_path(&self, path: &str) -> bool {
        let mut state = self.state();
        state.generation += 1;
        let Some(page) = state.pages.remove(path) else {
            return false;
        };
        state.unindex(path, &page.tags);
        true
    }

    /// Drops every path carrying `tag`. Returns how many were dropped.
    pub fn remove_tag(&self, tag: &str) -> usize {
        let mut state = self.state();
        state.generation += 1;
        let Some(paths) = state.tagged.remove(tag) else {
            return 0;
        };
        let mut dropped = 0;
        for path in paths {
            if let Some(page) = state.pages.remove(&path) {
                state.unindex(&path, &page.tags);
                dropped += 1;
            }
        }
        dropped
    }
}

impl Revalidator for MemoryRenderCache {
    fn revalidate_path(&self, path: &str) {
        self.remove_path(path);
    }

    fn revalidate_tag(&self, tag: &str) {
        self.remove_tag(tag);
    }
}
