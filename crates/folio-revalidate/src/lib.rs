//! Cached renders and the hooks that invalidate them.

pub mod cache;
pub mod hook;

pub use cache::{CachedPage, MemoryRenderCache, Revalidator, etag_for, sha256_hex};
pub use hook::{
    HOMEPAGE_GLOBAL, HOMEPAGE_PATH, HOMEPAGE_TAG, HookContext, HookOperation, RevalidateError,
    RevalidationOutcome, RevalidationRequest, publication_status_changed, revalidate_after_change,
    revalidate_after_delete, revalidate_global,
};
