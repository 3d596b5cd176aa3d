//! Navigation port — how the client leaves the current page.

use std::sync::Arc;

/// Moves the client to another page of the site.
pub trait Navigator: Send + Sync {
    /// Navigate to `path` (absolute from the site root).
    fn navigate(&self, path: &str);
}

impl<T: Navigator + ?Sized> Navigator for Arc<T> {
    fn navigate(&self, path: &str) {
        (**self).navigate(path);
    }
}
