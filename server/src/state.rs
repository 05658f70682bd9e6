use render::ImageCache;
use session::SessionStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SessionStore>,
    pub images: Arc<ImageCache>,
}

impl AppState {
    pub fn new(store: SessionStore) -> Self {
        Self {
            store: Arc::new(store),
            images: Arc::new(ImageCache::new()),
        }
    }
}
