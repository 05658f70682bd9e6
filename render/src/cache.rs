use dashmap::DashMap;

/// Latest rendered image per session, owned by the presentation layer.
/// Entries live as long as their session; the view regenerates them on
/// every page load, so staleness only matters between render and fetch.
#[derive(Debug, Default)]
pub struct ImageCache {
    images: DashMap<String, Vec<u8>>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, sessionid: &str, bytes: Vec<u8>) {
        self.images.insert(sessionid.to_string(), bytes);
    }

    pub fn get(&self, sessionid: &str) -> Option<Vec<u8>> {
        self.images.get(sessionid).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, sessionid: &str) {
        self.images.remove(sessionid);
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_replaces_previous_image() {
        let cache = ImageCache::new();
        cache.put("s1", b"old".to_vec());
        cache.put("s1", b"new".to_vec());

        assert_eq!(cache.get("s1").unwrap(), b"new");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn sessions_are_independent() {
        let cache = ImageCache::new();
        cache.put("s1", b"one".to_vec());

        assert!(cache.get("s2").is_none());
        cache.remove("s1");
        assert!(cache.is_empty());
    }
}
