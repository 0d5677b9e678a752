//! On-disk cache of map service responses

use std::fs;
use std::path::PathBuf;

use log::{debug, warn};

use crate::Error;

#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
}

impl ResponseCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, kind: &str, key: &str) -> PathBuf {
        self.dir.join(format!("{kind}_{}.json", slug(key)))
    }

    /// Cached body of a `kind` request for `key`. Unreadable entries count
    /// as misses.
    pub fn get(&self, kind: &str, key: &str) -> Option<String> {
        let path = self.path_for(kind, key);
        match fs::read_to_string(&path) {
            Ok(body) => {
                debug!("Cache hit: {}", path.display());
                Some(body)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Ignoring unreadable cache entry {}: {e}", path.display());
                None
            }
        }
    }

    /// # Errors
    ///
    /// Returns [`Error::IoError`] if the cache directory or file cannot be
    /// written.
    pub fn put(&self, kind: &str, key: &str, body: &str) -> Result<(), Error> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(kind, key);
        fs::write(&path, body)?;
        debug!("Cached response in {}", path.display());
        Ok(())
    }
}

/// Lowercase ASCII alphanumerics, every other run of characters becomes `_`
fn slug(key: &str) -> String {
    let mut slug = String::with_capacity(key.len());
    for c in key.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    slug.trim_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs() {
        assert_eq!(slug("Heidelberg, Germany"), "heidelberg_germany");
        assert_eq!(slug("  Saint-Étienne "), "saint_tienne");
    }

    #[test]
    fn round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(dir.path().join("nested"));
        assert_eq!(cache.get("overpass", "Heidelberg"), None);
        cache.put("overpass", "Heidelberg", "{}").unwrap();
        assert_eq!(cache.get("overpass", "heidelberg").as_deref(), Some("{}"));
        assert_eq!(cache.get("nominatim", "Heidelberg"), None);
    }
}
