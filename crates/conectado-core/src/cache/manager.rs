use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::models::DashboardSnapshot;

/// Consider cache stale after 1 hour
const CACHE_STALE_MINUTES: i64 = 60;

const DASHBOARD_CACHE: &str = "dashboard";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        let now = Utc::now();
        (now - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew (negative ages)
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                // Round up: 1h 30m+ becomes 2h
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            if (minutes % 1440) / 60 >= 12 {
                // Round up: 1d 12h+ becomes 2d
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }

    pub fn is_stale(&self) -> bool {
        self.age_minutes() > CACHE_STALE_MINUTES
    }
}

pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)
            .with_context(|| format!("Failed to create cache directory {}", cache_dir.display()))?;
        Ok(Self { cache_dir })
    }

    fn cache_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", name))
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<CachedData<T>>> {
        let path = self.cache_path(name);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {}", name))?;

        let cached: CachedData<T> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file: {}", name))?;

        Ok(Some(cached))
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let cached = CachedData::new(data);
        let path = self.cache_path(name);
        let contents = serde_json::to_string_pretty(&cached)?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write cache file: {}", name))?;
        Ok(())
    }

    // ===== Dashboard =====

    pub fn load_dashboard(&self) -> Result<Option<CachedData<DashboardSnapshot>>> {
        self.load(DASHBOARD_CACHE)
    }

    pub fn save_dashboard(&self, snapshot: &DashboardSnapshot) -> Result<()> {
        self.save(DASHBOARD_CACHE, snapshot)
    }

    /// Remove cached data, e.g. when the user logs out
    pub fn clear(&self) -> Result<()> {
        let path = self.cache_path(DASHBOARD_CACHE);
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove cache file: {}", DASHBOARD_CACHE))?;
        }
        Ok(())
    }

    /// Age of the cached dashboard for the status bar, `None` if never cached
    pub fn dashboard_age(&self) -> Option<String> {
        match self.load_dashboard() {
            Ok(Some(cached)) => Some(cached.age_display()),
            Ok(None) => None,
            Err(e) => {
                debug!(cache = DASHBOARD_CACHE, error = %e, "Failed to load cache for age display");
                None
            }
        }
    }

    /// Missing or unreadable cache counts as stale
    pub fn is_stale(&self) -> bool {
        match self.load_dashboard() {
            Ok(Some(cached)) => cached.is_stale(),
            Ok(None) => true,
            Err(e) => {
                debug!(cache = DASHBOARD_CACHE, error = %e, "Failed to load cache for staleness check");
                true
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
