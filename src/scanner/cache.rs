use std::collections::HashMap;
use std::time::Instant;

use super::model::Verdict;
use crate::settings::SettingsHandle;

#[derive(Debug, Clone)]
struct CacheEntry {
    verdict: Verdict,
    fetched_at: Instant,
}

/// In-memory verdict cache keyed by the lower-cased URL.
///
/// Expiry is lazy: reads report stale entries as absent but leave them in
/// place until `run_maintenance` sweeps them. Maintenance also enforces the
/// size ceiling by dropping the oldest-fetched entries down to the floor.
/// TTL and bounds come from the live settings handle on every call.
pub struct VerdictCache {
    entries: HashMap<String, CacheEntry>,
    settings: SettingsHandle,
}

impl VerdictCache {
    #[must_use]
    pub fn new(settings: SettingsHandle) -> Self {
        Self {
            entries: HashMap::new(),
            settings,
        }
    }

    pub fn get(&self, url: &str, now: Instant) -> Option<Verdict> {
        let entry = self.entries.get(&normalize(url))?;
        let ttl = self.settings.snapshot().ttl();

        if now.saturating_duration_since(entry.fetched_at) >= ttl {
            return None;
        }

        Some(entry.verdict.clone())
    }

    pub fn put(&mut self, url: &str, verdict: Verdict, now: Instant) {
        self.entries.insert(
            normalize(url),
            CacheEntry {
                verdict,
                fetched_at: now,
            },
        );
    }

    pub fn run_maintenance(&mut self, now: Instant) {
        let settings = self.settings.snapshot();
        let ttl = settings.ttl();

        self.entries
            .retain(|_, entry| now.saturating_duration_since(entry.fetched_at) < ttl);

        if self.entries.len() <= settings.cache_max {
            return;
        }

        // Oldest fetch goes first; equal timestamps fall back to key order
        // so eviction stays deterministic.
        let mut by_age: Vec<(Instant, String)> = self
            .entries
            .iter()
            .map(|(key, entry)| (entry.fetched_at, key.clone()))
            .collect();
        by_age.sort();

        let excess = self.entries.len().saturating_sub(settings.cache_floor);
        for (_, key) in by_age.into_iter().take(excess) {
            self.entries.remove(&key);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn normalize(url: &str) -> String {
    url.to_lowercase()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::scanner::Risk;
    use crate::settings::Settings;

    fn verdict(risk: Risk, score: f64) -> Verdict {
        Verdict {
            risk,
            score,
            reasons: vec![],
        }
    }

    fn handle(ttl_ms: u64, cache_max: usize, cache_floor: usize) -> SettingsHandle {
        SettingsHandle::new(Settings {
            ttl_ms,
            cache_max,
            cache_floor,
            ..Settings::default()
        })
    }

    #[test]
    fn ttl_boundary() {
        let mut cache = VerdictCache::new(handle(5000, 1000, 500));
        let t0 = Instant::now();

        cache.put("http://a.com", verdict(Risk::Safe, 0.1), t0);

        assert!(cache
            .get("http://a.com", t0 + Duration::from_millis(4999))
            .is_some());
        assert!(cache
            .get("http://a.com", t0 + Duration::from_millis(5000))
            .is_none());
    }

    #[test]
    fn keys_are_case_insensitive() {
        let mut cache = VerdictCache::new(handle(5000, 1000, 500));
        let t0 = Instant::now();
        let v = verdict(Risk::Suspicious, 0.6);

        cache.put("HTTP://Example.com/x", v.clone(), t0);

        assert_eq!(cache.get("http://example.com/x", t0), Some(v.clone()));
        // Whole-URL folding: path case collides too.
        assert_eq!(cache.get("http://example.com/X", t0), Some(v));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn reads_do_not_evict_stale_entries() {
        let mut cache = VerdictCache::new(handle(100, 1000, 500));
        let t0 = Instant::now();

        cache.put("http://a.com", verdict(Risk::Safe, 0.1), t0);
        let later = t0 + Duration::from_millis(200);

        assert!(cache.get("http://a.com", later).is_none());
        assert_eq!(cache.len(), 1);

        cache.run_maintenance(later);
        assert!(cache.is_empty());
    }

    #[test]
    fn put_overwrites_and_refreshes() {
        let mut cache = VerdictCache::new(handle(5000, 1000, 500));
        let t0 = Instant::now();

        cache.put("http://a.com", verdict(Risk::Safe, 0.1), t0);
        let t1 = t0 + Duration::from_millis(4000);
        cache.put("http://a.com", verdict(Risk::Malicious, 0.9), t1);

        let got = cache
            .get("http://a.com", t1 + Duration::from_millis(4999))
            .unwrap();
        assert_eq!(got.risk, Risk::Malicious);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn maintenance_evicts_down_to_floor() {
        let mut cache = VerdictCache::new(handle(60_000, 3, 1));
        let t0 = Instant::now();

        for (i, key) in ["http://a.com", "http://b.com", "http://c.com", "http://d.com"]
            .iter()
            .enumerate()
        {
            cache.put(key, verdict(Risk::Safe, 0.1), t0 + Duration::from_millis(i as u64));
        }

        let t3 = t0 + Duration::from_millis(3);
        cache.run_maintenance(t3);

        assert_eq!(cache.len(), 1);
        assert!(cache.get("http://d.com", t3).is_some());
    }

    #[test]
    fn survivors_are_the_most_recently_fetched() {
        let max = 6;
        let floor = 3;
        let mut cache = VerdictCache::new(handle(60_000, max, floor));
        let t0 = Instant::now();

        for i in 0..=max {
            cache.put(
                &format!("http://host{i}.com"),
                verdict(Risk::Safe, 0.1),
                t0 + Duration::from_millis(i as u64),
            );
        }

        let now = t0 + Duration::from_millis(max as u64);
        cache.run_maintenance(now);

        assert_eq!(cache.len(), floor);
        for i in 0..=max {
            let hit = cache.get(&format!("http://host{i}.com"), now).is_some();
            assert_eq!(hit, i > max - floor, "unexpected survivor set at {i}");
        }
    }

    #[test]
    fn equal_timestamps_evict_in_key_order() {
        let mut cache = VerdictCache::new(handle(60_000, 2, 1));
        let t0 = Instant::now();

        cache.put("http://b.com", verdict(Risk::Safe, 0.1), t0);
        cache.put("http://a.com", verdict(Risk::Safe, 0.1), t0);
        cache.put("http://c.com", verdict(Risk::Safe, 0.1), t0);

        cache.run_maintenance(t0);

        assert_eq!(cache.len(), 1);
        assert!(cache.get("http://c.com", t0).is_some());
    }

    #[test]
    fn ttl_changes_apply_to_existing_entries() {
        let settings = handle(60_000, 1000, 500);
        let mut cache = VerdictCache::new(settings.clone());
        let t0 = Instant::now();

        cache.put("http://a.com", verdict(Risk::Safe, 0.1), t0);
        let t1 = t0 + Duration::from_millis(500);
        assert!(cache.get("http://a.com", t1).is_some());

        let mut shrunk = settings.snapshot();
        shrunk.ttl_ms = 100;
        settings.replace(shrunk);

        assert!(cache.get("http://a.com", t1).is_none());
    }
}
