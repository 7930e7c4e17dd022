use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;

use super::cache::VerdictCache;
use super::classifier::Classify;
use super::model::{BatchReport, FlaggedLink, ListKind, Risk, ScanContext, ScanError, Verdict};
use super::signal::{SignalSender, UiSignal};
use crate::counter::ScanCounters;
use crate::settings::SettingsHandle;

/// Decides per URL whether a cached verdict suffices or the remote
/// classifier must be consulted, and emits the resulting UI signals.
///
/// The cache lock is only ever held across map operations; classification
/// awaits happen outside it, so concurrent scans interleave freely. Two
/// simultaneous misses on one key both reach the network and the later
/// write wins.
pub struct Scanner {
    classifier: Arc<dyn Classify>,
    cache: Mutex<VerdictCache>,
    signals: SignalSender,
    settings: SettingsHandle,
    counters: ScanCounters,
}

impl Scanner {
    pub(super) fn new(
        classifier: Arc<dyn Classify>,
        cache: VerdictCache,
        signals: SignalSender,
        settings: SettingsHandle,
    ) -> Self {
        Self {
            classifier,
            cache: Mutex::new(cache),
            signals,
            settings,
            counters: ScanCounters::default(),
        }
    }

    pub async fn scan(&self, url: &str, ctx: &ScanContext) -> Result<Verdict, ScanError> {
        if !is_scannable(url) {
            return Err(ScanError::NotScannable);
        }

        let id = ulid::Ulid::new().to_string();
        let key = url.to_lowercase();

        self.counters.started();
        self.signals.emit(UiSignal::ScanStarted { tab: ctx.tab });

        if let Some(verdict) = self.cache.lock().await.get(&key, Instant::now()) {
            tracing::info!("{id} Cache hit {} {key}", verdict.risk);
            self.counters.cache_hit();
            self.resolve(ctx, &verdict, None);

            return Ok(verdict);
        }

        self.counters.network_call();

        let verdict = match self.classifier.classify(&key).await {
            Err(e) => {
                tracing::warn!("{id} {e} when {key}");
                self.counters.failure();
                self.signals.emit(UiSignal::ScanFailed {
                    tab: ctx.tab,
                    reason: e.to_string(),
                });

                return Err(e);
            }
            Ok(verdict) => verdict,
        };

        // Mirrors the wire-level check so scripted classifiers cannot
        // smuggle invalid scores into the cache either.
        if let Err(e) = verdict.validate() {
            tracing::warn!("{id} {e} when {key}");
            self.counters.failure();
            self.signals.emit(UiSignal::ScanFailed {
                tab: ctx.tab,
                reason: e.to_string(),
            });

            return Err(e);
        }

        {
            let mut cache = self.cache.lock().await;
            let now = Instant::now();
            cache.put(&key, verdict.clone(), now);
            cache.run_maintenance(now);
        }

        tracing::info!("{id} Resolved {} {key}", verdict.risk);
        self.counters.record_verdict(verdict.risk);
        self.resolve(ctx, &verdict, Some(url));

        Ok(verdict)
    }

    // Fresh verdicts (`notify_url` set) additionally raise the user
    // notification; cache hits re-raise the warning only.
    fn resolve(&self, ctx: &ScanContext, verdict: &Verdict, notify_url: Option<&str>) {
        self.signals.emit(UiSignal::VerdictResolved {
            tab: ctx.tab,
            verdict: verdict.clone(),
        });

        if verdict.risk != Risk::Malicious {
            return;
        }

        if let Some(url) = notify_url {
            if self.settings.snapshot().notifications {
                self.signals.emit(UiSignal::NotifyUser {
                    url: url.to_string(),
                    verdict: verdict.clone(),
                });
            }
        }

        self.signals.emit(UiSignal::ShowPageWarning {
            tab: ctx.tab,
            verdict: verdict.clone(),
        });
    }

    /// Cache probe without signals or network traffic.
    pub async fn get_cached(&self, url: &str) -> Option<Verdict> {
        self.cache.lock().await.get(url, Instant::now())
    }

    /// Scans an ordered batch of candidate links one at a time, reusing the
    /// single-URL path per element. A failing element is dropped from the
    /// aggregate; the batch continues.
    pub async fn scan_batch(&self, urls: &[String], ctx: &ScanContext) -> BatchReport {
        let cap = self.settings.snapshot().batch_cap;

        let mut seen = HashSet::new();
        let deduped: Vec<&String> = urls.iter().filter(|u| seen.insert(u.as_str())).collect();

        let mut report = BatchReport {
            total: deduped.len(),
            ..BatchReport::default()
        };

        for url in deduped.into_iter().take(cap) {
            let verdict = match self.scan(url, ctx).await {
                Ok(verdict) => verdict,
                Err(e) => {
                    tracing::debug!("Batch element skipped: {e} when {url}");
                    continue;
                }
            };

            match verdict.risk {
                Risk::Safe => report.safe += 1,
                Risk::Suspicious => report.suspicious += 1,
                Risk::Malicious => report.malicious += 1,
            }

            if verdict.risk != Risk::Safe {
                report.flagged.push(FlaggedLink {
                    url: url.clone(),
                    verdict,
                });
            }
        }

        report
    }

    pub async fn submit_listing(&self, url: &str, list: ListKind) -> Result<(), ScanError> {
        if !is_scannable(url) {
            return Err(ScanError::NotScannable);
        }

        self.classifier.submit_listing(url, list).await
    }

    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
    }

    pub async fn cache_len(&self) -> usize {
        self.cache.lock().await.len()
    }

    #[must_use]
    pub fn counters(&self) -> &ScanCounters {
        &self.counters
    }

    #[must_use]
    pub fn settings(&self) -> &SettingsHandle {
        &self.settings
    }
}

fn is_scannable(url: &str) -> bool {
    url::Url::parse(url)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}
