use std::sync::Arc;

use super::cache::VerdictCache;
use super::classifier::Classify;
use super::scanner::Scanner;
use super::signal::{signal_channel, SignalReceiver};
use crate::settings::SettingsHandle;

pub struct Builder {
    classifier: Arc<dyn Classify>,
    settings: SettingsHandle,
}

impl Builder {
    #[must_use]
    pub fn new(classifier: Arc<dyn Classify>) -> Self {
        Self {
            classifier,
            settings: SettingsHandle::default(),
        }
    }

    #[must_use]
    pub fn settings(mut self, settings: SettingsHandle) -> Self {
        self.settings = settings;
        self
    }

    /// Builds the coordinator together with the receiving end of its UI
    /// signal channel. Dropping the receiver is fine; signals are then
    /// discarded silently.
    #[must_use]
    pub fn build(self) -> (Scanner, SignalReceiver) {
        let (signals, signal_rx) = signal_channel();
        let cache = VerdictCache::new(self.settings.clone());

        let scanner = Scanner::new(self.classifier, cache, signals, self.settings);

        (scanner, signal_rx)
    }
}
