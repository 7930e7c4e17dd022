use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::model::{TabId, Verdict};

/// Side effects the UI layer renders: badge states, the in-page warning
/// overlay, and desktop notifications.
#[derive(Debug, Clone)]
pub enum UiSignal {
    ScanStarted {
        tab: Option<TabId>,
    },
    VerdictResolved {
        tab: Option<TabId>,
        verdict: Verdict,
    },
    ScanFailed {
        tab: Option<TabId>,
        reason: String,
    },
    ShowPageWarning {
        tab: Option<TabId>,
        verdict: Verdict,
    },
    NotifyUser {
        url: String,
        verdict: Verdict,
    },
}

pub type SignalReceiver = UnboundedReceiver<UiSignal>;

#[derive(Debug, Clone)]
pub struct SignalSender {
    tx: UnboundedSender<UiSignal>,
}

impl SignalSender {
    /// A scan may outlive its consumer; emission into a closed channel is
    /// dropped, never an error.
    pub fn emit(&self, signal: UiSignal) {
        let _ = self.tx.send(signal);
    }
}

pub fn signal_channel() -> (SignalSender, SignalReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();

    (SignalSender { tx }, rx)
}
