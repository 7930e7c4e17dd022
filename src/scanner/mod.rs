mod builder;
mod cache;
mod classifier;
mod model;
mod scanner;
mod signal;

pub use builder::Builder;
pub use cache::VerdictCache;
pub use classifier::{Classify, ClassifierEndpoints, HttpClassifier};
pub use model::{
    BatchReport, FlaggedLink, ListKind, Risk, ScanContext, ScanError, TabId, Verdict,
};
pub use scanner::Scanner;
pub use signal::{signal_channel, SignalReceiver, SignalSender, UiSignal};
