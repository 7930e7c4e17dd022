use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;

use url_risk_scanner::http_handler;
use url_risk_scanner::model::AppState;
use url_risk_scanner::scanner::{Builder, ClassifierEndpoints, HttpClassifier, SignalReceiver, UiSignal};
use url_risk_scanner::settings::{Settings, SettingsHandle};

#[derive(Debug, Parser)]
pub struct Cli {
    #[clap(long, env)]
    #[clap(default_value = "127.0.0.1:8700")]
    pub listen: SocketAddr,

    /// Base URL of the classification backend.
    #[clap(long, env)]
    #[clap(default_value = "http://localhost:8000")]
    pub classifier_url: String,

    #[clap(long, env)]
    #[clap(default_value = "/api/check-url")]
    pub check_path: String,

    #[clap(long, env)]
    #[clap(default_value = "/api/whitelist")]
    pub allowlist_path: String,

    #[clap(long, env)]
    #[clap(default_value = "/api/blacklist")]
    pub denylist_path: String,

    #[clap(long, env)]
    #[clap(default_value = "/api/report-url")]
    pub report_path: String,

    /// Classifier request timeout in seconds.
    #[clap(long, env)]
    #[clap(default_value_t = 10)]
    pub timeout: u64,

    /// Verdict time-to-live in milliseconds.
    #[clap(long, env)]
    #[clap(default_value_t = 300_000)]
    pub cache_ttl_ms: u64,

    #[clap(long, env)]
    #[clap(default_value_t = 1000)]
    pub cache_max: usize,

    #[clap(long, env)]
    #[clap(default_value_t = 500)]
    pub cache_floor: usize,

    #[clap(long, env)]
    #[clap(default_value_t = 50)]
    pub batch_cap: usize,

    #[clap(long, env)]
    pub disable_notifications: bool,
}

fn setup_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

async fn ui_event_loop(mut signal_rx: SignalReceiver) {
    while let Some(signal) = signal_rx.recv().await {
        match signal {
            UiSignal::ScanStarted { tab } => {
                tracing::debug!("Badge loading tab={tab:?}");
            }
            UiSignal::VerdictResolved { tab, verdict } => {
                tracing::info!("Badge {} tab={tab:?}", verdict.risk);
            }
            UiSignal::ScanFailed { tab, reason } => {
                tracing::warn!("Badge error tab={tab:?}: {reason}");
            }
            UiSignal::ShowPageWarning { tab, verdict } => {
                tracing::warn!(
                    "Page warning tab={tab:?} score={:.0}%",
                    verdict.score * 100.0
                );
            }
            UiSignal::NotifyUser { url, verdict } => {
                let host = url::Url::parse(&url)
                    .ok()
                    .and_then(|u| u.host_str().map(str::to_string))
                    .unwrap_or(url);

                tracing::warn!(
                    "Notification: {host} may be a phishing site, score={:.0}%",
                    verdict.score * 100.0
                );
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let c = Cli::parse();

    setup_logging();

    let settings = SettingsHandle::new(Settings {
        ttl_ms: c.cache_ttl_ms,
        cache_max: c.cache_max,
        cache_floor: c.cache_floor,
        batch_cap: c.batch_cap,
        notifications: !c.disable_notifications,
    });

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(c.timeout))
        .build()
        .context("building http client")?;

    let classifier = HttpClassifier::new(
        client,
        &c.classifier_url,
        ClassifierEndpoints {
            check: c.check_path,
            allow: c.allowlist_path,
            deny: c.denylist_path,
            report: c.report_path,
        },
    );

    match classifier.health().await {
        Ok(()) => tracing::info!("Classifier reachable at {}", c.classifier_url),
        Err(e) => tracing::warn!("Classifier health check failed: {e}"),
    }

    let (scanner, signal_rx) = Builder::new(Arc::new(classifier))
        .settings(settings)
        .build();

    tokio::spawn(ui_event_loop(signal_rx));

    let listener = TcpListener::bind(c.listen)
        .await
        .with_context(|| format!("binding {}", c.listen))?;

    tracing::info!("Listening on {}", c.listen);

    http_handler::run(
        listener,
        AppState {
            scanner: Arc::new(scanner),
        },
    )
    .await
    .context("server error")
}
