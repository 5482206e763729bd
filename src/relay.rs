//! # Relay loop
//! Drives fetch → dedup → deliver cycles over the configured categories and
//! sleeps between cycles until the period elapses or shutdown is signalled.
//!
//! Failure policy: a category whose fetch yields nothing is skipped for this cycle,
//! a failed delivery is logged and the next article is tried. Only the shutdown
//! signal ends the loop; the delivery session is closed exactly once on the way out.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, gauge};
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::deliver::Delivery;
use crate::news::NewsSource;
use crate::shutdown::{Shutdown, WaitOutcome};
use crate::telemetry::{
    ensure_metrics_described, CLONES_TOTAL, CYCLES_TOTAL, DELIVERIES_TOTAL,
    DELIVERY_FAILURES_TOTAL, LAST_CYCLE_TS,
};
use crate::window::{Clock, SystemClock, TimeWindow};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaySettings {
    pub categories: Vec<String>,
    pub delay_hours: u32,
    pub period_hours: u32,
    /// Pause before every delivery attempt.
    pub pace: Duration,
}

impl RelaySettings {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            categories: cfg.news_categories.clone(),
            delay_hours: cfg.news_delay_hours,
            period_hours: cfg.news_period_hours,
            pace: cfg.delivery_pace(),
        }
    }

    pub fn period(&self) -> Duration {
        Duration::from_secs(u64::from(self.period_hours) * 3600)
    }
}

/// Article ids seen during one cycle. Empty ids carry no identity and are never
/// reported as duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenIds {
    ids: HashSet<String>,
}

impl SeenIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `id`; returns `false` if it was already recorded this cycle.
    pub fn insert(&mut self, id: &str) -> bool {
        if id.is_empty() {
            return true;
        }
        self.ids.insert(id.to_string())
    }

    pub fn contains(&self, id: &str) -> bool {
        !id.is_empty() && self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub delivered: usize,
    pub failed: usize,
    pub clones: usize,
    pub skipped_categories: Vec<String>,
    pub seen: SeenIds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Running,
    Stopping,
}

pub struct Relay {
    settings: RelaySettings,
    source: Arc<dyn NewsSource>,
    delivery: Arc<dyn Delivery>,
    shutdown: Shutdown,
    clock: Arc<dyn Clock>,
}

impl Relay {
    pub fn new(
        settings: RelaySettings,
        source: Arc<dyn NewsSource>,
        delivery: Arc<dyn Delivery>,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            settings,
            source,
            delivery,
            shutdown,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> &RelaySettings {
        &self.settings
    }

    fn state(&self) -> RelayState {
        if self.shutdown.is_set() {
            RelayState::Stopping
        } else {
            RelayState::Running
        }
    }

    /// One pass over every category. Never fails; problems end up in the report.
    pub async fn run_cycle(&self) -> CycleReport {
        ensure_metrics_described();
        let mut report = CycleReport::default();

        for category in &self.settings.categories {
            info!(target: "relay", category = %category, "processing category");

            let window = TimeWindow::compute(
                self.clock.as_ref(),
                self.settings.delay_hours,
                self.settings.period_hours,
            );
            let Some(news) = self.source.fetch_category(category, &window).await else {
                warn!(
                    target: "relay",
                    category = %category,
                    source = self.source.name(),
                    "no news this cycle, skipping category"
                );
                report.skipped_categories.push(category.clone());
                continue;
            };

            for article in &news.articles {
                if !report.seen.insert(&article.id) {
                    info!(target: "relay", id = %article.id, "article is a clone, skipping");
                    counter!(CLONES_TOTAL).increment(1);
                    report.clones += 1;
                    continue;
                }
                info!(target: "relay", id = %article.id, category = %category, "new article found");

                if !self.settings.pace.is_zero() {
                    tokio::time::sleep(self.settings.pace).await;
                }

                if self.delivery.deliver(article).await {
                    info!(target: "relay", id = %article.id, "article delivered");
                    counter!(DELIVERIES_TOTAL).increment(1);
                    report.delivered += 1;
                } else {
                    error!(target: "relay", id = %article.id, "article delivery failed");
                    counter!(DELIVERY_FAILURES_TOTAL).increment(1);
                    report.failed += 1;
                }
            }
        }

        counter!(CYCLES_TOTAL).increment(1);
        gauge!(LAST_CYCLE_TS).set(self.clock.now().timestamp() as f64);
        report
    }

    /// Loop until shutdown. Returns the number of completed cycles.
    pub async fn run(&self) -> u64 {
        let period = self.settings.period();
        let mut cycles = 0u64;
        info!(target: "relay", timeout_secs = period.as_secs(), "entering main loop");

        while self.state() == RelayState::Running {
            let report = self.run_cycle().await;
            cycles += 1;
            info!(
                target: "relay",
                cycle = cycles,
                delivered = report.delivered,
                failed = report.failed,
                clones = report.clones,
                skipped = report.skipped_categories.len(),
                "cycle finished"
            );

            info!(target: "relay", secs = period.as_secs(), "main loop is going to sleep");
            match self.shutdown.wait(period).await {
                WaitOutcome::Signalled => info!(target: "relay", "sleep interrupted by shutdown"),
                WaitOutcome::TimedOut => debug!(target: "relay", "sleep elapsed"),
            }
        }

        info!(target: "relay", cycles, "exiting main loop");
        self.delivery.shutdown().await;
        cycles
    }
}
