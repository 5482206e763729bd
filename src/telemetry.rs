// src/telemetry.rs
use metrics::{describe_counter, describe_gauge};
use once_cell::sync::OnceCell;

pub const CYCLES_TOTAL: &str = "relay_cycles_total";
pub const DELIVERIES_TOTAL: &str = "relay_deliveries_total";
pub const DELIVERY_FAILURES_TOTAL: &str = "relay_delivery_failures_total";
pub const CLONES_TOTAL: &str = "relay_clones_total";
pub const FETCH_ERRORS_TOTAL: &str = "news_fetch_errors_total";
pub const ARTICLES_FETCHED_TOTAL: &str = "news_articles_fetched_total";
pub const LAST_CYCLE_TS: &str = "relay_last_cycle_ts";

/// One-time registration so every series carries a description once a recorder is installed.
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(CYCLES_TOTAL, "Completed polling cycles.");
        describe_counter!(DELIVERIES_TOTAL, "Articles delivered to the channel.");
        describe_counter!(
            DELIVERY_FAILURES_TOTAL,
            "Articles whose delivery attempt failed."
        );
        describe_counter!(
            CLONES_TOTAL,
            "Articles skipped because their id was already seen this cycle."
        );
        describe_counter!(
            FETCH_ERRORS_TOTAL,
            "News API requests that yielded no result (HTTP, transport or parse error)."
        );
        describe_counter!(ARTICLES_FETCHED_TOTAL, "Articles parsed from the news API.");
        describe_gauge!(LAST_CYCLE_TS, "Unix ts when the last polling cycle finished.");
    });
}
