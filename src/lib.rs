// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod deliver;
pub mod logging;
pub mod news;
pub mod relay;
pub mod shutdown;
pub mod telemetry;
pub mod window;

// ---- Re-exports for stable public API ----
pub use crate::config::{AppConfig, Secret};
pub use crate::deliver::{Delivery, TelegramDelivery};
pub use crate::news::{Article, GNewsClient, NewsResult, NewsSource};
pub use crate::relay::{CycleReport, Relay, RelaySettings, SeenIds};
pub use crate::shutdown::{Shutdown, WaitOutcome};
pub use crate::window::{Clock, FixedClock, SystemClock, TimeWindow};
