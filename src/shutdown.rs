//! Process-wide stop flag shared between the OS signal listener and the relay loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Signalled,
    TimedOut,
}

#[derive(Debug, Default)]
struct Inner {
    flag: AtomicBool,
    notify: Notify,
}

/// Cloneable handle; every clone observes the same flag.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    inner: Arc<Inner>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag and wake every pending `wait`. Repeated calls are no-ops.
    pub fn signal(&self) {
        if !self.inner.flag.swap(true, Ordering::SeqCst) {
            self.inner.notify.notify_waiters();
        }
    }

    pub fn is_set(&self) -> bool {
        self.inner.flag.load(Ordering::SeqCst)
    }

    /// Sleep for `timeout` or until `signal()` is called, whichever comes first.
    pub async fn wait(&self, timeout: Duration) -> WaitOutcome {
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        // register before re-checking the flag so a concurrent signal() cannot slip between
        notified.as_mut().enable();

        if self.is_set() {
            return WaitOutcome::Signalled;
        }

        tokio::select! {
            _ = &mut notified => WaitOutcome::Signalled,
            _ = tokio::time::sleep(timeout) => {
                if self.is_set() {
                    WaitOutcome::Signalled
                } else {
                    WaitOutcome::TimedOut
                }
            }
        }
    }
}

/// Map SIGINT and (on unix) SIGTERM onto `shutdown.signal()`.
/// On unix both handlers are installed before this returns, so a signal sent right
/// after startup is never handled by the default disposition.
#[cfg(unix)]
pub fn spawn_signal_listener(shutdown: Shutdown) -> JoinHandle<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())
        .map_err(|e| warn!(target: "shutdown", error = %e, "cannot install SIGINT handler"))
        .ok();
    let mut terminate = signal(SignalKind::terminate())
        .map_err(|e| warn!(target: "shutdown", error = %e, "cannot install SIGTERM handler"))
        .ok();

    tokio::spawn(async move {
        let name = tokio::select! {
            Some(_) = recv_or_pending(interrupt.as_mut()) => "SIGINT",
            Some(_) = recv_or_pending(terminate.as_mut()) => "SIGTERM",
            else => return,
        };
        info!(target: "shutdown", signal = name, "termination signal received");
        shutdown.signal();
    })
}

#[cfg(unix)]
async fn recv_or_pending(sig: Option<&mut tokio::signal::unix::Signal>) -> Option<()> {
    match sig {
        Some(s) => s.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(not(unix))]
pub fn spawn_signal_listener(shutdown: Shutdown) -> JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!(target: "shutdown", signal = "ctrl-c", "termination signal received");
                shutdown.signal();
            }
            Err(e) => warn!(target: "shutdown", error = %e, "cannot listen for ctrl-c"),
        }
    })
}
