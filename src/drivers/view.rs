use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Lifetime of the view that started a driver.
/// Dropping the scope tears the view down and cancels every token it handed out.
pub struct ViewScope {
    cancelled: Arc<AtomicBool>,
    name: &'static str,
}

impl ViewScope {
    pub fn enter(name: &'static str) -> Self {
        tracing::trace!(view = name, "View mounted");
        ViewScope {
            cancelled: Arc::new(AtomicBool::new(false)),
            name,
        }
    }

    /// Token for one driver invocation
    pub fn token(&self) -> ViewToken {
        ViewToken {
            cancelled: Arc::clone(&self.cancelled),
        }
    }

    /// Tear down the view while keeping the scope value around
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            tracing::debug!(view = self.name, "View torn down");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Liveness flag checked by a driver before each mutation that follows an await
#[derive(Clone, Debug)]
pub struct ViewToken {
    cancelled: Arc<AtomicBool>,
}

impl ViewToken {
    /// Token that is never cancelled, for callers without a view
    pub fn detached() -> Self {
        ViewToken {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn is_live(&self) -> bool {
        !self.is_cancelled()
    }
}
