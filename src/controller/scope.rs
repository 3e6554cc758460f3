use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

/// Lifetime of a controller. Once torn down, results of in-flight and later
/// operations are dropped instead of being applied.
#[derive(Debug)]
pub struct Scope {
    closed: Arc<watch::Sender<bool>>,
}

/// Detached handle that closes a [`Scope`] from elsewhere, e.g. when the view
/// that owns the controller goes away mid-request.
#[derive(Debug, Clone)]
pub struct Teardown {
    closed: Arc<watch::Sender<bool>>,
}

impl Teardown {
    pub fn fire(&self) {
        self.closed.send_replace(true);
    }
}

impl Scope {
    pub fn new() -> Self {
        let (closed, _) = watch::channel(false);
        Scope {
            closed: Arc::new(closed),
        }
    }

    pub fn handle(&self) -> Teardown {
        Teardown {
            closed: Arc::clone(&self.closed),
        }
    }

    pub fn close(&self) {
        self.closed.send_replace(true);
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Runs `fut` unless the scope closes first. `None` means the result must
    /// be ignored.
    pub async fn guard<F: Future>(&self, fut: F) -> Option<F::Output> {
        let mut closed = self.closed.subscribe();
        if *closed.borrow_and_update() {
            return None;
        }

        let output = tokio::select! {
            output = fut => Some(output),
            _ = closed.wait_for(|closed| *closed) => None,
        };
        output.filter(|_| !self.is_closed())
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}
