use once_cell::sync::OnceCell;
use std::future::Future;
use tokio::runtime::{Builder, Runtime};

static RUNTIME: OnceCell<Runtime> = OnceCell::new();

fn runtime() -> &'static Runtime {
    RUNTIME.get_or_init(|| {
        Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("failed to start the TDS executor runtime")
    })
}

/// Drives `fut` to completion on the process-wide executor, blocking the
/// calling thread. This is the only way anything in this crate reaches the
/// network; every synchronous entry point funnels through here.
pub fn block_on<F: Future>(fut: F) -> F::Output {
    runtime().block_on(fut)
}

#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn block_on_runs_future_to_completion() {
        assert_eq!(block_on(async { 1 + 1 }), 2);
    }

    #[test]
    fn runtime_is_idempotent_across_calls() {
        let a = block_on(async { 1 });
        let b = block_on(async { 2 });
        assert_eq!(a + b, 3);
    }
}
