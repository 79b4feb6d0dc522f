use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::LocalBoxFuture;
use widget::Runtime;

/// The browser event loop: `setTimeout` for timers and the microtask queue for tasks.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserRuntime;

impl Runtime for BrowserRuntime {
    fn sleep(&self, delay: Duration) -> LocalBoxFuture<'static, ()> {
        // Dropping the future clears the timeout.
        gloo_timers::future::sleep(delay).boxed_local()
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }
}
