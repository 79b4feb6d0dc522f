use std::time::Duration;

use futures_util::future::LocalBoxFuture;

/// The event loop a widget runs on.
///
/// Widgets never block: they hand timers and response handlers to the runtime and return.
/// In the browser this is backed by `setTimeout` and the microtask queue; tests use
/// [`ManualRuntime`](crate::testing::ManualRuntime), which only moves time forward when
/// told to.
pub trait Runtime {
    /// A future that completes once `delay` has elapsed.
    ///
    /// Dropping the future before it completes must release the underlying timer.
    fn sleep(&self, delay: Duration) -> LocalBoxFuture<'static, ()>;

    /// Runs `task` to completion on the current thread, detached from the caller.
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
}
