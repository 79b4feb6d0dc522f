//! Deterministic stand-ins for the browser, for use in tests.
//!
//! Nothing here touches a real clock or network: time moves only through
//! [`ManualRuntime::advance`], and validation requests stay pending until the test answers
//! them through [`ScriptedService::take_requests`].

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::task::{Context, Poll, Waker};
use std::time::Duration;

use futures_channel::oneshot;
use futures_executor::{LocalPool, LocalSpawner};
use futures_util::FutureExt;
use futures_util::future::LocalBoxFuture;
use futures_util::task::LocalSpawnExt;
use rustc_hash::FxHashMap;

use crate::error::ServiceError;
use crate::host::{Content, WidgetHost};
use crate::parser::ExpressionParser;
use crate::response::ServiceResponse;
use crate::runtime::Runtime;
use crate::service::ValidationService;
use crate::widget::Capabilities;

struct TimerState {
    deadline: Duration,
    fired: Cell<bool>,
    waker: RefCell<Option<Waker>>,
}

impl TimerState {
    fn fire(&self) {
        self.fired.set(true);
        if let Some(waker) = self.waker.borrow_mut().take() {
            waker.wake();
        }
    }
}

struct Sleep(Rc<TimerState>);

impl Future for Sleep {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0.fired.get() {
            Poll::Ready(())
        } else {
            *self.0.waker.borrow_mut() = Some(cx.waker().clone());
            Poll::Pending
        }
    }
}

/// A single-threaded executor with a virtual clock.
pub struct ManualRuntime {
    pool: RefCell<LocalPool>,
    spawner: LocalSpawner,
    now: Cell<Duration>,
    timers: RefCell<Vec<Weak<TimerState>>>,
}

impl ManualRuntime {
    pub fn new() -> Rc<Self> {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        Rc::new(ManualRuntime {
            pool: RefCell::new(pool),
            spawner,
            now: Cell::new(Duration::ZERO),
            timers: RefCell::new(Vec::new()),
        })
    }

    /// Time elapsed since the runtime was created.
    #[inline]
    pub fn now(&self) -> Duration {
        self.now.get()
    }

    /// Polls every task until none of them can make progress.
    pub fn run_until_stalled(&self) {
        self.pool.borrow_mut().run_until_stalled();
    }

    /// Moves the clock forward by `by` and fires every timer that is due, without running
    /// any task.
    pub fn expire_timers(&self, by: Duration) {
        self.now.set(self.now.get() + by);
        self.fire_due();
    }

    /// Moves the clock forward by `by`, firing timers in deadline order and running tasks
    /// after each step. Timers armed along the way fire too if they fall due within `by`.
    pub fn advance(&self, by: Duration) {
        let target = self.now.get() + by;
        self.run_until_stalled();
        while let Some(deadline) = self.next_deadline().filter(|deadline| *deadline <= target) {
            self.now.set(deadline.max(self.now.get()));
            self.fire_due();
            self.run_until_stalled();
        }
        self.now.set(target);
        self.run_until_stalled();
    }

    /// Number of timers that are armed and have not fired.
    pub fn live_timers(&self) -> usize {
        self.timers
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .filter(|timer| !timer.fired.get())
            .count()
    }

    fn next_deadline(&self) -> Option<Duration> {
        self.timers
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .filter(|timer| !timer.fired.get())
            .map(|timer| timer.deadline)
            .min()
    }

    fn fire_due(&self) {
        let now = self.now.get();
        let due: Vec<_> = {
            let mut timers = self.timers.borrow_mut();
            timers.retain(|timer| timer.upgrade().is_some_and(|timer| !timer.fired.get()));
            timers
                .iter()
                .filter_map(Weak::upgrade)
                .filter(|timer| timer.deadline <= now)
                .collect()
        };
        for timer in due {
            timer.fire();
        }
    }
}

impl Runtime for ManualRuntime {
    fn sleep(&self, delay: Duration) -> LocalBoxFuture<'static, ()> {
        let state = Rc::new(TimerState {
            deadline: self.now.get() + delay,
            fired: Cell::new(false),
            waker: RefCell::new(None),
        });
        self.timers.borrow_mut().push(Rc::downgrade(&state));
        Sleep(state).boxed_local()
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        // Only fails once the pool is gone, and the pool lives as long as `self`.
        let _ = self.spawner.spawn_local(task);
    }
}

type Reply = Result<ServiceResponse, ServiceError>;

/// A validation request waiting for the test to answer it.
#[derive(Debug)]
pub struct ScriptedRequest {
    markup: String,
    responder: oneshot::Sender<Reply>,
}

impl ScriptedRequest {
    #[inline]
    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn respond(self, response: ServiceResponse) {
        let _ = self.responder.send(Ok(response));
    }

    /// Answers with a raw JSON body, as the service would.
    pub fn respond_json(self, body: &str) {
        let reply = serde_json::from_str(body).map_err(ServiceError::from);
        let _ = self.responder.send(reply);
    }

    pub fn fail(self, error: ServiceError) {
        let _ = self.responder.send(Err(error));
    }
}

/// A validation service whose answers are supplied by the test, in any order.
///
/// Dropping an unanswered [`ScriptedRequest`] resolves it with [`ServiceError::Dropped`].
#[derive(Debug, Default)]
pub struct ScriptedService {
    pending: RefCell<Vec<ScriptedRequest>>,
    sent: RefCell<Vec<String>>,
}

impl ScriptedService {
    pub fn new() -> Rc<Self> {
        Rc::new(ScriptedService::default())
    }

    /// Removes and returns every request not yet taken, oldest first.
    pub fn take_requests(&self) -> Vec<ScriptedRequest> {
        mem::take(&mut *self.pending.borrow_mut())
    }

    /// Markup of every request ever sent, oldest first.
    pub fn sent(&self) -> Vec<String> {
        self.sent.borrow().clone()
    }
}

impl ValidationService for ScriptedService {
    fn validate(&self, markup: String) -> LocalBoxFuture<'static, Reply> {
        let (responder, reply) = oneshot::channel();
        self.sent.borrow_mut().push(markup.clone());
        self.pending
            .borrow_mut()
            .push(ScriptedRequest { markup, responder });
        async move { reply.await.unwrap_or(Err(ServiceError::Dropped)) }.boxed_local()
    }
}

/// Owned copy of a [`Content`] written by a widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    Empty,
    Text(String),
    Markup(String),
}

impl From<Content<'_>> for Recorded {
    fn from(content: Content<'_>) -> Self {
        match content {
            Content::Empty => Recorded::Empty,
            Content::Text(text) => Recorded::Text(text.to_owned()),
            Content::Markup(markup) => Recorded::Markup(markup.to_owned()),
        }
    }
}

/// An in-memory page.
#[derive(Debug, Default)]
pub struct RecordingHost {
    inputs: RefCell<FxHashMap<String, String>>,
    fields: RefCell<FxHashMap<String, String>>,
    containers: RefCell<FxHashMap<String, Recorded>>,
    writes: RefCell<Vec<(String, Recorded)>>,
}

impl RecordingHost {
    pub fn new() -> Rc<Self> {
        Rc::new(RecordingHost::default())
    }

    /// Sets the text of an input control, as if the user had typed it.
    pub fn set_input(&self, control_id: &str, value: &str) {
        self.inputs
            .borrow_mut()
            .insert(control_id.to_owned(), value.to_owned());
    }

    pub fn field(&self, field_id: &str) -> Option<String> {
        self.fields.borrow().get(field_id).cloned()
    }

    /// Current content of a container, or `None` if nothing was ever written to it.
    pub fn container(&self, container_id: &str) -> Option<Recorded> {
        self.containers.borrow().get(container_id).cloned()
    }

    /// Every container write so far, in order.
    pub fn writes(&self) -> Vec<(String, Recorded)> {
        self.writes.borrow().clone()
    }

    pub fn clear_writes(&self) {
        self.writes.borrow_mut().clear();
    }
}

impl WidgetHost for RecordingHost {
    fn input_value(&self, control_id: &str) -> String {
        self.inputs
            .borrow()
            .get(control_id)
            .cloned()
            .unwrap_or_default()
    }

    fn set_field_value(&self, field_id: &str, value: &str) {
        self.fields
            .borrow_mut()
            .insert(field_id.to_owned(), value.to_owned());
    }

    fn replace_content(&self, container_id: &str, content: Content<'_>) {
        let recorded = Recorded::from(content);
        self.writes
            .borrow_mut()
            .push((container_id.to_owned(), recorded.clone()));
        self.containers
            .borrow_mut()
            .insert(container_id.to_owned(), recorded);
    }
}

/// A runtime, a service and a host wired together.
pub struct TestBed {
    pub runtime: Rc<ManualRuntime>,
    pub service: Rc<ScriptedService>,
    pub host: Rc<RecordingHost>,
}

impl TestBed {
    pub fn new() -> Self {
        TestBed {
            runtime: ManualRuntime::new(),
            service: ScriptedService::new(),
            host: RecordingHost::new(),
        }
    }

    pub fn capabilities<P>(&self, parser: P) -> Capabilities
    where
        P: ExpressionParser + 'static,
    {
        Capabilities {
            host: self.host.clone(),
            parser: Rc::new(parser),
            service: self.service.clone(),
            runtime: self.runtime.clone(),
        }
    }
}

impl Default for TestBed {
    fn default() -> Self {
        Self::new()
    }
}

/// A successful response carrying `pmath` and `cmath`.
pub fn success(pmath: &str, cmath: &str) -> ServiceResponse {
    ServiceResponse {
        pmath: Some(pmath.to_owned()),
        cmath: Some(cmath.to_owned()),
        ..Default::default()
    }
}

/// A response reporting `errors`.
pub fn failure(errors: &str) -> ServiceResponse {
    ServiceResponse {
        errors: Some(serde_json::Value::String(errors.to_owned())),
        ..Default::default()
    }
}
