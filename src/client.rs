//! The service client as an owned resource: created once at startup, handed to the UI
//! by reference, and shut down explicitly at exit.

use crate::assistant::{AssistantError, CallDetails, ContactDetails, HttpAssistant, StartedCall};
use crate::config::{EventsUrlTemplate, ServiceConfig};
use crate::job::Job;
use crate::lock_or_recover;
use crate::session::{run_event_feed, SessionEvents, Subscription};
use anyhow::{Context, Result};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};
use tokio::task::AbortHandle;
use tracing::info;

const RUNTIME_WORKERS: usize = 2;
const SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(500);

/// Operations the call screen needs from the outside world.
///
/// Every network operation returns a [`Job`] the caller polls; dropping the job
/// aborts the request.
pub trait CallBackend {
    fn subscribe(&self) -> Subscription;
    fn start_call(&self, contact: ContactDetails) -> Job<Result<StartedCall, AssistantError>>;
    fn stop_call(&self, call: &StartedCall) -> Job<Result<(), AssistantError>>;
    fn fetch_call_details(&self, call_id: &str) -> Job<Result<CallDetails, AssistantError>>;
}

pub struct CallClient {
    runtime: Runtime,
    api: Arc<HttpAssistant>,
    events: SessionEvents,
    events_url: EventsUrlTemplate,
    feed: Arc<Mutex<Option<AbortHandle>>>,
}

impl CallClient {
    /// Start the I/O runtime and HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime or the HTTP client cannot be built.
    pub fn init(config: &ServiceConfig) -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(RUNTIME_WORKERS)
            .thread_name("callterm-io")
            .enable_all()
            .build()
            .context("failed to start I/O runtime")?;
        let api = HttpAssistant::new(config).context("failed to build HTTP client")?;
        info!(api_url = %config.api_url, "call client ready");
        Ok(Self {
            runtime,
            api: Arc::new(api),
            events: SessionEvents::new(),
            events_url: config.events_url.clone(),
            feed: Arc::new(Mutex::new(None)),
        })
    }

    /// The bus the live event feed publishes into.
    pub fn events(&self) -> &SessionEvents {
        &self.events
    }

    /// Stop the live feed and the runtime. Outstanding jobs are aborted.
    pub fn shutdown(self) {
        detach_feed(&self.feed);
        self.runtime.shutdown_timeout(SHUTDOWN_TIMEOUT);
        crate::log_debug("call client shut down");
    }
}

impl CallBackend for CallClient {
    fn subscribe(&self) -> Subscription {
        self.events.subscribe()
    }

    fn start_call(&self, contact: ContactDetails) -> Job<Result<StartedCall, AssistantError>> {
        let api = Arc::clone(&self.api);
        let events = self.events.clone();
        let feed = Arc::clone(&self.feed);
        let template = self.events_url.clone();
        let handle = self.runtime.handle().clone();
        Job::spawn(self.runtime.handle(), "start-call", async move {
            let call = api.start_call(&contact).await?;
            let url = call
                .events_url
                .clone()
                .unwrap_or_else(|| template.for_call(&call.id));
            let task = handle.spawn(run_event_feed(url, events));
            attach_feed(&feed, task.abort_handle());
            Ok::<_, AssistantError>(call)
        })
    }

    fn stop_call(&self, call: &StartedCall) -> Job<Result<(), AssistantError>> {
        let api = Arc::clone(&self.api);
        let call = call.clone();
        Job::spawn(self.runtime.handle(), "stop-call", async move {
            api.stop_call(&call).await
        })
    }

    fn fetch_call_details(&self, call_id: &str) -> Job<Result<CallDetails, AssistantError>> {
        let api = Arc::clone(&self.api);
        let call_id = call_id.to_string();
        Job::spawn(self.runtime.handle(), "fetch-call-details", async move {
            api.call_details(&call_id).await
        })
    }
}

/// One feed at a time: a new call replaces (and aborts) the previous call's feed.
fn attach_feed(slot: &Mutex<Option<AbortHandle>>, task: AbortHandle) {
    let previous = lock_or_recover(slot, "client::attach_feed").replace(task);
    if let Some(previous) = previous {
        previous.abort();
    }
}

fn detach_feed(slot: &Mutex<Option<AbortHandle>>) {
    if let Some(task) = lock_or_recover(slot, "client::detach_feed").take() {
        task.abort();
    }
}
