//! Call screen state: the contact form, live-call flags, and the post-call result.
//!
//! `CallApp` is mounted against a [`CallBackend`] (subscribing to session events) and
//! unmounted exactly once (releasing the subscription and aborting in-flight jobs).
//! The visible [`Phase`] is derived from the flags the session events drive.

use crate::assistant::{AssistantError, CallDetails, StartedCall};
use crate::client::CallBackend;
use crate::contact::ContactForm;
use crate::job::{Job, JobPoll};
use crate::session::{CallEventHandler, Subscription};
use crate::{log_debug, log_debug_content};

/// Which panel the screen shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Contact form.
    Idle,
    /// Start requested; waiting for the session to report `call-start`.
    Starting,
    /// Call in progress.
    Active,
    /// Stop requested; waiting for the call result.
    Ending,
    /// Result on screen.
    Resulted,
}

pub struct CallApp<'a> {
    backend: &'a dyn CallBackend,
    subscription: Option<Subscription>,
    form: ContactForm,
    started: bool,
    loading: bool,
    assistant_is_speaking: bool,
    volume_level: f32,
    loading_result: bool,
    call: Option<StartedCall>,
    /// Stop pressed before the start response carried a call id; hang up once it does.
    hang_up_on_start: bool,
    result: Option<CallDetails>,
    start_job: Option<Job<Result<StartedCall, AssistantError>>>,
    stop_job: Option<Job<Result<(), AssistantError>>>,
    fetch_job: Option<Job<Result<CallDetails, AssistantError>>>,
    status: String,
    redraw: bool,
}

const STATUS_READY: &str = "Fill in all four fields, then press Enter to start the call.";

impl<'a> CallApp<'a> {
    /// Subscribe to session events and show the empty form.
    pub fn mount(backend: &'a dyn CallBackend) -> Self {
        log_debug("call screen mounted");
        Self {
            backend,
            subscription: Some(backend.subscribe()),
            form: ContactForm::new(),
            started: false,
            loading: false,
            assistant_is_speaking: false,
            volume_level: 0.0,
            loading_result: false,
            call: None,
            hang_up_on_start: false,
            result: None,
            start_job: None,
            stop_job: None,
            fetch_job: None,
            status: STATUS_READY.to_string(),
            redraw: true,
        }
    }

    /// Release the event subscription and abort every in-flight request. Idempotent.
    pub fn unmount(&mut self) {
        if self.subscription.take().is_none() {
            return;
        }
        self.start_job = None;
        self.stop_job = None;
        self.fetch_job = None;
        log_debug("call screen unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn phase(&self) -> Phase {
        if self.result.is_some() {
            Phase::Resulted
        } else if self.loading_result {
            Phase::Ending
        } else if self.started {
            Phase::Active
        } else if self.loading {
            Phase::Starting
        } else {
            Phase::Idle
        }
    }

    pub fn form(&self) -> &ContactForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ContactForm {
        self.redraw = true;
        &mut self.form
    }

    /// Idle, complete form, and no earlier start request still in flight.
    pub fn can_start(&self) -> bool {
        self.phase() == Phase::Idle && self.start_job.is_none() && self.form.is_complete()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_loading_result(&self) -> bool {
        self.loading_result
    }

    pub fn assistant_is_speaking(&self) -> bool {
        self.assistant_is_speaking
    }

    pub fn volume_level(&self) -> f32 {
        self.volume_level
    }

    pub fn call_id(&self) -> Option<&str> {
        self.call.as_ref().map(|call| call.id.as_str())
    }

    pub fn result(&self) -> Option<&CallDetails> {
        self.result.as_ref()
    }

    pub fn status_text(&self) -> &str {
        &self.status
    }

    pub fn has_pending_work(&self) -> bool {
        self.start_job.is_some() || self.fetch_job.is_some() || self.stop_job.is_some()
    }

    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }

    fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        self.redraw = true;
    }

    /// Request a new call. Ignored unless the form is showing and complete.
    pub fn start(&mut self) -> bool {
        if !self.is_mounted() || !self.can_start() {
            return false;
        }
        let details = self.form.details();
        log_debug("starting assistant call");
        log_debug_content(&format!(
            "call target: {} <{}> {}",
            details.full_name(),
            details.email,
            details.phone_number
        ));
        self.loading = true;
        self.call = None;
        self.hang_up_on_start = false;
        self.start_job = Some(self.backend.start_call(details));
        self.set_status("Starting call...");
        true
    }

    /// End the active call and fetch its result. Ignored outside the active phase.
    pub fn stop(&mut self) -> bool {
        if !self.is_mounted() || self.phase() != Phase::Active {
            return false;
        }
        let Some(call) = self.call.clone() else {
            // call-start can beat the start response; hang up as soon as the id arrives.
            log_debug("stop requested before the start response arrived; deferring hang-up");
            self.started = false;
            self.hang_up_on_start = self.start_job.is_some();
            self.set_status("Ending call...");
            return true;
        };
        log_debug(&format!("stopping call {}", call.id));
        self.stop_job = Some(self.backend.stop_call(&call));
        self.loading_result = true;
        self.fetch_job = Some(self.backend.fetch_call_details(&call.id));
        self.set_status("Loading call details... please wait");
        true
    }

    /// Leave the results panel and go back to the form (values kept).
    pub fn new_call(&mut self) -> bool {
        if self.phase() != Phase::Resulted {
            return false;
        }
        self.result = None;
        self.call = None;
        self.assistant_is_speaking = false;
        self.volume_level = 0.0;
        self.set_status(STATUS_READY);
        true
    }

    /// Drain session events and finished jobs into state. Returns true when anything changed.
    pub fn poll(&mut self) -> bool {
        let Some(subscription) = self.subscription.as_ref() else {
            return false;
        };
        let events = subscription.drain();
        let mut changed = !events.is_empty();
        for event in &events {
            event.dispatch(self);
        }
        changed |= self.poll_start_job();
        changed |= self.poll_stop_job();
        changed |= self.poll_fetch_job();
        if changed {
            self.redraw = true;
        }
        changed
    }

    fn poll_start_job(&mut self) -> bool {
        let outcome = match self.start_job.as_ref() {
            Some(job) => job.poll(),
            None => return false,
        };
        let result = match outcome {
            JobPoll::Pending => return false,
            JobPoll::Ready(result) => result,
            JobPoll::Lost => Err(AssistantError::Aborted),
        };
        self.start_job = None;
        match result {
            Ok(call) => {
                log_debug(&format!("call accepted with id {}", call.id));
                if std::mem::take(&mut self.hang_up_on_start) {
                    log_debug(&format!("hanging up call {} stopped before it was accepted", call.id));
                    self.stop_job = Some(self.backend.stop_call(&call));
                    self.set_status(STATUS_READY);
                }
                self.call = Some(call);
                if self.phase() == Phase::Starting {
                    self.set_status("Dialing... waiting for the call to connect.");
                }
            }
            Err(err) => {
                log_debug(&format!("Error starting assistant: {err}"));
                self.hang_up_on_start = false;
                self.loading = false;
                self.set_status(STATUS_READY);
            }
        }
        true
    }

    fn poll_stop_job(&mut self) -> bool {
        let outcome = match self.stop_job.as_ref() {
            Some(job) => job.poll(),
            None => return false,
        };
        match outcome {
            JobPoll::Pending => false,
            JobPoll::Ready(Ok(())) => {
                self.stop_job = None;
                false
            }
            JobPoll::Ready(Err(err)) => {
                log_debug(&format!("Error stopping assistant: {err}"));
                self.stop_job = None;
                false
            }
            JobPoll::Lost => {
                self.stop_job = None;
                false
            }
        }
    }

    fn poll_fetch_job(&mut self) -> bool {
        let outcome = match self.fetch_job.as_ref() {
            Some(job) => job.poll(),
            None => return false,
        };
        let result = match outcome {
            JobPoll::Pending => return false,
            JobPoll::Ready(result) => result,
            JobPoll::Lost => Err(AssistantError::Aborted),
        };
        self.fetch_job = None;
        self.loading_result = false;
        match result {
            Ok(details) => {
                self.result = Some(details);
                self.set_status("Call finished. Press Enter to start another call.");
            }
            Err(err) => {
                log_debug(&format!("Error getting call details: {err}"));
                self.set_status(STATUS_READY);
            }
        }
        true
    }
}

impl CallEventHandler for CallApp<'_> {
    fn on_call_start(&mut self) {
        log_debug("session event: call-start");
        self.loading = false;
        self.started = true;
        self.loading_result = false;
        self.fetch_job = None;
        self.result = None;
        self.set_status("Call in progress. Press Enter to end the call.");
    }

    fn on_call_end(&mut self) {
        log_debug("session event: call-end");
        self.started = false;
        self.loading = false;
        self.assistant_is_speaking = false;
        self.volume_level = 0.0;
        if self.phase() == Phase::Idle {
            self.set_status(STATUS_READY);
        }
    }

    fn on_speech_start(&mut self) {
        self.assistant_is_speaking = true;
    }

    fn on_speech_end(&mut self) {
        self.assistant_is_speaking = false;
    }

    fn on_volume_level(&mut self, level: f32) {
        self.volume_level = level;
    }

    fn on_error(&mut self, message: &str) {
        log_debug(&format!("session error: {message}"));
        self.loading = false;
        self.started = false;
        self.loading_result = false;
        self.assistant_is_speaking = false;
        self.volume_level = 0.0;
        self.start_job = None;
        self.hang_up_on_start = false;
        self.fetch_job = None;
        self.result = None;
        self.set_status(STATUS_READY);
    }
}

impl Drop for CallApp<'_> {
    fn drop(&mut self) {
        self.unmount();
    }
}
