//! Live call-session events: the typed event set, an on/off subscriber bus, and the
//! WebSocket feed that fills it.

mod bus;
mod events;
mod feed;

pub use bus::{SessionEvents, Subscription};
pub use events::{CallEvent, CallEventHandler};
pub(crate) use feed::run_event_feed;
