//! The six session events and their wire decoding.
//!
//! Frames arrive as JSON text tagged by `type`, e.g.
//! `{"type":"volume-level","volume":0.42}`. Unknown types are skipped so newer
//! services can add events without breaking older clients.

use serde::Deserialize;
use serde_json::Value;

/// One event emitted by the remote call session.
#[derive(Debug, Clone, PartialEq)]
pub enum CallEvent {
    CallStart,
    CallEnd,
    SpeechStart,
    SpeechEnd,
    /// Instantaneous output level, nominally 0.0..=1.0.
    VolumeLevel(f32),
    Error(String),
}

/// One handler per event; `CallEvent::dispatch` routes each variant to its method.
pub trait CallEventHandler {
    fn on_call_start(&mut self);
    fn on_call_end(&mut self);
    fn on_speech_start(&mut self);
    fn on_speech_end(&mut self);
    fn on_volume_level(&mut self, level: f32);
    fn on_error(&mut self, message: &str);
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum WireEvent {
    CallStart,
    CallEnd,
    SpeechStart,
    SpeechEnd,
    VolumeLevel {
        #[serde(alias = "level")]
        volume: f32,
    },
    Error {
        #[serde(default, alias = "message")]
        error: Value,
    },
}

impl CallEvent {
    /// Event name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            CallEvent::CallStart => "call-start",
            CallEvent::CallEnd => "call-end",
            CallEvent::SpeechStart => "speech-start",
            CallEvent::SpeechEnd => "speech-end",
            CallEvent::VolumeLevel(_) => "volume-level",
            CallEvent::Error(_) => "error",
        }
    }

    /// Decode one text frame. Returns `None` for unknown or malformed frames.
    pub fn from_frame(text: &str) -> Option<Self> {
        let wire: WireEvent = serde_json::from_str(text).ok()?;
        Some(match wire {
            WireEvent::CallStart => CallEvent::CallStart,
            WireEvent::CallEnd => CallEvent::CallEnd,
            WireEvent::SpeechStart => CallEvent::SpeechStart,
            WireEvent::SpeechEnd => CallEvent::SpeechEnd,
            WireEvent::VolumeLevel { volume } => CallEvent::VolumeLevel(volume),
            WireEvent::Error { error } => CallEvent::Error(error_text(error)),
        })
    }

    pub fn dispatch<H: CallEventHandler + ?Sized>(&self, handler: &mut H) {
        match self {
            CallEvent::CallStart => handler.on_call_start(),
            CallEvent::CallEnd => handler.on_call_end(),
            CallEvent::SpeechStart => handler.on_speech_start(),
            CallEvent::SpeechEnd => handler.on_speech_end(),
            CallEvent::VolumeLevel(level) => handler.on_volume_level(*level),
            CallEvent::Error(message) => handler.on_error(message),
        }
    }
}

fn error_text(error: Value) -> String {
    match error {
        Value::String(text) => text,
        Value::Null => "unknown session error".to_string(),
        other => other.to_string(),
    }
}
