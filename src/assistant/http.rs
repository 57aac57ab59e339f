//! REST client for the voice-assistant service (start call, end call, fetch result).

use super::{AssistantError, CallDetails, ContactDetails, StartedCall};
use crate::config::ServiceConfig;
use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Error bodies are clipped before they land in logs or the status line.
const MAX_ERROR_BODY_CHARS: usize = 300;

/// Thin async wrapper over the service's REST endpoints.
#[derive(Debug, Clone)]
pub struct HttpAssistant {
    client: Client,
    base_url: Url,
    api_key: String,
    assistant_id: String,
    phone_number_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StartCallRequest<'a> {
    assistant_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone_number_id: Option<&'a str>,
    customer: Customer<'a>,
    assistant_overrides: AssistantOverrides<'a>,
}

#[derive(Serialize)]
struct Customer<'a> {
    number: &'a str,
    name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AssistantOverrides<'a> {
    variable_values: &'a ContactDetails,
}

#[derive(Deserialize)]
struct StartCallResponse {
    id: String,
    #[serde(default)]
    monitor: Option<Monitor>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Monitor {
    #[serde(default)]
    control_url: Option<String>,
    #[serde(default)]
    events_url: Option<String>,
}

#[derive(Serialize)]
struct ControlMessage {
    #[serde(rename = "type")]
    kind: &'static str,
}

impl HttpAssistant {
    /// Build a client with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new(config: &ServiceConfig) -> Result<Self, AssistantError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("callterm/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            assistant_id: config.assistant_id.clone(),
            phone_number_id: config.phone_number_id.clone(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, AssistantError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| AssistantError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Ask the service to place a call to `contact`; resolves once the call is accepted.
    pub async fn start_call(&self, contact: &ContactDetails) -> Result<StartedCall, AssistantError> {
        let url = self.endpoint(&["call"])?;
        let body = StartCallRequest {
            assistant_id: &self.assistant_id,
            phone_number_id: self.phone_number_id.as_deref(),
            customer: Customer {
                number: &contact.phone_number,
                name: contact.full_name(),
            },
            assistant_overrides: AssistantOverrides {
                variable_values: contact,
            },
        };
        debug!(%url, "starting call");
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let response: StartCallResponse = ensure_success(response).await?.json().await?;
        if response.id.trim().is_empty() {
            return Err(AssistantError::Decode("start call response has empty id".into()));
        }
        let monitor = response.monitor.unwrap_or_default();
        info!(call_id = %response.id, "call accepted");
        Ok(StartedCall {
            id: response.id,
            control_url: monitor.control_url,
            events_url: monitor.events_url,
        })
    }

    /// Ask the service to hang up. Uses the advertised control URL when there is one.
    pub async fn stop_call(&self, call: &StartedCall) -> Result<(), AssistantError> {
        let url = match &call.control_url {
            Some(raw) => {
                Url::parse(raw).map_err(|err| AssistantError::InvalidUrl(format!("{raw}: {err}")))?
            }
            None => self.endpoint(&["call", &call.id, "control"])?,
        };
        debug!(call_id = %call.id, %url, "ending call");
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&ControlMessage { kind: "end-call" })
            .send()
            .await?;
        ensure_success(response).await?;
        info!(call_id = %call.id, "end-call accepted");
        Ok(())
    }

    /// Fetch the post-call summary and analysis.
    pub async fn call_details(&self, call_id: &str) -> Result<CallDetails, AssistantError> {
        let url = self.endpoint(&["call", call_id])?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let text = ensure_success(response).await?.text().await?;
        let details: CallDetails =
            serde_json::from_str(&text).map_err(|err| AssistantError::Decode(err.to_string()))?;
        info!(
            call_id,
            qualified = ?details.is_qualified(),
            has_summary = details.summary.is_some(),
            "call details received"
        );
        Ok(details)
    }
}

async fn ensure_success(response: Response) -> Result<Response, AssistantError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let body: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
    warn!(status = status.as_u16(), "service request failed");
    Err(AssistantError::Status {
        status: status.as_u16(),
        body,
    })
}
