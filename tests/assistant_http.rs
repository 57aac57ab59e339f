//! REST client behavior against an in-process service double.

mod common;

use axum::http::StatusCode;
use callterm::assistant::{AssistantError, ContactDetails, HttpAssistant, StartedCall};
use common::{MockService, API_KEY, CALL_ID};
use serde_json::json;

fn contact() -> ContactDetails {
    ContactDetails {
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        email: "ada@example.com".into(),
        phone_number: "+15550100".into(),
    }
}

#[test]
fn start_call_sends_contact_and_returns_call_id() {
    let mock = MockService::start(json!({}));
    let api = HttpAssistant::new(&mock.service_config()).expect("client");
    let call = mock
        .runtime
        .block_on(api.start_call(&contact()))
        .expect("start call");

    assert_eq!(call.id, CALL_ID);
    assert_eq!(
        call.events_url.as_deref(),
        Some(format!("ws://{}/feed", mock.state.addr).as_str())
    );

    let recorded = mock.recorded();
    assert_eq!(recorded.auth_headers, vec![format!("Bearer {API_KEY}")]);
    let body = &recorded.start_bodies[0];
    assert_eq!(body["assistantId"], "asst-1");
    assert_eq!(body["phoneNumberId"], "phone-1");
    assert_eq!(body["customer"]["number"], "+15550100");
    assert_eq!(body["customer"]["name"], "Ada Lovelace");
    let values = &body["assistantOverrides"]["variableValues"];
    assert_eq!(values["firstName"], "Ada");
    assert_eq!(values["lastName"], "Lovelace");
    assert_eq!(values["email"], "ada@example.com");
    assert_eq!(values["phoneNumber"], "+15550100");
}

#[test]
fn rejected_start_surfaces_the_status_code() {
    let mock = MockService::start_with(json!({}), Some(StatusCode::SERVICE_UNAVAILABLE), vec![]);
    let api = HttpAssistant::new(&mock.service_config()).expect("client");
    let err = mock
        .runtime
        .block_on(api.start_call(&contact()))
        .expect_err("start should fail");
    assert_eq!(err.status_code(), Some(503));
    match err {
        AssistantError::Status { body, .. } => assert!(body.contains("assistant unavailable")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn stop_call_posts_end_call_to_the_control_endpoint() {
    let mock = MockService::start(json!({}));
    let api = HttpAssistant::new(&mock.service_config()).expect("client");
    let call = StartedCall {
        id: CALL_ID.into(),
        control_url: None,
        events_url: None,
    };
    mock.runtime
        .block_on(api.stop_call(&call))
        .expect("stop call");
    let recorded = mock.recorded();
    assert_eq!(
        recorded.control_bodies,
        vec![json!({ "id": CALL_ID, "body": { "type": "end-call" } })]
    );
}

#[test]
fn call_details_parse_summary_and_qualification() {
    let mock = MockService::start(json!({
        "id": CALL_ID,
        "summary": "Looks good",
        "analysis": { "structuredData": { "is_qualified": false } },
        "status": "ended"
    }));
    let api = HttpAssistant::new(&mock.service_config()).expect("client");
    let details = mock
        .runtime
        .block_on(api.call_details(CALL_ID))
        .expect("details");
    assert_eq!(details.qualified_label(), "false");
    assert_eq!(details.summary_label(), "Looks good");
    assert_eq!(mock.recorded().details_requests, vec![CALL_ID.to_string()]);
}

#[test]
fn call_details_without_analysis_use_fallback_labels() {
    let mock = MockService::start(json!({ "id": CALL_ID }));
    let api = HttpAssistant::new(&mock.service_config()).expect("client");
    let details = mock
        .runtime
        .block_on(api.call_details(CALL_ID))
        .expect("details");
    assert_eq!(details.qualified_label(), "N/A");
    assert_eq!(details.summary_label(), "No summary available");
}

#[test]
fn unreachable_service_is_a_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("probe");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let mock = MockService::start(json!({}));
    let mut config = mock.service_config();
    config.api_url = reqwest::Url::parse(&format!("http://{addr}/")).expect("url");
    let api = HttpAssistant::new(&config).expect("client");
    let err = mock
        .runtime
        .block_on(api.call_details(CALL_ID))
        .expect_err("should fail");
    assert!(matches!(err, AssistantError::Network(_)), "{err}");
}
