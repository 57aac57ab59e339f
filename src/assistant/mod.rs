//! Voice-assistant service surface: request/response types and the HTTP client.

mod error;
mod http;

pub use error::AssistantError;
pub use http::HttpAssistant;

use serde::{Deserialize, Serialize};

const QUALIFIED_FALLBACK: &str = "N/A";
const SUMMARY_FALLBACK: &str = "No summary available";

/// Contact details captured by the form, sent when a call starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
}

impl ContactDetails {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Handle for a call the service accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedCall {
    /// Opaque identifier used to fetch the post-call result.
    pub id: String,
    /// Live-control endpoint advertised by the service, if any.
    pub control_url: Option<String>,
    /// Live event feed advertised by the service, if any.
    pub events_url: Option<String>,
}

/// Post-call result. Every field is optional; the service decides what it fills in.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CallDetails {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub analysis: Option<CallAnalysis>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallAnalysis {
    #[serde(default)]
    pub structured_data: Option<StructuredData>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StructuredData {
    #[serde(default)]
    pub is_qualified: Option<bool>,
}

impl CallDetails {
    pub fn is_qualified(&self) -> Option<bool> {
        self.analysis
            .as_ref()
            .and_then(|analysis| analysis.structured_data.as_ref())
            .and_then(|data| data.is_qualified)
    }

    /// `"true"`, `"false"`, or `"N/A"` when the analysis carries no verdict.
    pub fn qualified_label(&self) -> String {
        self.is_qualified()
            .map(|qualified| qualified.to_string())
            .unwrap_or_else(|| QUALIFIED_FALLBACK.to_string())
    }

    /// Top-level summary, or a fixed placeholder when it is missing or blank.
    pub fn summary_label(&self) -> &str {
        non_empty(&self.summary).unwrap_or(SUMMARY_FALLBACK)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(json: &str) -> CallDetails {
        serde_json::from_str(json).expect("call details json")
    }

    #[rstest]
    #[case(r#"{"summary":"Looks good","analysis":{"structuredData":{"is_qualified":true}}}"#, "true", "Looks good")]
    #[case(r#"{"summary":"Nope","analysis":{"structuredData":{"is_qualified":false}}}"#, "false", "Nope")]
    #[case(r#"{"summary":"Short call"}"#, "N/A", "Short call")]
    #[case(r#"{"analysis":{}}"#, "N/A", "No summary available")]
    #[case(r#"{"analysis":{"structuredData":{}}}"#, "N/A", "No summary available")]
    #[case(r#"{"summary":"","analysis":{"summary":"From analysis"}}"#, "N/A", "No summary available")]
    #[case(r#"{"analysis":{"summary":"X"}}"#, "N/A", "No summary available")]
    #[case(r#"{"id":"c1","status":"ended","cost":0.12}"#, "N/A", "No summary available")]
    fn labels_follow_available_fields(
        #[case] json: &str,
        #[case] qualified: &str,
        #[case] summary: &str,
    ) {
        let details = parse(json);
        assert_eq!(details.qualified_label(), qualified);
        assert_eq!(details.summary_label(), summary);
    }

    #[test]
    fn contact_details_serialize_in_camel_case() {
        let details = ContactDetails {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            phone_number: "+15550100".into(),
        };
        let json = serde_json::to_value(&details).expect("serialize");
        assert_eq!(json["firstName"], "Ada");
        assert_eq!(json["phoneNumber"], "+15550100");
        assert_eq!(details.full_name(), "Ada Lovelace");
    }
}
