use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A garden entry tracked by the app.
///
/// Field names follow the web client's camelCase layout so lists written by
/// either side stay readable. Timestamps round-trip as RFC 3339 strings and
/// come back as `OffsetDateTime`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plant {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub planted_date: Option<OffsetDateTime>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub last_watered: Option<OffsetDateTime>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub last_fertilized: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Plant {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            species: None,
            planted_date: None,
            last_watered: None,
            last_fertilized: None,
            notes: None,
            location: None,
        }
    }
}

/// Body of `POST /analyze_landscaping`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerateArgs {
    /// Base64 image of the site before the work.
    pub before_image: String,
    /// First "after" image, sent as `null` when none was supplied.
    pub after_image: Option<String>,
    /// Newline separated task list.
    pub requested_tasks: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contractor_accomplishments: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportResponse {
    /// Full markdown report.
    pub report: String,
    pub before_analysis_text: String,
    pub original_tasks_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contractor_accomplishments_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One prior chat message.
///
/// The backend accepts any role name, so it stays a plain string; `user` and
/// `assistant` are the ones the app itself produces.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: String,
    pub message: String,
}

impl ConversationTurn {
    pub const USER: &'static str = "user";
    pub const ASSISTANT: &'static str = "assistant";

    pub fn new(role: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            message: message.into(),
        }
    }

    pub fn user(message: impl Into<String>) -> Self {
        Self::new(Self::USER, message)
    }

    pub fn assistant(message: impl Into<String>) -> Self {
        Self::new(Self::ASSISTANT, message)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_analysis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_tasks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contractor_accomplishments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_report: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_history: Option<Vec<ConversationTurn>>,
}

impl ChatContext {
    /// Context carrying everything a previous analysis produced.
    pub fn from_report(report: &ReportResponse) -> Self {
        Self {
            before_analysis: Some(report.before_analysis_text.clone()),
            original_tasks: Some(report.original_tasks_text.clone()),
            contractor_accomplishments: report.contractor_accomplishments_text.clone(),
            full_report: Some(report.report.clone()),
            conversation_history: None,
        }
    }
}

/// Body of `POST /chat_query`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatQueryArgs {
    pub user_question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_image: Option<String>,
    pub context: ChatContext,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatQueryResponse {
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
