use chrono::{ DateTime, Utc };
use serde::{ Serialize, Deserialize };

/// Conversation roles accepted on the wire. Anything else fails
/// deserialization and rejects the whole payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }
}

/// Partial contact record supplied by the client. Free text, never
/// validated beyond shape; an empty record serializes as `{}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl LeadInfo {
    pub fn has_email(&self) -> bool {
        self.email.as_deref().map_or(false, |e| !e.trim().is_empty())
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub lead: LeadInfo,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Payload delivered to the lead webhook. Built only when lead
/// detection fires; ownership passes to the receiver on send.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadNotification {
    pub source: String,
    pub lead: LeadInfo,
    pub raw_reply: String,
    pub when: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_rejects_unknown_values() {
        assert!(serde_json::from_str::<Role>("\"user\"").is_ok());
        assert!(serde_json::from_str::<Role>("\"moderator\"").is_err());
    }

    #[test]
    fn request_defaults_missing_fields() {
        let req: ChatRequest = serde_json::from_str("{}").unwrap();
        assert!(req.messages.is_empty());
        assert_eq!(req.lead, LeadInfo::default());
    }

    #[test]
    fn request_ignores_unknown_fields() {
        let req: ChatRequest = serde_json
            ::from_str(r#"{"messages":[{"role":"user","content":"hi","extra":1}],"sessionId":"x"}"#)
            .unwrap();
        assert_eq!(req.messages.len(), 1);
        assert_eq!(req.messages[0].role, Role::User);
    }

    #[test]
    fn empty_lead_serializes_as_empty_object() {
        let json = serde_json::to_string(&LeadInfo::default()).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn notification_serializes_camel_case_keys() {
        let notification = LeadNotification {
            source: "concierge-agent".into(),
            lead: LeadInfo::default(),
            raw_reply: "write to a@b.com".into(),
            when: Utc::now(),
        };
        let value = serde_json::to_value(&notification).unwrap();
        assert_eq!(value["rawReply"], "write to a@b.com");
        assert!(value.get("raw_reply").is_none());
        assert!(value["when"].is_string());
    }

    #[test]
    fn has_email_ignores_blank_strings() {
        let mut lead = LeadInfo::default();
        assert!(!lead.has_email());
        lead.email = Some("   ".into());
        assert!(!lead.has_email());
        lead.email = Some("a@b.com".into());
        assert!(lead.has_email());
    }
}
