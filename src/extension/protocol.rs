use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Decode an explicit `null` the same way as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ─── Inbound activity ───────────────────────────────────────────────

/// Activity name of a messaging-extension search query.
pub const QUERY_ACTIVITY_NAME: &str = "composeExtension/query";

/// Activity type carried by extension invokes.
pub const INVOKE_ACTIVITY_TYPE: &str = "invoke";

/// Incoming activity envelope. Only `name` decides whether the dispatcher handles it.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Activity {
    #[serde(rename = "type", default)]
    pub activity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Correlation id echoed back as `replyToId`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl Activity {
    pub fn is_query(&self) -> bool {
        self.name.as_deref() == Some(QUERY_ACTIVITY_NAME)
    }

    /// Build a query activity around a request body.
    pub fn query(value: Value) -> Self {
        Self {
            activity_type: INVOKE_ACTIVITY_TYPE.to_string(),
            name: Some(QUERY_ACTIVITY_NAME.to_string()),
            id: None,
            value: Some(value),
        }
    }
}

/// Body of a `composeExtension/query` activity.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    /// Empty when absent; an empty id matches no search scope
    #[serde(default, deserialize_with = "null_as_default")]
    pub command_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub parameters: Vec<QueryParameter>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub query_options: QueryOptions,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct QueryParameter {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Value,
}

/// Paging window requested by the client.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueryOptions {
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub skip: Option<u32>,
}

// ─── Outbound response ──────────────────────────────────────────────

pub const RESULT_TYPE: &str = "result";
pub const ATTACHMENT_LAYOUT_LIST: &str = "list";
pub const HERO_CARD_CONTENT_TYPE: &str = "application/vnd.microsoft.card.hero";
pub const THUMBNAIL_CARD_CONTENT_TYPE: &str = "application/vnd.microsoft.card.thumbnail";

/// Invoke response handed back to the transport.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct InvokeResponse {
    pub status: u16,
    pub body: ComposeExtensionResponse,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ComposeExtensionResponse {
    #[serde(rename = "composeExtension")]
    pub compose_extension: ResponseEnvelope,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    #[serde(rename = "type")]
    pub result_type: String,
    #[serde(rename = "attachmentLayout")]
    pub attachment_layout: String,
    pub attachments: Vec<Attachment>,
}

/// One search hit: the full card inserted into the conversation plus the
/// preview card shown in the result list.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Attachment {
    #[serde(rename = "contentType")]
    pub content_type: String,
    pub content: Card,
    pub preview: PreviewAttachment,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PreviewAttachment {
    #[serde(rename = "contentType")]
    pub content_type: String,
    pub content: Card,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Card {
    pub title: String,
    pub text: String,
}

/// One line written by the stdio transport.
#[derive(Serialize, Debug)]
pub struct ReplyLine<B: Serialize> {
    #[serde(rename = "replyToId", skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<String>,
    pub status: u16,
    pub body: B,
}

#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub error: String,
}

// ─── Helper constructors ────────────────────────────────────────────

impl ResponseEnvelope {
    pub fn list(attachments: Vec<Attachment>) -> Self {
        Self {
            result_type: RESULT_TYPE.to_string(),
            attachment_layout: ATTACHMENT_LAYOUT_LIST.to_string(),
            attachments,
        }
    }
}

impl InvokeResponse {
    pub fn ok(envelope: ResponseEnvelope) -> Self {
        Self {
            status: 200,
            body: ComposeExtensionResponse {
                compose_extension: envelope,
            },
        }
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.body.compose_extension.attachments
    }
}

impl ReplyLine<ErrorBody> {
    pub fn error(reply_to_id: Option<String>, status: u16, message: String) -> Self {
        Self {
            reply_to_id,
            status,
            body: ErrorBody { error: message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_query_activity() {
        let json = r#"{"type":"invoke","name":"composeExtension/query","id":"a1","value":{"commandId":"recents","parameters":[{"name":"searchText","value":"vpn"}],"queryOptions":{"count":5,"skip":10}}}"#;
        let activity: Activity = serde_json::from_str(json).unwrap();
        assert!(activity.is_query());
        assert_eq!(activity.id.as_deref(), Some("a1"));

        let req: QueryRequest = serde_json::from_value(activity.value.unwrap()).unwrap();
        assert_eq!(req.command_id, "recents");
        assert_eq!(req.parameters[0].name.as_deref(), Some("searchText"));
        assert_eq!(req.parameters[0].value, json!("vpn"));
        assert_eq!(req.query_options, QueryOptions { count: Some(5), skip: Some(10) });
    }

    #[test]
    fn test_parse_activity_without_name_is_not_query() {
        let activity: Activity = serde_json::from_str(r#"{"type":"message"}"#).unwrap();
        assert!(!activity.is_query());
        assert!(activity.value.is_none());
    }

    #[test]
    fn test_query_request_defaults() {
        let req: QueryRequest = serde_json::from_value(json!({"commandId": "recents"})).unwrap();
        assert!(req.parameters.is_empty());
        assert_eq!(req.query_options, QueryOptions::default());
    }

    #[test]
    fn test_query_request_rejects_negative_count() {
        let res = serde_json::from_value::<QueryRequest>(json!({
            "commandId": "recents",
            "queryOptions": { "count": -1 }
        }));
        assert!(res.is_err());
    }

    #[test]
    fn test_query_request_missing_command_id_is_empty() {
        let req: QueryRequest = serde_json::from_value(json!({"parameters": []})).unwrap();
        assert_eq!(req.command_id, "");
    }

    #[test]
    fn test_query_request_nulls_decode_as_defaults() {
        let req: QueryRequest = serde_json::from_value(json!({
            "commandId": null,
            "parameters": null,
            "queryOptions": null
        }))
        .unwrap();
        assert_eq!(req.command_id, "");
        assert!(req.parameters.is_empty());
        assert_eq!(req.query_options, QueryOptions::default());
    }

    #[test]
    fn test_query_parameter_null_name() {
        let req: QueryRequest = serde_json::from_value(json!({
            "commandId": "recents",
            "parameters": [{ "name": null, "value": "x" }, { "value": "y" }]
        }))
        .unwrap();
        assert!(req.parameters.iter().all(|p| p.name.is_none()));
    }

    #[test]
    fn test_query_request_wrong_shape_still_rejected() {
        assert!(serde_json::from_value::<QueryRequest>(json!({"parameters": "vpn"})).is_err());
        assert!(serde_json::from_value::<QueryRequest>(json!({"queryOptions": {"count": "five"}})).is_err());
        assert!(serde_json::from_value::<QueryRequest>(json!([1, 2])).is_err());
    }

    #[test]
    fn test_invoke_response_format() {
        let card = Card { title: "Jane".to_string(), text: "x".to_string() };
        let resp = InvokeResponse::ok(ResponseEnvelope::list(vec![Attachment {
            content_type: HERO_CARD_CONTENT_TYPE.to_string(),
            content: card.clone(),
            preview: PreviewAttachment {
                content_type: THUMBNAIL_CARD_CONTENT_TYPE.to_string(),
                content: card,
            },
        }]));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["status"], 200);
        let ext = &json["body"]["composeExtension"];
        assert_eq!(ext["type"], "result");
        assert_eq!(ext["attachmentLayout"], "list");
        assert_eq!(ext["attachments"][0]["contentType"], HERO_CARD_CONTENT_TYPE);
        assert_eq!(ext["attachments"][0]["preview"]["contentType"], THUMBNAIL_CARD_CONTENT_TYPE);
        assert_eq!(ext["attachments"][0]["content"]["title"], "Jane");
    }

    #[test]
    fn test_error_reply_line_format() {
        let line = ReplyLine::error(Some("a9".to_string()), 400, "bad body".to_string());
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["replyToId"], "a9");
        assert_eq!(json["status"], 400);
        assert_eq!(json["body"]["error"], "bad body");
    }

    #[test]
    fn test_reply_line_omits_missing_id() {
        let line = ReplyLine::error(None, 500, "boom".to_string());
        let json = serde_json::to_value(&line).unwrap();
        assert!(json.get("replyToId").is_none());
    }
}
