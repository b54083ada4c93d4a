//! Bot API response envelope.
//!
//! Every Bot API method answers with the same JSON object, whatever the HTTP
//! status:
//!
//! ```json
//! { "ok": false, "error_code": 429, "description": "Too Many Requests: retry after 35",
//!   "parameters": { "retry_after": 35 } }
//! ```

use crate::chat::{Message, MessageId};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde::Deserialize;
use serde::de::DeserializeOwned;

const TOO_MANY_REQUESTS: i64 = 429;

#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    error_code: Option<i64>,
    description: Option<String>,
    parameters: Option<ResponseParameters>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseParameters {
    retry_after: Option<u64>,
}

impl<T: DeserializeOwned> ApiResponse<T> {
    pub(crate) fn parse(method: &'static str, body: &[u8]) -> Result<T> {
        let response: Self = serde_json::from_slice(body).or_raise(|| ErrorKind::InvalidResponse(method))?;
        response.into_result(method)
    }
}

impl<T> ApiResponse<T> {
    fn into_result(self, method: &'static str) -> Result<T> {
        if self.ok {
            return self.result.ok_or_else(|| exn::Exn::from(ErrorKind::InvalidResponse(method)));
        }
        let retry_after = self.parameters.and_then(|p| p.retry_after);
        let code = self.error_code.unwrap_or_default();
        if let Some(retry_after) = retry_after
            && code == TOO_MANY_REQUESTS
        {
            exn::bail!(ErrorKind::RateLimited { retry_after });
        }
        exn::bail!(ErrorKind::Api {
            method,
            code,
            description: self.description.unwrap_or_default(),
        })
    }
}

/// The subset of a Bot API `Message` object this crate reads.
#[derive(Debug, Deserialize)]
pub(crate) struct RawMessage {
    pub message_id: MessageId,
    pub text: Option<String>,
    pub pinned_message: Option<Box<RawMessage>>,
}

impl From<RawMessage> for Message {
    fn from(raw: RawMessage) -> Self {
        Self { id: raw.message_id, text: raw.text }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct Update {
    pub update_id: i64,
    pub message: Option<RawMessage>,
    pub channel_post: Option<RawMessage>,
}

impl Update {
    /// ID of the service message announcing that `pinned` was pinned, if this
    /// update is one.
    pub(crate) fn pin_notice_for(&self, pinned: MessageId) -> Option<MessageId> {
        [&self.channel_post, &self.message]
            .into_iter()
            .flatten()
            .find(|m| m.pinned_message.as_ref().is_some_and(|p| p.message_id == pinned))
            .map(|m| m.message_id)
    }
}
