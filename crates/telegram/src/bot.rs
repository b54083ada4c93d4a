//! Telegram Bot API client.
//!
//! Requests are made with [`reqwest`]. Audio files are streamed from disk
//! rather than buffered, and every chunk handed to the HTTP body is reported
//! to the [`TransferProgress`] observer.

use crate::chat::{AudioUpload, ChatClient, ChatId, Message, MessageId, TransferProgress};
use crate::error::{ErrorKind, Result};
use crate::response::{ApiResponse, RawMessage, Update};
use async_trait::async_trait;
use exn::ResultExt;
use futures::TryStreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use tokio_util::io::ReaderStream;
use tracing::instrument;

/// Public Bot API endpoint. A self-hosted Bot API server lifts the upload
/// size limit from 50 MB to 2000 MB.
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const THUMBNAIL_FILE_NAME: &str = "thumbnail.jpg";
/// `getUpdates` long-poll timeouts (seconds) used to look for a pin notice.
const PIN_NOTICE_POLLS: [u64; 2] = [0, 3];

/// [`ChatClient`] for the Telegram Bot API.
///
/// # Examples
///
/// ```no_run
/// use tgtracks_telegram::{BotApiClient, ChatClient, ChatId, DEFAULT_API_URL};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = BotApiClient::new(DEFAULT_API_URL, "123:secret", ChatId::from("@my_channel"))?;
/// let message = client.send_text("Hello").await?;
/// println!("Posted message {}", message.id);
/// # Ok(())
/// # }
/// ```
pub struct BotApiClient {
    http: Client,
    /// `{api_url}/bot{token}`; never logged.
    base_url: String,
    chat_id: ChatId,
    /// Offset for `getUpdates`, so each update is only looked at once.
    update_offset: AtomicI64,
}

impl BotApiClient {
    pub fn new(api_url: &str, bot_token: &str, chat_id: ChatId) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .or_raise(|| ErrorKind::Config)?;
        Ok(Self {
            http,
            base_url: format!("{}/bot{bot_token}", api_url.trim_end_matches('/')),
            chat_id,
            update_offset: AtomicI64::new(0),
        })
    }

    pub fn chat_id(&self) -> &ChatId {
        &self.chat_id
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{method}", self.base_url)
    }

    async fn read_response<T: DeserializeOwned>(method: &'static str, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(reqwest::Error::without_url)
            .or_raise(|| ErrorKind::Network(method))?;
        tracing::trace!(method, status = %status, size = body.len(), "Bot API response");
        ApiResponse::parse(method, &body)
    }

    async fn call<T: DeserializeOwned>(&self, method: &'static str, params: &impl Serialize) -> Result<T> {
        let response = self
            .http
            .post(self.method_url(method))
            .json(params)
            .send()
            .await
            // The URL contains the bot token.
            .map_err(reqwest::Error::without_url)
            .or_raise(|| ErrorKind::Network(method))?;
        Self::read_response(method, response).await
    }

    async fn audio_part(upload: &AudioUpload, progress: Option<Arc<dyn TransferProgress>>) -> Result<Part> {
        let file = tokio::fs::File::open(&upload.path)
            .await
            .or_raise(|| ErrorKind::Io(upload.path.clone()))?;
        let total = file
            .metadata()
            .await
            .or_raise(|| ErrorKind::Io(upload.path.clone()))?
            .len();
        let mut transferred = 0u64;
        let stream = ReaderStream::new(file).inspect_ok(move |chunk| {
            transferred += chunk.len() as u64;
            if let Some(progress) = &progress {
                progress.update(transferred, total);
            }
        });
        Ok(Part::stream_with_length(Body::wrap_stream(stream), total).file_name(upload.file_name.clone()))
    }

    fn audio_form(&self, upload: &AudioUpload, audio: Part) -> Form {
        let mut form = Form::new()
            .text("chat_id", self.chat_id.to_string())
            .text("title", upload.title.clone())
            .text("duration", upload.duration.to_string())
            .text("disable_notification", upload.disable_notification.to_string())
            .part("audio", audio);
        if let Some(performer) = &upload.performer {
            form = form.text("performer", performer.clone());
        }
        if let Some(caption) = &upload.caption {
            form = form.text("caption", caption.clone());
        }
        if let Some(thumbnail) = &upload.thumbnail {
            form = form.part("thumbnail", Part::bytes(thumbnail.clone()).file_name(THUMBNAIL_FILE_NAME));
        }
        form
    }

    /// Find the service message the platform posted when `pinned` was pinned.
    ///
    /// The notice can show up a moment after the pin call returns, so when the
    /// first look finds nothing the updates are long-polled once more.
    ///
    /// Only a rate limit is worth failing the pin for; anything else (most
    /// likely a webhook being configured for this bot) just means the service
    /// message can't be found.
    async fn find_pin_notice(&self, pinned: MessageId) -> Result<Option<MessageId>> {
        for timeout in PIN_NOTICE_POLLS {
            let params = json!({
                "offset": self.update_offset.load(Ordering::Relaxed),
                "timeout": timeout,
                "allowed_updates": ["message", "channel_post"],
            });
            let updates: Vec<Update> = match self.call("getUpdates", &params).await {
                Ok(updates) => updates,
                Err(err) if matches!(&*err, ErrorKind::RateLimited { .. }) => return Err(err),
                Err(err) => {
                    tracing::warn!(error = %err, "Unable to fetch updates; pin notice left in place");
                    return Ok(None);
                },
            };
            if let Some(last) = updates.last() {
                self.update_offset.store(last.update_id + 1, Ordering::Relaxed);
            }
            if let Some(notice) = updates.iter().find_map(|update| update.pin_notice_for(pinned)) {
                return Ok(Some(notice));
            }
        }
        tracing::warn!(message_id = pinned, "No pin notice received; left in place");
        Ok(None)
    }
}

#[async_trait]
impl ChatClient for BotApiClient {
    #[instrument(skip_all, fields(path = %upload.path.display()))]
    async fn send_audio(&self, upload: &AudioUpload, progress: Option<Arc<dyn TransferProgress>>) -> Result<Message> {
        const METHOD: &str = "sendAudio";
        let audio = Self::audio_part(upload, progress).await?;
        let response = self
            .http
            .post(self.method_url(METHOD))
            .multipart(self.audio_form(upload, audio))
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .or_raise(|| ErrorKind::Network(METHOD))?;
        let message: RawMessage = Self::read_response(METHOD, response).await?;
        Ok(message.into())
    }

    #[instrument(skip(self))]
    async fn send_text(&self, text: &str) -> Result<Message> {
        let params = json!({
            "chat_id": self.chat_id,
            "text": text,
            "link_preview_options": { "is_disabled": true },
        });
        let message: RawMessage = self.call("sendMessage", &params).await?;
        Ok(message.into())
    }

    #[instrument(skip(self))]
    async fn pin(&self, message_id: MessageId) -> Result<Option<MessageId>> {
        let params = json!({
            "chat_id": self.chat_id,
            "message_id": message_id,
            "disable_notification": true,
        });
        let _: bool = self.call("pinChatMessage", &params).await?;
        self.find_pin_notice(message_id).await
    }

    #[instrument(skip(self))]
    async fn delete(&self, message_id: MessageId) -> Result<()> {
        let params = json!({ "chat_id": self.chat_id, "message_id": message_id });
        let _: bool = self.call("deleteMessage", &params).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    /// Answer one request per connection with the next canned body, in
    /// order. Resolves to the JSON bodies of the requests received.
    async fn serve(responses: Vec<Value>) -> (String, JoinHandle<Vec<Value>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let mut requests = Vec::new();
            for response in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                requests.push(read_json_body(&mut socket).await);
                let body = response.to_string();
                let reply = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                socket.write_all(reply.as_bytes()).await.unwrap();
                socket.shutdown().await.unwrap();
            }
            requests
        });
        (url, handle)
    }

    async fn read_json_body(socket: &mut TcpStream) -> Value {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let length: usize = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .map(|value| value.trim().parse().unwrap())
                    .unwrap_or(0);
                let start = end + 4;
                while buf.len() < start + length {
                    let n = socket.read(&mut chunk).await.unwrap();
                    assert!(n > 0, "connection closed mid-body");
                    buf.extend_from_slice(&chunk[..n]);
                }
                return serde_json::from_slice(&buf[start..start + length]).unwrap();
            }
            assert!(n > 0, "connection closed mid-headers");
        }
    }

    fn ok(result: Value) -> Value {
        serde_json::json!({ "ok": true, "result": result })
    }

    #[test]
    fn test_method_url() {
        let client = BotApiClient::new("http://localhost:8081/", "123:abc", ChatId::Id(-100)).unwrap();
        assert_eq!(client.method_url("sendAudio"), "http://localhost:8081/bot123:abc/sendAudio");
        assert_eq!(client.chat_id(), &ChatId::Id(-100));
    }

    #[tokio::test]
    async fn test_missing_audio_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let upload = AudioUpload {
            path: temp_dir.path().join("missing.mp3"),
            file_name: "missing.mp3".to_string(),
            ..Default::default()
        };
        let client = BotApiClient::new(DEFAULT_API_URL, "123:abc", ChatId::Id(-100)).unwrap();
        let err = client.send_audio(&upload, None).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Io(upload.path.clone()));
    }

    #[tokio::test]
    async fn test_pin_notice_found_on_second_poll() {
        let notice = serde_json::json!([{
            "update_id": 7,
            "channel_post": { "message_id": 43, "pinned_message": { "message_id": 42 } },
        }]);
        let (url, server) = serve(vec![ok(Value::Bool(true)), ok(serde_json::json!([])), ok(notice)]).await;
        let client = BotApiClient::new(&url, "123:abc", ChatId::Id(-100)).unwrap();

        assert_eq!(client.pin(42).await.unwrap(), Some(43));
        let requests = server.await.unwrap();
        assert_eq!(requests[0]["message_id"], 42);
        assert_eq!(requests[1]["timeout"], 0);
        assert!(requests[2]["timeout"].as_u64().unwrap() > 0);
        assert_eq!(client.update_offset.load(Ordering::Relaxed), 8);
    }

    #[tokio::test]
    async fn test_pin_notice_missing_after_every_poll() {
        let (url, server) = serve(vec![ok(Value::Bool(true)), ok(serde_json::json!([])), ok(serde_json::json!([]))]).await;
        let client = BotApiClient::new(&url, "123:abc", ChatId::Id(-100)).unwrap();

        assert_eq!(client.pin(42).await.unwrap(), None);
        assert_eq!(server.await.unwrap().len(), 1 + PIN_NOTICE_POLLS.len());
    }
}
