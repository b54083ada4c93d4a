//! Chat platform boundary.
//!
//! The upload driver only ever talks to a [`ChatClient`]. [`BotApiClient`] is
//! the implementation that talks to the Telegram Bot API; tests in other
//! crates provide their own.
//!
//! Every operation may fail with
//! [`RateLimited`](crate::error::ErrorKind::RateLimited), which carries the
//! number of seconds the platform asked the client to wait. Retrying is left
//! to the caller.

mod bot;
mod chat;
pub mod error;
mod response;

pub use crate::bot::{BotApiClient, DEFAULT_API_URL};
pub use crate::chat::{AudioUpload, ChatClient, ChatId, Message, MessageId, TransferProgress};
