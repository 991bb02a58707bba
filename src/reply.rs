// reply.rs - Reply Emitter
// Posts the dispatcher's result back to the channel the command came from.

use std::sync::Arc;

use async_trait::async_trait;
use serenity::http::Http;
use serenity::model::id::ChannelId;

use crate::dispatch::Dispatch;
use crate::error::ReplyError;

/// Somewhere a text message can be sent
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn send(&self, channel_id: u64, content: &str) -> Result<(), ReplyError>;
}

/// Sends through the Discord REST API
pub struct DiscordSink<'a> {
    pub http: &'a Arc<Http>,
}

#[async_trait]
impl ReplySink for DiscordSink<'_> {
    async fn send(&self, channel_id: u64, content: &str) -> Result<(), ReplyError> {
        ChannelId(channel_id).say(self.http, content).await?;
        Ok(())
    }
}

/// Deliver the outcome of one dispatch; returns true when a message was sent
///
/// Only a found URL is posted. Lookup failures stay in the log.
pub async fn emit<S: ReplySink + ?Sized>(sink: &S, dispatch: Dispatch) -> bool {
    let (channel_id, command, outcome) = match dispatch {
        Dispatch::Reply { channel_id, command, outcome } => (channel_id, command, outcome),
        Dispatch::Ignored | Dispatch::Unmatched => return false,
    };

    let url = match outcome {
        Ok(url) if !url.trim().is_empty() => url,
        Ok(_) => {
            log::warn!("[REPLY] {:?} produced an empty URL, nothing sent", command);
            return false;
        }
        Err(e) => {
            log::warn!("[REPLY] {:?} failed, nothing sent: {}", command, e);
            return false;
        }
    };

    match sink.send(channel_id, &url).await {
        Ok(()) => {
            log::info!("[REPLY] Sent {} to channel {}", url, channel_id);
            true
        }
        Err(e) => {
            log::error!("[REPLY] Failed to send reply to channel {}: {}", channel_id, e);
            false
        }
    }
}
