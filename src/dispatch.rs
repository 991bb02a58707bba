// dispatch.rs - Command Dispatcher
// Classifies an inbound chat message and routes it to the matching GIF provider.
//
// Key Features:
// - Ignores the bot's own messages so replies never trigger further replies
// - ?giphy random / ?giphy <query> / ?tenor <query> routing with a configurable prefix
// - No state between calls; safe to run for many events at once
//
// Used by: main.rs (message event handler)

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::BotConfig;
use crate::error::GifError;
use crate::giphy::GiphyClient;
use crate::tenor::TenorClient;

const GIPHY_KEYWORD: &str = "giphy";
const TENOR_KEYWORD: &str = "tenor";
const RANDOM_QUERY: &str = "random";

/// A recognised bot command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GifCommand {
    GiphyRandom,
    GiphySearch(String),
    Tenor(String),
}

/// The parts of a chat message the dispatcher looks at
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub author_id: u64,
    pub channel_id: u64,
    pub content: String,
}

/// What the dispatcher decided for one message
#[derive(Debug)]
pub enum Dispatch {
    /// Written by the bot itself
    Ignored,
    /// No recognised command
    Unmatched,
    Reply {
        channel_id: u64,
        command: GifCommand,
        outcome: Result<String, GifError>,
    },
}

/// Lookups the dispatcher can route to
#[async_trait]
pub trait GifBackend: Send + Sync {
    async fn giphy_random(&self) -> Result<String, GifError>;
    async fn giphy_search(&self, query: &str) -> Result<String, GifError>;
    async fn tenor_search(&self, query: &str) -> Result<String, GifError>;
}

/// Production backend talking to Giphy and Tenor
pub struct GifClients {
    pub giphy: GiphyClient,
    pub tenor: TenorClient,
}

impl GifClients {
    pub fn new(config: &BotConfig) -> Result<Self, GifError> {
        Ok(Self {
            giphy: GiphyClient::new(config)?,
            tenor: TenorClient::new(config)?,
        })
    }
}

#[async_trait]
impl GifBackend for GifClients {
    async fn giphy_random(&self) -> Result<String, GifError> {
        self.giphy.random().await
    }

    async fn giphy_search(&self, query: &str) -> Result<String, GifError> {
        self.giphy.search(query).await
    }

    async fn tenor_search(&self, query: &str) -> Result<String, GifError> {
        Ok(self.tenor.search(query).await)
    }
}

/// Match `content` against the command rules for `prefix`
///
/// Giphy is checked before Tenor. The text after prefix and keyword is trimmed to
/// form the query, and a Giphy query of exactly "random" selects a random GIF.
pub fn classify(prefix: &str, content: &str) -> Option<GifCommand> {
    let rest = content.strip_prefix(prefix)?;

    if let Some(query) = rest.strip_prefix(GIPHY_KEYWORD) {
        let query = query.trim();
        return Some(if query == RANDOM_QUERY {
            GifCommand::GiphyRandom
        } else {
            GifCommand::GiphySearch(query.to_string())
        });
    }

    rest.strip_prefix(TENOR_KEYWORD)
        .map(|query| GifCommand::Tenor(query.trim().to_string()))
}

pub struct Dispatcher<B> {
    config: Arc<BotConfig>,
    backend: B,
}

impl<B: GifBackend> Dispatcher<B> {
    pub fn new(config: Arc<BotConfig>, backend: B) -> Self {
        Self { config, backend }
    }

    /// Handle one inbound message on behalf of the bot user `bot_id`
    pub async fn dispatch(&self, bot_id: u64, msg: &InboundMessage) -> Dispatch {
        if msg.author_id == bot_id {
            return Dispatch::Ignored;
        }

        let command = match classify(&self.config.prefix, &msg.content) {
            Some(command) => command,
            None => return Dispatch::Unmatched,
        };

        log::debug!("[DISPATCH] {:?} from user {} in channel {}", command, msg.author_id, msg.channel_id);

        let outcome = match &command {
            GifCommand::GiphyRandom => self.backend.giphy_random().await,
            GifCommand::GiphySearch(query) => self.backend.giphy_search(query).await,
            GifCommand::Tenor(query) => self.backend.tenor_search(query).await,
        };

        Dispatch::Reply {
            channel_id: msg.channel_id,
            command,
            outcome,
        }
    }
}
