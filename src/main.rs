mod config;
mod dispatch;
mod error;
mod giphy;
mod reply;
mod tenor;

use std::process::ExitCode;
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use serenity::{
    async_trait,
    client::{Client, Context, EventHandler},
    model::{channel::Message, gateway::Ready},
    prelude::GatewayIntents,
};
use tokio::signal;

use crate::config::{BotConfig, Cli};
use crate::dispatch::{Dispatcher, GifClients, InboundMessage};
use crate::error::ConfigError;
use crate::reply::DiscordSink;

// Event handler implementation
struct Handler {
    dispatcher: Dispatcher<GifClients>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _: Context, ready: Ready) {
        log::info!("Connected to {} guilds", ready.guilds.len());
        println!("✅ Bot connected as {}!", ready.user.name);
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let bot_id = ctx.cache.current_user_id();
        let inbound = InboundMessage {
            author_id: msg.author.id.0,
            channel_id: msg.channel_id.0,
            content: msg.content,
        };

        let dispatch = self.dispatcher.dispatch(bot_id.0, &inbound).await;
        reply::emit(&DiscordSink { http: &ctx.http }, dispatch).await;
    }
}

fn load_config() -> Result<BotConfig, ConfigError> {
    let config = config::load(Cli::parse())?;
    log::info!("Giphy token set: {}", !config.giphy_token.is_empty());
    log::info!("Tenor token set: {}", !config.tenor_token.is_empty());
    Ok(config)
}

// Resolves on Ctrl-C, or SIGTERM where the platform has it
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut term = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(term) => term,
            Err(e) => {
                log::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = signal::ctrl_c() => {}
            _ = term.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logger - must be done before any logging calls
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let config = match load_config() {
        Ok(config) => Arc::new(config),
        Err(ConfigError::MissingDiscordToken) => {
            let _ = Cli::command().print_help();
            log::error!("❌ {}", ConfigError::MissingDiscordToken);
            return ExitCode::FAILURE;
        }
        Err(e) => {
            log::error!("❌ {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("🤖 Starting bot with prefix: '{}'", config.prefix);

    let clients = match GifClients::new(&config) {
        Ok(clients) => clients,
        Err(e) => {
            log::error!("❌ Error creating HTTP clients: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let handler = Handler {
        dispatcher: Dispatcher::new(Arc::clone(&config), clients),
    };

    let intents = GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = match Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
    {
        Ok(client) => client,
        Err(e) => {
            log::error!("❌ Error creating discord session: {:?}", e);
            return ExitCode::FAILURE;
        }
    };

    let shard_manager = client.shard_manager.clone();

    println!("🚀 Bot is now running. Press CTRL-C to exit");
    let exit = tokio::select! {
        _ = shutdown_signal() => {
            println!("\n⏹️ Stopping bot gracefully...");
            ExitCode::SUCCESS
        }
        result = client.start() => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(why) => {
                log::error!("❌ Error opening Discord session: {:?}", why);
                ExitCode::FAILURE
            }
        },
    };

    // Close down the session if terminated
    shard_manager.lock().await.shutdown_all().await;

    println!("✅ Bot stopped");
    exit
}
