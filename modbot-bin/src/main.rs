mod client;
mod config;
mod convert;
mod handler;
mod logger;
mod plugins;
mod signal;

use crate::client::SerenityClient;
use crate::handler::Handler;

use clap::Parser;
use modbot_core::context::Context;
use modbot_core::state::State;
use modbot_core::store;
use serenity::client::bridge::gateway::GatewayIntents;

use std::sync::Arc;

/// Path of the default config.toml file.
const DEFAULT_CONFIG: &str = "./config.toml";

/// Exit code used when the bot could not start.
const ERROR_EXIT_CODE: i32 = 1;

#[derive(Debug, Parser)]
#[clap(name = "modbot", version, about = "A modular discord bot")]
struct Args {
    /// Provide a path to the config file
    #[clap(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG)]
    config: String,
}

#[tokio::main]
async fn main() {
    let code = run().await;
    std::process::exit(code);
}

async fn run() -> i32 {
    let args = Args::parse();

    // Load the config.toml file.
    let config = match config::from_file(&args.config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to load config from {}: {}", args.config, err);
            return ERROR_EXIT_CODE;
        }
    };

    if let Err(err) = logger::init(&config) {
        eprintln!("Failed to initialize logger: {}", err);
        return ERROR_EXIT_CODE;
    }

    let store = match store::connect(&config).await {
        Ok(store) => store,
        Err(err) => {
            log::error!("[STORE] Failed to connect to store: {}", err);
            return ERROR_EXIT_CODE;
        }
    };

    let client = Arc::new(SerenityClient::new());
    let state = Arc::new(State::new(config.clone(), client.clone(), store));
    let ctx = Context::new(state.clone(), ());

    log::info!("[CORE] Loading modules");
    if let Err(err) = state
        .modules()
        .load_modules(&ctx, plugins::MODULES, config.strict_mode)
        .await
    {
        log::error!("[CORE] Failed to load modules: {}", err);
        log::error!("[CORE] Fatal error, exiting");
        return ERROR_EXIT_CODE;
    }

    let gateway_intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::DIRECT_MESSAGE_REACTIONS;

    log::info!("[BOT] Connecting");

    let mut discord = match serenity::Client::builder(&config.token)
        .intents(gateway_intents)
        .event_handler(Handler::new(state.clone(), client))
        .await
    {
        Ok(discord) => discord,
        Err(err) => {
            log::error!("[BOT] Failed to create client: {}", err);
            return ERROR_EXIT_CODE;
        }
    };

    let shard_manager = discord.shard_manager.clone();

    let code = tokio::select! {
        res = discord.start() => match res {
            Ok(()) => 0,
            Err(err) => {
                log::error!("[BOT] Connection failed: {}", err);
                ERROR_EXIT_CODE
            }
        },
        code = state.wait_for_shutdown() => code,
        _ = signal::terminate() => 0,
    };

    log::info!("[CORE] Shutting down");

    state.modules().unload_modules(&ctx).await;
    shard_manager.lock().await.shutdown_all().await;

    log::info!("[BOT] Connection closed");
    code
}
