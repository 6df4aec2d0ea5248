use crate::client::SerenityClient;
use crate::convert;

use async_trait::async_trait;
use modbot_core::handlers;
use modbot_core::state::State;
use serenity::client::{Context, EventHandler};
use serenity::model::channel::{Message, Reaction};
use serenity::model::event::MessageUpdateEvent;
use serenity::model::gateway::Ready;
use serenity::model::guild::Member;
use serenity::model::id::{ChannelId, GuildId, MessageId};

use std::sync::Arc;

/// Forwards gateway events to the dispatch core.
pub struct Handler {
    state: Arc<State>,
    client: Arc<SerenityClient>,
}

impl Handler {
    pub fn new(state: Arc<State>, client: Arc<SerenityClient>) -> Self {
        Self { state, client }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        log::info!("[BOT] Bot online");

        self.client.connect(ctx).await;
        handlers::ready(&self.state, convert::current_user(ready.user)).await;
    }

    async fn message(&self, _ctx: Context, message: Message) {
        handlers::message(self.state.clone(), convert::message(message)).await;
    }

    async fn message_update(
        &self,
        ctx: Context,
        old_if_available: Option<Message>,
        new: Option<Message>,
        event: MessageUpdateEvent,
    ) {
        // Updates without content are embed resolutions.
        if event.content.is_none() {
            return;
        }

        let message = match new {
            Some(message) => message,
            None => match ctx
                .http
                .get_message(event.channel_id.0, event.id.0)
                .await
            {
                Ok(message) => message,
                Err(err) => {
                    log::debug!("[BOT] Failed to fetch edited message {}: {}", event.id, err);
                    return;
                }
            },
        };

        handlers::message_update(
            self.state.clone(),
            convert::message(message),
            old_if_available.map(|message| message.content),
        )
        .await;
    }

    async fn message_delete(
        &self,
        _ctx: Context,
        channel_id: ChannelId,
        deleted_message_id: MessageId,
        _guild_id: Option<GuildId>,
    ) {
        handlers::message_delete(
            self.state.clone(),
            modbot::model::ChannelId(channel_id.0),
            modbot::model::MessageId(deleted_message_id.0),
        )
        .await;
    }

    async fn guild_member_addition(&self, _ctx: Context, _guild_id: GuildId, member: Member) {
        handlers::member_join(&self.state, convert::member(member)).await;
    }

    async fn reaction_add(&self, _ctx: Context, reaction: Reaction) {
        handlers::reaction_add(&self.state, convert::reaction(reaction));
    }
}
