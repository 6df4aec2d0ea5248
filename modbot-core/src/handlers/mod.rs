//! Entry points for inbound gateway events.
mod message;

pub use message::{message, message_delete, message_update};

use crate::context::Context;
use crate::hook::Event;
use crate::state::State;

use modbot::model::{Member, Reaction, User};

use std::sync::Arc;

/// Called once the connection is established and the bot user is known.
pub async fn ready(state: &Arc<State>, user: User) {
    log::info!("[CORE] Logged in as {}", user.tag());

    let bot_id = user.id;
    state.set_current_user(user);

    if let Err(err) = state
        .prefixes()
        .init(state.store(), &state.config.prefix, bot_id)
        .await
    {
        log::error!("[CORE] Failed to load prefixes: {}", err);
    }
}

pub async fn member_join(state: &Arc<State>, member: Member) {
    state.hooks().dispatch_event(Event::MemberJoin(member.clone()));

    let ctx = Context::new(state.clone(), ());
    state.modules().member_join(&ctx, &member).await;
}

pub fn reaction_add(state: &State, reaction: Reaction) {
    state.hooks().dispatch_event(Event::ReactionAdd(reaction));
}
