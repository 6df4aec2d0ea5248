use crate::hook::Event;
use crate::state::State;

use modbot::builder::CreateMessage;
use modbot::client;
use modbot::model::{Channel, GuildId, Message, MessageId, Reaction, ReactionType, UserId};
use modbot::{Client, Error, Store};

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::{select, time};

use std::sync::Arc;
use std::time::Duration;

/// An alias for `Context<Message>`. This context is received by
/// module callbacks.
pub type MessageContext = Context<Message>;

/// An alias for `Context<()>`. This context is received by lifecycle
/// callbacks.
pub type StateContext = Context<()>;

const CONFIRM: &str = "✅";
const CANCEL: &str = "❌";

#[derive(Clone)]
pub struct Context<T> {
    pub state: Arc<State>,
    pub event: T,
}

impl<T> Context<T> {
    pub fn new(state: Arc<State>, event: T) -> Self {
        Self { state, event }
    }

    /// Creates a new `Context` with the same state and a different event.
    pub fn with_event<U>(&self, event: U) -> Context<U> {
        Context {
            state: self.state.clone(),
            event,
        }
    }

    pub fn client(&self) -> &dyn Client {
        self.state.client()
    }

    pub fn store(&self) -> &dyn Store {
        self.state.store()
    }

    /// Returns the tag of the bot owner, or the raw id if the owner
    /// cannot be fetched.
    pub async fn owner_tag(&self) -> String {
        let owner = self.state.config.owner;

        match self.client().get_user(owner).await {
            Ok(user) => user.tag(),
            Err(_) => owner.to_string(),
        }
    }
}

impl MessageContext {
    pub fn guild_id(&self) -> Option<GuildId> {
        self.event.guild_id
    }

    /// Returns `true` if the author is the configured bot owner.
    pub fn is_owner(&self) -> bool {
        self.event.author.id == self.state.config.owner
    }

    /// Returns the prefix shown to the author.
    pub fn local_prefix(&self) -> String {
        self.state.prefixes().local_prefix(self.event.guild_id)
    }

    pub async fn channel(&self) -> client::Result<Channel> {
        self.client().get_channel(self.event.channel_id).await
    }

    /// Sends a message into the channel of the event. The message is
    /// removed again if the event message is edited or deleted.
    pub async fn respond<T>(&self, message: T) -> Option<Message>
    where
        T: Into<CreateMessage>,
    {
        self.state
            .send_message(self.event.channel_id, message.into(), Some(self.event.id))
            .await
    }

    /// React to the message the author sent.
    pub async fn react<T>(&self, reaction: T) -> client::Result<()>
    where
        T: Into<ReactionType>,
    {
        self.client()
            .create_reaction(self.event.channel_id, self.event.id, reaction.into())
            .await
    }

    /// Waits for `user_id` to react to `message_id`. Returns
    /// [`Error::HookTimeout`] if the user doesn't react in time.
    pub async fn await_reaction(
        &self,
        message_id: MessageId,
        user_id: UserId,
        timeout: Duration,
    ) -> Result<Reaction, Error> {
        let mut rx = self.state.hooks().subscribe();

        wait_for_reaction(&mut rx, timeout, |reaction| {
            reaction.message_id == message_id && reaction.user_id == Some(user_id)
        })
        .await
    }

    /// Sends `text` and lets the author confirm or cancel by reacting.
    /// Returns `true` if the author confirmed.
    pub async fn request_confirmation<T>(&self, text: T, timeout: Duration) -> Result<bool, Error>
    where
        T: Into<CreateMessage>,
    {
        // Subscribe first, the author may react before both reactions
        // were added.
        let mut rx = self.state.hooks().subscribe();

        let message = self
            .respond(text)
            .await
            .ok_or(client::Error::NotFound)?;

        for emoji in [CONFIRM, CANCEL] {
            self.client()
                .create_reaction(message.channel_id, message.id, ReactionType::from(emoji))
                .await?;
        }

        let author = self.event.author.id;
        let reaction = wait_for_reaction(&mut rx, timeout, |reaction| {
            reaction.message_id == message.id
                && reaction.user_id == Some(author)
                && (reaction.emoji == CONFIRM || reaction.emoji == CANCEL)
        })
        .await?;

        Ok(reaction.emoji == CONFIRM)
    }
}

async fn wait_for_reaction<F>(
    rx: &mut broadcast::Receiver<Event>,
    timeout: Duration,
    filter: F,
) -> Result<Reaction, Error>
where
    F: Fn(&Reaction) -> bool,
{
    let sleep = time::sleep(timeout);
    tokio::pin!(sleep);

    loop {
        select! {
            event = rx.recv() => match event {
                Ok(Event::ReactionAdd(reaction)) if filter(&reaction) => return Ok(reaction),
                Ok(_) | Err(RecvError::Lagged(_)) => (),
                Err(RecvError::Closed) => return Err(Error::HookTimeout),
            },
            _ = &mut sleep => return Err(Error::HookTimeout),
        }
    }
}
