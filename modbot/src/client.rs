use crate::builder::CreateMessage;
use crate::model::{
    Activity, Channel, ChannelId, GuildId, Member, Message, MessageId, Permissions, ReactionType,
    Role, RoleId, User, UserId,
};

use async_trait::async_trait;
use thiserror::Error;

use std::result;

pub type Result<T> = result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The requested entity does not exist (anymore).
    #[error("not found")]
    NotFound,
    /// The bot is not allowed to perform the action.
    #[error("missing access")]
    Forbidden,
    /// The client has not connected to the gateway yet.
    #[error("client is not connected")]
    NotConnected,
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// The capabilities of the messaging platform the bot is connected to.
#[async_trait]
pub trait Client: Send + Sync + 'static {
    /// Returns the user the bot is logged in as.
    async fn current_user(&self) -> Result<User>;

    // CHANNEL

    /// Create a new message in a text channel.
    async fn send_message(&self, channel_id: ChannelId, message: CreateMessage) -> Result<Message>;

    /// Replaces the content of a message sent by the bot.
    async fn edit_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        message: CreateMessage,
    ) -> Result<Message>;

    async fn delete_message(&self, channel_id: ChannelId, message_id: MessageId) -> Result<()>;

    /// Create a new reaction on a message.
    async fn create_reaction(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        reaction: ReactionType,
    ) -> Result<()>;

    async fn get_channel(&self, channel_id: ChannelId) -> Result<Channel>;

    /// Returns the effective permissions of `user_id` in `channel_id`.
    async fn channel_permissions(
        &self,
        channel_id: ChannelId,
        user_id: UserId,
    ) -> Result<Permissions>;

    // USER

    async fn get_user(&self, user_id: UserId) -> Result<User>;

    // GUILD

    async fn get_member(&self, guild_id: GuildId, user_id: UserId) -> Result<Member>;

    /// Returns all members of the guild known to the client.
    async fn get_members(&self, guild_id: GuildId) -> Result<Vec<Member>>;

    async fn get_roles(&self, guild_id: GuildId) -> Result<Vec<Role>>;

    async fn add_member_role(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
    ) -> Result<()>;

    // GATEWAY

    /// Updates the presence of the bot. `None` clears the activity.
    async fn set_activity(&self, activity: Option<Activity>) -> Result<()>;
}
