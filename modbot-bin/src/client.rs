use crate::convert;

use async_trait::async_trait;
use modbot::builder::CreateMessage;
use modbot::client::{Client, Error, Result};
use modbot::model::{
    Activity, Channel, ChannelId, GuildId, Member, Message, MessageId, Permissions, ReactionType,
    Role, RoleId, User, UserId,
};
use parking_lot::{Mutex, RwLock};
use serenity::client::Context;
use serenity::http::error::Error as HttpError;
use serenity::model::ModelError;

/// The maximum number of members fetched when the guild is not cached.
const MEMBER_FETCH_LIMIT: u64 = 1000;

/// A [`Client`] backed by a serenity gateway connection.
///
/// The client is unusable until [`SerenityClient::connect`] was called
/// from the ready event.
#[derive(Default)]
pub struct SerenityClient {
    ctx: RwLock<Option<Context>>,
    /// Activity set before the connection was ready.
    pending_activity: Mutex<Option<Option<Activity>>>,
}

impl SerenityClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the context of a ready connection and applies a pending
    /// activity.
    pub async fn connect(&self, ctx: Context) {
        *self.ctx.write() = Some(ctx.clone());

        let pending = self.pending_activity.lock().take();
        if let Some(activity) = pending {
            set_activity(&ctx, activity).await;
        }
    }

    fn context(&self) -> Result<Context> {
        self.ctx.read().clone().ok_or(Error::NotConnected)
    }
}

#[async_trait]
impl Client for SerenityClient {
    async fn current_user(&self) -> Result<User> {
        let ctx = self.context()?;
        let user = ctx.http.get_current_user().await.map_err(map_err)?;

        Ok(convert::current_user(user))
    }

    async fn send_message(&self, channel_id: ChannelId, message: CreateMessage) -> Result<Message> {
        let ctx = self.context()?;

        let message = serenity::model::id::ChannelId(channel_id.0)
            .send_message(&ctx, |m| {
                convert::fill_message(message, m);
                m
            })
            .await
            .map_err(map_err)?;

        Ok(convert::message(message))
    }

    async fn edit_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        message: CreateMessage,
    ) -> Result<Message> {
        let ctx = self.context()?;

        let message = serenity::model::id::ChannelId(channel_id.0)
            .edit_message(&ctx, message_id.0, |m| {
                convert::fill_edit(message, m);
                m
            })
            .await
            .map_err(map_err)?;

        Ok(convert::message(message))
    }

    async fn delete_message(&self, channel_id: ChannelId, message_id: MessageId) -> Result<()> {
        let ctx = self.context()?;

        ctx.http
            .delete_message(channel_id.0, message_id.0)
            .await
            .map_err(map_err)
    }

    async fn create_reaction(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        reaction: ReactionType,
    ) -> Result<()> {
        let ctx = self.context()?;

        ctx.http
            .create_reaction(
                channel_id.0,
                message_id.0,
                &convert::raw_reaction_type(reaction),
            )
            .await
            .map_err(map_err)
    }

    async fn get_channel(&self, channel_id: ChannelId) -> Result<Channel> {
        let ctx = self.context()?;
        let channel = ctx.http.get_channel(channel_id.0).await.map_err(map_err)?;

        Ok(convert::channel(channel))
    }

    async fn channel_permissions(
        &self,
        channel_id: ChannelId,
        user_id: UserId,
    ) -> Result<Permissions> {
        let ctx = self.context()?;

        let channel = match ctx.cache.guild_channel(channel_id.0).await {
            Some(channel) => channel,
            // Not a guild channel.
            None => return Ok(Permissions::all()),
        };

        let permissions = channel
            .permissions_for_user(&ctx, user_id.0)
            .await
            .map_err(map_err)?;

        Ok(convert::permissions(permissions))
    }

    async fn get_user(&self, user_id: UserId) -> Result<User> {
        let ctx = self.context()?;

        if let Some(user) = ctx.cache.user(user_id.0).await {
            return Ok(convert::user(user));
        }

        let user = ctx.http.get_user(user_id.0).await.map_err(map_err)?;
        Ok(convert::user(user))
    }

    async fn get_member(&self, guild_id: GuildId, user_id: UserId) -> Result<Member> {
        let ctx = self.context()?;

        if let Some(member) = ctx.cache.member(guild_id.0, user_id.0).await {
            return Ok(convert::member(member));
        }

        let member = ctx
            .http
            .get_member(guild_id.0, user_id.0)
            .await
            .map_err(map_err)?;

        Ok(convert::member(member))
    }

    async fn get_members(&self, guild_id: GuildId) -> Result<Vec<Member>> {
        let ctx = self.context()?;

        if let Some(members) = ctx
            .cache
            .guild_field(guild_id.0, |guild| guild.members.clone())
            .await
        {
            return Ok(members.into_values().map(convert::member).collect());
        }

        let members = ctx
            .http
            .get_guild_members(guild_id.0, Some(MEMBER_FETCH_LIMIT), None)
            .await
            .map_err(map_err)?;

        Ok(members.into_iter().map(convert::member).collect())
    }

    async fn get_roles(&self, guild_id: GuildId) -> Result<Vec<Role>> {
        let ctx = self.context()?;
        let roles = ctx.http.get_guild_roles(guild_id.0).await.map_err(map_err)?;

        Ok(roles.into_iter().map(convert::role).collect())
    }

    async fn add_member_role(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
    ) -> Result<()> {
        let ctx = self.context()?;

        ctx.http
            .add_member_role(guild_id.0, user_id.0, role_id.0)
            .await
            .map_err(map_err)
    }

    async fn set_activity(&self, activity: Option<Activity>) -> Result<()> {
        let ctx = match self.context() {
            Ok(ctx) => ctx,
            Err(_) => {
                *self.pending_activity.lock() = Some(activity);
                return Ok(());
            }
        };

        set_activity(&ctx, activity).await;
        Ok(())
    }
}

async fn set_activity(ctx: &Context, activity: Option<Activity>) {
    match activity {
        Some(activity) => ctx.set_activity(convert::raw_activity(activity)).await,
        None => ctx.reset_presence().await,
    }
}

/// Maps serenity errors to client errors. Rejected requests are mapped
/// by their status code.
fn map_err(err: serenity::Error) -> Error {
    let status = match &err {
        serenity::Error::Http(http) => match &**http {
            HttpError::UnsuccessfulRequest(resp) => Some(resp.status_code.as_u16()),
            _ => None,
        },
        serenity::Error::Model(ModelError::InvalidPermissions(_)) => Some(403),
        _ => None,
    };

    match status {
        Some(404) => Error::NotFound,
        Some(403) => Error::Forbidden,
        _ => Error::Other(Box::new(err)),
    }
}
