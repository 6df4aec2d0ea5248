//! An in-memory messaging client and helpers for tests.
use crate::config::Config;
use crate::handlers;
use crate::state::State;
use crate::store::mem::MemStore;

use async_trait::async_trait;
use chrono::Utc;
use modbot::builder::CreateMessage;
use modbot::client::{Error, Result};
use modbot::model::{
    Activity, Channel, ChannelId, ChannelKind, GuildId, Member, Message, MessageId, Permissions,
    ReactionType, Role, RoleId, User, UserId,
};
use modbot::util::color::Color;
use modbot::Client;
use parking_lot::Mutex;

use std::collections::HashMap;
use std::sync::Arc;

/// Ids of messages created by the [`MockClient`] start at this value.
const FIRST_MESSAGE_ID: u64 = 1_000_000;

/// A [`Client`] recording every action and serving configured entities.
///
/// Users have all permissions in every channel unless configured
/// otherwise.
#[derive(Debug)]
pub struct MockClient {
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    current_user: User,
    next_id: u64,
    live: HashMap<MessageId, Message>,
    sent: Vec<Message>,
    edited: Vec<Message>,
    deleted: Vec<(ChannelId, MessageId)>,
    reactions: Vec<(ChannelId, MessageId, ReactionType)>,
    users: HashMap<UserId, User>,
    members: HashMap<GuildId, Vec<Member>>,
    roles: HashMap<GuildId, Vec<Role>>,
    added_roles: Vec<(GuildId, UserId, RoleId)>,
    channels: HashMap<ChannelId, Channel>,
    permissions: HashMap<(ChannelId, UserId), Permissions>,
    activity: Option<Activity>,
    failing_sends: usize,
    failing_permissions: bool,
}

impl MockClient {
    pub fn new(current_user: User) -> Self {
        let mut users = HashMap::new();
        users.insert(current_user.id, current_user.clone());

        Self {
            inner: Mutex::new(Inner {
                current_user,
                next_id: FIRST_MESSAGE_ID,
                live: HashMap::new(),
                sent: Vec::new(),
                edited: Vec::new(),
                deleted: Vec::new(),
                reactions: Vec::new(),
                users,
                members: HashMap::new(),
                roles: HashMap::new(),
                added_roles: Vec::new(),
                channels: HashMap::new(),
                permissions: HashMap::new(),
                activity: None,
                failing_sends: 0,
                failing_permissions: false,
            }),
        }
    }

    pub fn add_user(&self, user: User) {
        self.inner.lock().users.insert(user.id, user);
    }

    /// Adds a guild member. The user of the member becomes known too.
    pub fn add_member(&self, member: Member) {
        let mut inner = self.inner.lock();
        inner.users.insert(member.user.id, member.user.clone());
        inner
            .members
            .entry(member.guild_id)
            .or_default()
            .push(member);
    }

    pub fn add_role(&self, role: Role) {
        self.inner
            .lock()
            .roles
            .entry(role.guild_id)
            .or_default()
            .push(role);
    }

    pub fn add_channel(&self, channel: Channel) {
        self.inner.lock().channels.insert(channel.id, channel);
    }

    pub fn set_permissions(&self, channel_id: ChannelId, user_id: UserId, permissions: Permissions) {
        self.inner
            .lock()
            .permissions
            .insert((channel_id, user_id), permissions);
    }

    /// Makes the next `count` sends fail with [`Error::Forbidden`].
    pub fn fail_sends(&self, count: usize) {
        self.inner.lock().failing_sends = count;
    }

    /// Makes every permission lookup fail with [`Error::Forbidden`].
    pub fn fail_permission_lookups(&self) {
        self.inner.lock().failing_permissions = true;
    }

    /// Returns all messages sent so far, in order.
    pub fn sent(&self) -> Vec<Message> {
        self.inner.lock().sent.clone()
    }

    /// Returns the contents of all messages sent so far, in order.
    pub fn sent_contents(&self) -> Vec<String> {
        self.inner
            .lock()
            .sent
            .iter()
            .map(|msg| msg.content.clone())
            .collect()
    }

    /// Returns the state of every successful edit, in order.
    pub fn edited(&self) -> Vec<Message> {
        self.inner.lock().edited.clone()
    }

    pub fn deleted(&self) -> Vec<(ChannelId, MessageId)> {
        self.inner.lock().deleted.clone()
    }

    pub fn reactions(&self) -> Vec<(ChannelId, MessageId, ReactionType)> {
        self.inner.lock().reactions.clone()
    }

    pub fn added_roles(&self) -> Vec<(GuildId, UserId, RoleId)> {
        self.inner.lock().added_roles.clone()
    }

    pub fn activity(&self) -> Option<Activity> {
        self.inner.lock().activity.clone()
    }
}

#[async_trait]
impl Client for MockClient {
    async fn current_user(&self) -> Result<User> {
        Ok(self.inner.lock().current_user.clone())
    }

    async fn send_message(&self, channel_id: ChannelId, message: CreateMessage) -> Result<Message> {
        let mut inner = self.inner.lock();

        if inner.failing_sends > 0 {
            inner.failing_sends -= 1;
            return Err(Error::Forbidden);
        }

        let id = MessageId(inner.next_id);
        inner.next_id += 1;

        let msg = Message {
            id,
            author: inner.current_user.clone(),
            channel_id,
            content: message.content.unwrap_or_default(),
            edited_timestamp: None,
            guild_id: inner
                .channels
                .get(&channel_id)
                .and_then(|channel| channel.guild_id),
            mention_roles: Vec::new(),
            mentions: Vec::new(),
            timestamp: Utc::now(),
        };

        inner.live.insert(id, msg.clone());
        inner.sent.push(msg.clone());

        Ok(msg)
    }

    async fn edit_message(
        &self,
        _channel_id: ChannelId,
        message_id: MessageId,
        message: CreateMessage,
    ) -> Result<Message> {
        let mut inner = self.inner.lock();

        let msg = inner.live.get_mut(&message_id).ok_or(Error::NotFound)?;
        if let Some(content) = message.content {
            msg.content = content;
        }
        msg.edited_timestamp = Some(Utc::now());

        let msg = msg.clone();
        inner.edited.push(msg.clone());

        Ok(msg)
    }

    async fn delete_message(&self, channel_id: ChannelId, message_id: MessageId) -> Result<()> {
        let mut inner = self.inner.lock();

        inner.live.remove(&message_id).ok_or(Error::NotFound)?;
        inner.deleted.push((channel_id, message_id));

        Ok(())
    }

    async fn create_reaction(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        reaction: ReactionType,
    ) -> Result<()> {
        self.inner
            .lock()
            .reactions
            .push((channel_id, message_id, reaction));

        Ok(())
    }

    async fn get_channel(&self, channel_id: ChannelId) -> Result<Channel> {
        Ok(self
            .inner
            .lock()
            .channels
            .get(&channel_id)
            .cloned()
            .unwrap_or(Channel {
                id: channel_id,
                guild_id: None,
                kind: ChannelKind::Text,
                name: None,
                nsfw: false,
            }))
    }

    async fn channel_permissions(
        &self,
        channel_id: ChannelId,
        user_id: UserId,
    ) -> Result<Permissions> {
        let inner = self.inner.lock();

        if inner.failing_permissions {
            return Err(Error::Forbidden);
        }

        Ok(inner
            .permissions
            .get(&(channel_id, user_id))
            .copied()
            .unwrap_or_else(Permissions::all))
    }

    async fn get_user(&self, user_id: UserId) -> Result<User> {
        self.inner
            .lock()
            .users
            .get(&user_id)
            .cloned()
            .ok_or(Error::NotFound)
    }

    async fn get_member(&self, guild_id: GuildId, user_id: UserId) -> Result<Member> {
        self.inner
            .lock()
            .members
            .get(&guild_id)
            .and_then(|members| members.iter().find(|member| member.user.id == user_id))
            .cloned()
            .ok_or(Error::NotFound)
    }

    async fn get_members(&self, guild_id: GuildId) -> Result<Vec<Member>> {
        Ok(self
            .inner
            .lock()
            .members
            .get(&guild_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_roles(&self, guild_id: GuildId) -> Result<Vec<Role>> {
        Ok(self
            .inner
            .lock()
            .roles
            .get(&guild_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn add_member_role(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
    ) -> Result<()> {
        let mut inner = self.inner.lock();

        let role_exists = inner
            .roles
            .get(&guild_id)
            .map_or(false, |roles| roles.iter().any(|role| role.id == role_id));
        if !role_exists {
            return Err(Error::NotFound);
        }

        let member = inner
            .members
            .get_mut(&guild_id)
            .and_then(|members| members.iter_mut().find(|member| member.user.id == user_id))
            .ok_or(Error::NotFound)?;

        if !member.roles.contains(&role_id) {
            member.roles.push(role_id);
        }
        inner.added_roles.push((guild_id, user_id, role_id));

        Ok(())
    }

    async fn set_activity(&self, activity: Option<Activity>) -> Result<()> {
        self.inner.lock().activity = activity;
        Ok(())
    }
}

/// Creates a user named `name` with the discriminator `1`.
pub fn user(id: u64, name: &str) -> User {
    User {
        id: UserId(id),
        avatar: None,
        bot: false,
        discriminator: 1,
        name: name.to_owned(),
    }
}

pub fn member(guild_id: u64, user: User) -> Member {
    Member {
        guild_id: GuildId(guild_id),
        joined_at: None,
        nick: None,
        roles: Vec::new(),
        user,
    }
}

pub fn role(guild_id: u64, id: u64, name: &str, position: i64) -> Role {
    Role {
        id: RoleId(id),
        guild_id: GuildId(guild_id),
        color: Color::default(),
        hoist: false,
        managed: false,
        mentionable: false,
        name: name.to_owned(),
        permissions: Permissions::empty(),
        position,
    }
}

/// Creates an inbound message sent by `author`.
pub fn message(id: u64, author: User, guild_id: Option<u64>, content: &str) -> Message {
    Message {
        id: MessageId(id),
        author,
        channel_id: ChannelId(1),
        content: content.to_owned(),
        edited_timestamp: None,
        guild_id: guild_id.map(GuildId),
        mention_roles: Vec::new(),
        mentions: Vec::new(),
        timestamp: Utc::now(),
    }
}

/// Creates a [`State`] on top of `client` and an empty [`MemStore`], as
/// if the bot just connected.
pub async fn state(client: Arc<MockClient>, config: Config) -> Arc<State> {
    let current_user = client.inner.lock().current_user.clone();

    let state = Arc::new(State::new(config, client, Arc::new(MemStore::new())));
    handlers::ready(&state, current_user).await;

    state
}
