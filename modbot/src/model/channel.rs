use super::id::{ChannelId, GuildId, MessageId, RoleId, UserId};
use super::user::User;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt::{self, Display, Formatter};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub author: User,
    pub channel_id: ChannelId,
    pub content: String,
    pub edited_timestamp: Option<DateTime<Utc>>,
    pub guild_id: Option<GuildId>,
    pub mention_roles: Vec<RoleId>,
    pub mentions: Vec<User>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn is_private(&self) -> bool {
        self.guild_id.is_none()
    }
}

impl AsRef<ChannelId> for Message {
    fn as_ref(&self) -> &ChannelId {
        &self.channel_id
    }
}

impl AsRef<MessageId> for Message {
    fn as_ref(&self) -> &MessageId {
        &self.id
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelKind {
    Text,
    Private,
    Voice,
    Category,
    News,
    Thread,
    Unknown,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: ChannelId,
    pub guild_id: Option<GuildId>,
    pub kind: ChannelKind,
    pub name: Option<String>,
    pub nsfw: bool,
}

impl Channel {
    pub fn is_private(&self) -> bool {
        self.kind == ChannelKind::Private
    }
}

/// An Emoji reaction to a Message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    /// The [`ChannelId`] of the [`Message`] that was reacted to.
    pub channel_id: ChannelId,
    /// The Emoji reacted with.
    pub emoji: ReactionType,
    /// The [`MessageId`] of the [`Message`] that was reacted to.
    pub message_id: MessageId,
    pub user_id: Option<UserId>,
    /// The [`GuildId`] of the [`Message`], if it was sent in a Guild.
    pub guild_id: Option<GuildId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReactionType {
    Custom {
        animated: bool,
        id: u64,
        name: Option<String>,
    },
    Unicode(String),
}

impl From<char> for ReactionType {
    fn from(c: char) -> Self {
        Self::Unicode(c.to_string())
    }
}

impl From<&str> for ReactionType {
    fn from(s: &str) -> Self {
        Self::Unicode(s.to_owned())
    }
}

impl PartialEq<&str> for ReactionType {
    fn eq(&self, other: &&str) -> bool {
        match self {
            Self::Unicode(s) => s == other,
            Self::Custom { .. } => false,
        }
    }
}

/// The presence activity shown for the bot user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub kind: ActivityKind,
    pub name: String,
    /// Only used for [`ActivityKind::Streaming`].
    pub url: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityKind {
    Playing,
    Streaming,
    Listening,
    Watching,
}

impl ActivityKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "playing" => Some(Self::Playing),
            "streaming" => Some(Self::Streaming),
            "listening" => Some(Self::Listening),
            "watching" => Some(Self::Watching),
            _ => None,
        }
    }
}

impl Display for ActivityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Playing => "playing",
            Self::Streaming => "streaming",
            Self::Listening => "listening",
            Self::Watching => "watching",
        })
    }
}
