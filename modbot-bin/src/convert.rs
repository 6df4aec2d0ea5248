//! Conversions between serenity and modbot types.
use modbot::builder::{CreateEmbed, CreateMessage};
use modbot::model::{
    Activity, ActivityKind, Channel, ChannelId, ChannelKind, GuildId, Member, Message, MessageId,
    Permissions, Reaction, ReactionType, Role, RoleId, User, UserId,
};
use modbot::util::color::Color;
use serenity::model::channel as raw_channel;
use serenity::model::gateway as raw_gateway;
use serenity::model::guild as raw_guild;
use serenity::model::user as raw_user;

pub fn user(src: raw_user::User) -> User {
    User {
        id: UserId(src.id.0),
        avatar: src.avatar,
        bot: src.bot,
        discriminator: src.discriminator,
        name: src.name,
    }
}

pub fn current_user(src: raw_user::CurrentUser) -> User {
    User {
        id: UserId(src.id.0),
        avatar: src.avatar,
        bot: src.bot,
        discriminator: src.discriminator,
        name: src.name,
    }
}

pub fn member(src: raw_guild::Member) -> Member {
    Member {
        guild_id: GuildId(src.guild_id.0),
        joined_at: src.joined_at,
        nick: src.nick,
        roles: src.roles.into_iter().map(|id| RoleId(id.0)).collect(),
        user: user(src.user),
    }
}

pub fn role(src: raw_guild::Role) -> Role {
    Role {
        id: RoleId(src.id.0),
        guild_id: GuildId(src.guild_id.0),
        color: Color(src.colour.0),
        hoist: src.hoist,
        managed: src.managed,
        mentionable: src.mentionable,
        name: src.name,
        permissions: permissions(src.permissions),
        position: src.position,
    }
}

pub fn permissions(src: serenity::model::Permissions) -> Permissions {
    Permissions::from_bits(src.bits)
}

pub fn message(src: raw_channel::Message) -> Message {
    Message {
        id: MessageId(src.id.0),
        author: user(src.author),
        channel_id: ChannelId(src.channel_id.0),
        content: src.content,
        edited_timestamp: src.edited_timestamp,
        guild_id: src.guild_id.map(|id| GuildId(id.0)),
        mention_roles: src.mention_roles.into_iter().map(|id| RoleId(id.0)).collect(),
        mentions: src.mentions.into_iter().map(user).collect(),
        timestamp: src.timestamp,
    }
}

pub fn channel_kind(src: raw_channel::ChannelType) -> ChannelKind {
    use raw_channel::ChannelType::*;

    match src {
        Text => ChannelKind::Text,
        Private => ChannelKind::Private,
        Voice | Stage => ChannelKind::Voice,
        Category => ChannelKind::Category,
        News => ChannelKind::News,
        NewsThread | PublicThread | PrivateThread => ChannelKind::Thread,
        _ => ChannelKind::Unknown,
    }
}

pub fn channel(src: raw_channel::Channel) -> Channel {
    match src {
        raw_channel::Channel::Guild(channel) => Channel {
            id: ChannelId(channel.id.0),
            guild_id: Some(GuildId(channel.guild_id.0)),
            kind: channel_kind(channel.kind),
            name: Some(channel.name),
            nsfw: channel.nsfw,
        },
        raw_channel::Channel::Private(channel) => Channel {
            id: ChannelId(channel.id.0),
            guild_id: None,
            kind: ChannelKind::Private,
            name: None,
            nsfw: false,
        },
        raw_channel::Channel::Category(channel) => Channel {
            id: ChannelId(channel.id.0),
            guild_id: Some(GuildId(channel.guild_id.0)),
            kind: ChannelKind::Category,
            name: Some(channel.name),
            nsfw: channel.nsfw,
        },
        channel => Channel {
            id: ChannelId(channel.id().0),
            guild_id: None,
            kind: ChannelKind::Unknown,
            name: None,
            nsfw: false,
        },
    }
}

pub fn reaction_type(src: raw_channel::ReactionType) -> ReactionType {
    match src {
        raw_channel::ReactionType::Custom { animated, id, name } => ReactionType::Custom {
            animated,
            id: id.0,
            name,
        },
        raw_channel::ReactionType::Unicode(s) => ReactionType::Unicode(s),
        src => ReactionType::Unicode(src.as_data()),
    }
}

pub fn raw_reaction_type(src: ReactionType) -> raw_channel::ReactionType {
    match src {
        ReactionType::Custom { animated, id, name } => raw_channel::ReactionType::Custom {
            animated,
            id: serenity::model::id::EmojiId(id),
            name,
        },
        ReactionType::Unicode(s) => raw_channel::ReactionType::Unicode(s),
    }
}

pub fn reaction(src: raw_channel::Reaction) -> Reaction {
    Reaction {
        channel_id: ChannelId(src.channel_id.0),
        emoji: reaction_type(src.emoji),
        message_id: MessageId(src.message_id.0),
        user_id: src.user_id.map(|id| UserId(id.0)),
        guild_id: src.guild_id.map(|id| GuildId(id.0)),
    }
}

pub fn raw_activity(src: Activity) -> raw_gateway::Activity {
    match src.kind {
        ActivityKind::Playing => raw_gateway::Activity::playing(&src.name),
        ActivityKind::Streaming => {
            raw_gateway::Activity::streaming(&src.name, src.url.as_deref().unwrap_or_default())
        }
        ActivityKind::Listening => raw_gateway::Activity::listening(&src.name),
        ActivityKind::Watching => raw_gateway::Activity::watching(&src.name),
    }
}

/// Fills a serenity message builder from a [`CreateMessage`].
pub fn fill_message(src: CreateMessage, builder: &mut serenity::builder::CreateMessage) {
    if let Some(content) = src.content {
        builder.content(content);
    }

    if let Some((channel_id, message_id)) = src.reference_message {
        builder.reference_message((
            serenity::model::id::ChannelId(channel_id.0),
            serenity::model::id::MessageId(message_id.0),
        ));
    }

    if let Some(embed) = src.embed {
        builder.embed(|e| {
            fill_embed(embed, e);
            e
        });
    }
}

/// Fills a serenity edit builder from a [`CreateMessage`]. Message
/// references cannot be edited.
pub fn fill_edit(src: CreateMessage, builder: &mut serenity::builder::EditMessage) {
    if let Some(content) = src.content {
        builder.content(content);
    }

    if let Some(embed) = src.embed {
        builder.embed(|e| {
            fill_embed(embed, e);
            e
        });
    }
}

pub fn fill_embed(src: CreateEmbed, builder: &mut serenity::builder::CreateEmbed) {
    if let Some(author) = src.author {
        builder.author(|a| {
            a.name(author.name);
            if let Some(icon_url) = author.icon_url {
                a.icon_url(icon_url);
            }
            a
        });
    }

    if let Some(color) = src.color {
        builder.color(color.0);
    }

    if let Some(description) = src.description {
        builder.description(description);
    }

    for field in src.fields {
        builder.field(field.name, field.value, field.inline);
    }

    if let Some(footer) = src.footer {
        builder.footer(|f| f.text(footer));
    }

    if let Some(thumbnail) = src.thumbnail {
        builder.thumbnail(thumbnail);
    }

    if let Some(timestamp) = src.timestamp {
        builder.timestamp(&timestamp);
    }

    if let Some(title) = src.title {
        builder.title(title);
    }
}
