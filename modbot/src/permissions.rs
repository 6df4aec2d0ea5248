use crate::model::Permissions;

/// A capability required to run a command.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Permission {
    pub name: &'static str,
    pub kind: PermissionKind,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PermissionKind {
    /// The actor needs all of the given permissions in the invoking
    /// channel. Always granted in direct messages.
    Guild(Permissions),
    /// The actor must be the configured bot owner.
    BotOwner,
}

macro_rules! guild_permissions {
    ($($name:ident => $str:literal),* $(,)?) => {
        impl Permission {
            $(
                pub const $name: Self = Self::guild($str, Permissions::$name);
            )*
        }
    };
}

guild_permissions! {
    ADMINISTRATOR => "administrator",
    KICK_MEMBERS => "kick_members",
    BAN_MEMBERS => "ban_members",
    MANAGE_CHANNELS => "manage_channels",
    MANAGE_GUILD => "manage_guild",
    ADD_REACTIONS => "add_reactions",
    VIEW_CHANNEL => "view_channel",
    SEND_MESSAGES => "send_messages",
    MANAGE_MESSAGES => "manage_messages",
    EMBED_LINKS => "embed_links",
    ATTACH_FILES => "attach_files",
    READ_MESSAGE_HISTORY => "read_message_history",
    MENTION_EVERYONE => "mention_everyone",
    MANAGE_NICKNAMES => "manage_nicknames",
    MANAGE_ROLES => "manage_roles",
}

impl Permission {
    pub const BOT_OWNER: Self = Self {
        name: "bot_owner",
        kind: PermissionKind::BotOwner,
    };

    pub const fn guild(name: &'static str, permissions: Permissions) -> Self {
        Self {
            name,
            kind: PermissionKind::Guild(permissions),
        }
    }
}

/// A [`Permission`] that was not granted, either to the bot or to the
/// invoking user.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MissingPermission {
    pub permission: Permission,
    /// `true` if the bot lacks the permission, `false` if the user does.
    pub bot: bool,
}

impl MissingPermission {
    pub const fn bot(permission: Permission) -> Self {
        Self {
            permission,
            bot: true,
        }
    }

    pub const fn user(permission: Permission) -> Self {
        Self {
            permission,
            bot: false,
        }
    }
}
