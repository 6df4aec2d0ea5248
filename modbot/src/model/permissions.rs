use serde::{Deserialize, Serialize};

use std::ops::{BitOr, BitOrAssign};

/// A set of guild permission bits.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permissions {
    pub bits: u64,
}

macro_rules! permissions {
    ($($name:ident = $shift:expr),* $(,)?) => {
        impl Permissions {
            $(
                pub const $name: Self = Self::from_bits(1 << $shift);
            )*
        }
    };
}

permissions! {
    CREATE_INSTANT_INVITE = 0,
    KICK_MEMBERS = 1,
    BAN_MEMBERS = 2,
    ADMINISTRATOR = 3,
    MANAGE_CHANNELS = 4,
    MANAGE_GUILD = 5,
    ADD_REACTIONS = 6,
    VIEW_AUDIT_LOG = 7,
    PRIORITY_SPEAKER = 8,
    STREAM = 9,
    VIEW_CHANNEL = 10,
    SEND_MESSAGES = 11,
    SEND_TTS_MESSAGES = 12,
    MANAGE_MESSAGES = 13,
    EMBED_LINKS = 14,
    ATTACH_FILES = 15,
    READ_MESSAGE_HISTORY = 16,
    MENTION_EVERYONE = 17,
    USE_EXTERNAL_EMOJIS = 18,
    VIEW_GUILD_INSIGHTS = 19,
    CONNECT = 20,
    SPEAK = 21,
    MUTE_MEMBERS = 22,
    DEAFEN_MEMBERS = 23,
    MOVE_MEMBERS = 24,
    USE_VAD = 25,
    CHANGE_NICKNAME = 26,
    MANAGE_NICKNAMES = 27,
    MANAGE_ROLES = 28,
    MANAGE_WEBHOOKS = 29,
    MANAGE_EMOJIS = 30,
}

impl Permissions {
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    pub const fn all() -> Self {
        Self {
            bits: (1 << 31) - 1,
        }
    }

    pub const fn from_bits(bits: u64) -> Self {
        Self { bits }
    }

    /// Returns `true` if all bits of `other` are set in `self`. The
    /// administrator bit implies every other permission.
    pub const fn contains(&self, other: Self) -> bool {
        if self.bits & Self::ADMINISTRATOR.bits != 0 {
            return true;
        }

        self.bits & other.bits == other.bits
    }

    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }
}

impl BitOr for Permissions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self {
            bits: self.bits | rhs.bits,
        }
    }
}

impl BitOrAssign for Permissions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.bits |= rhs.bits;
    }
}

#[cfg(test)]
mod tests {
    use super::Permissions;

    #[test]
    fn test_permissions_contains() {
        let perms = Permissions::SEND_MESSAGES | Permissions::MANAGE_ROLES;
        assert!(perms.contains(Permissions::SEND_MESSAGES));
        assert!(perms.contains(Permissions::MANAGE_ROLES | Permissions::SEND_MESSAGES));
        assert!(!perms.contains(Permissions::BAN_MEMBERS));

        assert!(Permissions::ADMINISTRATOR.contains(Permissions::MANAGE_GUILD));
        assert!(Permissions::empty().contains(Permissions::empty()));
    }
}
