use super::id::{GuildId, RoleId};
use super::permissions::Permissions;
use crate::util::color::Color;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub guild_id: GuildId,
    pub color: Color,
    pub hoist: bool,
    pub managed: bool,
    pub mentionable: bool,
    pub name: String,
    pub permissions: Permissions,
    pub position: i64,
}

impl Role {
    pub fn mention(&self) -> String {
        format!("<@&{}>", self.id)
    }

    /// Returns `true` if this role is the implicit `@everyone` role of
    /// its guild.
    pub fn is_everyone(&self) -> bool {
        self.id.0 == self.guild_id.0
    }
}
