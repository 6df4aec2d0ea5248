use super::id::{GuildId, RoleId, UserId};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub avatar: Option<String>,
    pub bot: bool,
    pub discriminator: u16,
    #[serde(rename = "username")]
    pub name: String,
}

impl User {
    /// Returns the `name#discriminator` representation of the user.
    pub fn tag(&self) -> String {
        format!("{}#{:04}", self.name, self.discriminator)
    }

    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }

    pub fn avatar_url(&self) -> Option<String> {
        self.avatar.as_ref().map(|hash| {
            let ext = if hash.starts_with("a_") { "gif" } else { "webp" };

            format!(
                "https://cdn.discordapp.com/avatars/{}/{}.{}?size=1024",
                self.id, hash, ext
            )
        })
    }

    /// Returns the avatar url, falling back to the default avatar.
    pub fn face(&self) -> String {
        self.avatar_url().unwrap_or_else(|| {
            format!(
                "https://cdn.discordapp.com/embed/avatars/{}.png",
                self.discriminator % 5
            )
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub guild_id: GuildId,
    pub joined_at: Option<DateTime<Utc>>,
    pub nick: Option<String>,
    pub roles: Vec<RoleId>,
    pub user: User,
}

impl Member {
    /// Returns the nickname of the member, or the username if no
    /// nickname is set.
    pub fn display_name(&self) -> &str {
        self.nick.as_deref().unwrap_or(&self.user.name)
    }
}

#[cfg(test)]
mod tests {
    use super::{Member, User};
    use crate::model::id::{GuildId, UserId};

    fn user() -> User {
        User {
            id: UserId(42),
            avatar: None,
            bot: false,
            discriminator: 7,
            name: String::from("ferris"),
        }
    }

    #[test]
    fn test_user_tag() {
        assert_eq!(user().tag(), "ferris#0007");
        assert_eq!(user().mention(), "<@42>");
    }

    #[test]
    fn test_user_face() {
        let mut user = user();
        assert_eq!(user.face(), "https://cdn.discordapp.com/embed/avatars/2.png");

        user.avatar = Some(String::from("a_abc"));
        assert_eq!(
            user.face(),
            "https://cdn.discordapp.com/avatars/42/a_abc.gif?size=1024"
        );
    }

    #[test]
    fn test_member_display_name() {
        let mut member = Member {
            guild_id: GuildId(1),
            joined_at: None,
            nick: None,
            roles: Vec::new(),
            user: user(),
        };
        assert_eq!(member.display_name(), "ferris");

        member.nick = Some(String::from("crab"));
        assert_eq!(member.display_name(), "crab");
    }
}
