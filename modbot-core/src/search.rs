use crate::context::MessageContext;

use modbot::client;
use modbot::model::{GuildId, Member, Role, RoleId, User, UserId};

/// The result of [`find_member`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Found {
    /// A member of the guild the message was sent in.
    Member(Member),
    /// A user that is not a member of the guild.
    User(User),
}

impl Found {
    pub fn user(&self) -> &User {
        match self {
            Self::Member(member) => &member.user,
            Self::User(user) => user,
        }
    }

    pub fn member(&self) -> Option<&Member> {
        match self {
            Self::Member(member) => Some(member),
            Self::User(_) => None,
        }
    }
}

/// Finds a user by mention, id, tag, name or nickname.
///
/// Ids are first resolved as members of the current guild and then as
/// global users. Names are only searched within the current guild and
/// prefer earlier matches, then earlier join dates.
pub async fn find_member(ctx: &MessageContext, pattern: &str) -> client::Result<Option<Found>> {
    if let Ok(user_id) = pattern.parse::<UserId>() {
        if let Some(guild_id) = ctx.event.guild_id {
            match ctx.client().get_member(guild_id, user_id).await {
                Ok(member) => return Ok(Some(Found::Member(member))),
                Err(err) if err.is_not_found() => (),
                Err(err) => return Err(err),
            }
        }

        return match ctx.client().get_user(user_id).await {
            Ok(user) => Ok(Some(Found::User(user))),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        };
    }

    let guild_id = match ctx.event.guild_id {
        Some(guild_id) => guild_id,
        None => return Ok(None),
    };

    let members = ctx.client().get_members(guild_id).await?;

    Ok(match_member(members, pattern).map(Found::Member))
}

fn match_member(members: Vec<Member>, pattern: &str) -> Option<Member> {
    let pattern = pattern.to_lowercase();

    let mut found: Vec<(usize, Member)> = members
        .into_iter()
        .filter_map(|member| {
            let pos = member
                .nick
                .as_ref()
                .and_then(|nick| nick.to_lowercase().find(&pattern))
                .or_else(|| member.user.tag().to_lowercase().find(&pattern))?;

            Some((pos, member))
        })
        .collect();

    found.sort_by(|(a_pos, a), (b_pos, b)| {
        a_pos
            .cmp(b_pos)
            .then_with(|| a.joined_at.cmp(&b.joined_at))
    });

    found.into_iter().next().map(|(_, member)| member)
}

/// Finds a role of `guild_id` by mention, id or name.
pub async fn find_role(
    ctx: &MessageContext,
    guild_id: GuildId,
    pattern: &str,
) -> client::Result<Option<Role>> {
    let roles = ctx.client().get_roles(guild_id).await?;

    Ok(match_role(roles, pattern))
}

fn match_role(roles: Vec<Role>, pattern: &str) -> Option<Role> {
    if let Ok(role_id) = pattern.parse::<RoleId>() {
        return roles.into_iter().find(|role| role.id == role_id);
    }

    let pattern = pattern.to_lowercase();

    roles
        .into_iter()
        .find(|role| role.name.to_lowercase() == pattern)
}
