use async_trait::async_trait;
use modbot::arguments::Flag;
use modbot::builder::CreateMessage;
use modbot::model::{GuildId, Member, Role, RoleId, UserId};
use modbot::permissions::Permission;
use modbot::util::color::Color;
use modbot::{Arguments, Client, Error, Result};
use modbot_core::context::{MessageContext, StateContext};
use modbot_core::module::{Module, ModuleInfo};
use modbot_core::search;

const FLAGS: &[Flag] = &[Flag::new("bots").alias('b').doc("manage autoroles for bots")];

pub struct Autorole {
    info: ModuleInfo,
}

pub fn new() -> Result<Box<dyn Module>> {
    Ok(Box::new(Autorole {
        info: ModuleInfo {
            aliases: &["autorole", "autoroles"],
            category: "Moderation",
            usage_doc: "{prefix}{aliases} [add|remove <role>]",
            short_doc: "Manage roles given to new members.",
            long_doc: "Without arguments the current autoroles are listed.",
            bot_perms: &[Permission::MANAGE_ROLES],
            user_perms: &[Permission::MANAGE_ROLES],
            flags: FLAGS,
            guild_only: true,
            ..ModuleInfo::new("autorole")
        },
    }))
}

fn key(guild_id: GuildId, bots: bool) -> String {
    if bots {
        format!("autorole_bots:{}", guild_id)
    } else {
        format!("autorole:{}", guild_id)
    }
}

fn target(bots: bool) -> &'static str {
    if bots {
        " for bots"
    } else {
        ""
    }
}

#[async_trait]
impl Module for Autorole {
    fn info(&self) -> &ModuleInfo {
        &self.info
    }

    async fn on_call(&self, ctx: &MessageContext, args: &Arguments) -> Result<Option<CreateMessage>> {
        let guild_id = ctx.guild_id().ok_or(Error::InvalidCommandUsage)?;

        if args.len() == 1 {
            return list(ctx, guild_id).await;
        }

        if args.len() < 3 {
            return Err(Error::InvalidCommandUsage);
        }

        let bots = args.has_flag("bots");
        let pattern = args.rest(2);

        match args[1].to_lowercase().as_str() {
            "add" | "set" => add(ctx, guild_id, &pattern, bots).await,
            "remove" | "delete" => remove(ctx, guild_id, &pattern, bots).await,
            _ => Err(Error::InvalidCommandUsage),
        }
    }

    async fn on_member_join(&self, ctx: &StateContext, member: &Member) -> Result {
        let key = key(member.guild_id, member.user.bot);

        for value in ctx.store().smembers(&key).await? {
            let role_id = match value.parse::<RoleId>() {
                Ok(role_id) => role_id,
                Err(_) => {
                    log::warn!("[AUTOROLE] Removing invalid autorole {} from {}", value, key);
                    ctx.store().srem(&key, &value).await?;
                    continue;
                }
            };

            match ctx
                .client()
                .add_member_role(member.guild_id, member.user.id, role_id)
                .await
            {
                Ok(()) => (),
                Err(err) if err.is_not_found() => {
                    if !role_exists(ctx.client(), member.guild_id, role_id).await? {
                        log::info!(
                            "[AUTOROLE] Role {} was deleted, removing it from {}",
                            role_id,
                            key
                        );
                        ctx.store().srem(&key, &value).await?;
                    }
                }
                Err(err) => log::warn!(
                    "[AUTOROLE] Failed to add role {} to {} in {}: {}",
                    role_id,
                    member.user.id,
                    member.guild_id,
                    err
                ),
            }
        }

        Ok(())
    }
}

async fn role_exists(client: &dyn Client, guild_id: GuildId, role_id: RoleId) -> Result<bool> {
    let roles = client.get_roles(guild_id).await?;

    Ok(roles.iter().any(|role| role.id == role_id))
}

async fn list(ctx: &MessageContext, guild_id: GuildId) -> Result<Option<CreateMessage>> {
    let humans = ctx.store().smembers(&key(guild_id, false)).await?;
    let bots = ctx.store().smembers(&key(guild_id, true)).await?;

    if humans.is_empty() && bots.is_empty() {
        return Ok(Some(CreateMessage::warn("No autoroles set")));
    }

    let mentions = |ids: &[String]| match ids {
        [] => String::from("-"),
        ids => ids
            .iter()
            .map(|id| format!("<@&{}>", id))
            .collect::<Vec<_>>()
            .join(", "),
    };

    Ok(Some(CreateMessage::new(|m| {
        m.embed(|e| {
            e.title("Guild autoroles");
            e.color(Color::GOLD);
            e.field("Humans", mentions(&humans), false);
            e.field("Robots", mentions(&bots), false);
        });
    })))
}

/// Returns the position of the highest role of `user_id`.
async fn top_position(
    client: &dyn Client,
    guild_id: GuildId,
    roles: &[Role],
    user_id: UserId,
) -> Result<i64> {
    let member = client.get_member(guild_id, user_id).await?;

    Ok(roles
        .iter()
        .filter(|role| member.roles.contains(&role.id))
        .map(|role| role.position)
        .max()
        .unwrap_or(0))
}

async fn add(
    ctx: &MessageContext,
    guild_id: GuildId,
    pattern: &str,
    bots: bool,
) -> Result<Option<CreateMessage>> {
    let role = match search::find_role(ctx, guild_id, pattern).await? {
        Some(role) => role,
        None => return Ok(Some(CreateMessage::warn("Role not found"))),
    };

    let roles = ctx.client().get_roles(guild_id).await?;
    let author = ctx.event.author.id;

    if role.position >= top_position(ctx.client(), guild_id, &roles, author).await? {
        return Ok(Some(CreateMessage::warn(
            "Role is higher or equal to your top role",
        )));
    }

    let permissions = ctx
        .client()
        .channel_permissions(ctx.event.channel_id, author)
        .await?;
    if !permissions.contains(role.permissions) {
        return Ok(Some(CreateMessage::warn(
            "Role has higher permissions than you in guild",
        )));
    }

    let me = ctx.client().current_user().await?;
    if role.position >= top_position(ctx.client(), guild_id, &roles, me.id).await? {
        return Ok(Some(CreateMessage::warn(
            "Role is higher or equal to my top role, I won't be able to assign it",
        )));
    }

    ctx.store()
        .sadd(&key(guild_id, bots), &role.id.to_string())
        .await?;

    Ok(Some(CreateMessage::from(format!(
        "Set {} as autorole{}",
        role.mention(),
        target(bots)
    ))))
}

async fn remove(
    ctx: &MessageContext,
    guild_id: GuildId,
    pattern: &str,
    bots: bool,
) -> Result<Option<CreateMessage>> {
    // Deleted roles can still be removed by id.
    let role_id = match search::find_role(ctx, guild_id, pattern).await? {
        Some(role) => role.id,
        None => match pattern.parse::<RoleId>() {
            Ok(role_id) => role_id,
            Err(_) => return Ok(Some(CreateMessage::warn("Role not found"))),
        },
    };

    if !ctx
        .store()
        .srem(&key(guild_id, bots), &role_id.to_string())
        .await?
    {
        return Ok(Some(CreateMessage::warn(format!(
            "<@&{}> is not an autorole{}",
            role_id,
            target(bots)
        ))));
    }

    Ok(Some(CreateMessage::from(format!(
        "Removed <@&{}> autorole{}",
        role_id,
        target(bots)
    ))))
}
