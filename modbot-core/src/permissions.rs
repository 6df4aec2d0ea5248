use crate::context::MessageContext;
use crate::module::ModuleInfo;

use modbot::client;
use modbot::model::{Permissions, UserId};
use modbot::permissions::{MissingPermission, Permission, PermissionKind};

use std::collections::HashMap;

/// Returns all permissions of `info` that are not granted to the bot or
/// the author of the message in its channel.
pub async fn missing_permissions(
    ctx: &MessageContext,
    info: &ModuleInfo,
) -> client::Result<Vec<MissingPermission>> {
    let mut checker = Checker::new(ctx);
    let mut missing = Vec::new();

    if !info.bot_perms.is_empty() {
        let bot_id = match ctx.state.current_user() {
            Some(user) => user.id,
            None => ctx.client().current_user().await?.id,
        };

        for perm in info.bot_perms {
            if !checker.has_permission(bot_id, perm).await? {
                missing.push(MissingPermission::bot(*perm));
            }
        }
    }

    for perm in info.user_perms {
        if !checker.has_permission(ctx.event.author.id, perm).await? {
            missing.push(MissingPermission::user(*perm));
        }
    }

    Ok(missing)
}

/// Returns `Ok(())` if the author of the message has `perm`. Otherwise
/// the missing permission is returned as an error, ready to be raised
/// from a module callback.
pub async fn require(ctx: &MessageContext, perm: Permission) -> modbot::Result {
    let mut checker = Checker::new(ctx);

    if checker.has_permission(ctx.event.author.id, &perm).await? {
        Ok(())
    } else {
        Err(modbot::Error::MissingPermissions(vec![
            MissingPermission::user(perm),
        ]))
    }
}

/// Caches channel permissions for the duration of a single check.
struct Checker<'a> {
    ctx: &'a MessageContext,
    cache: HashMap<UserId, Permissions>,
}

impl<'a> Checker<'a> {
    fn new(ctx: &'a MessageContext) -> Self {
        Self {
            ctx,
            cache: HashMap::new(),
        }
    }

    async fn has_permission(&mut self, user_id: UserId, perm: &Permission) -> client::Result<bool> {
        match perm.kind {
            PermissionKind::BotOwner => Ok(user_id == self.ctx.state.config.owner),
            // Guild permissions do not apply in direct messages.
            PermissionKind::Guild(_) if self.ctx.event.guild_id.is_none() => Ok(true),
            PermissionKind::Guild(required) => {
                let permissions = match self.cache.get(&user_id) {
                    Some(permissions) => *permissions,
                    None => {
                        let permissions = self
                            .ctx
                            .client()
                            .channel_permissions(self.ctx.event.channel_id, user_id)
                            .await?;

                        self.cache.insert(user_id, permissions);
                        permissions
                    }
                };

                Ok(permissions.contains(required))
            }
        }
    }
}
