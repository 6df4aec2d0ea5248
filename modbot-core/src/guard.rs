use crate::context::MessageContext;
use crate::manager::LoadedModule;
use crate::permissions::missing_permissions;
use crate::ratelimit::ScopeKey;

use modbot::arguments::FlagParseError;
use modbot::permissions::MissingPermission;
use modbot::{Arguments, Error};

use std::time::Duration;

/// The result of checking whether a module may be called.
#[derive(Debug)]
pub enum GuardOutcome {
    Passed,
    /// The module is guild only and was invoked in direct messages.
    GuildOnly,
    /// The module is nsfw only and the channel is not marked as nsfw.
    Nsfw,
    FlagError(FlagParseError),
    NotEnoughArgs,
    TooManyArgs,
    MissingPermissions(Vec<MissingPermission>),
    /// The ratelimit is exhausted for the given time.
    Ratelimited(Duration),
    /// A check could not be completed.
    Failed(Error),
}

/// Runs all checks of `module` against the message in order and returns
/// the first failure. Flags are parsed out of `args` on the way.
///
/// The order is: guild, nsfw, flags, argument count, permissions,
/// ratelimit. A call is only consumed from the ratelimit if all other
/// checks passed.
pub async fn evaluate_guards(
    module: &LoadedModule,
    ctx: &MessageContext,
    args: &mut Arguments,
) -> GuardOutcome {
    let info = module.info();

    if info.guild_only && ctx.event.guild_id.is_none() {
        return GuardOutcome::GuildOnly;
    }

    if info.nsfw {
        match ctx.channel().await {
            Ok(channel) if channel.nsfw || channel.is_private() => (),
            Ok(_) => return GuardOutcome::Nsfw,
            Err(err) => return GuardOutcome::Failed(err.into()),
        }
    }

    if let Err(err) = args.parse_flags(info.flags) {
        return GuardOutcome::FlagError(err);
    }

    let extra = args.len().saturating_sub(1);

    if extra < info.min_args {
        return GuardOutcome::NotEnoughArgs;
    }

    if matches!(info.max_args, Some(max_args) if extra > max_args) {
        return GuardOutcome::TooManyArgs;
    }

    match missing_permissions(ctx, info).await {
        Ok(missing) if missing.is_empty() => (),
        Ok(missing) => return GuardOutcome::MissingPermissions(missing),
        Err(err) => return GuardOutcome::Failed(err.into()),
    }

    let key = ScopeKey::new(info.ratelimit_kind, &ctx.event);
    let (calls_left, time_left) = module.ratelimiter().test(key);
    if calls_left == 0 {
        return GuardOutcome::Ratelimited(time_left);
    }

    GuardOutcome::Passed
}
