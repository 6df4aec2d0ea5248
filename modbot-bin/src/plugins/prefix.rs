use async_trait::async_trait;
use modbot::builder::CreateMessage;
use modbot::permissions::Permission;
use modbot::{Arguments, Error, Result};
use modbot_core::context::MessageContext;
use modbot_core::module::{Module, ModuleInfo};
use modbot_core::prefix::guild_key;

const MAX_PREFIX_LEN: usize = 10;

pub struct Prefix {
    info: ModuleInfo,
}

pub fn new() -> Result<Box<dyn Module>> {
    Ok(Box::new(Prefix {
        info: ModuleInfo {
            aliases: &["prefix"],
            category: "Moderation",
            usage_doc: "{prefix}{aliases} [new prefix|reset]",
            short_doc: "Show or change the prefix used in this guild.",
            user_perms: &[Permission::MANAGE_GUILD],
            guild_only: true,
            ..ModuleInfo::new("prefix")
        },
    }))
}

#[async_trait]
impl Module for Prefix {
    fn info(&self) -> &ModuleInfo {
        &self.info
    }

    async fn on_call(&self, ctx: &MessageContext, args: &Arguments) -> Result<Option<CreateMessage>> {
        let guild_id = ctx.guild_id().ok_or(Error::InvalidCommandUsage)?;

        if args.len() == 1 {
            return Ok(Some(CreateMessage::from(format!(
                "Current prefix: `{}`",
                ctx.local_prefix()
            ))));
        }

        let prefix = args.rest(1);

        if prefix.eq_ignore_ascii_case("reset") {
            ctx.store().delete(&guild_key(guild_id)).await?;
            ctx.state.prefixes().set_guild(guild_id, None);

            return Ok(Some(CreateMessage::from(format!(
                "Prefix reset to `{}`",
                ctx.local_prefix()
            ))));
        }

        if prefix.chars().count() > MAX_PREFIX_LEN {
            return Ok(Some(CreateMessage::warn(format!(
                "Prefix can't be longer than {} characters",
                MAX_PREFIX_LEN
            ))));
        }

        ctx.store().set(&guild_key(guild_id), &prefix).await?;
        ctx.state.prefixes().set_guild(guild_id, Some(prefix.clone()));

        log::info!("[PREFIX] Prefix of guild {} set to {}", guild_id, prefix);

        Ok(Some(CreateMessage::from(format!("Prefix set to `{}`", prefix))))
    }
}

#[cfg(test)]
mod tests {
    use crate::plugins::testing::{content, dispatch, setup, GUILD};

    use modbot::model::GuildId;
    use modbot_core::prefix::guild_key;
    use modbot_core::testing;

    #[tokio::test(start_paused = true)]
    async fn test_prefix() {
        let (_, state) = setup(&[super::new]).await;
        let alice = || testing::user(2, "alice");

        assert_eq!(
            content(dispatch(&state, alice(), Some(GUILD), "prefix").await).as_deref(),
            Some("Current prefix: `+`")
        );
        assert_eq!(
            content(dispatch(&state, alice(), Some(GUILD), "prefix !!").await).as_deref(),
            Some("Prefix set to `!!`")
        );
        assert_eq!(
            state.store().get(&guild_key(GuildId(GUILD))).await.unwrap().as_deref(),
            Some("!!")
        );
        assert_eq!(state.prefixes().local_prefix(Some(GuildId(GUILD))), "!!");

        assert_eq!(
            content(dispatch(&state, alice(), Some(GUILD), "prefix abcdefghijk").await).as_deref(),
            Some("⚠ Prefix can't be longer than 10 characters")
        );
        assert_eq!(
            content(dispatch(&state, alice(), Some(GUILD), "prefix reset").await).as_deref(),
            Some("Prefix reset to `+`")
        );
        assert!(!state.store().exists(&guild_key(GuildId(GUILD))).await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_guild_only() {
        let (_, state) = setup(&[super::new]).await;

        assert_eq!(
            content(dispatch(&state, testing::user(2, "alice"), None, "prefix !").await).as_deref(),
            Some("❗ This command can only be used in guild")
        );
    }
}
