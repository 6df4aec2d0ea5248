use async_trait::async_trait;
use modbot::builder::CreateMessage;
use modbot::permissions::Permission;
use modbot::{Arguments, Error, Result};
use modbot_core::context::MessageContext;
use modbot_core::module::{Module, ModuleInfo};

use std::time::Duration;

const CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(30);

pub struct Stop {
    info: ModuleInfo,
}

pub fn new() -> Result<Box<dyn Module>> {
    Ok(Box::new(Stop {
        info: ModuleInfo {
            aliases: &["stop", "die"],
            category: "Owner",
            usage_doc: "{prefix}{aliases} [exit code]",
            short_doc: "Stop the bot.",
            user_perms: &[Permission::BOT_OWNER],
            max_args: Some(1),
            hidden: true,
            ..ModuleInfo::new("stop")
        },
    }))
}

#[async_trait]
impl Module for Stop {
    fn info(&self) -> &ModuleInfo {
        &self.info
    }

    async fn on_call(&self, ctx: &MessageContext, args: &Arguments) -> Result<Option<CreateMessage>> {
        let code = match args.get(1) {
            Some(_) => args.parse_at::<i32>(1)?,
            None => 0,
        };

        match ctx
            .request_confirmation("Are you sure you want to stop the bot?", CONFIRMATION_TIMEOUT)
            .await
        {
            Ok(true) => (),
            Ok(false) => return Ok(Some(CreateMessage::from("Cancelled"))),
            Err(Error::HookTimeout) => {
                return Ok(Some(CreateMessage::warn("Confirmation timed out")))
            }
            Err(err) => return Err(err),
        }

        if let Err(err) = ctx.react('✅').await {
            log::debug!("[STOP] Failed to react: {}", err);
        }

        log::info!("[STOP] Stop requested by {}", ctx.event.author.tag());
        ctx.state.shutdown(code);

        Ok(None)
    }
}
