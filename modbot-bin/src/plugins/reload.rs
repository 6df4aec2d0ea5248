use async_trait::async_trait;
use modbot::builder::CreateMessage;
use modbot::permissions::Permission;
use modbot::{Arguments, Result};
use modbot_core::context::MessageContext;
use modbot_core::module::{Module, ModuleInfo};

pub struct Reload {
    info: ModuleInfo,
}

pub fn new() -> Result<Box<dyn Module>> {
    Ok(Box::new(Reload {
        info: ModuleInfo {
            aliases: &["reload"],
            category: "Owner",
            usage_doc: "{prefix}{aliases} [module]",
            short_doc: "Reload one or all modules.",
            user_perms: &[Permission::BOT_OWNER],
            max_args: Some(1),
            hidden: true,
            ..ModuleInfo::new("reload")
        },
    }))
}

#[async_trait]
impl Module for Reload {
    fn info(&self) -> &ModuleInfo {
        &self.info
    }

    async fn on_call(&self, ctx: &MessageContext, args: &Arguments) -> Result<Option<CreateMessage>> {
        let modules = ctx.state.modules();
        let state_ctx = ctx.with_event(());

        let target = match args.get(1) {
            Some(target) => target.to_lowercase(),
            None => {
                modules.reload_modules(&state_ctx).await?;

                return Ok(Some(CreateMessage::from(format!(
                    "Reloaded {} modules",
                    modules.names().len()
                ))));
            }
        };

        // Disabled modules are only found by name.
        let name = match modules.get_module(&target) {
            Some(module) => module.info().name,
            None => match modules.names().into_iter().find(|name| *name == target) {
                Some(name) => name,
                None => {
                    return Ok(Some(CreateMessage::warn(format!(
                        "Module `{}` not found",
                        target
                    ))))
                }
            },
        };

        modules.reload_module(&state_ctx, name).await?;

        Ok(Some(CreateMessage::from(format!(
            "Reloaded module `{}`",
            name
        ))))
    }
}

#[cfg(test)]
mod tests {
    use crate::plugins::testing::{content, dispatch, owner, setup};
    use crate::plugins::{ping, reload};

    #[tokio::test(start_paused = true)]
    async fn test_reload() {
        let (_, state) = setup(&[reload::new, ping::new]).await;

        assert_eq!(
            content(dispatch(&state, owner(), None, "reload").await).as_deref(),
            Some("Reloaded 2 modules")
        );
        assert_eq!(
            content(dispatch(&state, owner(), None, "reload PING").await).as_deref(),
            Some("Reloaded module `ping`")
        );
        assert_eq!(
            content(dispatch(&state, owner(), None, "reload nope").await).as_deref(),
            Some("⚠ Module `nope` not found")
        );

        state.modules().set_disabled("ping", true).unwrap();
        dispatch(&state, owner(), None, "reload ping").await;
        assert!(state.modules().get_module("ping").is_some());
    }
}
