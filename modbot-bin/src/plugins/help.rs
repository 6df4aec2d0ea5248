use async_trait::async_trait;
use modbot::arguments::Flag;
use modbot::builder::CreateMessage;
use modbot::permissions::Permission;
use modbot::util::color::Color;
use modbot::{Arguments, Result};
use modbot_core::context::MessageContext;
use modbot_core::module::{Module, ModuleInfo};

/// Width of the alias column in the module list.
const ALIAS_WIDTH: usize = 20;

const FLAGS: &[Flag] = &[
    Flag::new("show-hidden").alias('h').doc("include hidden modules"),
    Flag::new("show-disabled").alias('d').doc("include disabled modules"),
];

pub struct Help {
    info: ModuleInfo,
}

pub fn new() -> Result<Box<dyn Module>> {
    Ok(Box::new(Help {
        info: ModuleInfo {
            aliases: &["help", "commands"],
            category: "Utils",
            usage_doc: "{prefix}{aliases} [alias]",
            short_doc: "Get information about bot or module (if given).",
            bot_perms: &[Permission::EMBED_LINKS],
            flags: FLAGS,
            ..ModuleInfo::new("help")
        },
    }))
}

#[async_trait]
impl Module for Help {
    fn info(&self) -> &ModuleInfo {
        &self.info
    }

    async fn on_call(&self, ctx: &MessageContext, args: &Arguments) -> Result<Option<CreateMessage>> {
        match args.len() {
            1 => Ok(Some(module_list(ctx, args))),
            2 => {
                let alias = &args[1];

                match ctx.state.modules().get_module(alias) {
                    Some(module) => module.module().on_doc_request(ctx).await,
                    None => Ok(Some(CreateMessage::warn(format!(
                        "Command `{}` not found",
                        alias
                    )))),
                }
            }
            _ => Ok(Some(CreateMessage::warn(
                "help for subcommands is not supported yet",
            ))),
        }
    }
}

fn module_list(ctx: &MessageContext, args: &Arguments) -> CreateMessage {
    let modules = ctx
        .state
        .modules()
        .get_all_modules(args.has_flag("show-hidden"), args.has_flag("show-disabled"));

    let mut lines: Vec<String> = modules
        .iter()
        .map(|module| {
            let info = module.info();
            let alias = info.aliases.first().copied().unwrap_or(info.name);

            format!("{:<width$}{}", alias, info.short_doc, width = ALIAS_WIDTH)
        })
        .collect();
    lines.sort();

    let prefix = ctx.local_prefix();

    CreateMessage::new(|m| {
        m.embed(|e| {
            e.color(Color::GOLD);
            e.title("Available commands:");
            e.description(format!("```\n{}\n```", lines.join("\n")));
            e.footer(format!("Current prefix: {}", prefix));
        });
    })
}

#[cfg(test)]
mod tests {
    use crate::plugins::testing::{content, dispatch, setup, GUILD};
    use crate::plugins::{ping, stop};

    use modbot_core::testing;

    #[tokio::test(start_paused = true)]
    async fn test_module_list() {
        let (_, state) = setup(&[super::new, ping::new, stop::new]).await;
        let alice = || testing::user(2, "alice");

        let resp = dispatch(&state, alice(), Some(GUILD), "help").await.unwrap();
        let embed = resp.embed.unwrap();
        let description = embed.description.unwrap();

        assert!(description.contains(&format!("{:<20}Get information about bot", "help")));
        assert!(description.contains("ping"));
        assert!(!description.contains("stop"));
        assert_eq!(embed.footer.as_deref(), Some("Current prefix: +"));

        let resp = dispatch(&state, alice(), Some(GUILD), "commands -h").await.unwrap();
        assert!(resp.embed.unwrap().description.unwrap().contains("stop"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_module_doc() {
        let (_, state) = setup(&[super::new, ping::new]).await;
        let alice = || testing::user(2, "alice");

        assert_eq!(
            content(dispatch(&state, alice(), Some(GUILD), "help PING").await).as_deref(),
            Some("```\n+ping\n\nGet bot response time\n```")
        );
        assert_eq!(
            content(dispatch(&state, alice(), Some(GUILD), "help nope").await).as_deref(),
            Some("⚠ Command `nope` not found")
        );
        assert_eq!(
            content(dispatch(&state, alice(), Some(GUILD), "help a b").await).as_deref(),
            Some("⚠ help for subcommands is not supported yet")
        );
    }
}
