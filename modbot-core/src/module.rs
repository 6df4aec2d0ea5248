use crate::context::{MessageContext, StateContext};
use crate::format::last_lines;
use crate::ratelimit::{Ratelimit, RatelimitKind};

use async_trait::async_trait;
use modbot::arguments::{Flag, FlagParseError};
use modbot::builder::CreateMessage;
use modbot::model::Member;
use modbot::permissions::{MissingPermission, Permission};
use modbot::{Arguments, Error, Result};

use std::time::Duration;

/// Number of trailing lines of an error shown to the user.
const ERROR_CONTEXT_LINES: usize = 4;

/// The static description of a [`Module`].
#[derive(Clone, Debug)]
pub struct ModuleInfo {
    /// The unique name of the module.
    pub name: &'static str,
    /// The tokens triggering the module. The first alias is the canonical
    /// display name.
    pub aliases: &'static [&'static str],
    pub category: &'static str,
    /// Usage line. `{prefix}` and `{aliases}` are substituted when shown.
    pub usage_doc: &'static str,
    pub short_doc: &'static str,
    pub long_doc: &'static str,
    pub bot_perms: &'static [Permission],
    pub user_perms: &'static [Permission],
    /// Minimum number of arguments following the alias.
    pub min_args: usize,
    /// Maximum number of arguments following the alias, `None` if
    /// unbounded.
    pub max_args: Option<usize>,
    pub flags: &'static [Flag],
    pub guild_only: bool,
    pub nsfw: bool,
    pub hidden: bool,
    /// Disabled modules are loaded but never dispatched to.
    pub disabled: bool,
    pub ratelimit: Ratelimit,
    pub ratelimit_kind: RatelimitKind,
}

impl ModuleInfo {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            aliases: &[],
            category: "",
            usage_doc: "{prefix}{aliases}",
            short_doc: "Not documented",
            long_doc: "",
            bot_perms: &[],
            user_perms: &[],
            min_args: 0,
            max_args: None,
            flags: &[],
            guild_only: false,
            nsfw: false,
            hidden: false,
            disabled: false,
            ratelimit: Ratelimit::new(1, Duration::from_secs(1)),
            ratelimit_kind: RatelimitKind::User,
        }
    }

    /// Returns `true` if `alias` triggers this module. `alias` must be
    /// lowercase.
    pub fn matches(&self, alias: &str) -> bool {
        self.aliases.iter().any(|a| *a == alias)
    }

    /// Renders the documentation of the module for the given prefix.
    pub fn render_doc(&self, prefix: &str) -> String {
        let mut text = String::from(self.usage_doc);

        if !self.short_doc.is_empty() {
            text.push_str("\n\n");
            text.push_str(self.short_doc);
        }

        let flags: Vec<String> = self
            .flags
            .iter()
            .filter(|flag| !flag.hidden)
            .map(|flag| flag.doc_line())
            .collect();

        if !flags.is_empty() {
            text.push_str("\n\nFlags:\n");
            text.push_str(&flags.join("\n"));
        }

        if !self.long_doc.is_empty() {
            text.push_str("\n\n");
            text.push_str(self.long_doc);
        }

        let aliases = match self.aliases {
            [alias] => alias.to_string(),
            aliases => format!("[{}]", aliases.join("|")),
        };

        let text = text
            .trim()
            .replace("{prefix}", prefix)
            .replace("{aliases}", &aliases);

        format!("```\n{}\n```", text)
    }
}

/// A unit of bot functionality triggered by one of its aliases.
///
/// All hooks returning a message produce the response to the invoking
/// message. A failing hook is logged and produces no response.
#[async_trait]
pub trait Module: Send + Sync + 'static {
    fn info(&self) -> &ModuleInfo;

    /// Called once after construction and again after every reload.
    async fn on_load(&self, _ctx: &StateContext, _from_reload: bool) -> Result {
        Ok(())
    }

    /// Called before the module is replaced or the bot shuts down.
    async fn on_unload(&self, _ctx: &StateContext) -> Result {
        Ok(())
    }

    async fn on_call(&self, ctx: &MessageContext, args: &Arguments)
        -> Result<Option<CreateMessage>>;

    async fn on_member_join(&self, _ctx: &StateContext, _member: &Member) -> Result {
        Ok(())
    }

    async fn on_guild_check_failed(&self, _ctx: &MessageContext) -> Result<Option<CreateMessage>> {
        Ok(Some(CreateMessage::error(
            "This command can only be used in guild",
        )))
    }

    async fn on_nsfw_permission_denied(
        &self,
        _ctx: &MessageContext,
    ) -> Result<Option<CreateMessage>> {
        Ok(Some(CreateMessage::error(
            "You can use this command only in channel marked as nsfw",
        )))
    }

    async fn on_flag_parse_error(
        &self,
        _ctx: &MessageContext,
        err: &FlagParseError,
    ) -> Result<Option<CreateMessage>> {
        Ok(Some(CreateMessage::warn(err.to_string())))
    }

    async fn on_not_enough_arguments(&self, ctx: &MessageContext) -> Result<Option<CreateMessage>> {
        self.on_doc_request(ctx).await
    }

    async fn on_too_many_arguments(&self, ctx: &MessageContext) -> Result<Option<CreateMessage>> {
        self.on_doc_request(ctx).await
    }

    async fn on_missing_permissions(
        &self,
        _ctx: &MessageContext,
        missing: &[MissingPermission],
    ) -> Result<Option<CreateMessage>> {
        Ok(Some(CreateMessage::from(format_missing_permissions(missing))))
    }

    async fn on_ratelimit(
        &self,
        _ctx: &MessageContext,
        time_left: Duration,
    ) -> Result<Option<CreateMessage>> {
        Ok(Some(CreateMessage::warn(format!(
            "Please, try again in **{:.1}** seconds",
            time_left.as_secs_f64()
        ))))
    }

    async fn on_doc_request(&self, ctx: &MessageContext) -> Result<Option<CreateMessage>> {
        let prefix = ctx.local_prefix();

        Ok(Some(CreateMessage::from(self.info().render_doc(&prefix))))
    }

    /// Called when the module failed with `err` while executing.
    async fn on_error(&self, ctx: &MessageContext, err: &Error) -> Result<Option<CreateMessage>> {
        let owner = ctx.owner_tag().await;

        Ok(Some(CreateMessage::error(format!(
            "Error appeared during execution **{}**: **{}**\n\
            Please, tell me what happened or contact bot owner **{}**.\n\
            Details:\n```\n{}\n```",
            self.info().name,
            err.kind(),
            owner,
            error_context(err),
        ))))
    }
}

/// Formats the response listing permissions missing on the bot and
/// user side.
pub fn format_missing_permissions(missing: &[MissingPermission]) -> String {
    let (bot, user): (Vec<_>, Vec<_>) = missing.iter().partition(|perm| perm.bot);

    let list = |perms: &[&MissingPermission]| {
        let names: Vec<String> = perms
            .iter()
            .map(|perm| format!("`{}`", perm.permission.name))
            .collect();

        format!("[{}]", names.join(", "))
    };

    let plural = |len: usize| if len > 1 { "s" } else { "" };

    let mut response = String::new();

    if !bot.is_empty() {
        response.push_str(&format!(
            "I'm missing the following permission{} to execute command: {}\n",
            plural(bot.len()),
            list(bot.as_slice())
        ));
    }

    if !user.is_empty() {
        response.push_str(&format!(
            "You're missing the following permission{} to use command: {}",
            plural(user.len()),
            list(user.as_slice())
        ));
    }

    response
}

/// Returns the last lines of the debug representation of `err`.
fn error_context(err: &Error) -> String {
    let text = match err {
        Error::BoxError(err) => format!("{}\n{:?}", err, err),
        err => err.to_string(),
    };

    last_lines(&text, ERROR_CONTEXT_LINES)
}

#[cfg(test)]
mod tests {
    use super::{error_context, format_missing_permissions, ModuleInfo};

    use modbot::arguments::Flag;
    use modbot::Error;
    use modbot::permissions::{MissingPermission, Permission};

    const HELP_FLAGS: &[Flag] = &[
        Flag::new("show-hidden").alias('h').doc("show hidden"),
        Flag::new("secret").hidden(),
    ];

    #[test]
    fn test_render_doc() {
        let info = ModuleInfo {
            aliases: &["help", "commands"],
            short_doc: "Shows help",
            flags: HELP_FLAGS,
            ..ModuleInfo::new("help")
        };

        assert_eq!(
            info.render_doc("+"),
            "```\n+[help|commands]\n\nShows help\n\nFlags:\n-h, --show-hidden: show hidden\n```"
        );

        let info = ModuleInfo {
            aliases: &["ping"],
            usage_doc: "{prefix}{aliases} <target>",
            short_doc: "",
            long_doc: "Pings {aliases}.",
            ..ModuleInfo::new("ping")
        };

        assert_eq!(
            info.render_doc("!"),
            "```\n!ping <target>\n\nPings ping.\n```"
        );
    }

    #[test]
    fn test_matches() {
        let info = ModuleInfo {
            aliases: &["user", "userinfo"],
            ..ModuleInfo::new("user")
        };

        assert!(info.matches("userinfo"));
        assert!(!info.matches("users"));
    }

    #[test]
    fn test_format_missing_permissions() {
        let missing = [
            MissingPermission::bot(Permission::MANAGE_ROLES),
            MissingPermission::user(Permission::MANAGE_ROLES),
            MissingPermission::user(Permission::MANAGE_GUILD),
        ];

        assert_eq!(
            format_missing_permissions(&missing),
            "I'm missing the following permission to execute command: [`manage_roles`]\n\
            You're missing the following permissions to use command: [`manage_roles`, `manage_guild`]"
        );

        let missing = [MissingPermission::user(Permission::BOT_OWNER)];
        assert_eq!(
            format_missing_permissions(&missing),
            "You're missing the following permission to use command: [`bot_owner`]"
        );
    }

    #[test]
    fn test_error_context_keeps_last_lines() {
        let err = Error::Panic(String::from("a\nb\nc\nd\ne"));
        assert_eq!(error_context(&err), "b\nc\nd\ne'");

        let err = Error::Panic(String::from("short"));
        assert_eq!(error_context(&err), "panicked at 'short'");
    }
}
