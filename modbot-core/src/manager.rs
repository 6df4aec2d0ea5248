use crate::context::{MessageContext, StateContext};
use crate::guard::{evaluate_guards, GuardOutcome};
use crate::hook::Event;
use crate::module::{Module, ModuleInfo};
use crate::ratelimit::Ratelimiter;

use futures::FutureExt;
use modbot::builder::CreateMessage;
use modbot::model::Member;
use modbot::Arguments;
use parking_lot::RwLock;
use thiserror::Error;

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub type Result<T> = std::result::Result<T, Error>;

/// Constructs a module.
pub type ModuleFactory = fn() -> modbot::Result<Box<dyn Module>>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("DuplicateName: a module named `{0}` is already loaded")]
    DuplicateName(&'static str),
    #[error("NotFound: no module named `{0}`")]
    NotFound(String),
    #[error("failed to construct module: {0}")]
    Construct(modbot::Error),
    #[error("failed to load module `{name}`: {err}")]
    Load {
        name: &'static str,
        err: modbot::Error,
    },
}

/// A resident module instance.
pub struct LoadedModule {
    module: Box<dyn Module>,
    ratelimiter: Ratelimiter,
    disabled: AtomicBool,
}

impl LoadedModule {
    fn new(module: Box<dyn Module>) -> Self {
        let info = module.info();

        Self {
            ratelimiter: Ratelimiter::new(info.ratelimit),
            disabled: AtomicBool::new(info.disabled),
            module,
        }
    }

    pub fn info(&self) -> &ModuleInfo {
        self.module.info()
    }

    pub fn module(&self) -> &dyn Module {
        self.module.as_ref()
    }

    pub fn ratelimiter(&self) -> &Ratelimiter {
        &self.ratelimiter
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }

    fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::SeqCst);
    }
}

struct Entry {
    name: &'static str,
    factory: ModuleFactory,
    module: Arc<LoadedModule>,
}

/// Holds all loaded modules in registration order and routes messages to
/// them.
///
/// Every dispatch works on an [`Arc`] of the module it selected. A reload
/// replaces that [`Arc`] in place, so running dispatches finish on the old
/// instance and no dispatch ever sees a partially loaded module.
#[derive(Default)]
pub struct ModuleManager {
    entries: RwLock<Vec<Entry>>,
}

impl ModuleManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs and loads all modules created by `factories`, in order.
    ///
    /// In `strict` mode the first failure aborts loading. Otherwise modules
    /// that cannot be constructed are skipped and modules failing in
    /// [`Module::on_load`] are kept, but disabled.
    pub async fn load_modules(
        &self,
        ctx: &StateContext,
        factories: &[ModuleFactory],
        strict: bool,
    ) -> Result<()> {
        for factory in factories {
            let module = match factory() {
                Ok(module) => module,
                Err(err) => {
                    log::info!("[MODULES] Failed to construct module: {}", err);

                    if strict {
                        return Err(Error::Construct(err));
                    }

                    continue;
                }
            };

            let name = module.info().name;
            if self.contains(name) {
                log::info!("[MODULES] Module {} is already loaded", name);

                if strict {
                    return Err(Error::DuplicateName(name));
                }

                continue;
            }

            let module = Arc::new(LoadedModule::new(module));

            log::trace!("[MODULES] Calling {} on_load", name);
            if let Err(err) = catch_panic(module.module().on_load(ctx, false)).await {
                log::info!("[MODULES] Failed to load module {}: {}", name, err);

                if strict {
                    return Err(Error::Load { name, err });
                }

                module.set_disabled(true);
            }

            self.entries.write().push(Entry {
                name,
                factory: *factory,
                module,
            });
        }

        log::info!("[MODULES] Loaded {} modules", self.entries.read().len());

        Ok(())
    }

    /// Replaces the module `name` with a freshly constructed instance at
    /// the same position.
    pub async fn reload_module(&self, ctx: &StateContext, name: &str) -> Result<()> {
        let (factory, old) = {
            let entries = self.entries.read();
            let entry = entries
                .iter()
                .find(|entry| entry.name == name)
                .ok_or_else(|| Error::NotFound(name.to_owned()))?;

            (entry.factory, entry.module.clone())
        };

        log::trace!("[MODULES] Calling {} on_unload", name);
        if let Err(err) = catch_panic(old.module().on_unload(ctx)).await {
            log::debug!("[MODULES] Error calling {} on_unload: {}", name, err);
        }

        log::trace!("[MODULES] Reloading module {}", name);
        let module = match factory() {
            Ok(module) => Arc::new(LoadedModule::new(module)),
            Err(err) => {
                log::info!("[MODULES] Failed to reconstruct module {}: {}", name, err);
                old.set_disabled(true);
                return Err(Error::Construct(err));
            }
        };

        let res = catch_panic(module.module().on_load(ctx, true)).await;
        if res.is_err() {
            module.set_disabled(true);
        }

        {
            let mut entries = self.entries.write();

            if let Some(entry) = entries.iter_mut().find(|entry| entry.name == name) {
                entry.module = module;
            }
        }

        res.map_err(|err| {
            log::info!("[MODULES] Failed to load module {}: {}", name, err);
            Error::Load {
                name: old.info().name,
                err,
            }
        })
    }

    /// Reloads all modules in registration order. Stops at the first
    /// failure.
    pub async fn reload_modules(&self, ctx: &StateContext) -> Result<()> {
        for name in self.names() {
            self.reload_module(ctx, name).await?;
        }

        Ok(())
    }

    /// Calls [`Module::on_unload`] on all modules and removes them.
    pub async fn unload_modules(&self, ctx: &StateContext) {
        let entries = std::mem::take(&mut *self.entries.write());

        for entry in entries {
            log::trace!("[MODULES] Calling {} on_unload", entry.name);

            if let Err(err) = catch_panic(entry.module.module().on_unload(ctx)).await {
                log::debug!("[MODULES] Error calling {} on_unload: {}", entry.name, err);
            }
        }
    }

    /// Returns the first enabled module that has `alias` as an alias or
    /// name.
    pub fn get_module(&self, alias: &str) -> Option<Arc<LoadedModule>> {
        let alias = alias.to_lowercase();

        self.entries
            .read()
            .iter()
            .find(|entry| {
                !entry.module.is_disabled()
                    && (entry.module.info().matches(&alias) || entry.name == alias)
            })
            .map(|entry| entry.module.clone())
    }

    /// Returns all modules in registration order. Hidden and disabled
    /// modules are only included if requested.
    pub fn get_all_modules(&self, hidden: bool, disabled: bool) -> Vec<Arc<LoadedModule>> {
        self.entries
            .read()
            .iter()
            .filter(|entry| {
                (hidden || !entry.module.info().hidden)
                    && (disabled || !entry.module.is_disabled())
            })
            .map(|entry| entry.module.clone())
            .collect()
    }

    /// Returns all enabled modules in `category`, compared
    /// case-insensitively. An empty category selects `uncategorized`.
    pub fn get_modules_by_category(&self, category: &str) -> Vec<Arc<LoadedModule>> {
        let category = category_name(category);

        self.entries
            .read()
            .iter()
            .filter(|entry| {
                !entry.module.is_disabled() && category_name(entry.module.info().category) == category
            })
            .map(|entry| entry.module.clone())
            .collect()
    }

    pub fn set_disabled(&self, name: &str, disabled: bool) -> Result<()> {
        let entries = self.entries.read();

        match entries.iter().find(|entry| entry.name == name) {
            Some(entry) => {
                entry.module.set_disabled(disabled);
                Ok(())
            }
            None => Err(Error::NotFound(name.to_owned())),
        }
    }

    /// Returns the names of all modules in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.read().iter().map(|entry| entry.name).collect()
    }

    fn contains(&self, name: &str) -> bool {
        self.entries.read().iter().any(|entry| entry.name == name)
    }

    /// Returns the first enabled module in registration order triggered
    /// by `alias`.
    ///
    /// When multiple modules share an alias, only the first one is ever
    /// selected.
    fn find_by_alias(&self, alias: &str) -> Option<Arc<LoadedModule>> {
        self.entries
            .read()
            .iter()
            .find(|entry| !entry.module.is_disabled() && entry.module.info().matches(alias))
            .map(|entry| entry.module.clone())
    }

    /// Routes the prefix-stripped `content` of the message in `ctx` to
    /// the module matching its first token and returns the response.
    ///
    /// Only the first matching module is considered, whatever the outcome.
    pub async fn check_modules(
        &self,
        ctx: &MessageContext,
        content: &str,
    ) -> Option<CreateMessage> {
        let mut args = Arguments::parse(content);
        let alias = args.get(0)?.to_lowercase();

        let module = self.find_by_alias(&alias)?;
        let name = module.info().name;

        let res = match evaluate_guards(&module, ctx, &mut args).await {
            GuardOutcome::Passed => return self.call(&module, ctx, &args).await,
            GuardOutcome::GuildOnly => {
                catch_panic(module.module().on_guild_check_failed(ctx)).await
            }
            GuardOutcome::Nsfw => catch_panic(module.module().on_nsfw_permission_denied(ctx)).await,
            GuardOutcome::FlagError(err) => {
                catch_panic(module.module().on_flag_parse_error(ctx, &err)).await
            }
            GuardOutcome::NotEnoughArgs => {
                catch_panic(module.module().on_not_enough_arguments(ctx)).await
            }
            GuardOutcome::TooManyArgs => {
                catch_panic(module.module().on_too_many_arguments(ctx)).await
            }
            GuardOutcome::MissingPermissions(missing) => {
                catch_panic(module.module().on_missing_permissions(ctx, &missing)).await
            }
            GuardOutcome::Ratelimited(time_left) => {
                catch_panic(module.module().on_ratelimit(ctx, time_left)).await
            }
            GuardOutcome::Failed(err) => {
                log::info!(
                    "[MODULES] Failed to check command, stopped on module {}: {}",
                    name,
                    err
                );
                return None;
            }
        };

        hook_response(name, res)
    }

    async fn call(
        &self,
        module: &LoadedModule,
        ctx: &MessageContext,
        args: &Arguments,
    ) -> Option<CreateMessage> {
        let name = module.info().name;
        let author = &ctx.event.author;

        log::trace!(
            "[MODULES] {}-{} -> {} in {}",
            author.tag(),
            author.id,
            name,
            match ctx.event.guild_id {
                Some(guild_id) => guild_id.to_string(),
                None => String::from("direct messages"),
            }
        );

        if let Err(err) = ctx
            .store()
            .incr(&format!("command_usage:{}", name))
            .await
        {
            log::debug!("[MODULES] Failed to count usage of {}: {}", name, err);
        }

        ctx.state.hooks().dispatch_event(Event::CommandUse {
            module: name,
            message: ctx.event.clone(),
        });

        let res = catch_panic(module.module().on_call(ctx, args)).await;

        let res = match res {
            Ok(resp) => return resp,
            Err(modbot::Error::InvalidCommandUsage) => {
                catch_panic(module.module().on_doc_request(ctx)).await
            }
            Err(modbot::Error::MissingPermissions(missing)) => {
                catch_panic(module.module().on_missing_permissions(ctx, &missing)).await
            }
            Err(err) => {
                log::info!(
                    "[MODULES] Error occured calling {} (user {}, message {}, channel {}, guild {}): {}",
                    name,
                    author.id,
                    ctx.event.id,
                    ctx.event.channel_id,
                    ctx.event
                        .guild_id
                        .map_or_else(|| String::from("none"), |id| id.to_string()),
                    err
                );

                log::trace!("[MODULES] Calling {} on_error", name);
                catch_panic(module.module().on_error(ctx, &err)).await
            }
        };

        hook_response(name, res)
    }

    /// Forwards a member join to all enabled modules.
    pub async fn member_join(&self, ctx: &StateContext, member: &Member) {
        let modules = self.get_all_modules(true, false);

        for module in modules {
            if let Err(err) = catch_panic(module.module().on_member_join(ctx, member)).await {
                log::info!(
                    "[MODULES] Module {} failed to handle member join: {}",
                    module.info().name,
                    err
                );
            }
        }
    }
}

/// Modules without a category are listed as `uncategorized`.
fn category_name(category: &str) -> String {
    match category.to_lowercase() {
        category if category.is_empty() => String::from("uncategorized"),
        category => category,
    }
}

/// Unwraps the result of a hook. Failing hooks produce no response.
fn hook_response(name: &str, res: modbot::Result<Option<CreateMessage>>) -> Option<CreateMessage> {
    match res {
        Ok(resp) => resp,
        Err(err) => {
            log::debug!("[MODULES] Error occured calling {} hook: {}", name, err);
            None
        }
    }
}

/// Awaits a module callback. A panic is returned as [`modbot::Error::Panic`].
async fn catch_panic<F, T>(fut: F) -> modbot::Result<T>
where
    F: Future<Output = modbot::Result<T>>,
{
    AssertUnwindSafe(fut)
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| Err(modbot::Error::Panic(panic_message(payload))))
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        String::from("Box<dyn Any>")
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, ModuleFactory, ModuleManager};
    use crate::config::Config;
    use crate::context::{Context, MessageContext};
    use crate::module::{Module, ModuleInfo};
    use crate::state::State;
    use crate::testing::{self, MockClient};

    use async_trait::async_trait;
    use modbot::arguments::Flag;
    use modbot::builder::CreateMessage;
    use modbot::model::{Channel, ChannelId, ChannelKind, GuildId, Permissions, UserId};
    use modbot::permissions::Permission;
    use modbot::{Arguments, Result};

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Echo {
        info: ModuleInfo,
    }

    #[async_trait]
    impl Module for Echo {
        fn info(&self) -> &ModuleInfo {
            &self.info
        }

        async fn on_call(
            &self,
            _ctx: &MessageContext,
            args: &Arguments,
        ) -> Result<Option<CreateMessage>> {
            let text = args.rest(1);

            Ok(Some(CreateMessage::from(match args.has_flag("loud") {
                true => text.to_uppercase(),
                false => text,
            })))
        }
    }

    const ECHO_FLAGS: &[Flag] = &[Flag::new("loud").alias('l')];

    fn echo() -> Result<Box<dyn Module>> {
        Ok(Box::new(Echo {
            info: ModuleInfo {
                aliases: &["echo", "say"],
                min_args: 1,
                max_args: Some(3),
                flags: ECHO_FLAGS,
                ..ModuleInfo::new("echo")
            },
        }))
    }

    fn shadow() -> Result<Box<dyn Module>> {
        Ok(Box::new(Echo {
            info: ModuleInfo {
                aliases: &["say"],
                ..ModuleInfo::new("shadow")
            },
        }))
    }

    fn guild() -> Result<Box<dyn Module>> {
        Ok(Box::new(Echo {
            info: ModuleInfo {
                aliases: &["guild"],
                guild_only: true,
                ..ModuleInfo::new("guild")
            },
        }))
    }

    fn broken() -> Result<Box<dyn Module>> {
        Err(modbot::Error::from(std::fmt::Error))
    }

    struct Panicking {
        info: ModuleInfo,
    }

    #[async_trait]
    impl Module for Panicking {
        fn info(&self) -> &ModuleInfo {
            &self.info
        }

        async fn on_call(
            &self,
            _ctx: &MessageContext,
            _args: &Arguments,
        ) -> Result<Option<CreateMessage>> {
            panic!("module exploded");
        }
    }

    fn panicking() -> Result<Box<dyn Module>> {
        Ok(Box::new(Panicking {
            info: ModuleInfo {
                aliases: &["boom"],
                ..ModuleInfo::new("boom")
            },
        }))
    }

    struct Fragile {
        info: ModuleInfo,
    }

    #[async_trait]
    impl Module for Fragile {
        fn info(&self) -> &ModuleInfo {
            &self.info
        }

        async fn on_call(
            &self,
            _ctx: &MessageContext,
            _args: &Arguments,
        ) -> Result<Option<CreateMessage>> {
            Err(modbot::Error::from(std::fmt::Error))
        }

        async fn on_not_enough_arguments(
            &self,
            _ctx: &MessageContext,
        ) -> Result<Option<CreateMessage>> {
            panic!("usage hook exploded");
        }

        async fn on_error(
            &self,
            _ctx: &MessageContext,
            _err: &modbot::Error,
        ) -> Result<Option<CreateMessage>> {
            panic!("error hook exploded");
        }
    }

    fn fragile() -> Result<Box<dyn Module>> {
        Ok(Box::new(Fragile {
            info: ModuleInfo {
                aliases: &["fragile"],
                min_args: 1,
                ..ModuleInfo::new("fragile")
            },
        }))
    }

    const MANAGE_ROLES: &[Permission] = &[Permission::MANAGE_ROLES];

    fn strict() -> Result<Box<dyn Module>> {
        Ok(Box::new(Echo {
            info: ModuleInfo {
                aliases: &["strict"],
                min_args: 1,
                flags: ECHO_FLAGS,
                user_perms: MANAGE_ROLES,
                guild_only: true,
                nsfw: true,
                ..ModuleInfo::new("strict")
            },
        }))
    }

    struct Gatekeeper {
        info: ModuleInfo,
    }

    #[async_trait]
    impl Module for Gatekeeper {
        fn info(&self) -> &ModuleInfo {
            &self.info
        }

        async fn on_call(
            &self,
            ctx: &MessageContext,
            _args: &Arguments,
        ) -> Result<Option<CreateMessage>> {
            crate::permissions::require(ctx, Permission::MANAGE_ROLES).await?;

            Ok(Some(CreateMessage::from("granted")))
        }
    }

    fn gatekeeper() -> Result<Box<dyn Module>> {
        Ok(Box::new(Gatekeeper {
            info: ModuleInfo {
                aliases: &["gate"],
                ..ModuleInfo::new("gate")
            },
        }))
    }

    static GENERATION: AtomicUsize = AtomicUsize::new(0);

    struct Versioned {
        info: ModuleInfo,
        generation: usize,
    }

    #[async_trait]
    impl Module for Versioned {
        fn info(&self) -> &ModuleInfo {
            &self.info
        }

        async fn on_call(
            &self,
            _ctx: &MessageContext,
            _args: &Arguments,
        ) -> Result<Option<CreateMessage>> {
            Ok(Some(CreateMessage::from(self.generation.to_string())))
        }
    }

    fn versioned() -> Result<Box<dyn Module>> {
        Ok(Box::new(Versioned {
            info: ModuleInfo {
                aliases: &["version"],
                ..ModuleInfo::new("version")
            },
            generation: GENERATION.fetch_add(1, Ordering::SeqCst),
        }))
    }

    async fn setup(factories: &[ModuleFactory]) -> Arc<State> {
        setup_with_client(factories).await.1
    }

    async fn setup_with_client(factories: &[ModuleFactory]) -> (Arc<MockClient>, Arc<State>) {
        let client = Arc::new(MockClient::new(testing::user(100, "modbot")));
        let state = testing::state(client.clone(), Config::default()).await;

        state
            .modules()
            .load_modules(&Context::new(state.clone(), ()), factories, false)
            .await
            .unwrap();

        (client, state)
    }

    fn nsfw_channel() -> Channel {
        Channel {
            id: ChannelId(1),
            guild_id: Some(GuildId(10)),
            kind: ChannelKind::Text,
            name: None,
            nsfw: true,
        }
    }

    async fn dispatch(state: &Arc<State>, guild_id: Option<u64>, content: &str) -> Option<String> {
        let msg = testing::message(1, testing::user(2, "alice"), guild_id, content);
        let ctx = Context::new(state.clone(), msg);

        state
            .modules()
            .check_modules(&ctx, content)
            .await
            .and_then(|resp| resp.content)
    }

    #[tokio::test]
    async fn test_unknown_alias_is_silent() {
        let state = setup(&[echo]).await;

        assert_eq!(dispatch(&state, Some(10), "unknown a b").await, None);
        assert_eq!(dispatch(&state, Some(10), "").await, None);
    }

    #[tokio::test]
    async fn test_call() {
        let state = setup(&[echo]).await;

        assert_eq!(
            dispatch(&state, Some(10), "ECHO hello   world").await.as_deref(),
            Some("hello   world")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_flags() {
        let state = setup(&[echo]).await;

        assert_eq!(
            dispatch(&state, Some(10), "echo -l hi").await.as_deref(),
            Some("HI")
        );

        tokio::time::advance(std::time::Duration::from_secs(2)).await;
        assert_eq!(
            dispatch(&state, Some(10), "echo --quiet hi").await.as_deref(),
            Some("⚠ Unknown flag: `--quiet`")
        );
    }

    #[tokio::test]
    async fn test_argument_bounds() {
        let state = setup(&[echo]).await;

        let doc = "```\n+[echo|say]\n\nNot documented\n\nFlags:\n-l, --loud\n```";
        assert_eq!(dispatch(&state, Some(10), "echo").await.as_deref(), Some(doc));
        assert_eq!(
            dispatch(&state, Some(10), "echo a b c d").await.as_deref(),
            Some(doc)
        );
    }

    #[tokio::test]
    async fn test_first_alias_match_wins() {
        let state = setup(&[echo, shadow]).await;

        assert_eq!(state.modules().names(), ["echo", "shadow"]);
        assert_eq!(dispatch(&state, Some(10), "say hi").await.as_deref(), Some("hi"));

        // The shadowed module only becomes reachable once the first is disabled.
        state.modules().set_disabled("echo", true).unwrap();
        assert_eq!(dispatch(&state, Some(10), "say hi").await.as_deref(), Some("hi"));
        assert_eq!(
            state.modules().get_module("say").unwrap().info().name,
            "shadow"
        );
    }

    #[tokio::test]
    async fn test_guild_only() {
        let state = setup(&[guild]).await;

        assert_eq!(
            dispatch(&state, None, "guild").await.as_deref(),
            Some("❗ This command can only be used in guild")
        );
        assert_eq!(dispatch(&state, Some(10), "guild").await.as_deref(), Some(""));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ratelimit() {
        let state = setup(&[echo]).await;

        assert_eq!(dispatch(&state, Some(10), "echo a").await.as_deref(), Some("a"));
        assert_eq!(
            dispatch(&state, Some(10), "echo b").await.as_deref(),
            Some("⚠ Please, try again in **1.0** seconds")
        );

        tokio::time::advance(std::time::Duration::from_millis(1001)).await;
        assert_eq!(dispatch(&state, Some(10), "echo c").await.as_deref(), Some("c"));
    }

    #[tokio::test]
    async fn test_panic_calls_on_error() {
        let state = setup(&[panicking]).await;

        let resp = dispatch(&state, Some(10), "boom").await.unwrap();
        assert!(resp.starts_with("❗ Error appeared during execution **boom**: **Panic**"));
        assert!(resp.contains("module exploded"));
    }

    #[tokio::test]
    async fn test_panicking_hooks_are_contained() {
        let state = setup(&[fragile, echo]).await;

        assert_eq!(dispatch(&state, Some(10), "fragile").await, None);
        assert_eq!(dispatch(&state, Some(10), "fragile x").await, None);

        // Dispatch keeps working afterwards.
        assert_eq!(dispatch(&state, Some(10), "echo hi").await.as_deref(), Some("hi"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_guard_order() {
        let (client, state) = setup_with_client(&[strict]).await;
        client.set_permissions(ChannelId(1), UserId(2), Permissions::empty());

        // Each step fails only the guard that comes next in order.
        assert_eq!(
            dispatch(&state, None, "strict --bogus").await.as_deref(),
            Some("❗ This command can only be used in guild")
        );
        assert_eq!(
            dispatch(&state, Some(10), "strict --bogus").await.as_deref(),
            Some("❗ You can use this command only in channel marked as nsfw")
        );

        client.add_channel(nsfw_channel());
        assert_eq!(
            dispatch(&state, Some(10), "strict --bogus").await.as_deref(),
            Some("⚠ Unknown flag: `--bogus`")
        );

        let doc = dispatch(&state, Some(10), "strict -l").await.unwrap();
        assert!(doc.starts_with("```\n+strict"));

        assert_eq!(
            dispatch(&state, Some(10), "strict a").await.as_deref(),
            Some("You're missing the following permission to use command: [`manage_roles`]")
        );

        // None of the failures above consumed a call.
        client.set_permissions(ChannelId(1), UserId(2), Permissions::all());
        assert_eq!(dispatch(&state, Some(10), "strict a").await.as_deref(), Some("a"));
        assert_eq!(
            dispatch(&state, Some(10), "strict b").await.as_deref(),
            Some("⚠ Please, try again in **1.0** seconds")
        );
    }

    #[tokio::test]
    async fn test_failed_check_is_silent() {
        let (client, state) = setup_with_client(&[strict, echo]).await;
        client.add_channel(nsfw_channel());
        client.fail_permission_lookups();

        assert_eq!(dispatch(&state, Some(10), "strict a").await, None);
        assert!(client.sent().is_empty());

        // Modules without permission requirements are unaffected.
        assert_eq!(dispatch(&state, Some(10), "echo a").await.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_require_from_on_call() {
        let (client, state) = setup_with_client(&[gatekeeper]).await;

        // Guild permissions do not apply in direct messages.
        client.set_permissions(ChannelId(1), UserId(2), Permissions::empty());
        assert_eq!(dispatch(&state, None, "gate").await.as_deref(), Some("granted"));

        assert_eq!(
            dispatch(&state, Some(10), "gate").await.as_deref(),
            Some("You're missing the following permission to use command: [`manage_roles`]")
        );

        client.set_permissions(ChannelId(1), UserId(2), Permissions::MANAGE_ROLES);
        assert_eq!(dispatch(&state, Some(10), "gate").await.as_deref(), Some("granted"));
    }

    #[tokio::test]
    async fn test_load_skips_broken() {
        let state = setup(&[echo, broken, guild]).await;
        assert_eq!(state.modules().names(), ["echo", "guild"]);

        let ctx = Context::new(state.clone(), ());
        let res = state
            .modules()
            .load_modules(&ctx, &[broken], true)
            .await;
        assert!(matches!(res, Err(Error::Construct(_))));

        let res = state.modules().load_modules(&ctx, &[echo], true).await;
        assert!(matches!(res, Err(Error::DuplicateName("echo"))));
    }

    #[tokio::test]
    async fn test_reload_module() {
        let state = setup(&[echo, versioned, guild]).await;
        let before: usize = dispatch(&state, Some(10), "version")
            .await
            .unwrap()
            .parse()
            .unwrap();

        let ctx = Context::new(state.clone(), ());
        state.modules().reload_module(&ctx, "version").await.unwrap();

        assert_eq!(state.modules().names(), ["echo", "version", "guild"]);

        let after: usize = dispatch(&state, Some(10), "version")
            .await
            .unwrap()
            .parse()
            .unwrap();
        assert!(after > before);

        assert!(matches!(
            state.modules().reload_module(&ctx, "missing").await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_queries() {
        let state = setup(&[echo, guild]).await;

        assert_eq!(state.modules().get_all_modules(false, false).len(), 2);
        assert_eq!(state.modules().get_modules_by_category("").len(), 2);

        state.modules().set_disabled("guild", true).unwrap();
        assert!(state.modules().get_module("guild").is_none());
        assert_eq!(state.modules().get_all_modules(false, false).len(), 1);
        assert_eq!(state.modules().get_all_modules(false, true).len(), 2);

        state
            .modules()
            .unload_modules(&Context::new(state.clone(), ()))
            .await;
        assert!(state.modules().names().is_empty());
    }
}
