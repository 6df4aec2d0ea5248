use async_trait::async_trait;
use modbot::builder::CreateMessage;
use modbot::model::{Activity, ActivityKind};
use modbot::permissions::Permission;
use modbot::{Arguments, Error, Result, Store};
use modbot_core::context::{MessageContext, StateContext};
use modbot_core::module::{Module, ModuleInfo};
use regex::Regex;

const STATUS_KEY: &str = "last_status";
const TYPE_KEY: &str = "last_status_type";
const URL_KEY: &str = "last_status_url";

pub struct Status {
    info: ModuleInfo,
    stream_url: Regex,
}

pub fn new() -> Result<Box<dyn Module>> {
    Ok(Box::new(Status {
        info: ModuleInfo {
            aliases: &["status", "presence"],
            category: "Owner",
            usage_doc: "{prefix}{aliases} [playing|streaming <url>|listening|watching] [text]",
            short_doc: "Set or clear the bot status.",
            user_perms: &[Permission::BOT_OWNER],
            hidden: true,
            ..ModuleInfo::new("status")
        },
        stream_url: Regex::new(r"^https?://(www\.)?(twitch\.tv|youtube\.com)/\S+$")?,
    }))
}

#[async_trait]
impl Module for Status {
    fn info(&self) -> &ModuleInfo {
        &self.info
    }

    async fn on_load(&self, ctx: &StateContext, _from_reload: bool) -> Result {
        let store = ctx.store();

        let name = match store.get(STATUS_KEY).await? {
            Some(name) => name,
            None => return Ok(()),
        };

        let kind = store
            .get(TYPE_KEY)
            .await?
            .and_then(|kind| ActivityKind::from_name(&kind))
            .unwrap_or(ActivityKind::Playing);
        let url = store.get(URL_KEY).await?;

        log::info!("[STATUS] Restoring status {} {}", kind, name);
        ctx.client()
            .set_activity(Some(Activity { kind, name, url }))
            .await?;

        Ok(())
    }

    async fn on_call(&self, ctx: &MessageContext, args: &Arguments) -> Result<Option<CreateMessage>> {
        if args.len() == 1 {
            ctx.client().set_activity(None).await?;

            for key in [STATUS_KEY, TYPE_KEY, URL_KEY] {
                ctx.store().delete(key).await?;
            }

            return Ok(Some(CreateMessage::from("Status removed")));
        }

        let (kind, start) = match ActivityKind::from_name(&args[1]) {
            Some(kind) if args.len() > 2 => (kind, 2),
            _ => (ActivityKind::Playing, 1),
        };

        let (url, start) = if kind == ActivityKind::Streaming {
            match args.get(start) {
                Some(url) if self.stream_url.is_match(url) => (Some(url.to_owned()), start + 1),
                _ => {
                    return Ok(Some(CreateMessage::warn(
                        "Streaming status requires a twitch or youtube url",
                    )))
                }
            }
        } else {
            (None, start)
        };

        let name = args.rest(start);
        if name.is_empty() {
            return Err(Error::InvalidCommandUsage);
        }

        let activity = Activity {
            kind,
            name: name.clone(),
            url,
        };

        ctx.client().set_activity(Some(activity.clone())).await?;
        save(ctx.store(), &activity).await?;

        Ok(Some(CreateMessage::from(format!(
            "Status switched to `{}`",
            name
        ))))
    }
}

async fn save(store: &dyn Store, activity: &Activity) -> Result {
    store.set(STATUS_KEY, &activity.name).await?;
    store.set(TYPE_KEY, &activity.kind.to_string()).await?;

    match &activity.url {
        Some(url) => store.set(URL_KEY, url).await?,
        None => store.delete(URL_KEY).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{STATUS_KEY, TYPE_KEY, URL_KEY};
    use crate::plugins::testing::{content, dispatch, owner, setup, GUILD};

    use modbot::model::{Activity, ActivityKind, UserId};
    use modbot_core::config::Config;
    use modbot_core::context::Context;
    use modbot_core::testing::{self, MockClient};

    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_set_and_clear() {
        let (client, state) = setup(&[super::new]).await;

        assert_eq!(
            content(dispatch(&state, owner(), Some(GUILD), "status watching the logs").await)
                .as_deref(),
            Some("Status switched to `the logs`")
        );
        assert_eq!(
            client.activity(),
            Some(Activity {
                kind: ActivityKind::Watching,
                name: String::from("the logs"),
                url: None,
            })
        );
        assert_eq!(
            state.store().get(TYPE_KEY).await.unwrap().as_deref(),
            Some("watching")
        );

        assert_eq!(
            content(dispatch(&state, owner(), None, "presence watching").await).as_deref(),
            Some("Status switched to `watching`")
        );
        assert_eq!(client.activity().unwrap().kind, ActivityKind::Playing);

        assert_eq!(
            content(dispatch(&state, owner(), None, "status").await).as_deref(),
            Some("Status removed")
        );
        assert_eq!(client.activity(), None);
        assert!(!state.store().exists(STATUS_KEY).await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_streaming() {
        let (client, state) = setup(&[super::new]).await;

        assert_eq!(
            content(dispatch(&state, owner(), None, "status streaming live now").await).as_deref(),
            Some("⚠ Streaming status requires a twitch or youtube url")
        );

        dispatch(
            &state,
            owner(),
            None,
            "status streaming https://twitch.tv/modbot live now",
        )
        .await;

        let activity = client.activity().unwrap();
        assert_eq!(activity.name, "live now");
        assert_eq!(activity.url.as_deref(), Some("https://twitch.tv/modbot"));
        assert_eq!(
            state.store().get(URL_KEY).await.unwrap().as_deref(),
            Some("https://twitch.tv/modbot")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_owner_only() {
        let (client, state) = setup(&[super::new]).await;

        assert_eq!(
            content(dispatch(&state, testing::user(2, "alice"), None, "status hi").await)
                .as_deref(),
            Some("You're missing the following permission to use command: [`bot_owner`]")
        );
        assert_eq!(client.activity(), None);
    }

    #[tokio::test]
    async fn test_restore_on_load() {
        let client = Arc::new(MockClient::new(testing::user(100, "modbot")));
        let config = Config {
            owner: UserId(1),
            ..Config::default()
        };
        let state = testing::state(client.clone(), config).await;

        state.store().set(STATUS_KEY, "with fire").await.unwrap();
        state.store().set(TYPE_KEY, "listening").await.unwrap();

        state
            .modules()
            .load_modules(&Context::new(state.clone(), ()), &[super::new], true)
            .await
            .unwrap();

        assert_eq!(
            client.activity(),
            Some(Activity {
                kind: ActivityKind::Listening,
                name: String::from("with fire"),
                url: None,
            })
        );
    }
}
