use crate::context::Context;
use crate::state::State;

use modbot::model::{ChannelId, Message, MessageId};

use std::sync::Arc;

/// Handles a newly created message.
pub async fn message(state: Arc<State>, msg: Message) {
    dispatch(&state, msg, false).await;
}

/// Handles an edited message. `old_content` is the content before the
/// edit, if known.
///
/// An edit of a tracked message cancels its running dispatch, deletes
/// the responses sent so far and dispatches the new content.
pub async fn message_update(state: Arc<State>, msg: Message, old_content: Option<String>) {
    if old_content.as_deref() == Some(msg.content.as_str()) {
        return;
    }

    if !state.tracker().is_tracked(msg.id) {
        return;
    }

    clear_responses(&state, msg.id).await;
    dispatch(&state, msg, true).await;
}

/// Handles a deleted message. Responses to a tracked message are deleted
/// and the message is no longer tracked.
pub async fn message_delete(state: Arc<State>, _channel_id: ChannelId, id: MessageId) {
    if !state.tracker().is_tracked(id) {
        return;
    }

    if state.tracker().cancel(id).await {
        log::trace!("[CORE] Cancelled dispatch of deleted message {}", id);
    }

    let responses = state.tracker().untrack(id);
    state.delete_responses(responses).await;
}

async fn clear_responses(state: &State, id: MessageId) {
    if state.tracker().cancel(id).await {
        log::trace!("[CORE] Cancelled dispatch of edited message {}", id);
    }

    let responses = state.tracker().take_responses(id);
    state.delete_responses(responses).await;
}

async fn dispatch(state: &Arc<State>, msg: Message, from_edit: bool) {
    // Always ignore messages from bots.
    if msg.author.bot {
        return;
    }

    if !from_edit {
        state.tracker().track(msg.id);
    }

    let content = match state.prefixes().strip(msg.guild_id, &msg.content) {
        Some(content) => content.to_owned(),
        None => return,
    };

    let id = msg.id;
    let channel_id = msg.channel_id;
    let ctx = Context::new(state.clone(), msg);

    let res = state
        .tracker()
        .run(id, async {
            if let Some(response) = state.modules().check_modules(&ctx, &content).await {
                state.send_message(channel_id, response, Some(id)).await;
            }
        })
        .await;

    if res.is_none() {
        log::trace!("[CORE] Dispatch of message {} was cancelled", id);
    }
}

#[cfg(test)]
mod tests {
    use super::{message, message_delete, message_update};
    use crate::config::Config;
    use crate::context::{Context, MessageContext};
    use crate::module::{Module, ModuleInfo};
    use crate::state::State;
    use crate::testing::{self, MockClient};

    use async_trait::async_trait;
    use modbot::builder::CreateMessage;
    use modbot::model::{ChannelId, MessageId};
    use modbot::{Arguments, Result};

    use std::sync::Arc;
    use std::time::Duration;

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
            Ok(Some(CreateMessage::from(args.rest(1))))
        }
    }

    fn echo() -> Result<Box<dyn Module>> {
        Ok(Box::new(Echo {
            info: ModuleInfo {
                aliases: &["echo"],
                ..ModuleInfo::new("echo")
            },
        }))
    }

    struct Slow {
        info: ModuleInfo,
    }

    #[async_trait]
    impl Module for Slow {
        fn info(&self) -> &ModuleInfo {
            &self.info
        }

        async fn on_call(
            &self,
            ctx: &MessageContext,
            _args: &Arguments,
        ) -> Result<Option<CreateMessage>> {
            ctx.respond("working").await;
            tokio::time::sleep(Duration::from_secs(3600)).await;

            Ok(Some(CreateMessage::from("done")))
        }
    }

    fn slow() -> Result<Box<dyn Module>> {
        Ok(Box::new(Slow {
            info: ModuleInfo {
                aliases: &["slow"],
                ..ModuleInfo::new("slow")
            },
        }))
    }

    async fn setup() -> (Arc<MockClient>, Arc<State>) {
        let client = Arc::new(MockClient::new(testing::user(100, "modbot")));
        let state = testing::state(client.clone(), Config::default()).await;

        state
            .modules()
            .load_modules(&Context::new(state.clone(), ()), &[echo, slow], true)
            .await
            .unwrap();

        (client, state)
    }

    #[tokio::test]
    async fn test_message() {
        let (client, state) = setup().await;

        message(state.clone(), testing::message(1, testing::user(2, "alice"), Some(10), "+echo hi")).await;
        message(state.clone(), testing::message(2, testing::user(2, "alice"), Some(10), "echo no prefix")).await;
        message(state.clone(), testing::message(3, testing::user(3, "bob"), None, "echo direct")).await;

        let mut bot = testing::user(4, "otherbot");
        bot.bot = true;
        message(state.clone(), testing::message(4, bot, Some(10), "+echo bot")).await;

        assert_eq!(client.sent_contents(), ["hi", "direct"]);
        assert_eq!(
            state.tracker().responses(MessageId(1)),
            [(ChannelId(1), MessageId(1_000_000))]
        );
        assert!(state.tracker().is_tracked(MessageId(2)));
        assert!(!state.tracker().is_tracked(MessageId(4)));
    }

    #[tokio::test]
    async fn test_edit_cancels_running_dispatch() {
        let (client, state) = setup().await;

        let msg = testing::message(1, testing::user(2, "alice"), Some(10), "+slow");
        let handle = tokio::spawn(message(state.clone(), msg.clone()));

        while client.sent().is_empty() {
            tokio::task::yield_now().await;
        }
        assert!(state.tracker().is_running(MessageId(1)));

        let mut edited = msg.clone();
        edited.content = String::from("+echo edited");
        message_update(state.clone(), edited, Some(msg.content.clone())).await;

        handle.await.unwrap();

        assert_eq!(client.sent_contents(), ["working", "edited"]);
        assert_eq!(client.deleted(), [(ChannelId(1), MessageId(1_000_000))]);
        assert_eq!(
            state.tracker().responses(MessageId(1)),
            [(ChannelId(1), MessageId(1_000_001))]
        );
        assert!(!state.tracker().is_running(MessageId(1)));
    }

    #[tokio::test]
    async fn test_edit_ignored() {
        let (client, state) = setup().await;

        let msg = testing::message(1, testing::user(2, "alice"), Some(10), "+echo a");
        message(state.clone(), msg.clone()).await;

        // Same content.
        message_update(state.clone(), msg.clone(), Some(msg.content.clone())).await;

        // Untracked message.
        let other = testing::message(2, testing::user(2, "alice"), Some(10), "+echo b");
        message_update(state.clone(), other, None).await;

        assert_eq!(client.sent_contents(), ["a"]);
        assert!(client.deleted().is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_responses() {
        let (client, state) = setup().await;

        message(state.clone(), testing::message(1, testing::user(2, "alice"), Some(10), "+echo hi")).await;
        message_delete(state.clone(), ChannelId(1), MessageId(1)).await;

        assert_eq!(client.deleted(), [(ChannelId(1), MessageId(1_000_000))]);
        assert!(!state.tracker().is_tracked(MessageId(1)));

        // Deleting again is a no-op.
        message_delete(state.clone(), ChannelId(1), MessageId(1)).await;
        assert_eq!(client.deleted().len(), 1);
    }
}
