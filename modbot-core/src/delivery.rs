use crate::format::{last_lines, sanitize, trim_text, MAX_MESSAGE_LEN};
use crate::state::State;
use crate::tracker::Response;

use modbot::builder::CreateMessage;
use modbot::model::{ChannelId, Message, MessageId};

/// Number of trailing error lines included in delivery failure notices.
const NOTICE_LINES: usize = 4;

impl State {
    /// Sends `message` into `channel_id`.
    ///
    /// If the message is rejected a failure notice is sent instead. If
    /// `response_to` is tracked, the sent message is registered as a
    /// response to it.
    pub async fn send_message(
        &self,
        channel_id: ChannelId,
        mut message: CreateMessage,
        response_to: Option<MessageId>,
    ) -> Option<Message> {
        self.prepare(&mut message);

        if message.is_empty() {
            return None;
        }

        let sent = match self.client().send_message(channel_id, message).await {
            Ok(msg) => Some(msg),
            Err(err) => {
                log::warn!("[BOT] Message delivery to {} failed: {}", channel_id, err);

                let notice = failure_notice("Message delivery failed", &err.to_string());
                match self.client().send_message(channel_id, notice).await {
                    Ok(msg) => Some(msg),
                    Err(err) => {
                        log::warn!("[BOT] Failed to deliver failure notice: {}", err);
                        None
                    }
                }
            }
        };

        if let (Some(id), Some(msg)) = (response_to, &sent) {
            self.tracker().register_response(id, (msg.channel_id, msg.id));
        }

        sent
    }

    /// Replaces the contents of a message sent by the bot. Returns `None`
    /// if the message no longer exists.
    pub async fn edit_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        mut message: CreateMessage,
    ) -> Option<Message> {
        self.prepare(&mut message);

        match self
            .client()
            .edit_message(channel_id, message_id, message)
            .await
        {
            Ok(msg) => Some(msg),
            Err(err) if err.is_not_found() => {
                log::debug!("[BOT] edit_message: message {} not found", message_id);
                None
            }
            Err(err) => {
                log::warn!("[BOT] Editing message {} failed: {}", message_id, err);

                let notice = failure_notice("Message edit failed", &err.to_string());
                self.client()
                    .edit_message(channel_id, message_id, notice)
                    .await
                    .ok()
            }
        }
    }

    /// Deletes a message. A message that no longer exists counts as
    /// deleted.
    pub async fn delete_message(&self, channel_id: ChannelId, message_id: MessageId) -> bool {
        match self.client().delete_message(channel_id, message_id).await {
            Ok(()) => true,
            Err(err) if err.is_not_found() => {
                log::debug!("[BOT] delete_message: message {} not found", message_id);
                true
            }
            Err(err) => {
                log::warn!("[BOT] Deleting message {} failed: {}", message_id, err);
                false
            }
        }
    }

    /// Deletes all `responses`.
    pub async fn delete_responses(&self, responses: Vec<Response>) {
        for (channel_id, message_id) in responses {
            self.delete_message(channel_id, message_id).await;
        }
    }

    fn prepare(&self, message: &mut CreateMessage) {
        let token = &self.config.token;

        if let Some(content) = &message.content {
            let content = sanitize(content, token);
            message.content = Some(trim_text(&content, MAX_MESSAGE_LEN));
        }

        if let Some(embed) = &mut message.embed {
            if let Some(description) = &embed.description {
                embed.description = Some(sanitize(description, token));
            }
        }
    }
}

fn failure_notice(title: &str, err: &str) -> CreateMessage {
    CreateMessage::error(format!(
        "{}\n```\n{}\n```",
        title,
        last_lines(err, NOTICE_LINES)
    ))
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::testing::{self, MockClient};

    use modbot::builder::CreateMessage;
    use modbot::model::{ChannelId, MessageId};

    use std::sync::Arc;

    #[tokio::test]
    async fn test_failure_notice_is_registered() {
        let client = Arc::new(MockClient::new(testing::user(100, "modbot")));
        let state = testing::state(client.clone(), Config::default()).await;

        state.tracker().track(MessageId(1));
        client.fail_sends(1);

        let sent = state
            .send_message(ChannelId(1), CreateMessage::from("hi"), Some(MessageId(1)))
            .await
            .unwrap();

        assert_eq!(
            client.sent_contents(),
            ["❗ Message delivery failed\n```\nmissing access\n```"]
        );
        assert_eq!(
            state.tracker().responses(MessageId(1)),
            [(ChannelId(1), sent.id)]
        );
    }

    #[tokio::test]
    async fn test_undeliverable_notice() {
        let client = Arc::new(MockClient::new(testing::user(100, "modbot")));
        let state = testing::state(client.clone(), Config::default()).await;

        state.tracker().track(MessageId(1));
        client.fail_sends(2);

        let sent = state
            .send_message(ChannelId(1), CreateMessage::from("hi"), Some(MessageId(1)))
            .await;

        assert!(sent.is_none());
        assert!(client.sent().is_empty());
        assert!(state.tracker().responses(MessageId(1)).is_empty());
    }

    #[tokio::test]
    async fn test_missing_messages() {
        let client = Arc::new(MockClient::new(testing::user(100, "modbot")));
        let state = testing::state(client.clone(), Config::default()).await;

        let edited = state
            .edit_message(ChannelId(1), MessageId(42), CreateMessage::from("x"))
            .await;
        assert!(edited.is_none());
        assert!(client.edited().is_empty());

        assert!(state.delete_message(ChannelId(1), MessageId(42)).await);
        assert!(client.deleted().is_empty());
    }

    #[tokio::test]
    async fn test_outgoing_content_is_sanitized() {
        let client = Arc::new(MockClient::new(testing::user(100, "modbot")));
        let config = Config {
            token: String::from("secret"),
            ..Config::default()
        };
        let state = testing::state(client.clone(), config).await;

        state
            .send_message(ChannelId(1), CreateMessage::from("secret @everyone"), None)
            .await;
        assert!(state
            .send_message(ChannelId(1), CreateMessage::from(""), None)
            .await
            .is_none());

        assert_eq!(client.sent_contents(), ["TOKEN_LEAKED @\u{200b}everyone"]);
    }
}
