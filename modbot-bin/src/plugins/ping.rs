use async_trait::async_trait;
use modbot::builder::CreateMessage;
use modbot::{Arguments, Result};
use modbot_core::context::MessageContext;
use modbot_core::module::{Module, ModuleInfo};

pub struct Ping {
    info: ModuleInfo,
}

pub fn new() -> Result<Box<dyn Module>> {
    Ok(Box::new(Ping {
        info: ModuleInfo {
            aliases: &["ping"],
            category: "Utils",
            short_doc: "Get bot response time",
            max_args: Some(0),
            ..ModuleInfo::new("ping")
        },
    }))
}

#[async_trait]
impl Module for Ping {
    fn info(&self) -> &ModuleInfo {
        &self.info
    }

    async fn on_call(&self, ctx: &MessageContext, _args: &Arguments) -> Result<Option<CreateMessage>> {
        let ping_msg = match ctx.respond("Pinging ...").await {
            Some(msg) => msg,
            None => return Ok(None),
        };

        let sent_at = ctx.event.edited_timestamp.unwrap_or(ctx.event.timestamp);
        let delta = (ping_msg.timestamp - sent_at).num_milliseconds();

        ctx.state
            .edit_message(
                ping_msg.channel_id,
                ping_msg.id,
                CreateMessage::from(format!("Pong, it took `{}ms` to respond", delta)),
            )
            .await;

        Ok(None)
    }
}
