mod autorole;
mod help;
mod ping;
mod prefix;
mod reload;
mod status;
mod stop;
mod user;

use modbot_core::manager::ModuleFactory;

/// All modules in registration order.
pub const MODULES: &[ModuleFactory] = &[
    help::new,
    ping::new,
    user::new,
    autorole::new,
    prefix::new,
    status::new,
    reload::new,
    stop::new,
];

#[cfg(test)]
mod testing {
    use modbot::builder::CreateMessage;
    use modbot::model::{User, UserId};
    use modbot_core::config::Config;
    use modbot_core::context::Context;
    use modbot_core::manager::ModuleFactory;
    use modbot_core::state::State;
    use modbot_core::testing::{self, MockClient};

    use std::sync::Arc;
    use std::time::Duration;

    pub const OWNER: u64 = 1;
    pub const GUILD: u64 = 10;

    pub fn owner() -> User {
        testing::user(OWNER, "owner")
    }

    pub async fn setup(factories: &[ModuleFactory]) -> (Arc<MockClient>, Arc<State>) {
        let client = Arc::new(MockClient::new(testing::user(100, "modbot")));
        let config = Config {
            owner: UserId(OWNER),
            ..Config::default()
        };

        let state = testing::state(client.clone(), config).await;
        state
            .modules()
            .load_modules(&Context::new(state.clone(), ()), factories, true)
            .await
            .unwrap();

        (client, state)
    }

    /// Routes `content` sent by `author` to the loaded modules. Moves the
    /// paused clock past the ratelimit window of the previous call first.
    pub async fn dispatch(
        state: &Arc<State>,
        author: User,
        guild_id: Option<u64>,
        content: &str,
    ) -> Option<CreateMessage> {
        tokio::time::advance(Duration::from_secs(1)).await;

        let msg = testing::message(1, author, guild_id, content);
        state
            .modules()
            .check_modules(&Context::new(state.clone(), msg), content)
            .await
    }

    pub fn content(msg: Option<CreateMessage>) -> Option<String> {
        msg.and_then(|msg| msg.content)
    }
}
