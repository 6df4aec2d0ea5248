use crate::config::Config;
use crate::hook::HookController;
use crate::manager::ModuleManager;
use crate::prefix::Prefixes;
use crate::tracker::MessageTracker;

use modbot::model::User;
use modbot::{Client, Store};
use parking_lot::RwLock;
use tokio::sync::watch;

use std::sync::Arc;
use std::time::Duration;

/// The global shared state.
pub struct State {
    pub config: Config,
    client: Arc<dyn Client>,
    store: Arc<dyn Store>,
    modules: ModuleManager,
    tracker: MessageTracker,
    prefixes: Prefixes,
    hooks: HookController,
    current_user: RwLock<Option<User>>,
    shutdown: watch::Sender<Option<i32>>,
    shutdown_rx: watch::Receiver<Option<i32>>,
}

impl State {
    pub fn new(config: Config, client: Arc<dyn Client>, store: Arc<dyn Store>) -> Self {
        let tracker = MessageTracker::new(Duration::from_secs(config.tracking_timeout));
        let prefixes = Prefixes::new(&config.prefix);
        let (shutdown, shutdown_rx) = watch::channel(None);

        Self {
            config,
            client,
            store,
            modules: ModuleManager::new(),
            tracker,
            prefixes,
            hooks: HookController::new(),
            current_user: RwLock::new(None),
            shutdown,
            shutdown_rx,
        }
    }

    /// Returns a reference to the messaging client.
    pub fn client(&self) -> &dyn Client {
        self.client.as_ref()
    }

    /// Returns a reference to the key-value store.
    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    /// Returns a reference to the internal [`ModuleManager`].
    pub fn modules(&self) -> &ModuleManager {
        &self.modules
    }

    /// Returns a reference to the internal [`MessageTracker`].
    pub fn tracker(&self) -> &MessageTracker {
        &self.tracker
    }

    /// Returns a reference to the internal [`Prefixes`].
    pub fn prefixes(&self) -> &Prefixes {
        &self.prefixes
    }

    /// Returns a reference to the internal [`HookController`].
    pub fn hooks(&self) -> &HookController {
        &self.hooks
    }

    /// Returns the user the bot is logged in as, once known.
    pub fn current_user(&self) -> Option<User> {
        self.current_user.read().clone()
    }

    pub fn set_current_user(&self, user: User) {
        *self.current_user.write() = Some(user);
    }

    /// Requests the process to shut down with `code`.
    pub fn shutdown(&self, code: i32) {
        log::info!("[CORE] Shutdown requested with exit code {}", code);
        let _ = self.shutdown.send(Some(code));
    }

    /// Waits until a shutdown was requested and returns the exit code.
    pub async fn wait_for_shutdown(&self) -> i32 {
        let mut rx = self.shutdown_rx.clone();

        loop {
            let code = *rx.borrow();
            if let Some(code) = code {
                return code;
            }

            if rx.changed().await.is_err() {
                return 0;
            }
        }
    }
}
