use log::LevelFilter;
use modbot::model::id::UserId;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub token: String,
    pub loglevel: LevelFilter,
    /// The user allowed to use owner-only commands.
    pub owner: UserId,
    /// The prefix used when none is stored.
    pub prefix: String,
    /// Abort startup if any module fails to load.
    pub strict_mode: bool,
    /// Number of seconds an inbound message stays tracked.
    pub tracking_timeout: u64,
    pub database: Option<Database>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token: String::new(),
            loglevel: LevelFilter::Info,
            owner: UserId(0),
            prefix: String::from("+"),
            strict_mode: false,
            tracking_timeout: 300,
            database: None,
        }
    }
}

/// Database configuration section. Not all
/// fields are required for all driver types.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Database {
    pub driver: String,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl Database {
    pub fn connect_string(&self) -> String {
        format!(
            "{}://{}:{}@{}:{}/{}?ssl-mode=DISABLED",
            self.driver, self.user, self.password, self.host, self.port, self.database
        )
    }
}
