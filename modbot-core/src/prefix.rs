use modbot::model::{GuildId, UserId};
use modbot::store::{self, Store};
use parking_lot::RwLock;

use std::collections::HashMap;

const DEFAULT_KEY: &str = "prefix";
const GUILD_KEY_PREFIX: &str = "guild_prefix:";

/// Returns the store key of the prefix override of `guild_id`.
pub fn guild_key(guild_id: GuildId) -> String {
    format!("{}{}", GUILD_KEY_PREFIX, guild_id)
}

/// The command prefixes accepted by the bot.
#[derive(Debug)]
pub struct Prefixes {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    default: String,
    mention: Vec<String>,
    guilds: HashMap<GuildId, String>,
}

impl Prefixes {
    pub fn new(default: &str) -> Self {
        Self {
            inner: RwLock::new(Inner {
                default: default.to_owned(),
                ..Default::default()
            }),
        }
    }

    /// Loads the default prefix and all guild overrides from `store` and
    /// enables mention prefixes for `bot_id`. `fallback` is used when no
    /// default prefix is stored.
    pub async fn init(&self, store: &dyn Store, fallback: &str, bot_id: UserId) -> store::Result<()> {
        let default = store.get_or(DEFAULT_KEY, fallback).await?;

        let mut guilds = HashMap::new();
        for key in store.keys(GUILD_KEY_PREFIX).await? {
            let guild_id = match key[GUILD_KEY_PREFIX.len()..].parse() {
                Ok(id) => GuildId(id),
                Err(_) => {
                    log::warn!("[BOT] Ignoring invalid guild prefix key {}", key);
                    continue;
                }
            };

            if let Some(prefix) = store.get(&key).await? {
                guilds.insert(guild_id, prefix);
            }
        }

        log::info!(
            "[BOT] Default prefix: {}, {} guild prefixes",
            default,
            guilds.len()
        );

        let mut inner = self.inner.write();
        inner.default = default;
        inner.mention = vec![format!("<@{}>", bot_id), format!("<@!{}>", bot_id)];
        inner.guilds = guilds;

        Ok(())
    }

    /// Strips a matching prefix from `content` and returns the left-trimmed
    /// remainder. Returns `None` if no prefix matches.
    ///
    /// A guild override replaces the default prefix. Mention prefixes are
    /// always accepted. In direct messages no prefix is required.
    pub fn strip<'a>(&self, guild_id: Option<GuildId>, content: &'a str) -> Option<&'a str> {
        let inner = self.inner.read();

        let local = match guild_id.and_then(|id| inner.guilds.get(&id)) {
            Some(prefix) => prefix.as_str(),
            None => inner.default.as_str(),
        };

        let direct = if guild_id.is_none() { Some("") } else { None };

        let prefixes = std::iter::once(local)
            .chain(inner.mention.iter().map(String::as_str))
            .chain(direct);

        for prefix in prefixes {
            let head = match content.get(..prefix.len()) {
                Some(head) => head,
                None => continue,
            };

            if head.to_lowercase() == prefix.to_lowercase() {
                return Some(content[prefix.len()..].trim_start());
            }
        }

        None
    }

    /// Returns the prefix shown in documentation.
    pub fn local_prefix(&self, guild_id: Option<GuildId>) -> String {
        let inner = self.inner.read();

        guild_id
            .and_then(|id| inner.guilds.get(&id))
            .unwrap_or(&inner.default)
            .clone()
    }

    /// Sets or, if `prefix` is `None`, removes the override of `guild_id`.
    /// Only updates the in-memory state.
    pub fn set_guild(&self, guild_id: GuildId, prefix: Option<String>) {
        let mut inner = self.inner.write();

        match prefix {
            Some(prefix) => inner.guilds.insert(guild_id, prefix),
            None => inner.guilds.remove(&guild_id),
        };
    }
}
