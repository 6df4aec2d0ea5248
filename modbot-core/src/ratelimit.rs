use modbot::model::{ChannelId, GuildId, Message, UserId};
use parking_lot::Mutex;
use tokio::time::Instant;

use std::collections::HashMap;
use std::time::Duration;

/// Buckets are pruned once this many exist.
const PRUNE_THRESHOLD: usize = 1024;

/// Allows `calls` invocations per window of `per`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Ratelimit {
    pub calls: u32,
    pub per: Duration,
}

impl Ratelimit {
    pub const fn new(calls: u32, per: Duration) -> Self {
        Self { calls, per }
    }
}

impl Default for Ratelimit {
    fn default() -> Self {
        Self::new(1, Duration::from_secs(1))
    }
}

/// The dimension a [`Ratelimit`] is counted on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RatelimitKind {
    User,
    Guild,
    Global,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScopeKey {
    User(UserId),
    Guild(GuildId),
    /// A guild scoped limit applied inside a direct message channel.
    Direct(ChannelId),
    Global,
}

impl ScopeKey {
    pub fn new(kind: RatelimitKind, msg: &Message) -> Self {
        match kind {
            RatelimitKind::User => Self::User(msg.author.id),
            RatelimitKind::Guild => match msg.guild_id {
                Some(guild_id) => Self::Guild(guild_id),
                None => Self::Direct(msg.channel_id),
            },
            RatelimitKind::Global => Self::Global,
        }
    }
}

#[derive(Copy, Clone, Debug)]
struct Bucket {
    calls_left: u32,
    reset_at: Instant,
}

/// A fixed window call counter.
///
/// A window starts with the first call after the previous one expired.
/// Checking and consuming a call happens under a single lock.
#[derive(Debug)]
pub struct Ratelimiter {
    ratelimit: Ratelimit,
    buckets: Mutex<HashMap<ScopeKey, Bucket>>,
}

impl Ratelimiter {
    pub fn new(ratelimit: Ratelimit) -> Self {
        Self {
            ratelimit,
            buckets: Mutex::default(),
        }
    }

    /// Consumes a call for `key`. Returns the calls that were left before
    /// this one and the time until the current window ends. The call was
    /// refused if the returned count is `0`.
    pub fn test(&self, key: ScopeKey) -> (u32, Duration) {
        let now = Instant::now();
        let mut buckets = self.buckets.lock();

        if buckets.len() >= PRUNE_THRESHOLD {
            buckets.retain(|_, bucket| bucket.reset_at > now);
        }

        let bucket = buckets.entry(key).or_insert(Bucket {
            calls_left: self.ratelimit.calls,
            reset_at: now + self.ratelimit.per,
        });

        if bucket.reset_at <= now {
            bucket.calls_left = self.ratelimit.calls;
            bucket.reset_at = now + self.ratelimit.per;
        }

        let calls_left = bucket.calls_left;
        bucket.calls_left = calls_left.saturating_sub(1);

        (calls_left, bucket.reset_at - now)
    }
}
