use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use std::fmt::{self, Display, Formatter};
use std::num::ParseIntError;
use std::str::FromStr;

/// Milliseconds between the unix epoch and the first second of 2015.
const DISCORD_EPOCH: u64 = 1_420_070_400_000;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid format")]
    InvalidFormat,
    #[error(transparent)]
    ParseIntError(#[from] ParseIntError),
}

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident, $($mention:literal),*) => {
        $(#[$meta])*
        #[derive(
            Copy,
            Clone,
            Debug,
            Default,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Serialize,
            Deserialize,
        )]
        pub struct $name(pub u64);

        impl $name {
            /// Returns the creation time encoded in the snowflake.
            pub fn created_at(&self) -> DateTime<Utc> {
                let millis = (self.0 >> 22) + DISCORD_EPOCH;
                Utc.timestamp_millis(millis as i64)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                Display::fmt(&self.0, f)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        /// Accepts both the raw snowflake and the mention format.
        impl FromStr for $name {
            type Err = ParseError;

            #[allow(unused_variables)]
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if s.starts_with('<') {
                    let inner = s
                        .strip_suffix('>')
                        .ok_or(ParseError::InvalidFormat)?;

                    $(
                        if let Some(id) = inner.strip_prefix($mention) {
                            return Ok(Self(id.parse()?));
                        }
                    )*

                    return Err(ParseError::InvalidFormat);
                }

                Ok(Self(s.parse()?))
            }
        }
    };
}

id_type!(ChannelId, "<#");
id_type!(GuildId,);
id_type!(MessageId,);
// "<@&" must come before any "<@" style prefix.
id_type!(RoleId, "<@&");
id_type!(UserId, "<@!", "<@");
