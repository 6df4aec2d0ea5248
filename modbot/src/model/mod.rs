pub mod channel;
pub mod guild;
pub mod id;
pub mod permissions;
pub mod user;

pub use channel::{Activity, ActivityKind, Channel, ChannelKind, Message, Reaction, ReactionType};
pub use guild::Role;
pub use id::{ChannelId, GuildId, MessageId, RoleId, UserId};
pub use permissions::Permissions;
pub use user::{Member, User};
