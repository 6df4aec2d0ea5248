use crate::permissions::MissingPermission;

use std::{
    error,
    fmt::{self, Display, Formatter},
    result,
};

pub type Result<T = ()> = result::Result<T, Error>;

/// The error returned by module callbacks.
///
/// Every [`std::error::Error`] converts into [`Error::BoxError`], so `?`
/// can be used freely inside a callback. For the same reason `Error`
/// itself does not implement [`std::error::Error`].
#[derive(Debug)]
pub enum Error {
    /// The command was used incorrectly. The usage documentation is shown
    /// to the user.
    InvalidCommandUsage,
    /// A permission check failed while the command was already executing.
    MissingPermissions(Vec<MissingPermission>),
    /// Hook collector timed out.
    HookTimeout,
    /// The callback panicked with the contained message.
    Panic(String),
    BoxError(Box<dyn error::Error + Send + Sync + 'static>),
}

impl Error {
    /// Returns a short name of the error kind, used in error reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidCommandUsage => "InvalidCommandUsage",
            Self::MissingPermissions(_) => "MissingPermissions",
            Self::HookTimeout => "HookTimeout",
            Self::Panic(_) => "Panic",
            Self::BoxError(_) => "Error",
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::InvalidCommandUsage => write!(f, "invalid command usage"),
            Self::MissingPermissions(missing) => {
                write!(f, "missing permissions: ")?;

                for (i, perm) in missing.iter().enumerate() {
                    if i != 0 {
                        write!(f, ", ")?;
                    }

                    write!(f, "{}", perm.permission.name)?;
                }

                Ok(())
            }
            Self::HookTimeout => write!(f, "hook timeout"),
            Self::Panic(msg) => write!(f, "panicked at '{}'", msg),
            Self::BoxError(err) => err.fmt(f),
        }
    }
}

impl<T> From<T> for Error
where
    T: error::Error + Send + Sync + 'static,
{
    fn from(err: T) -> Self {
        Self::BoxError(Box::new(err))
    }
}
