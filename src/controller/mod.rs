//! Page controllers. Each owns its raw data, UI state and loading state, and
//! talks to the backend only through the injected collaborators.

mod catalog;
mod detail;
mod lists;
mod scope;

#[cfg(test)]
pub(crate) mod fake;

use std::error::Error;
use std::fmt;

use serde::Serialize;

pub use catalog::CatalogController;
pub use detail::{DetailController, DetailOutcome, MAX_RATING, MIN_RATING};
pub use lists::{ListedBook, ReadingListsController};
pub use scope::{Scope, Teardown};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Transient message for the user, the equivalent of a toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Why a user action did not go through.
#[derive(Debug)]
pub enum ActionError<E> {
    /// Missing or invalid input; nothing was sent to the backend
    Validation(&'static str),
    /// No signed-in user; the caller should be sent to the login view
    AuthRequired,
    /// The controller was torn down before the action finished
    Cancelled,
    Backend(E),
}

impl<E: fmt::Display> fmt::Display for ActionError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionError::Validation(message) => write!(f, "{message}"),
            ActionError::AuthRequired => write!(f, "sign in to continue"),
            ActionError::Cancelled => write!(f, "the page was closed before the action finished"),
            ActionError::Backend(e) => write!(f, "backend call failed: {e}"),
        }
    }
}

impl<E: Error + 'static> Error for ActionError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ActionError::Backend(e) => Some(e),
            _ => None,
        }
    }
}
