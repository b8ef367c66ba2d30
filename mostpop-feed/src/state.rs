//! Presentation state of a feed.

use mostpop_core::types::Article;

/// What a feed view should currently show.
///
/// Equality compares article lists by article id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ViewState {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A fetch is running and nothing is displayed.
    Loading,
    /// Articles to display.
    Success(Vec<Article>),
    /// User-facing failure message.
    Failure(String),
    /// No connectivity.
    Offline,
}

impl ViewState {
    /// Displayed articles; empty unless `Success`.
    pub fn articles(&self) -> &[Article] {
        match self {
            ViewState::Success(articles) => articles,
            _ => &[],
        }
    }

    /// Returns true while a fetch runs with nothing displayed.
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    /// Failure message, if any.
    pub fn failure(&self) -> Option<&str> {
        match self {
            ViewState::Failure(message) => Some(message),
            _ => None,
        }
    }
}
