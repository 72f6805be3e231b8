//! Fetch state for page data

use mart_client::ApiError;

/// Lifecycle of one remote query as a page sees it
#[derive(Debug, Default)]
pub enum Remote<T> {
    /// Nothing requested yet
    #[default]
    Idle,
    /// Request outstanding
    Loading,
    /// Data arrived
    Ready(T),
    /// Request failed after the retry policy gave up
    Failed(ApiError),
}

impl<T> Remote<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Remote::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Remote::Loading)
    }
}
