//! Top-level views and the gate in front of them

use crate::session::SessionState;
use cev_common::types::DatasetId;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    Upload,
    Dataset(DatasetId),
    Summary(DatasetId),
}

impl Route {
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Route::Login | Route::Register)
    }

    /// Where a request for `self` actually lands.
    ///
    /// `None` while the identity check is still running.
    pub fn resolve(self, session: &SessionState) -> Option<Route> {
        match session {
            SessionState::Checking => None,
            SessionState::Authenticated(_) if !self.requires_auth() => Some(Route::Dashboard),
            SessionState::Unauthenticated if self.requires_auth() => Some(Route::Login),
            _ => Some(self),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Login => write!(f, "/login"),
            Route::Register => write!(f, "/register"),
            Route::Dashboard => write!(f, "/dashboard"),
            Route::Upload => write!(f, "/upload"),
            Route::Dataset(id) => write!(f, "/dataset/{}", id),
            Route::Summary(id) => write!(f, "/dataset/{}/summary", id),
        }
    }
}
