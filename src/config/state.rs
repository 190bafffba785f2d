// Application state module
// Immutable state shared by every connection

use crate::pictures::PictureRoot;
use crate::routing::RouteTable;

use super::types::Config;

/// Application state
///
/// Built once before the listener starts and shared behind an `Arc`. Nothing in here
/// changes after construction, so handlers read it without locking.
pub struct AppState {
    pub config: Config,
    pub root: PictureRoot,
    pub routes: RouteTable,
}

impl AppState {
    pub fn new(config: Config, root: PictureRoot) -> Self {
        Self {
            config,
            root,
            routes: RouteTable::new(),
        }
    }

    pub const fn access_log(&self) -> bool {
        self.config.logging.access_log
    }
}
