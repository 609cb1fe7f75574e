//! HTTP API for the chat session

mod handlers;
mod sse;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::runtime::SessionManager;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<SessionManager>,
}

impl AppState {
    pub fn new(session: SessionManager) -> Self {
        Self {
            session: Arc::new(session),
        }
    }
}
