//! # tcs-web
//!
//! Status page for the TCS3200 color sensor.
//!
//! This crate serves a single route, `/`, rendering the newest reading
//! found in a [`ReadingStore`] as an HTML page that refreshes itself with a
//! meta-refresh tag. There is no JSON API and no authentication.
//!
//! The crate depends only on `tcs-core`, never on the GPIO side, so the web
//! process cannot touch sensor pins.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tcs_web::{create_router, WebState};
//!
//! let state = WebState::new(Arc::new(FileReadingStore::new(path)), &config.web);
//! let app = create_router(Arc::new(state));
//!
//! let listener = TcpListener::bind("0.0.0.0:5000").await?;
//! axum::serve(listener, app).await?;
//! ```

pub mod page;
pub mod routes;

pub use routes::create_router;

use std::sync::Arc;
use std::time::Duration;

use tcs_core::config::WebSettings;
use tcs_core::ReadingStore;

/// Shared state for the route handlers.
pub struct WebState {
    /// Where the reader publishes its readings.
    pub store: Arc<dyn ReadingStore>,
    /// Meta-refresh interval in seconds.
    pub refresh_secs: u32,
    /// Readings older than this are replaced by the placeholder.
    pub stale_after: Duration,
}

impl WebState {
    pub fn new(store: Arc<dyn ReadingStore>, settings: &WebSettings) -> Self {
        Self {
            store,
            refresh_secs: settings.refresh_secs,
            stale_after: settings.stale_after(),
        }
    }
}

/// Type alias for shared state in Axum handlers.
pub type AppState = Arc<WebState>;
