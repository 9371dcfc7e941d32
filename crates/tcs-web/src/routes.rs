//! HTTP routes.
//!
//! # Endpoints
//!
//! ### `GET /`
//! Returns the status page for the latest reading. If nothing has been
//! published, the newest reading is stale, or the store cannot be read, the
//! page shows a "No data" placeholder and the response is still `200 OK`.
//!
//! Every other path is a `404`.

use axum::{extract::State, response::Html, routing::get, Router};
use chrono::Utc;
use tracing::warn;

use tcs_core::ColorReading;

use crate::page::{self, Snapshot};
use crate::AppState;

/// Create the router.
pub fn create_router(state: AppState) -> Router {
    Router::new().route("/", get(index_handler)).with_state(state)
}

/// Handler for `/`.
async fn index_handler(State(state): State<AppState>) -> Html<String> {
    let latest = fetch_latest(&state).await;
    let snapshot = Snapshot::of(latest.as_ref(), Utc::now(), state.stale_after);
    Html(page::render(snapshot, state.refresh_secs))
}

/// Read the store off the async executor; any failure degrades to `None`.
async fn fetch_latest(state: &AppState) -> Option<ColorReading> {
    let store = state.store.clone();
    match tokio::task::spawn_blocking(move || store.latest()).await {
        Ok(Ok(reading)) => reading,
        Ok(Err(e)) => {
            warn!("Failed to read latest reading: {}", e);
            None
        }
        Err(e) => {
            warn!("Store read task failed: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WebState;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use std::time::Duration;
    use tcs_core::{ColorLabel, MemoryReadingStore, RawFrequencies, ReadingStore, Rgb, StoreError};
    use tower::ServiceExt;

    fn state_with(store: Arc<dyn ReadingStore>) -> AppState {
        Arc::new(WebState {
            store,
            refresh_secs: 2,
            stale_after: Duration::from_secs(5),
        })
    }

    async fn get_page(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_placeholder_when_nothing_published() {
        let app = create_router(state_with(Arc::new(MemoryReadingStore::new())));

        let (status, body) = get_page(app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("No data"));
        assert!(body.contains(r#"http-equiv="refresh""#));
    }

    #[tokio::test]
    async fn test_latest_reading_rendered() {
        let store = Arc::new(MemoryReadingStore::new());
        store
            .publish(&ColorReading {
                raw: RawFrequencies::new(900.0, 100.0, 100.0),
                rgb: Rgb::new(229, 25, 25),
                label: ColorLabel::Red,
                tone: None,
                timestamp: Utc::now(),
            })
            .unwrap();
        let app = create_router(state_with(store));

        let (status, body) = get_page(app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("R: 229 G: 25 B: 25"));
        assert!(body.contains("Dominant: Red"));
        assert!(body.contains("Receiving data"));
    }

    #[tokio::test]
    async fn test_old_reading_shows_placeholder() {
        let store = Arc::new(MemoryReadingStore::new());
        store
            .publish(&ColorReading {
                raw: RawFrequencies::new(900.0, 100.0, 100.0),
                rgb: Rgb::new(229, 25, 25),
                label: ColorLabel::Red,
                tone: None,
                timestamp: Utc::now() - chrono::Duration::hours(1),
            })
            .unwrap();
        let app = create_router(state_with(store));

        let (status, body) = get_page(app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("No data: last reading"));
        assert!(!body.contains("Dominant: Red"));
        assert!(!body.contains("R: 229"));
    }

    struct FailingStore;

    impl ReadingStore for FailingStore {
        fn publish(&self, _reading: &ColorReading) -> Result<(), StoreError> {
            Ok(())
        }

        fn latest(&self) -> Result<Option<ColorReading>, StoreError> {
            Err(StoreError::Io {
                path: "/run/tcs3200/latest.json".into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            })
        }

        fn clear(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_store_failure_degrades_to_placeholder() {
        let app = create_router(state_with(Arc::new(FailingStore)));

        let (status, body) = get_page(app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("No data"));
    }

    #[tokio::test]
    async fn test_other_paths_not_found() {
        let app = create_router(state_with(Arc::new(MemoryReadingStore::new())));

        let (status, _) = get_page(app, "/data").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
