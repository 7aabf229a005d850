//! Cache administration endpoints
//!
//! `GET /cache/stats` returns the cache statistics, `POST /cache/clear`
//! removes one entry (`{"key": "..."}`) or everything (no JSON body, or no key).
//! A body that is not a valid clear request is rejected by the `Json` extractor.

use axum::{
    Router,
    extract::State,
    response::Json,
    routing::{get, post},
};
use cache_system::CacheStats;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use store_object::{BackingStore, QueryFacade};

#[derive(Debug, Default, Deserialize)]
struct ClearRequest {
    key: Option<String>,
}

#[derive(Debug, Serialize)]
struct ClearResponse {
    cleared: usize,
    key: Option<String>,
}

/// Create the cache admin router
pub fn cache_router<S: BackingStore + 'static>(facade: Arc<QueryFacade<S>>) -> Router {
    Router::new()
        .route("/cache/stats", get(stats::<S>))
        .route("/cache/clear", post(clear::<S>))
        .with_state(facade)
}

async fn stats<S: BackingStore>(State(facade): State<Arc<QueryFacade<S>>>) -> Json<CacheStats> {
    Json(facade.get_cache_stats())
}

async fn clear<S: BackingStore>(
    State(facade): State<Arc<QueryFacade<S>>>,
    payload: Option<Json<ClearRequest>>,
) -> Json<ClearResponse> {
    let request = payload.map(|Json(request)| request).unwrap_or_default();

    let cleared = facade.clear_cache(request.key.as_deref());
    Json(ClearResponse {
        cleared,
        key: request.key,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use cache_system::{CacheStore, EvictionPolicy};
    use serde_json::{Value, json};
    use std::time::Duration;
    use store_object::{CachedResult, CountRequest, Row, SelectRequest, StoreError};
    use tower::ServiceExt;

    struct EmptyStore;

    #[async_trait::async_trait]
    impl BackingStore for EmptyStore {
        async fn select(&self, _request: &SelectRequest) -> Result<Vec<Row>, StoreError> {
            Ok(Vec::new())
        }

        async fn count(&self, _request: &CountRequest) -> Result<u64, StoreError> {
            Ok(0)
        }
    }

    fn seeded_facade() -> Arc<QueryFacade<EmptyStore>> {
        let cache = CacheStore::new(10, Duration::from_secs(60), EvictionPolicy::Fifo).unwrap();
        cache.insert("packages:query:a", CachedResult::Count(1), None);
        cache.insert("courses:query:b", CachedResult::Count(2), None);
        Arc::new(QueryFacade::new(EmptyStore, cache))
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn send_status(router: Router, request: Request<Body>) -> StatusCode {
        router.oneshot(request).await.unwrap().status()
    }

    fn post_clear(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/cache/clear")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let router = cache_router(seeded_facade());

        let (status, json) = send(
            router,
            Request::builder()
                .uri("/cache/stats")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["size"], 2);
        assert_eq!(json["maxSize"], 10);
        assert_eq!(json["hitRate"], 0.0);
        assert_eq!(json["keys"], json!(["packages:query:a", "courses:query:b"]));
    }

    #[tokio::test]
    async fn test_clear_single_key() {
        let facade = seeded_facade();
        let router = cache_router(facade.clone());

        let (status, json) = send(router, post_clear(r#"{"key":"courses:query:b"}"#)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({"cleared": 1, "key": "courses:query:b"}));
        assert_eq!(facade.get_cache_stats().keys, vec!["packages:query:a".to_string()]);
    }

    #[tokio::test]
    async fn test_clear_everything() {
        let facade = seeded_facade();

        let bare = Request::builder()
            .method("POST")
            .uri("/cache/clear")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(cache_router(facade.clone()), bare).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({"cleared": 2, "key": null}));
        assert!(facade.cache().is_empty());

        let (status, json) = send(cache_router(facade), post_clear("{}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["cleared"], 0);
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let facade = seeded_facade();

        let status = send_status(cache_router(facade.clone()), post_clear("{\"key\":")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // A JSON content type with nothing behind it is not a request either
        let status = send_status(cache_router(facade.clone()), post_clear("")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let status = send_status(cache_router(facade.clone()), post_clear(r#"{"key":5}"#)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        assert_eq!(facade.get_cache_stats().size, 2);
    }
}
