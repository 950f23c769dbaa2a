//! Route tests for feed runs and manual triggers

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::app::create_router;
    use crate::ingest::{FeedFamily, FeedFetcher};
    use crate::testing::{cidr_indicator, context_with, url_indicator, StubFetcher};

    async fn send(app: Router, method: Method, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn fetchers(urlhaus_fails: bool) -> Vec<Arc<dyn FeedFetcher>> {
        let urlhaus: Arc<dyn FeedFetcher> = if urlhaus_fails {
            Arc::new(StubFetcher::failing(FeedFamily::Urlhaus, "https://urlhaus.example/csv"))
        } else {
            Arc::new(StubFetcher::ok(
                FeedFamily::Urlhaus,
                vec![url_indicator("http://a.example/", 1), url_indicator("http://b.example/", 2)],
            ))
        };
        let spamhaus: Arc<dyn FeedFetcher> = Arc::new(StubFetcher::ok(
            FeedFamily::Spamhaus,
            vec![cidr_indicator("203.0.113.0/24", "spamhaus-drop")],
        ));
        vec![urlhaus, spamhaus]
    }

    #[tokio::test]
    async fn test_run_all_reports_each_family() {
        let app = create_router(context_with(fetchers(false)).await);

        let (status, body) = send(app.clone(), Method::POST, "/api/v1/feeds/run").await;
        assert_eq!(status, StatusCode::OK);

        let runs = body["runs"].as_array().unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0]["family"], "urlhaus");
        assert_eq!(runs[0]["status"], "success");
        assert_eq!(runs[0]["items_ingested"], 2);
        assert_eq!(runs[1]["family"], "spamhaus");
        assert_eq!(runs[1]["items_ingested"], 1);

        let (_, body) = send(app, Method::GET, "/api/v1/indicators/stats").await;
        assert_eq!(body["total"], 3);
    }

    #[tokio::test]
    async fn test_run_all_is_ok_even_when_a_family_fails() {
        let app = create_router(context_with(fetchers(true)).await);

        let (status, body) = send(app, Method::POST, "/api/v1/feeds/run").await;
        assert_eq!(status, StatusCode::OK);

        let runs = body["runs"].as_array().unwrap();
        assert_eq!(runs[0]["status"], "error");
        assert!(runs[0]["error"].as_str().unwrap().contains("503"));
        assert_eq!(runs[1]["status"], "success");
    }

    #[tokio::test]
    async fn test_run_single_family() {
        let app = create_router(context_with(fetchers(false)).await);

        let (status, body) = send(app.clone(), Method::POST, "/api/v1/feeds/spamhaus/run").await;
        assert_eq!(status, StatusCode::OK);
        let runs = body["runs"].as_array().unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0]["family"], "spamhaus");

        let (_, body) = send(app, Method::GET, "/api/v1/feeds/runs").await;
        let recorded = body.as_array().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0]["source"], "spamhaus");
        assert_eq!(recorded[0]["status"], "success");
        assert!(recorded[0]["finished_at"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_family_is_not_found() {
        let app = create_router(context_with(fetchers(false)).await);

        let (status, body) = send(app, Method::POST, "/api/v1/feeds/abuseipdb/run").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["status"], 404);
    }

    #[tokio::test]
    async fn test_unregistered_family_is_not_found() {
        let app = create_router(context_with(Vec::new()).await);

        let (status, _) = send(app, Method::POST, "/api/v1/feeds/urlhaus/run").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_runs_filters_by_source_newest_first() {
        let app = create_router(context_with(fetchers(true)).await);

        send(app.clone(), Method::POST, "/api/v1/feeds/run").await;
        send(app.clone(), Method::POST, "/api/v1/feeds/run").await;

        let (status, body) = send(app, Method::GET, "/api/v1/feeds/runs?source=urlhaus&limit=5").await;
        assert_eq!(status, StatusCode::OK);
        let runs = body.as_array().unwrap();
        assert_eq!(runs.len(), 2);
        assert!(runs[0]["id"].as_i64().unwrap() > runs[1]["id"].as_i64().unwrap());
        assert!(runs.iter().all(|r| r["source"] == "urlhaus" && r["status"] == "error"));
    }
}
