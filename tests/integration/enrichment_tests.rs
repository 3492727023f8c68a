//! Catalog client and enrichment job against a mock catalog

use crate::common::{catalog_config, movie, search_body};
use curator_rs::services::SearchQuery;
use curator_rs::{CatalogClient, CircuitState, EnrichmentJob};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_enrichment_picks_year_match_and_reports_misses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/search/movie"))
        .and(query_param("query", "The Thing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(vec![
            movie(60935, "The Thing", "2011-10-12"),
            movie(1091, "The Thing", "1982-06-25"),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/3/search/movie"))
        .and(query_param("query", "Nonexistent Film"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(vec![])))
        .mount(&server)
        .await;

    let catalog = Arc::new(CatalogClient::from_config(&catalog_config(&server, 5, 3)).unwrap());
    let job = EnrichmentJob::new(catalog.clone());
    let queries: Vec<SearchQuery> = ["The Thing:1982", "Nonexistent Film"]
        .iter()
        .map(|s| s.parse().unwrap())
        .collect();

    let report = job.run(&CancellationToken::new(), &queries).await.unwrap();

    assert_eq!(report.enriched.len(), 1);
    assert_eq!(report.enriched[0].item.id, 1091);
    assert_eq!(report.not_found, vec![SearchQuery::new("Nonexistent Film", None)]);
    assert!(report.is_clean());
    assert_eq!(catalog.resilient().breaker().metrics().total_successes, 2);
}

#[tokio::test]
async fn test_transient_failure_is_retried_within_one_lookup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/search/movie"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/3/search/movie"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(search_body(vec![movie(348, "Alien", "1979-05-25")])),
        )
        .mount(&server)
        .await;

    let catalog = Arc::new(CatalogClient::from_config(&catalog_config(&server, 5, 3)).unwrap());
    let job = EnrichmentJob::new(catalog.clone());

    let report = job
        .run(&CancellationToken::new(), &[SearchQuery::new("Alien", Some(1979))])
        .await
        .unwrap();

    assert_eq!(report.enriched[0].item.id, 348);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
    // the success after two failures closes the streak
    let metrics = catalog.resilient().breaker().metrics();
    assert_eq!(metrics.total_failures, 2);
    assert_eq!(metrics.consecutive_failures, 0);
    assert_eq!(metrics.state, CircuitState::Closed);
}

#[tokio::test]
async fn test_open_breaker_skips_remaining_titles() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/search/movie"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let catalog = Arc::new(CatalogClient::from_config(&catalog_config(&server, 2, 1)).unwrap());
    let job = EnrichmentJob::new(catalog.clone());
    let queries = vec![
        SearchQuery::new("Alien", None),
        SearchQuery::new("Aliens", None),
        SearchQuery::new("Alien 3", None),
        SearchQuery::new("Prometheus", None),
    ];

    let report = job.run(&CancellationToken::new(), &queries).await.unwrap();

    assert_eq!(report.failed.len(), 2);
    assert_eq!(report.skipped, queries[2..].to_vec());
    assert_eq!(catalog.resilient().breaker().state(), CircuitState::Open);
    // skipped titles never reached the network
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_client_errors_fail_fast_without_tripping_breaker() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/search/movie"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
        .mount(&server)
        .await;

    let catalog = Arc::new(CatalogClient::from_config(&catalog_config(&server, 1, 3)).unwrap());
    let job = EnrichmentJob::new(catalog.clone());
    let queries = vec![SearchQuery::new("Alien", None), SearchQuery::new("Heat", None)];

    let report = job.run(&CancellationToken::new(), &queries).await.unwrap();

    assert_eq!(report.failed.len(), 2);
    assert!(report.skipped.is_empty());
    assert_eq!(catalog.resilient().breaker().state(), CircuitState::Closed);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_cancelled_run_stops_before_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(vec![])))
        .mount(&server)
        .await;

    let mut config = catalog_config(&server, 5, 3);
    config.curator.rate_limit.max_requests = 1;
    config.curator.rate_limit.window_secs = 3600;
    let catalog = Arc::new(CatalogClient::from_config(&config).unwrap());
    let job = EnrichmentJob::new(catalog);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        trigger.cancel();
    });

    // the second title waits on an exhausted quota until cancelled
    let err = job
        .run(&cancel, &[SearchQuery::new("Alien", None), SearchQuery::new("Heat", None)])
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}
