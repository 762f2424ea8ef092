use chrono::{TimeZone, Utc};
use crypto_price_analyzer::{
    network::{BinanceClient, RetryPolicy},
    store::QuoteStore,
    utils::FixedClock,
    AnalyzerError, PriceObservation,
};
use mockito::Matcher;
use std::sync::Arc;
use std::time::Duration;

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        initial_delay_ms: 1,
        max_delay_ms: 5,
        exponential_base: 2.0,
        jitter: 0.0,
    }
}

fn client(base_url: &str) -> BinanceClient {
    BinanceClient::new(base_url, "eur", Duration::from_secs(5))
        .unwrap()
        .with_retry_policy(fast_retry())
}

#[tokio::test]
async fn fetches_daily_closes_for_pair() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v3/klines")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("symbol".into(), "ETHEUR".into()),
            Matcher::UrlEncoded("interval".into(), "1d".into()),
            Matcher::UrlEncoded("limit".into(), "2".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[
                [1735689600000, "3200.00", "3300.00", "3100.00", "3250.50", "1000.0", 1735775999999],
                [1735776000000, "3250.50", "3400.00", "3200.00", "3380.25", "900.0", 1735862399999]
            ]"#,
        )
        .create_async()
        .await;

    let quotes = client(&server.url()).fetch_daily_closes("eth", 2).await.unwrap();

    mock.assert_async().await;
    assert_eq!(quotes.len(), 2);
    assert!(quotes.iter().all(|q| q.symbol == "ETH"));
    assert_eq!(quotes[0].price, 3250.5);
    assert_eq!(quotes[1].price, 3380.25);
    assert!(quotes[0].timestamp < quotes[1].timestamp);
}

#[tokio::test]
async fn api_error_payload_is_price_source_error() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v3/klines")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"code": -1121, "msg": "Invalid symbol."}"#)
        .expect(1)
        .create_async()
        .await;

    let err = client(&server.url()).fetch_daily_closes("NOPE", 30).await.unwrap_err();

    mock.assert_async().await;
    match err {
        AnalyzerError::PriceSource { symbol, message } => {
            assert_eq!(symbol, "NOPE");
            assert_eq!(message, "Invalid symbol.");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn server_errors_are_retried_then_reported() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v3/klines")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("maintenance")
        .expect(3)
        .create_async()
        .await;

    let err = client(&server.url()).fetch_daily_closes("BTC", 30).await.unwrap_err();

    mock.assert_async().await;
    match err {
        AnalyzerError::Network { retry_count, message, .. } => {
            assert_eq!(retry_count, 3);
            assert!(message.contains("BTCEUR"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn limit_is_capped_at_binance_maximum() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v3/klines")
        .match_query(Matcher::UrlEncoded("limit".into(), "1000".into()))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let quotes = client(&server.url()).fetch_daily_closes("SOL", 5000).await.unwrap();

    mock.assert_async().await;
    assert!(quotes.is_empty());
}

#[tokio::test]
async fn non_json_client_error_is_not_retried() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v3/klines")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_header("content-type", "text/html")
        .with_body("<html><body>Not Found</body></html>")
        .expect(1)
        .create_async()
        .await;

    let err = client(&server.url()).fetch_daily_closes("BTC", 30).await.unwrap_err();

    mock.assert_async().await;
    match err {
        AnalyzerError::PriceSource { message, .. } => assert!(message.contains("404")),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn incremental_refresh_requests_only_missing_days() {
    let now = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
    let mut store = QuoteStore::new(Arc::new(FixedClock(now)));
    store.upsert(PriceObservation::new("BTC", 80_000.0, Utc.with_ymd_and_hms(2025, 3, 7, 0, 0, 0).unwrap()));
    let days = store.incremental_fetch_days("BTC", 365);
    assert_eq!(days, 4);

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v3/klines")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("symbol".into(), "BTCEUR".into()),
            Matcher::UrlEncoded("limit".into(), "4".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"[
                [1741305600000, "0", "0", "0", "80100.0"],
                [1741392000000, "0", "0", "0", "81000.0"],
                [1741478400000, "0", "0", "0", "82000.0"],
                [1741564800000, "0", "0", "0", "83000.0"]
            ]"#,
        )
        .create_async()
        .await;

    let quotes = client(&server.url()).fetch_daily_closes("BTC", days).await.unwrap();
    mock.assert_async().await;

    // The refetched 7 March close replaces the stored one.
    assert_eq!(store.upsert_batch(quotes), 3);
    assert_eq!(store.len(), 4);
    assert_eq!(store.oldest_timestamp("BTC").unwrap().timestamp_millis(), 1741305600000);
}
