mod common;

use axum::{http::StatusCode, routing::get as get_route, Json, Router};
use careerbridge::pricing::{Currency, PriceOracle, RateSource, FALLBACK_ETH_USD_RATE};
use common::*;
use serde_json::json;

/// Serves `router` on an ephemeral local port and returns its base URL.
async fn spawn_provider(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_all_providers_down_uses_fallback_rate() {
    let oracle = PriceOracle::new(&offline_pricing()).unwrap();

    let quote = oracle.eth_usd_rate().await;
    assert_eq!(quote.rate, FALLBACK_ETH_USD_RATE);
    assert_eq!(quote.source, RateSource::Fallback);

    let conversion = oracle.usd_to_eth(6000.0).await;
    assert_eq!(conversion.result, 2.0);
    assert!(conversion.quote.is_fallback());
}

#[tokio::test]
async fn test_first_healthy_provider_wins() {
    let failing = spawn_provider(Router::new().route(
        "/api/v3/simple/price",
        get_route(|| async { StatusCode::SERVICE_UNAVAILABLE }),
    ))
    .await;
    let healthy = spawn_provider(Router::new().route(
        "/data/price",
        get_route(|| async { Json(json!({ "USD": 2500.0 })) }),
    ))
    .await;
    let never_asked = spawn_provider(Router::new().route(
        "/v2/prices/ETH-USD/spot",
        get_route(|| async { Json(json!({ "data": { "amount": "1.0" } })) }),
    ))
    .await;

    let oracle = PriceOracle::new(&pricing(&failing, &healthy, &never_asked)).unwrap();
    let quote = oracle.eth_usd_rate().await;
    assert_eq!(quote.rate, 2500.0);
    assert_eq!(quote.source, RateSource::Live("cryptocompare"));
}

#[tokio::test]
async fn test_implausible_quote_is_skipped() {
    let zero = spawn_provider(Router::new().route(
        "/api/v3/simple/price",
        get_route(|| async { Json(json!({ "ethereum": { "usd": 0.0 } })) }),
    ))
    .await;
    let coinbase = spawn_provider(Router::new().route(
        "/v2/prices/ETH-USD/spot",
        get_route(|| async { Json(json!({ "data": { "base": "ETH", "currency": "USD", "amount": "3150.25" } })) }),
    ))
    .await;

    let oracle = PriceOracle::new(&pricing(&zero, UNREACHABLE, &coinbase)).unwrap();
    let conversion = oracle.eth_to_usd(2.0).await;
    assert_eq!(conversion.quote.source, RateSource::Live("coinbase"));
    assert_eq!(conversion.result, 6300.5);
}

#[tokio::test]
async fn test_same_currency_conversion_is_identity() {
    let oracle = PriceOracle::new(&offline_pricing()).unwrap();

    let conversion = oracle.convert(42.0, Currency::Eth, Currency::Eth).await;
    assert_eq!(conversion.result, 42.0);
}

#[tokio::test]
async fn test_convert_endpoint_reports_fallback() {
    let (app, _) = test_app();

    let (status, json) = get(&app, "/api/currency/convert?amount=1.5&from=ETH&to=usd").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["from"], "eth");
    assert_eq!(json["data"]["to"], "usd");
    assert_eq!(json["data"]["rate"], 3000.0);
    assert_eq!(json["data"]["result"], 4500.0);
    assert_eq!(json["data"]["source"], "fallback");
    assert_eq!(json["data"]["fallback"], true);
}

#[tokio::test]
async fn test_convert_endpoint_rejects_bad_input() {
    let (app, _) = test_app();

    let (status, json) = get(&app, "/api/currency/convert?amount=1&from=btc&to=usd").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("btc"));

    let (status, _) = get(&app, "/api/currency/convert?amount=-5&from=usd&to=eth").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = get(&app, "/api/currency/convert?from=usd&to=eth").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_rate_endpoint() {
    let (app, _) = test_app();

    let (status, json) = get(&app, "/api/currency/eth-usd").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["rate"], FALLBACK_ETH_USD_RATE);
    assert_eq!(json["data"]["fallback"], true);
}
