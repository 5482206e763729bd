// tests/news_http.rs
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use chrono::{TimeZone, Utc};
use nuntius::{GNewsClient, NewsSource, Secret, TimeWindow};

type Seen = Arc<Mutex<Vec<HashMap<String, String>>>>;

const ONE_ARTICLE: &str = r#"{
    "totalArticles": 1,
    "articles": [{
        "id": "t1",
        "title": "Chips",
        "description": "New chips",
        "content": "...",
        "url": "https://news.example/chips",
        "image": "https://img.example/chips.jpg",
        "publishedAt": "2025-03-09T21:00:00Z",
        "source": {"id": "s", "name": "TechWire", "url": "https://techwire.example", "country": "us"}
    }]
}"#;

async fn headlines(State(seen): State<Seen>, Query(q): Query<HashMap<String, String>>) -> Response {
    seen.lock().unwrap().push(q.clone());
    match q.get("category").map(String::as_str) {
        Some("sports") => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            ONE_ARTICLE.into_response()
        }
        Some("broken") => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        Some("garbage") => "not json at all".into_response(),
        Some("moved") => Redirect::temporary("/api/v4/top-headlines?category=technology").into_response(),
        _ => ONE_ARTICLE.into_response(),
    }
}

async fn serve() -> (SocketAddr, Seen) {
    let seen: Seen = Arc::default();
    let app = Router::new()
        .route("/api/v4/top-headlines", get(headlines))
        .with_state(seen.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, seen)
}

fn client(addr: SocketAddr) -> GNewsClient {
    GNewsClient::new(
        format!("http://{addr}/api/v4/top-headlines"),
        "en",
        5,
        Secret::new("k3y"),
        Duration::from_secs(1),
    )
    .unwrap()
}

fn window() -> TimeWindow {
    TimeWindow::at(Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap(), 12, 3)
}

#[tokio::test]
async fn success_parses_articles_and_sends_params() {
    let (addr, seen) = serve().await;

    let res = client(addr)
        .fetch_category("technology", &window())
        .await
        .expect("result");
    assert_eq!(res.total_articles, 1);
    assert_eq!(res.articles[0].source.name, "TechWire");

    let q = seen.lock().unwrap()[0].clone();
    assert_eq!(q["lang"], "en");
    assert_eq!(q["category"], "technology");
    assert_eq!(q["max"], "5");
    assert_eq!(q["from"], "2025-03-09T20:59:59.000Z");
    assert_eq!(q["to"], "2025-03-09T23:59:59.000Z");
    assert_eq!(q["apikey"], "k3y");
}

#[tokio::test]
async fn timeout_yields_none() {
    let (addr, _) = serve().await;
    assert!(client(addr).fetch_category("sports", &window()).await.is_none());
}

#[tokio::test]
async fn http_error_yields_none() {
    let (addr, _) = serve().await;
    assert!(client(addr).fetch_category("broken", &window()).await.is_none());
}

#[tokio::test]
async fn unparsable_body_yields_none() {
    let (addr, _) = serve().await;
    assert!(client(addr).fetch_category("garbage", &window()).await.is_none());
}

#[tokio::test]
async fn redirects_are_followed() {
    let (addr, seen) = serve().await;
    let res = client(addr).fetch_category("moved", &window()).await;
    assert!(res.is_some());
    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn connection_refused_yields_none() {
    // bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    assert!(client(addr).fetch_category("general", &window()).await.is_none());
}
