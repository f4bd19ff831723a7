use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{MarketplaceClient, ProductLookup};
use crate::config::MarketplaceConfig;
use crate::error::VitrinaError;
use crate::models::SearchQuery;

fn test_config(base_url: &str) -> MarketplaceConfig {
    MarketplaceConfig {
        base_url: base_url.to_string(),
        ..MarketplaceConfig::default()
    }
}

fn product(id: &str, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "price": 500,
        "pictures": [{"id": format!("{id}-p1"), "url": format!("http://img/{id}.jpg")}]
    })
}

#[tokio::test]
async fn test_fetch_item_sends_bearer_credential() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/items/MLA1"))
        .and(header("authorization", "Bearer APP_USR-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(product("MLA1", "Monitor")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = MarketplaceClient::new(test_config(&mock_server.uri())).unwrap();
    let item = client.fetch_item("MLA1", "APP_USR-1").await.unwrap();

    assert_eq!(item.id, "MLA1");
    assert_eq!(item.title, "Monitor");
    assert_eq!(item.pictures[0].url, "http://img/MLA1.jpg");
}

#[tokio::test]
async fn test_fetch_item_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/items/MLA404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "not_found"})))
        .mount(&mock_server)
        .await;

    let client = MarketplaceClient::new(test_config(&mock_server.uri())).unwrap();
    let err = client.fetch_item("MLA404", "tok").await.unwrap_err();
    assert!(matches!(err, VitrinaError::NotFound(_)));
}

#[tokio::test]
async fn test_fetch_item_server_error_is_upstream() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/items/MLA1"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = MarketplaceClient::new(test_config(&mock_server.uri())).unwrap();
    let err = client.fetch_item("MLA1", "tok").await.unwrap_err();
    assert!(matches!(err, VitrinaError::Upstream(_)));
}

#[tokio::test]
async fn test_fetch_items_unwraps_and_skips_failed_entries() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .and(query_param("ids", "MLA1,MLA2,MLA3"))
        .and(query_param("attributes", "id,title,pictures,price"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"code": 200, "body": product("MLA2", "Silla")},
            {"code": 404, "body": {"id": "MLA3", "message": "Item not found"}},
            {"code": 200, "body": product("MLA1", "Monitor")}
        ])))
        .mount(&mock_server)
        .await;

    let client = MarketplaceClient::new(test_config(&mock_server.uri())).unwrap();
    let ids = vec!["MLA1".to_string(), "MLA2".to_string(), "MLA3".to_string()];
    let items = client.fetch_items(&ids, "tok").await.unwrap();

    let got: Vec<&str> = items.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(got, vec!["MLA2", "MLA1"]);
    assert_eq!(items[1].body.title, "Monitor");
}

#[tokio::test]
async fn test_fetch_items_empty_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = MarketplaceClient::new(test_config(&mock_server.uri())).unwrap();
    let items = client.fetch_items(&[], "tok").await.unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_search_passes_query_and_site() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sites/MLA/search"))
        .and(query_param("q", "monitor 24"))
        .and(query_param("limit", "2"))
        .and(query_param("status", "active"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "site_id": "MLA",
            "paging": {"total": 120, "offset": 0, "limit": 2},
            "results": [
                {"id": "MLA1", "title": "Monitor", "price": 500, "thumbnail": "http://t/1", "thumbnail_id": "t1"},
                {"id": "MLA2", "title": "Monitor 2", "price": 600}
            ]
        })))
        .mount(&mock_server)
        .await;

    let client = MarketplaceClient::new(test_config(&mock_server.uri())).unwrap();
    let query = SearchQuery {
        q: "monitor 24".to_string(),
        offset: None,
        limit: Some(2),
    };
    let page = client.search(&query, "tok").await.unwrap();

    assert_eq!(page.paging.total, 120);
    assert_eq!(page.results.len(), 2);
    assert_eq!(page.results[0].thumbnail_id.as_deref(), Some("t1"));
    assert!(page.results[1].thumbnail.is_none());
}

#[tokio::test]
async fn test_refresh_access_token_posts_form() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=TG-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "APP_USR-fresh",
            "token_type": "Bearer",
            "expires_in": 21600
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = MarketplaceConfig {
        client_id: Some("123".to_string()),
        client_secret: Some("secret".to_string()),
        refresh_token: Some("TG-1".to_string()),
        ..test_config(&mock_server.uri())
    };
    let client = MarketplaceClient::new(config).unwrap();

    assert_eq!(client.refresh_access_token().await.unwrap(), "APP_USR-fresh");
}

#[tokio::test]
async fn test_static_access_token_skips_refresh() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = MarketplaceConfig {
        access_token: Some("APP_USR-static".to_string()),
        ..test_config(&mock_server.uri())
    };
    let client = MarketplaceClient::new(config).unwrap();

    assert_eq!(client.refresh_access_token().await.unwrap(), "APP_USR-static");
}

#[tokio::test]
async fn test_refresh_without_credentials_fails() {
    let client = MarketplaceClient::new(test_config("http://127.0.0.1:9")).unwrap();
    assert!(client.refresh_access_token().await.is_err());
}

#[tokio::test]
async fn test_fetch_item_id_cannot_escape_items_path() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(product("ME", "Hijacked")))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/items/[^/]+$"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = MarketplaceClient::new(test_config(&mock_server.uri())).unwrap();
    let err = client.fetch_item("../users/me", "APP_USR-1").await.unwrap_err();
    assert!(matches!(err, VitrinaError::NotFound(_)));

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].url.path().starts_with("/items/"));
}

#[tokio::test]
async fn test_fetch_item_rejects_dot_segments() {
    let client = MarketplaceClient::new(test_config("http://127.0.0.1:9")).unwrap();
    let err = client.fetch_item("..", "tok").await.unwrap_err();
    assert!(matches!(err, VitrinaError::NotFound(_)));
}
