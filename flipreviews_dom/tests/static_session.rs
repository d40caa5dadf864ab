use std::time::Duration;

use flipreviews_dom::{DomError, PageSession, StaticSession};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE: &str = r#"
<html><body>
  <div class="review"><p>5</p><p>Great phone</p></div>
  <div class="review">
    <p>4</p>
    <p>Decent battery</p>
    <span class="review-date">Mar 2023</span>
  </div>
  <a href="/product-reviews/XYZ">All reviews</a>
</body></html>
"#;

async fn loaded_session(server: &MockServer) -> StaticSession {
    let mut session = StaticSession::new().unwrap();
    session
        .load_page(&format!("{}/item", server.uri()))
        .await
        .unwrap();
    session
}

#[tokio::test]
async fn query_elements_returns_matches_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/item"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
        .mount(&server)
        .await;

    let session = loaded_session(&server).await;
    let nodes = session.query_elements("div.review").unwrap();
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0].text, "5\nGreat phone");
    assert!(nodes[1].text.contains("Decent battery"));
}

#[tokio::test]
async fn hyperlinks_carry_their_target() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/item"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
        .mount(&server)
        .await;

    let session = loaded_session(&server).await;
    let links = session.query_elements("a").unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].href.as_deref(), Some("/product-reviews/XYZ"));
}

#[tokio::test]
async fn query_nested_scopes_children_per_container() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/item"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
        .mount(&server)
        .await;

    let session = loaded_session(&server).await;
    let nested = session
        .query_nested("div.review", "span[class*='date']")
        .unwrap();
    assert_eq!(nested.len(), 2);
    assert!(nested[0].is_empty());
    assert_eq!(nested[1], vec!["Mar 2023".to_string()]);
}

#[tokio::test]
async fn wait_for_any_is_an_immediate_presence_check() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/item"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
        .mount(&server)
        .await;

    let mut session = loaded_session(&server).await;
    let found = session
        .wait_for_any(&["div.missing", "div.review"], Duration::from_secs(5))
        .await
        .unwrap();
    assert!(found);

    let missing = session
        .wait_for_any(&["div.missing"], Duration::from_secs(5))
        .await
        .unwrap();
    assert!(!missing);
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut session = StaticSession::new().unwrap();
    let err = session
        .load_page(&format!("{}/gone", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, DomError::HttpStatus { .. }));
}

#[tokio::test]
async fn invalid_pattern_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/item"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
        .mount(&server)
        .await;

    let session = loaded_session(&server).await;
    assert!(matches!(
        session.query_elements("div[[["),
        Err(DomError::Pattern(_))
    ));
}
