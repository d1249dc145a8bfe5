use super::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_discover_reads_version() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Browser": "HeadlessChrome/126.0",
            "Protocol-Version": "1.3",
            "User-Agent": "Mozilla/5.0",
            "webSocketDebuggerUrl": "ws://127.0.0.1:1/devtools/browser/x"
        })))
        .mount(&mock_server)
        .await;

    let version = CdpClient::discover(&mock_server.uri()).await.unwrap();
    assert_eq!(version.browser, "HeadlessChrome/126.0");
    assert!(version.web_socket_debugger_url.ends_with("/devtools/browser/x"));
}

#[tokio::test]
async fn test_connect_reports_unavailable_chrome() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/version"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let err = CdpClient::connect(&mock_server.uri()).await.err().unwrap();
    assert!(matches!(err, CdpError::ChromeNotAvailable(_)));
}

#[tokio::test]
async fn test_connect_rejects_malformed_version() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/version"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let err = CdpClient::connect(&mock_server.uri()).await.err().unwrap();
    assert!(matches!(err, CdpError::ChromeNotAvailable(_)));
}

#[tokio::test]
async fn test_connect_fails_when_websocket_unreachable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Browser": "Chrome/126.0",
            "Protocol-Version": "1.3",
            "webSocketDebuggerUrl": "ws://127.0.0.1:1/devtools/browser/x"
        })))
        .mount(&mock_server)
        .await;

    let err = CdpClient::connect(&format!("{}/", mock_server.uri()))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, CdpError::ConnectionFailed(_)));
}
