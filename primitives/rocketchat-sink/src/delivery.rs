//! Posts the rendered message to the incoming webhook.

use reqwest::{Client, Response, StatusCode, Url};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::NotifyError;

/// Body accepted by Rocket.Chat incoming webhooks.
///
/// serde_json leaves `<`, `>` and `&` unescaped, which the markdown relies on.
#[derive(Debug, Serialize)]
pub struct WebhookPayload<'a> {
    pub text: &'a str,
}

/// Parses the webhook destination.
pub fn parse_webhook(raw: &str) -> Result<Url, NotifyError> {
    Url::parse(raw).map_err(|e| NotifyError::InvalidWebhook(e.to_string()))
}

/// Sends `text` in a single POST. No retries; any status above 299 is a rejection.
pub async fn deliver(client: &Client, url: Url, text: &str) -> Result<StatusCode, NotifyError> {
    debug!(host = url.host_str().unwrap_or_default(), "posting notification");

    let response = client
        .post(url)
        .json(&WebhookPayload { text })
        .send()
        .await
        .map_err(NotifyError::Transport)?;

    let status = response.status();
    debug!(%status, "webhook responded");

    if status.as_u16() > 299 {
        let dump = dump_response(response).await;
        return Err(NotifyError::Rejected { status, dump });
    }

    Ok(status)
}

/// Status line, headers and body, roughly as they came over the wire.
async fn dump_response(response: Response) -> String {
    let mut dump = format!("{:?} {}\r\n", response.version(), response.status());

    for (name, value) in response.headers() {
        dump.push_str(name.as_str());
        dump.push_str(": ");
        dump.push_str(&String::from_utf8_lossy(value.as_bytes()));
        dump.push_str("\r\n");
    }
    dump.push_str("\r\n");

    match response.text().await {
        Ok(body) => dump.push_str(&body),
        Err(e) => warn!("failed to read webhook response body: {e}"),
    }

    dump
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        http::{HeaderMap, StatusCode as ServerStatus, header::CONTENT_TYPE},
        routing::post,
    };
    use tokio::{net::TcpListener, sync::mpsc};

    /// Content type and body of one request seen by the test webhook.
    type Captured = (Option<String>, String);

    async fn spawn_webhook(
        status: ServerStatus,
        reply: &'static str,
    ) -> (Url, mpsc::UnboundedReceiver<Captured>) {
        let (tx, rx) = mpsc::unbounded_channel();

        let app = Router::new().route(
            "/hooks/abc",
            post(move |headers: HeaderMap, body: String| {
                let tx = tx.clone();
                async move {
                    let content_type = headers
                        .get(CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_owned);
                    let _ = tx.send((content_type, body));
                    (status, reply)
                }
            }),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let url = Url::parse(&format!("http://{addr}/hooks/abc")).unwrap();
        (url, rx)
    }

    fn client() -> Client {
        Client::builder().no_proxy().build().unwrap()
    }

    #[test]
    fn payload_keeps_html_characters() {
        let text = "<b>a</b> & \"c\"\n```";
        let json = serde_json::to_string(&WebhookPayload { text }).unwrap();

        assert_eq!(json, r#"{"text":"<b>a</b> & \"c\"\n```"}"#);

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert_eq!(object["text"], text);
    }

    #[test]
    fn rejects_malformed_webhook() {
        let err = parse_webhook("not a url").unwrap_err();
        assert!(matches!(err, NotifyError::InvalidWebhook(_)));
        assert_eq!(err.exit_code(), 2);
        assert!(parse_webhook("https://chat.example.com/hooks/abc").is_ok());
    }

    #[tokio::test]
    async fn posts_json_text() {
        let (url, mut rx) = spawn_webhook(ServerStatus::OK, "{\"success\":true}").await;
        let text = ":white_check_mark: *Host monitoring on m* <ok> & fine";

        let status = deliver(&client(), url, text).await.unwrap();
        assert_eq!(status.as_u16(), 200);

        let (content_type, body) = rx.recv().await.unwrap();
        assert_eq!(content_type.as_deref(), Some("application/json"));

        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value, serde_json::json!({ "text": text }));
        assert!(body.contains("<ok> & fine"));
    }

    #[tokio::test]
    async fn accepted_status_is_success() {
        let (url, _rx) = spawn_webhook(ServerStatus::ACCEPTED, "").await;
        let status = deliver(&client(), url, "hi").await.unwrap();
        assert_eq!(status.as_u16(), 202);
    }

    #[tokio::test]
    async fn error_status_is_rejected_with_dump() {
        let (url, _rx) = spawn_webhook(ServerStatus::BAD_REQUEST, "invalid payload").await;

        let err = deliver(&client(), url, "hi").await.unwrap_err();
        assert_eq!(err.exit_code(), 1);

        let NotifyError::Rejected { status, dump } = err else {
            panic!("expected a rejection");
        };
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(dump.starts_with("HTTP/1.1 400 Bad Request\r\n"), "{dump}");
        assert!(dump.contains("content-length: 15\r\n"), "{dump}");
        assert!(dump.ends_with("\r\n\r\ninvalid payload"), "{dump}");
    }

    #[tokio::test]
    async fn unreachable_webhook_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = Url::parse(&format!("http://{addr}/hooks/abc")).unwrap();
        let err = deliver(&client(), url, "hi").await.unwrap_err();

        assert!(matches!(err, NotifyError::Transport(_)));
        assert_eq!(err.exit_code(), 1);
    }
}
