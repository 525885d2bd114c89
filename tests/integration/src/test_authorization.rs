//! Authorization endpoint integration tests.

#[cfg(test)]
mod tests {
    use crate::{TestServer, assert_signed, now_timestamp};

    const BODY: &[u8] = br#"{"transaction":{"id":"ctx-1","amount":"10.00"}}"#;

    #[tokio::test]
    async fn test_should_sign_authorization_reply_over_sent_bytes() {
        let server = TestServer::start().await;
        let timestamp = now_timestamp();

        let resp = server
            .post_signed("/transactions/authorizations", "/transactions/authorizations", &timestamp, BODY)
            .await;

        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers().get("content-type").unwrap(), "application/json");
        assert_eq!(
            resp.headers().get("x-endpoint").unwrap(),
            "/transactions/authorizations"
        );
        let headers = resp.headers().clone();
        let body = resp.bytes().await.unwrap();

        // The handler saw the exact bytes that were verified.
        assert_eq!(&body[..], BODY);
        assert_signed(&headers, Some(&body[..]));
    }

    #[tokio::test]
    async fn test_should_issue_fresh_timestamp_instead_of_echoing() {
        let server = TestServer::start().await;

        let resp = server
            .post_signed("/transactions/authorizations", "orders", "1700000000", BODY)
            .await;

        assert_eq!(resp.status(), 200);
        let sent: i64 = resp
            .headers()
            .get("x-timestamp")
            .unwrap()
            .to_str()
            .unwrap()
            .parse()
            .unwrap();
        assert!(sent > 1_700_000_000);
        assert!((chrono::Utc::now().timestamp() - sent).abs() <= 5);
    }

    #[tokio::test]
    async fn test_should_carry_request_id_and_server_headers() {
        let server = TestServer::start().await;

        let resp = server
            .post_signed("/transactions/authorizations", "orders", &now_timestamp(), BODY)
            .await;

        assert!(resp.headers().get("x-request-id").is_some());
        assert_eq!(resp.headers().get("server").unwrap(), "hooksign");
        assert!(resp.headers().get("x-api-key").is_none());
    }
}
