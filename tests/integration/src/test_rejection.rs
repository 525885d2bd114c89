//! Rejection and routing integration tests.

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use hooksign_auth::{AuthError, KeyResolver, KeyRing, SecretKey, VerifyOptions};
    use hooksign_http::HookHttpConfig;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    use crate::{
        FAILING_ENDPOINT, KEY_ID, TestServer, now_timestamp, provisioned_keys, sign_request,
        test_secret,
    };

    const PATH: &str = "/transactions/authorizations";
    const BODY: &[u8] = br#"{"a":1}"#;

    async fn assert_generic_rejection(resp: reqwest::Response) {
        assert_eq!(resp.status(), 401);
        assert!(resp.headers().get("x-signature").is_none());
        let json: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(json["message"], "request authentication failed");
    }

    #[tokio::test]
    async fn test_should_reject_tampered_body() {
        let server = TestServer::start().await;
        let timestamp = now_timestamp();
        let signature = sign_request(&test_secret(), &timestamp, "orders", BODY);

        let resp = server
            .client
            .post(server.url(PATH))
            .header("X-Endpoint", "orders")
            .header("X-Timestamp", &timestamp)
            .header("X-Api-Key", KEY_ID)
            .header("X-Signature", signature)
            .body(r#"{"a": 1}"#)
            .send()
            .await
            .unwrap();

        assert_generic_rejection(resp).await;
    }

    #[tokio::test]
    async fn test_should_reject_unknown_key_like_a_bad_signature() {
        let server = TestServer::start().await;
        let timestamp = now_timestamp();
        let signature = sign_request(&test_secret(), &timestamp, "orders", BODY);

        let resp = server
            .client
            .post(server.url(PATH))
            .header("X-Endpoint", "orders")
            .header("X-Timestamp", &timestamp)
            .header("X-Api-Key", "not-provisioned")
            .header("X-Signature", signature)
            .body(BODY)
            .send()
            .await
            .unwrap();

        assert_generic_rejection(resp).await;
    }

    #[tokio::test]
    async fn test_should_reject_unsupported_algorithm() {
        let server = TestServer::start().await;
        let timestamp = now_timestamp();
        let signature = sign_request(&test_secret(), &timestamp, "orders", BODY)
            .replacen("hmac-sha256", "hmac-sha1", 1);

        let resp = server
            .client
            .post(server.url(PATH))
            .header("X-Endpoint", "orders")
            .header("X-Timestamp", &timestamp)
            .header("X-Api-Key", KEY_ID)
            .header("X-Signature", signature)
            .body(BODY)
            .send()
            .await
            .unwrap();

        assert_generic_rejection(resp).await;
    }

    #[tokio::test]
    async fn test_should_reject_missing_signature_header() {
        let server = TestServer::start().await;

        let resp = server
            .client
            .post(server.url(PATH))
            .header("X-Endpoint", "orders")
            .header("X-Timestamp", now_timestamp())
            .header("X-Api-Key", KEY_ID)
            .body(BODY)
            .send()
            .await
            .unwrap();

        assert_generic_rejection(resp).await;
    }

    #[tokio::test]
    async fn test_should_reject_stale_timestamp_when_window_enabled() {
        let server = TestServer::start_with_options(VerifyOptions {
            max_timestamp_skew: Some(Duration::from_secs(300)),
        })
        .await;

        let stale = server.post_signed(PATH, "orders", "1700000000", BODY).await;
        assert_generic_rejection(stale).await;

        let fresh = server.post_signed(PATH, "orders", &now_timestamp(), BODY).await;
        assert_eq!(fresh.status(), 200);
    }

    #[tokio::test]
    async fn test_should_return_500_without_signature_when_handler_fails() {
        let server = TestServer::start().await;

        let resp = server
            .post_signed(PATH, FAILING_ENDPOINT, &now_timestamp(), BODY)
            .await;

        assert_eq!(resp.status(), 500);
        assert!(resp.headers().get("x-signature").is_none());
    }

    #[tokio::test]
    async fn test_should_return_404_for_unknown_path() {
        let server = TestServer::start().await;

        let resp = server
            .post_signed("/transactions/refunds", "orders", &now_timestamp(), BODY)
            .await;

        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn test_should_return_405_for_get_on_webhook() {
        let server = TestServer::start().await;

        let resp = server.client.get(server.url(PATH)).send().await.unwrap();

        assert_eq!(resp.status(), 405);
    }

    #[tokio::test]
    async fn test_should_answer_health_probe_without_auth() {
        let server = TestServer::start().await;

        let resp = server
            .client
            .get(server.url("/_hooksign/health"))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 200);
        let json: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(json["status"], "running");
    }

    /// Resolves a key once, then behaves as if it had been rotated out.
    #[derive(Debug)]
    struct RevokedAfterFirstUse {
        keys: Arc<KeyRing>,
        used: AtomicBool,
    }

    impl KeyResolver for RevokedAfterFirstUse {
        fn resolve(&self, key_id: &str) -> Result<SecretKey, AuthError> {
            if self.used.swap(true, Ordering::SeqCst) {
                return Err(AuthError::UnknownKey(key_id.to_owned()));
            }
            self.keys.resolve(key_id)
        }
    }

    /// Send raw request bytes and return the response status line.
    ///
    /// With `close_write` the write half is shut down after sending, so the
    /// server sees the body end early.
    async fn raw_status_line(addr: SocketAddr, request: &[u8], close_write: bool) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(request).await.unwrap();
        if close_write {
            stream.shutdown().await.unwrap();
        }

        let mut received = Vec::new();
        let mut buf = [0u8; 1024];
        tokio::time::timeout(Duration::from_secs(5), async {
            while !received.windows(2).any(|w| w == b"\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);
            }
        })
        .await
        .expect("server answered before the body was complete");

        String::from_utf8_lossy(&received)
            .lines()
            .next()
            .unwrap_or_default()
            .to_owned()
    }

    #[tokio::test]
    async fn test_should_reject_unsigned_request_without_reading_body() {
        let server = TestServer::start().await;

        // Announces far more body than it sends and never closes: only a
        // server that skips the body can answer.
        let request = format!(
            "POST {PATH} HTTP/1.1\r\nHost: {}\r\nContent-Length: 100000\r\n\r\nabc",
            server.addr
        );
        let status = raw_status_line(server.addr, request.as_bytes(), false).await;

        assert_eq!(status, "HTTP/1.1 401 Unauthorized");
    }

    #[tokio::test]
    async fn test_should_reject_signed_request_with_truncated_body() {
        let server = TestServer::start().await;
        let timestamp = now_timestamp();
        let signature = sign_request(&test_secret(), &timestamp, "orders", b"abc");

        let request = format!(
            "POST {PATH} HTTP/1.1\r\nHost: {}\r\nX-Endpoint: orders\r\nX-Timestamp: {timestamp}\r\n\
             X-Api-Key: {KEY_ID}\r\nX-Signature: {signature}\r\nContent-Length: 100000\r\n\r\nabc",
            server.addr
        );
        let status = raw_status_line(server.addr, request.as_bytes(), true).await;

        assert_eq!(status, "HTTP/1.1 401 Unauthorized");
    }

    #[tokio::test]
    async fn test_should_return_413_for_body_over_limit() {
        const LARGE: &[u8] = &[b' '; 64];

        let keys = provisioned_keys();
        let mut config = HookHttpConfig::new(Arc::clone(&keys) as Arc<dyn KeyResolver>);
        config.max_body_bytes = 16;
        let server = TestServer::start_with_config(keys, config).await;

        let small = server.post_signed(PATH, "orders", &now_timestamp(), BODY).await;
        assert_eq!(small.status(), 200);

        let large = server.post_signed(PATH, "orders", &now_timestamp(), LARGE).await;
        assert_eq!(large.status(), 413);
        assert!(large.headers().get("x-signature").is_none());
    }

    #[tokio::test]
    async fn test_should_return_500_without_signature_headers_when_signing_key_is_gone() {
        let keys = provisioned_keys();
        let resolver = RevokedAfterFirstUse {
            keys: Arc::clone(&keys),
            used: AtomicBool::new(false),
        };
        let server =
            TestServer::start_with_config(keys, HookHttpConfig::new(Arc::new(resolver))).await;

        let resp = server.post_signed(PATH, "orders", &now_timestamp(), BODY).await;

        assert_eq!(resp.status(), 500);
        assert!(resp.headers().get("x-signature").is_none());
        assert!(resp.headers().get("x-timestamp").is_none());
        assert!(resp.headers().get("x-endpoint").is_none());
        let json: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(json["message"], "internal error");
    }
}
