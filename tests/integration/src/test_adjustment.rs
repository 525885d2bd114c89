//! Adjustment endpoint integration tests.

#[cfg(test)]
mod tests {
    use crate::{TestServer, assert_signed, now_timestamp};

    #[tokio::test]
    async fn test_should_sign_adjustment_reply_without_body_segment() {
        let server = TestServer::start().await;

        let resp = server
            .post_signed(
                "/transactions/adjustments/ctx-42",
                "/transactions/adjustments",
                &now_timestamp(),
                br#"{"adjustment":true}"#,
            )
            .await;

        assert_eq!(resp.status(), 200);
        let headers = resp.headers().clone();
        let body = resp.bytes().await.unwrap();

        assert!(body.is_empty());
        assert_signed(&headers, None);
    }

    #[tokio::test]
    async fn test_should_accept_signed_request_with_empty_body() {
        let server = TestServer::start().await;

        let resp = server
            .post_signed("/transactions/adjustments", "adjustments", &now_timestamp(), b"")
            .await;

        assert_eq!(resp.status(), 200);
    }
}
