//! Key rotation integration tests.

#[cfg(test)]
mod tests {
    use hooksign_auth::{KeyPair, SecretKey};

    use crate::{KEY_ID, TestServer, now_timestamp, sign_request};

    const PATH: &str = "/transactions/authorizations";
    const BODY: &[u8] = br#"{"a":1}"#;

    async fn post_with_key(
        server: &TestServer,
        key_id: &str,
        secret: &SecretKey,
    ) -> reqwest::Response {
        let timestamp = now_timestamp();
        server
            .client
            .post(server.url(PATH))
            .header("X-Endpoint", "orders")
            .header("X-Timestamp", &timestamp)
            .header("X-Api-Key", key_id)
            .header("X-Signature", sign_request(secret, &timestamp, "orders", BODY))
            .body(BODY)
            .send()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_should_accept_old_and_new_keys_during_rollover() {
        let server = TestServer::start().await;
        let old_secret = SecretKey::new(vec![0u8; 32]);
        let new_secret = SecretKey::new(vec![9u8; 32]);

        server.keys.rotate(vec![
            KeyPair::new(KEY_ID, vec![0u8; 32]),
            KeyPair::new("next-key", vec![9u8; 32]),
        ]);

        assert_eq!(post_with_key(&server, KEY_ID, &old_secret).await.status(), 200);
        assert_eq!(post_with_key(&server, "next-key", &new_secret).await.status(), 200);
    }

    #[tokio::test]
    async fn test_should_reject_retired_key_after_rotation() {
        let server = TestServer::start().await;
        let old_secret = SecretKey::new(vec![0u8; 32]);

        server
            .keys
            .rotate(vec![KeyPair::new("next-key", vec![9u8; 32])]);

        assert_eq!(post_with_key(&server, KEY_ID, &old_secret).await.status(), 401);
    }
}
