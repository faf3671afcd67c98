//! Server-side reCAPTCHA v3 verification.

mod client;
mod error;
mod types;

pub use client::{RecaptchaClient, DEFAULT_VERIFY_URL};
pub use error::RecaptchaError;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_client(mock_server: &MockServer, secret: Option<&str>) -> RecaptchaClient {
        RecaptchaClient::new(
            secret.map(String::from),
            format!("{}/recaptcha/api/siteverify", mock_server.uri()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_verify_accepts_good_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/recaptcha/api/siteverify"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("secret=server-secret"))
            .and(body_string_contains("response=client-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "score": 0.9,
                "action": "signup",
                "hostname": "localhost"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, Some("server-secret"));
        let result = client.verify("client-token").await.unwrap();

        assert!(result.ok);
        assert_eq!(result.score, 0.9);
        assert_eq!(result.action, "signup");
    }

    #[tokio::test]
    async fn test_verify_rejects_low_score() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/recaptcha/api/siteverify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "score": 0.5,
                "action": "signup"
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, Some("server-secret"));
        let result = client.verify("client-token").await.unwrap();

        assert!(!result.ok);
        assert_eq!(result.score, 0.5);
    }

    #[tokio::test]
    async fn test_verify_rejects_failed_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/recaptcha/api/siteverify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": false,
                "error-codes": ["invalid-input-response"]
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, Some("server-secret"));
        let result = client.verify("bogus").await.unwrap();

        assert!(!result.ok);
    }

    #[tokio::test]
    async fn test_missing_secret_rejects_without_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, None);
        assert!(!client.has_secret());

        let result = client.verify("client-token").await.unwrap();
        assert_eq!(result, Verification::rejected());
    }

    #[tokio::test]
    async fn test_empty_secret_counts_as_missing() {
        let mock_server = MockServer::start().await;
        let client = create_test_client(&mock_server, Some(""));
        assert!(!client.has_secret());
    }

    #[tokio::test]
    async fn test_verify_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/recaptcha/api/siteverify"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, Some("server-secret"));
        let result = client.verify("client-token").await;

        assert!(matches!(result, Err(RecaptchaError::Api { status: 503, .. })));
    }

    #[tokio::test]
    async fn test_verify_malformed_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/recaptcha/api/siteverify"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, Some("server-secret"));
        let result = client.verify("client-token").await;

        assert!(matches!(result, Err(RecaptchaError::Json(_))));
    }

    #[tokio::test]
    async fn test_custom_policy() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/recaptcha/api/siteverify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "score": 0.5,
                "action": "contact"
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, Some("server-secret")).with_policy(
            VerificationPolicy {
                expected_action: "contact".into(),
                min_score: 0.3,
            },
        );

        assert!(client.verify("client-token").await.unwrap().ok);
    }
}
