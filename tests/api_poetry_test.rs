//! Integration tests for the poetry API endpoints

mod test_utils;

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use mockito::Matcher;
    use serde_json::json;
    use tower::util::ServiceExt;

    use qalam::poetry::PoetryStyle;

    use crate::test_utils::{body_to_string, post_json, test_app};

    fn completion_body(content: &str) -> String {
        json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        })
        .to_string()
    }

    /// Tests generating a poem in a named style
    #[tokio::test]
    async fn it_generates_poetry() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer test-gateway-key")
            .match_body(Matcher::PartialJson(json!({
                "model": "google/gemini-2.5-flash",
                "messages": [
                    {"role": "system", "content": PoetryStyle::Nabati.system_prompt()},
                    {"role": "user", "content": "اكتب قصيدة عن: البحر"}
                ]
            })))
            .with_status(200)
            .with_body(completion_body("يا بحر"))
            .create_async()
            .await;

        let app = test_app(&server.url());
        let response = app
            .oneshot(post_json(
                "/functions/v1/generate-poetry",
                json!({"topic": "البحر", "type": "نبطي"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_to_string(response.into_body()).await;
        assert_eq!(body, json!({"poetry": "يا بحر"}).to_string());
        mock.assert_async().await;
    }

    /// Tests that a missing or unknown style uses the general template
    #[tokio::test]
    async fn it_falls_back_to_general_style() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_body(Matcher::PartialJson(json!({
                "messages": [
                    {"role": "system", "content": PoetryStyle::General.system_prompt()},
                    {"role": "user", "content": "اكتب قصيدة عن: القمر"}
                ]
            })))
            .with_status(200)
            .with_body(completion_body("يا قمر"))
            .expect(2)
            .create_async()
            .await;

        let app = test_app(&server.url());
        for body in [
            json!({"topic": "القمر"}),
            json!({"topic": "القمر", "type": "هايكو"}),
        ] {
            let response = app
                .clone()
                .oneshot(post_json("/functions/v1/generate-poetry", body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        mock.assert_async().await;
    }

    /// Tests that a poem needs a topic
    #[tokio::test]
    async fn it_requires_a_topic() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .expect(0)
            .create_async()
            .await;

        let app = test_app(&server.url());
        for body in [json!({}), json!({"topic": "  ", "type": "حر"})] {
            let response = app
                .clone()
                .oneshot(post_json("/functions/v1/generate-poetry", body))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let body = body_to_string(response.into_body()).await;
            assert_eq!(body, json!({"error": "الموضوع مطلوب"}).to_string());
        }

        mock.assert_async().await;
    }

    /// Tests that an empty completion is an error rather than an empty poem
    #[tokio::test]
    async fn it_fails_on_empty_completion() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(json!({"choices": []}).to_string())
            .create_async()
            .await;

        let app = test_app(&server.url());
        let response = app
            .oneshot(post_json(
                "/functions/v1/generate-poetry",
                json!({"topic": "الليل"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_to_string(response.into_body()).await;
        assert_eq!(body, json!({"error": "فشل في إنشاء الشعر"}).to_string());
    }

    /// Tests the mapping of upstream failures
    #[tokio::test]
    async fn it_maps_upstream_errors() {
        for (upstream, expected, message) in [
            (429, StatusCode::TOO_MANY_REQUESTS, "تم تجاوز حد الطلبات، يرجى المحاولة لاحقاً"),
            (402, StatusCode::PAYMENT_REQUIRED, "يرجى إضافة رصيد إلى حسابك"),
            (503, StatusCode::INTERNAL_SERVER_ERROR, "خطأ في إنشاء الشعر"),
        ] {
            let mut server = mockito::Server::new_async().await;
            let _mock = server
                .mock("POST", "/v1/chat/completions")
                .with_status(upstream)
                .create_async()
                .await;

            let app = test_app(&server.url());
            let response = app
                .oneshot(post_json(
                    "/functions/v1/generate-poetry",
                    json!({"topic": "الليل"}),
                ))
                .await
                .unwrap();

            assert_eq!(response.status(), expected);
            let body = body_to_string(response.into_body()).await;
            assert_eq!(body, json!({"error": message}).to_string());
        }
    }
}
