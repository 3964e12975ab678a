//! Integration tests for the chatbot library.
//! The live tests require GOOGLE_API_KEY in the environment to run.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chatbot::chat::{ChatConfig, ChatTurn, Outcome, SessionController, Status};
    use chatbot::{API_KEY_ENV, CompletionGateway, Error, Gemini, GenerateContentRequest, Model};

    struct UppercaseGateway;

    #[async_trait::async_trait]
    impl CompletionGateway for UppercaseGateway {
        async fn complete(&self, prompt: &str) -> chatbot::Result<String> {
            if prompt == "fail" {
                return Err(Error::service_unavailable("try later", None));
            }
            Ok(prompt.to_uppercase())
        }
    }

    #[tokio::test]
    async fn controller_over_a_custom_gateway() {
        let gateway: Arc<dyn CompletionGateway> = Arc::new(UppercaseGateway);
        let controller = SessionController::new(gateway);

        let outcome = controller.submit("hello").await.unwrap();
        assert_eq!(outcome.display_text(), "HELLO");

        let outcome = controller.submit("fail").await.unwrap();
        assert!(matches!(outcome, Outcome::Failed { .. }));
        assert_eq!(controller.status(), Status::Error);

        let view = controller.view();
        assert_eq!(
            view.history,
            vec![ChatTurn::user("hello"), ChatTurn::assistant("HELLO")]
        );

        controller.clear();
        assert!(controller.view().history.is_empty());
    }

    #[test]
    fn missing_credential_is_a_configuration_error() {
        if std::env::var(API_KEY_ENV).is_ok() {
            eprintln!("Skipping test: {API_KEY_ENV} is set");
            return;
        }
        let err = Gemini::new(None).unwrap_err();
        assert!(err.is_configuration());
        let err = ChatConfig::new().gateway(None).unwrap_err();
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn test_simple_generate_content() {
        let api_key = std::env::var(API_KEY_ENV).ok();
        if api_key.is_none() {
            eprintln!("Skipping test: {API_KEY_ENV} not set");
            return;
        }

        let client = Gemini::new(api_key).expect("Failed to create client");
        let request = GenerateContentRequest::from_prompt("Say 'test passed'");
        let response = client
            .generate_content(&Model::from("gemini-1.5-flash"), &request)
            .await;
        assert!(
            response.is_ok(),
            "Request should succeed with valid API key"
        );
    }

    #[tokio::test]
    async fn test_live_session() {
        let api_key = std::env::var(API_KEY_ENV).ok();
        if api_key.is_none() {
            eprintln!("Skipping test: {API_KEY_ENV} not set");
            return;
        }

        let gateway = ChatConfig::new()
            .with_model(Model::from("gemini-1.5-flash"))
            .gateway(api_key)
            .expect("Failed to build gateway");
        let controller = SessionController::new(Arc::new(gateway));
        let outcome = controller.submit("Count to 3").await.unwrap();
        assert!(outcome.is_committed(), "unexpected outcome: {outcome:?}");
        assert_eq!(controller.turn_count(), 2);
    }
}
