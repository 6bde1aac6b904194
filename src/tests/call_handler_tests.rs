//! tests/call_handler_tests.rs
//! Rutas HTTP completas con el gateway mock y almacenamiento en memoria.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_rt::test;
    use actix_web::http::StatusCode;
    use actix_web::{test as atest, web, App};
    use serde_json::{json, Value};

    use crate::app;
    use crate::config::app_config::ElevenLabsConfig;
    use crate::services::call_service::CallService;
    use crate::services::classifier_service::OutcomeClassifier;
    use crate::services::company_service::CompanyService;
    use crate::services::dispatch_service::MeetingDispatch;
    use crate::services::monitor_service::CallMonitor;
    use crate::services::record_store::InMemoryStore;
    use crate::services::voice_service::{ElevenLabsGateway, MockGateway, VoiceGateway};
    use crate::tests::support::{
        fast_monitor_config, sample_company, FakeBooker, FakeMailer, RecordingNotifier,
    };

    fn service_with(gateway: Arc<dyn VoiceGateway>, dispatch: Option<MeetingDispatch>) -> CallService {
        let monitor = CallMonitor::new(
            Arc::new(MockGateway),
            Arc::new(RecordingNotifier::default()),
            OutcomeClassifier::default(),
            None,
            fast_monitor_config(2),
        );
        CallService::new(
            gateway,
            monitor,
            OutcomeClassifier::default(),
            CompanyService::new(Arc::new(InMemoryStore::new())),
            dispatch,
        )
    }

    fn mock_service() -> CallService {
        service_with(Arc::new(MockGateway), None)
    }

    macro_rules! init_app {
        ($service:expr) => {
            atest::init_service(
                App::new()
                    .app_data(web::Data::new($service))
                    .configure(app::init_app),
            )
            .await
        };
    }

    #[test]
    async fn health_check_reports_running() {
        let srv = init_app!(mock_service());
        let req = atest::TestRequest::get().uri("/").to_request();
        let body: Value = atest::call_and_read_body_json(&srv, req).await;
        assert_eq!(body["status"], "AI running");
    }

    #[test]
    async fn analyze_returns_classification() {
        let srv = init_app!(mock_service());
        let req = atest::TestRequest::post()
            .uri("/api/analyze")
            .set_json(json!({ "transcript": "No thanks, please remove me, unsubscribe" }))
            .to_request();
        let body: Value = atest::call_and_read_body_json(&srv, req).await;
        assert_eq!(body["outcome"], "not_interested");
        assert_eq!(body["qualified"], false);
        assert_eq!(body["action"], "blocklist");
    }

    #[test]
    async fn make_call_with_mock_provider() {
        let srv = init_app!(mock_service());
        let req = atest::TestRequest::post()
            .uri("/api/call")
            .set_json(json!({
                "phone": "+1 555 123 9876",
                "name": "Ana",
                "company": "Acme",
                "context": { "contactId": 5, "campaignId": 3 }
            }))
            .to_request();
        let resp = atest::call_service(&srv, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = atest::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["call_id"], "MOCK_9876");
    }

    #[test]
    async fn make_call_without_credentials_is_structured_error() {
        let gateway = ElevenLabsGateway::new(ElevenLabsConfig::default(), reqwest::Client::new());
        let srv = init_app!(service_with(Arc::new(gateway), None));
        let req = atest::TestRequest::post()
            .uri("/api/call")
            .set_json(json!({ "phone": "+15551234567", "name": "Ana", "company": "Acme" }))
            .to_request();
        let resp = atest::call_service(&srv, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = atest::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Missing credentials: ELEVENLABS_API_KEY");
    }

    #[test]
    async fn transcript_comes_from_gateway() {
        let srv = init_app!(mock_service());
        let req = atest::TestRequest::get()
            .uri("/api/transcript/MOCK_1234")
            .to_request();
        let body: Value = atest::call_and_read_body_json(&srv, req).await;
        assert_eq!(body["call_id"], "MOCK_1234");
        assert_eq!(body["status"], "completed");
        assert_eq!(body["has_recording"], true);
    }

    #[test]
    async fn company_create_then_get() {
        let srv = init_app!(mock_service());
        let req = atest::TestRequest::post()
            .uri("/api/company")
            .set_json(sample_company())
            .to_request();
        let resp = atest::call_service(&srv, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = atest::read_body_json(resp).await;
        let company_id = body["company_id"].as_str().unwrap().to_string();

        let req = atest::TestRequest::get()
            .uri(&format!("/api/company/{}", company_id))
            .to_request();
        let body: Value = atest::call_and_read_body_json(&srv, req).await;
        assert_eq!(body["company_name"], "Globex");

        let req = atest::TestRequest::get()
            .uri("/api/company/does-not-exist")
            .to_request();
        let resp = atest::call_service(&srv, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    macro_rules! create_company {
        ($srv:expr) => {{
            let req = atest::TestRequest::post()
                .uri("/api/company")
                .set_json(sample_company())
                .to_request();
            let body: Value = atest::call_and_read_body_json($srv, req).await;
            body["company_id"].as_str().unwrap().to_string()
        }};
    }

    #[test]
    async fn complete_call_unknown_company_is_404() {
        let srv = init_app!(mock_service());
        let req = atest::TestRequest::post()
            .uri("/api/call/complete")
            .set_json(json!({
                "company_id": "nope",
                "transcript": "Yes, book it",
                "outcome": "interested"
            }))
            .to_request();
        let resp = atest::call_service(&srv, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = atest::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Company not found");
    }

    #[test]
    async fn complete_call_books_meeting_for_interested_client() {
        let dispatch = MeetingDispatch::new(
            Arc::new(FakeBooker { fail: false }),
            Arc::new(FakeMailer::default()),
        );
        let srv = init_app!(service_with(Arc::new(MockGateway), Some(dispatch)));
        let company_id = create_company!(&srv);

        let req = atest::TestRequest::post()
            .uri("/api/call/complete")
            .set_json(json!({
                "company_id": company_id,
                "transcript": "Yes, book the demo",
                "outcome": "Interested_Demo",
                "client_data": {
                    "name": "Ana Torres",
                    "phone_number": "+15551234567",
                    "email": "ana@example.com",
                    "company_name": "Acme"
                }
            }))
            .to_request();
        let body: Value = atest::call_and_read_body_json(&srv, req).await;
        assert_eq!(body["meeting_booked"], true);
        assert_eq!(body["meeting_link"], "https://meet.example.com/abc-defg");
        assert_eq!(body["email_sent"], true);
        assert_eq!(body["outcome"], "Interested_Demo");
    }

    #[test]
    async fn complete_call_without_booking_outcome_skips_meeting() {
        let dispatch = MeetingDispatch::new(
            Arc::new(FakeBooker { fail: false }),
            Arc::new(FakeMailer::default()),
        );
        let srv = init_app!(service_with(Arc::new(MockGateway), Some(dispatch)));
        let company_id = create_company!(&srv);

        let req = atest::TestRequest::post()
            .uri("/api/call/complete")
            .set_json(json!({
                "company_id": company_id,
                "transcript": "Not now, thanks",
                "outcome": "not_interested"
            }))
            .to_request();
        let body: Value = atest::call_and_read_body_json(&srv, req).await;
        assert_eq!(body["meeting_booked"], false);
        assert!(body["meeting_link"].is_null());
        assert_eq!(body["email_sent"], false);
    }

    #[test]
    async fn email_reply_positive_triggers_call() {
        let srv = init_app!(mock_service());
        let company_id = create_company!(&srv);

        let client = json!({
            "name": "Ana Torres",
            "phone_number": "+1 555 000 4321",
            "email": "ana@example.com",
            "company_name": "Acme"
        });

        let req = atest::TestRequest::post()
            .uri("/api/email/reply")
            .set_json(json!({
                "company_id": company_id,
                "client_data": client,
                "reply_status": "Positive"
            }))
            .to_request();
        let body: Value = atest::call_and_read_body_json(&srv, req).await;
        assert_eq!(body["call_triggered"], true);
        assert_eq!(body["call_id"], "MOCK_4321");

        let req = atest::TestRequest::post()
            .uri("/api/email/reply")
            .set_json(json!({
                "company_id": company_id,
                "client_data": client,
                "reply_status": "negative"
            }))
            .to_request();
        let body: Value = atest::call_and_read_body_json(&srv, req).await;
        assert_eq!(body["call_triggered"], false);
        assert!(body["call_id"].is_null());
    }
}
