mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{TestApp, PDF_DATA_URI, PNG_DATA_URI, TEST_BODY_LIMIT};
use health_flows_service::flows::sanitize::{
    CHATBOT_APOLOGY, HEALTH_ANALYSIS_DISCLAIMER, SIMULATED_DOCTOR_PHONE, XRAY_DISCLAIMER,
};
use health_flows_service::services::providers::mock::{MockFailure, MockReply};
use serde_json::json;
use tower::ServiceExt;

const SYMPTOMS_PATH: &str = "/api/v1/flows/symptom-analysis";

fn symptom_reply(macros: serde_json::Value) -> MockReply {
    MockReply::json(json!({
        "possibleConditions": "Tension headache or dehydration",
        "suggestedSpecialists": ["Neurologist", "General Practitioner"],
        "triageLevel": "Schedule Appointment",
        "riskScore": "Low",
        "nextSteps": "Drink water and book a visit with your doctor.",
        "conceptualMacroBreakdown": macros
    }))
}

#[tokio::test]
async fn symptom_analysis_returns_structured_triage() {
    let app = TestApp::with_replies([symptom_reply(
        json!({ "carbs": 40, "protein": 40, "fats": 20 }),
    )]);

    let (status, body) = app
        .post_json(
            SYMPTOMS_PATH,
            json!({ "symptoms": "Throbbing headache for two days, worse in the evening" }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["triageLevel"], "Schedule Appointment");
    assert_eq!(body["riskScore"], "Low");
    assert_eq!(
        body["suggestedSpecialists"],
        json!(["Neurologist", "General Practitioner"])
    );
    assert_eq!(
        body["conceptualMacroBreakdown"],
        json!({ "carbs": 40.0, "protein": 40.0, "fats": 20.0 })
    );

    let requests = app.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].prompt.contains("Throbbing headache for two days"));
    assert!(requests[0].params.output_schema.is_some());
}

#[tokio::test]
async fn macro_split_not_summing_to_100_is_omitted() {
    let app = TestApp::with_replies([symptom_reply(
        json!({ "carbs": 40, "protein": 40, "fats": 30 }),
    )]);

    let (status, body) = app
        .post_json(SYMPTOMS_PATH, json!({ "symptoms": "Tired all the time and thirsty" }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.get("conceptualMacroBreakdown").is_none());
}

#[tokio::test]
async fn joined_specialists_become_a_list() {
    let app = TestApp::with_replies([MockReply::json(json!({
        "possibleConditions": "Possible migraine",
        "suggestedSpecialists": "Neurologist, Ophthalmologist",
        "triageLevel": "Self-Care Possible",
        "riskScore": "Low",
        "nextSteps": "Rest in a dark room."
    }))]);

    let (status, body) = app
        .post_json(SYMPTOMS_PATH, json!({ "symptoms": "Headache with flashing lights" }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["suggestedSpecialists"],
        json!(["Neurologist", "Ophthalmologist"])
    );
}

#[tokio::test]
async fn short_symptoms_are_rejected_without_calling_the_model() {
    let app = TestApp::with_replies([]);

    let (status, body) = app
        .post_json(SYMPTOMS_PATH, json!({ "symptoms": "ouch" }))
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["violations"][0]["field"], "symptoms");
    assert!(app.requests().is_empty());
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = TestApp::with_replies([]);

    let (status, _) = app
        .post_raw(SYMPTOMS_PATH, "{\"symptoms\": ".to_string())
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.requests().is_empty());
}

#[tokio::test]
async fn unparseable_reply_is_a_generation_failure() {
    let app = TestApp::with_replies([MockReply::Text("I am not JSON".to_string())]);

    let (status, body) = app
        .post_json(SYMPTOMS_PATH, json!({ "symptoms": "Sharp pain in the lower back" }))
        .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "AI failed to generate a response.");
}

#[tokio::test]
async fn provider_rate_limit_is_surfaced_as_429() {
    let app = TestApp::with_replies([MockReply::Fail(MockFailure::RateLimited)]);

    let (status, _) = app
        .post_json(SYMPTOMS_PATH, json!({ "symptoms": "Persistent dry cough at night" }))
        .await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn provider_network_failure_is_a_generation_failure() {
    let app = TestApp::with_replies([MockReply::Fail(MockFailure::Network)]);

    let (status, body) = app
        .post_json(SYMPTOMS_PATH, json!({ "symptoms": "Persistent dry cough at night" }))
        .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "AI failed to generate a response.");
}

#[tokio::test]
async fn extraction_sends_the_document_inline() {
    let app = TestApp::with_replies([MockReply::json(json!({
        "vitalSigns": { "heartRate": 72, "bloodPressureSystolic": "120" },
        "symptoms": "Occasional dizziness"
    }))]);

    let (status, body) = app
        .post_json(
            "/api/v1/flows/extract-health-data",
            json!({ "documentDataUri": PDF_DATA_URI }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["vitalSigns"]["heartRate"], "72");
    assert_eq!(body["medications"], json!([]));

    let requests = app.requests();
    assert_eq!(requests[0].media.len(), 1);
    assert_eq!(requests[0].media[0].mime_type, "application/pdf");
    assert_eq!(requests[0].media[0].data, "JVBERi0xLjQKJcfs");
}

#[tokio::test]
async fn unsupported_document_type_is_rejected() {
    let app = TestApp::with_replies([]);

    let (status, body) = app
        .post_json(
            "/api/v1/flows/extract-health-data",
            json!({ "documentDataUri": "data:text/plain;base64,aGVsbG8=" }),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["violations"][0]["field"], "documentDataUri");
    assert!(app.requests().is_empty());
}

#[tokio::test]
async fn nested_violations_are_reported_with_wire_names() {
    let app = TestApp::with_replies([]);

    let (status, body) = app
        .post_json(
            "/api/v1/flows/analyze-health-data",
            json!({
                "vitalSigns": { "heartRate": "9".repeat(1001) },
                "medications": [{ "name": "Aspirin" }, { "dosage": "x".repeat(1001) }]
            }),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields: Vec<&str> = body["violations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["medications[1].dosage", "vitalSigns.heartRate"]);
    assert!(app.requests().is_empty());
}

#[tokio::test]
async fn doctor_search_violations_name_the_sent_keys() {
    let app = TestApp::with_replies([]);

    let (status, body) = app
        .post_json(
            "/api/v1/flows/find-doctors",
            json!({ "indianState": "  ", "symptomOrSpecialty": "GP" }),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields: Vec<&str> = body["violations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"indianState"));
    assert!(fields.contains(&"symptomOrSpecialty"));
    assert!(app.requests().is_empty());
}

#[tokio::test]
async fn analysis_always_carries_the_canonical_disclaimer() {
    let app = TestApp::with_replies([MockReply::json(json!({
        "reportSummary": "Vitals are within normal ranges.",
        "healthRecommendations": "Keep up regular exercise.",
        "disclaimer": "Not medical advice."
    }))]);

    let (status, body) = app
        .post_json(
            "/api/v1/flows/analyze-health-data",
            json!({ "vitalSigns": { "heartRate": "72" }, "medications": [] }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["disclaimer"], HEALTH_ANALYSIS_DISCLAIMER);
    assert!(app.requests()[0].prompt.contains("72"));
}

#[tokio::test]
async fn report_pipeline_feeds_extraction_into_analysis() {
    let app = TestApp::with_replies([
        MockReply::json(json!({
            "vitalSigns": { "heartRate": "88" },
            "medications": [{ "name": "Metformin", "dosage": "500mg" }]
        })),
        MockReply::json(json!({
            "reportSummary": "Slightly elevated heart rate.",
            "healthRecommendations": "Discuss your heart rate with your doctor.",
            "conceptualMacroBreakdown": { "carbs": 50, "protein": 25, "fats": 25 }
        })),
    ]);

    let (status, body) = app
        .post_json(
            "/api/v1/flows/analyze-report",
            json!({ "documentDataUri": PNG_DATA_URI }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["extracted"]["medications"][0]["name"], "Metformin");
    assert_eq!(body["analysis"]["disclaimer"], HEALTH_ANALYSIS_DISCLAIMER);
    assert_eq!(body["analysis"]["conceptualMacroBreakdown"]["carbs"], 50.0);

    let requests = app.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[1].media.is_empty());
    assert!(requests[1].prompt.contains("Metformin"));
}

#[tokio::test]
async fn report_pipeline_stops_when_extraction_fails() {
    let app = TestApp::with_replies([MockReply::Empty]);

    let (status, body) = app
        .post_json(
            "/api/v1/flows/analyze-report",
            json!({ "documentDataUri": PDF_DATA_URI }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        body["error"],
        "AI failed to extract health data from the document."
    );
    assert_eq!(app.requests().len(), 1);
}

#[tokio::test]
async fn xray_observations_carry_the_xray_disclaimer() {
    let app = TestApp::with_replies([MockReply::json(json!({
        "aiObservations": "The image shows a chest X-ray with clear lung fields.",
        "potentialDiscussionPoints": "Ask whether a follow-up image is needed."
    }))]);

    let (status, body) = app
        .post_json(
            "/api/v1/flows/xray-analysis",
            json!({ "xrayImageDataUri": PNG_DATA_URI }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["disclaimer"], XRAY_DISCLAIMER);
    assert_eq!(app.requests()[0].media[0].mime_type, "image/png");
}

#[tokio::test]
async fn empty_xray_reply_is_a_generation_failure() {
    let app = TestApp::with_replies([MockReply::Empty]);

    let (status, body) = app
        .post_json(
            "/api/v1/flows/xray-analysis",
            json!({ "xrayImageDataUri": PNG_DATA_URI }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        body["error"],
        "AI failed to generate observations for the X-ray image."
    );
}

#[tokio::test]
async fn doctor_search_with_no_profiles_returns_the_fallback() {
    let app = TestApp::with_replies([MockReply::json(json!({ "doctors": [] }))]);

    let (status, body) = app
        .post_json(
            "/api/v1/flows/find-doctors",
            json!({ "indianState": "Kerala", "symptomOrSpecialty": "Cardiologist" }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let doctors = body["doctors"].as_array().unwrap();
    assert_eq!(doctors.len(), 1);
    assert_eq!(doctors[0]["id"], "fallback-doc-1");
    assert_eq!(doctors[0]["specialty"], "Cardiologist");
    assert_eq!(doctors[0]["address"], "Central Clinic, A City, Kerala");
    assert_eq!(doctors[0]["phoneNumber"], SIMULATED_DOCTOR_PHONE);
}

#[tokio::test]
async fn doctor_profiles_get_the_booking_number_and_are_capped() {
    let profile = |name: &str| {
        json!({
            "id": "doc-1",
            "name": name,
            "specialty": "Cardiologist",
            "address": "MG Road, Kochi, Kerala",
            "phoneNumber": "+91 99999 00000"
        })
    };
    let app = TestApp::with_replies([MockReply::json(json!({
        "doctors": [profile("Dr. A"), profile("Dr. B"), profile("Dr. C"), profile("Dr. D")]
    }))]);

    let (status, body) = app
        .post_json(
            "/api/v1/flows/find-doctors",
            json!({ "indianState": "Kerala", "symptomOrSpecialty": "chest pain" }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let doctors = body["doctors"].as_array().unwrap();
    assert_eq!(doctors.len(), 3);

    let mut ids: Vec<&str> = doctors.iter().map(|d| d["id"].as_str().unwrap()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 3);

    for doctor in doctors {
        assert_eq!(doctor["phoneNumber"], SIMULATED_DOCTOR_PHONE);
    }
}

#[tokio::test]
async fn doctor_search_falls_back_on_an_empty_reply() {
    let app = TestApp::with_replies([MockReply::Empty]);

    let (status, body) = app
        .post_json(
            "/api/v1/flows/find-doctors",
            json!({ "indianState": "Goa", "symptomOrSpecialty": "my child has a fever" }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["doctors"][0]["specialty"], "Pediatrician");
}

#[tokio::test]
async fn chatbot_answers_from_the_model() {
    let app = TestApp::with_replies([MockReply::json(json!({
        "botResponse": "Open the Symptom Checker from the home screen."
    }))]);

    let (status, body) = app
        .post_json(
            "/api/v1/flows/app-guide-chat",
            json!({ "userQuery": "How do I check my symptoms?" }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["botResponse"],
        "Open the Symptom Checker from the home screen."
    );
}

#[tokio::test]
async fn chatbot_apologizes_instead_of_failing() {
    for reply in [
        MockReply::Text("not json at all".to_string()),
        MockReply::Empty,
        MockReply::Fail(MockFailure::Api),
    ] {
        let app = TestApp::with_replies([reply]);

        let (status, body) = app
            .post_json(
                "/api/v1/flows/app-guide-chat",
                json!({ "userQuery": "Where are my reports?" }),
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["botResponse"], CHATBOT_APOLOGY);
    }
}

#[tokio::test]
async fn oversized_upload_is_rejected_with_413() {
    let app = TestApp::with_replies([]);
    let payload = "A".repeat(TEST_BODY_LIMIT + 1);
    let uri = format!("data:image/png;base64,{}", payload);

    let (status, body) = app
        .post_json(
            "/api/v1/flows/xray-analysis",
            json!({ "xrayImageDataUri": uri }),
        )
        .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"], "The uploaded content is too large");
    assert!(app.requests().is_empty());
}

#[tokio::test]
async fn request_id_is_echoed_on_flow_responses() {
    let app = TestApp::with_replies([]);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/flows/app-guide-chat")
                .header("content-type", "application/json")
                .header("x-request-id", "req-42")
                .body(Body::from(json!({ "userQuery": "hello" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("x-request-id").unwrap(), "req-42");
}
