//! JSON endpoints for the prompt flows.

use crate::flows::analyze_health_data::{AnalyzeHealthDataFlow, HealthDataAnalysis};
use crate::flows::analyze_report::{analyze_report, ReportAnalysis};
use crate::flows::app_guide_chat::{AppGuideChatFlow, AppGuideChatInput, ChatReply};
use crate::flows::extract_health_data::{
    ExtractHealthDataFlow, ExtractHealthDataInput, ExtractedHealthData,
};
use crate::flows::find_doctors::{DoctorSearch, FindDoctorsFlow, FindDoctorsInput};
use crate::flows::symptom_analysis::{SymptomAnalysis, SymptomAnalysisFlow, SymptomAnalysisInput};
use crate::flows::xray_analysis::{XrayAnalysisFlow, XrayAnalysisInput, XrayObservation};
use crate::flows::{Flow, FlowError};
use crate::startup::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use service_core::error::AppError;
use service_core::middleware::RequestId;

type JsonBody<T> = Result<Json<T>, JsonRejection>;

/// Unwrap a JSON body, turning extractor rejections into `AppError`s.
fn read_body<T>(payload: JsonBody<T>) -> Result<T, AppError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Err(AppError::PayloadTooLarge)
        }
        Err(rejection) => Err(AppError::BadRequest(anyhow::anyhow!(rejection.body_text()))),
    }
}

fn log_failure(flow: &str, request_id: &RequestId, err: &FlowError) {
    match err {
        FlowError::Validation(violations) => tracing::info!(
            request_id = %request_id,
            flow,
            violations = violations.len(),
            "Flow input rejected"
        ),
        other => tracing::error!(
            request_id = %request_id,
            flow,
            error = %other,
            "Flow failed"
        ),
    }
}

async fn run_flow<F: Flow>(
    state: &AppState,
    request_id: &RequestId,
    payload: JsonBody<F::Input>,
) -> Result<Json<F::Output>, AppError> {
    let input = read_body(payload)?;
    state.runner.run::<F>(&input).await.map(Json).map_err(|e| {
        log_failure(F::NAME, request_id, &e);
        e.into()
    })
}

pub async fn symptom_analysis(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: JsonBody<SymptomAnalysisInput>,
) -> Result<Json<SymptomAnalysis>, AppError> {
    run_flow::<SymptomAnalysisFlow>(&state, &request_id, payload).await
}

pub async fn extract_health_data(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: JsonBody<ExtractHealthDataInput>,
) -> Result<Json<ExtractedHealthData>, AppError> {
    run_flow::<ExtractHealthDataFlow>(&state, &request_id, payload).await
}

pub async fn analyze_health_data(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: JsonBody<ExtractedHealthData>,
) -> Result<Json<HealthDataAnalysis>, AppError> {
    run_flow::<AnalyzeHealthDataFlow>(&state, &request_id, payload).await
}

pub async fn xray_analysis(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: JsonBody<XrayAnalysisInput>,
) -> Result<Json<XrayObservation>, AppError> {
    run_flow::<XrayAnalysisFlow>(&state, &request_id, payload).await
}

pub async fn find_doctors(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: JsonBody<FindDoctorsInput>,
) -> Result<Json<DoctorSearch>, AppError> {
    run_flow::<FindDoctorsFlow>(&state, &request_id, payload).await
}

pub async fn app_guide_chat(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: JsonBody<AppGuideChatInput>,
) -> Result<Json<ChatReply>, AppError> {
    run_flow::<AppGuideChatFlow>(&state, &request_id, payload).await
}

/// Extraction then analysis, as one request.
pub async fn analyze_report_handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: JsonBody<ExtractHealthDataInput>,
) -> Result<Json<ReportAnalysis>, AppError> {
    let input = read_body(payload)?;
    analyze_report(&state.runner, &input)
        .await
        .map(Json)
        .map_err(|e| {
            log_failure("analyze_report", &request_id, &e);
            e.into()
        })
}
