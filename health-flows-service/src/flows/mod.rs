//! Prompt flows.
//!
//! A flow is one schema-typed request/response unit around a single model
//! call: validate the input, render the prompt, call the model, repair the
//! reply. [`FlowRunner`] drives that sequence for any [`Flow`].

pub mod analyze_health_data;
pub mod analyze_report;
pub mod app_guide_chat;
pub mod data_uri;
pub mod extract_health_data;
pub mod find_doctors;
pub mod prompt;
pub mod sanitize;
pub mod schema;
pub mod symptom_analysis;
pub mod xray_analysis;

use crate::services::metrics;
use crate::services::providers::{
    GenerationParams, MediaPart, ModelRequest, ProviderError, TextProvider,
};
use prompt::PromptRenderer;
use sanitize::Repairs;
use serde::{de::DeserializeOwned, Serialize};
use service_core::error::{field_violations, AppError, FieldViolation};
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Instant;
use tera::Context;
use thiserror::Error;
use tracing::Instrument;
use validator::{Validate, ValidationError};

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Invalid input: {} field(s) rejected", .0.len())]
    Validation(Vec<FieldViolation>),

    /// Nothing usable came back. The message is user-facing.
    #[error("{0}")]
    Generation(String),

    #[error(transparent)]
    Provider(ProviderError),

    #[error("Prompt rendering failed: {0}")]
    Template(#[from] tera::Error),
}

impl FlowError {
    /// Outcome label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            FlowError::Validation(_) => "validation_error",
            FlowError::Generation(_) => "generation_error",
            FlowError::Provider(e) => e.kind(),
            FlowError::Template(_) => "template_error",
        }
    }
}

impl From<FlowError> for AppError {
    fn from(err: FlowError) -> Self {
        match err {
            FlowError::Validation(violations) => AppError::InvalidFields(violations),
            FlowError::Generation(message) => AppError::GenerationFailed(message),
            FlowError::Provider(ProviderError::RateLimited) => AppError::TooManyRequests(
                "The AI service is busy right now. Please try again shortly.".to_string(),
                None,
            ),
            FlowError::Provider(ProviderError::NotConfigured(_)) => AppError::ServiceUnavailable,
            FlowError::Provider(_) => {
                AppError::GenerationFailed("AI failed to generate a response.".to_string())
            }
            FlowError::Template(e) => AppError::InternalError(anyhow::Error::new(e)),
        }
    }
}

/// One prompt flow: its contract, prompt and repair policy.
pub trait Flow {
    /// Flow name. Also the prompt template name and the metrics label.
    const NAME: &'static str;

    /// User-facing message when the model produced nothing usable.
    const FAILURE_MESSAGE: &'static str = "AI failed to generate a response.";

    type Input: Validate + Serialize + Sync;

    /// The reply as the model sent it. Every field is optional.
    type Raw: DeserializeOwned;

    type Output: Serialize;

    /// Schema the model is asked to follow.
    fn output_schema() -> serde_json::Value;

    /// Template context. Defaults to the input's serialized fields.
    fn prompt_context(input: &Self::Input) -> Result<Context, tera::Error> {
        Context::from_serialize(input)
    }

    /// Files sent inline with the prompt.
    fn media(_input: &Self::Input) -> Result<Vec<MediaPart>, FlowError> {
        Ok(Vec::new())
    }

    /// Enforce the flow's output invariants on a parsed reply.
    fn sanitize(input: &Self::Input, raw: Self::Raw, repairs: &mut Repairs) -> Self::Output;

    /// Reply was empty or unparseable.
    fn on_empty(_input: &Self::Input, _repairs: &mut Repairs) -> Result<Self::Output, FlowError> {
        Err(FlowError::Generation(Self::FAILURE_MESSAGE.to_string()))
    }

    /// Model call failed. Throttling and missing configuration keep their
    /// identity; anything else is a generation failure.
    fn on_provider_error(
        _input: &Self::Input,
        err: ProviderError,
        _repairs: &mut Repairs,
    ) -> Result<Self::Output, FlowError> {
        match err {
            ProviderError::RateLimited | ProviderError::NotConfigured(_) => {
                Err(FlowError::Provider(err))
            }
            _ => Err(FlowError::Generation(Self::FAILURE_MESSAGE.to_string())),
        }
    }
}

/// Runs flows against a provider. Cheap to clone.
#[derive(Clone)]
pub struct FlowRunner {
    provider: Arc<dyn TextProvider>,
    renderer: Arc<PromptRenderer>,
    temperature: Option<f32>,
}

impl FlowRunner {
    pub fn new(provider: Arc<dyn TextProvider>, renderer: Arc<PromptRenderer>) -> Self {
        Self {
            provider,
            renderer,
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn provider(&self) -> &Arc<dyn TextProvider> {
        &self.provider
    }

    /// Validate, prompt, call the model and sanitize the reply.
    pub async fn run<F: Flow>(&self, input: &F::Input) -> Result<F::Output, FlowError> {
        let started = Instant::now();
        let span = tracing::info_span!(
            "flow",
            flow = F::NAME,
            provider = self.provider.name(),
            outcome = tracing::field::Empty,
        );

        let result = self.execute::<F>(input).instrument(span.clone()).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.kind(),
        };
        span.record("outcome", outcome);
        metrics::record_flow(F::NAME, outcome, started.elapsed().as_secs_f64());

        result
    }

    async fn execute<F: Flow>(&self, input: &F::Input) -> Result<F::Output, FlowError> {
        if let Err(errors) = input.validate() {
            let violations = field_violations(&errors);
            tracing::info!(violations = violations.len(), "Flow input rejected");
            return Err(FlowError::Validation(violations));
        }

        let context = F::prompt_context(input)?;
        let prompt = self.renderer.render(F::NAME, &context)?;
        let media = F::media(input)?;

        let request = ModelRequest {
            prompt,
            media,
            params: GenerationParams {
                temperature: self.temperature,
                output_schema: Some(F::output_schema()),
                ..Default::default()
            },
        };

        tracing::debug!(
            prompt_len = request.prompt.len(),
            media_count = request.media.len(),
            "Calling model"
        );

        let provider_name = self.provider.name();
        let model = self.provider.model().to_string();
        let call_started = Instant::now();
        let response = self.provider.generate(&request).await;
        metrics::record_provider_latency(
            provider_name,
            &model,
            call_started.elapsed().as_secs_f64(),
        );

        let mut repairs = Repairs::default();
        let output = match response {
            Ok(response) => {
                metrics::record_tokens(&model, response.input_tokens, response.output_tokens);
                tracing::debug!(
                    input_tokens = response.input_tokens,
                    output_tokens = response.output_tokens,
                    finish_reason = response.finish_reason.as_str(),
                    "Model replied"
                );

                match parse_reply::<F::Raw>(response.text.as_deref()) {
                    Some(raw) => F::sanitize(input, raw, &mut repairs),
                    None => {
                        tracing::warn!("Model returned nothing parseable");
                        F::on_empty(input, &mut repairs)?
                    }
                }
            }
            Err(err) => {
                metrics::record_provider_error(provider_name, err.kind());
                tracing::warn!(error = %err, "Model call failed");
                F::on_provider_error(input, err, &mut repairs)?
            }
        };

        if !repairs.is_empty() {
            for repair in repairs.applied() {
                metrics::record_repair(F::NAME, repair);
            }
            tracing::info!(repairs = ?repairs.applied(), "Sanitizer repaired model output");
        }

        Ok(output)
    }
}

/// `validator` hook rejecting whitespace-only text.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some(Cow::Borrowed("This field cannot be empty."));
        return Err(err);
    }
    Ok(())
}

/// Parse a model reply as `T`.
///
/// Markdown code fences around the JSON are tolerated. Blank text, or text
/// that is not a JSON object of the right shape, yields `None`.
pub fn parse_reply<T: DeserializeOwned>(text: Option<&str>) -> Option<T> {
    let text = strip_code_fence(text?.trim());
    if text.is_empty() {
        return None;
    }
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    if !value.is_object() {
        return None;
    }
    serde_json::from_value(value).ok()
}

fn strip_code_fence(text: &str) -> &str {
    let Some(body) = text.strip_prefix("```") else {
        return text;
    };
    let body = body.strip_suffix("```").unwrap_or(body);
    // Drop an info string such as `json` on the opening fence line.
    match body.split_once('\n') {
        Some((info, rest)) if !info.trim_start().starts_with('{') => rest.trim(),
        _ => body.trim(),
    }
}
