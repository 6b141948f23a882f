use crate::{google::api::UsageMetadata, ServiceError, ServiceResult};
use opentelemetry::trace::Status;
use std::{future::Future, time::Instant};
use tracing::{info_span, Span};
use tracing_futures::Instrument;
use tracing_opentelemetry::OpenTelemetrySpanExt;

pub struct ServiceSpan {
    span: Span,
    operation: &'static str,
    start_time: Instant,
}

impl ServiceSpan {
    pub fn new(provider: &str, model_id: &str, operation: &'static str) -> Self {
        let span = info_span!("dossier_sdk.call", operation);
        span.set_attribute("gen_ai.operation.name", "generate_content");
        span.set_attribute("gen_ai.provider.name", provider.to_string());
        span.set_attribute("gen_ai.request.model", model_id.to_string());
        span.set_attribute("dossier_sdk.operation", operation);

        Self {
            span,
            operation,
            start_time: Instant::now(),
        }
    }

    fn span(&self) -> Span {
        self.span.clone()
    }

    pub async fn instrument_future<F>(&self, future: F) -> F::Output
    where
        F: Future,
    {
        future.instrument(self.span()).await
    }

    pub fn on_error(&mut self, error: &ServiceError) {
        self.span
            .set_attribute("exception.message", error.to_string());
        self.span
            .set_attribute("error.type", format!("{:?}", error.kind()));
        self.span.set_status(Status::error(error.to_string()));
        tracing::debug!(parent: &self.span, operation = self.operation, %error, "service call failed");
    }

    pub fn on_end(&mut self) {
        self.span
            .set_attribute("dossier_sdk.duration_seconds", self.elapsed_seconds());
    }

    fn elapsed_seconds(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }
}

/// Attach token usage to the span of the call currently being traced.
pub fn record_usage(usage: &UsageMetadata) {
    let span = Span::current();
    if let Some(input) = usage.prompt_token_count {
        span.set_attribute("gen_ai.usage.input_tokens", i64::from(input));
    }
    if let Some(output) = usage.candidates_token_count {
        span.set_attribute("gen_ai.usage.output_tokens", i64::from(output));
    }
    if let Some(thoughts) = usage.thoughts_token_count {
        span.set_attribute("gen_ai.usage.reasoning_tokens", i64::from(thoughts));
    }
}

pub async fn trace_call<T, Fut>(
    provider: &str,
    model_id: &str,
    operation: &'static str,
    future: Fut,
) -> ServiceResult<T>
where
    Fut: Future<Output = ServiceResult<T>>,
{
    let mut span = ServiceSpan::new(provider, model_id, operation);
    let result = span.instrument_future(future).await;

    if let Err(error) = &result {
        span.on_error(error);
    }

    span.on_end();
    result
}
