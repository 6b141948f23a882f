use super::{
    api::{
        ApiErrorResponse, Candidate, Content, GenerateContentConfig, GenerateContentParameters,
        GenerateContentResponse, GoogleSearch, PrebuiltVoiceConfig, SpeechConfig, ThinkingConfig,
        Tool, VoiceConfig,
    },
    prompts,
};
use crate::{
    client_utils, opentelemetry, DossierService, ResearchResult, ScriptMode, ServiceError,
    ServiceResult, Source, SpeechAudio,
};
use reqwest::{header::HeaderMap, Client};

const PROVIDER: &str = "google";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_SPEECH_MODEL: &str = "gemini-2.5-flash-preview-tts";
pub const DEFAULT_VOICE: &str = "Kore";
const SCRIPT_THINKING_BUDGET: i32 = 4000;
const FALLBACK_SOURCE_TITLE: &str = "Fonte Consultada";

pub struct GeminiService {
    api_key: String,
    base_url: String,
    text_model: String,
    speech_model: String,
    voice_name: String,
    client: Client,
}

#[derive(Clone, Default)]
pub struct GeminiServiceOptions {
    pub api_key: String,
    pub base_url: Option<String>,
    pub text_model: Option<String>,
    pub speech_model: Option<String>,
    pub voice_name: Option<String>,
    pub client: Option<Client>,
}

impl GeminiService {
    #[must_use]
    pub fn new(options: GeminiServiceOptions) -> Self {
        let GeminiServiceOptions {
            api_key,
            base_url,
            text_model,
            speech_model,
            voice_name,
            client,
        } = options;

        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Self {
            api_key,
            base_url,
            text_model: text_model.unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
            speech_model: speech_model.unwrap_or_else(|| DEFAULT_SPEECH_MODEL.to_string()),
            voice_name: voice_name.unwrap_or_else(|| DEFAULT_VOICE.to_string()),
            client: client.unwrap_or_else(Client::new),
        }
    }

    async fn generate_content(
        &self,
        params: &GenerateContentParameters,
    ) -> ServiceResult<Candidate> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, params.model, self.api_key
        );

        let response: GenerateContentResponse =
            client_utils::send_json(&self.client, &url, params, HeaderMap::new(), PROVIDER)
                .await
                .map_err(refine_google_error)?;

        if let Some(usage) = &response.usage_metadata {
            opentelemetry::record_usage(usage);
        }

        response
            .candidates
            .and_then(|c| c.into_iter().next())
            .ok_or_else(|| {
                ServiceError::Invariant(PROVIDER, "No candidate in response".to_string())
            })
    }
}

#[async_trait::async_trait]
impl DossierService for GeminiService {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    async fn research_subject(&self, subject: &str) -> ServiceResult<ResearchResult> {
        let params = GenerateContentParameters {
            model: self.text_model.clone(),
            contents: vec![Content::user_text(prompts::research_prompt(subject))],
            tools: Some(vec![Tool {
                google_search: Some(GoogleSearch {}),
            }]),
            generation_config: Some(GenerateContentConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(prompts::research_schema()),
                ..Default::default()
            }),
        };

        opentelemetry::trace_call(PROVIDER, &self.text_model, "research_subject", async {
            let candidate = self.generate_content(&params).await?;
            map_research_candidate(candidate)
        })
        .await
    }

    async fn generate_script(&self, subject: &str, mode: ScriptMode) -> ServiceResult<String> {
        let params = GenerateContentParameters {
            model: self.text_model.clone(),
            contents: vec![Content::user_text(prompts::script_prompt(subject, mode))],
            tools: None,
            generation_config: Some(GenerateContentConfig {
                thinking_config: Some(ThinkingConfig {
                    include_thoughts: None,
                    thinking_budget: Some(SCRIPT_THINKING_BUDGET),
                }),
                ..Default::default()
            }),
        };

        opentelemetry::trace_call(PROVIDER, &self.text_model, "generate_script", async {
            let candidate = self.generate_content(&params).await?;
            let text = candidate_text(&candidate);
            if text.trim().is_empty() {
                return Err(ServiceError::Invariant(
                    PROVIDER,
                    format!("Empty {mode} script in response"),
                ));
            }
            Ok(text)
        })
        .await
    }

    async fn generate_speech(&self, text: &str) -> ServiceResult<SpeechAudio> {
        let params = GenerateContentParameters {
            model: self.speech_model.clone(),
            contents: vec![Content::user_text(text)],
            tools: None,
            generation_config: Some(GenerateContentConfig {
                response_modalities: Some(vec!["AUDIO".to_string()]),
                speech_config: Some(SpeechConfig {
                    voice_config: Some(VoiceConfig {
                        prebuilt_voice_config: Some(PrebuiltVoiceConfig {
                            voice_name: Some(self.voice_name.clone()),
                        }),
                    }),
                }),
                ..Default::default()
            }),
        };

        opentelemetry::trace_call(PROVIDER, &self.speech_model, "generate_speech", async {
            let candidate = self.generate_content(&params).await?;
            map_speech_candidate(candidate)
        })
        .await
    }
}

/// Concatenated text of all non-thought parts.
fn candidate_text(candidate: &Candidate) -> String {
    candidate
        .content
        .as_ref()
        .and_then(|c| c.parts.as_ref())
        .map(|parts| {
            parts
                .iter()
                .filter(|part| part.thought != Some(true))
                .filter_map(|part| part.text.as_deref())
                .collect::<String>()
        })
        .unwrap_or_default()
}

/// Grounded responses sometimes wrap the JSON document in a Markdown fence.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn map_research_candidate(candidate: Candidate) -> ServiceResult<ResearchResult> {
    let text = candidate_text(&candidate);
    let mut research: ResearchResult =
        serde_json::from_str(strip_code_fence(&text)).map_err(|e| {
            ServiceError::Invariant(PROVIDER, format!("Failed to parse research document: {e}"))
        })?;

    research.sources = candidate
        .grounding_metadata
        .and_then(|m| m.grounding_chunks)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|chunk| chunk.web)
        .filter_map(|web| {
            let url = web.uri?;
            Some(Source {
                title: web
                    .title
                    .unwrap_or_else(|| FALLBACK_SOURCE_TITLE.to_string()),
                url,
            })
        })
        .collect();

    Ok(research)
}

fn map_speech_candidate(candidate: Candidate) -> ServiceResult<SpeechAudio> {
    candidate
        .content
        .and_then(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|part| part.inline_data)
        .find_map(|blob| {
            let data = blob.data.filter(|data| !data.is_empty())?;
            Some(SpeechAudio {
                data,
                mime_type: blob.mime_type,
            })
        })
        .ok_or_else(|| {
            ServiceError::Synthesis("speech response contained no audio payload".to_string())
        })
}

/// Use Google's structured error envelope to sharpen the HTTP status based
/// classification.
fn refine_google_error(error: ServiceError) -> ServiceError {
    let ServiceError::StatusCode(status, body) = error else {
        return error;
    };

    let Ok(envelope) = serde_json::from_str::<ApiErrorResponse>(&body) else {
        return ServiceError::StatusCode(status, body);
    };
    let api_error = envelope.error;

    let key_rejected = api_error
        .details
        .iter()
        .any(|detail| detail.reason.as_deref() == Some("API_KEY_INVALID"));
    if key_rejected {
        return ServiceError::Configuration(api_error.message);
    }

    match api_error.status.as_deref() {
        Some("INTERNAL" | "UNAVAILABLE") => {
            ServiceError::Transient(format!("{status}: {}", api_error.message))
        }
        _ if api_error.message.is_empty() => ServiceError::StatusCode(status, body),
        _ => ServiceError::StatusCode(status, api_error.message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn strips_json_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn api_key_invalid_becomes_configuration_error() {
        let body = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT","details":[{"@type":"type.googleapis.com/google.rpc.ErrorInfo","reason":"API_KEY_INVALID"}]}}"#;
        let error = refine_google_error(ServiceError::StatusCode(
            StatusCode::BAD_REQUEST,
            body.to_string(),
        ));
        assert!(matches!(error, ServiceError::Configuration(msg) if msg == "API key not valid."));
    }
}
