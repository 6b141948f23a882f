use crate::ServiceResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A person or channel worth watching on the subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ReferencePerson {
    pub name: String,
    pub relevance: String,
    pub video_title: String,
    pub video_url: String,
}

/// A web page consulted by the search grounding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct Source {
    pub title: String,
    pub url: String,
}

/// The research document for one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ResearchResult {
    pub summary: String,
    pub history: String,
    pub future_vision: String,
    pub business_opportunities: String,
    pub facts: Vec<String>,
    pub global_references: Vec<ReferencePerson>,
    pub brazilian_references: Vec<ReferencePerson>,
    #[serde(default)]
    pub sources: Vec<Source>,
}

/// Length of a narration script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub enum ScriptMode {
    /// A two to three minute pocket episode.
    #[serde(rename = "resumido")]
    Short,
    /// A long form masterclass.
    #[serde(rename = "completo")]
    Long,
}

impl ScriptMode {
    pub const ALL: [Self; 2] = [Self::Short, Self::Long];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Short => "resumido",
            Self::Long => "completo",
        }
    }
}

impl fmt::Display for ScriptMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw speech returned by the provider: base64 encoded linear PCM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechAudio {
    pub data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl SpeechAudio {
    #[must_use]
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: None,
        }
    }

    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// The three calls the studio makes against a generative AI provider.
#[async_trait::async_trait]
pub trait DossierService: Send + Sync {
    fn provider(&self) -> &'static str;
    async fn research_subject(&self, subject: &str) -> ServiceResult<ResearchResult>;
    async fn generate_script(&self, subject: &str, mode: ScriptMode) -> ServiceResult<String>;
    async fn generate_speech(&self, text: &str) -> ServiceResult<SpeechAudio>;
}
