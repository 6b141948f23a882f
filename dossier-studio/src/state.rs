use crate::{media::MediaHandle, FailureNotice, StudioError};
use dossier_sdk::{ResearchResult, ScriptMode};
use serde::{Deserialize, Serialize};
use std::mem;

/// Data-free projection of [`StudioState`], used for progress display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GenerationStep {
    Idle,
    Researching,
    WritingScripts,
    GeneratingMedia,
    Completed,
    Error,
}

impl GenerationStep {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Início",
            Self::Researching => "Pesquisando",
            Self::WritingScripts => "Roteirizando",
            Self::GeneratingMedia => "Gerando Áudios",
            Self::Completed => "Pronto",
            Self::Error => "Erro",
        }
    }

    /// Position in the progress bar. `Error` sorts after every other step.
    #[must_use]
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub fn is_running(self) -> bool {
        matches!(
            self,
            Self::Researching | Self::WritingScripts | Self::GeneratingMedia
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scripts {
    pub short: String,
    pub long: String,
}

impl Scripts {
    #[must_use]
    pub fn get(&self, mode: ScriptMode) -> &str {
        match mode {
            ScriptMode::Short => &self.short,
            ScriptMode::Long => &self.long,
        }
    }
}

/// One narrated podcast, playable through its media handle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PodcastMedia {
    pub id: String,
    pub mode: ScriptMode,
    pub title: String,
    pub description: String,
    #[serde(rename = "audioUrl")]
    pub handle: MediaHandle,
    pub filename: String,
    pub duration_secs: f64,
    pub byte_len: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dossier {
    pub subject: String,
    pub research: ResearchResult,
    pub scripts: Scripts,
    /// Short first, then long.
    pub media: Vec<PodcastMedia>,
}

impl Dossier {
    #[must_use]
    pub fn podcast(&self, mode: ScriptMode) -> Option<&PodcastMedia> {
        self.media.iter().find(|media| media.mode == mode)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum StudioState {
    #[default]
    Idle,
    Researching {
        subject: String,
    },
    WritingScripts {
        subject: String,
        research: Box<ResearchResult>,
    },
    GeneratingMedia {
        subject: String,
        research: Box<ResearchResult>,
        scripts: Scripts,
    },
    Completed(Box<Dossier>),
    Error(FailureNotice),
}

#[derive(Debug, Clone, PartialEq)]
pub enum StudioEvent {
    Start(String),
    ResearchCompleted(ResearchResult),
    ScriptsWritten(Scripts),
    MediaReady(Vec<PodcastMedia>),
    Failed(FailureNotice),
    Reset,
}

impl StudioEvent {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start(_) => "Start",
            Self::ResearchCompleted(_) => "ResearchCompleted",
            Self::ScriptsWritten(_) => "ScriptsWritten",
            Self::MediaReady(_) => "MediaReady",
            Self::Failed(_) => "Failed",
            Self::Reset => "Reset",
        }
    }
}

impl StudioState {
    #[must_use]
    pub fn step(&self) -> GenerationStep {
        match self {
            Self::Idle => GenerationStep::Idle,
            Self::Researching { .. } => GenerationStep::Researching,
            Self::WritingScripts { .. } => GenerationStep::WritingScripts,
            Self::GeneratingMedia { .. } => GenerationStep::GeneratingMedia,
            Self::Completed(_) => GenerationStep::Completed,
            Self::Error(_) => GenerationStep::Error,
        }
    }

    #[must_use]
    pub fn dossier(&self) -> Option<&Dossier> {
        match self {
            Self::Completed(dossier) => Some(dossier),
            _ => None,
        }
    }

    #[must_use]
    pub fn notice(&self) -> Option<&FailureNotice> {
        match self {
            Self::Error(notice) => Some(notice),
            _ => None,
        }
    }

    /// Apply `event`. On an invalid transition the state is left unchanged.
    pub fn apply(&mut self, event: StudioEvent) -> Result<(), StudioError> {
        let current = mem::take(self);
        let next = match (current, event) {
            (_, StudioEvent::Reset) => Self::Idle,
            (Self::Idle | Self::Error(_), StudioEvent::Start(subject)) => {
                Self::Researching { subject }
            }
            (Self::Researching { subject }, StudioEvent::ResearchCompleted(research)) => {
                Self::WritingScripts {
                    subject,
                    research: Box::new(research),
                }
            }
            (Self::WritingScripts { subject, research }, StudioEvent::ScriptsWritten(scripts)) => {
                Self::GeneratingMedia {
                    subject,
                    research,
                    scripts,
                }
            }
            (
                Self::GeneratingMedia {
                    subject,
                    research,
                    scripts,
                },
                StudioEvent::MediaReady(media),
            ) => Self::Completed(Box::new(Dossier {
                subject,
                research: *research,
                scripts,
                media,
            })),
            (current, StudioEvent::Failed(notice)) if current.step().is_running() => {
                Self::Error(notice)
            }
            (current, event) => {
                let error = StudioError::InvalidTransition {
                    from: current.step(),
                    event: event.name(),
                };
                *self = current;
                return Err(error);
            }
        };
        *self = next;
        Ok(())
    }
}
