use crate::{config::ConfigError, export::ExportError, state::GenerationStep};
use dossier_sdk::{ErrorKind, ServiceError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StudioError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
    #[error("Cannot apply {event} while {from:?}")]
    InvalidTransition {
        from: GenerationStep,
        event: &'static str,
    },
    #[error("The subject must not be empty")]
    EmptySubject,
}

impl StudioError {
    fn is_configuration(&self) -> bool {
        match self {
            Self::Config(_) => true,
            Self::Service(error) => error.kind() == ErrorKind::Configuration,
            _ => false,
        }
    }

    fn is_blocked(&self) -> bool {
        matches!(self, Self::Service(error) if error.kind() == ErrorKind::Blocked)
    }
}

pub const MISSING_KEY_TITLE: &str = "Chave de API Ausente";
pub const BLOCKED_TITLE: &str = "Requisição Bloqueada";
pub const GENERIC_TITLE: &str = "Erro no Processamento";

const MISSING_KEY_MESSAGE: &str = "A chave de API não foi configurada corretamente. Defina GEMINI_API_KEY nas variáveis de ambiente ou no arquivo .env e tente novamente.";
const BLOCKED_MESSAGE: &str = "Não foi possível conectar com a inteligência do Google. Isso geralmente acontece por causa de BLOQUEADORES DE ANÚNCIOS (AdBlock), proxies ou redes corporativas restritas. Desative o bloqueio e tente novamente.";
pub(crate) const UNEXPECTED_MESSAGE: &str = "Ocorreu um erro inesperado.";

/// A titled, human readable account of a failed generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureNotice {
    pub title: String,
    pub message: String,
}

impl FailureNotice {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn from_error(error: &StudioError) -> Self {
        if error.is_configuration() {
            return Self::new(MISSING_KEY_TITLE, MISSING_KEY_MESSAGE);
        }
        if error.is_blocked() {
            return Self::new(BLOCKED_TITLE, BLOCKED_MESSAGE);
        }
        let message = error.to_string();
        if message.trim().is_empty() {
            Self::new(GENERIC_TITLE, UNEXPECTED_MESSAGE)
        } else {
            Self::new(GENERIC_TITLE, message)
        }
    }
}

impl From<&StudioError> for FailureNotice {
    fn from(error: &StudioError) -> Self {
        Self::from_error(error)
    }
}
