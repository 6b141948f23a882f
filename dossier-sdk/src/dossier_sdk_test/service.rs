use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
};

use crate::{
    errors::{ServiceError, ServiceResult},
    DossierService, ResearchResult, ScriptMode, SpeechAudio,
};

/// Result for a mocked call.
/// It can either be a value or an error to return.
pub enum MockResult<T> {
    Value(T),
    Error(ServiceError),
}

impl<T> MockResult<T> {
    /// Construct a result that yields the provided value.
    pub fn value(value: T) -> Self {
        Self::Value(value)
    }

    /// Construct a result that yields the provided error.
    pub fn error(error: ServiceError) -> Self {
        Self::Error(error)
    }

    fn into_result(self) -> ServiceResult<T> {
        match self {
            Self::Value(value) => Ok(value),
            Self::Error(error) => Err(error),
        }
    }
}

impl From<ResearchResult> for MockResult<ResearchResult> {
    fn from(value: ResearchResult) -> Self {
        Self::value(value)
    }
}

impl From<String> for MockResult<String> {
    fn from(value: String) -> Self {
        Self::value(value)
    }
}

impl From<&str> for MockResult<String> {
    fn from(value: &str) -> Self {
        Self::value(value.to_string())
    }
}

impl From<SpeechAudio> for MockResult<SpeechAudio> {
    fn from(value: SpeechAudio) -> Self {
        Self::value(value)
    }
}

impl<T> From<ServiceError> for MockResult<T> {
    fn from(error: ServiceError) -> Self {
        Self::error(error)
    }
}

/// One recorded call against the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackedCall {
    Research(String),
    Script(String, ScriptMode),
    Speech(String),
}

#[derive(Default)]
struct MockDossierServiceState {
    research_results: VecDeque<MockResult<ResearchResult>>,
    short_script_results: VecDeque<MockResult<String>>,
    long_script_results: VecDeque<MockResult<String>>,
    speech_results: VecDeque<MockResult<SpeechAudio>>,
    speech_results_by_text: HashMap<String, VecDeque<MockResult<SpeechAudio>>>,
    tracked_calls: Vec<TrackedCall>,
}

impl MockDossierServiceState {
    fn script_queue(&mut self, mode: ScriptMode) -> &mut VecDeque<MockResult<String>> {
        match mode {
            ScriptMode::Short => &mut self.short_script_results,
            ScriptMode::Long => &mut self.long_script_results,
        }
    }

    fn next_speech(&mut self, text: &str) -> Option<MockResult<SpeechAudio>> {
        self.speech_results_by_text
            .get_mut(text)
            .and_then(VecDeque::pop_front)
            .or_else(|| self.speech_results.pop_front())
    }

    fn restore(&mut self) {
        *self = Self::default();
    }
}

/// A mock service for testing that tracks calls and yields predefined
/// results in FIFO order. Script results are queued per [`ScriptMode`] so
/// the concurrent short/long calls never race for the same result. Speech
/// results queued with [`MockDossierService::enqueue_speech_for`] are bound to
/// their script text; the shared speech queue only keeps its order when calls
/// are not retried concurrently.
#[derive(Default)]
pub struct MockDossierService {
    state: Mutex<MockDossierServiceState>,
}

impl MockDossierService {
    /// Construct a new mock service instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue_research<R>(&self, result: R) -> &Self
    where
        R: Into<MockResult<ResearchResult>>,
    {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.research_results.push_back(result.into());
        drop(state);
        self
    }

    pub fn enqueue_script<R>(&self, mode: ScriptMode, result: R) -> &Self
    where
        R: Into<MockResult<String>>,
    {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.script_queue(mode).push_back(result.into());
        drop(state);
        self
    }

    pub fn enqueue_speech<R>(&self, result: R) -> &Self
    where
        R: Into<MockResult<SpeechAudio>>,
    {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.speech_results.push_back(result.into());
        drop(state);
        self
    }

    /// Queue a speech result returned only for calls narrating `text`.
    /// These are served before the shared speech queue.
    pub fn enqueue_speech_for<R>(&self, text: impl Into<String>, result: R) -> &Self
    where
        R: Into<MockResult<SpeechAudio>>,
    {
        let mut state = self.state.lock().expect("mock state poisoned");
        state
            .speech_results_by_text
            .entry(text.into())
            .or_default()
            .push_back(result.into());
        drop(state);
        self
    }

    /// Retrieve the calls recorded so far, in invocation order.
    pub fn tracked_calls(&self) -> Vec<TrackedCall> {
        let state = self.state.lock().expect("mock state poisoned");
        state.tracked_calls.clone()
    }

    /// Clear both tracked calls and enqueued results.
    pub fn restore(&self) {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.restore();
    }
}

fn exhausted(call: &str) -> ServiceError {
    ServiceError::Invariant("mock", format!("no mocked {call} results available"))
}

#[async_trait::async_trait]
impl DossierService for MockDossierService {
    fn provider(&self) -> &'static str {
        "mock"
    }

    async fn research_subject(&self, subject: &str) -> ServiceResult<ResearchResult> {
        let mut state = self.state.lock().expect("mock state poisoned");
        state
            .tracked_calls
            .push(TrackedCall::Research(subject.to_string()));
        state
            .research_results
            .pop_front()
            .ok_or_else(|| exhausted("research"))?
            .into_result()
    }

    async fn generate_script(&self, subject: &str, mode: ScriptMode) -> ServiceResult<String> {
        let mut state = self.state.lock().expect("mock state poisoned");
        state
            .tracked_calls
            .push(TrackedCall::Script(subject.to_string(), mode));
        state
            .script_queue(mode)
            .pop_front()
            .ok_or_else(|| exhausted("script"))?
            .into_result()
    }

    async fn generate_speech(&self, text: &str) -> ServiceResult<SpeechAudio> {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.tracked_calls.push(TrackedCall::Speech(text.to_string()));
        state
            .next_speech(text)
            .ok_or_else(|| exhausted("speech"))?
            .into_result()
    }
}
