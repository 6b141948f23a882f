use crate::{
    export::wav_filename, Dossier, FailureNotice, GenerationStep, MediaStore, PodcastMedia,
    Scripts, StudioConfig, StudioError, StudioEvent, StudioState,
};
use dossier_sdk::{
    encode_wav, google::GeminiService, retry, wav::WAV_MIME_TYPE, DossierService, PcmDecoder,
    RetryPolicy, ScriptMode, ServiceError, SpeechAudio, WavBlob,
};
use std::sync::Arc;
use tokio::sync::watch;

/// Runs generations and owns the state machine. One generation at a time;
/// callers that share a studio serialize access (see [`crate::server`]).
pub struct Studio {
    service: Arc<dyn DossierService>,
    media: MediaStore,
    retry_policy: RetryPolicy,
    state: StudioState,
    step_tx: watch::Sender<GenerationStep>,
}

impl Studio {
    pub fn new(
        service: Arc<dyn DossierService>,
        media: MediaStore,
        retry_policy: RetryPolicy,
    ) -> Self {
        let (step_tx, _) = watch::channel(GenerationStep::Idle);
        Self {
            service,
            media,
            retry_policy,
            state: StudioState::Idle,
            step_tx,
        }
    }

    #[must_use]
    pub fn from_config(config: &StudioConfig, media: MediaStore) -> Self {
        let service = GeminiService::new(config.gemini_options());
        Self::new(Arc::new(service), media, config.retry)
    }

    #[must_use]
    pub fn state(&self) -> &StudioState {
        &self.state
    }

    #[must_use]
    pub fn step(&self) -> GenerationStep {
        self.state.step()
    }

    #[must_use]
    pub fn dossier(&self) -> Option<&Dossier> {
        self.state.dossier()
    }

    #[must_use]
    pub fn media(&self) -> &MediaStore {
        &self.media
    }

    /// Observe step changes without holding a reference to the studio.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<GenerationStep> {
        self.step_tx.subscribe()
    }

    fn transition(&mut self, event: StudioEvent) -> Result<(), StudioError> {
        self.state.apply(event)?;
        let step = self.state.step();
        tracing::info!(step = ?step, label = step.label(), "generation step");
        self.step_tx.send_replace(step);
        Ok(())
    }

    /// Return to `Idle`, revoking the media of a finished run.
    pub fn reset(&mut self) {
        if let Some(dossier) = self.state.dossier() {
            for podcast in &dossier.media {
                self.media.revoke(&podcast.handle);
            }
        }
        // Reset is accepted from every state
        let _ = self.transition(StudioEvent::Reset);
    }

    /// Research `subject`, write both scripts, narrate them and publish the
    /// two podcasts. On failure the studio ends in `Error` with a
    /// [`FailureNotice`] and no media is published.
    pub async fn generate(&mut self, subject: &str) -> Result<&Dossier, StudioError> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(StudioError::EmptySubject);
        }
        // `&mut self` excludes a live run, so a running step here belongs to a
        // generation whose future was dropped.
        if self.state.step().is_running() {
            tracing::warn!(step = ?self.state.step(), "discarding abandoned generation");
        }
        if !matches!(self.state, StudioState::Idle) {
            self.reset();
        }

        self.transition(StudioEvent::Start(subject.to_string()))?;
        tracing::info!(subject, provider = self.service.provider(), "generation started");

        if let Err(error) = self.run(subject).await {
            let notice = FailureNotice::from_error(&error);
            tracing::error!(%error, title = %notice.title, "generation failed");
            self.transition(StudioEvent::Failed(notice))?;
            return Err(error);
        }

        self.state
            .dossier()
            .ok_or(StudioError::InvalidTransition {
                from: self.state.step(),
                event: "MediaReady",
            })
    }

    async fn run(&mut self, subject: &str) -> Result<(), StudioError> {
        let service = Arc::clone(&self.service);
        let policy = self.retry_policy;

        let research = retry(policy, || service.research_subject(subject)).await?;
        self.transition(StudioEvent::ResearchCompleted(research))?;

        let (short, long) = futures::try_join!(
            retry(policy, || service.generate_script(subject, ScriptMode::Short)),
            retry(policy, || service.generate_script(subject, ScriptMode::Long)),
        )?;
        let scripts = Scripts { short, long };
        self.transition(StudioEvent::ScriptsWritten(scripts.clone()))?;

        let (short_audio, long_audio) = futures::try_join!(
            retry(policy, || service.generate_speech(&scripts.short)),
            retry(policy, || service.generate_speech(&scripts.long)),
        )?;

        let (short_wav, long_wav) = encode_pair(&short_audio, &long_audio)?;
        let media = vec![
            self.publish(subject, ScriptMode::Short, short_wav),
            self.publish(subject, ScriptMode::Long, long_wav),
        ];
        self.transition(StudioEvent::MediaReady(media))
    }

    fn publish(&self, subject: &str, mode: ScriptMode, wav: WavBlob) -> PodcastMedia {
        let (title, description) = podcast_copy(mode);
        let filename = wav_filename(subject, mode);
        let duration_secs = wav
            .header()
            .map_or(0.0, |header| f64::from(header.sample_count()) / f64::from(header.sample_rate));
        let byte_len = wav.len();
        let handle = self.media.publish(wav.into_bytes(), WAV_MIME_TYPE, filename.clone());

        PodcastMedia {
            id: handle.id().to_string(),
            mode,
            title: title.to_string(),
            description: description.to_string(),
            handle,
            filename,
            duration_secs,
            byte_len,
        }
    }
}

/// Decode both payloads with one decoder, released before publishing. Both
/// must encode before either is returned.
fn encode_pair(short: &SpeechAudio, long: &SpeechAudio) -> Result<(WavBlob, WavBlob), StudioError> {
    let mut decoder = PcmDecoder::new();
    let short_wav = encode_wav(&decoder.decode(short).map_err(ServiceError::from)?);
    let long_wav = encode_wav(&decoder.decode(long).map_err(ServiceError::from)?);
    drop(decoder);
    Ok((short_wav, long_wav))
}

fn podcast_copy(mode: ScriptMode) -> (&'static str, &'static str) {
    match mode {
        ScriptMode::Short => (
            "Pocket Podcast (Essencial)",
            "O resumo estratégico para quem tem pouco tempo.",
        ),
        ScriptMode::Long => (
            "Imersão (Masterclass)",
            "Explicação profunda e detalhada sobre o tema.",
        ),
    }
}
