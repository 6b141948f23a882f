mod common;

use dossier_sdk::{
    dossier_sdk_test::{MockDossierService, TrackedCall},
    google::{GeminiService, GeminiServiceOptions},
    wav::WavHeader,
    DossierService, ResearchResult, RetryPolicy, ScriptMode, ServiceError, ServiceResult,
    SpeechAudio,
};
use dossier_studio::{
    GenerationStep, MediaStore, Studio, StudioError, StudioState, BLOCKED_TITLE, GENERIC_TITLE,
    MISSING_KEY_TITLE,
};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

fn studio_with(service: Arc<MockDossierService>, policy: RetryPolicy) -> (Studio, MediaStore) {
    let media = MediaStore::new();
    (Studio::new(service, media.clone(), policy), media)
}

#[tokio::test]
async fn generates_dossier_and_publishes_both_podcasts() {
    let service = Arc::new(common::primed_service());
    let (mut studio, media) = studio_with(service.clone(), RetryPolicy::none());
    let steps = studio.subscribe();

    let dossier = studio
        .generate("  Energia Solar ")
        .await
        .expect("generation succeeds")
        .clone();

    assert_eq!(dossier.subject, "Energia Solar");
    assert_eq!(dossier.research, common::research());
    assert_eq!(dossier.scripts.short, "roteiro curto");
    assert_eq!(dossier.scripts.long, "roteiro longo");
    assert_eq!(studio.step(), GenerationStep::Completed);
    assert_eq!(*steps.borrow(), GenerationStep::Completed);

    let modes: Vec<ScriptMode> = dossier.media.iter().map(|m| m.mode).collect();
    assert_eq!(modes, vec![ScriptMode::Short, ScriptMode::Long]);

    let short = dossier.podcast(ScriptMode::Short).unwrap();
    assert_eq!(short.filename, "podcast-energia-solar-resumido.wav");
    assert_eq!(short.title, "Pocket Podcast (Essencial)");
    assert_eq!(short.byte_len, 46);
    assert_eq!(short.handle.url(), format!("/media/{}", short.id));

    let long = dossier.podcast(ScriptMode::Long).unwrap();
    assert_eq!(long.filename, "podcast-energia-solar-completo.wav");
    assert_eq!(long.byte_len, 44 + 6);
    assert!((long.duration_secs - 3.0 / 24_000.0).abs() < 1e-9);

    assert_eq!(media.len(), 2);
    let entry = media.get(&long.handle).expect("published");
    assert_eq!(entry.content_type, "audio/wav");
    let header = WavHeader::parse(&entry.bytes).expect("wav header");
    assert_eq!(header.data_size, 6);
    assert_eq!(&entry.bytes[44..], &[0xFF, 0x7F, 0x00, 0x80, 0x00, 0x00]);

    assert_eq!(
        service.tracked_calls(),
        vec![
            TrackedCall::Research("Energia Solar".to_string()),
            TrackedCall::Script("Energia Solar".to_string(), ScriptMode::Short),
            TrackedCall::Script("Energia Solar".to_string(), ScriptMode::Long),
            TrackedCall::Speech("roteiro curto".to_string()),
            TrackedCall::Speech("roteiro longo".to_string()),
        ]
    );
}

#[tokio::test]
async fn rejects_blank_subject_without_calling_the_service() {
    let service = Arc::new(MockDossierService::new());
    let (mut studio, _) = studio_with(service.clone(), RetryPolicy::none());

    let err = studio.generate("   ").await.expect_err("blank subject");
    assert!(matches!(err, StudioError::EmptySubject));
    assert_eq!(studio.step(), GenerationStep::Idle);
    assert!(service.tracked_calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn retries_transient_failures_through_the_pipeline() {
    let service = Arc::new(MockDossierService::new());
    service
        .enqueue_research(ServiceError::Transient("503 Service Unavailable".to_string()))
        .enqueue_research(common::research())
        .enqueue_script(ScriptMode::Short, "curto")
        .enqueue_script(
            ScriptMode::Long,
            ServiceError::Transient("500 Internal Server Error".to_string()),
        )
        .enqueue_script(ScriptMode::Long, "longo")
        .enqueue_speech(common::speech(&[1, 2]))
        .enqueue_speech(common::speech(&[3]));

    let policy = RetryPolicy::new(2, Duration::from_millis(1000));
    let (mut studio, media) = studio_with(service.clone(), policy);

    let dossier = studio.generate("café").await.expect("retries recover");
    assert_eq!(dossier.scripts.long, "longo");
    assert_eq!(media.len(), 2);

    let research_calls = service
        .tracked_calls()
        .into_iter()
        .filter(|call| matches!(call, TrackedCall::Research(_)))
        .count();
    assert_eq!(research_calls, 2);
}

#[tokio::test]
async fn invalid_audio_fails_without_publishing_media() {
    let service = Arc::new(MockDossierService::new());
    service
        .enqueue_research(common::research())
        .enqueue_script(ScriptMode::Short, "curto")
        .enqueue_script(ScriptMode::Long, "longo")
        .enqueue_speech(common::speech(&[0, 0]))
        // three bytes: not a whole number of samples
        .enqueue_speech(SpeechAudio::new("AAAA"));
    let (mut studio, media) = studio_with(service, RetryPolicy::none());
    let steps = studio.subscribe();

    let err = studio.generate("x").await.expect_err("odd length audio");
    assert!(matches!(err, StudioError::Service(ServiceError::Audio(_))));

    assert!(media.is_empty());
    assert_eq!(*steps.borrow(), GenerationStep::Error);
    let StudioState::Error(notice) = studio.state() else {
        panic!("expected error state, got {:?}", studio.state());
    };
    assert_eq!(notice.title, GENERIC_TITLE);
    assert!(notice.message.contains("16-bit"));
}

#[tokio::test]
async fn rejected_key_reports_missing_api_key() {
    let service = Arc::new(MockDossierService::new());
    service.enqueue_research(ServiceError::Configuration("API key not valid.".to_string()));
    let (mut studio, _) = studio_with(service, RetryPolicy::default());

    studio.generate("x").await.expect_err("bad key");
    assert_eq!(studio.state().notice().unwrap().title, MISSING_KEY_TITLE);
}

#[tokio::test]
async fn unreachable_service_reports_blocked_request() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let service = GeminiService::new(GeminiServiceOptions {
        api_key: "test-key".to_string(),
        base_url: Some(format!("http://{addr}")),
        ..Default::default()
    });
    let mut studio = Studio::new(Arc::new(service), MediaStore::new(), RetryPolicy::none());

    studio.generate("x").await.expect_err("connection refused");
    let notice = studio.state().notice().unwrap();
    assert_eq!(notice.title, BLOCKED_TITLE);
    assert!(notice.message.contains("AdBlock"));
}

#[tokio::test]
async fn new_generation_revokes_previous_media() {
    let service = Arc::new(common::primed_service());
    let (mut studio, media) = studio_with(service.clone(), RetryPolicy::none());

    let first = studio.generate("um").await.unwrap().clone();
    service
        .enqueue_research(common::research())
        .enqueue_script(ScriptMode::Short, "a")
        .enqueue_script(ScriptMode::Long, "b")
        .enqueue_speech(common::speech(&[5]))
        .enqueue_speech(common::speech(&[6]));
    let second = studio.generate("dois").await.unwrap().clone();

    for podcast in &first.media {
        assert!(media.get(&podcast.handle).is_none(), "old media revoked");
    }
    for podcast in &second.media {
        assert!(media.get(&podcast.handle).is_some());
    }
    assert_eq!(media.len(), 2);
}

#[tokio::test]
async fn reset_after_failure_returns_to_idle() {
    let service = Arc::new(MockDossierService::new());
    let (mut studio, _) = studio_with(service, RetryPolicy::none());

    // an empty mock fails the research call
    studio.generate("x").await.expect_err("no mocked research");
    assert_eq!(studio.step(), GenerationStep::Error);

    studio.reset();
    assert_eq!(studio.step(), GenerationStep::Idle);
    assert!(studio.dossier().is_none());
}

/// Hangs on the first research call, then behaves like the wrapped mock.
struct StallOnce {
    stall: AtomicBool,
    inner: MockDossierService,
}

#[async_trait::async_trait]
impl DossierService for StallOnce {
    fn provider(&self) -> &'static str {
        "stall-once"
    }

    async fn research_subject(&self, subject: &str) -> ServiceResult<ResearchResult> {
        if self.stall.swap(false, Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.inner.research_subject(subject).await
    }

    async fn generate_script(&self, subject: &str, mode: ScriptMode) -> ServiceResult<String> {
        self.inner.generate_script(subject, mode).await
    }

    async fn generate_speech(&self, text: &str) -> ServiceResult<SpeechAudio> {
        self.inner.generate_speech(text).await
    }
}

#[tokio::test(start_paused = true)]
async fn cancelled_generation_does_not_block_the_next_one() {
    let service = Arc::new(StallOnce {
        stall: AtomicBool::new(true),
        inner: common::primed_service(),
    });
    let mut studio = Studio::new(service, MediaStore::new(), RetryPolicy::none());
    let steps = studio.subscribe();

    assert!(
        tokio::time::timeout(Duration::from_millis(20), studio.generate("solar"))
            .await
            .is_err(),
        "first run stalls"
    );
    assert_eq!(studio.step(), GenerationStep::Researching);

    let dossier = studio.generate("solar").await.expect("second run starts cleanly");
    assert_eq!(dossier.subject, "solar");
    assert_eq!(dossier.media.len(), 2);
    assert_eq!(*steps.borrow(), GenerationStep::Completed);
}

#[tokio::test]
async fn timeout_notice_does_not_contain_the_api_key() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    // accept and never answer
    tokio::spawn(async move {
        let mut open = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            open.push(socket);
        }
    });

    let service = GeminiService::new(GeminiServiceOptions {
        api_key: "SECRET-KEY-123".to_string(),
        base_url: Some(format!("http://{addr}")),
        client: Some(
            reqwest::Client::builder()
                .timeout(Duration::from_millis(100))
                .build()
                .unwrap(),
        ),
        ..Default::default()
    });
    let mut studio = Studio::new(Arc::new(service), MediaStore::new(), RetryPolicy::none());

    let err = studio.generate("x").await.expect_err("request times out");
    assert!(!err.to_string().contains("SECRET-KEY-123"), "{err}");

    let notice = studio.state().notice().unwrap();
    assert_eq!(notice.title, GENERIC_TITLE);
    assert!(notice.message.contains("timed out"), "{}", notice.message);
    assert!(!notice.message.contains("SECRET-KEY-123"), "{}", notice.message);
}

#[tokio::test(start_paused = true)]
async fn concurrent_speech_retries_keep_their_own_audio() {
    let service = Arc::new(MockDossierService::new());
    service
        .enqueue_research(common::research())
        .enqueue_script(ScriptMode::Short, "curto")
        .enqueue_script(ScriptMode::Long, "longo")
        .enqueue_speech_for(
            "curto",
            ServiceError::Transient("503 Service Unavailable".to_string()),
        )
        .enqueue_speech_for("curto", common::speech(&[1]))
        .enqueue_speech_for("longo", common::speech(&[2, 3, 4]));
    let (mut studio, _) = studio_with(service, RetryPolicy::new(2, Duration::from_millis(1000)));

    let dossier = studio.generate("x").await.expect("speech retry recovers");
    assert_eq!(dossier.podcast(ScriptMode::Short).unwrap().byte_len, 44 + 2);
    assert_eq!(dossier.podcast(ScriptMode::Long).unwrap().byte_len, 44 + 6);
}
