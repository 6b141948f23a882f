mod common;

use dossier_studio::{
    FailureNotice, GenerationStep, Scripts, StudioError, StudioEvent, StudioState,
};

fn scripts() -> Scripts {
    Scripts {
        short: "curto".to_string(),
        long: "longo".to_string(),
    }
}

fn failed() -> StudioEvent {
    StudioEvent::Failed(FailureNotice::new("Erro no Processamento", "boom"))
}

#[test]
fn walks_the_happy_path() {
    let mut state = StudioState::default();
    assert_eq!(state.step(), GenerationStep::Idle);

    state.apply(StudioEvent::Start("café".to_string())).unwrap();
    assert_eq!(state.step(), GenerationStep::Researching);

    state
        .apply(StudioEvent::ResearchCompleted(common::research()))
        .unwrap();
    assert_eq!(state.step(), GenerationStep::WritingScripts);

    state.apply(StudioEvent::ScriptsWritten(scripts())).unwrap();
    assert_eq!(state.step(), GenerationStep::GeneratingMedia);

    state.apply(StudioEvent::MediaReady(Vec::new())).unwrap();
    assert_eq!(state.step(), GenerationStep::Completed);

    let dossier = state.dossier().expect("completed dossier");
    assert_eq!(dossier.subject, "café");
    assert_eq!(dossier.scripts, scripts());
    assert_eq!(dossier.research, common::research());
}

#[test]
fn out_of_order_events_are_rejected_and_leave_state_unchanged() {
    let mut state = StudioState::default();

    let err = state
        .apply(StudioEvent::ScriptsWritten(scripts()))
        .expect_err("cannot skip research");
    assert!(matches!(
        err,
        StudioError::InvalidTransition {
            from: GenerationStep::Idle,
            event: "ScriptsWritten"
        }
    ));
    assert_eq!(state, StudioState::Idle);

    state.apply(StudioEvent::Start("x".to_string())).unwrap();
    let before = state.clone();
    state
        .apply(StudioEvent::Start("y".to_string()))
        .expect_err("already running");
    assert_eq!(state, before);
}

#[test]
fn failure_is_only_accepted_while_running() {
    let mut idle = StudioState::Idle;
    assert!(idle.apply(failed()).is_err());

    for running in [
        StudioState::Researching {
            subject: "x".to_string(),
        },
        StudioState::WritingScripts {
            subject: "x".to_string(),
            research: Box::new(common::research()),
        },
    ] {
        let mut state = running;
        state.apply(failed()).unwrap();
        assert_eq!(state.step(), GenerationStep::Error);
        assert_eq!(state.notice().unwrap().message, "boom");
    }
}

#[test]
fn error_state_can_start_again_but_completed_needs_reset() {
    let mut state = StudioState::Error(FailureNotice::new("t", "m"));
    state.apply(StudioEvent::Start("x".to_string())).unwrap();
    assert_eq!(state.step(), GenerationStep::Researching);

    let mut state = StudioState::Researching {
        subject: "x".to_string(),
    };
    state
        .apply(StudioEvent::ResearchCompleted(common::research()))
        .unwrap();
    state.apply(StudioEvent::ScriptsWritten(scripts())).unwrap();
    state.apply(StudioEvent::MediaReady(Vec::new())).unwrap();
    assert!(state.apply(StudioEvent::Start("y".to_string())).is_err());

    state.apply(StudioEvent::Reset).unwrap();
    assert_eq!(state, StudioState::Idle);
}

#[test]
fn steps_have_labels_and_ordered_ordinals() {
    let steps = [
        GenerationStep::Idle,
        GenerationStep::Researching,
        GenerationStep::WritingScripts,
        GenerationStep::GeneratingMedia,
        GenerationStep::Completed,
        GenerationStep::Error,
    ];
    let labels: Vec<&str> = steps.iter().map(|s| s.label()).collect();
    assert_eq!(
        labels,
        vec![
            "Início",
            "Pesquisando",
            "Roteirizando",
            "Gerando Áudios",
            "Pronto",
            "Erro"
        ]
    );
    assert!(steps.windows(2).all(|w| w[0].ordinal() < w[1].ordinal()));
    assert_eq!(
        serde_json::to_value(GenerationStep::WritingScripts).unwrap(),
        "WRITING_SCRIPTS"
    );
}
