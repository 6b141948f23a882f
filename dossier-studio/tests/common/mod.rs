#![allow(dead_code)]

use base64::Engine as _;
use dossier_sdk::{
    dossier_sdk_test::MockDossierService, ReferencePerson, ResearchResult, ScriptMode, Source,
    SpeechAudio,
};

pub const PCM_MIME_TYPE: &str = "audio/L16;codec=pcm;rate=24000";

pub fn research() -> ResearchResult {
    ResearchResult {
        summary: "A energia solar converte luz em eletricidade.".to_string(),
        history: "Os primeiros painéis surgiram nos anos 1950.".to_string(),
        future_vision: "Custos continuam caindo.".to_string(),
        business_opportunities: "Instalação residencial e fazendas solares.".to_string(),
        facts: vec![
            "O Brasil tem alta irradiação.".to_string(),
            "Painéis duram 25 anos.".to_string(),
        ],
        global_references: vec![ReferencePerson {
            name: "Tony Seba".to_string(),
            relevance: "Disrupção energética".to_string(),
            video_title: "Clean Disruption".to_string(),
            video_url: "https://www.youtube.com/watch?v=example".to_string(),
        }],
        brazilian_references: vec![],
        sources: vec![Source {
            title: "Agência".to_string(),
            url: "https://example.org/solar".to_string(),
        }],
    }
}

pub fn pcm_base64(samples: &[i16]) -> String {
    let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

pub fn speech(samples: &[i16]) -> SpeechAudio {
    SpeechAudio::new(pcm_base64(samples)).with_mime_type(PCM_MIME_TYPE)
}

/// A mock primed for one successful generation. The short variant narrates
/// one sample, the long one three.
pub fn primed_service() -> MockDossierService {
    let service = MockDossierService::new();
    service
        .enqueue_research(research())
        .enqueue_script(ScriptMode::Short, "roteiro curto")
        .enqueue_script(ScriptMode::Long, "roteiro longo")
        .enqueue_speech(speech(&[0]))
        .enqueue_speech(speech(&[i16::MAX, i16::MIN, 0]));
    service
}
