mod common;

use dossier_sdk::ScriptMode;
use dossier_studio::{
    export::{pdf_filename, render_dossier_pdf, wav_filename, write_dossier},
    Dossier, MediaStore, PodcastMedia, Scripts,
};
use lopdf::Document;

fn dossier(long_script: String) -> Dossier {
    Dossier {
        subject: "Energia Solar".to_string(),
        research: common::research(),
        scripts: Scripts {
            short: "curto".to_string(),
            long: long_script,
        },
        media: Vec::new(),
    }
}

fn page_text(doc: &Document, page: u32) -> String {
    let pages = doc.get_pages();
    let content = doc.get_page_content(pages[&page]).expect("page content");
    String::from_utf8_lossy(&content).into_owned()
}

#[test]
fn filenames_are_deterministic() {
    assert_eq!(
        wav_filename("Energia Solar", ScriptMode::Short),
        "podcast-energia-solar-resumido.wav"
    );
    assert_eq!(
        wav_filename("Energia Solar", ScriptMode::Long),
        "podcast-energia-solar-completo.wav"
    );
    assert_eq!(pdf_filename("Computação Quântica"), "dossie-computacao-quantica.pdf");
    assert_eq!(pdf_filename("???"), "dossie-assunto.pdf");
    assert_eq!(
        wav_filename("Energia Solar", ScriptMode::Short),
        wav_filename("Energia Solar", ScriptMode::Short)
    );
}

#[test]
fn short_dossier_fits_on_one_page() {
    let bytes = render_dossier_pdf(&dossier("Um roteiro breve.".to_string())).unwrap();
    assert!(bytes.starts_with(b"%PDF-1.5"));

    let doc = Document::load_mem(&bytes).expect("valid pdf");
    assert_eq!(doc.get_pages().len(), 1);

    let text = page_text(&doc, 1);
    assert!(text.contains("Resumo Executivo"));
    assert!(text.contains("Fontes Consultadas"));
    assert!(text.contains("1 de 1"));
}

#[test]
fn long_script_flows_onto_more_pages() {
    let paragraph = "Esta frase se repete para preencher o roteiro completo do podcast. ".repeat(40);
    let script = vec![paragraph; 12].join("\n\n");

    let bytes = render_dossier_pdf(&dossier(script)).unwrap();
    let doc = Document::load_mem(&bytes).expect("valid pdf");
    let pages = doc.get_pages().len();
    assert!(pages >= 3, "expected pagination, got {pages} pages");

    let last = u32::try_from(pages).unwrap();
    assert!(page_text(&doc, last).contains(&format!("{last} de {last}")));
}

#[tokio::test]
async fn writes_podcasts_and_pdf_to_disk() {
    let media = MediaStore::new();
    let mut dossier = dossier("Roteiro.".to_string());
    for (mode, bytes) in [(ScriptMode::Short, vec![1u8, 2]), (ScriptMode::Long, vec![3u8])] {
        let filename = wav_filename(&dossier.subject, mode);
        let handle = media.publish(bytes, "audio/wav", filename.clone());
        dossier.media.push(PodcastMedia {
            id: handle.id().to_string(),
            mode,
            title: String::new(),
            description: String::new(),
            handle,
            filename,
            duration_secs: 0.0,
            byte_len: 0,
        });
    }

    let dir = std::env::temp_dir().join(format!("dossier-export-{}", std::process::id()));
    let written = write_dossier(&dossier, &media, &dir, true).await.unwrap();

    let names: Vec<String> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "podcast-energia-solar-resumido.wav",
            "podcast-energia-solar-completo.wav",
            "dossie-energia-solar.pdf"
        ]
    );
    assert_eq!(std::fs::read(&written[0]).unwrap(), vec![1, 2]);
    assert!(std::fs::read(&written[2]).unwrap().starts_with(b"%PDF"));

    std::fs::remove_dir_all(&dir).unwrap();
}
