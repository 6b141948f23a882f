use super::ExportError;
use crate::Dossier;
use dossier_sdk::ReferencePerson;
use lopdf::{
    content::{Content, Operation},
    dictionary, Document, Object, ObjectId, Stream,
};

// A4 in points.
const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 56.0;
const FOOTER_Y: f32 = 32.0;
const FOOTER_SIZE: f32 = 9.0;
const LEADING: f32 = 1.4;
/// Mean Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.5;

const TITLE_SIZE: f32 = 20.0;
const HEADING_SIZE: f32 = 13.0;
const BODY_SIZE: f32 = 10.5;
const LIST_INDENT: f32 = 14.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource_name(self) -> &'static str {
        match self {
            Self::Regular => "F1",
            Self::Bold => "F2",
        }
    }
}

#[derive(Debug)]
struct PlacedLine {
    text: String,
    font: Font,
    size: f32,
    x: f32,
    y: f32,
}

/// Flows lines top to bottom, opening a new page when the footer band is
/// reached.
struct Layout {
    pages: Vec<Vec<PlacedLine>>,
    current: Vec<PlacedLine>,
    y: f32,
}

impl Layout {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn bottom() -> f32 {
        MARGIN + FOOTER_SIZE
    }

    fn break_page(&mut self) {
        let page = std::mem::take(&mut self.current);
        self.pages.push(page);
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn ensure(&mut self, height: f32) {
        if self.y - height < Self::bottom() && !self.current.is_empty() {
            self.break_page();
        }
    }

    fn space(&mut self, amount: f32) {
        self.y -= amount;
    }

    fn line(&mut self, text: String, font: Font, size: f32, indent: f32) {
        let height = size * LEADING;
        self.ensure(height);
        self.y -= height;
        self.current.push(PlacedLine {
            text,
            font,
            size,
            x: MARGIN + indent,
            y: self.y,
        });
    }

    fn paragraph(&mut self, text: &str, font: Font, size: f32, indent: f32) {
        let width = max_chars(size, indent);
        for raw in text.lines() {
            if raw.trim().is_empty() {
                self.space(size * 0.6);
                continue;
            }
            for line in wrap(raw, width) {
                self.line(line, font, size, indent);
            }
        }
    }

    fn heading(&mut self, text: &str) {
        self.space(HEADING_SIZE * 0.8);
        // keep the heading with at least two body lines
        self.ensure(HEADING_SIZE * LEADING + 2.0 * BODY_SIZE * LEADING);
        self.line(text.to_string(), Font::Bold, HEADING_SIZE, 0.0);
        self.space(BODY_SIZE * 0.3);
    }

    fn bullet(&mut self, text: &str) {
        let width = max_chars(BODY_SIZE, LIST_INDENT);
        for (i, line) in wrap(text, width).into_iter().enumerate() {
            let line = if i == 0 {
                format!("\u{2022} {line}")
            } else {
                format!("  {line}")
            };
            self.line(line, Font::Regular, BODY_SIZE, LIST_INDENT);
        }
    }

    fn finish(mut self) -> Vec<Vec<PlacedLine>> {
        if !self.current.is_empty() || self.pages.is_empty() {
            self.break_page();
        }
        self.pages
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn max_chars(size: f32, indent: f32) -> usize {
    let usable = PAGE_WIDTH - 2.0 * MARGIN - indent;
    ((usable / (size * AVG_GLYPH_WIDTH)).floor() as usize).max(1)
}

/// Greedy word wrap on character count. Words longer than a line are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();
        while chars.len() > width {
            if line_len > 0 {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            let rest = chars.split_off(width);
            lines.push(chars.into_iter().collect());
            chars = rest;
        }
        let word_len = chars.len();
        if word_len == 0 {
            continue;
        }
        if line_len > 0 && line_len + 1 + word_len > width {
            lines.push(std::mem::take(&mut line));
            line_len = 0;
        }
        if line_len > 0 {
            line.push(' ');
            line_len += 1;
        }
        line.extend(chars);
        line_len += word_len;
    }
    if line_len > 0 {
        lines.push(line);
    }
    lines
}

/// Encode for the standard 14 fonts' `WinAnsiEncoding`. Latin-1 maps
/// directly; typographic punctuation uses the 0x80-0x9F block; anything
/// else becomes `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20AC}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            c => match u8::try_from(u32::from(c)) {
                Ok(b) if !(0x80..0xA0).contains(&b) => b,
                _ => b'?',
            },
        })
        .collect()
}

fn lay_out(dossier: &Dossier) -> Vec<Vec<PlacedLine>> {
    let research = &dossier.research;
    let mut layout = Layout::new();

    layout.paragraph(
        &format!("Dossiê: {}", dossier.subject),
        Font::Bold,
        TITLE_SIZE,
        0.0,
    );

    let sections = [
        ("Resumo Executivo", &research.summary),
        ("História", &research.history),
        ("Visão de Futuro", &research.future_vision),
        ("Oportunidades de Negócio", &research.business_opportunities),
    ];
    for (title, body) in sections {
        if body.trim().is_empty() {
            continue;
        }
        layout.heading(title);
        layout.paragraph(body, Font::Regular, BODY_SIZE, 0.0);
    }

    if !research.facts.is_empty() {
        layout.heading("Fatos Relevantes");
        for fact in &research.facts {
            layout.bullet(fact);
        }
    }

    if !dossier.scripts.long.trim().is_empty() {
        layout.heading("Roteiro Completo");
        layout.paragraph(&dossier.scripts.long, Font::Regular, BODY_SIZE, 0.0);
    }

    for (title, people) in [
        ("Referências Brasileiras", &research.brazilian_references),
        ("Referências Globais", &research.global_references),
    ] {
        if people.is_empty() {
            continue;
        }
        layout.heading(title);
        for person in people {
            reference(&mut layout, person);
        }
    }

    if !research.sources.is_empty() {
        layout.heading("Fontes Consultadas");
        for source in &research.sources {
            layout.bullet(&format!("{} ({})", source.title, source.url));
        }
    }

    layout.finish()
}

fn reference(layout: &mut Layout, person: &ReferencePerson) {
    layout.bullet(&format!("{}: {}", person.name, person.relevance));
    layout.paragraph(
        &format!("Vídeo: {} {}", person.video_title, person.video_url),
        Font::Regular,
        BODY_SIZE - 1.0,
        LIST_INDENT * 2.0,
    );
}

fn text_ops(ops: &mut Vec<Operation>, text: &str, font: Font, size: f32, x: f32, y: f32) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "Tf",
        vec![font.resource_name().into(), size.into()],
    ));
    ops.push(Operation::new("Td", vec![x.into(), y.into()]));
    ops.push(Operation::new(
        "Tj",
        vec![Object::string_literal(win_ansi(text))],
    ));
    ops.push(Operation::new("ET", vec![]));
}

fn font_object(base_font: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Render the dossier as an A4 PDF: research sections, facts, the long
/// script, references and sources, with a page-number footer.
pub fn render_dossier_pdf(dossier: &Dossier) -> Result<Vec<u8>, ExportError> {
    let pages = lay_out(dossier);
    let total = pages.len();

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let regular_id = doc.add_object(font_object("Helvetica"));
    let bold_id = doc.add_object(font_object("Helvetica-Bold"));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            Font::Regular.resource_name() => regular_id,
            Font::Bold.resource_name() => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(total);
    for (index, lines) in pages.iter().enumerate() {
        let mut operations = Vec::with_capacity(lines.len() * 5 + 5);
        for line in lines {
            text_ops(
                &mut operations,
                &line.text,
                line.font,
                line.size,
                line.x,
                line.y,
            );
        }
        text_ops(
            &mut operations,
            &format!("Página {} de {total}", index + 1),
            Font::Regular,
            FOOTER_SIZE,
            PAGE_WIDTH / 2.0 - 30.0,
            FOOTER_Y,
        );

        let content = Content { operations }
            .encode()
            .map_err(|e| ExportError::Pdf(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id: ObjectId = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = i64::try_from(total).map_err(|e| ExportError::Pdf(e.to_string()))?;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    tracing::debug!(pages = total, bytes = bytes.len(), "dossier PDF rendered");
    Ok(bytes)
}
