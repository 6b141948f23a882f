use dossier_sdk::ScriptMode;

const FALLBACK_SLUG: &str = "assunto";

/// `podcast-{slug}-{mode}.wav`
#[must_use]
pub fn wav_filename(subject: &str, mode: ScriptMode) -> String {
    format!("podcast-{}-{mode}.wav", slugify(subject))
}

/// `dossie-{slug}.pdf`
#[must_use]
pub fn pdf_filename(subject: &str) -> String {
    format!("dossie-{}.pdf", slugify(subject))
}

/// Lower-cased, accent-folded subject with every run of other characters
/// collapsed to a single `-`.
#[must_use]
pub fn slugify(subject: &str) -> String {
    let mut slug = String::with_capacity(subject.len());
    let mut pending_dash = false;

    for c in subject.chars().flat_map(char::to_lowercase).map(fold_accent) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

fn fold_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}
