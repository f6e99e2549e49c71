//! Model response cleanup applied before JSON parsing.

const FENCE: &str = "```";

/// Remove zero-width and bidi formatting characters that break `serde_json`.
pub fn remove_invisible_chars(text: &str) -> String {
    text.chars()
        .filter(|c| {
            !matches!(
                *c,
                '\u{200B}'..='\u{200F}' | '\u{202A}'..='\u{202E}' | '\u{2060}'..='\u{2064}' | '\u{FEFF}'
            )
        })
        .collect()
}

/// Replace typographic quotes with their ASCII forms.
pub fn normalize_quotes(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => '"',
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => '\'',
            other => other,
        })
        .collect()
}

/// Return the body of a fenced code block if the text has one.
///
/// The last ```` ```json ```` block wins; otherwise the first bare fence is
/// used. Text without fences comes back trimmed.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();

    if let Some(pos) = trimmed.rfind("```json") {
        let body = &trimmed[pos + "```json".len()..];
        return match body.find(FENCE) {
            Some(end) => body[..end].trim(),
            None => body.trim(),
        };
    }

    if let Some(start) = trimmed.find(FENCE) {
        let body = &trimmed[start + FENCE.len()..];
        // Skip a language tag on the opening fence line.
        let body = match body.find('\n') {
            Some(nl) if !body[..nl].trim_start().starts_with('{') => &body[nl + 1..],
            _ => body,
        };
        return match body.find(FENCE) {
            Some(end) => body[..end].trim(),
            None => body.trim(),
        };
    }

    trimmed
}

/// Full cleanup: invisible characters, quotes, then fences.
pub fn sanitize_response(raw: &str) -> String {
    let cleaned = normalize_quotes(&remove_invisible_chars(raw));
    strip_code_fences(&cleaned).to_string()
}
