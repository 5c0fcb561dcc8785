//! SSML helpers

/// Wrap plain text in a single-voice SSML document
///
/// The text is XML-escaped; voice and language are inserted as attributes.
#[must_use]
pub fn wrap_text(text: &str, voice: &str, language: &str) -> String {
    format!(
        "<speak version=\"1.0\" xmlns=\"http://www.w3.org/2001/10/synthesis\" \
         xml:lang=\"{lang}\"><voice name=\"{voice}\">{text}</voice></speak>",
        lang = escape(language),
        voice = escape(voice),
        text = escape(text),
    )
}

/// Escape the five XML special characters
#[must_use]
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
