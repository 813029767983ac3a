use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Convert arbitrary text into a filesystem-safe token.
///
/// Decomposes accented characters and strips the combining marks, replaces
/// runs of anything outside `[a-zA-Z0-9_-]` with a single hyphen, trims
/// leading/trailing hyphens and lowercases the result.
pub fn sanitize_token(s: &str) -> String {
    let folded: String = s.nfd().filter(|c| !is_combining_mark(*c)).collect();

    let mut out = String::with_capacity(folded.len());
    for c in folded.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            out.push(c);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }

    // Collapse hyphen runs that came from the input itself
    let mut collapsed = String::with_capacity(out.len());
    for c in out.chars() {
        if c == '-' && collapsed.ends_with('-') {
            continue;
        }
        collapsed.push(c);
    }

    collapsed.trim_matches('-').to_ascii_lowercase()
}

/// Normalize raw price text into a canonical decimal-comma string.
///
/// Accepts both Brazilian ("1.199,9") and dot-decimal ("19.90") inputs and
/// produces `<digits>,<2 digits>`, or the empty string when nothing numeric
/// remains after stripping.
pub fn normalize_price_br(raw: &str) -> String {
    let stripped: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();
    if stripped.is_empty() {
        return String::new();
    }

    if stripped.contains(',') {
        // Comma is the decimal separator; dots are thousands separators
        let cleaned = stripped.replace('.', "");
        let mut parts = cleaned.split(',');
        let int_part = parts.next().unwrap_or("");
        let frac_part = parts.next().unwrap_or("00");

        let mut frac = frac_part.to_string();
        while frac.len() < 2 {
            frac.push('0');
        }
        frac.truncate(2);

        return format!("{int_part},{frac}");
    }

    // Dot-decimal (or bare integer) input
    match stripped.parse::<f64>() {
        Ok(value) if value.is_finite() => format!("{value:.2}").replace('.', ","),
        _ => String::new(),
    }
}
