//! Small text helpers shared by the renderers

/// Compact duration for timeline lines: "2m 5s", "42s"; `?` when unknown or zero
pub fn format_duration(ms: Option<i64>) -> String {
    match ms {
        Some(ms) if ms > 0 => {
            let minutes = ms / 60_000;
            let seconds = (ms % 60_000) / 1000;
            if minutes > 0 { format!("{}m {}s", minutes, seconds) } else { format!("{}s", seconds) }
        }
        _ => "?".to_string(),
    }
}

/// Duration for listings: hours when large, `<1s` when tiny, empty when unknown
pub fn format_duration_long(ms: Option<i64>) -> String {
    let Some(ms) = ms.filter(|ms| *ms > 0) else {
        return String::new();
    };

    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1000;

    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else if seconds > 0 {
        format!("{}s", seconds)
    } else {
        "<1s".to_string()
    }
}

/// Make log-controlled text safe for a single terminal line
///
/// Drops ESC-introduced sequences (CSI like `ESC[31m`, OSC like
/// `ESC]0;title BEL`, and two-byte escapes), turns line breaks and tabs
/// into spaces, and removes every other control character.
pub fn sanitize_line(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\x1b' => match chars.next() {
                // CSI: parameters until a final byte in '@'..='~'
                Some('[') => {
                    for c in chars.by_ref() {
                        if ('@'..='~').contains(&c) {
                            break;
                        }
                    }
                }
                // OSC: until BEL or ESC '\'
                Some(']') => {
                    while let Some(c) = chars.next() {
                        if c == '\x07' {
                            break;
                        }
                        if c == '\x1b' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            },
            '\n' | '\r' | '\t' => out.push(' '),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }

    out
}

/// First `max` characters of `text`
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
