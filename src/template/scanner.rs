use crate::error::SqlMarshalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Normal,
    AtMarker,
    InQuote,
    Error(&'static str),
}

fn closes_marker(next: Option<char>) -> bool {
    match next {
        None => true,
        Some(c) => c.is_whitespace() || c == ',' || c == ')',
    }
}

/// Count the positional placeholders in `text`.
///
/// A `marker` is only a placeholder when it is followed by whitespace, `,`, `)` or the
/// end of the text; regions between `delim` characters are skipped, with a doubled
/// delimiter standing for one literal delimiter. Empty text, or a NUL marker or
/// delimiter, counts zero.
///
/// # Errors
/// Returns `SqlMarshalError::MalformedSql` for a marker glued to another character, an
/// unterminated quoted region, or an escaped delimiter at the very end of the text.
pub fn count_placeholders(text: &str, marker: char, delim: char) -> Result<usize, SqlMarshalError> {
    if text.is_empty() || marker == '\0' || delim == '\0' {
        return Ok(0);
    }

    let mut count = 0;
    let mut state = State::Start;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        let next = chars.peek().copied();
        state = match state {
            State::Start | State::Normal | State::AtMarker => {
                if ch == delim {
                    State::InQuote
                } else if ch == marker {
                    if closes_marker(next) {
                        count += 1;
                        State::AtMarker
                    } else {
                        State::Error("placeholder followed by an unexpected character")
                    }
                } else {
                    State::Normal
                }
            }
            State::InQuote => {
                if ch != delim {
                    State::InQuote
                } else if next == Some(delim) {
                    chars.next();
                    if chars.peek().is_none() {
                        State::Error("escaped delimiter at end of text")
                    } else {
                        State::InQuote
                    }
                } else {
                    State::Normal
                }
            }
            State::Error(_) => state,
        };

        if let State::Error(reason) = state {
            return Err(malformed(text, reason));
        }
    }

    if state == State::InQuote {
        return Err(malformed(text, "unterminated quoted region"));
    }
    Ok(count)
}

fn malformed(text: &str, reason: &'static str) -> SqlMarshalError {
    SqlMarshalError::MalformedSql {
        sql: text.to_string(),
        reason,
    }
}
