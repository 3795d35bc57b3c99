//! Partial result extraction.
//!
//! Recovers the best-effort [`PartialResult`] from the text a generation
//! service has streamed so far. The buffer is almost always a truncated
//! JSON document: cut inside a string, a key, or between delimiters. The
//! extraction is stateless and re-derives everything from the whole buffer
//! on every call.
//!
//! Strategy, in priority order:
//! 1. Strip a markdown code fence if the producer wrapped its output in one.
//! 2. Parse the whole body as a [`StructuredResult`]. This only succeeds once
//!    the document is complete.
//! 3. Otherwise recover `score`, `rules` and `improvedPrompt` independently
//!    with a small scanner tuned to the fixed result shape.

use tracing::trace;

use crate::domain::models::{
    PartialResult, RuleEvaluation, RuleStatus, StructuredResult, MAX_SCORE,
};

const FENCE: &str = "```";

/// Extract whatever can be recovered from `buffer`.
///
/// Returns `None` when nothing is extractable yet. Never panics; malformed
/// or truncated input is the expected steady state.
pub fn extract(buffer: &str) -> Option<PartialResult> {
    let body = strip_code_fence(buffer);
    if body.is_empty() {
        return None;
    }

    if let Ok(result) = serde_json::from_str::<StructuredResult>(body) {
        let mut partial = PartialResult::from(result);
        partial.score = partial.score.filter(|score| *score <= MAX_SCORE);
        return Some(partial);
    }

    let partial = PartialResult {
        score: extract_score(body),
        rules: extract_rules(body),
        improved_prompt: extract_improved_prompt(body),
    };

    (!partial.is_empty()).then_some(partial)
}

/// Remove a surrounding markdown code fence, if any.
///
/// The opening fence line (with its optional language tag) is dropped along
/// with a trailing closing fence. A buffer that is still only the opening
/// fence line yields an empty body.
pub fn strip_code_fence(buffer: &str) -> &str {
    let trimmed = buffer.trim();
    let Some(after_fence) = trimmed.strip_prefix(FENCE) else {
        return trimmed;
    };

    let Some(newline) = after_fence.find('\n') else {
        return "";
    };

    let body = after_fence[newline + 1..].trim_end();
    body.strip_suffix(FENCE).unwrap_or(body).trim()
}

fn extract_score(text: &str) -> Option<u8> {
    let mut cursor = Cursor::new(text, value_start(text, "score")?);
    let digits = cursor.digits();
    if digits.is_empty() {
        return None;
    }

    let value: u32 = digits.parse().ok()?;
    match cursor.peek() {
        // One more digit could still arrive ("1" becoming "10").
        None if value != 0 && value.saturating_mul(10) <= u32::from(MAX_SCORE) => return None,
        Some(b'.' | b'e' | b'E') => return None,
        _ => {}
    }

    // Out-of-range scores are dropped rather than surfaced.
    u8::try_from(value).ok().filter(|score| *score <= MAX_SCORE)
}

fn extract_rules(text: &str) -> Option<Vec<RuleEvaluation>> {
    let mut cursor = Cursor::new(text, value_start(text, "rules")?);
    if !cursor.eat(b'[') {
        return None;
    }

    let mut rules = Vec::new();
    let mut closed = false;

    loop {
        cursor.skip_whitespace();
        match cursor.peek() {
            Some(b',') => cursor.advance(),
            Some(b'{') => match scan_record(&mut cursor) {
                Some(Some(rule)) => rules.push(rule),
                Some(None) => trace!(offset = cursor.pos, "skipping malformed rule record"),
                // Open record: it will be picked up whole once more text arrives.
                None => break,
            },
            Some(b']') => {
                closed = true;
                break;
            }
            _ => break,
        }
    }

    (closed || !rules.is_empty()).then_some(rules)
}

/// Scan one `{...}` rule record starting at its opening brace.
///
/// Returns `None` when the record is truncated or not made of string
/// members (scanning cannot continue past it), and `Some(None)` when it is
/// closed but lacks a required field or has an unknown status.
fn scan_record(cursor: &mut Cursor<'_>) -> Option<Option<RuleEvaluation>> {
    cursor.advance();

    let mut rule = None;
    let mut status = None;
    let mut feedback = None;
    let mut recommendation = None;

    loop {
        cursor.skip_whitespace();
        match cursor.peek()? {
            b'}' => {
                cursor.advance();
                break;
            }
            b',' => cursor.advance(),
            b'"' => {
                let key = cursor.string_literal()?;
                cursor.skip_whitespace();
                if !cursor.eat(b':') {
                    return None;
                }
                cursor.skip_whitespace();
                if cursor.peek()? != b'"' {
                    return None;
                }
                let value = cursor.string_literal()?;

                match key.as_str() {
                    "rule" => rule = Some(value),
                    "status" => status = Some(value),
                    "feedback" => feedback = Some(value),
                    "recommendation" => recommendation = Some(value),
                    _ => {}
                }
            }
            _ => return None,
        }
    }

    let evaluation = match (rule, status, feedback, recommendation) {
        (Some(rule), Some(status), Some(feedback), Some(recommendation)) => {
            status.parse::<RuleStatus>().ok().map(|status| RuleEvaluation {
                rule,
                status,
                feedback,
                recommendation,
            })
        }
        _ => None,
    };

    Some(evaluation)
}

fn extract_improved_prompt(text: &str) -> Option<String> {
    let mut cursor = Cursor::new(text, value_start(text, "improvedPrompt")?);
    if cursor.peek()? != b'"' {
        return None;
    }
    // Still-open literal: hold the field back rather than show a cut sentence.
    cursor.string_literal()
}

/// Byte offset of the value following `"key":`, skipping whitespace.
///
/// Key text inside string values is always escaped (`\"key\"`), so an
/// unescaped `"key"` followed by a colon is structural.
fn value_start(text: &str, key: &str) -> Option<usize> {
    let needle = format!("\"{key}\"");
    let mut from = 0;

    while let Some(found) = text[from..].find(&needle) {
        let mut cursor = Cursor::new(text, from + found + needle.len());
        cursor.skip_whitespace();
        if cursor.eat(b':') {
            cursor.skip_whitespace();
            return Some(cursor.pos);
        }
        from += found + 1;
    }

    None
}

/// Forward-only scanner over the buffer. Positions always sit on ASCII
/// structural characters, so they are valid char boundaries.
struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str, pos: usize) -> Self {
        Self { text, pos }
    }

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.advance();
        }
    }

    fn digits(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.advance();
        }
        &self.text[start..self.pos]
    }

    /// Decode the string literal whose opening quote is at the cursor.
    ///
    /// Returns `None` if no unescaped closing quote has arrived yet. Escaped
    /// characters are skipped when looking for the terminator.
    fn string_literal(&mut self) -> Option<String> {
        let start = self.pos + 1;
        let mut decoded = String::new();
        let mut chars = self.text.get(start..)?.char_indices();

        while let Some((offset, ch)) = chars.next() {
            match ch {
                '"' => {
                    self.pos = start + offset + 1;
                    return Some(decoded);
                }
                '\\' => {
                    let (_, escaped) = chars.next()?;
                    match escaped {
                        'n' => decoded.push('\n'),
                        't' => decoded.push('\t'),
                        'r' => decoded.push('\r'),
                        'b' => decoded.push('\u{8}'),
                        'f' => decoded.push('\u{c}'),
                        'u' => decoded.push(unicode_escape(&mut chars)?),
                        // `\"`, `\\`, `\/`, and anything the producer escaped needlessly
                        other => decoded.push(other),
                    }
                }
                other => decoded.push(other),
            }
        }

        None
    }
}

/// Decode the `XXXX` of a `\uXXXX` escape, joining surrogate pairs.
/// Returns `None` if the escape is cut off by the end of the buffer.
fn unicode_escape(chars: &mut std::str::CharIndices<'_>) -> Option<char> {
    let code = hex4(chars)?;

    if !(0xD800..0xDC00).contains(&code) {
        return Some(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
    }

    let mut lookahead = chars.clone();
    match (lookahead.next(), lookahead.next()) {
        (Some((_, '\\')), Some((_, 'u'))) => {
            let low = hex4(&mut lookahead)?;
            if (0xDC00..0xE000).contains(&low) {
                *chars = lookahead;
                let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                Some(char::from_u32(combined).unwrap_or(char::REPLACEMENT_CHARACTER))
            } else {
                Some(char::REPLACEMENT_CHARACTER)
            }
        }
        (None, _) | (Some((_, '\\')), None) => None,
        _ => Some(char::REPLACEMENT_CHARACTER),
    }
}

fn hex4(chars: &mut std::str::CharIndices<'_>) -> Option<u32> {
    let mut code = 0;
    for _ in 0..4 {
        let (_, ch) = chars.next()?;
        code = code * 16 + ch.to_digit(16)?;
    }
    Some(code)
}
