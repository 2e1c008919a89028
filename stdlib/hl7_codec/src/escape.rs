//! Escape-sequence encoding and decoding.
//!
//! Encoding replaces delimiter characters with `\F\ \S\ \R\ \E\ \T\` tokens
//! and runs of CR/LF with a single `\X..\` hex token. Decoding reverses those
//! tokens plus the highlight (`\H\`, `\N\`) and line-break (`\.br\`)
//! directives. Decoding is a permissive scanner: anything it does not
//! understand is copied through, so it never fails.

use crate::encoding::Encoding;

/// Replacement for the `\H\` highlight-on directive.
pub const HIGHLIGHT_ON: &str = "<B>";
/// Replacement for the `\N\` highlight-off directive.
pub const HIGHLIGHT_OFF: &str = "</B>";
/// Replacement for the `\.br\` line-break directive.
pub const LINE_BREAK: &str = "<BR>";

const FORMATTING_COMMANDS: [&str; 8] = ["br", "sp", "in", "ti", "sk", "ce", "fi", "nf"];

impl Encoding {
    /// Escapes every delimiter, escape character and CR/LF in `text`.
    ///
    /// `decode(encode(s)) == s` holds for every `s`.
    pub fn encode(&self, text: &str) -> String {
        self.escape_text(text, false)
    }

    /// Escapes `text` for the wire while copying escape tokens that are
    /// already well formed.
    ///
    /// Stored values are kept in wire form, so a parsed `\F\` must render as
    /// `\F\` again. A stray escape character that does not open a valid token
    /// is still escaped.
    pub fn encode_preserving(&self, text: &str) -> String {
        self.escape_text(text, true)
    }

    /// Replaces escape tokens in `text` with the characters they stand for.
    ///
    /// Unrecognised tokens are copied verbatim, an empty token pair is
    /// dropped and an unterminated escape is copied literally.
    pub fn decode(&self, text: &str) -> String {
        let esc = self.escape;
        if !text.contains(esc) {
            return text.to_string();
        }
        let width = esc.len_utf8();
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find(esc) {
            out.push_str(&rest[..start]);
            let after = &rest[start + width..];
            let Some(end) = after.find(esc) else {
                out.push_str(&rest[start..]);
                return out;
            };
            self.decode_token(&after[..end], &mut out);
            rest = &after[end + width..];
        }
        out.push_str(rest);
        out
    }

    fn escape_text(&self, text: &str, keep_tokens: bool) -> String {
        let esc = self.escape;
        let chars: Vec<char> = text.chars().collect();
        let mut out = String::with_capacity(text.len());
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            if keep_tokens && c == esc {
                if let Some(end) = self.token_end(&chars, i) {
                    out.extend(&chars[i..=end]);
                    i = end + 1;
                    continue;
                }
            }
            if c == '\r' || c == '\n' {
                out.push(esc);
                out.push('X');
                while i < chars.len() && (chars[i] == '\r' || chars[i] == '\n') {
                    out.push_str(if chars[i] == '\r' { "0D" } else { "0A" });
                    i += 1;
                }
                out.push(esc);
                continue;
            }
            match self.escape_code(c) {
                Some(code) => {
                    out.push(esc);
                    out.push(code);
                    out.push(esc);
                }
                None => out.push(c),
            }
            i += 1;
        }
        out
    }

    fn escape_code(&self, c: char) -> Option<char> {
        if c == self.field {
            Some('F')
        } else if c == self.component {
            Some('S')
        } else if c == self.repetition {
            Some('R')
        } else if c == self.escape {
            Some('E')
        } else if c == self.subcomponent {
            Some('T')
        } else {
            None
        }
    }

    /// Index of the closing escape character when `chars[start]` opens a
    /// well-formed token.
    fn token_end(&self, chars: &[char], start: usize) -> Option<usize> {
        let offset = chars[start + 1..].iter().position(|c| *c == self.escape)?;
        let end = start + 1 + offset;
        let token: String = chars[start + 1..end].iter().collect();
        is_known_token(&token).then_some(end)
    }

    fn decode_token(&self, token: &str, out: &mut String) {
        match token {
            "" => {}
            "F" => out.push(self.field),
            "S" => out.push(self.component),
            "R" => out.push(self.repetition),
            "E" => out.push(self.escape),
            "T" => out.push(self.subcomponent),
            "H" => out.push_str(HIGHLIGHT_ON),
            "N" => out.push_str(HIGHLIGHT_OFF),
            ".br" => out.push_str(LINE_BREAK),
            _ => match token.strip_prefix('X').and_then(decode_hex) {
                Some(decoded) => out.push_str(&decoded),
                None => {
                    out.push(self.escape);
                    out.push_str(token);
                    out.push(self.escape);
                }
            },
        }
    }
}

fn is_known_token(token: &str) -> bool {
    match token {
        "F" | "S" | "R" | "E" | "T" | "H" | "N" => true,
        _ => {
            if let Some(command) = token.strip_prefix('.') {
                let name = command.get(..2).unwrap_or_default();
                let argument = command.get(2..).unwrap_or_default();
                FORMATTING_COMMANDS.contains(&name)
                    && argument
                        .chars()
                        .all(|c| c.is_ascii_digit() || c == '+' || c == '-')
            } else if let Some(hex) = token
                .strip_prefix('X')
                .or_else(|| token.strip_prefix('C'))
                .or_else(|| token.strip_prefix('M'))
            {
                is_hex_pairs(hex)
            } else {
                token.strip_prefix('Z').is_some_and(|body| {
                    !body.is_empty() && body.chars().all(|c| c.is_ascii_alphanumeric())
                })
            }
        }
    }
}

fn is_hex_pairs(hex: &str) -> bool {
    !hex.is_empty() && hex.len() % 2 == 0 && hex.chars().all(|c| c.is_ascii_hexdigit())
}

fn decode_hex(hex: &str) -> Option<String> {
    if !is_hex_pairs(hex) {
        return None;
    }
    let bytes = (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
        .collect::<Option<Vec<u8>>>()?;
    String::from_utf8(bytes).ok()
}
