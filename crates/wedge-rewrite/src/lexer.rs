//! JavaScript lexer preserving every input byte.
//!
//! Tokens carry their exact source slice, trivia included, so that
//! concatenating an untouched token stream reproduces the input byte for
//! byte. The only context-sensitive decision is `/`: it opens a regular
//! expression literal when the previous significant token cannot end an
//! expression, and is a plain operator otherwise. That single rule is why
//! this lexer is hand-written rather than table-driven.

use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Number,
    /// Single- or double-quoted string literal, quotes included in `text`.
    Str,
    /// Template literal, backticks and substitutions included in `text`.
    Template,
    /// Regular expression literal, delimiters and flags included.
    Regex,
    Punct,
    LineComment,
    BlockComment,
    Whitespace,
    Shebang,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Byte offset in the original source; zero for synthesized tokens.
    pub start: usize,
}

impl Token {
    pub fn synthetic(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            start: 0,
        }
    }

    /// Whitespace and comments carry no syntactic weight.
    pub fn is_trivia(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Whitespace | TokenKind::LineComment | TokenKind::BlockComment
                | TokenKind::Shebang
        )
    }

    /// Unquoted, unescaped value of a string literal token.
    ///
    /// Decodes the single-character escapes; numeric and unicode escapes
    /// are kept verbatim, which is enough for literal equality checks.
    pub fn str_value(&self) -> Option<String> {
        if self.kind != TokenKind::Str || self.text.len() < 2 {
            return None;
        }
        let inner = &self.text[1..self.text.len() - 1];
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some('t') => out.push('\t'),
                Some('b') => out.push('\u{8}'),
                Some('f') => out.push('\u{c}'),
                Some('v') => out.push('\u{b}'),
                Some('0') => out.push('\0'),
                Some('\n') => {} // line continuation
                Some(other) => out.push(other),
                None => return None,
            }
        }
        Some(out)
    }
}

/// Render a string as a single-quoted JavaScript literal.
pub fn js_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

/// Multi-character operators, longest first so the scanner munches maximally.
const PUNCTS: &[&str] = &[
    ">>>=", "...", "===", "!==", "**=", "<<=", ">>=", ">>>", "&&=", "||=", "??=", "=>", "==",
    "!=", "<=", ">=", "&&", "||", "??", "?.", "++", "--", "+=", "-=", "*=", "%=", "&=", "|=",
    "^=", "**", "<<", ">>",
];

/// Keywords after which `/` opens a regex literal.
const REGEX_PRECEDING_KEYWORDS: &[&str] = &[
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case",
    "do", "else", "yield", "await",
];

pub fn tokenize(src: &str) -> Result<Vec<Token>> {
    Lexer {
        src,
        bytes: src.as_bytes(),
        pos: 0,
        out: Vec::new(),
    }
    .run()
}

struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    out: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn run(mut self) -> Result<Vec<Token>> {
        if self.bytes.starts_with(b"#!") {
            let end = self.line_end(0);
            self.push(TokenKind::Shebang, 0, end);
        }
        while self.pos < self.bytes.len() {
            let start = self.pos;
            let b = self.bytes[start];
            match b {
                b' ' | b'\t' | b'\r' | b'\n' | 0x0b | 0x0c => {
                    while matches!(
                        self.bytes.get(self.pos),
                        Some(&(b' ' | b'\t' | b'\r' | b'\n' | 0x0b | 0x0c))
                    ) {
                        self.pos += 1;
                    }
                    self.push(TokenKind::Whitespace, start, self.pos);
                }
                b'/' if self.peek(1) == Some(b'/') => {
                    let end = self.line_end(start);
                    self.push(TokenKind::LineComment, start, end);
                }
                b'/' if self.peek(1) == Some(b'*') => {
                    let end = self.find_from(start + 2, b"*/").ok_or(Error::Unterminated {
                        kind: "block comment",
                        at: start,
                    })? + 2;
                    self.push(TokenKind::BlockComment, start, end);
                }
                b'/' if self.regex_allowed() => self.scan_regex(start)?,
                b'\'' | b'"' => self.scan_string(start, b)?,
                b'`' => {
                    let end = self.template_end(start)?;
                    self.push(TokenKind::Template, start, end);
                }
                b'0'..=b'9' => self.scan_number(start),
                b'.' if matches!(self.peek(1), Some(b'0'..=b'9')) => self.scan_number(start),
                _ if is_ident_start(b) => {
                    while self.pos < self.bytes.len() && is_ident_continue(self.bytes[self.pos]) {
                        self.pos += 1;
                    }
                    self.push(TokenKind::Ident, start, self.pos);
                }
                _ => {
                    let rest = &self.src[start..];
                    let len = PUNCTS
                        .iter()
                        .find(|p| rest.starts_with(**p))
                        .map(|p| p.len())
                        .unwrap_or(1);
                    self.push(TokenKind::Punct, start, start + len);
                }
            }
        }
        Ok(self.out)
    }

    fn push(&mut self, kind: TokenKind, start: usize, end: usize) {
        self.out.push(Token {
            kind,
            text: self.src[start..end].to_string(),
            start,
        });
        self.pos = end;
    }

    fn peek(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn line_end(&self, from: usize) -> usize {
        self.bytes[from..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|i| from + i)
            .unwrap_or(self.bytes.len())
    }

    fn find_from(&self, from: usize, needle: &[u8]) -> Option<usize> {
        if from > self.bytes.len() {
            return None;
        }
        self.bytes[from..]
            .windows(needle.len())
            .position(|w| w == needle)
            .map(|i| from + i)
    }

    /// `/` opens a regex when no expression can have just ended.
    fn regex_allowed(&self) -> bool {
        let Some(prev) = self.out.iter().rev().find(|t| !t.is_trivia()) else {
            return true;
        };
        match prev.kind {
            TokenKind::Ident => REGEX_PRECEDING_KEYWORDS.contains(&prev.text.as_str()),
            TokenKind::Number
            | TokenKind::Str
            | TokenKind::Template
            | TokenKind::Regex => false,
            TokenKind::Punct => !matches!(prev.text.as_str(), ")" | "]" | "++" | "--"),
            _ => true,
        }
    }

    fn scan_string(&mut self, start: usize, quote: u8) -> Result<()> {
        let mut i = start + 1;
        while i < self.bytes.len() {
            match self.bytes[i] {
                b'\\' => i += 2,
                b'\n' => break,
                b if b == quote => {
                    self.push(TokenKind::Str, start, i + 1);
                    return Ok(());
                }
                _ => i += 1,
            }
        }
        Err(Error::Unterminated {
            kind: "string literal",
            at: start,
        })
    }

    /// Regex literal: body until an unescaped `/` outside a character
    /// class, then any trailing flag letters.
    fn scan_regex(&mut self, start: usize) -> Result<()> {
        let mut i = start + 1;
        let mut in_class = false;
        loop {
            let Some(&b) = self.bytes.get(i) else {
                return Err(Error::Unterminated {
                    kind: "regex literal",
                    at: start,
                });
            };
            match b {
                b'\\' => i += 2,
                b'[' => {
                    in_class = true;
                    i += 1;
                }
                b']' => {
                    in_class = false;
                    i += 1;
                }
                b'/' if !in_class => {
                    i += 1;
                    break;
                }
                b'\n' => {
                    return Err(Error::Unterminated {
                        kind: "regex literal",
                        at: start,
                    });
                }
                _ => i += 1,
            }
        }
        while i < self.bytes.len() && self.bytes[i].is_ascii_alphabetic() {
            i += 1;
        }
        self.push(TokenKind::Regex, start, i);
        Ok(())
    }

    fn scan_number(&mut self, start: usize) {
        let mut i = start;
        while let Some(&b) = self.bytes.get(i) {
            if b.is_ascii_alphanumeric() || b == b'.' || b == b'_' {
                i += 1;
            } else if (b == b'+' || b == b'-')
                && matches!(self.bytes.get(i - 1), Some(&b'e') | Some(&b'E'))
            {
                i += 1;
            } else {
                break;
            }
        }
        self.push(TokenKind::Number, start, i);
    }

    /// End offset of a template literal, handling nested `${ ... }`
    /// substitutions that may themselves contain strings, comments, and
    /// further templates.
    fn template_end(&self, start: usize) -> Result<usize> {
        let mut i = start + 1;
        loop {
            let Some(&b) = self.bytes.get(i) else {
                return Err(Error::Unterminated {
                    kind: "template literal",
                    at: start,
                });
            };
            match b {
                b'\\' => i += 2,
                b'`' => return Ok(i + 1),
                b'$' if self.bytes.get(i + 1) == Some(&b'{') => {
                    i = self.substitution_end(i + 2, start)?;
                }
                _ => i += 1,
            }
        }
    }

    /// End offset (past the closing `}`) of a template substitution.
    fn substitution_end(&self, mut i: usize, template_start: usize) -> Result<usize> {
        let mut depth = 1usize;
        while depth > 0 {
            let Some(&b) = self.bytes.get(i) else {
                return Err(Error::Unterminated {
                    kind: "template literal",
                    at: template_start,
                });
            };
            match b {
                b'{' => {
                    depth += 1;
                    i += 1;
                }
                b'}' => {
                    depth -= 1;
                    i += 1;
                }
                b'\'' | b'"' => {
                    let end = self.skip_quoted(i, b, template_start)?;
                    i = end;
                }
                b'`' => {
                    i = self.template_end(i)?;
                }
                b'/' if self.bytes.get(i + 1) == Some(&b'/') => {
                    i = self.line_end(i);
                }
                b'/' if self.bytes.get(i + 1) == Some(&b'*') => {
                    i = self.find_from(i + 2, b"*/").ok_or(Error::Unterminated {
                        kind: "block comment",
                        at: i,
                    })? + 2;
                }
                _ => i += 1,
            }
        }
        Ok(i)
    }

    fn skip_quoted(&self, start: usize, quote: u8, outer: usize) -> Result<usize> {
        let mut i = start + 1;
        while let Some(&b) = self.bytes.get(i) {
            match b {
                b'\\' => i += 2,
                b if b == quote => return Ok(i + 1),
                _ => i += 1,
            }
        }
        Err(Error::Unterminated {
            kind: "template literal",
            at: outer,
        })
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$' || b >= 0x80
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(tokens: &[Token]) -> String {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn round_trips_byte_for_byte() {
        let src = "#!/usr/bin/env node\n'use strict';\n// comment\nconst x = a / b / c;\nconst re = /ab[/]c/gi;\nconst t = `sum ${a + `${b}`} done`;\n/* block */ spawn.sync('node', [require.resolve('../x')]);\n";
        let tokens = tokenize(src).unwrap();
        assert_eq!(render(&tokens), src);
    }

    #[test]
    fn vertical_tab_and_form_feed_lex_as_whitespace() {
        // U+000B and U+000C are WhiteSpace per ECMA-262 but not ASCII
        // whitespace, so the scan must advance past them on its own
        let src = "a\u{000b}b\u{000c}c";
        let tokens = tokenize(src).unwrap();
        assert_eq!(render(&tokens), src);
        assert_eq!(
            tokens
                .iter()
                .filter(|t| t.kind == TokenKind::Whitespace)
                .count(),
            2
        );
        assert!(tokens.iter().all(|t| !t.text.is_empty()));
    }

    #[test]
    fn division_is_not_a_regex() {
        let tokens = tokenize("const a = b / c / d;").unwrap();
        assert!(tokens.iter().all(|t| t.kind != TokenKind::Regex));
    }

    #[test]
    fn regex_after_operator_and_at_start() {
        let tokens = tokenize("/^x$/.test(s) && y = /a\\/b/g;").unwrap();
        let regexes: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Regex)
            .collect();
        assert_eq!(regexes.len(), 2);
        assert_eq!(regexes[0].text, "/^x$/");
        assert_eq!(regexes[1].text, "/a\\/b/g");
    }

    #[test]
    fn string_value_decodes_escapes() {
        let tokens = tokenize(r"'a\\b\'c'").unwrap();
        assert_eq!(tokens[0].str_value().unwrap(), r"a\b'c");
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert!(tokenize("const s = 'oops\n").is_err());
    }

    #[test]
    fn js_string_escapes_backslashes() {
        assert_eq!(js_string(r"C:\x\y"), r"'C:\\x\\y'");
        assert_eq!(js_string("-r"), "'-r'");
    }
}
