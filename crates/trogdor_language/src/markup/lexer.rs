//! Tokenizer for markup game definitions.
//!
//! Produces a stream of open tags, close tags and text. Self-closing tags
//! produce an open tag immediately followed by a matching close tag.
//! Comments, processing instructions, the doctype and whitespace-only text
//! are skipped. Nesting is checked as the stream is produced.

use trogdor_foundation::{Error, Result};

use crate::lexer::{Pushback, TokenStream};

/// A markup token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MarkupToken {
    /// `<name attr="value">`
    Open {
        /// Tag name.
        name: String,
        /// Attributes in source order.
        attributes: Vec<(String, String)>,
        /// Nesting depth; the document element is at depth 0.
        depth: usize,
        /// 1-based source line.
        line: usize,
    },
    /// `</name>`
    Close {
        /// Tag name.
        name: String,
        /// Depth of the matching open tag.
        depth: usize,
        /// 1-based source line.
        line: usize,
    },
    /// Character data, with entities decoded.
    Text {
        /// The decoded text.
        value: String,
        /// Depth of the enclosing element's children.
        depth: usize,
        /// 1-based source line.
        line: usize,
    },
    /// End of the document.
    Eof {
        /// 1-based source line.
        line: usize,
    },
}

impl MarkupToken {
    /// Returns the token's source line.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::Open { line, .. }
            | Self::Close { line, .. }
            | Self::Text { line, .. }
            | Self::Eof { line } => *line,
        }
    }
}

/// Markup tokenizer.
pub struct MarkupLexer<'src> {
    /// Remaining unconsumed source.
    rest: &'src str,
    /// Current 1-based line.
    line: usize,
    /// Names of currently open elements.
    open: Vec<String>,
    /// Close token owed for a self-closing tag.
    pending_close: Option<MarkupToken>,
    /// Whether the document element has been closed.
    finished_root: bool,
    pushback: Pushback<MarkupToken>,
}

impl<'src> MarkupLexer<'src> {
    /// Creates a new lexer for the given source.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            rest: source,
            line: 1,
            open: Vec::new(),
            pending_close: None,
            finished_root: false,
            pushback: Pushback::new(),
        }
    }

    /// Tokenizes the whole source.
    ///
    /// # Errors
    ///
    /// Returns the first lex error encountered.
    pub fn tokenize_all(source: &str) -> Result<Vec<MarkupToken>> {
        let mut lexer = MarkupLexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next()?;
            let done = matches!(token, MarkupToken::Eof { .. });
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn scan(&mut self) -> Result<MarkupToken> {
        if let Some(close) = self.pending_close.take() {
            return Ok(close);
        }
        loop {
            if self.rest.is_empty() {
                if let Some(name) = self.open.last() {
                    return Err(Error::lex(
                        format!("unexpected end of document, <{name}> is not closed"),
                        self.line,
                    ));
                }
                return Ok(MarkupToken::Eof { line: self.line });
            }

            if self.rest.starts_with("<!--") {
                self.skip_past("-->", "comment")?;
            } else if self.rest.starts_with("<![CDATA[") {
                let line = self.line;
                self.advance("<![CDATA[".len());
                let end = self.find_or_fail("]]>", "CDATA section")?;
                let value = self.rest[..end].to_string();
                self.advance(end + "]]>".len());
                return self.text_token(value, line);
            } else if self.rest.starts_with("<?") {
                self.skip_past("?>", "processing instruction")?;
            } else if self.rest.starts_with("<!") {
                self.skip_past(">", "declaration")?;
            } else if self.rest.starts_with("</") {
                return self.scan_close();
            } else if self.rest.starts_with('<') {
                return self.scan_open();
            } else {
                let line = self.line;
                let end = self.rest.find('<').unwrap_or(self.rest.len());
                let raw = &self.rest[..end];
                if raw.trim().is_empty() {
                    self.advance(end);
                    continue;
                }
                let value = decode_entities(raw, line)?;
                self.advance(end);
                return self.text_token(value, line);
            }
        }
    }

    fn text_token(&self, value: String, line: usize) -> Result<MarkupToken> {
        if self.open.is_empty() {
            return Err(Error::lex("text outside of the document element", line));
        }
        Ok(MarkupToken::Text {
            value,
            depth: self.open.len(),
            line,
        })
    }

    fn scan_open(&mut self) -> Result<MarkupToken> {
        let line = self.line;
        if self.finished_root {
            return Err(Error::lex("only one document element is allowed", line));
        }
        self.advance(1);
        let name = self.scan_name()?;
        let mut attributes = Vec::new();
        loop {
            self.skip_whitespace();
            if self.rest.starts_with("/>") {
                self.advance(2);
                let depth = self.open.len();
                if depth == 0 {
                    self.finished_root = true;
                }
                self.pending_close = Some(MarkupToken::Close {
                    name: name.clone(),
                    depth,
                    line: self.line,
                });
                return Ok(MarkupToken::Open {
                    name,
                    attributes,
                    depth,
                    line,
                });
            }
            if self.rest.starts_with('>') {
                self.advance(1);
                let depth = self.open.len();
                self.open.push(name.clone());
                return Ok(MarkupToken::Open {
                    name,
                    attributes,
                    depth,
                    line,
                });
            }
            let attribute = self.scan_name()?;
            self.skip_whitespace();
            if !self.rest.starts_with('=') {
                return Err(Error::lex(
                    format!("attribute \"{attribute}\" of <{name}> has no value"),
                    self.line,
                ));
            }
            self.advance(1);
            self.skip_whitespace();
            let value = self.scan_quoted()?;
            if attributes.iter().any(|(a, _)| *a == attribute) {
                return Err(Error::lex(
                    format!("attribute \"{attribute}\" repeated on <{name}>"),
                    self.line,
                ));
            }
            attributes.push((attribute, value));
        }
    }

    fn scan_close(&mut self) -> Result<MarkupToken> {
        let line = self.line;
        self.advance(2);
        let name = self.scan_name()?;
        self.skip_whitespace();
        if !self.rest.starts_with('>') {
            return Err(Error::lex(format!("malformed closing tag </{name}"), self.line));
        }
        self.advance(1);
        match self.open.pop() {
            Some(open) if open == name => {}
            Some(open) => {
                return Err(Error::lex(
                    format!("expected closing </{open}> but found </{name}>"),
                    line,
                ));
            }
            None => {
                return Err(Error::lex(format!("unexpected closing </{name}>"), line));
            }
        }
        if self.open.is_empty() {
            self.finished_root = true;
        }
        Ok(MarkupToken::Close {
            name,
            depth: self.open.len(),
            line,
        })
    }

    fn scan_name(&mut self) -> Result<String> {
        let end = self
            .rest
            .find(|c: char| !(c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')))
            .unwrap_or(self.rest.len());
        if end == 0 {
            let found = self.rest.chars().next().map_or_else(
                || "end of document".to_string(),
                |c| format!("'{c}'"),
            );
            return Err(Error::lex(format!("expected a name, found {found}"), self.line));
        }
        let name = self.rest[..end].to_string();
        self.advance(end);
        Ok(name)
    }

    fn scan_quoted(&mut self) -> Result<String> {
        let line = self.line;
        let Some(quote) = self.rest.chars().next().filter(|c| matches!(c, '"' | '\'')) else {
            return Err(Error::lex("attribute values must be quoted", line));
        };
        self.advance(1);
        let Some(end) = self.rest.find(quote) else {
            return Err(Error::lex("unterminated attribute value", line));
        };
        let value = decode_entities(&self.rest[..end], line)?;
        self.advance(end + 1);
        Ok(value)
    }

    fn skip_whitespace(&mut self) {
        let end = self
            .rest
            .find(|c: char| !c.is_whitespace())
            .unwrap_or(self.rest.len());
        self.advance(end);
    }

    fn skip_past(&mut self, terminator: &str, what: &str) -> Result<()> {
        let end = self.find_or_fail(terminator, what)?;
        self.advance(end + terminator.len());
        Ok(())
    }

    fn find_or_fail(&self, terminator: &str, what: &str) -> Result<usize> {
        self.rest
            .find(terminator)
            .ok_or_else(|| Error::lex(format!("unterminated {what}"), self.line))
    }

    /// Consumes `len` bytes, counting newlines.
    fn advance(&mut self, len: usize) {
        let (consumed, rest) = self.rest.split_at(len);
        self.line += consumed.matches('\n').count();
        self.rest = rest;
    }
}

impl TokenStream for MarkupLexer<'_> {
    type Token = MarkupToken;

    fn next(&mut self) -> Result<MarkupToken> {
        if let Some(token) = self.pushback.pop() {
            return Ok(token);
        }
        let token = self.scan()?;
        self.pushback.produced(&token);
        Ok(token)
    }

    fn peek(&self) -> Option<&MarkupToken> {
        self.pushback.last()
    }

    fn push(&mut self, token: MarkupToken) {
        self.pushback.push(token);
    }
}

/// Decodes the predefined entities and numeric character references.
fn decode_entities(raw: &str, line: usize) -> Result<String> {
    if !raw.contains('&') {
        return Ok(raw.to_string());
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        rest = &rest[start + 1..];
        let Some(end) = rest.find(';') else {
            return Err(Error::lex("unterminated entity reference", line));
        };
        let entity = &rest[..end];
        let decoded = match entity {
            "lt" => Some('<'),
            "gt" => Some('>'),
            "amp" => Some('&'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
                .map(|hex| u32::from_str_radix(hex, 16))
                .or_else(|| entity.strip_prefix('#').map(str::parse))
                .and_then(std::result::Result::ok)
                .and_then(char::from_u32),
        };
        let Some(c) = decoded else {
            return Err(Error::lex(format!("unknown entity &{entity};"), line));
        };
        out.push(c);
        rest = &rest[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}
