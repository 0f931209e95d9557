//! Pull-style tag reader over the markup token stream.
//!
//! The parser walks a document with a handful of primitives: advance to the
//! next tag, inspect its name, depth and attributes, read a leaf value, and
//! insist on a closing tag. Loops over an element's children compare depths
//! to notice when the parent's closing tag has been reached.

use trogdor_foundation::{Error, Result};

use crate::lexer::TokenStream;
use crate::markup::lexer::{MarkupLexer, MarkupToken};

/// Pull-style reader over a markup document.
pub struct MarkupReader<'src> {
    lexer: MarkupLexer<'src>,
    current: MarkupToken,
    /// Whether the current close tag was already matched by `check_closing_tag`.
    close_checked: bool,
}

impl<'src> MarkupReader<'src> {
    /// Creates a reader positioned before the first tag.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            lexer: MarkupLexer::new(source),
            current: MarkupToken::Eof { line: 1 },
            close_checked: false,
        }
    }

    /// Advances to the next open or close tag. Returns false at the end of
    /// the document.
    ///
    /// # Errors
    ///
    /// Returns a parse error if text appears where a tag was expected, or
    /// a lex error from the tokenizer.
    pub fn next_tag(&mut self) -> Result<bool> {
        let token = self.lexer.next()?;
        if let MarkupToken::Text { value, line, .. } = &token {
            return Err(Error::parse(
                format!("expected a tag but found text \"{}\"", value.trim()),
                *line,
            ));
        }
        let more = !matches!(token, MarkupToken::Eof { .. });
        self.current = token;
        self.close_checked = false;
        Ok(more)
    }

    /// Returns true if the reader is on an opening tag.
    #[must_use]
    pub const fn is_opening(&self) -> bool {
        matches!(self.current, MarkupToken::Open { .. })
    }

    /// Returns the name of the current tag, or the empty string at the end
    /// of the document.
    #[must_use]
    pub fn tag_name(&self) -> &str {
        match &self.current {
            MarkupToken::Open { name, .. } | MarkupToken::Close { name, .. } => name,
            _ => "",
        }
    }

    /// Returns the depth of the current tag.
    #[must_use]
    pub const fn depth(&self) -> usize {
        match &self.current {
            MarkupToken::Open { depth, .. }
            | MarkupToken::Close { depth, .. }
            | MarkupToken::Text { depth, .. } => *depth,
            MarkupToken::Eof { .. } => 0,
        }
    }

    /// Returns the line of the current token.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.current.line()
    }

    /// Returns true if the reader is on an opening tag at `depth`, which is
    /// how child loops recognize their next child.
    #[must_use]
    pub const fn is_child_at(&self, depth: usize) -> bool {
        self.is_opening() && self.depth() == depth
    }

    /// Returns a required attribute of the current opening tag.
    ///
    /// # Errors
    ///
    /// Returns a parse error if the attribute is missing or empty.
    pub fn attribute(&self, name: &str) -> Result<&str> {
        match self.optional_attribute(name) {
            Some(value) if !value.trim().is_empty() => Ok(value.trim()),
            _ => Err(Error::parse(
                format!("<{}> requires the attribute \"{name}\"", self.tag_name()),
                self.line(),
            )),
        }
    }

    /// Returns an attribute of the current opening tag, if present.
    #[must_use]
    pub fn optional_attribute(&self, name: &str) -> Option<&str> {
        let MarkupToken::Open { attributes, .. } = &self.current else {
            return None;
        };
        attributes
            .iter()
            .find(|(attribute, _)| attribute == name)
            .map(|(_, value)| value.as_str())
    }

    /// Reads the text content of the current leaf tag, trimmed. Does not
    /// consume the closing tag.
    ///
    /// # Errors
    ///
    /// Returns a parse error if the tag has no text or only whitespace.
    pub fn node_value(&mut self) -> Result<String> {
        let tag = self.tag_name().to_string();
        let line = self.line();
        match self.lexer.next()? {
            MarkupToken::Text { value, .. } if !value.trim().is_empty() => {
                Ok(value.trim().to_string())
            }
            other => {
                self.lexer.push(other);
                Err(Error::parse(format!("<{tag}> requires a value"), line))
            }
        }
    }

    /// Reads the current leaf tag's value and its closing tag.
    ///
    /// # Errors
    ///
    /// Returns a parse error if the value is missing or the tag does not
    /// close immediately afterwards.
    pub fn leaf_value(&mut self) -> Result<String> {
        let tag = self.tag_name().to_string();
        let value = self.node_value()?;
        self.check_closing_tag(&tag)?;
        Ok(value)
    }

    /// Consumes the closing tag `</expected>`. If the reader is already on
    /// that closing tag, which is where a child loop stops, it is accepted
    /// without advancing.
    ///
    /// # Errors
    ///
    /// Returns a parse error if anything else comes next.
    pub fn check_closing_tag(&mut self, expected: &str) -> Result<()> {
        if !self.close_checked
            && matches!(&self.current, MarkupToken::Close { name, .. } if name == expected)
        {
            self.close_checked = true;
            return Ok(());
        }
        let token = self.lexer.next()?;
        let line = token.line();
        let matched = matches!(&token, MarkupToken::Close { name, .. } if name == expected);
        self.current = token;
        if matched {
            self.close_checked = true;
            Ok(())
        } else {
            Err(Error::parse(format!("expected closing </{expected}>"), line))
        }
    }

    /// Skips the current element and everything inside it.
    ///
    /// # Errors
    ///
    /// Returns a lex error from the tokenizer.
    pub fn skip_element(&mut self) -> Result<()> {
        let MarkupToken::Open { name, depth, .. } = &self.current else {
            return Ok(());
        };
        let (name, depth) = (name.clone(), *depth);
        loop {
            let token = self.lexer.next()?;
            let done = matches!(&token, MarkupToken::Close { name: n, depth: d, .. } if *n == name && *d == depth)
                || matches!(token, MarkupToken::Eof { .. });
            self.current = token;
            if done {
                self.close_checked = true;
                return Ok(());
            }
        }
    }
}
