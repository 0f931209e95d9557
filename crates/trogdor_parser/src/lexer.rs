//! Natural-language tokenizer.
//!
//! Sentences end with a period or a blank line. Square brackets enclose
//! comments. Words that together form a known compound term are returned as
//! one token: the lexer reads ahead up to a bounded number of words, then
//! backs off one word at a time until the phrase is a term in the
//! [`Lexicon`] or a single word remains.

use std::fmt;

use trogdor_foundation::{Error, Result};
use trogdor_language::{Pushback, TokenStream};

use crate::lexicon::Lexicon;

/// Token classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// End of source.
    Eof,
    /// A period or a blank line.
    Terminator,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `;`
    Semicolon,
    /// A word or compound term.
    Word,
    /// `a`, `an`, `the` or `some`.
    Article,
    /// `is` or `are`.
    Equality,
    /// `and`
    And,
    /// Text between double quotes, without the quotes.
    Quoted,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Eof => "end of source",
            Self::Terminator => "end of sentence",
            Self::Comma => "','",
            Self::Colon => "':'",
            Self::Semicolon => "';'",
            Self::Word => "word",
            Self::Article => "article",
            Self::Equality => "'is'",
            Self::And => "'and'",
            Self::Quoted => "quoted text",
        };
        f.write_str(name)
    }
}

/// A token with its text and line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    /// The token class.
    pub kind: TokenKind,
    /// The token text as written.
    pub value: String,
    /// Line the token starts on.
    pub line: usize,
}

impl Token {
    /// Creates a token.
    #[must_use]
    pub fn new(kind: TokenKind, value: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            line,
        }
    }

    /// Returns true if this is a word equal to `word`, ignoring case.
    #[must_use]
    pub fn is_word(&self, word: &str) -> bool {
        self.kind == TokenKind::Word && self.value.eq_ignore_ascii_case(word)
    }

    /// Returns true if the token ends a sentence or the source.
    #[must_use]
    pub const fn ends_sentence(&self) -> bool {
        matches!(self.kind, TokenKind::Terminator | TokenKind::Eof)
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '_' | '\'')
}

fn classify(word: &str) -> TokenKind {
    match word.to_lowercase().as_str() {
        "is" | "are" => TokenKind::Equality,
        "a" | "an" | "the" | "some" => TokenKind::Article,
        "and" => TokenKind::And,
        _ => TokenKind::Word,
    }
}

/// Natural-language tokenizer.
pub struct NaturalLexer<'src> {
    source: &'src str,
    /// Byte offset of the next unread character.
    pos: usize,
    line: usize,
    max_compound_words: usize,
    /// Terminator owed after a quoted string that ended in a period.
    pending: Option<Token>,
    pushback: Pushback<Token>,
}

impl<'src> NaturalLexer<'src> {
    /// Creates a lexer that joins at most `max_compound_words` words into
    /// one term.
    #[must_use]
    pub fn new(source: &'src str, max_compound_words: usize) -> Self {
        Self {
            source,
            pos: 0,
            line: 1,
            max_compound_words: max_compound_words.max(1),
            pending: None,
            pushback: Pushback::new(),
        }
    }

    /// Returns the current line.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }

    /// Consumes and returns the next token.
    ///
    /// # Errors
    ///
    /// Returns a lex error for an illegal character, an unterminated quoted
    /// string, or an unterminated comment.
    pub fn next_token(&mut self, lexicon: &Lexicon) -> Result<Token> {
        if let Some(token) = self.pushback.pop() {
            return Ok(token);
        }
        let token = match self.pending.take() {
            Some(token) => token,
            None => self.scan(lexicon)?,
        };
        self.pushback.produced(&token);
        Ok(token)
    }

    /// Returns the most recently produced token.
    #[must_use]
    pub const fn peek(&self) -> Option<&Token> {
        self.pushback.last()
    }

    /// Pushes a token back for replay.
    pub fn push(&mut self, token: Token) {
        self.pushback.push(token);
    }

    /// Tokenizes a whole source against a fixed lexicon.
    ///
    /// # Errors
    ///
    /// Returns the first lex error.
    pub fn tokenize_all(source: &str, lexicon: &Lexicon, max_compound_words: usize) -> Result<Vec<Token>> {
        let mut lexer = NaturalLexer::new(source, max_compound_words);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token(lexicon)?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    /// Binds the lexer to a lexicon, giving a [`TokenStream`].
    pub fn bind<'a>(&'a mut self, lexicon: &'a Lexicon) -> BoundLexer<'a, 'src> {
        BoundLexer {
            lexer: self,
            lexicon,
        }
    }

    // =========================================================================
    // Scanning
    // =========================================================================

    fn peek_char(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn scan(&mut self, lexicon: &Lexicon) -> Result<Token> {
        loop {
            let line = self.line;
            let Some(c) = self.peek_char() else {
                return Ok(Token::new(TokenKind::Eof, "", line));
            };
            match c {
                ' ' | '\t' | '\r' => {
                    self.bump();
                }
                '[' => self.skip_comment()?,
                '\n' => {
                    if self.at_paragraph_break() {
                        self.skip_blank_lines();
                        return Ok(Token::new(TokenKind::Terminator, "\n\n", line));
                    }
                    self.bump();
                }
                '.' => {
                    self.bump();
                    self.skip_paragraph_break();
                    return Ok(Token::new(TokenKind::Terminator, ".", line));
                }
                ',' => {
                    self.bump();
                    return Ok(Token::new(TokenKind::Comma, ",", line));
                }
                ':' => {
                    self.bump();
                    return Ok(Token::new(TokenKind::Colon, ":", line));
                }
                ';' => {
                    self.bump();
                    return Ok(Token::new(TokenKind::Semicolon, ";", line));
                }
                '"' => return self.scan_quoted(),
                c if is_word_char(c) => return Ok(self.scan_term(lexicon)),
                other => {
                    return Err(Error::lex(format!("illegal character '{other}'"), line));
                }
            }
        }
    }

    /// Checks whether the newline at the current position starts a blank
    /// line.
    fn at_paragraph_break(&self) -> bool {
        let rest = &self.source[self.pos..];
        let Some(after) = rest.strip_prefix('\n') else {
            return false;
        };
        after
            .trim_start_matches([' ', '\t', '\r'])
            .starts_with('\n')
    }

    /// Consumes whitespace up to the next non-blank character, counting
    /// lines.
    fn skip_blank_lines(&mut self) {
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    /// Consumes a blank line directly after a sentence terminator, so that
    /// a period followed by a blank line yields one terminator.
    fn skip_paragraph_break(&mut self) {
        let saved = (self.pos, self.line);
        while matches!(self.peek_char(), Some(' ' | '\t' | '\r')) {
            self.bump();
        }
        if self.peek_char() == Some('\n') && self.at_paragraph_break() {
            self.skip_blank_lines();
        } else {
            (self.pos, self.line) = saved;
        }
    }

    fn skip_comment(&mut self) -> Result<()> {
        let line = self.line;
        while let Some(c) = self.bump() {
            if c == ']' {
                return Ok(());
            }
        }
        Err(Error::lex("comment is missing its closing ']'", line))
    }

    fn scan_quoted(&mut self) -> Result<Token> {
        let line = self.line;
        self.bump();
        let start = self.pos;
        loop {
            match self.peek_char() {
                Some('"') => break,
                Some(_) => {
                    self.bump();
                }
                None => return Err(Error::lex("quoted text is missing its closing '\"'", line)),
            }
        }
        let text = self.source[start..self.pos].to_string();
        self.bump();
        if text.ends_with('.') {
            let terminator_line = self.line;
            self.skip_paragraph_break();
            self.pending = Some(Token::new(TokenKind::Terminator, ".", terminator_line));
        }
        Ok(Token::new(TokenKind::Quoted, text, line))
    }

    fn scan_word(&mut self) -> &'src str {
        let start = self.pos;
        while self.peek_char().is_some_and(is_word_char) {
            self.bump();
        }
        &self.source[start..self.pos]
    }

    /// Skips spaces and single line breaks between words of one sentence.
    /// Returns false, without consuming anything, if the next word is not
    /// in the same sentence.
    fn skip_to_next_word(&mut self) -> bool {
        let saved = (self.pos, self.line);
        loop {
            match self.peek_char() {
                Some(' ' | '\t' | '\r') => {
                    self.bump();
                }
                Some('\n') if !self.at_paragraph_break() => {
                    self.bump();
                }
                Some(c) if is_word_char(c) => return true,
                _ => {
                    (self.pos, self.line) = saved;
                    return false;
                }
            }
        }
    }

    fn scan_term(&mut self, lexicon: &Lexicon) -> Token {
        let line = self.line;
        let start = self.pos;
        // End offset and line after each word read.
        let mut ends = Vec::with_capacity(self.max_compound_words);
        loop {
            self.scan_word();
            ends.push((self.pos, self.line));
            if ends.len() >= self.max_compound_words || !self.skip_to_next_word() {
                break;
            }
        }
        while ends.len() > 1 {
            let (end, _) = ends[ends.len() - 1];
            let phrase = normalize(&self.source[start..end]);
            if lexicon.is_term(&phrase) {
                break;
            }
            ends.pop();
        }
        let (end, end_line) = ends[ends.len() - 1];
        (self.pos, self.line) = (end, end_line);
        let value = normalize(&self.source[start..end]);
        Token::new(classify(&value), value, line)
    }
}

/// Joins the words of a phrase with single spaces.
fn normalize(phrase: &str) -> String {
    phrase.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A [`NaturalLexer`] bound to the lexicon it resolves compound terms
/// against.
pub struct BoundLexer<'a, 'src> {
    lexer: &'a mut NaturalLexer<'src>,
    lexicon: &'a Lexicon,
}

impl TokenStream for BoundLexer<'_, '_> {
    type Token = Token;

    fn next(&mut self) -> Result<Token> {
        self.lexer.next_token(self.lexicon)
    }

    fn peek(&self) -> Option<&Token> {
        self.lexer.peek()
    }

    fn push(&mut self, token: Token) {
        self.lexer.push(token);
    }
}
