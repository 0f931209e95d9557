//! The token stream contract shared by both front-ends' lexers.

use trogdor_foundation::Result;

/// A pushback-capable token stream.
///
/// `next` consumes and returns the next token, `peek` returns the most
/// recently produced token without consuming anything, and `push` prepends a
/// token to be replayed by the next call to `next`. Pushed tokens replay in
/// stack order: last pushed, first replayed.
pub trait TokenStream {
    /// The token type produced.
    type Token: Clone;

    /// Consumes and returns the next token. At the end of input this keeps
    /// returning an end-of-source token.
    ///
    /// # Errors
    ///
    /// Returns a lex error if the source cannot be tokenized.
    fn next(&mut self) -> Result<Self::Token>;

    /// Returns the most recently produced token, if any.
    fn peek(&self) -> Option<&Self::Token>;

    /// Pushes a token back for replay.
    fn push(&mut self, token: Self::Token);
}

/// Replay stack used by [`TokenStream`] implementations.
#[derive(Clone, Debug)]
pub struct Pushback<T> {
    stack: Vec<T>,
    last: Option<T>,
}

impl<T: Clone> Pushback<T> {
    /// Creates an empty replay stack.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stack: Vec::new(),
            last: None,
        }
    }

    /// Returns the next token to replay, if any, recording it as the most
    /// recently produced token.
    pub fn pop(&mut self) -> Option<T> {
        let token = self.stack.pop()?;
        self.last = Some(token.clone());
        Some(token)
    }

    /// Records a freshly scanned token as the most recently produced token.
    pub fn produced(&mut self, token: &T) {
        self.last = Some(token.clone());
    }

    /// Pushes a token for replay.
    pub fn push(&mut self, token: T) {
        self.stack.push(token);
    }

    /// Returns the most recently produced token.
    #[must_use]
    pub const fn last(&self) -> Option<&T> {
        self.last.as_ref()
    }
}

impl<T: Clone> Default for Pushback<T> {
    fn default() -> Self {
        Self::new()
    }
}
