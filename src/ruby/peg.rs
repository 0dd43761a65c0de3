//! Backtracking matcher for the lockfile grammar
//!
//! A [`Cursor`] walks an immutable `&str` and offers the PEG primitives
//! (literal, character class, sequence, ordered choice, repetition, optional,
//! negative lookahead, end of input). Every combinator restores the cursor
//! position when it fails, so a failed alternative never leaves partial
//! consumption behind.
//!
//! Matching has no side effects beyond the cursor position. The only other
//! state is the farthest-failure record used for diagnostics, which does not
//! influence what gets matched.

/// Byte range into the input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The matched text, or an empty string if the span does not fit `input`.
    pub fn slice<'a>(&self, input: &'a str) -> &'a str {
        input.get(self.start..self.end).unwrap_or("")
    }
}

/// The farthest position any primitive failed at, and which rules were
/// active there.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Failure {
    pub offset: usize,
    pub expected: Vec<&'static str>,
}

impl Failure {
    fn record(&mut self, offset: usize, label: &'static str) {
        if offset < self.offset {
            return;
        }
        if offset > self.offset {
            self.offset = offset;
            self.expected.clear();
        }
        if !self.expected.contains(&label) {
            self.expected.push(label);
        }
    }
}

/// Position cursor over an input buffer.
#[derive(Debug)]
pub struct Cursor<'a> {
    input: &'a str,
    pos: usize,
    rules: Vec<&'static str>,
    lookahead: usize,
    failure: Failure,
}

impl<'a> Cursor<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            rules: Vec::new(),
            lookahead: 0,
            failure: Failure::default(),
        }
    }

    pub fn input(&self) -> &'a str {
        self.input
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    pub fn failure(&self) -> &Failure {
        &self.failure
    }

    pub fn into_failure(self) -> Failure {
        self.failure
    }

    /// Record a failure at `offset` against the innermost active rule.
    /// Failures inside a lookahead are expected and not reported.
    fn fail(&mut self, offset: usize) {
        if self.lookahead > 0 {
            return;
        }
        let label = self.rules.last().copied().unwrap_or("input");
        self.failure.record(offset, label);
    }

    /// Consume exactly `expected`.
    pub fn literal(&mut self, expected: &str) -> Option<Span> {
        let rest = self.remaining();
        if rest.starts_with(expected) {
            let start = self.pos;
            self.pos += expected.len();
            return Some(Span::new(start, self.pos));
        }
        // Report where the mismatch happened, not where the literal began.
        let matched = rest
            .bytes()
            .zip(expected.bytes())
            .take_while(|(a, b)| a == b)
            .count();
        self.fail(self.pos + matched);
        None
    }

    /// Ordered choice over literals; the first that matches wins.
    pub fn one_of(&mut self, options: &[&str]) -> Option<Span> {
        options.iter().find_map(|option| self.literal(option))
    }

    /// Consume one character satisfying `predicate`.
    pub fn char_if(&mut self, predicate: impl Fn(char) -> bool) -> Option<char> {
        match self.remaining().chars().next() {
            Some(ch) if predicate(ch) => {
                self.pos += ch.len_utf8();
                Some(ch)
            }
            _ => {
                self.fail(self.pos);
                None
            }
        }
    }

    /// Consume any single character.
    pub fn any_char(&mut self) -> Option<char> {
        self.char_if(|_| true)
    }

    /// Run `f` as one unit: if it fails the cursor goes back to where it was.
    pub fn sequence<T>(&mut self, f: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        let start = self.pos;
        let result = f(self);
        if result.is_none() {
            self.pos = start;
        }
        result
    }

    /// Try each alternative in order from the same starting position.
    pub fn choice<T, F>(&mut self, alternatives: &[F]) -> Option<T>
    where
        F: Fn(&mut Self) -> Option<T>,
    {
        alternatives
            .iter()
            .find_map(|alternative| self.sequence(|c| alternative(c)))
    }

    /// Greedy repetition. Succeeds iff at least `min` matches occurred; stops
    /// at `max` or at the first failure. A match that consumes nothing ends
    /// the loop.
    pub fn repeat<T>(
        &mut self,
        min: usize,
        max: Option<usize>,
        mut f: impl FnMut(&mut Self) -> Option<T>,
    ) -> Option<Vec<T>> {
        let start = self.pos;
        let mut items = Vec::new();
        while max.is_none_or(|max| items.len() < max) {
            let before = self.pos;
            let Some(item) = self.sequence(&mut f) else {
                break;
            };
            items.push(item);
            if self.pos == before {
                break;
            }
        }
        if items.len() < min {
            self.pos = start;
            return None;
        }
        Some(items)
    }

    /// `r*`; never fails.
    pub fn zero_or_more<T>(&mut self, f: impl FnMut(&mut Self) -> Option<T>) -> Vec<T> {
        self.repeat(0, None, f).unwrap_or_default()
    }

    /// `r+`
    pub fn one_or_more<T>(&mut self, f: impl FnMut(&mut Self) -> Option<T>) -> Option<Vec<T>> {
        self.repeat(1, None, f)
    }

    /// `r?`; never fails, `None` means the element was absent.
    pub fn optional<T>(&mut self, f: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        self.sequence(f)
    }

    /// `!r`: succeeds without consuming iff `f` fails here.
    pub fn not_ahead<T>(&mut self, f: impl FnOnce(&mut Self) -> Option<T>) -> Option<()> {
        let start = self.pos;
        self.lookahead += 1;
        let matched = f(self).is_some();
        self.lookahead -= 1;
        self.pos = start;
        if matched {
            self.fail(start);
            None
        } else {
            Some(())
        }
    }

    pub fn end_of_input(&mut self) -> Option<()> {
        if self.is_at_end() {
            Some(())
        } else {
            self.fail(self.pos);
            None
        }
    }

    /// Run `f` as a named rule. Failures inside it are attributed to `label`
    /// unless a more deeply nested rule is active.
    pub fn rule<T>(&mut self, label: &'static str, f: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        self.rules.push(label);
        let result = self.sequence(f);
        self.rules.pop();
        result
    }
}
