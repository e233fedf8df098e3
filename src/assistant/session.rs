use std::collections::VecDeque;

/// Exchanges kept by a [`ChatSession`].
pub const HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub query: String,
    pub reply: String,
}

/// Recent assistant exchanges, oldest first.
///
/// Owned by whichever front end runs the conversation; the interpreter itself
/// is stateless.
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    history: VecDeque<Exchange>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an exchange, dropping the oldest once the limit is reached.
    pub fn record(&mut self, query: impl Into<String>, reply: impl Into<String>) {
        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(Exchange {
            query: query.into(),
            reply: reply.into(),
        });
    }

    pub fn history(&self) -> impl Iterator<Item = &Exchange> {
        self.history.iter()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}
