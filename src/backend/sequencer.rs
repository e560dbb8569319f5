use std::fmt;

/// Identifies one backend request. Tokens from the same sequencer only grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Issues request tokens and remembers which one is current.
///
/// Only a response carrying the most recently issued token may be applied.
#[derive(Debug, Clone, Default)]
pub struct RequestSequencer {
    next: u64,
    latest: Option<RequestToken>,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new token, superseding every earlier one.
    pub fn issue(&mut self) -> RequestToken {
        self.next = self.next.wrapping_add(1).max(1);
        let token = RequestToken(self.next);
        self.latest = Some(token);
        token
    }

    pub fn latest(&self) -> Option<RequestToken> {
        self.latest
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest == Some(token)
    }

    /// Accept the current token once; later duplicates and stale tokens are refused.
    pub fn complete(&mut self, token: RequestToken) -> bool {
        if self.is_current(token) {
            self.latest = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_increase() {
        let mut sequencer = RequestSequencer::new();
        let first = sequencer.issue();
        let second = sequencer.issue();
        assert!(second > first);
        assert_eq!(first.get(), 1);
    }

    #[test]
    fn only_latest_token_completes() {
        let mut sequencer = RequestSequencer::new();
        let stale = sequencer.issue();
        let current = sequencer.issue();
        assert!(!sequencer.complete(stale));
        assert!(sequencer.complete(current));
        assert!(!sequencer.complete(current));
    }
}
