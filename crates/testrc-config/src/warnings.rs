/// Ordered collection of warning messages for one session.
///
/// Identical messages are kept once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarningLog {
    messages: Vec<String>,
}

impl WarningLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message. Returns `false` if it was already logged.
    pub fn add(&mut self, message: impl Into<String>) -> bool {
        let message = message.into();
        if self.messages.contains(&message) {
            return false;
        }
        self.messages.push(message);
        true
    }

    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
