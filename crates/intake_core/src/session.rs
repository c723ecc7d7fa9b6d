use shared::domain::CalculatorId;

/// Holds the server-issued session identifier.
///
/// The identifier only ever moves from absent to present, and is replaced by
/// whichever upload completes last. It is never cleared.
#[derive(Debug, Default)]
pub struct SessionState {
    calculator_id: Option<CalculatorId>,
    writes: u64,
}

impl SessionState {
    pub fn current(&self) -> Option<&CalculatorId> {
        self.calculator_id.as_ref()
    }

    /// Number of upload completions that have written the identifier.
    pub fn writes(&self) -> u64 {
        self.writes
    }

    /// Overwrites unconditionally, even when the value is unchanged, and
    /// returns the previous identifier.
    pub(crate) fn record_upload(&mut self, calculator_id: CalculatorId) -> Option<CalculatorId> {
        self.writes += 1;
        self.calculator_id.replace(calculator_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_absent_and_upgrades_on_each_write() {
        let mut session = SessionState::default();
        assert!(session.current().is_none());

        assert_eq!(session.record_upload(CalculatorId::new("abc123")), None);
        assert_eq!(
            session.record_upload(CalculatorId::new("abc123")),
            Some(CalculatorId::new("abc123"))
        );
        session.record_upload(CalculatorId::new("def456"));

        assert_eq!(session.current(), Some(&CalculatorId::new("def456")));
        assert_eq!(session.writes(), 3);
    }
}
