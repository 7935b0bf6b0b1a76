//! Begin/complete logging around one service operation
//!
//! - `{NAME}_BEGIN` on creation
//! - `{NAME}_COMPLETE` or `{NAME}_FAILED` when closed
//! - `{NAME}_INCOMPLETE` if dropped without either

use std::time::Instant;

use super::logger::Logger;

pub struct ObservationScope {
    name: &'static str,
    fields: Vec<(&'static str, String)>,
    started: Instant,
    closed: bool,
}

impl ObservationScope {
    pub fn new(name: &'static str, fields: &[(&'static str, &str)]) -> Self {
        let fields: Vec<(&'static str, String)> =
            fields.iter().map(|(k, v)| (*k, v.to_string())).collect();
        let scope = Self {
            name,
            fields,
            started: Instant::now(),
            closed: false,
        };
        Logger::trace(&format!("{}_BEGIN", name), &scope.field_refs());
        scope
    }

    fn field_refs(&self) -> Vec<(&str, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str())).collect()
    }

    fn elapsed_us(&self) -> String {
        self.started.elapsed().as_micros().to_string()
    }

    pub fn complete(self) {
        self.complete_with(&[]);
    }

    /// Logs `{NAME}_COMPLETE` with the scope's fields plus `extra`
    pub fn complete_with(mut self, extra: &[(&str, &str)]) {
        self.closed = true;
        let elapsed = self.elapsed_us();
        let mut fields = self.field_refs();
        fields.extend(extra.iter().copied());
        fields.push(("elapsed_us", elapsed.as_str()));
        Logger::info(&format!("{}_COMPLETE", self.name), &fields);
    }

    /// Logs `{NAME}_FAILED` at ERROR with `code` and `reason`
    pub fn fail(mut self, code: &str, reason: &str) {
        self.closed = true;
        let mut fields = self.field_refs();
        fields.push(("code", code));
        fields.push(("reason", reason));
        Logger::error(&format!("{}_FAILED", self.name), &fields);
    }
}

impl Drop for ObservationScope {
    fn drop(&mut self) {
        if !self.closed {
            let mut fields = self.field_refs();
            fields.push(("reason", "scope dropped without completion"));
            Logger::warn(&format!("{}_INCOMPLETE", self.name), &fields);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_closes_scope() {
        let scope = ObservationScope::new("TEST_OP", &[("key", "plan_1")]);
        assert!(!scope.closed);
        scope.complete_with(&[("nodes", "3")]);
    }

    #[test]
    fn test_fail_closes_scope() {
        let scope = ObservationScope::new("TEST_OP", &[]);
        scope.fail("DOCGRAPH_NOT_FOUND", "missing");
    }

    #[test]
    fn test_fields_kept() {
        let scope = ObservationScope::new("TEST_OP", &[("key", "plan_1")]);
        assert_eq!(scope.field_refs(), vec![("key", "plan_1")]);
        scope.complete();
    }
}
