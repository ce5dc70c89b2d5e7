//! Accumulated outcome of validating a limits form

use serde::Serialize;

use super::validator::LimitViolation;
use crate::messages::PageMessages;

/// A violation attributed to a form field
#[derive(Debug, Clone, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
    #[serde(skip)]
    pub violation: LimitViolation,
}

/// Violations of one form, in the order the fields were checked
///
/// Checking continues after a failure, so a report can hold several
/// violations. `failed_fields` is ordered and free of duplicates, ready for
/// highlighting inputs.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    violations: Vec<FieldViolation>,
    failed_fields: Vec<&'static str>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation on `field`
    pub fn reject(&mut self, field: &'static str, violation: LimitViolation) {
        self.flag(field);
        self.violations.push(FieldViolation {
            field,
            message: violation.to_string(),
            violation,
        });
    }

    /// Mark a field as failed without a message of its own
    pub fn flag(&mut self, field: &'static str) {
        if !self.failed_fields.contains(&field) {
            self.failed_fields.push(field);
        }
    }

    pub fn is_valid(&self) -> bool {
        self.failed_fields.is_empty()
    }

    pub fn has_failed(&self, field: &str) -> bool {
        self.failed_fields.iter().any(|f| *f == field)
    }

    pub fn failed_fields(&self) -> &[&'static str] {
        &self.failed_fields
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    /// Push every violation message as an error into `messages`
    pub fn write_messages(&self, messages: &mut PageMessages) {
        for v in &self.violations {
            messages.error(v.message.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::Service;

    #[test]
    fn test_report_accumulates_and_dedups() {
        let mut report = ValidationReport::new();
        assert!(report.is_valid());

        report.reject(
            "max_sql_db_cnt",
            LimitViolation::SqlDatabasesDisabled,
        );
        report.reject(
            "max_sql_db_cnt",
            LimitViolation::Malformed {
                service: Service::SqlDatabases,
            },
        );
        report.flag("max_sql_user_cnt");

        assert!(!report.is_valid());
        assert_eq!(report.failed_fields(), &["max_sql_db_cnt", "max_sql_user_cnt"]);
        assert_eq!(report.violations().len(), 2);
        assert!(report.has_failed("max_sql_user_cnt"));

        let mut messages = PageMessages::new();
        report.write_messages(&mut messages);
        assert_eq!(messages.len(), 2);
        assert!(messages.has_errors());
    }
}
