//! Error types for the Invoice Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while calculating SOW invoices.

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for the Invoice Engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use invoice_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/policy.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/policy.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A SOW referenced by a request does not exist.
    #[error("SOW not found: {sow_id}")]
    SowNotFound {
        /// The SOW id that was not found.
        sow_id: String,
    },

    /// A SOW definition was inconsistent.
    #[error("Invalid SOW '{sow_id}': {message}")]
    InvalidSow {
        /// The id of the invalid SOW.
        sow_id: String,
        /// A description of what made the SOW invalid.
        message: String,
    },

    /// An invoice schedule referenced by a request does not exist on the SOW.
    #[error("Invoice schedule not found: {schedule_id}")]
    ScheduleNotFound {
        /// The schedule id that was not found.
        schedule_id: String,
    },

    /// An invoice schedule that was already invoiced was selected again.
    #[error("Invoice schedule '{schedule_id}' ({start_date} to {end_date}) is already billed")]
    ScheduleAlreadyBilled {
        /// The id of the billed schedule.
        schedule_id: String,
        /// The start of the billed period.
        start_date: NaiveDate,
        /// The end of the billed period.
        end_date: NaiveDate,
    },

    /// An allocation was invalid or contained inconsistent data.
    #[error("Invalid allocation '{allocation_id}': {message}")]
    InvalidAllocation {
        /// The id of the invalid allocation.
        allocation_id: String,
        /// A description of what made the allocation invalid.
        message: String,
    },

    /// A timesheet entry was invalid or contained inconsistent data.
    #[error("Invalid timesheet entry '{entry_id}': {message}")]
    InvalidTimesheet {
        /// The id of the invalid entry.
        entry_id: String,
        /// A description of what made the entry invalid.
        message: String,
    },

    /// SOWs billed together use different currencies.
    #[error("Currency mismatch: SOW '{sow_id}' uses {found}, expected {expected}")]
    CurrencyMismatch {
        /// The SOW whose currency differs.
        sow_id: String,
        /// The currency of the first SOW in the calculation.
        expected: String,
        /// The currency found on the mismatching SOW.
        found: String,
    },

    /// A merge request did not satisfy the merge preconditions.
    #[error("{reason}")]
    MergeRejected {
        /// The user-facing reason for the rejection.
        reason: String,
    },

    /// An invoice submission failed validation.
    #[error("Invoice rejected: {message}")]
    InvoiceRejected {
        /// A description of the validation failure.
        message: String,
    },

    /// The requested feature has no backing implementation yet.
    #[error("Not implemented: {feature}")]
    NotImplemented {
        /// The feature that is not available.
        feature: String,
    },

    /// Pinning another item would exceed the pin board limit.
    #[error("You cannot pin more than {limit} items")]
    PinLimitReached {
        /// The configured maximum.
        limit: usize,
    },

    /// The backend refused a mutation.
    #[error("{message}")]
    BackendRejected {
        /// The HTTP status returned by the backend.
        status: u16,
        /// The user-facing message derived from the response body.
        message: String,
    },

    /// A realtime message could not be decoded.
    #[error("Malformed notification message: {message}")]
    MalformedNotification {
        /// A description of the decoding failure.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/policy.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/policy.yaml"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/bad.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/bad.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_schedule_already_billed_displays_period() {
        let error = EngineError::ScheduleAlreadyBilled {
            schedule_id: "sch_01".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        };
        assert_eq!(
            error.to_string(),
            "Invoice schedule 'sch_01' (2025-01-01 to 2025-01-31) is already billed"
        );
    }

    #[test]
    fn test_merge_rejected_displays_reason_only() {
        let error = EngineError::MergeRejected {
            reason: "Select at least 2 SOWs to merge".to_string(),
        };
        assert_eq!(error.to_string(), "Select at least 2 SOWs to merge");
    }

    #[test]
    fn test_currency_mismatch_displays_both_currencies() {
        let error = EngineError::CurrencyMismatch {
            sow_id: "sow_2".to_string(),
            expected: "VND".to_string(),
            found: "USD".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Currency mismatch: SOW 'sow_2' uses USD, expected VND"
        );
    }

    #[test]
    fn test_invalid_timesheet_displays_id_and_message() {
        let error = EngineError::InvalidTimesheet {
            entry_id: "ts_001".to_string(),
            message: "hours must not be negative".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid timesheet entry 'ts_001': hours must not be negative"
        );
    }

    #[test]
    fn test_pin_limit_displays_limit() {
        let error = EngineError::PinLimitReached { limit: 5 };
        assert_eq!(error.to_string(), "You cannot pin more than 5 items");
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_sow_not_found() -> EngineResult<()> {
            Err(EngineError::SowNotFound {
                sow_id: "sow_x".to_string(),
            })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_sow_not_found()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
