//! # Validation Module
//!
//! Input validation utilities for the register engine.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Terminal UI                                                  │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate operator feedback                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Service call (Rust)                                          │
//! │  └── THIS MODULE: amount and field validation before any I/O           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (amount_cents > 0)                                          │
//! │  ├── Partial unique indexes (single open register, one active          │
//! │  │   session per operator)                                             │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of a withdrawal/deposit reason.
pub const MAX_REASON_LEN: usize = 200;

/// Maximum length of a terminal display name.
pub const MAX_TERMINAL_NAME_LEN: usize = 50;

// =============================================================================
// Amount Validators
// =============================================================================

/// Validates an amount that must be strictly positive (tenders,
/// withdrawals, deposits).
pub fn validate_positive_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates an opening amount. Zero is a legal opening float; negative
/// is not.
pub fn validate_opening_amount(amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "opening_amount".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a withdrawal/deposit reason.
///
/// ## Rules
/// - Must not be empty (every drawer adjustment is auditable)
/// - Must be at most 200 characters
pub fn validate_reason(reason: &str) -> ValidationResult<()> {
    let reason = reason.trim();

    if reason.is_empty() {
        return Err(ValidationError::Required {
            field: "reason".to_string(),
        });
    }

    if reason.len() > MAX_REASON_LEN {
        return Err(ValidationError::TooLong {
            field: "reason".to_string(),
            max: MAX_REASON_LEN,
        });
    }

    Ok(())
}

/// Validates a terminal display name.
pub fn validate_terminal_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "terminal_name".to_string(),
        });
    }

    if name.len() > MAX_TERMINAL_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "terminal_name".to_string(),
            max: MAX_TERMINAL_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates an operator id.
pub fn validate_operator_id(operator_id: &str) -> ValidationResult<()> {
    if operator_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "operator_id".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_amount() {
        assert!(validate_positive_amount("amount", Money::from_cents(1)).is_ok());
        assert!(validate_positive_amount("amount", Money::zero()).is_err());
        assert!(validate_positive_amount("amount", Money::from_cents(-5)).is_err());
    }

    #[test]
    fn test_opening_amount_allows_zero() {
        assert!(validate_opening_amount(Money::zero()).is_ok());
        assert!(validate_opening_amount(Money::from_cents(10_000)).is_ok());
        assert!(validate_opening_amount(Money::from_cents(-1)).is_err());
    }

    #[test]
    fn test_reason() {
        assert!(validate_reason("bank deposit run").is_ok());
        assert!(validate_reason("").is_err());
        assert!(validate_reason("   ").is_err());
        assert!(validate_reason(&"x".repeat(201)).is_err());
    }

    #[test]
    fn test_terminal_name() {
        assert!(validate_terminal_name("Balcão 1").is_ok());
        assert!(validate_terminal_name("").is_err());
        assert!(validate_terminal_name(&"x".repeat(51)).is_err());
    }

    #[test]
    fn test_operator_id() {
        assert!(validate_operator_id("op-1").is_ok());
        assert!(validate_operator_id("  ").is_err());
    }
}
