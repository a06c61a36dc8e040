//! Annuity amortization.
//!
//! Computes the total repayment amount (principal plus interest) owed on
//! a credit, using the standard annuity formula:
//!
//! ```text
//! monthly_rate    = annual_rate_percent / 1200
//! n               = (due.year - issued.year) * 12
//! factor          = 1 / (1 + monthly_rate)^n
//! monthly_payment = principal * monthly_rate / (1 - factor)
//! repayment       = monthly_payment * n
//! ```
//!
//! The term is counted in whole years: the month and day components of
//! both dates are ignored, so a credit issued in June and due the
//! following January still amortizes over twelve months.

use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, MathematicalOps};
use thiserror::Error;

use crate::domain::value_objects::Money;

/// Structural misuse of the amortization formula.
///
/// These are programming/configuration errors, not business outcomes:
/// the formula is undefined for the rejected inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmortizationError {
    /// The due date is less than one whole year after the issue date, so
    /// the month count is zero and the formula divides by zero.
    #[error("credit term must span at least one whole year")]
    TermTooShort,
    /// The annual rate is zero or negative.
    #[error("interest rate must be positive")]
    NonPositiveRate,
    /// Intermediate arithmetic exceeded `Decimal` range.
    #[error("amortization arithmetic overflowed")]
    Overflow,
}

/// Computes the total repayment amount for a credit.
///
/// # Errors
///
/// See [`AmortizationError`].
///
/// # Examples
///
/// ```rust
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use teller::domain::amortization::repayment_amount;
/// use teller::domain::value_objects::Money;
///
/// let issued = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
/// let due = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
///
/// let total = repayment_amount(Money::new(1_000), Decimal::from(12), issued, due).unwrap();
/// assert!(total > Money::new(1_000));
/// ```
pub fn repayment_amount(
    principal: Money,
    annual_rate_percent: Decimal,
    issued_on: NaiveDate,
    due_on: NaiveDate,
) -> Result<Money, AmortizationError> {
    let months = i64::from(due_on.year() - issued_on.year()) * 12;
    if months <= 0 {
        return Err(AmortizationError::TermTooShort);
    }

    let monthly_rate = annual_rate_percent / Decimal::from(1200);
    if monthly_rate <= Decimal::ZERO {
        return Err(AmortizationError::NonPositiveRate);
    }

    let growth = (Decimal::ONE + monthly_rate)
        .checked_powi(months)
        .ok_or(AmortizationError::Overflow)?;
    let factor = Decimal::ONE
        .checked_div(growth)
        .ok_or(AmortizationError::Overflow)?;

    // monthly_rate > 0 implies growth > 1, so the denominator is nonzero.
    let monthly_payment = principal
        .amount()
        .checked_mul(monthly_rate)
        .and_then(|numerator| numerator.checked_div(Decimal::ONE - factor))
        .ok_or(AmortizationError::Overflow)?;

    monthly_payment
        .checked_mul(Decimal::from(months))
        .map(Money::from)
        .ok_or(AmortizationError::Overflow)
}
