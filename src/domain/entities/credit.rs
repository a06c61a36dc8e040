//! Credit entity.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::amortization::{self, AmortizationError};
use crate::domain::value_objects::{BankId, CreditId, Money, UserId};

/// A credit issued by a bank to a user.
///
/// `outstanding` is the total still owed (principal plus interest,
/// computed once at issue via annuity amortization). It decreases as
/// payments are applied; the record is deleted when it reaches zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credit {
    /// Unique identifier.
    pub id: CreditId,
    /// The borrowing user.
    pub user_id: UserId,
    /// The issuing bank.
    pub bank_id: BankId,
    /// The borrowed principal.
    pub principal: Money,
    /// Annual interest rate, in percent.
    pub interest_rate: Decimal,
    /// The date the credit was issued.
    pub issued_on: NaiveDate,
    /// The date the credit is due.
    pub due_on: NaiveDate,
    /// The total amount still owed.
    pub outstanding: Money,
}

impl Credit {
    /// Builds a credit with the outstanding amount computed by annuity
    /// amortization over the issue/due dates.
    ///
    /// # Errors
    ///
    /// Returns [`AmortizationError::TermTooShort`] when `due_on` is less
    /// than one whole year after `issued_on`.
    pub fn issue(
        user_id: UserId,
        bank_id: BankId,
        principal: Money,
        interest_rate: Decimal,
        issued_on: NaiveDate,
        due_on: NaiveDate,
    ) -> Result<Self, AmortizationError> {
        let outstanding =
            amortization::repayment_amount(principal, interest_rate, issued_on, due_on)?;

        Ok(Self {
            id: CreditId::generate(),
            user_id,
            bank_id,
            principal,
            interest_rate,
            issued_on,
            due_on,
            outstanding,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[rstest]
    fn issue_computes_outstanding_above_principal() {
        let credit = Credit::issue(
            UserId::generate(),
            BankId::generate(),
            Money::new(100_000),
            Decimal::from(12),
            date(2024, 1, 15),
            date(2026, 1, 15),
        )
        .unwrap();

        assert!(credit.outstanding > credit.principal);
    }

    #[rstest]
    fn issue_rejects_term_shorter_than_a_year() {
        let result = Credit::issue(
            UserId::generate(),
            BankId::generate(),
            Money::new(100_000),
            Decimal::from(12),
            date(2024, 1, 15),
            date(2024, 11, 15),
        );

        assert_eq!(result.unwrap_err(), AmortizationError::TermTooShort);
    }
}
