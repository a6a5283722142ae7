//! Shared traits and amount validation for engine records.

use uuid::Uuid;

/// Exposes a stable identifier for stored records.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Records owned by exactly one user.
pub trait Owned {
    fn user_id(&self) -> Uuid;

    fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id() == user_id
    }
}

/// Supplies a common contract for retrieving numeric amounts.
pub trait Amounted {
    fn amount(&self) -> f64;

    /// Returns the amount only when it can safely enter a sum.
    fn valid_amount(&self) -> Option<f64> {
        let amount = self.amount();
        is_valid_amount(amount).then_some(amount)
    }
}

/// Amounts must be finite and non-negative.
pub fn is_valid_amount(amount: f64) -> bool {
    amount.is_finite() && amount >= 0.0
}
