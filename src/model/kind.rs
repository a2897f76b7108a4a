//! The closed sets of values that the `Category` and `Type` columns are expected to hold.

use serde::{Deserialize, Serialize};

/// The top-level category of a transaction or budget.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
pub enum Category {
    #[default]
    Personal,
    House,
}

serde_plain::derive_display_from_serialize!(Category);
serde_plain::derive_fromstr_from_deserialize!(Category);

/// Whether a transaction is income (`Credit`) or an expense (`Debit`).
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
pub enum TransactionType {
    Credit,
    #[default]
    Debit,
}

serde_plain::derive_display_from_serialize!(TransactionType);
serde_plain::derive_fromstr_from_deserialize!(TransactionType);

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_category_text() {
        assert_eq!(Category::House.to_string(), "House");
        assert_eq!(Category::from_str("Personal").unwrap(), Category::Personal);
        assert!(Category::from_str("personal").is_err());
        assert!(Category::from_str("Office").is_err());
    }

    #[test]
    fn test_transaction_type_text() {
        assert_eq!(TransactionType::Credit.to_string(), "Credit");
        assert_eq!(
            TransactionType::from_str("Debit").unwrap(),
            TransactionType::Debit
        );
        assert!(TransactionType::from_str("").is_err());
    }
}
