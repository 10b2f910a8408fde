//! Ledger error types

use flashloan_types::{Address, Amount, FlashLoanError};
use thiserror::Error;

/// Error types for ledger operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient balance of {asset} for {account}: required {required}, available {available}")]
    InsufficientBalance {
        asset: Address,
        account: Address,
        required: Amount,
        available: Amount,
    },

    #[error("Insufficient allowance of {asset} from {owner} to {spender}: required {required}, available {available}")]
    InsufficientAllowance {
        asset: Address,
        owner: Address,
        spender: Address,
        required: Amount,
        available: Amount,
    },

    #[error("Zero address used as {role}")]
    ZeroAddress { role: &'static str },

    #[error("Balance overflow for {account} in {asset}")]
    Overflow { asset: Address, account: Address },
}

impl From<LedgerError> for FlashLoanError {
    fn from(error: LedgerError) -> Self {
        match error {
            LedgerError::InsufficientBalance {
                asset,
                account,
                required,
                available,
            } => FlashLoanError::InsufficientBalance {
                asset,
                account,
                required,
                available,
            },
            other => FlashLoanError::TransferFailed {
                reason: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_into_flash_loan_error() {
        let asset = Address::from_low_u64(1);
        let account = Address::from_low_u64(2);

        let err: FlashLoanError = LedgerError::InsufficientBalance {
            asset,
            account,
            required: 10,
            available: 5,
        }
        .into();
        assert!(matches!(
            err,
            FlashLoanError::InsufficientBalance {
                required: 10,
                available: 5,
                ..
            }
        ));

        let err: FlashLoanError = LedgerError::ZeroAddress { role: "recipient" }.into();
        assert_eq!(
            err,
            FlashLoanError::TransferFailed {
                reason: "Zero address used as recipient".to_string()
            }
        );
    }
}
