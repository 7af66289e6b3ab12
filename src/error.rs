use crate::domain::order::{AccountId, OrderId, TokenId};
use rust_decimal::Decimal;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PaymentError>;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("order {0} already exists")]
    DuplicateOrder(OrderId),
    #[error("invalid token identifier: {0:?}")]
    InvalidToken(String),
    #[error("amount must be positive, got {0}")]
    InvalidAmount(Decimal),
    #[error("invalid order id: {0:?}")]
    InvalidOrderId(String),
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    #[error("order {0} not found")]
    OrderNotFound(OrderId),
    #[error("order {0} already paid")]
    AlreadyPaid(OrderId),
    #[error("account {0} is not the owner")]
    Unauthorized(AccountId),
    #[error("no fees to withdraw for token {0}")]
    NoFeesToWithdraw(TokenId),
    #[error("insufficient funds: needed {needed}, available {available}")]
    InsufficientFunds { needed: Decimal, available: Decimal },
    #[error("reentrant settlement call")]
    ReentrantCall,
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("storage error: {0}")]
    StorageError(#[from] rocksdb::Error),
    #[error("internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

/// Coarse classification of failures, useful for callers that react to the
/// kind of error rather than the specific condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Authorization,
    State,
    Transfer,
    Reentrancy,
    Internal,
}

impl PaymentError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::DuplicateOrder(_)
            | Self::InvalidToken(_)
            | Self::InvalidAmount(_)
            | Self::InvalidOrderId(_)
            | Self::InvalidOperation(_) => ErrorCategory::Validation,
            Self::Unauthorized(_) => ErrorCategory::Authorization,
            Self::OrderNotFound(_) | Self::AlreadyPaid(_) | Self::NoFeesToWithdraw(_) => {
                ErrorCategory::State
            }
            Self::InsufficientFunds { .. } => ErrorCategory::Transfer,
            Self::ReentrantCall => ErrorCategory::Reentrancy,
            Self::CsvError(_) | Self::IoError(_) | Self::InternalError(_) => {
                ErrorCategory::Internal
            }
            #[cfg(feature = "storage-rocksdb")]
            Self::StorageError(_) => ErrorCategory::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_categories() {
        assert_eq!(
            PaymentError::InvalidAmount(dec!(0)).category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            PaymentError::Unauthorized(7).category(),
            ErrorCategory::Authorization
        );
        assert_eq!(
            PaymentError::ReentrantCall.category(),
            ErrorCategory::Reentrancy
        );
        assert_eq!(
            PaymentError::InsufficientFunds {
                needed: dec!(10),
                available: dec!(1)
            }
            .category(),
            ErrorCategory::Transfer
        );
    }
}
