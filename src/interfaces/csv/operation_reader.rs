use crate::domain::order::{AccountId, OrderId};
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    /// Seed the demo ledger with spendable balance.
    Fund,
    Create,
    Pay,
    Withdraw,
}

/// One row of the operations stream: `op, account, order, token, amount`.
///
/// `account` is the calling identity for every operation (the funded account
/// for `fund`). The remaining columns are optional and validated per
/// operation when the row is applied; the token rides as a raw string so the
/// engine keeps its own validation order for `create`.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct OperationRecord {
    pub op: OperationType,
    pub account: AccountId,
    pub order: Option<OrderId>,
    pub token: Option<String>,
    pub amount: Option<Decimal>,
}

/// Reads operations from a CSV source.
///
/// Wraps `csv::Reader` and provides an iterator over `Result<OperationRecord>`,
/// handling whitespace trimming and flexible record lengths so large inputs
/// stream without loading everything into memory.
pub struct OperationReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> OperationReader<R> {
    /// Creates a new `OperationReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn operations(self) -> impl Iterator<Item = Result<OperationRecord>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(PaymentError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reader_valid_stream() {
        let data = "op, account, order, token, amount\n\
                    fund, 10, , USDC, 500.0\n\
                    create, 1, 0xa1, USDC, 100.0\n\
                    pay, 10, 0xa1, , ";
        let reader = OperationReader::new(data.as_bytes());
        let results: Vec<Result<OperationRecord>> = reader.operations().collect();

        assert_eq!(results.len(), 3);

        let fund = results[0].as_ref().unwrap();
        assert_eq!(fund.op, OperationType::Fund);
        assert_eq!(fund.account, 10);
        assert_eq!(fund.order, None);
        assert_eq!(fund.token.as_deref(), Some("USDC"));
        assert_eq!(fund.amount, Some(dec!(500.0)));

        let create = results[1].as_ref().unwrap();
        assert_eq!(create.op, OperationType::Create);
        assert_eq!(create.order, Some(OrderId::from_hex("a1").unwrap()));

        let pay = results[2].as_ref().unwrap();
        assert_eq!(pay.op, OperationType::Pay);
        assert_eq!(pay.token, None);
        assert_eq!(pay.amount, None);
    }

    #[test]
    fn test_reader_malformed_op() {
        let data = "op, account, order, token, amount\ninvalid, 1, , USDC, 1.0";
        let reader = OperationReader::new(data.as_bytes());
        let results: Vec<Result<OperationRecord>> = reader.operations().collect();

        assert!(results[0].is_err());
    }

    #[test]
    fn test_reader_malformed_order_id() {
        let data = "op, account, order, token, amount\npay, 1, not-hex, , ";
        let reader = OperationReader::new(data.as_bytes());
        let results: Vec<Result<OperationRecord>> = reader.operations().collect();

        assert!(results[0].is_err());
    }
}
