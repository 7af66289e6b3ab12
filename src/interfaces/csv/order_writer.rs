use crate::domain::order::{AccountId, PaymentOrder};
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct OrderRow {
    order: String,
    token: String,
    amount: Decimal,
    fee: Decimal,
    paid: bool,
    payer: Option<AccountId>,
}

impl From<&PaymentOrder> for OrderRow {
    fn from(order: &PaymentOrder) -> Self {
        Self {
            order: order.id.to_string(),
            token: order.token.to_string(),
            amount: order.amount.0.normalize(),
            fee: order.fee.0.normalize(),
            paid: order.is_paid(),
            payer: order.payer(),
        }
    }
}

/// Writes the final order registry as CSV.
pub struct OrderWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> OrderWriter<W> {
    pub fn new(target: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(target),
        }
    }

    /// Serializes all orders, sorted by id for deterministic output.
    pub fn write_orders(&mut self, mut orders: Vec<PaymentOrder>) -> Result<()> {
        orders.sort_by_key(|order| *order.id.as_bytes());
        for order in &orders {
            self.writer.serialize(OrderRow::from(order))?;
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| PaymentError::InternalError(Box::new(std::io::Error::other(e.to_string()))))
    }
}
