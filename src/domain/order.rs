use crate::error::PaymentError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

/// The identity of a caller: payer, owner, operator or custody account.
pub type AccountId = u64;

/// Opaque 256-bit order key, supplied by the caller at creation time and
/// unique for the lifetime of the system. Rendered as lowercase hex on every
/// external surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrderId([u8; 32]);

impl OrderId {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parses a hex string (optional `0x` prefix, up to 64 digits) into a
    /// left-padded 32-byte key.
    pub fn from_hex(input: &str) -> Result<Self, PaymentError> {
        let digits = input.strip_prefix("0x").unwrap_or(input);
        if digits.is_empty() || digits.len() > 64 {
            return Err(PaymentError::InvalidOrderId(input.to_string()));
        }

        let mut bytes = [0u8; 32];
        for (i, c) in digits.chars().rev().enumerate() {
            let nibble = c
                .to_digit(16)
                .ok_or_else(|| PaymentError::InvalidOrderId(input.to_string()))?
                as u8;
            bytes[31 - i / 2] |= nibble << ((i % 2) * 4);
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl FromStr for OrderId {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for OrderId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for OrderId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::from_hex(&raw).map_err(serde::de::Error::custom)
    }
}

/// Identifier of the external asset an order is denominated in.
///
/// The identifier must be non-empty; the "null token" of the wire protocol is
/// rejected at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TokenId(String);

impl TokenId {
    pub fn new(id: &str) -> Result<Self, PaymentError> {
        if id.is_empty() {
            return Err(PaymentError::InvalidToken(id.to_string()));
        }
        Ok(Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TokenId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(&raw).map_err(serde::de::Error::custom)
    }
}

/// A monetary value at the asset's smallest-unit precision (4 decimal places).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Balance(pub Decimal);

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Balance {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Balance {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Balance {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Balance {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

/// A strictly positive monetary amount, as required for order creation.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, PaymentError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(PaymentError::InvalidAmount(value))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = PaymentError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Balance {
    fn from(amount: Amount) -> Self {
        Self(amount.0)
    }
}

/// Settlement state of an order. The payer is structurally present exactly
/// when the order is paid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid { payer: AccountId },
}

/// A recorded payment obligation.
///
/// `amount` is the total payable (base amount plus fee), fixed at creation;
/// the base amount is recoverable as `amount - fee`. Records are never deleted
/// and their id is never reused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentOrder {
    pub id: OrderId,
    pub token: TokenId,
    pub amount: Balance,
    pub fee: Balance,
    pub status: OrderStatus,
}

impl PaymentOrder {
    pub fn new(id: OrderId, token: TokenId, base: Amount, fee: Balance) -> Self {
        Self {
            id,
            token,
            amount: Balance::from(base) + fee,
            fee,
            status: OrderStatus::Pending,
        }
    }

    pub fn base_amount(&self) -> Balance {
        self.amount - self.fee
    }

    pub fn is_paid(&self) -> bool {
        matches!(self.status, OrderStatus::Paid { .. })
    }

    pub fn payer(&self) -> Option<AccountId> {
        match self.status {
            OrderStatus::Paid { payer } => Some(payer),
            OrderStatus::Pending => None,
        }
    }

    /// One-way transition; the engine checks the current status first.
    pub fn mark_paid(&mut self, payer: AccountId) {
        self.status = OrderStatus::Paid { payer };
    }
}
