use crate::domain::event::Event;
use crate::domain::order::{AccountId, Balance, OrderId, PaymentOrder, TokenId};
use crate::error::Result;
use async_trait::async_trait;

/// The authoritative registry of payment orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn store(&self, order: PaymentOrder) -> Result<()>;
    async fn get(&self, id: &OrderId) -> Result<Option<PaymentOrder>>;
    async fn exists(&self, id: &OrderId) -> Result<bool>;
    async fn get_all(&self) -> Result<Vec<PaymentOrder>>;
}

pub type OrderStoreBox = Box<dyn OrderStore>;

/// The external asset capability: an opaque transferable-balance collaborator.
///
/// Either call may fail; the engine treats any failure as fatal to the
/// enclosing operation. A `transfer` may synchronously call back into the
/// engine, which is the one reentrancy hazard settlement guards against.
#[async_trait]
pub trait TokenLedger: Send + Sync {
    async fn transfer(
        &self,
        token: &TokenId,
        from: AccountId,
        to: AccountId,
        amount: Balance,
    ) -> Result<()>;

    async fn balance_of(&self, token: &TokenId, account: AccountId) -> Result<Balance>;
}

pub type TokenLedgerBox = Box<dyn TokenLedger>;

/// Append-only sink for notification events.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, event: Event) -> Result<()>;
}

pub type EventSinkBox = Box<dyn EventSink>;
