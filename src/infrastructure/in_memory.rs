use crate::domain::event::Event;
use crate::domain::order::{AccountId, Balance, OrderId, PaymentOrder, TokenId};
use crate::domain::ports::{EventSink, OrderStore, TokenLedger};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory order registry.
///
/// Uses `Arc<RwLock<HashMap<OrderId, PaymentOrder>>>`; `Clone` shares the
/// underlying state, which lets tests keep a handle after boxing the store.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<OrderId, PaymentOrder>>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn store(&self, order: PaymentOrder) -> Result<()> {
        let mut orders = self.orders.write().await;
        orders.insert(order.id, order);
        Ok(())
    }

    async fn get(&self, id: &OrderId) -> Result<Option<PaymentOrder>> {
        let orders = self.orders.read().await;
        Ok(orders.get(id).cloned())
    }

    async fn exists(&self, id: &OrderId) -> Result<bool> {
        let orders = self.orders.read().await;
        Ok(orders.contains_key(id))
    }

    async fn get_all(&self) -> Result<Vec<PaymentOrder>> {
        let orders = self.orders.read().await;
        Ok(orders.values().cloned().collect())
    }
}

/// An in-memory stand-in for the external asset collaborator.
///
/// Keeps one balance per (token, account) pair. `mint` seeds balances for
/// tests and the CLI `fund` operation; it is deliberately not part of the
/// `TokenLedger` port, which only exposes what the engine is allowed to do.
#[derive(Default, Clone)]
pub struct InMemoryLedger {
    balances: Arc<RwLock<HashMap<(TokenId, AccountId), Balance>>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn mint(&self, token: &TokenId, account: AccountId, amount: Balance) {
        let mut balances = self.balances.write().await;
        *balances.entry((token.clone(), account)).or_default() += amount;
    }
}

#[async_trait]
impl TokenLedger for InMemoryLedger {
    async fn transfer(
        &self,
        token: &TokenId,
        from: AccountId,
        to: AccountId,
        amount: Balance,
    ) -> Result<()> {
        let mut balances = self.balances.write().await;

        let from_balance = balances
            .get(&(token.clone(), from))
            .copied()
            .unwrap_or_default();
        if from_balance < amount {
            return Err(PaymentError::InsufficientFunds {
                needed: amount.0,
                available: from_balance.0,
            });
        }

        balances.insert((token.clone(), from), from_balance - amount);
        *balances.entry((token.clone(), to)).or_default() += amount;
        Ok(())
    }

    async fn balance_of(&self, token: &TokenId, account: AccountId) -> Result<Balance> {
        let balances = self.balances.read().await;
        Ok(balances
            .get(&(token.clone(), account))
            .copied()
            .unwrap_or_default())
    }
}

/// Append-only in-memory event log.
#[derive(Default, Clone)]
pub struct InMemoryEventLog {
    events: Arc<RwLock<Vec<Event>>>,
}

impl InMemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> Vec<Event> {
        self.events.read().await.clone()
    }
}

#[async_trait]
impl EventSink for InMemoryEventLog {
    async fn publish(&self, event: Event) -> Result<()> {
        self.events.write().await.push(event);
        Ok(())
    }
}
