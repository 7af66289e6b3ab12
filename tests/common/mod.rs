use payvault::application::engine::{PaymentEngine, SettlementConfig};
use payvault::domain::order::{AccountId, OrderId, TokenId};
use payvault::infrastructure::in_memory::{InMemoryEventLog, InMemoryLedger, InMemoryOrderStore};

pub const OWNER: AccountId = 1;
pub const OPERATOR: AccountId = 2;
pub const CUSTODY: AccountId = 0;
pub const PAYER: AccountId = 10;

pub fn oid(n: u8) -> OrderId {
    let mut bytes = [0u8; 32];
    bytes[31] = n;
    OrderId::from_bytes(bytes)
}

pub fn usdc() -> TokenId {
    TokenId::new("USDC").unwrap()
}

/// Engine wired to shared in-memory backends; the returned ledger and event
/// log handles observe the same state the engine mutates.
pub fn test_engine() -> (PaymentEngine, InMemoryLedger, InMemoryEventLog) {
    let ledger = InMemoryLedger::new();
    let events = InMemoryEventLog::new();
    let engine = PaymentEngine::new(
        SettlementConfig {
            owner: OWNER,
            operator: OPERATOR,
            custody: CUSTODY,
        },
        Box::new(InMemoryOrderStore::new()),
        Box::new(ledger.clone()),
        Box::new(events.clone()),
    );
    (engine, ledger, events)
}
