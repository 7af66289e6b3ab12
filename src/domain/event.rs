use crate::domain::order::{AccountId, Balance, OrderId, TokenId};
use serde::{Deserialize, Serialize};

/// Observational notifications, published to an append-only log.
///
/// Events mirror committed state changes and are never load-bearing for the
/// engine's own invariants; a consumer that ignores them loses nothing but
/// history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    OrderCreated {
        order: OrderId,
        token: TokenId,
        base_amount: Balance,
        fee: Balance,
    },
    OrderPaid {
        order: OrderId,
        payer: AccountId,
        amount: Balance,
        fee: Balance,
    },
    FeesWithdrawn {
        token: TokenId,
        amount: Balance,
    },
}
