use crate::application::guard::ReentrancyGuard;
use crate::domain::event::Event;
use crate::domain::fees::FeeSchedule;
use crate::domain::order::{AccountId, Amount, Balance, OrderId, PaymentOrder, TokenId};
use crate::domain::ports::{
    EventSink, EventSinkBox, OrderStore, OrderStoreBox, TokenLedger, TokenLedgerBox,
};
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;

/// Identities the engine is wired to at construction.
///
/// The owner is the only identity allowed to create orders and withdraw fees;
/// the operator receives settled payouts and fee sweeps; the custody account
/// holds escrowed fees between settlement and withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementConfig {
    pub owner: AccountId,
    pub operator: AccountId,
    pub custody: AccountId,
}

/// The main entry point for the order lifecycle.
///
/// `PaymentEngine` owns the order registry, the event sink and the handle to
/// the external asset ledger. Each operation runs to completion before the
/// next begins; the reentrancy guard covers the one hazard that serialization
/// cannot, a ledger callback re-entering settlement.
pub struct PaymentEngine {
    config: SettlementConfig,
    fees: FeeSchedule,
    orders: OrderStoreBox,
    ledger: TokenLedgerBox,
    events: EventSinkBox,
    settling: ReentrancyGuard,
}

impl PaymentEngine {
    /// Creates an engine with the default tiered fee schedule.
    pub fn new(
        config: SettlementConfig,
        orders: OrderStoreBox,
        ledger: TokenLedgerBox,
        events: EventSinkBox,
    ) -> Self {
        Self::with_fee_schedule(config, FeeSchedule::default(), orders, ledger, events)
    }

    pub fn with_fee_schedule(
        config: SettlementConfig,
        fees: FeeSchedule,
        orders: OrderStoreBox,
        ledger: TokenLedgerBox,
        events: EventSinkBox,
    ) -> Self {
        Self {
            config,
            fees,
            orders,
            ledger,
            events,
            settling: ReentrancyGuard::new(),
        }
    }

    pub fn owner(&self) -> AccountId {
        self.config.owner
    }

    /// Pure fee quote for a base amount; zero is a valid input.
    pub fn calculate_fee(&self, base: Balance) -> Balance {
        self.fees.fee_for(base)
    }

    fn ensure_owner(&self, caller: AccountId) -> Result<()> {
        if caller == self.config.owner {
            Ok(())
        } else {
            Err(PaymentError::Unauthorized(caller))
        }
    }

    /// Records a new order. Owner-only; the sole path that brings an order
    /// into existence.
    ///
    /// Validation order matters: authorization, then duplicate id, then token,
    /// then amount. A failed call leaves no trace of the attempt.
    pub async fn create_order(
        &self,
        caller: AccountId,
        id: OrderId,
        token: &str,
        base_amount: Decimal,
    ) -> Result<PaymentOrder> {
        self.ensure_owner(caller)?;

        if self.orders.exists(&id).await? {
            return Err(PaymentError::DuplicateOrder(id));
        }
        let token = TokenId::new(token)?;
        let base = Amount::new(base_amount)?;

        let fee = self.fees.fee_for(base.into());
        let order = PaymentOrder::new(id, token, base, fee);
        self.orders.store(order.clone()).await?;

        self.events
            .publish(Event::OrderCreated {
                order: order.id,
                token: order.token.clone(),
                base_amount: order.base_amount(),
                fee: order.fee,
            })
            .await?;

        Ok(order)
    }

    /// Settles an order on behalf of `caller`, who funds the full amount.
    ///
    /// Checks-effects-interactions: the record is marked paid before the
    /// ledger is touched, so a callback re-entering the engine sees the order
    /// as settled (and the guard rejects nested settlement outright). Any
    /// transfer failure rolls everything back; no partially settled state is
    /// observable after return.
    pub async fn pay_order(&self, caller: AccountId, id: &OrderId) -> Result<PaymentOrder> {
        let _lock = self.settling.try_lock()?;

        let order = self
            .orders
            .get(id)
            .await?
            .ok_or(PaymentError::OrderNotFound(*id))?;
        if order.is_paid() {
            return Err(PaymentError::AlreadyPaid(*id));
        }

        let mut settled = order.clone();
        settled.mark_paid(caller);
        self.orders.store(settled.clone()).await?;

        // Pull the full amount into custody, then forward the payout. Each
        // failure undoes whatever already happened.
        if let Err(err) = self
            .ledger
            .transfer(&order.token, caller, self.config.custody, order.amount)
            .await
        {
            self.orders.store(order).await?;
            return Err(err);
        }

        let payout = order.amount - order.fee;
        if let Err(err) = self
            .ledger
            .transfer(&order.token, self.config.custody, self.config.operator, payout)
            .await
        {
            self.ledger
                .transfer(&order.token, self.config.custody, caller, order.amount)
                .await?;
            self.orders.store(order).await?;
            return Err(err);
        }

        self.events
            .publish(Event::OrderPaid {
                order: settled.id,
                payer: caller,
                amount: settled.amount,
                fee: settled.fee,
            })
            .await?;

        Ok(settled)
    }

    /// Sweeps the full custody balance for one asset to the operator.
    /// Owner-only; must be invoked once per distinct asset in use.
    pub async fn withdraw_fees(&self, caller: AccountId, token: &TokenId) -> Result<Balance> {
        self.ensure_owner(caller)?;

        let balance = self.ledger.balance_of(token, self.config.custody).await?;
        if balance <= Balance::ZERO {
            return Err(PaymentError::NoFeesToWithdraw(token.clone()));
        }

        self.ledger
            .transfer(token, self.config.custody, self.config.operator, balance)
            .await?;

        self.events
            .publish(Event::FeesWithdrawn {
                token: token.clone(),
                amount: balance,
            })
            .await?;

        Ok(balance)
    }

    pub async fn get_order(&self, id: &OrderId) -> Result<Option<PaymentOrder>> {
        self.orders.get(id).await
    }

    /// Consumes the engine and returns the final state of all orders.
    pub async fn into_orders(self) -> Result<Vec<PaymentOrder>> {
        self.orders.get_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::TokenLedger;
    use crate::infrastructure::in_memory::{InMemoryEventLog, InMemoryLedger, InMemoryOrderStore};
    use rust_decimal_macros::dec;

    const OWNER: AccountId = 1;
    const OPERATOR: AccountId = 2;
    const CUSTODY: AccountId = 0;
    const PAYER: AccountId = 10;

    fn oid(n: u8) -> OrderId {
        let mut bytes = [0u8; 32];
        bytes[31] = n;
        OrderId::from_bytes(bytes)
    }

    fn usdc() -> TokenId {
        TokenId::new("USDC").unwrap()
    }

    fn test_engine() -> (PaymentEngine, InMemoryLedger, InMemoryEventLog) {
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

    #[tokio::test]
    async fn test_create_order_computes_fee() {
        let (engine, _, events) = test_engine();

        let order = engine
            .create_order(OWNER, oid(1), "USDC", dec!(100.0))
            .await
            .unwrap();

        assert_eq!(order.fee, Balance::new(dec!(0.3)));
        assert_eq!(order.amount, Balance::new(dec!(100.3)));
        assert!(!order.is_paid());

        let log = events.snapshot().await;
        assert_eq!(
            log,
            vec![Event::OrderCreated {
                order: oid(1),
                token: usdc(),
                base_amount: Balance::new(dec!(100.0)),
                fee: Balance::new(dec!(0.3)),
            }]
        );
    }

    #[tokio::test]
    async fn test_create_order_duplicate_id() {
        let (engine, _, _) = test_engine();

        engine
            .create_order(OWNER, oid(1), "USDC", dec!(100.0))
            .await
            .unwrap();
        let err = engine
            .create_order(OWNER, oid(1), "EURC", dec!(5.0))
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::DuplicateOrder(_)));

        // Original record untouched
        let order = engine.get_order(&oid(1)).await.unwrap().unwrap();
        assert_eq!(order.token, usdc());
        assert_eq!(order.amount, Balance::new(dec!(100.3)));
    }

    #[tokio::test]
    async fn test_create_order_validation() {
        let (engine, _, _) = test_engine();

        assert!(matches!(
            engine.create_order(OWNER, oid(1), "", dec!(100.0)).await,
            Err(PaymentError::InvalidToken(_))
        ));
        assert!(matches!(
            engine.create_order(OWNER, oid(1), "USDC", dec!(0)).await,
            Err(PaymentError::InvalidAmount(_))
        ));
        assert!(engine.get_order(&oid(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_non_owner_cannot_create() {
        let (engine, _, _) = test_engine();

        let err = engine
            .create_order(PAYER, oid(1), "USDC", dec!(100.0))
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::Unauthorized(PAYER)));
    }

    #[tokio::test]
    async fn test_pay_order_settles_once() {
        let (engine, ledger, _) = test_engine();
        ledger.mint(&usdc(), PAYER, Balance::new(dec!(500.0))).await;

        engine
            .create_order(OWNER, oid(1), "USDC", dec!(100.0))
            .await
            .unwrap();
        let settled = engine.pay_order(PAYER, &oid(1)).await.unwrap();
        assert_eq!(settled.payer(), Some(PAYER));

        let err = engine.pay_order(OPERATOR, &oid(1)).await.unwrap_err();
        assert!(matches!(err, PaymentError::AlreadyPaid(_)));

        // First settlement stands
        let order = engine.get_order(&oid(1)).await.unwrap().unwrap();
        assert_eq!(order.payer(), Some(PAYER));
    }

    #[tokio::test]
    async fn test_pay_order_missing() {
        let (engine, _, _) = test_engine();
        let err = engine.pay_order(PAYER, &oid(9)).await.unwrap_err();
        assert!(matches!(err, PaymentError::OrderNotFound(_)));
    }

    #[tokio::test]
    async fn test_withdraw_fees_sweeps_custody() {
        let (engine, ledger, _) = test_engine();
        ledger.mint(&usdc(), PAYER, Balance::new(dec!(500.0))).await;

        engine
            .create_order(OWNER, oid(1), "USDC", dec!(100.0))
            .await
            .unwrap();
        engine.pay_order(PAYER, &oid(1)).await.unwrap();

        let swept = engine.withdraw_fees(OWNER, &usdc()).await.unwrap();
        assert_eq!(swept, Balance::new(dec!(0.3)));
        assert_eq!(
            ledger.balance_of(&usdc(), CUSTODY).await.unwrap(),
            Balance::ZERO
        );

        let err = engine.withdraw_fees(OWNER, &usdc()).await.unwrap_err();
        assert!(matches!(err, PaymentError::NoFeesToWithdraw(_)));
    }

    #[tokio::test]
    async fn test_calculate_fee_matches_schedule() {
        let (engine, _, _) = test_engine();
        assert_eq!(
            engine.calculate_fee(Balance::new(dec!(10))),
            Balance::new(dec!(0.03))
        );
        assert_eq!(
            engine.calculate_fee(Balance::new(dec!(5))),
            Balance::new(dec!(0.025))
        );
    }

    #[tokio::test]
    async fn test_free_schedule_forwards_everything() {
        let ledger = InMemoryLedger::new();
        let engine = PaymentEngine::with_fee_schedule(
            SettlementConfig {
                owner: OWNER,
                operator: OPERATOR,
                custody: CUSTODY,
            },
            FeeSchedule::free(),
            Box::new(InMemoryOrderStore::new()),
            Box::new(ledger.clone()),
            Box::new(InMemoryEventLog::new()),
        );
        ledger.mint(&usdc(), PAYER, Balance::new(dec!(100.0))).await;

        engine
            .create_order(OWNER, oid(1), "USDC", dec!(100.0))
            .await
            .unwrap();
        engine.pay_order(PAYER, &oid(1)).await.unwrap();

        assert_eq!(
            ledger.balance_of(&usdc(), OPERATOR).await.unwrap(),
            Balance::new(dec!(100.0))
        );
        assert_eq!(
            ledger.balance_of(&usdc(), CUSTODY).await.unwrap(),
            Balance::ZERO
        );
    }
}
