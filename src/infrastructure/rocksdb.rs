use crate::domain::event::Event;
use crate::domain::order::{OrderId, PaymentOrder};
use crate::domain::ports::{EventSink, OrderStore};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Column Family for order records, keyed by the 32-byte order id.
pub const CF_ORDERS: &str = "orders";
/// Column Family for the event journal, keyed by a big-endian sequence number.
pub const CF_EVENTS: &str = "events";

/// A persistent store implementation using RocksDB.
///
/// Orders and the append-only event journal live in separate Column Families;
/// values are JSON. This struct is thread-safe (`Clone` shares the underlying
/// `Arc<DB>` and the journal sequence counter).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    next_event: Arc<AtomicU64>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path, ensuring
    /// both column families exist and resuming the event journal sequence
    /// from the last persisted entry.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_orders = ColumnFamilyDescriptor::new(CF_ORDERS, Options::default());
        let cf_events = ColumnFamilyDescriptor::new(CF_EVENTS, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_orders, cf_events])?;
        let next_event = last_event_seq(&db)?.map_or(0, |seq| seq + 1);

        Ok(Self {
            db: Arc::new(db),
            next_event: Arc::new(AtomicU64::new(next_event)),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            PaymentError::InternalError(Box::new(std::io::Error::other(format!(
                "{name} column family not found"
            ))))
        })
    }

    /// Reads back the full event journal in publication order.
    pub fn events(&self) -> Result<Vec<Event>> {
        let cf = self.cf(CF_EVENTS)?;
        let mut events = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            events.push(decode(&value)?);
        }
        Ok(events)
    }
}

fn last_event_seq(db: &DB) -> Result<Option<u64>> {
    let Some(cf) = db.cf_handle(CF_EVENTS) else {
        return Ok(None);
    };
    match db.iterator_cf(cf, IteratorMode::End).next() {
        Some(item) => {
            let (key, _value) = item?;
            let bytes: [u8; 8] = key.as_ref().try_into().map_err(|_| {
                PaymentError::InternalError(Box::new(std::io::Error::other(
                    "malformed event journal key",
                )))
            })?;
            Ok(Some(u64::from_be_bytes(bytes)))
        }
        None => Ok(None),
    }
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| PaymentError::InternalError(Box::new(e)))
}

fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| PaymentError::InternalError(Box::new(e)))
}

#[async_trait]
impl OrderStore for RocksDBStore {
    async fn store(&self, order: PaymentOrder) -> Result<()> {
        let cf = self.cf(CF_ORDERS)?;
        self.db.put_cf(cf, order.id.as_bytes(), encode(&order)?)?;
        Ok(())
    }

    async fn get(&self, id: &OrderId) -> Result<Option<PaymentOrder>> {
        let cf = self.cf(CF_ORDERS)?;
        match self.db.get_cf(cf, id.as_bytes())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn exists(&self, id: &OrderId) -> Result<bool> {
        let cf = self.cf(CF_ORDERS)?;
        // Key presence check without materializing the value
        Ok(self.db.get_pinned_cf(cf, id.as_bytes())?.is_some())
    }

    async fn get_all(&self) -> Result<Vec<PaymentOrder>> {
        let cf = self.cf(CF_ORDERS)?;
        let mut orders = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            orders.push(decode(&value)?);
        }
        Ok(orders)
    }
}

#[async_trait]
impl EventSink for RocksDBStore {
    async fn publish(&self, event: Event) -> Result<()> {
        let cf = self.cf(CF_EVENTS)?;
        let seq = self.next_event.fetch_add(1, Ordering::SeqCst);
        self.db.put_cf(cf, seq.to_be_bytes(), encode(&event)?)?;
        Ok(())
    }
}
