use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use orderdesk_core::{NewOrder, OrderId, OrderIdGenerator, OrderRecord, RandomOrderIds};

use crate::error::RegistryError;

/// Candidate draws allowed per registration before giving up.
///
/// With 36^5 possible ids a single draw collides with probability
/// `len / 60_466_176`, so this budget is only exhausted when the id space is
/// effectively full.
pub const DEFAULT_MAX_ATTEMPTS: usize = 64;

/// In-memory order registry.
///
/// Keys are always the `order_id` of their record. Each candidate id is
/// checked and claimed through a single map entry, so two concurrent
/// registrations can never end up under the same id and lookups never see a
/// partially written record.
pub struct OrderRegistry {
    orders: DashMap<OrderId, OrderRecord>,
    ids: Box<dyn OrderIdGenerator>,
    max_attempts: usize,
}

impl OrderRegistry {
    pub fn new() -> Self {
        Self::with_generator(RandomOrderIds, DEFAULT_MAX_ATTEMPTS)
    }

    pub fn with_max_attempts(max_attempts: usize) -> Self {
        Self::with_generator(RandomOrderIds, max_attempts)
    }

    pub fn with_generator(ids: impl OrderIdGenerator + 'static, max_attempts: usize) -> Self {
        Self {
            orders: DashMap::new(),
            ids: Box::new(ids),
            max_attempts: max_attempts.max(1),
        }
    }

    /// Store a new order under a freshly generated id and return the id.
    ///
    /// A candidate that is already taken is discarded and a new one drawn;
    /// existing records are never overwritten.
    pub fn register(&self, order: NewOrder) -> Result<OrderId, RegistryError> {
        for attempt in 1..=self.max_attempts {
            let id = self.ids.next_id();
            match self.orders.entry(id.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(OrderRecord::new(id.clone(), order));
                    if attempt > 1 {
                        tracing::debug!(order_id = %id, attempt, "order id assigned after collision");
                    }
                    return Ok(id);
                }
                Entry::Occupied(_) => {
                    tracing::debug!(order_id = %id, attempt, "order id collision, redrawing");
                }
            }
        }

        let err = RegistryError::IdSpaceExhausted {
            attempts: self.max_attempts,
        };
        tracing::error!(
            kind = err.error_kind(),
            attempts = self.max_attempts,
            orders = self.len(),
            "order id space exhausted"
        );
        Err(err)
    }

    /// Fetch a copy of the record stored under `id`.
    pub fn lookup(&self, id: &OrderId) -> Result<OrderRecord, RegistryError> {
        self.orders
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    /// Number of registered orders.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

impl Default for OrderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
