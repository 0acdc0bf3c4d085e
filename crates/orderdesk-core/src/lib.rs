pub mod ids;
pub mod orders;

pub use ids::{OrderId, OrderIdGenerator, RandomOrderIds, SessionId};
pub use orders::{NewOrder, OrderRecord};
