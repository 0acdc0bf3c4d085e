use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Symbols an order identifier is drawn from.
pub const ORDER_ID_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Number of symbols in an order identifier.
pub const ORDER_ID_LEN: usize = 5;

macro_rules! branded_id {
    ($name:ident, $prefix:expr) => {
        #[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new() -> Self {
                Self(format!("{}_{}", $prefix, Uuid::now_v7()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

branded_id!(SessionId, "sess");

/// Short human-typeable order identifier, e.g. `K3Z9Q`.
///
/// Generated identifiers are always [`ORDER_ID_LEN`] symbols from
/// [`ORDER_ID_ALPHABET`]. Values parsed from the outside (a URL path segment)
/// are kept verbatim so a malformed id simply misses on lookup.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Draw a fresh identifier, each symbol independently and uniformly.
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let id = (0..ORDER_ID_LEN)
            .map(|_| char::from(ORDER_ID_ALPHABET[rng.gen_range(0..ORDER_ID_ALPHABET.len())]))
            .collect();
        Self(id)
    }

    pub fn from_raw(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this id has the shape of a generated one.
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == ORDER_ID_LEN && self.0.bytes().all(|b| ORDER_ID_ALPHABET.contains(&b))
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for OrderId {
    type Err = std::convert::Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_owned()))
    }
}

impl AsRef<str> for OrderId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Source of candidate order identifiers.
///
/// The registry asks for a new candidate each time the previous one collided.
pub trait OrderIdGenerator: Send + Sync {
    fn next_id(&self) -> OrderId;
}

/// Thread-local RNG backed generator used in production.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomOrderIds;

impl OrderIdGenerator for RandomOrderIds {
    fn next_id(&self) -> OrderId {
        OrderId::generate(&mut rand::thread_rng())
    }
}
