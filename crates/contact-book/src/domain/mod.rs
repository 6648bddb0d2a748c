//! # Domain Layer (Inner Hexagon)
//!
//! Pure contract logic. No I/O, no async.
//!
//! Dependencies point inward: ports and adapters use this module, never the
//! other way round.

pub mod entities;
pub mod invariants;
pub mod messages;
pub mod services;
pub mod value_objects;

pub use entities::*;
pub use invariants::*;
pub use messages::*;
pub use services::*;
pub use value_objects::*;
