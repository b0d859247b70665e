//! Service layer providing the phonebook record operations on top of models.
//! - Separates business rules (ids, timestamps, error kinds) from data access.
//! - Reuses the persisted document shape from the `models` crate.
//! - Repository trait allows swapping MongoDB for the in-memory mock in tests.

pub mod errors;
pub mod person;
