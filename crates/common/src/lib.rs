//! Cross-crate helpers shared by the phonebook binaries and server crate.

pub mod utils;
