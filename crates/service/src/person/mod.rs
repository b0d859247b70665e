//! Person module: identifier codec plus the three-layer split (domain, repository, service).

pub mod domain;
pub mod id;
pub mod repository;
pub mod repo;
pub mod service;

pub use domain::{PersonInput, PersonRecord, PhoneNumber, PhoneType, Timestamp};
pub use repository::{PersonRepository, PersonStream};
pub use service::PersonService;
