//! gRPC front of the phonebook: protobuf contract, wire conversion, status
//! mapping and the tonic service over [`service::person::PersonService`].

pub mod proto {
    //! Generated protobuf types and service definitions
    tonic::include_proto!("phonebook");
}

pub mod convert;
pub mod errors;
pub mod grpc;
pub mod startup;

pub use grpc::PhoneBook;
pub use startup::{run, serve_with_shutdown};
