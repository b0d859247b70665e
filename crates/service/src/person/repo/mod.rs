pub mod mongo;

pub use mongo::MongoPersonRepository;
