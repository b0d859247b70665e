use async_trait::async_trait;
use bson::{oid::ObjectId, Bson};
use futures::stream::BoxStream;

use super::domain::PersonRecord;
use crate::errors::ServiceError;

/// Lazily produced records from an open cursor. Dropping the stream releases the cursor.
pub type PersonStream = BoxStream<'static, Result<PersonRecord, ServiceError>>;

/// Repository abstraction over the person collection.
///
/// Each method maps to exactly one store operation; no method retries.
#[async_trait]
pub trait PersonRepository: Send + Sync {
    /// Insert a document without `_id`; returns the id the store assigned.
    async fn insert(&self, person: &PersonRecord) -> Result<Bson, ServiceError>;
    async fn find(&self, id: ObjectId) -> Result<Option<PersonRecord>, ServiceError>;
    /// Replace the whole document keyed by `id`; returns the matched count.
    async fn replace(&self, id: ObjectId, person: &PersonRecord) -> Result<u64, ServiceError>;
    /// Returns the deleted count.
    async fn delete(&self, id: ObjectId) -> Result<u64, ServiceError>;
    /// Open a cursor over every document in natural order.
    async fn list(&self) -> Result<PersonStream, ServiceError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use models::errors::ModelError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Failure to inject into the mock. Faults stay active until [`MockPersonRepository::clear_faults`].
    #[derive(Debug, Clone, PartialEq)]
    pub enum Fault {
        Insert,
        Find,
        Replace,
        Delete,
        ListStart,
        /// Yield this many records, then a cursor error.
        ListAfter(usize),
        /// The stored document at this position no longer decodes.
        CorruptAt(usize),
        /// Report this value as the inserted id instead of storing the document.
        InsertedId(Bson),
    }

    #[derive(Default)]
    pub struct MockPersonRepository {
        docs: Mutex<Vec<PersonRecord>>, // insertion order = natural order
        faults: Mutex<Vec<Fault>>,
        open_cursors: Arc<AtomicUsize>,
    }

    impl MockPersonRepository {
        pub fn inject(&self, fault: Fault) {
            self.faults.lock().unwrap().push(fault);
        }

        pub fn clear_faults(&self) {
            self.faults.lock().unwrap().clear();
        }

        pub fn len(&self) -> usize {
            self.docs.lock().unwrap().len()
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        /// Cursors handed out by `list` whose streams have not been dropped yet.
        pub fn open_cursors(&self) -> usize {
            self.open_cursors.load(Ordering::SeqCst)
        }

        fn has(&self, fault: &Fault) -> bool {
            self.faults.lock().unwrap().contains(fault)
        }

        fn corrupt_at(&self) -> Option<usize> {
            self.find_fault(|f| match f {
                Fault::CorruptAt(n) => Some(*n),
                _ => None,
            })
        }

        fn find_fault<T>(&self, pick: impl Fn(&Fault) -> Option<T>) -> Option<T> {
            self.faults.lock().unwrap().iter().find_map(pick)
        }
    }

    fn corrupt(position: usize) -> ServiceError {
        ModelError::Decode(format!("document {}: unknown phone type tag 7", position)).into()
    }

    struct CursorGuard(Arc<AtomicUsize>);

    impl CursorGuard {
        fn open(counter: Arc<AtomicUsize>) -> Self {
            counter.fetch_add(1, Ordering::SeqCst);
            Self(counter)
        }
    }

    impl Drop for CursorGuard {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl PersonRepository for MockPersonRepository {
        async fn insert(&self, person: &PersonRecord) -> Result<Bson, ServiceError> {
            if self.has(&Fault::Insert) {
                return Err(ServiceError::db("insert person", "mock insert failure"));
            }
            if let Some(id) = self.find_fault(|f| match f {
                Fault::InsertedId(b) => Some(b.clone()),
                _ => None,
            }) {
                return Ok(id);
            }
            let oid = ObjectId::new();
            let mut stored = person.clone();
            stored.id = Some(oid);
            self.docs.lock().unwrap().push(stored);
            Ok(Bson::ObjectId(oid))
        }

        async fn find(&self, id: ObjectId) -> Result<Option<PersonRecord>, ServiceError> {
            if self.has(&Fault::Find) {
                return Err(ServiceError::db("find person", "mock find failure"));
            }
            let corrupt_at = self.corrupt_at();
            let docs = self.docs.lock().unwrap();
            match docs.iter().position(|p| p.id == Some(id)) {
                Some(i) if corrupt_at == Some(i) => Err(corrupt(i)),
                Some(i) => Ok(Some(docs[i].clone())),
                None => Ok(None),
            }
        }

        async fn replace(&self, id: ObjectId, person: &PersonRecord) -> Result<u64, ServiceError> {
            if self.has(&Fault::Replace) {
                return Err(ServiceError::db("replace person", "mock replace failure"));
            }
            let mut docs = self.docs.lock().unwrap();
            match docs.iter_mut().find(|p| p.id == Some(id)) {
                Some(slot) => {
                    *slot = PersonRecord { id: Some(id), ..person.clone() };
                    Ok(1)
                }
                None => Ok(0),
            }
        }

        async fn delete(&self, id: ObjectId) -> Result<u64, ServiceError> {
            if self.has(&Fault::Delete) {
                return Err(ServiceError::db("delete person", "mock delete failure"));
            }
            let mut docs = self.docs.lock().unwrap();
            let before = docs.len();
            docs.retain(|p| p.id != Some(id));
            Ok((before - docs.len()) as u64)
        }

        async fn list(&self) -> Result<PersonStream, ServiceError> {
            if self.has(&Fault::ListStart) {
                return Err(ServiceError::db("find persons", "mock query failure"));
            }
            let fail_after = self.find_fault(|f| match f {
                Fault::ListAfter(n) => Some(*n),
                _ => None,
            });
            let corrupt_at = self.corrupt_at();
            let snapshot = self.docs.lock().unwrap().clone();
            let guard = CursorGuard::open(Arc::clone(&self.open_cursors));

            let stream = async_stream::stream! {
                let _guard = guard;
                for (i, person) in snapshot.into_iter().enumerate() {
                    if fail_after == Some(i) {
                        yield Err(ServiceError::db("iterate persons", "mock cursor failure"));
                        return;
                    }
                    if corrupt_at == Some(i) {
                        yield Err(corrupt(i));
                        continue;
                    }
                    yield Ok(person);
                }
                if fail_after.is_some() {
                    // cursor dies right after the last record
                    yield Err(ServiceError::db("iterate persons", "mock cursor failure"));
                }
            };
            Ok(Box::pin(stream))
        }
    }
}
