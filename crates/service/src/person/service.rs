use std::sync::{Arc, Mutex};

use futures::StreamExt;
use tracing::{debug, error, info, instrument, warn};

use super::domain::{PersonInput, PersonRecord, Timestamp};
use super::id;
use super::repository::{PersonRepository, PersonStream};
use crate::errors::ServiceError;

/// Person record service independent of the RPC framework.
///
/// Holds no per-call state: every operation is one store call plus id and
/// timestamp handling, so the service can be shared freely across tasks.
pub struct PersonService<R: PersonRepository> {
    repo: Arc<R>,
    clock: Arc<WriteClock>,
}

impl<R: PersonRepository> Clone for PersonService<R> {
    fn clone(&self) -> Self { Self { repo: Arc::clone(&self.repo), clock: Arc::clone(&self.clock) } }
}

/// Issues write timestamps that never go backwards within this process, even
/// if the wall clock is stepped back.
#[derive(Debug, Default)]
struct WriteClock {
    last: Mutex<Option<Timestamp>>,
}

impl WriteClock {
    fn tick(&self) -> Timestamp {
        let now = Timestamp::now();
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        let next = match *last {
            Some(prev) if now <= prev => successor(prev),
            _ => now,
        };
        *last = Some(next);
        next
    }
}

fn successor(ts: Timestamp) -> Timestamp {
    if ts.nanos >= 999_999_999 {
        Timestamp { seconds: ts.seconds + 1, nanos: 0 }
    } else {
        Timestamp { seconds: ts.seconds, nanos: ts.nanos + 1 }
    }
}

impl<R: PersonRepository> PersonService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo, clock: Arc::default() } }

    /// Insert a new person. Any id in `input` is ignored; the store assigns one.
    ///
    /// # Examples
    /// ```
    /// use service::person::{PersonService, PersonInput, id};
    /// use service::person::repository::mock::MockPersonRepository;
    /// use std::sync::Arc;
    /// let svc = PersonService::new(Arc::new(MockPersonRepository::default()));
    /// let input = PersonInput { name: "Ana".into(), email: "ana@example.com".into(), ..Default::default() };
    /// let created = tokio_test::block_on(svc.create(input)).unwrap();
    /// let external = id::encode(&created.id.unwrap());
    /// assert!(id::decode(&external).is_ok());
    /// assert!(created.last_updated.is_some());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create(&self, input: PersonInput) -> Result<PersonRecord, ServiceError> {
        let mut record = input.into_record(None, self.clock.tick());
        let inserted = self.repo.insert(&record).await?;
        let oid = inserted.as_object_id().ok_or_else(|| {
            error!(inserted_id = %inserted, "inserted id is not an ObjectId");
            ServiceError::Internal("cannot convert inserted id to ObjectId".into())
        })?;
        record.id = Some(oid);
        info!(person_id = %oid, "person_created");
        Ok(record)
    }

    /// Fetch one person by external id.
    ///
    /// # Examples
    /// ```
    /// use service::person::PersonService;
    /// use service::person::repository::mock::MockPersonRepository;
    /// use service::errors::ServiceError;
    /// use std::sync::Arc;
    /// let svc = PersonService::new(Arc::new(MockPersonRepository::default()));
    /// let bad = tokio_test::block_on(svc.read("xxxx"));
    /// assert!(matches!(bad, Err(ServiceError::Validation(_))));
    /// let missing = tokio_test::block_on(svc.read("605812e409be8dac8d59b5af"));
    /// assert!(matches!(missing, Err(ServiceError::NotFound(_))));
    /// ```
    #[instrument(skip(self))]
    pub async fn read(&self, person_id: &str) -> Result<PersonRecord, ServiceError> {
        let oid = id::decode(person_id)?;
        match self.repo.find(oid).await? {
            Some(found) => Ok(found),
            None => {
                debug!(%person_id, "person_not_found");
                Err(ServiceError::not_found(format!("cannot find person with id {}", person_id)))
            }
        }
    }

    /// Replace the whole person identified by `input.id`. Fields omitted from
    /// `input` are not carried over from the stored version.
    #[instrument(skip(self, input), fields(person_id = %input.id))]
    pub async fn update(&self, input: PersonInput) -> Result<PersonRecord, ServiceError> {
        let oid = id::decode(&input.id)?;
        let record = input.into_record(Some(oid), self.clock.tick());
        let matched = self.repo.replace(oid, &record).await?;
        if matched == 0 {
            return Err(ServiceError::not_found(format!("cannot update person with id {}: no such person", oid)));
        }
        info!(person_id = %oid, "person_updated");
        Ok(record)
    }

    /// Delete one person; returns the deleted count (always 1 on success).
    #[instrument(skip(self))]
    pub async fn delete(&self, person_id: &str) -> Result<u64, ServiceError> {
        let oid = id::decode(person_id)?;
        let deleted = self.repo.delete(oid).await?;
        if deleted == 0 {
            warn!(%person_id, "delete matched no person");
            return Err(ServiceError::Internal(format!("cannot delete person with id {}: no person deleted", person_id)));
        }
        info!(person_id = %oid, deleted, "person_deleted");
        Ok(deleted)
    }

    /// Stream every person in store order. The first error ends the stream;
    /// records already yielded stay delivered.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<PersonStream, ServiceError> {
        let mut inner = self.repo.list().await?;
        let stream = async_stream::stream! {
            let mut delivered = 0usize;
            while let Some(next) = inner.next().await {
                match next {
                    Ok(person) => {
                        delivered += 1;
                        yield Ok(person);
                    }
                    Err(e) => {
                        error!(delivered, error = %e, "list persons aborted");
                        yield Err(e);
                        return;
                    }
                }
            }
            debug!(delivered, "list persons finished");
        };
        Ok(Box::pin(stream))
    }
}
