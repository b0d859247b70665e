use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson, Document};
use futures::StreamExt;
use mongodb::Collection;

use crate::errors::ServiceError;
use crate::person::domain::PersonRecord;
use crate::person::repository::{PersonRepository, PersonStream};

/// MongoDB-backed repository. Reads and writes go through raw documents so a
/// malformed document surfaces as a model error rather than a driver error.
#[derive(Clone)]
pub struct MongoPersonRepository {
    collection: Collection<PersonRecord>,
}

impl MongoPersonRepository {
    pub fn new(collection: Collection<PersonRecord>) -> Self { Self { collection } }

    fn raw(&self) -> Collection<Document> {
        self.collection.clone_with_type::<Document>()
    }
}

#[async_trait]
impl PersonRepository for MongoPersonRepository {
    async fn insert(&self, person: &PersonRecord) -> Result<Bson, ServiceError> {
        let res = self.raw()
            .insert_one(person.to_document()?)
            .await
            .map_err(|e| ServiceError::db("insert person", e))?;
        Ok(res.inserted_id)
    }

    async fn find(&self, id: ObjectId) -> Result<Option<PersonRecord>, ServiceError> {
        let found = self.raw()
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| ServiceError::db("find person", e))?;
        found.map(PersonRecord::from_document).transpose().map_err(ServiceError::from)
    }

    async fn replace(&self, id: ObjectId, person: &PersonRecord) -> Result<u64, ServiceError> {
        let res = self.raw()
            .replace_one(doc! { "_id": id }, person.to_document()?)
            .await
            .map_err(|e| ServiceError::db("replace person", e))?;
        Ok(res.matched_count)
    }

    async fn delete(&self, id: ObjectId) -> Result<u64, ServiceError> {
        let res = self.collection
            .delete_one(doc! { "_id": id })
            .await
            .map_err(|e| ServiceError::db("delete person", e))?;
        Ok(res.deleted_count)
    }

    async fn list(&self) -> Result<PersonStream, ServiceError> {
        let cursor = self.raw()
            .find(doc! {})
            .await
            .map_err(|e| ServiceError::db("find persons", e))?;
        // the driver kills the server-side cursor when `cursor` is dropped
        let stream = cursor.map(|next| match next {
            Ok(raw) => PersonRecord::from_document(raw).map_err(ServiceError::from),
            Err(e) => Err(ServiceError::db("iterate persons", e)),
        });
        Ok(stream.boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::person::{PhoneNumber, PhoneType, Timestamp};

    async fn live_repo() -> Option<MongoPersonRepository> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return None;
        }
        let uri = std::env::var("MONGO_URI").ok()?;
        let cfg = configs::DatabaseConfig {
            uri,
            name: "phonebook_test".into(),
            collection: format!("people_{}", ObjectId::new().to_hex()),
            ..Default::default()
        };
        let client = models::db::connect(&cfg).await.ok()?;
        Some(MongoPersonRepository::new(models::db::person_collection(&client, &cfg)))
    }

    #[tokio::test]
    async fn mongo_repository_crud_cycle() -> anyhow::Result<()> {
        let Some(repo) = live_repo().await else {
            eprintln!("skip: MONGO_URI not set");
            return Ok(());
        };

        let mut person = PersonRecord::new("Ana", "ana@example.com", vec![
            PhoneNumber { number: "1".into(), kind: PhoneType::Home },
            PhoneNumber { number: "2".into(), kind: PhoneType::Work },
        ]);
        person.last_updated = Some(Timestamp::now());

        let id = repo.insert(&person).await?.as_object_id().expect("object id");
        let found = repo.find(id).await?.expect("inserted");
        assert_eq!(found.phones, person.phones);

        person.name = "Ana Maria".into();
        assert_eq!(repo.replace(id, &person).await?, 1);
        assert_eq!(repo.replace(ObjectId::new(), &person).await?, 0);

        let listed: Vec<_> = repo.list().await?.collect().await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].as_ref().unwrap().name, "Ana Maria");

        assert_eq!(repo.delete(id).await?, 1);
        assert_eq!(repo.delete(id).await?, 0);
        assert!(repo.find(id).await?.is_none());

        repo.collection.drop().await?;
        Ok(())
    }

    #[tokio::test]
    async fn malformed_document_is_a_model_error() -> anyhow::Result<()> {
        let Some(repo) = live_repo().await else {
            return Ok(());
        };
        repo.raw().insert_one(doc! { "name": 12, "email": "x" }).await?;
        let mut stream = repo.list().await?;
        let first = stream.next().await.expect("one document");
        assert!(matches!(first, Err(ServiceError::Model(_))));
        drop(stream);
        repo.collection.drop().await?;
        Ok(())
    }

    #[tokio::test]
    async fn find_surfaces_bad_phone_tag_as_model_error() -> anyhow::Result<()> {
        let Some(repo) = live_repo().await else {
            return Ok(());
        };
        let id = ObjectId::new();
        repo.raw()
            .insert_one(doc! {
                "_id": id,
                "name": "Ana",
                "email": "ana@example.com",
                "phones": [ { "number": "1", "type": 7 } ],
            })
            .await?;
        let err = repo.find(id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Model(_)));
        repo.collection.drop().await?;
        Ok(())
    }
}
