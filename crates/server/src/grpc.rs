use std::pin::Pin;

use futures::{Stream, StreamExt};
use service::person::{PersonRepository, PersonService};
use tonic::{Request, Response, Status};
use tracing::{info, instrument};

use crate::convert;
use crate::errors::into_status;
use crate::proto::{
    phone_book_service_server::{PhoneBookService, PhoneBookServiceServer},
    DeleteResponse, ListPersonRequest, PersonIdRequest, PersonRequest, PersonResponse,
};

/// tonic handler for `phonebook.PhoneBookService`, backed by a [`PersonService`].
pub struct PhoneBook<R: PersonRepository> {
    svc: PersonService<R>,
}

impl<R: PersonRepository + 'static> PhoneBook<R> {
    pub fn new(svc: PersonService<R>) -> Self { Self { svc } }

    /// Wrap this handler in the generated tonic server.
    pub fn into_service(self) -> PhoneBookServiceServer<Self> {
        PhoneBookServiceServer::new(self)
    }
}

fn respond(record: &service::person::PersonRecord) -> PersonResponse {
    PersonResponse { person: Some(convert::person_to_proto(record)) }
}

#[tonic::async_trait]
impl<R: PersonRepository + 'static> PhoneBookService for PhoneBook<R> {
    type ListPersonStream = Pin<Box<dyn Stream<Item = Result<PersonResponse, Status>> + Send + 'static>>;

    #[instrument(skip(self, request))]
    async fn create_person(&self, request: Request<PersonRequest>) -> Result<Response<PersonResponse>, Status> {
        let person = request.into_inner().person.unwrap_or_default();
        info!(rpc = "CreatePerson", name = %person.name, "rpc_called");
        let input = convert::person_input(person)?;
        let created = self.svc.create(input).await.map_err(into_status)?;
        Ok(Response::new(respond(&created)))
    }

    #[instrument(skip(self, request))]
    async fn read_person(&self, request: Request<PersonIdRequest>) -> Result<Response<PersonResponse>, Status> {
        let person_id = request.into_inner().person_id;
        info!(rpc = "ReadPerson", %person_id, "rpc_called");
        let found = self.svc.read(&person_id).await.map_err(into_status)?;
        Ok(Response::new(respond(&found)))
    }

    #[instrument(skip(self, request))]
    async fn update_person(&self, request: Request<PersonRequest>) -> Result<Response<PersonResponse>, Status> {
        let person = request.into_inner().person.unwrap_or_default();
        info!(rpc = "UpdatePerson", person_id = %person.id, "rpc_called");
        let input = convert::person_input(person)?;
        let updated = self.svc.update(input).await.map_err(into_status)?;
        Ok(Response::new(respond(&updated)))
    }

    #[instrument(skip(self, request))]
    async fn delete_person(&self, request: Request<PersonIdRequest>) -> Result<Response<DeleteResponse>, Status> {
        let person_id = request.into_inner().person_id;
        info!(rpc = "DeletePerson", %person_id, "rpc_called");
        let deleted = self.svc.delete(&person_id).await.map_err(into_status)?;
        let deleted = i64::try_from(deleted).map_err(|_| Status::internal("deleted count overflows int64"))?;
        Ok(Response::new(DeleteResponse { deleted }))
    }

    #[instrument(skip(self, _request))]
    async fn list_person(&self, _request: Request<ListPersonRequest>) -> Result<Response<Self::ListPersonStream>, Status> {
        info!(rpc = "ListPerson", "list stream start");
        let records = self.svc.list().await.map_err(into_status)?;
        // polled by the transport; dropping the response drops the cursor
        let stream = records.map(|next| next.map(|r| respond(&r)).map_err(into_status));
        Ok(Response::new(Box::pin(stream)))
    }
}
