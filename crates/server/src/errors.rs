use service::errors::ServiceError;
use tonic::Status;
use tracing::error;

/// Map a service failure onto the gRPC status surfaced to the caller.
///
/// | ServiceError | Code |
/// |---|---|
/// | `Validation` | `InvalidArgument` |
/// | `NotFound` | `NotFound` |
/// | `Db`, `Model`, `Internal` | `Internal` |
pub fn into_status(err: ServiceError) -> Status {
    match err {
        ServiceError::Validation(msg) => Status::invalid_argument(msg),
        ServiceError::NotFound(msg) => Status::not_found(msg),
        other => {
            error!(error = %other, "internal error");
            Status::internal(other.to_string())
        }
    }
}
