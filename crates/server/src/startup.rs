use std::{future::Future, net::SocketAddr, sync::Arc};

use configs::AppConfig;
use service::person::{repo::MongoPersonRepository, PersonRepository, PersonService};
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::grpc::PhoneBook;

/// Serve the phonebook gRPC service on `listener` until `shutdown` resolves.
/// In-flight calls are drained before returning.
pub async fn serve_with_shutdown<R, F>(listener: TcpListener, svc: PersonService<R>, shutdown: F) -> anyhow::Result<()>
where
    R: PersonRepository + 'static,
    F: Future<Output = ()> + Send,
{
    let incoming = TcpListenerStream::new(listener);
    Server::builder()
        .layer(TraceLayer::new_for_grpc())
        .add_service(PhoneBook::new(svc).into_service())
        .serve_with_incoming_shutdown(incoming, shutdown)
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // 无法监听信号时保持运行，由外部终止进程
        warn!(error = %e, "cannot listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!(event = "shutdown_signal", "received Ctrl+C, shutting down");
}

/// Public entry: connect MongoDB, then serve gRPC until Ctrl+C.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    info!(db = %cfg.database.name, collection = %cfg.database.collection, "connecting to mongodb");
    let client = models::db::connect(&cfg.database).await?;

    let served = async {
        models::db::ping(&client.database(&cfg.database.name)).await?;
        let repo = MongoPersonRepository::new(models::db::person_collection(&client, &cfg.database));
        serve(&cfg, PersonService::new(Arc::new(repo))).await
    }
    .await;

    // 无论服务是否出错，都要正常关闭 MongoDB 客户端
    info!("closing mongodb client");
    client.shutdown().await;
    served
}

async fn serve<R: PersonRepository + 'static>(cfg: &AppConfig, svc: PersonService<R>) -> anyhow::Result<()> {
    let addr: SocketAddr = cfg.bind_addr().parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "phonebook server listening");
    serve_with_shutdown(listener, svc, shutdown_signal()).await
}
