//! Server lifecycle supervision.
//!
//! Each worker runs as a background tokio task serving one axum router.
//! Start waits for a readiness signal under a bounded timeout; stop
//! requests graceful shutdown, waits up to a deadline, then aborts the
//! task. A partially started cluster is always rolled back in reverse
//! start order.

use axum::Router;
use colored::Colorize;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use calcfleet_types::LifecycleError;

/// Bound on the readiness wait at start.
pub const SERVER_START_TIMEOUT: Duration = Duration::from_secs(10);

/// Bound on the graceful-shutdown wait at stop.
pub const SERVER_STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// One worker service to bring up.
pub struct ServerSpec {
    pub name: String,
    pub port: u16,
    pub router: Router,
}

impl ServerSpec {
    pub fn new(name: impl Into<String>, port: u16, router: Router) -> Self {
        ServerSpec {
            name: name.into(),
            port,
            router,
        }
    }
}

/// A live worker service. Owned exclusively by the supervisor that
/// started it.
#[derive(Debug)]
pub struct ServerHandle {
    pub name: String,
    pub addr: SocketAddr,
    shutdown: CancellationToken,
    task: JoinHandle<std::io::Result<()>>,
}

/// Bind and serve one router in the background, returning once the
/// listener is accepting connections.
pub async fn spawn_server(
    name: &str,
    host: &str,
    port: u16,
    router: Router,
) -> Result<ServerHandle, LifecycleError> {
    let bind_addr = format!("{host}:{port}");
    let (ready_tx, ready_rx) = oneshot::channel::<Result<SocketAddr, String>>();
    let shutdown = CancellationToken::new();
    let serve_shutdown = shutdown.clone();

    let task = tokio::spawn(async move {
        let listener = match TcpListener::bind(&bind_addr).await {
            Ok(listener) => listener,
            Err(err) => {
                let _ = ready_tx.send(Err(err.to_string()));
                return Ok(());
            }
        };
        let local_addr = match listener.local_addr() {
            Ok(addr) => addr,
            Err(err) => {
                let _ = ready_tx.send(Err(err.to_string()));
                return Ok(());
            }
        };
        let _ = ready_tx.send(Ok(local_addr));
        axum::serve(listener, router)
            .with_graceful_shutdown(async move { serve_shutdown.cancelled().await })
            .await
    });

    match timeout(SERVER_START_TIMEOUT, ready_rx).await {
        Err(_elapsed) => {
            shutdown.cancel();
            task.abort();
            Err(LifecycleError::StartTimeout {
                name: name.to_string(),
                timeout_secs: SERVER_START_TIMEOUT.as_secs(),
            })
        }
        Ok(Err(_recv)) => Err(LifecycleError::Crashed {
            name: name.to_string(),
            message: "server task exited before signaling readiness".to_string(),
        }),
        Ok(Ok(Err(message))) => {
            task.abort();
            Err(LifecycleError::Bind {
                name: name.to_string(),
                message,
            })
        }
        Ok(Ok(Ok(addr))) => {
            println!(
                "{} server '{}' listening on http://{}",
                "🌐".blue(),
                name,
                addr
            );
            Ok(ServerHandle {
                name: name.to_string(),
                addr,
                shutdown,
                task,
            })
        }
    }
}

/// Stop one server: graceful first, forced after the deadline.
///
/// Join-cancellation errors after a forced abort are suppressed (the
/// abort already guaranteed termination); any other captured error is
/// re-raised after cleanup.
pub async fn stop_server(handle: ServerHandle) -> Result<(), LifecycleError> {
    let ServerHandle {
        name,
        shutdown,
        mut task,
        ..
    } = handle;
    shutdown.cancel();

    match timeout(SERVER_STOP_TIMEOUT, &mut task).await {
        Ok(Ok(Ok(()))) => Ok(()),
        Ok(Ok(Err(io_err))) => Err(LifecycleError::Crashed {
            name,
            message: io_err.to_string(),
        }),
        Ok(Err(join_err)) => {
            if join_err.is_cancelled() {
                Ok(())
            } else {
                Err(LifecycleError::Crashed {
                    name,
                    message: join_err.to_string(),
                })
            }
        }
        Err(_elapsed) => {
            task.abort();
            let _ = task.await;
            Err(LifecycleError::StopTimeout {
                name,
                timeout_secs: SERVER_STOP_TIMEOUT.as_secs(),
            })
        }
    }
}

/// Start a set of servers in order; on any failure, stop the ones already
/// started (reverse order) before propagating.
pub async fn start_all(
    host: &str,
    specs: Vec<ServerSpec>,
) -> Result<Vec<ServerHandle>, LifecycleError> {
    let mut started: Vec<ServerHandle> = Vec::with_capacity(specs.len());
    for spec in specs {
        match spawn_server(&spec.name, host, spec.port, spec.router).await {
            Ok(handle) => started.push(handle),
            Err(err) => {
                stop_all(started).await;
                return Err(err);
            }
        }
    }
    Ok(started)
}

/// Stop a set of servers in strict reverse start order, swallowing
/// individual stop failures so teardown always completes.
pub async fn stop_all(mut handles: Vec<ServerHandle>) {
    while let Some(handle) = handles.pop() {
        let name = handle.name.clone();
        if let Err(err) = stop_server(handle).await {
            eprintln!("{} failed to stop server '{}': {}", "⚠️".yellow(), name, err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;

    fn ping_router() -> Router {
        Router::new().route("/ping", get(|| async { "pong" }))
    }

    async fn free_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    }

    #[tokio::test]
    async fn test_server_is_reachable_after_spawn_and_gone_after_stop() {
        let handle = spawn_server("ping", "127.0.0.1", 0, ping_router())
            .await
            .unwrap();
        let addr = handle.addr;

        let body = reqwest::get(format!("http://{addr}/ping"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "pong");

        stop_server(handle).await.unwrap();
        assert!(tokio::net::TcpStream::connect(addr).await.is_err());
    }

    #[tokio::test]
    async fn test_bind_conflict_is_a_lifecycle_error() {
        let first = spawn_server("first", "127.0.0.1", 0, ping_router())
            .await
            .unwrap();
        let err = spawn_server("second", "127.0.0.1", first.addr.port(), ping_router())
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::Bind { .. }));
        stop_server(first).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_bring_up_rolls_back_started_servers() {
        let blocker = spawn_server("blocker", "127.0.0.1", 0, ping_router())
            .await
            .unwrap();
        let free = free_port().await;

        let specs = vec![
            ServerSpec::new("ok", free, ping_router()),
            ServerSpec::new("conflicts", blocker.addr.port(), ping_router()),
        ];
        let err = start_all("127.0.0.1", specs).await.unwrap_err();
        assert!(matches!(err, LifecycleError::Bind { .. }));

        // The first server was rolled back: nothing listens on its port.
        let rolled_back: SocketAddr = format!("127.0.0.1:{free}").parse().unwrap();
        assert!(tokio::net::TcpStream::connect(rolled_back).await.is_err());

        stop_server(blocker).await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_all_tears_down_every_server() {
        let handles = start_all(
            "127.0.0.1",
            vec![
                ServerSpec::new("a", 0, ping_router()),
                ServerSpec::new("b", 0, ping_router()),
            ],
        )
        .await
        .unwrap();
        let addrs: Vec<SocketAddr> = handles.iter().map(|handle| handle.addr).collect();

        stop_all(handles).await;
        for addr in addrs {
            assert!(tokio::net::TcpStream::connect(addr).await.is_err());
        }
    }
}
