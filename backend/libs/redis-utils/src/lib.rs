use anyhow::{Context, Result};
use redis::aio::ConnectionManager;
use redis::{Client, ConnectionAddr, ConnectionInfo, IntoConnectionInfo, RedisError};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Shared Redis connection manager guarded by a Tokio mutex.
pub type SharedConnectionManager = Arc<Mutex<ConnectionManager>>;

/// Redis connection pool backed by a single auto-reconnecting manager.
#[derive(Clone)]
pub struct RedisPool {
    manager: SharedConnectionManager,
    endpoint: String,
}

impl RedisPool {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let info: ConnectionInfo = redis_url
            .into_connection_info()
            .context("failed to parse REDIS_URL connection string")?;
        let endpoint = describe_endpoint(&info);

        let client = Client::open(info).context("failed to construct Redis client")?;
        let connection_manager = ConnectionManager::new(client)
            .await
            .context("failed to initialize Redis connection manager")?;

        info!(endpoint = %endpoint, "Redis connection manager ready");

        Ok(Self {
            manager: Arc::new(Mutex::new(connection_manager)),
            endpoint,
        })
    }

    pub fn manager(&self) -> SharedConnectionManager {
        self.manager.clone()
    }

    /// Host/port label safe to log (credentials are never included).
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Round-trip a PING through any shared manager.
pub async fn ping(manager: &SharedConnectionManager) -> Result<(), RedisError> {
    let mut conn = manager.lock().await;
    let pong: String = redis::cmd("PING").query_async(&mut *conn).await?;
    if pong == "PONG" {
        Ok(())
    } else {
        Err(RedisError::from((
            redis::ErrorKind::ResponseError,
            "unexpected PING response",
        )))
    }
}

fn describe_endpoint(info: &ConnectionInfo) -> String {
    #[allow(unreachable_patterns)]
    let addr = match &info.addr {
        ConnectionAddr::Tcp(host, port) => format!("redis://{}:{}", host, port),
        ConnectionAddr::TcpTls { host, port, .. } => format!("rediss://{}:{}", host, port),
        ConnectionAddr::Unix(path) => format!("unix://{}", path.display()),
        other => format!("{:?}", other),
    };
    format!("{}/{}", addr, info.redis.db)
}
