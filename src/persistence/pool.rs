//! Bounded pool of reusable database connections.
//!
//! [`ConnectionPool`] hands out at most `max_connections` handles at a time.
//! Slots are tracked by a fair [`Semaphore`], so callers beyond the limit
//! queue in arrival order. Idle connections are kept in a short, never
//! awaited-under mutex and reused before new ones are opened.
//!
//! A [`PooledConnection`] gives its slot back when dropped, so every exit
//! path of a handler (success, business error, statement failure, panic)
//! releases exactly once. [`PooledConnection::release`] makes the hand-back
//! explicit at the call site.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use super::statement::{Statement, WriteOutcome};
use crate::domain::Record;
use crate::error::{AcquireError, StatementError};

/// Opens new connections for the pool.
#[async_trait]
pub trait Connector: Send + Sync + fmt::Debug {
    /// Opens one connection.
    ///
    /// # Errors
    ///
    /// Returns [`AcquireError::Connect`] when the backend is unreachable or
    /// rejects the credentials.
    async fn connect(&self) -> Result<Box<dyn Connection>, AcquireError>;
}

/// A live connection able to run one statement at a time.
#[async_trait]
pub trait Connection: Send + fmt::Debug {
    /// Runs a read statement and decodes every returned row.
    ///
    /// # Errors
    ///
    /// Returns a [`StatementError`] if the statement fails or a row cannot
    /// be decoded.
    async fn fetch_all(&mut self, statement: &Statement) -> Result<Vec<Record>, StatementError>;

    /// Runs a write statement.
    ///
    /// # Errors
    ///
    /// Returns a [`StatementError`] if the statement fails.
    async fn execute(&mut self, statement: &Statement) -> Result<WriteOutcome, StatementError>;

    /// Closes the connection gracefully.
    async fn close(self: Box<Self>);
}

/// Pool sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolOptions {
    /// Upper bound on concurrently checked-out connections (at least 1).
    pub max_connections: u32,
    /// How long `acquire` may wait for a slot. `None` waits indefinitely.
    pub acquire_timeout: Option<Duration>,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout: None,
        }
    }
}

/// Snapshot of the pool counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    /// Configured limit.
    pub max_connections: u32,
    /// Slots that can be acquired right now without waiting.
    pub available: u32,
    /// Handles currently checked out.
    pub in_use: u32,
    /// Open connections parked for reuse.
    pub idle: u32,
}

/// Cloneable handle to a shared connection pool.
///
/// Constructed once at startup and injected into every handler through
/// [`crate::app_state::AppState`].
#[derive(Debug, Clone)]
pub struct ConnectionPool {
    shared: Arc<SharedPool>,
}

#[derive(Debug)]
struct SharedPool {
    connector: Arc<dyn Connector>,
    idle: Mutex<Vec<Box<dyn Connection>>>,
    slots: Arc<Semaphore>,
    max_connections: u32,
    acquire_timeout: Option<Duration>,
}

impl SharedPool {
    fn lock_idle(&self) -> MutexGuard<'_, Vec<Box<dyn Connection>>> {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ConnectionPool {
    /// Creates an empty pool. No connection is opened until the first
    /// [`acquire`](Self::acquire).
    #[must_use]
    pub fn new(connector: Arc<dyn Connector>, options: PoolOptions) -> Self {
        let max_connections = options.max_connections.max(1);
        Self {
            shared: Arc::new(SharedPool {
                connector,
                idle: Mutex::new(Vec::new()),
                slots: Arc::new(Semaphore::new(max_connections as usize)),
                max_connections,
                acquire_timeout: options.acquire_timeout,
            }),
        }
    }

    /// Checks a connection out, waiting for a free slot if all are in use.
    ///
    /// A failed connect gives the slot straight back.
    ///
    /// # Errors
    ///
    /// Returns [`AcquireError::TimedOut`] when the acquire timeout elapses,
    /// [`AcquireError::Closed`] after [`close`](Self::close), and
    /// [`AcquireError::Connect`] when a new connection cannot be opened.
    pub async fn acquire(&self) -> Result<PooledConnection, AcquireError> {
        let permit = self.acquire_slot().await?;

        let reused = self.shared.lock_idle().pop();
        let conn = match reused {
            Some(conn) => conn,
            None => {
                tracing::debug!("opening new database connection");
                self.shared.connector.connect().await?
            }
        };

        Ok(PooledConnection {
            conn: Some(conn),
            permit: Some(permit),
            pool: Arc::clone(&self.shared),
            broken: false,
            in_flight: false,
        })
    }

    async fn acquire_slot(&self) -> Result<OwnedSemaphorePermit, AcquireError> {
        let slots = Arc::clone(&self.shared.slots);
        let acquired = match self.shared.acquire_timeout {
            Some(waited) => tokio::time::timeout(waited, slots.acquire_owned())
                .await
                .map_err(|_| AcquireError::TimedOut {
                    waited,
                    max_connections: self.shared.max_connections,
                })?,
            None => slots.acquire_owned().await,
        };
        acquired.map_err(|_| AcquireError::Closed)
    }

    /// Current counters.
    #[must_use]
    pub fn status(&self) -> PoolStatus {
        let max_connections = self.shared.max_connections;
        let available = u32::try_from(self.shared.slots.available_permits())
            .unwrap_or(max_connections)
            .min(max_connections);
        let idle = u32::try_from(self.shared.lock_idle().len()).unwrap_or(u32::MAX);
        PoolStatus {
            max_connections,
            available,
            in_use: max_connections - available,
            idle,
        }
    }

    /// Whether [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.slots.is_closed()
    }

    /// Closes the pool: pending and future acquires fail with
    /// [`AcquireError::Closed`], idle connections are closed, and handles
    /// still checked out are discarded when released.
    pub async fn close(&self) {
        let idle = {
            let mut idle = self.shared.lock_idle();
            self.shared.slots.close();
            std::mem::take(&mut *idle)
        };
        let count = idle.len();
        for conn in idle {
            conn.close().await;
        }
        tracing::info!(closed = count, "connection pool closed");
    }
}

/// A checked-out connection.
///
/// Dropping the handle returns the connection to the idle set and frees
/// its slot. A connection that lost its link during a statement, or whose
/// statement was abandoned before it completed, is discarded instead; the
/// slot is freed either way.
#[derive(Debug)]
pub struct PooledConnection {
    conn: Option<Box<dyn Connection>>,
    permit: Option<OwnedSemaphorePermit>,
    pool: Arc<SharedPool>,
    broken: bool,
    in_flight: bool,
}

impl PooledConnection {
    /// Runs a read statement on this connection.
    ///
    /// # Errors
    ///
    /// Propagates the [`StatementError`] from the connection.
    pub async fn fetch_all(&mut self, statement: &Statement) -> Result<Vec<Record>, StatementError> {
        let Some(conn) = self.conn.as_mut() else {
            return Err(StatementError::ConnectionLost(
                "connection already released".to_string(),
            ));
        };
        self.in_flight = true;
        let result = conn.fetch_all(statement).await;
        self.in_flight = false;
        self.observe(result)
    }

    /// Runs a write statement on this connection.
    ///
    /// # Errors
    ///
    /// Propagates the [`StatementError`] from the connection.
    pub async fn execute(&mut self, statement: &Statement) -> Result<WriteOutcome, StatementError> {
        let Some(conn) = self.conn.as_mut() else {
            return Err(StatementError::ConnectionLost(
                "connection already released".to_string(),
            ));
        };
        self.in_flight = true;
        let result = conn.execute(statement).await;
        self.in_flight = false;
        self.observe(result)
    }

    /// Returns the connection to the pool.
    pub fn release(self) {
        drop(self);
    }

    fn observe<T>(&mut self, result: Result<T, StatementError>) -> Result<T, StatementError> {
        if let Err(err) = &result
            && err.is_connection_lost()
        {
            self.broken = true;
        }
        result
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            let mut idle = self.pool.lock_idle();
            // Checked under the idle lock so a concurrent close cannot miss it.
            if self.broken || self.in_flight || self.pool.slots.is_closed() {
                drop(idle);
                tracing::debug!(
                    broken = self.broken,
                    in_flight = self.in_flight,
                    "discarding database connection"
                );
            } else {
                idle.push(conn);
            }
        }
        // Park the connection before the slot opens so the next acquirer reuses it.
        drop(self.permit.take());
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio_test::{assert_pending, assert_ready};

    use super::*;
    use crate::domain::Entity;

    #[derive(Debug, Default)]
    struct CountingConnector {
        opened: AtomicUsize,
    }

    #[async_trait]
    impl Connector for CountingConnector {
        async fn connect(&self) -> Result<Box<dyn Connection>, AcquireError> {
            let serial = self.opened.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(StubConnection { serial }))
        }
    }

    #[derive(Debug)]
    struct StubConnection {
        serial: usize,
    }

    #[async_trait]
    impl Connection for StubConnection {
        async fn fetch_all(&mut self, statement: &Statement) -> Result<Vec<Record>, StatementError> {
            if statement.sql().contains("LOST") {
                return Err(StatementError::ConnectionLost("reset by peer".to_string()));
            }
            if statement.sql().contains("BAD") {
                return Err(StatementError::Database("syntax error".to_string()));
            }
            if statement.sql().contains("HANG") {
                std::future::pending::<()>().await;
            }
            Ok(Vec::new())
        }

        async fn execute(&mut self, _statement: &Statement) -> Result<WriteOutcome, StatementError> {
            Ok(WriteOutcome {
                rows_affected: 1,
                last_insert_id: i64::try_from(self.serial).ok(),
            })
        }

        async fn close(self: Box<Self>) {}
    }

    #[derive(Debug)]
    struct RefusingConnector;

    #[async_trait]
    impl Connector for RefusingConnector {
        async fn connect(&self) -> Result<Box<dyn Connection>, AcquireError> {
            Err(AcquireError::Connect("connection refused".to_string()))
        }
    }

    fn pool_with(max_connections: u32, acquire_timeout: Option<Duration>) -> (ConnectionPool, Arc<CountingConnector>) {
        let connector = Arc::new(CountingConnector::default());
        let pool = ConnectionPool::new(
            Arc::clone(&connector) as Arc<dyn Connector>,
            PoolOptions {
                max_connections,
                acquire_timeout,
            },
        );
        (pool, connector)
    }

    #[tokio::test]
    async fn release_restores_available_count() {
        let (pool, _) = pool_with(3, None);
        let before = pool.status();
        assert_eq!(before.available, 3);

        let Ok(conn) = pool.acquire().await else {
            panic!("acquire should succeed");
        };
        assert_eq!(pool.status().available, 2);
        assert_eq!(pool.status().in_use, 1);

        conn.release();
        let after = pool.status();
        assert_eq!(after.available, before.available);
        assert_eq!(after.idle, 1);
    }

    #[tokio::test]
    async fn idle_connections_are_reused() {
        let (pool, connector) = pool_with(2, None);
        for _ in 0..5 {
            let Ok(conn) = pool.acquire().await else {
                panic!("acquire should succeed");
            };
            conn.release();
        }
        assert_eq!(connector.opened.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn acquisitions_up_to_limit_succeed() {
        let (pool, connector) = pool_with(10, None);
        let mut held = Vec::new();
        for _ in 0..10 {
            let Ok(conn) = pool.acquire().await else {
                panic!("acquire within limit should succeed");
            };
            held.push(conn);
        }
        assert_eq!(pool.status().available, 0);
        assert_eq!(connector.opened.load(Ordering::SeqCst), 10);
        drop(held);
        assert_eq!(pool.status().available, 10);
        assert_eq!(pool.status().idle, 10);
    }

    #[tokio::test]
    async fn acquirer_beyond_limit_queues_until_release() {
        let (pool, _) = pool_with(2, None);
        let Ok(first) = pool.acquire().await else {
            panic!("first acquire");
        };
        let Ok(second) = pool.acquire().await else {
            panic!("second acquire");
        };

        let mut waiter = tokio_test::task::spawn(pool.acquire());
        assert_pending!(waiter.poll());

        first.release();
        assert!(waiter.is_woken());
        let Ok(third) = assert_ready!(waiter.poll()) else {
            panic!("queued acquire should succeed after release");
        };

        assert_eq!(pool.status().available, 0);
        drop(third);
        drop(second);
        assert_eq!(pool.status().available, 2);
    }

    #[tokio::test]
    async fn acquirer_beyond_limit_times_out_when_configured() {
        let (pool, _) = pool_with(1, Some(Duration::from_millis(20)));
        let Ok(held) = pool.acquire().await else {
            panic!("first acquire");
        };

        let result = pool.acquire().await;
        let Err(AcquireError::TimedOut {
            max_connections, ..
        }) = result
        else {
            panic!("second acquire should time out");
        };
        assert_eq!(max_connections, 1);

        held.release();
        assert_eq!(pool.status().available, 1);
    }

    #[tokio::test]
    async fn failed_connect_does_not_leak_a_slot() {
        let pool = ConnectionPool::new(
            Arc::new(RefusingConnector),
            PoolOptions {
                max_connections: 1,
                acquire_timeout: Some(Duration::from_millis(20)),
            },
        );
        for _ in 0..3 {
            let result = pool.acquire().await;
            assert!(matches!(result, Err(AcquireError::Connect(_))));
            assert_eq!(pool.status().available, 1);
        }
    }

    #[tokio::test]
    async fn statement_failure_keeps_connection_but_lost_link_discards_it() {
        let (pool, connector) = pool_with(1, None);

        let Ok(mut conn) = pool.acquire().await else {
            panic!("acquire");
        };
        let result = conn.fetch_all(&Statement::new("BAD", Vec::new())).await;
        assert!(matches!(result, Err(StatementError::Database(_))));
        conn.release();
        assert_eq!(pool.status().idle, 1);

        let Ok(mut conn) = pool.acquire().await else {
            panic!("acquire");
        };
        let result = conn.fetch_all(&Statement::new("LOST", Vec::new())).await;
        assert!(matches!(result, Err(StatementError::ConnectionLost(_))));
        conn.release();
        assert_eq!(pool.status().idle, 0);
        assert_eq!(pool.status().available, 1);

        let Ok(conn) = pool.acquire().await else {
            panic!("acquire after discard");
        };
        conn.release();
        assert_eq!(connector.opened.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn abandoned_statement_discards_connection() {
        let (pool, connector) = pool_with(1, None);

        let mut request = tokio_test::task::spawn({
            let pool = pool.clone();
            async move {
                let Ok(mut conn) = pool.acquire().await else {
                    panic!("acquire");
                };
                conn.fetch_all(&Statement::new("HANG", Vec::new())).await
            }
        });
        assert_pending!(request.poll());
        assert_eq!(pool.status().in_use, 1);

        drop(request);
        assert_eq!(pool.status().idle, 0);
        assert_eq!(pool.status().available, 1);

        let Ok(conn) = pool.acquire().await else {
            panic!("acquire after abandoned statement");
        };
        conn.release();
        assert_eq!(connector.opened.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn close_racing_with_release_leaves_no_idle_connection() {
        for _ in 0..100 {
            let (pool, _) = pool_with(4, None);
            let mut held = Vec::new();
            for _ in 0..4 {
                let Ok(conn) = pool.acquire().await else {
                    panic!("acquire");
                };
                held.push(conn);
            }

            let mut releases = Vec::new();
            for conn in held {
                releases.push(tokio::spawn(async move { conn.release() }));
            }
            pool.close().await;
            for release in releases {
                let Ok(()) = release.await else {
                    panic!("release task panicked");
                };
            }
            assert_eq!(pool.status().idle, 0);
        }
    }

    #[tokio::test]
    async fn handle_executes_statements() {
        let (pool, _) = pool_with(1, None);
        let Ok(mut conn) = pool.acquire().await else {
            panic!("acquire");
        };
        let outcome = conn.execute(&Statement::delete(Entity::Seller, 1)).await;
        assert_eq!(outcome.ok().map(|o| o.rows_affected), Some(1));
        let rows = conn.fetch_all(&Statement::select_all(Entity::Seller)).await;
        assert_eq!(rows.ok().map(|r| r.len()), Some(0));
    }

    #[tokio::test]
    async fn close_wakes_waiters_and_rejects_acquire() {
        let (pool, _) = pool_with(1, None);
        let Ok(held) = pool.acquire().await else {
            panic!("acquire");
        };
        let mut waiter = tokio_test::task::spawn(pool.acquire());
        assert_pending!(waiter.poll());

        pool.close().await;
        assert!(pool.is_closed());
        let result = assert_ready!(waiter.poll());
        assert!(matches!(result, Err(AcquireError::Closed)));

        held.release();
        assert_eq!(pool.status().idle, 0);
        assert!(matches!(pool.acquire().await, Err(AcquireError::Closed)));
    }

    #[test]
    fn zero_limit_is_raised_to_one() {
        let (pool, _) = pool_with(0, None);
        assert_eq!(pool.status().max_connections, 1);
        assert_eq!(pool.status().available, 1);
    }
}
