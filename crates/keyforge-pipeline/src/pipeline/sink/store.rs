use crate::pipeline::error::{Error, Result};
use keyforge::GeneratedItem;
use rusqlite::{Connection, params};
use std::path::Path;

// Column names match databases written by earlier wallet generators; the
// secret is stored in `wif`.
const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS tron_wallets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    wif TEXT NOT NULL,
    address TEXT NOT NULL
)";

const INSERT_WALLET: &str = "INSERT INTO tron_wallets (wif, address) VALUES (?1, ?2)";

/// Durable destination for generated items.
///
/// The aggregator owns the store exclusively and calls it from a blocking
/// thread, so implementations may do synchronous I/O.
pub trait Store: Send + 'static {
    /// Creates the backing schema if it does not exist. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the schema cannot be created.
    fn ensure_schema(&mut self) -> Result<()>;

    /// Persists `items` atomically: either all of them are committed or none.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the batch could not be committed. Nothing
    /// from the batch is visible afterwards.
    fn save_batch(&mut self, items: &[GeneratedItem]) -> Result<()>;
}

/// SQLite-backed [`Store`] writing to the `tron_wallets` table.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path`, creating parent directories
    /// as needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the parent directory cannot be created, or
    /// [`Error::Store`] if the database cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path).map_err(Error::store("open database"))?;
        Self::with_connection(conn)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(Error::store("open database"))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        // WAL keeps readers unblocked while batches commit.
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })
        .map_err(Error::store("configure journal mode"))?;
        conn.pragma_update(None, "synchronous", "NORMAL")
            .map_err(Error::store("configure synchronous mode"))?;

        Ok(Self { conn })
    }

    /// Number of persisted wallets.
    pub fn count(&self) -> Result<u64> {
        let rows: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM tron_wallets", [], |row| row.get(0))
            .map_err(Error::store("count wallets"))?;
        Ok(u64::try_from(rows).unwrap_or_default())
    }
}

impl Store for SqliteStore {
    fn ensure_schema(&mut self) -> Result<()> {
        self.conn
            .execute(CREATE_TABLE, [])
            .map_err(Error::store("create schema"))?;
        Ok(())
    }

    fn save_batch(&mut self, items: &[GeneratedItem]) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }

        // Dropping `tx` without committing rolls the whole batch back.
        let tx = self
            .conn
            .transaction()
            .map_err(Error::store("begin transaction"))?;
        {
            let mut stmt = tx
                .prepare(INSERT_WALLET)
                .map_err(Error::store("prepare insert"))?;
            for item in items {
                stmt.execute(params![item.secret(), item.address()])
                    .map_err(Error::store("insert wallet"))?;
            }
        }
        tx.commit().map_err(Error::store("commit batch"))?;

        tracing::debug!("Committed {} wallets", items.len());
        Ok(())
    }
}
