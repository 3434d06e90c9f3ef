//! HMAC-signed SQLite audit ledger.
//!
//! Every screening pass appends one row to `audits(timestamp, anomaly,
//! entropy, seized, hmac)`. The tag is a keyed HMAC-SHA256 over the scalar
//! outputs, so a row edited after the fact fails verification. (A historical
//! variant hashed unkeyed; the keyed form is the one kept — unkeyed tags
//! cannot be re-verified meaningfully.)

use hmac::{Hmac, Mac};
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::Result;

type HmacSha256 = Hmac<Sha256>;

/// One audit row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditRecord {
    pub timestamp: String,
    pub anomaly: f64,
    pub entropy: f64,
    pub seized: f64,
    pub hmac: String,
}

/// Append-only audit store over a single SQLite table.
pub struct AuditStore {
    conn: Connection,
    key: Vec<u8>,
}

impl AuditStore {
    /// Open or create the ledger at `path` and run migration.
    pub fn open(path: &str, key: &[u8]) -> Result<Self> {
        Self::from_connection(Connection::open(path)?, key)
    }

    /// In-memory ledger for demos and tests.
    pub fn open_in_memory(key: &[u8]) -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?, key)
    }

    fn from_connection(conn: Connection, key: &[u8]) -> Result<Self> {
        let store = Self {
            conn,
            key: key.to_vec(),
        };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS audits (
                timestamp TEXT,
                anomaly REAL,
                entropy REAL,
                seized REAL,
                hmac TEXT
            );
            "#,
        )?;
        Ok(())
    }

    /// Tag the scalar outputs of one pass.
    pub fn sign(&self, anomaly: f64, entropy: f64, seized: f64) -> String {
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC accepts any key length");
        mac.update(format!("{anomaly},{entropy},{seized}").as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Sign and insert one row, returning the stored record.
    pub fn append(
        &self,
        timestamp: &str,
        anomaly: f64,
        entropy: f64,
        seized: f64,
    ) -> Result<AuditRecord> {
        let tag = self.sign(anomaly, entropy, seized);
        self.conn.execute(
            "INSERT INTO audits (timestamp, anomaly, entropy, seized, hmac) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![timestamp, anomaly, entropy, seized, tag],
        )?;
        Ok(AuditRecord {
            timestamp: timestamp.to_string(),
            anomaly,
            entropy,
            seized,
            hmac: tag,
        })
    }

    /// Most recent rows, newest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<AuditRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT timestamp, anomaly, entropy, seized, hmac FROM audits ORDER BY rowid DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(AuditRecord {
                timestamp: row.get(0)?,
                anomaly: row.get(1)?,
                entropy: row.get(2)?,
                seized: row.get(3)?,
                hmac: row.get(4)?,
            })
        })?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    pub fn count(&self) -> Result<u64> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM audits", [], |row| row.get(0))?;
        Ok(n as u64)
    }

    /// Re-derive the tag for a record and compare.
    pub fn verify(&self, record: &AuditRecord) -> bool {
        self.sign(record.anomaly, record.entropy, record.seized) == record.hmac
    }
}
