//! Jackpot store on RocksDB
//!
//! Records are JSON values under typed key prefixes. The win ledger keeps two
//! empty-valued index families whose keys sort newest-first, so ledger queries
//! are forward prefix scans.
//!
//! Writes go through [`JackpotStore::transaction`], which runs on a pessimistic
//! `TransactionDB`: `lock_jackpot` takes an exclusive row lock that serializes
//! concurrent settlements of the same jackpot.

use crate::{
    common::types::{Bet, Jackpot, PageRequest, Win, WinFilter},
    config::StorageConfig,
    errors::{JackpotResult, StorageError},
};
use chrono::{DateTime, Utc};
use rocksdb::{Direction, IteratorMode, Options, TransactionDB, TransactionDBOptions};
use serde::{de::DeserializeOwned, Serialize};
use std::{path::Path, sync::Arc};
use uuid::Uuid;

const JACKPOT_PREFIX: &[u8] = b"jackpot:record:";
const BET_PREFIX: &[u8] = b"bet:record:";
const BET_JACKPOT_INDEX_PREFIX: &[u8] = b"bet:index:jackpot:";
const WIN_PREFIX: &[u8] = b"win:record:";
const WIN_RECENT_INDEX_PREFIX: &[u8] = b"win:index:recent:";
const WIN_JACKPOT_INDEX_PREFIX: &[u8] = b"win:index:jackpot:";

fn record_key(prefix: &[u8], id: Uuid) -> Vec<u8> {
    let mut key = Vec::with_capacity(prefix.len() + 16);
    key.extend_from_slice(prefix);
    key.extend_from_slice(id.as_bytes());
    key
}

fn micros(ts: DateTime<Utc>) -> u64 {
    ts.timestamp_micros().max(0) as u64
}

fn bet_jackpot_index_key(bet: &Bet) -> Vec<u8> {
    // prefix | jackpot_id | created_at(be) | bet_id  -> oldest first
    let mut key = record_key(BET_JACKPOT_INDEX_PREFIX, bet.jackpot_id);
    key.extend_from_slice(&micros(bet.created_at).to_be_bytes());
    key.extend_from_slice(bet.id.as_bytes());
    key
}

fn win_recent_index_key(win: &Win) -> Vec<u8> {
    // prefix | inv_timestamp(be) | win_id  -> newest first
    let inv_ts = u64::MAX - micros(win.timestamp);
    let mut key = Vec::with_capacity(WIN_RECENT_INDEX_PREFIX.len() + 24);
    key.extend_from_slice(WIN_RECENT_INDEX_PREFIX);
    key.extend_from_slice(&inv_ts.to_be_bytes());
    key.extend_from_slice(win.id.as_bytes());
    key
}

fn win_jackpot_index_key(win: &Win) -> Vec<u8> {
    // prefix | jackpot_id | inv_timestamp(be) | win_id
    let inv_ts = u64::MAX - micros(win.timestamp);
    let mut key = record_key(WIN_JACKPOT_INDEX_PREFIX, win.jackpot_id);
    key.extend_from_slice(&inv_ts.to_be_bytes());
    key.extend_from_slice(win.id.as_bytes());
    key
}

/// Every index key ends with the 16-byte id of the record it points at
fn trailing_id(key: &[u8]) -> JackpotResult<Uuid> {
    if key.len() < 16 {
        return Err(StorageError::CorruptedData(format!("Index key too short: {} bytes", key.len())).into());
    }
    let bytes: [u8; 16] = key[key.len() - 16..]
        .try_into()
        .map_err(|_| StorageError::CorruptedData("Invalid id bytes in index key".to_string()))?;
    Ok(Uuid::from_bytes(bytes))
}

fn encode<T: Serialize>(value: &T, what: &str) -> JackpotResult<Vec<u8>> {
    serde_json::to_vec(value)
        .map_err(|e| StorageError::WriteFailed(format!("Failed to encode {}: {}", what, e)).into())
}

fn decode<T: DeserializeOwned>(bytes: &[u8], what: &str) -> JackpotResult<T> {
    serde_json::from_slice(bytes)
        .map_err(|e| StorageError::CorruptedData(format!("Failed to decode {}: {}", what, e)).into())
}

/// Persistent store for jackpots, bets and wins
#[derive(Clone)]
pub struct JackpotStore {
    db: Arc<TransactionDB>,
}

impl JackpotStore {
    /// Open (or create) the store at `path` with default settings
    pub fn open<P: AsRef<Path>>(path: P) -> JackpotResult<Self> {
        let config = StorageConfig {
            data_directory: path.as_ref().to_string_lossy().to_string(),
            ..Default::default()
        };
        Self::open_with_config(&config)
    }

    pub fn open_with_config(config: &StorageConfig) -> JackpotResult<Self> {
        if config.clear_on_start && Path::new(&config.data_directory).exists() {
            std::fs::remove_dir_all(&config.data_directory).map_err(|e| {
                StorageError::DatabaseOpenFailed(format!("Failed to clear {}: {}", config.data_directory, e))
            })?;
        }

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);

        let mut txn_opts = TransactionDBOptions::default();
        txn_opts.set_txn_lock_timeout(config.lock_timeout_ms as i64);

        let db = TransactionDB::open(&opts, &txn_opts, &config.data_directory)
            .map_err(|e| StorageError::DatabaseOpenFailed(e.to_string()))?;

        tracing::info!(path = %config.data_directory, "Jackpot store opened");
        Ok(Self { db: Arc::new(db) })
    }

    /// Run `f` inside one store transaction.
    ///
    /// Commits when `f` returns `Ok`; rolls back on any error from `f` or
    /// from the commit itself.
    pub fn transaction<T, F>(&self, f: F) -> JackpotResult<T>
    where
        F: FnOnce(&StoreTxn<'_>) -> JackpotResult<T>,
    {
        let txn = StoreTxn { inner: self.db.transaction() };

        match f(&txn) {
            Ok(value) => {
                txn.inner
                    .commit()
                    .map_err(|e| StorageError::CommitFailed(e.to_string()))?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.inner.rollback() {
                    tracing::warn!(error = %rollback_err, "Transaction rollback failed");
                }
                Err(e)
            }
        }
    }

    pub fn insert_jackpot(&self, jackpot: &Jackpot) -> JackpotResult<()> {
        self.transaction(|txn| txn.put_jackpot(jackpot))
    }

    pub fn load_jackpot(&self, id: Uuid) -> JackpotResult<Option<Jackpot>> {
        self.load_record(&record_key(JACKPOT_PREFIX, id), "jackpot")
    }

    /// All jackpots, oldest first
    pub fn load_jackpots(&self) -> JackpotResult<Vec<Jackpot>> {
        let mut jackpots = Vec::new();
        self.scan_prefix(JACKPOT_PREFIX, |_key, value| {
            jackpots.push(decode::<Jackpot>(value, "jackpot")?);
            Ok(true)
        })?;
        jackpots.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(jackpots)
    }

    /// Bets placed against one jackpot, oldest first
    pub fn load_bets_for_jackpot(&self, jackpot_id: Uuid) -> JackpotResult<Vec<Bet>> {
        let prefix = record_key(BET_JACKPOT_INDEX_PREFIX, jackpot_id);
        let mut bets = Vec::new();
        self.scan_prefix(&prefix, |key, _value| {
            let bet_id = trailing_id(key)?;
            let bet = self
                .load_record::<Bet>(&record_key(BET_PREFIX, bet_id), "bet")?
                .ok_or_else(|| StorageError::CorruptedData(format!("Bet index points at missing bet {}", bet_id)))?;
            bets.push(bet);
            Ok(true)
        })?;
        Ok(bets)
    }

    /// Wins matching `filter`, newest first, windowed by `page`
    pub fn load_wins(&self, filter: &WinFilter, page: PageRequest) -> JackpotResult<Vec<Win>> {
        // The per-jackpot index narrows the scan when a jackpot is named.
        let prefix = match filter.jackpot_id {
            Some(jackpot_id) => record_key(WIN_JACKPOT_INDEX_PREFIX, jackpot_id),
            None => WIN_RECENT_INDEX_PREFIX.to_vec(),
        };

        let mut wins = Vec::with_capacity(page.limit.min(256));
        let mut skipped = 0usize;
        if page.limit == 0 {
            return Ok(wins);
        }

        self.scan_prefix(&prefix, |key, _value| {
            let win_id = trailing_id(key)?;
            let win = self
                .load_record::<Win>(&record_key(WIN_PREFIX, win_id), "win")?
                .ok_or_else(|| StorageError::CorruptedData(format!("Win index points at missing win {}", win_id)))?;

            if !filter.matches(&win) {
                return Ok(true);
            }
            if skipped < page.offset {
                skipped += 1;
                return Ok(true);
            }
            wins.push(win);
            Ok(wins.len() < page.limit)
        })?;

        Ok(wins)
    }

    fn load_record<T: DeserializeOwned>(&self, key: &[u8], what: &str) -> JackpotResult<Option<T>> {
        let bytes = self
            .db
            .get(key)
            .map_err(|e| StorageError::ReadFailed(e.to_string()))?;
        bytes.map(|b| decode(&b, what)).transpose()
    }

    /// Visit every key under `prefix` in order until `visit` returns false
    fn scan_prefix<F>(&self, prefix: &[u8], mut visit: F) -> JackpotResult<()>
    where
        F: FnMut(&[u8], &[u8]) -> JackpotResult<bool>,
    {
        for item in self.db.iterator(IteratorMode::From(prefix, Direction::Forward)) {
            let (key, value) = item.map_err(|e| StorageError::ReadFailed(e.to_string()))?;
            if !key.starts_with(prefix) {
                break;
            }
            if !visit(&key[..], &value[..])? {
                break;
            }
        }
        Ok(())
    }
}

/// Handle passed to [`JackpotStore::transaction`] closures
pub struct StoreTxn<'db> {
    inner: rocksdb::Transaction<'db, TransactionDB>,
}

impl StoreTxn<'_> {
    /// Read a jackpot and hold an exclusive lock on it until commit/rollback
    pub fn lock_jackpot(&self, id: Uuid) -> JackpotResult<Option<Jackpot>> {
        let bytes = self
            .inner
            .get_for_update(record_key(JACKPOT_PREFIX, id), true)
            .map_err(|e| StorageError::ReadFailed(e.to_string()))?;
        bytes.map(|b| decode(&b, "jackpot")).transpose()
    }

    pub fn put_jackpot(&self, jackpot: &Jackpot) -> JackpotResult<()> {
        let value = encode(jackpot, "jackpot")?;
        self.put(record_key(JACKPOT_PREFIX, jackpot.id), value)
    }

    pub fn put_bet(&self, bet: &Bet) -> JackpotResult<()> {
        let value = encode(bet, "bet")?;
        self.put(record_key(BET_PREFIX, bet.id), value)?;
        self.put(bet_jackpot_index_key(bet), Vec::new())
    }

    pub fn put_win(&self, win: &Win) -> JackpotResult<()> {
        let value = encode(win, "win")?;
        self.put(record_key(WIN_PREFIX, win.id), value)?;
        self.put(win_recent_index_key(win), Vec::new())?;
        self.put(win_jackpot_index_key(win), Vec::new())
    }

    fn put(&self, key: Vec<u8>, value: Vec<u8>) -> JackpotResult<()> {
        self.inner
            .put(key, value)
            .map_err(|e| StorageError::WriteFailed(e.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::JackpotError;
    use chrono::Duration;
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    fn open_store() -> (TempDir, JackpotStore) {
        let dir = TempDir::new().unwrap();
        let store = JackpotStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_jackpot_round_trip() {
        let (_dir, store) = open_store();
        let jackpot = Jackpot::new("Daily".to_string(), 0.5);

        store.insert_jackpot(&jackpot).unwrap();

        assert_eq!(store.load_jackpot(jackpot.id).unwrap(), Some(jackpot));
        assert_eq!(store.load_jackpot(Uuid::new_v4()).unwrap(), None);
    }

    #[test]
    fn test_failed_transaction_writes_nothing() {
        let (_dir, store) = open_store();
        let jackpot = Jackpot::new("Daily".to_string(), 0.5);

        let result: JackpotResult<()> = store.transaction(|txn| {
            txn.put_jackpot(&jackpot)?;
            Err(JackpotError::InvalidRequest("abort".to_string()))
        });

        assert!(result.is_err());
        assert_eq!(store.load_jackpot(jackpot.id).unwrap(), None);
    }

    #[test]
    fn test_wins_scan_newest_first() {
        let (_dir, store) = open_store();
        let jackpot_id = Uuid::new_v4();
        let base = Utc::now();
        for (i, amount) in [100, 200, 300].into_iter().enumerate() {
            let win = Win::new(
                jackpot_id,
                "alice".to_string(),
                Decimal::from(amount),
                base + Duration::seconds(i as i64),
            );
            store.transaction(|txn| txn.put_win(&win)).unwrap();
        }

        let wins = store
            .load_wins(&WinFilter::default(), PageRequest { limit: 10, offset: 0 })
            .unwrap();

        let amounts: Vec<Decimal> = wins.iter().map(|w| w.win_amount).collect();
        assert_eq!(amounts, vec![Decimal::from(300), Decimal::from(200), Decimal::from(100)]);
    }

    #[test]
    fn test_bets_indexed_by_jackpot() {
        let (_dir, store) = open_store();
        let jackpot = Jackpot::new("Daily".to_string(), 0.0);
        let other = Jackpot::new("Weekly".to_string(), 0.0);
        let bet = Bet::new(jackpot.id, "bob".to_string(), Decimal::TEN);

        store
            .transaction(|txn| {
                txn.put_jackpot(&jackpot)?;
                txn.put_jackpot(&other)?;
                txn.put_bet(&bet)
            })
            .unwrap();

        assert_eq!(store.load_bets_for_jackpot(jackpot.id).unwrap(), vec![bet]);
        assert!(store.load_bets_for_jackpot(other.id).unwrap().is_empty());
    }
}
