//! Win ledger queries

use crate::{
    common::types::{PageRequest, Win, WinFilter},
    errors::{JackpotError, JackpotResult},
    storage::JackpotStore,
};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Read side of the append-only win ledger
#[derive(Clone)]
pub struct WinLedger {
    store: JackpotStore,
    default_page_size: usize,
}

impl WinLedger {
    pub fn new(store: JackpotStore, default_page_size: usize) -> Self {
        Self { store, default_page_size }
    }

    /// Wins newest first, filtered conjunctively and windowed by
    /// `limit`/`offset`. Non-positive limits use the default page size and
    /// negative offsets are treated as zero.
    pub fn query(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
        player_alias: Option<String>,
        jackpot_id: Option<Uuid>,
    ) -> JackpotResult<Vec<Win>> {
        let page = PageRequest::normalize(limit, offset, self.default_page_size);
        let filter = WinFilter { player_alias, jackpot_id };
        self.store.load_wins(&filter, page)
    }

    /// Append a win that did not come from settlement (imports, back-fills).
    ///
    /// The jackpot's `win_count` and `last_win_timestamp` are updated in the
    /// same transaction; its pool is left as is.
    pub fn record(&self, win: &Win) -> JackpotResult<()> {
        if win.player_alias.trim().is_empty() {
            return Err(JackpotError::InvalidRequest("playerAlias is required".to_string()));
        }
        if win.win_amount < Decimal::ZERO {
            return Err(JackpotError::InvalidRequest("winAmount must be >= 0".to_string()));
        }

        self.store.transaction(|txn| {
            let mut jackpot = txn
                .lock_jackpot(win.jackpot_id)?
                .ok_or(JackpotError::JackpotNotFound(win.jackpot_id))?;
            jackpot.count_win(win.timestamp);
            txn.put_win(win)?;
            txn.put_jackpot(&jackpot)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::Jackpot;
    use chrono::{Duration, Utc};
    use rust_decimal::prelude::ToPrimitive;
    use tempfile::TempDir;

    fn add_jackpot(store: &JackpotStore, name: &str) -> Uuid {
        let jackpot = Jackpot::new(name.to_string(), 0.0);
        store.insert_jackpot(&jackpot).unwrap();
        jackpot.id
    }

    struct Seeded {
        _dir: TempDir,
        store: JackpotStore,
        ledger: WinLedger,
        jackpot_a: Uuid,
        jackpot_b: Uuid,
    }

    /// Five wins one second apart:
    /// t0 alice/A 100, t1 bob/A 200, t2 alice/B 300, t3 bob/B 400, t4 alice/A 500
    fn seeded() -> Seeded {
        let dir = TempDir::new().unwrap();
        let store = JackpotStore::open(dir.path()).unwrap();
        let ledger = WinLedger::new(store.clone(), 10);
        let jackpot_a = add_jackpot(&store, "A");
        let jackpot_b = add_jackpot(&store, "B");
        let base = Utc::now() - Duration::minutes(5);

        let rows = [
            ("alice", jackpot_a, 100),
            ("bob", jackpot_a, 200),
            ("alice", jackpot_b, 300),
            ("bob", jackpot_b, 400),
            ("alice", jackpot_a, 500),
        ];
        for (i, (alias, jackpot, amount)) in rows.into_iter().enumerate() {
            let win = Win::new(jackpot, alias.to_string(), Decimal::from(amount), base + Duration::seconds(i as i64));
            ledger.record(&win).unwrap();
        }

        Seeded { _dir: dir, store, ledger, jackpot_a, jackpot_b }
    }

    fn amounts(wins: &[Win]) -> Vec<i64> {
        wins.iter().map(|w| w.win_amount.to_i64().unwrap()).collect()
    }

    fn assert_descending(wins: &[Win]) {
        assert!(wins.windows(2).all(|w| w[0].timestamp > w[1].timestamp));
    }

    #[test]
    fn test_no_filter_returns_all_newest_first() {
        let s = seeded();

        let wins = s.ledger.query(None, None, None, None).unwrap();

        assert_eq!(amounts(&wins), vec![500, 400, 300, 200, 100]);
        assert_descending(&wins);
    }

    #[test]
    fn test_alias_filter() {
        let s = seeded();

        let wins = s.ledger.query(None, None, Some("alice".to_string()), None).unwrap();

        assert_eq!(amounts(&wins), vec![500, 300, 100]);
        assert!(wins.iter().all(|w| w.player_alias == "alice"));
        assert_descending(&wins);
    }

    #[test]
    fn test_jackpot_filter() {
        let s = seeded();

        let wins = s.ledger.query(None, None, None, Some(s.jackpot_b)).unwrap();

        assert_eq!(amounts(&wins), vec![400, 300]);
        assert!(wins.iter().all(|w| w.jackpot_id == s.jackpot_b));
    }

    #[test]
    fn test_both_filters_intersect() {
        let s = seeded();

        let wins = s
            .ledger
            .query(None, None, Some("bob".to_string()), Some(s.jackpot_a))
            .unwrap();

        assert_eq!(amounts(&wins), vec![200]);
    }

    #[test]
    fn test_pagination_with_filter() {
        let s = seeded();

        let wins = s
            .ledger
            .query(Some(1), Some(1), None, Some(s.jackpot_a))
            .unwrap();

        assert_eq!(amounts(&wins), vec![200]);
    }

    #[test]
    fn test_limit_and_offset_coercion() {
        let s = seeded();

        let wins = s.ledger.query(Some(0), Some(-4), None, None).unwrap();
        assert_eq!(wins.len(), 5);

        let wins = s.ledger.query(Some(2), Some(10), None, None).unwrap();
        assert!(wins.is_empty());
    }

    #[test]
    fn test_default_page_size_caps_result() {
        let dir = TempDir::new().unwrap();
        let store = JackpotStore::open(dir.path()).unwrap();
        let ledger = WinLedger::new(store.clone(), 3);
        let jackpot = add_jackpot(&store, "Z");
        for i in 0..5 {
            ledger
                .record(&Win::new(jackpot, "zed".to_string(), Decimal::from(i), Utc::now() + Duration::milliseconds(i)))
                .unwrap();
        }

        assert_eq!(ledger.query(None, None, None, None).unwrap().len(), 3);
    }

    #[test]
    fn test_record_counts_win_against_jackpot() {
        let s = seeded();

        for jackpot_id in [s.jackpot_a, s.jackpot_b] {
            let jackpot = s.store.load_jackpot(jackpot_id).unwrap().unwrap();
            let wins = s.ledger.query(Some(100), None, None, Some(jackpot_id)).unwrap();
            assert_eq!(jackpot.win_count as usize, wins.len());
            assert_eq!(jackpot.last_win_timestamp, wins.first().map(|w| w.timestamp));
            assert_eq!(jackpot.current_size, Decimal::ZERO);
        }
    }

    #[test]
    fn test_record_rejects_unknown_jackpot_and_negative_amount() {
        let s = seeded();
        let missing = Uuid::new_v4();

        let unknown = s.ledger.record(&Win::new(missing, "x".to_string(), Decimal::ONE, Utc::now()));
        assert!(matches!(unknown, Err(JackpotError::JackpotNotFound(id)) if id == missing));

        let negative = s
            .ledger
            .record(&Win::new(s.jackpot_a, "x".to_string(), Decimal::from(-5), Utc::now()));
        assert!(matches!(negative, Err(JackpotError::InvalidRequest(_))));

        assert!(s.ledger.query(None, None, None, Some(missing)).unwrap().is_empty());
        let jackpot_a = s.store.load_jackpot(s.jackpot_a).unwrap().unwrap();
        assert_eq!(jackpot_a.win_count, 3);
        assert_eq!(s.ledger.query(None, None, None, Some(s.jackpot_a)).unwrap().len(), 3);
    }
}
