use std::path::{Path, PathBuf};
use std::time::Duration;

use career_core::{CareerWorld, NpcRoster};
use contracts::{DecisionLogDraft, DecisionLogEntry, DecisionLogPage, GameState, NpcRecord, StatDelta};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use thiserror::Error;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("profile already exists: {0}")]
    ProfileExists(String),
}

/// SQLite gateway for profile state, NPC rows, and the decision log.
#[derive(Debug)]
pub struct SqliteProfileStore {
    path: PathBuf,
    conn: Connection,
}

impl SqliteProfileStore {
    /// Open and migrate. Call once per process before serving.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let mut store = Self::connect(path)?;
        store.migrate()?;
        Ok(store)
    }

    /// Open a connection to an already-migrated database.
    pub fn connect(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let conn = Connection::open(path.as_ref())?;
        let mut store = Self {
            path: path.as_ref().to_path_buf(),
            conn,
        };
        store.configure()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start the single write transaction a request runs in. IMMEDIATE takes
    /// the write lock up front so two requests never interleave load and save.
    pub fn begin(&mut self) -> Result<ProfileTx<'_>, PersistenceError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        Ok(ProfileTx { tx })
    }

    pub fn profile_exists(&self, profile_id: &str) -> Result<bool, PersistenceError> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM profiles WHERE profile_id = ?1",
                params![profile_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Decision log rows with id greater than `after_id`, oldest first.
    pub fn list_decisions(
        &self,
        profile_id: &str,
        after_id: Option<i64>,
        page_size: usize,
    ) -> Result<DecisionLogPage, PersistenceError> {
        let limit = i64::try_from(page_size.max(1)).unwrap_or(i64::MAX);
        let mut stmt = self.conn.prepare(
            "SELECT id, decision_id, event_id, game_day, selected_option, consequences_json
             FROM decision_log
             WHERE profile_id = ?1 AND id > ?2
             ORDER BY id ASC
             LIMIT ?3",
        )?;
        let rows = stmt.query_map(
            params![profile_id, after_id.unwrap_or(0), limit.saturating_add(1)],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            },
        )?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, decision_id, event_id, game_day, selected_option, consequences) = row?;
            entries.push(DecisionLogEntry {
                id,
                decision_id,
                event_id,
                game_day: u32::try_from(game_day).unwrap_or(u32::MAX),
                selected_option,
                consequences: serde_json::from_str::<StatDelta>(&consequences)?,
            });
        }

        let next_cursor = if entries.len() > page_size.max(1) {
            entries.truncate(page_size.max(1));
            entries.last().map(|entry| entry.id)
        } else {
            None
        };
        Ok(DecisionLogPage {
            entries,
            next_cursor,
        })
    }

    fn configure(&mut self) -> Result<(), PersistenceError> {
        self.conn.pragma_update(None, "journal_mode", "WAL")?;
        self.conn.pragma_update(None, "foreign_keys", "ON")?;
        self.conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(())
    }

    fn migrate(&mut self) -> Result<(), PersistenceError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS profiles (
                profile_id TEXT PRIMARY KEY,
                schema_version TEXT NOT NULL,
                player_name TEXT NOT NULL,
                country TEXT NOT NULL,
                branch TEXT NOT NULL,
                current_day INTEGER NOT NULL,
                rank_index INTEGER NOT NULL,
                pause_mode TEXT NOT NULL,
                state_json TEXT NOT NULL,
                created_at_ms INTEGER NOT NULL,
                updated_at_ms INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS npc_states (
                profile_id TEXT NOT NULL REFERENCES profiles(profile_id) ON DELETE CASCADE,
                npc_id TEXT NOT NULL,
                slot INTEGER NOT NULL,
                generation INTEGER NOT NULL,
                status TEXT NOT NULL,
                record_json TEXT NOT NULL,
                PRIMARY KEY (profile_id, npc_id)
            );

            CREATE TABLE IF NOT EXISTS decision_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                profile_id TEXT NOT NULL REFERENCES profiles(profile_id) ON DELETE CASCADE,
                decision_id TEXT NOT NULL,
                event_id TEXT NOT NULL,
                game_day INTEGER NOT NULL,
                selected_option TEXT NOT NULL,
                consequences_json TEXT NOT NULL,
                created_at_ms INTEGER NOT NULL,
                UNIQUE (profile_id, decision_id)
            );

            CREATE INDEX IF NOT EXISTS idx_npc_states_profile_slot ON npc_states(profile_id, slot);
            CREATE INDEX IF NOT EXISTS idx_decision_log_profile_id ON decision_log(profile_id, id);
            ",
        )?;

        self.conn.execute(
            "INSERT OR IGNORE INTO schema_migrations(version, name, applied_at)
             VALUES(1, 'initial_v1', 'day-000000')",
            [],
        )?;

        Ok(())
    }
}

/// One request's transaction. Dropping it without `commit` rolls back.
pub struct ProfileTx<'conn> {
    tx: Transaction<'conn>,
}

impl ProfileTx<'_> {
    pub fn load_state(&self, profile_id: &str) -> Result<Option<GameState>, PersistenceError> {
        let payload: Option<String> = self
            .tx
            .query_row(
                "SELECT state_json FROM profiles WHERE profile_id = ?1",
                params![profile_id],
                |row| row.get(0),
            )
            .optional()?;
        match payload {
            Some(raw) => Ok(Some(serde_json::from_str::<GameState>(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn load_roster(&self, profile_id: &str) -> Result<NpcRoster, PersistenceError> {
        let mut stmt = self.tx.prepare(
            "SELECT record_json FROM npc_states WHERE profile_id = ?1 ORDER BY npc_id ASC",
        )?;
        let rows = stmt.query_map(params![profile_id], |row| row.get::<_, String>(0))?;
        let mut records = Vec::new();
        for row in rows {
            records.push(serde_json::from_str::<NpcRecord>(&row?)?);
        }
        Ok(NpcRoster::from_records(records))
    }

    pub fn load_world(&self, profile_id: &str) -> Result<Option<CareerWorld>, PersistenceError> {
        let Some(state) = self.load_state(profile_id)? else {
            return Ok(None);
        };
        let roster = self.load_roster(profile_id)?;
        Ok(Some(CareerWorld { state, roster }))
    }

    pub fn insert_world(&self, world: &CareerWorld, now_ms: i64) -> Result<(), PersistenceError> {
        let profile_id = world.state.profile_id.as_str();
        let exists: Option<i64> = self
            .tx
            .query_row(
                "SELECT 1 FROM profiles WHERE profile_id = ?1",
                params![profile_id],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_some() {
            return Err(PersistenceError::ProfileExists(profile_id.to_string()));
        }
        self.save_state(&world.state, now_ms)?;
        self.save_roster(profile_id, &world.roster)
    }

    pub fn save_world(&self, world: &CareerWorld, now_ms: i64) -> Result<(), PersistenceError> {
        self.save_state(&world.state, now_ms)?;
        self.save_roster(&world.state.profile_id, &world.roster)
    }

    pub fn save_state(&self, state: &GameState, now_ms: i64) -> Result<(), PersistenceError> {
        let state_json = serde_json::to_string(state)?;
        let pause_mode = state.pause.to_string();
        self.tx.execute(
            "INSERT INTO profiles (
                profile_id,
                schema_version,
                player_name,
                country,
                branch,
                current_day,
                rank_index,
                pause_mode,
                state_json,
                created_at_ms,
                updated_at_ms
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
            ON CONFLICT(profile_id) DO UPDATE SET
                schema_version = excluded.schema_version,
                player_name = excluded.player_name,
                current_day = excluded.current_day,
                rank_index = excluded.rank_index,
                pause_mode = excluded.pause_mode,
                state_json = excluded.state_json,
                updated_at_ms = excluded.updated_at_ms",
            params![
                state.profile_id.as_str(),
                state.schema_version.as_str(),
                state.player_name.as_str(),
                state.country.code(),
                state.branch.code(),
                i64::from(state.current_day),
                i64::from(state.rank_index),
                pause_mode,
                state_json,
                now_ms,
            ],
        )?;
        Ok(())
    }

    pub fn save_roster(&self, profile_id: &str, roster: &NpcRoster) -> Result<(), PersistenceError> {
        let mut stmt = self.tx.prepare_cached(
            "INSERT INTO npc_states (profile_id, npc_id, slot, generation, status, record_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(profile_id, npc_id) DO UPDATE SET
                status = excluded.status,
                record_json = excluded.record_json",
        )?;
        for record in roster.records() {
            stmt.execute(params![
                profile_id,
                record.npc_id.as_str(),
                i64::from(record.identity.slot),
                i64::from(record.identity.generation),
                format!("{:?}", record.status),
                serde_json::to_string(record)?,
            ])?;
        }
        Ok(())
    }

    pub fn append_decision(
        &self,
        profile_id: &str,
        draft: &DecisionLogDraft,
        now_ms: i64,
    ) -> Result<i64, PersistenceError> {
        self.tx.execute(
            "INSERT INTO decision_log (
                profile_id,
                decision_id,
                event_id,
                game_day,
                selected_option,
                consequences_json,
                created_at_ms
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                profile_id,
                draft.decision_id.as_str(),
                draft.event_id.as_str(),
                i64::from(draft.game_day),
                draft.selected_option.as_str(),
                serde_json::to_string(&draft.consequences)?,
                now_ms,
            ],
        )?;
        Ok(self.tx.last_insert_rowid())
    }

    pub fn commit(self) -> Result<(), PersistenceError> {
        self.tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use career_core::{CareerConfig, CareerEngine};
    use contracts::{Branch, Country, NewGame};

    fn world() -> CareerWorld {
        let engine = CareerEngine::new(CareerConfig::builtin());
        engine
            .new_game(
                &NewGame {
                    profile_id: "store-test".to_string(),
                    player_name: "Lee".to_string(),
                    country: Country::Kr,
                    branch: Branch::Navy,
                    start_age: 21,
                    time_scale: 1,
                },
                1_000,
                77,
            )
            .expect("new game")
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut store = SqliteProfileStore::open(":memory:").expect("open");
        let world = world();
        let tx = store.begin().expect("begin");
        tx.insert_world(&world, 1).expect("insert");
        assert!(matches!(
            tx.insert_world(&world, 2),
            Err(PersistenceError::ProfileExists(_))
        ));
        tx.commit().expect("commit");
        assert!(store.profile_exists("store-test").expect("exists"));
    }

    #[test]
    fn dropped_transaction_rolls_back() {
        let mut store = SqliteProfileStore::open(":memory:").expect("open");
        {
            let tx = store.begin().expect("begin");
            tx.insert_world(&world(), 1).expect("insert");
        }
        assert!(!store.profile_exists("store-test").expect("exists"));
    }

    #[test]
    fn decision_pages_follow_cursor() {
        let mut store = SqliteProfileStore::open(":memory:").expect("open");
        let tx = store.begin().expect("begin");
        tx.insert_world(&world(), 1).expect("insert");
        for day in 0..5 {
            tx.append_decision(
                "store-test",
                &DecisionLogDraft {
                    decision_id: format!("decision:{day}:0"),
                    event_id: "evt_extra_duty".to_string(),
                    game_day: day,
                    selected_option: "volunteer".to_string(),
                    consequences: StatDelta::default(),
                },
                1,
            )
            .expect("append");
        }
        tx.commit().expect("commit");

        let first = store.list_decisions("store-test", None, 2).expect("page");
        assert_eq!(first.entries.len(), 2);
        let second = store
            .list_decisions("store-test", first.next_cursor, 2)
            .expect("page");
        assert_eq!(second.entries[0].game_day, 2);
        let last = store
            .list_decisions("store-test", second.next_cursor, 2)
            .expect("page");
        assert_eq!(last.entries.len(), 1);
        assert_eq!(last.next_cursor, None);
    }
}
