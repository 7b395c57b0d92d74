//! Database store wrapper.

use crate::cache::TriggerCache;
use crate::error::{Error, Result};
use crate::models::*;
use native_db::*;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::thread;
use std::time::{Duration, Instant};
use waymark_core::{ActiveTrigger, TriggerKey};

// Static models for the database
static MODELS: LazyLock<Models> = LazyLock::new(|| {
    let mut models = Models::new();
    models.define::<StoredTriggerSet>().unwrap();
    models
});

/// How long an operation waits for another handle to release the file.
pub const DEFAULT_LOCK_WAIT: Duration = Duration::from_secs(1);

const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(5);

enum Backing {
    Memory(Database<'static>),
    /// Opened per operation; the file lock is held only for one transaction.
    File { path: PathBuf, lock_wait: Duration },
}

/// Trigger cache backed by native_db.
///
/// Every operation runs in its own transaction, so readers see either the
/// previous set or the new one. An on-disk store keeps the database file
/// open only for the duration of one operation. Several `Store`s on the same
/// path, in one process or several, can therefore be used at the same time;
/// an operation that finds the file busy retries until its lock wait runs
/// out and then fails with [`Error::Locked`].
pub struct Store {
    backing: Backing,
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        // Create the file and its tables up front so a bad path fails here
        drop(open_file(path, DEFAULT_LOCK_WAIT)?);
        Ok(Self {
            backing: Backing::File {
                path: path.to_path_buf(),
                lock_wait: DEFAULT_LOCK_WAIT,
            },
        })
    }

    /// Create an in-memory database.
    pub fn in_memory() -> Result<Self> {
        let db = Builder::new()
            .create_in_memory(&MODELS)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(Self {
            backing: Backing::Memory(db),
        })
    }

    /// Set how long an on-disk operation waits for a busy file.
    pub fn with_lock_wait(mut self, wait: Duration) -> Self {
        if let Backing::File { lock_wait, .. } = &mut self.backing {
            *lock_wait = wait;
        }
        self
    }

    /// Run `op` against the database, opening the file if needed.
    pub(crate) fn with_db<T>(&self, op: impl FnOnce(&Database<'static>) -> Result<T>) -> Result<T> {
        match &self.backing {
            Backing::Memory(db) => op(db),
            Backing::File { path, lock_wait } => {
                let db = open_file(path, *lock_wait)?;
                op(&db)
            }
        }
    }

    /// Save the trigger set, replacing the previous one.
    pub fn save_triggers(&self, triggers: &[ActiveTrigger]) -> Result<()> {
        let stored = StoredTriggerSet::from_triggers(triggers)?;
        self.with_db(|db| {
            let rw = db.rw_transaction()?;
            rw.upsert(stored)?;
            rw.commit()?;
            Ok(())
        })
    }

    /// Load the raw stored row, if any.
    pub(crate) fn load_row(&self) -> Result<Option<StoredTriggerSet>> {
        self.with_db(|db| {
            let r = db.r_transaction()?;
            let stored: Option<StoredTriggerSet> = r.get().primary(TRIGGER_SET_KEY.to_string())?;
            Ok(stored)
        })
    }

    /// Load the trigger set.
    ///
    /// A corrupt row is logged and reads as empty.
    pub fn load_triggers(&self) -> Result<Vec<ActiveTrigger>> {
        let Some(row) = self.load_row()? else {
            return Ok(Vec::new());
        };
        match row.to_triggers() {
            Ok(triggers) => Ok(triggers),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable trigger cache");
                Ok(Vec::new())
            }
        }
    }

    /// Look up a trigger by identifier.
    ///
    /// A malformed identifier can never have been registered, so it reads as
    /// not found.
    pub fn load_trigger(&self, identifier: &str) -> Result<Option<ActiveTrigger>> {
        if let Err(e) = TriggerKey::decode(identifier) {
            tracing::debug!(error = %e, "lookup with malformed identifier");
            return Ok(None);
        }
        Ok(self
            .load_triggers()?
            .into_iter()
            .find(|t| t.identifier == identifier))
    }

    /// Clear all data.
    pub fn clear(&self) -> Result<()> {
        self.with_db(|db| {
            let rw = db.rw_transaction()?;
            if let Some(row) = rw
                .get()
                .primary::<StoredTriggerSet>(TRIGGER_SET_KEY.to_string())?
            {
                rw.remove(row)?;
            }
            rw.commit()?;
            Ok(())
        })
    }
}

/// Open the database file, retrying while another handle holds it.
fn open_file(path: &Path, lock_wait: Duration) -> Result<Database<'static>> {
    let deadline = Instant::now() + lock_wait;
    loop {
        match Builder::new().create(&MODELS, path).map_err(Error::from) {
            Err(Error::Locked) if Instant::now() < deadline => thread::sleep(LOCK_RETRY_INTERVAL),
            Err(Error::Locked) => {
                tracing::debug!(path = %path.display(), "trigger cache still locked");
                return Err(Error::Locked);
            }
            other => return other,
        }
    }
}

impl TriggerCache for Store {
    fn save(&self, triggers: &[ActiveTrigger]) -> Result<()> {
        self.save_triggers(triggers)
    }

    fn load_all(&self) -> Result<Vec<ActiveTrigger>> {
        self.load_triggers()
    }

    fn load_by_id(&self, identifier: &str) -> Result<Option<ActiveTrigger>> {
        self.load_trigger(identifier)
    }

    fn clear(&self) -> Result<()> {
        Store::clear(self)
    }
}
