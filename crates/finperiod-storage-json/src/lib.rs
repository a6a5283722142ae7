//! finperiod-storage-json
//!
//! Single-file JSON persistence for users, budgets, and expenses.

use std::{
    fs::{self, File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use chrono::NaiveDate;
use finperiod_core::{
    storage::{dangling_expenses, BudgetStore, ExpenseStore, UserStore},
    CoreError, MemoryStore,
};
use finperiod_domain::{Budget, Dataset, Expense, Period, User, CURRENT_SCHEMA_VERSION};
use fs2::FileExt;
use tracing::{debug, warn};
use uuid::Uuid;

const TMP_SUFFIX: &str = "tmp";
const LOCK_SUFFIX: &str = "lock";

/// Store backed by one JSON snapshot that several processes may share.
///
/// Every mutation runs under an exclusive lock on a sidecar `.lock` file:
/// the snapshot is reloaded, the change is applied to the fresh copy, and the
/// result is written back before the in-memory view is updated. A failed write
/// therefore leaves both the file and this handle unchanged. Reads reload the
/// snapshot without locking; writes replace the file by rename, so a reader
/// never sees a partial document.
pub struct JsonStore {
    path: PathBuf,
    lock_path: PathBuf,
    view: MemoryStore,
    local: Mutex<()>,
}

impl JsonStore {
    /// Opens the snapshot at `path`, starting empty when the file is missing.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let path = path.into();
        if !path.exists() {
            debug!(path = %path.display(), "no data file yet; starting empty");
        }
        let dataset = read_snapshot(&path)?;
        for warning in dangling_expenses(&dataset.budgets, &dataset.expenses) {
            warn!(path = %path.display(), "{warning}");
        }

        Ok(Self {
            lock_path: sibling_path(&path, LOCK_SUFFIX),
            path,
            view: MemoryStore::from_dataset(dataset),
            local: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The latest snapshot on disk.
    pub fn dataset(&self) -> Result<Dataset, CoreError> {
        self.read(MemoryStore::dataset)
    }

    fn local(&self) -> Result<MutexGuard<'_, ()>, CoreError> {
        self.local
            .lock()
            .map_err(|_| CoreError::Storage("store lock poisoned".into()))
    }

    fn read<T>(
        &self,
        query: impl FnOnce(&MemoryStore) -> Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        let _guard = self.local()?;
        self.view.replace(read_snapshot(&self.path)?)?;
        query(&self.view)
    }

    /// Reload, apply and write back while holding the file lock.
    fn write<T>(
        &self,
        change: impl FnOnce(&MemoryStore) -> Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        let _guard = self.local()?;
        let _lock = self.acquire_file_lock()?;
        let scratch = MemoryStore::from_dataset(read_snapshot(&self.path)?);
        let value = change(&scratch)?;
        let dataset = scratch.into_dataset()?;
        save_dataset_to_path(&dataset, &self.path)?;
        self.view.replace(dataset)?;
        Ok(value)
    }

    /// Blocks until this handle owns the sidecar lock. Released on drop.
    fn acquire_file_lock(&self) -> Result<File, CoreError> {
        if let Some(parent) = self.lock_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&self.lock_path)?;
        file.lock_exclusive()?;
        debug!(lock = %self.lock_path.display(), "store lock acquired");
        Ok(file)
    }
}

impl UserStore for JsonStore {
    fn list_users(&self) -> Result<Vec<User>, CoreError> {
        self.read(|view| view.list_users())
    }

    fn find_user(&self, id: Uuid) -> Result<Option<User>, CoreError> {
        self.read(|view| view.find_user(id))
    }

    fn save_user(&self, user: &User) -> Result<(), CoreError> {
        self.write(|scratch| scratch.save_user(user))
    }
}

impl BudgetStore for JsonStore {
    fn find_budgets(&self, user_id: Uuid, period: Period) -> Result<Vec<Budget>, CoreError> {
        self.read(|view| view.find_budgets(user_id, period))
    }

    fn find_budget(
        &self,
        user_id: Uuid,
        category: &str,
        period: Period,
    ) -> Result<Option<Budget>, CoreError> {
        self.read(|view| view.find_budget(user_id, category, period))
    }

    fn find_budget_by_id(&self, id: Uuid) -> Result<Option<Budget>, CoreError> {
        self.read(|view| view.find_budget_by_id(id))
    }

    fn insert_budget(&self, budget: Budget) -> Result<Budget, CoreError> {
        self.write(|scratch| scratch.insert_budget(budget))
    }

    fn update_budget(&self, budget: Budget) -> Result<Budget, CoreError> {
        self.write(|scratch| scratch.update_budget(budget))
    }

    fn delete_budget(&self, id: Uuid) -> Result<(), CoreError> {
        self.write(|scratch| scratch.delete_budget(id))
    }
}

impl ExpenseStore for JsonStore {
    fn find_expenses(&self, user_id: Uuid) -> Result<Vec<Expense>, CoreError> {
        self.read(|view| view.find_expenses(user_id))
    }

    fn find_expense_by_id(&self, id: Uuid) -> Result<Option<Expense>, CoreError> {
        self.read(|view| view.find_expense_by_id(id))
    }

    fn find_expenses_for_budget(&self, budget_id: Uuid) -> Result<Vec<Expense>, CoreError> {
        self.read(|view| view.find_expenses_for_budget(budget_id))
    }

    fn find_expenses_between(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Expense>, CoreError> {
        self.read(|view| view.find_expenses_between(user_id, from, to))
    }

    fn insert_expense(&self, expense: Expense) -> Result<Expense, CoreError> {
        self.write(|scratch| scratch.insert_expense(expense))
    }

    fn delete_expense(&self, id: Uuid) -> Result<(), CoreError> {
        self.write(|scratch| scratch.delete_expense(id))
    }
}

/// Saves a dataset to an arbitrary path on disk via a temporary sibling file.
pub fn save_dataset_to_path(dataset: &Dataset, path: &Path) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json =
        serde_json::to_string_pretty(dataset).map_err(|err| CoreError::Serde(err.to_string()))?;
    let tmp = sibling_path(path, TMP_SUFFIX);
    write_file(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Loads a dataset, refusing files written by a newer schema.
pub fn load_dataset_from_path(path: &Path) -> Result<Dataset, CoreError> {
    let data = fs::read_to_string(path)?;
    let dataset: Dataset =
        serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))?;
    if dataset.schema_version > CURRENT_SCHEMA_VERSION {
        return Err(CoreError::Storage(format!(
            "{} uses schema version {}, newest supported is {}",
            path.display(),
            dataset.schema_version,
            CURRENT_SCHEMA_VERSION
        )));
    }
    Ok(dataset)
}

fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut sibling = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.{suffix}"),
        None => suffix.to_string(),
    };
    sibling.set_extension(ext);
    sibling
}

/// The snapshot at `path`, or an empty dataset when nothing was written yet.
fn read_snapshot(path: &Path) -> Result<Dataset, CoreError> {
    if path.exists() {
        load_dataset_from_path(path)
    } else {
        Ok(Dataset::default())
    }
}

fn write_file(path: &Path, data: &str) -> Result<(), CoreError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    Ok(())
}
