use super::*;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

/// Shared handler state. Holds no game data: each request opens its own
/// connection and loads the profile inside a transaction.
#[derive(Clone)]
pub(super) struct AppState {
    engine: CareerEngine,
    sqlite_path: Arc<PathBuf>,
    profile_locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl AppState {
    pub(super) fn new(engine: CareerEngine, sqlite_path: PathBuf) -> Self {
        Self {
            engine,
            sqlite_path: Arc::new(sqlite_path),
            profile_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    async fn profile_lock(&self, profile_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.profile_locks.lock().await;
        locks
            .entry(profile_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop the entry once no other request holds or waits on it.
    async fn release_profile_lock(&self, profile_id: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self.profile_locks.lock().await;
        let ours = locks
            .get(profile_id)
            .is_some_and(|entry| Arc::ptr_eq(entry, &lock));
        // One reference lives in the map, one is ours.
        if ours && Arc::strong_count(&lock) == 2 {
            locks.remove(profile_id);
        }
    }

    /// Run blocking service work for one profile. Requests for the same
    /// profile queue behind each other; other profiles proceed.
    pub(super) async fn with_profile<T, F>(&self, profile_id: &str, work: F) -> Result<T, HttpApiError>
    where
        T: Send + 'static,
        F: FnOnce(&mut GameService) -> Result<T, ServiceError> + Send + 'static,
    {
        let lock = self.profile_lock(profile_id).await;
        let joined = {
            let _guard = lock.lock().await;
            let engine = self.engine.clone();
            let sqlite_path = Arc::clone(&self.sqlite_path);
            tokio::task::spawn_blocking(move || {
                let store = SqliteProfileStore::connect(sqlite_path.as_path())?;
                let mut service = GameService::new(engine, store);
                work(&mut service)
            })
            .await
        };
        self.release_profile_lock(profile_id, lock).await;

        match joined {
            Ok(result) => result.map_err(HttpApiError::from_service),
            Err(err) => Err(HttpApiError::internal(
                "request worker failed",
                Some(err.to_string()),
            )),
        }
    }
}
