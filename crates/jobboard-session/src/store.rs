use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use jobboard_core::storage_keys::{ACCESS_TOKEN, REFRESH_TOKEN};
use jobboard_core::TokenPair;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::StoreError;

/// Durable medium behind [`TokenStore`].
///
/// Implementations persist exactly two strings under the well-known access
/// and refresh keys. `load` must never return a pair assembled from two
/// different `save` calls.
pub trait CredentialBackend: Send + Sync {
    fn load(&self) -> Result<Option<TokenPair>, StoreError>;
    fn save(&self, pair: &TokenPair) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

/// Current credentials plus the backend that keeps them across restarts.
///
/// Readers see a cached copy guarded by a `RwLock`; writers persist while
/// holding the write lock, so no reader observes a half-replaced pair.
///
/// Every `set` and `clear` bumps a generation counter kept next to the pair.
/// Writers that started from an older snapshot commit through
/// [`TokenStore::set_if_generation`] and lose against anything that happened
/// in between.
pub struct TokenStore {
    backend: Box<dyn CredentialBackend>,
    current: RwLock<Slot>,
}

struct Slot {
    pair: Option<TokenPair>,
    generation: u64,
}

impl TokenStore {
    pub fn open(backend: impl CredentialBackend + 'static) -> Result<Self, StoreError> {
        let pair = backend.load()?;
        debug!(restored = pair.is_some(), "opened token store");
        Ok(Self {
            backend: Box::new(backend),
            current: RwLock::new(Slot {
                pair,
                generation: 0,
            }),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            backend: Box::new(MemoryBackend::default()),
            current: RwLock::new(Slot {
                pair: None,
                generation: 0,
            }),
        }
    }

    pub fn get(&self) -> Option<TokenPair> {
        self.read().pair.clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.read()
            .pair
            .as_ref()
            .map(|pair| pair.access_token.clone())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read()
            .pair
            .as_ref()
            .map(|pair| pair.refresh_token.clone())
    }

    /// The pair together with the generation it belongs to.
    pub fn snapshot(&self) -> (Option<TokenPair>, u64) {
        let slot = self.read();
        (slot.pair.clone(), slot.generation)
    }

    pub fn generation(&self) -> u64 {
        self.read().generation
    }

    pub fn set(&self, pair: &TokenPair) -> Result<(), StoreError> {
        let mut slot = self.write();
        self.backend.save(pair)?;
        slot.pair = Some(pair.clone());
        slot.generation += 1;
        debug!(generation = slot.generation, "stored token pair");
        Ok(())
    }

    /// Stores `pair` only if nothing was set or cleared since `generation`
    /// was observed. `on_commit` runs before the lock is released, so a
    /// concurrent `clear` is ordered entirely before or after it.
    ///
    /// Returns `Ok(false)` without touching the backend when superseded.
    pub fn set_if_generation(
        &self,
        pair: &TokenPair,
        generation: u64,
        on_commit: impl FnOnce(),
    ) -> Result<bool, StoreError> {
        let mut slot = self.write();
        if slot.generation != generation {
            debug!(
                expected = generation,
                current = slot.generation,
                "discarding token pair from a superseded session"
            );
            return Ok(false);
        }
        self.backend.save(pair)?;
        slot.pair = Some(pair.clone());
        slot.generation += 1;
        debug!(generation = slot.generation, "stored token pair");
        on_commit();
        Ok(true)
    }

    /// Drops the in-memory pair unconditionally; a backend failure is still
    /// reported to the caller.
    pub fn clear(&self) -> Result<(), StoreError> {
        let mut slot = self.write();
        self.clear_locked(&mut slot)
    }

    /// Clears only if the store is still at `generation`; a pair written by
    /// a newer sign-in survives. Returns whether anything was cleared.
    pub fn clear_if_generation(&self, generation: u64) -> bool {
        let mut slot = self.write();
        if slot.generation != generation {
            return false;
        }
        let _ = self.clear_locked(&mut slot);
        true
    }

    fn clear_locked(&self, slot: &mut Slot) -> Result<(), StoreError> {
        slot.pair = None;
        slot.generation += 1;
        let result = self.backend.clear();
        if let Err(err) = &result {
            warn!("failed to clear persisted credentials: {err}");
        } else {
            debug!(generation = slot.generation, "cleared token pair");
        }
        result
    }

    fn read(&self) -> RwLockReadGuard<'_, Slot> {
        self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Slot> {
        self.current.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Default)]
pub struct MemoryBackend {
    pair: Mutex<Option<TokenPair>>,
}

impl MemoryBackend {
    pub fn with_pair(pair: TokenPair) -> Self {
        Self {
            pair: Mutex::new(Some(pair)),
        }
    }
}

impl CredentialBackend for MemoryBackend {
    fn load(&self) -> Result<Option<TokenPair>, StoreError> {
        Ok(self
            .pair
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, pair: &TokenPair) -> Result<(), StoreError> {
        *self.pair.lock().unwrap_or_else(PoisonError::into_inner) = Some(pair.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.pair.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// One JSON document holding both keys, replaced by rename so a crash never
/// leaves a torn pair on disk.
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn format_error(&self, source: serde_json::Error) -> StoreError {
        StoreError::Format {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl CredentialBackend for FileBackend {
    fn load(&self) -> Result<Option<TokenPair>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.io_error(err)),
        };
        decode_pair(&contents).map_err(|source| self.format_error(source))
    }

    fn save(&self, pair: &TokenPair) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
        }
        let contents = encode_pair(pair).map_err(|source| self.format_error(source))?;

        let temp = self.temp_path();
        let mut file = open_private(&temp).map_err(|err| self.io_error(err))?;
        file.write_all(contents.as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(|err| self.io_error(err))?;
        drop(file);
        fs::rename(&temp, &self.path).map_err(|err| self.io_error(err))
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(self.io_error(err)),
        }
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    fs::File::create(path)
}

/// Both tokens serialized into one OS keychain entry, account
/// `session::<namespace>`, so a failed write can never leave a mixed pair.
pub struct KeyringBackend {
    service: String,
    account: String,
}

impl KeyringBackend {
    pub const SERVICE: &'static str = "jobboard";

    pub fn new(namespace: &str) -> Self {
        Self {
            service: Self::SERVICE.to_string(),
            account: format!("session::{namespace}"),
        }
    }

    fn entry(&self) -> Result<keyring::Entry, StoreError> {
        keyring::Entry::new(&self.service, &self.account)
            .map_err(|err| StoreError::Keyring(format!("failed to access keyring: {err}")))
    }
}

impl CredentialBackend for KeyringBackend {
    fn load(&self) -> Result<Option<TokenPair>, StoreError> {
        let contents = match self.entry()?.get_password() {
            Ok(value) => value,
            Err(keyring::Error::NoEntry) => return Ok(None),
            Err(err) => {
                return Err(StoreError::Keyring(format!(
                    "failed to load tokens for '{}': {err}",
                    self.account
                )))
            }
        };
        let pair = decode_pair(&contents).map_err(|err| {
            StoreError::Keyring(format!("malformed keyring entry '{}': {err}", self.account))
        })?;
        if pair.is_none() {
            warn!(account = %self.account, "ignoring incomplete token pair in keyring");
        }
        Ok(pair)
    }

    fn save(&self, pair: &TokenPair) -> Result<(), StoreError> {
        let contents = encode_pair(pair)
            .map_err(|err| StoreError::Keyring(format!("failed to encode tokens: {err}")))?;
        self.entry()?
            .set_password(&contents)
            .map_err(|err| StoreError::Keyring(format!("failed to store tokens: {err}")))
    }

    fn clear(&self) -> Result<(), StoreError> {
        match self.entry()?.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(StoreError::Keyring(format!("failed to delete tokens: {err}"))),
        }
    }
}

/// The shared on-disk and in-keychain document: one JSON object holding the
/// well-known access and refresh keys.
fn encode_pair(pair: &TokenPair) -> Result<String, serde_json::Error> {
    let mut doc = Map::new();
    doc.insert(
        ACCESS_TOKEN.to_string(),
        Value::String(pair.access_token.clone()),
    );
    doc.insert(
        REFRESH_TOKEN.to_string(),
        Value::String(pair.refresh_token.clone()),
    );
    serde_json::to_string_pretty(&doc)
}

/// A document missing either key decodes as no pair.
fn decode_pair(contents: &str) -> Result<Option<TokenPair>, serde_json::Error> {
    let doc: Map<String, Value> = serde_json::from_str(contents)?;
    let access = doc.get(ACCESS_TOKEN).and_then(Value::as_str);
    let refresh = doc.get(REFRESH_TOKEN).and_then(Value::as_str);
    Ok(match (access, refresh) {
        (Some(access), Some(refresh)) => Some(TokenPair::new(access, refresh)),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn memory_store_set_get_clear() -> Result<(), StoreError> {
        let store = TokenStore::in_memory();
        assert!(store.get().is_none());
        store.set(&TokenPair::new("a-1", "r-1"))?;
        assert_eq!(store.access_token().as_deref(), Some("a-1"));
        assert_eq!(store.refresh_token().as_deref(), Some("r-1"));
        store.clear()?;
        assert!(store.get().is_none());
        Ok(())
    }

    #[test]
    fn file_backend_persists_across_reopen() -> Result<(), StoreError> {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("session.json");

        let store = TokenStore::open(FileBackend::new(&path))?;
        assert!(store.get().is_none());
        store.set(&TokenPair::new("access-1", "refresh-1"))?;

        let raw: Value =
            serde_json::from_str(&fs::read_to_string(&path).expect("read")).expect("json");
        assert_eq!(raw[ACCESS_TOKEN], "access-1");
        assert_eq!(raw[REFRESH_TOKEN], "refresh-1");

        let reopened = TokenStore::open(FileBackend::new(&path))?;
        assert_eq!(reopened.get(), Some(TokenPair::new("access-1", "refresh-1")));

        reopened.clear()?;
        assert!(!path.exists());
        reopened.clear()?;
        Ok(())
    }

    #[test]
    fn file_backend_ignores_half_written_document() -> Result<(), StoreError> {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"accessToken":"only-access"}"#).expect("write");
        assert!(FileBackend::new(&path).load()?.is_none());
        Ok(())
    }

    #[test]
    fn file_backend_reports_malformed_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").expect("write");
        let err = TokenStore::open(FileBackend::new(&path)).err().expect("error");
        assert!(matches!(err, StoreError::Format { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn file_backend_writes_private_file() -> Result<(), StoreError> {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = FileBackend::new(dir.path().join("session.json"));
        backend.save(&TokenPair::new("a", "r"))?;
        let mode = fs::metadata(backend.path()).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        Ok(())
    }

    #[test]
    fn concurrent_readers_never_see_mixed_pairs() {
        let store = Arc::new(TokenStore::in_memory());
        store.set(&TokenPair::new("access-0", "refresh-0")).expect("seed");

        let writer = {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for idx in 1..500 {
                    store
                        .set(&TokenPair::new(format!("access-{idx}"), format!("refresh-{idx}")))
                        .expect("set");
                }
            })
        };
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        let pair = store.get().expect("pair");
                        let access = pair.access_token.trim_start_matches("access-");
                        let refresh = pair.refresh_token.trim_start_matches("refresh-");
                        assert_eq!(access, refresh);
                    }
                })
            })
            .collect();

        writer.join().expect("writer");
        for reader in readers {
            reader.join().expect("reader");
        }
    }

    struct FailingSave;

    impl CredentialBackend for FailingSave {
        fn load(&self) -> Result<Option<TokenPair>, StoreError> {
            Ok(Some(TokenPair::new("access-1", "refresh-1")))
        }

        fn save(&self, _pair: &TokenPair) -> Result<(), StoreError> {
            Err(StoreError::Keyring("keychain locked".to_string()))
        }

        fn clear(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[test]
    fn failed_save_keeps_previous_pair() -> Result<(), StoreError> {
        let store = TokenStore::open(FailingSave)?;
        let before = store.generation();

        let err = store
            .set(&TokenPair::new("access-2", "refresh-2"))
            .expect_err("save fails");

        assert!(matches!(err, StoreError::Keyring(_)));
        assert_eq!(store.get(), Some(TokenPair::new("access-1", "refresh-1")));
        assert_eq!(store.generation(), before);
        Ok(())
    }

    #[test]
    fn keyring_keeps_both_tokens_in_one_entry() {
        let backend = KeyringBackend::new("work");
        assert_eq!(backend.account, "session::work");

        let doc = encode_pair(&TokenPair::new("access-2", "refresh-2")).expect("encode");
        assert_eq!(
            decode_pair(&doc).expect("decode"),
            Some(TokenPair::new("access-2", "refresh-2"))
        );
        assert_eq!(
            decode_pair(r#"{"refreshToken":"refresh-2"}"#).expect("decode"),
            None
        );
    }

    #[test]
    fn superseded_writer_loses_to_clear() -> Result<(), StoreError> {
        let store = TokenStore::in_memory();
        store.set(&TokenPair::new("access-1", "refresh-1"))?;
        let (_, generation) = store.snapshot();

        store.clear()?;
        let mut committed = false;
        let stored = store.set_if_generation(
            &TokenPair::new("access-2", "refresh-2"),
            generation,
            || committed = true,
        )?;

        assert!(!stored);
        assert!(!committed);
        assert!(store.get().is_none());
        Ok(())
    }

    #[test]
    fn current_writer_commits_and_runs_hook() -> Result<(), StoreError> {
        let store = TokenStore::in_memory();
        store.set(&TokenPair::new("access-1", "refresh-1"))?;
        let (_, generation) = store.snapshot();

        let mut committed = false;
        let stored = store.set_if_generation(
            &TokenPair::new("access-2", "refresh-2"),
            generation,
            || committed = true,
        )?;

        assert!(stored);
        assert!(committed);
        assert_eq!(store.get(), Some(TokenPair::new("access-2", "refresh-2")));
        assert!(!store.clear_if_generation(generation));
        assert!(store.get().is_some());
        Ok(())
    }
}
