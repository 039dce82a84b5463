use color_eyre::eyre::{
    Result,
    WrapErr,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
};

pub const DEFAULT_STATE_DIR: &str = "~/.autoprize";
const SESSION_FILE: &str = "session.json";

/// The only durable wallet fields. Account data is deliberately not
/// persisted; it is re-fetched on every rehydration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub address: Option<String>,
    pub connected: bool,
}

#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(state_dir: Option<&str>) -> Result<Self> {
        let dir = resolve_state_dir(state_dir)?;
        let path = ensure_store(&dir)?;
        Ok(Self { path })
    }

    pub fn load(&self) -> Result<StoredSession> {
        let data = fs::read(&self.path).wrap_err("Failed to read session file")?;
        if data.is_empty() {
            return Ok(StoredSession::default());
        }
        serde_json::from_slice(&data).wrap_err("Failed to parse session JSON")
    }

    pub fn save(&self, session: &StoredSession) -> Result<()> {
        let json =
            serde_json::to_vec_pretty(session).wrap_err("Failed to serialize session")?;
        fs::write(&self.path, json).wrap_err("Failed to write session file")
    }

    pub fn clear(&self) -> Result<()> {
        self.save(&StoredSession::default())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub fn resolve_state_dir(dir: Option<&str>) -> Result<PathBuf> {
    let raw = dir.unwrap_or(DEFAULT_STATE_DIR);
    let expanded = shellexpand::tilde(raw);
    Ok(PathBuf::from(expanded.into_owned()))
}

fn ensure_store(dir: &Path) -> Result<PathBuf> {
    if !dir.exists() {
        fs::create_dir_all(dir).wrap_err_with(|| {
            format!("Failed to create state directory {}", dir.display())
        })?;
    }
    let file_path = dir.join(SESSION_FILE);
    if !file_path.exists() {
        let json = serde_json::to_vec_pretty(&StoredSession::default())
            .wrap_err("Failed to serialize empty session")?;
        fs::write(&file_path, json).wrap_err_with(|| {
            format!("Failed to initialize session file at {}", file_path.display())
        })?;
    }
    Ok(file_path)
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;

    fn temp_store() -> (SessionStore, PathBuf) {
        let dir = std::env::temp_dir().join(format!(
            "autoprize-session-{}-{:?}",
            std::process::id(),
            std::thread::current().id()
        ));
        let _ = fs::remove_dir_all(&dir);
        let store = SessionStore::new(dir.to_str()).unwrap();
        (store, dir)
    }

    #[test]
    fn load__returns_empty_session_for_a_fresh_store() {
        // given
        let (store, dir) = temp_store();

        // when
        let session = store.load().unwrap();

        // then
        assert_eq!(session, StoredSession::default());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn save__roundtrips_address_and_connected_flag() {
        // given
        let (store, dir) = temp_store();
        let session = StoredSession {
            address: Some(String::from("AU12abcdef")),
            connected: true,
        };

        // when
        store.save(&session).unwrap();

        // then
        assert_eq!(store.load().unwrap(), session);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn clear__resets_the_persisted_fields() {
        // given
        let (store, dir) = temp_store();
        store
            .save(&StoredSession {
                address: Some(String::from("AU12abcdef")),
                connected: true,
            })
            .unwrap();

        // when
        store.clear().unwrap();

        // then
        assert_eq!(store.load().unwrap(), StoredSession::default());
        let _ = fs::remove_dir_all(dir);
    }
}
