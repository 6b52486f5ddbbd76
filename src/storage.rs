use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::session::{Session, SessionBlobs};
use crate::settings::SettingsSource;
use std::{env, path::Path, path::PathBuf};
use tokio::fs;
use tracing::{error, info};

pub const HABITS_KEY: &str = "habits";
pub const SETTINGS_KEY: &str = "settings";

pub fn resolve_data_dir() -> PathBuf {
    if let Ok(path) = env::var("APP_DATA_DIR") {
        return PathBuf::from(path);
    }

    PathBuf::from("data")
}

/// The two per-user blob areas: long-lived display preferences ("cookie") and
/// the general local store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageArea {
    Cookie,
    Local,
}

impl StorageArea {
    fn dir_name(self) -> &'static str {
        match self {
            StorageArea::Cookie => "cookie",
            StorageArea::Local => "local",
        }
    }
}

/// File-backed blob store laid out as `<root>/<user>/<area>/<key>.json`.
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn blob_path(&self, user: &AuthUser, area: StorageArea, key: &str) -> PathBuf {
        self.root
            .join(user_dir(&user.id))
            .join(area.dir_name())
            .join(format!("{key}.json"))
    }

    pub async fn load_blob(&self, user: &AuthUser, area: StorageArea, key: &str) -> Option<String> {
        let path = self.blob_path(user, area, key);
        match fs::read_to_string(&path).await {
            Ok(blob) => Some(blob),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                error!("failed to read {}: {err}", path.display());
                None
            }
        }
    }

    pub async fn persist_blob(
        &self,
        user: &AuthUser,
        area: StorageArea,
        key: &str,
        blob: &str,
    ) -> Result<(), AppError> {
        let path = self.blob_path(user, area, key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, blob).await?;
        Ok(())
    }

    pub async fn open_session(&self, user: AuthUser) -> Session {
        let blobs = SessionBlobs {
            habits: self.load_blob(&user, StorageArea::Local, HABITS_KEY).await,
            cookie_settings: self.load_blob(&user, StorageArea::Cookie, SETTINGS_KEY).await,
            local_settings: self.load_blob(&user, StorageArea::Local, SETTINGS_KEY).await,
        };
        let (session, source) = Session::open(user, &blobs);
        info!(user = %session.user().id, ?source, "session opened");

        if source == SettingsSource::Local {
            if let Err(err) = self.persist_settings_to(&session, StorageArea::Cookie).await {
                error!("failed to sync settings cookie: {}", err.message);
            }
        }
        session
    }

    pub async fn persist_habits(&self, session: &Session) -> Result<(), AppError> {
        let blob = session.habits().serialize().map_err(AppError::internal)?;
        self.persist_blob(session.user(), StorageArea::Local, HABITS_KEY, &blob)
            .await
    }

    /// Writes committed settings to both areas.
    pub async fn persist_settings(&self, session: &Session) -> Result<(), AppError> {
        self.persist_settings_to(session, StorageArea::Local).await?;
        self.persist_settings_to(session, StorageArea::Cookie).await
    }

    async fn persist_settings_to(&self, session: &Session, area: StorageArea) -> Result<(), AppError> {
        let blob = session
            .settings()
            .committed()
            .to_blob()
            .map_err(AppError::internal)?;
        self.persist_blob(session.user(), area, SETTINGS_KEY, &blob).await
    }
}

// Alphanumerics and '-' pass through; every other byte becomes `_xx` so
// distinct ids never share a directory.
fn user_dir(id: &str) -> String {
    let mut dir = String::with_capacity(id.len());
    for byte in id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            dir.push(char::from(byte));
        } else {
            dir.push_str(&format!("_{byte:02x}"));
        }
    }
    if dir.is_empty() { "_".to_string() } else { dir }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::Status;
    use crate::settings::Settings;
    use chrono::NaiveDate;

    #[test]
    fn user_ids_cannot_escape_the_root() {
        let storage = Storage::new("/data");
        let path = storage.blob_path(&AuthUser::new("../../etc"), StorageArea::Local, HABITS_KEY);
        assert_eq!(
            path,
            PathBuf::from("/data/_2e_2e_2f_2e_2e_2fetc/local/habits.json")
        );
    }

    #[test]
    fn similar_user_ids_get_separate_directories() {
        let storage = Storage::new("/data");
        let paths: Vec<PathBuf> = ["olena.k", "olena_k", "olena+k", "olena-k"]
            .into_iter()
            .map(|id| storage.blob_path(&AuthUser::new(id), StorageArea::Local, HABITS_KEY))
            .collect();
        for (i, a) in paths.iter().enumerate() {
            for b in &paths[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(
            storage.blob_path(&AuthUser::new("tester"), StorageArea::Cookie, SETTINGS_KEY),
            PathBuf::from("/data/tester/cookie/settings.json")
        );
    }

    #[tokio::test]
    async fn mutations_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());
        let user = AuthUser::new("u-1");
        let date = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();

        let mut session = storage.open_session(user.clone()).await;
        session.habits_mut().set_status(2, date, Status::Completed).unwrap();
        session.settings_mut().commit(Settings {
            days_count: 21,
            ..Settings::default()
        });
        storage.persist_habits(&session).await.unwrap();
        storage.persist_settings(&session).await.unwrap();

        let reopened = storage.open_session(user).await;
        assert_eq!(reopened.habits(), session.habits());
        assert_eq!(reopened.settings().committed().days_count, 21);
    }

    #[tokio::test]
    async fn local_settings_are_copied_to_cookie() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());
        let user = AuthUser::new("u-2");
        storage
            .persist_blob(&user, StorageArea::Local, SETTINGS_KEY, r#"{"daysCount":8}"#)
            .await
            .unwrap();

        let session = storage.open_session(user.clone()).await;
        assert_eq!(session.settings().committed().days_count, 8);
        let cookie = storage
            .load_blob(&user, StorageArea::Cookie, SETTINGS_KEY)
            .await
            .unwrap();
        assert_eq!(Settings::from_blob(&cookie).unwrap().days_count, 8);
    }

    #[tokio::test]
    async fn corrupt_habits_fall_back_to_seeded_store() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());
        let user = AuthUser::new("u-3");
        storage
            .persist_blob(&user, StorageArea::Local, HABITS_KEY, "not json at all")
            .await
            .unwrap();

        let session = storage.open_session(user).await;
        assert_eq!(session.habits().len(), 3);
    }
}
