use crate::auth::AuthUser;
use crate::days::DayWindow;
use crate::grid::{project, GridSnapshot};
use crate::settings::{Settings, SettingsModel, SettingsSource};
use crate::store::HabitStore;
use chrono::NaiveDate;

/// Stored blobs a session is restored from. Any of them may be missing.
#[derive(Debug, Clone, Default)]
pub struct SessionBlobs {
    pub habits: Option<String>,
    pub cookie_settings: Option<String>,
    pub local_settings: Option<String>,
}

/// Everything one signed-in user works with. Created on sign-in, dropped on
/// sign-out.
#[derive(Debug, Clone)]
pub struct Session {
    user: AuthUser,
    habits: HabitStore,
    settings: SettingsModel,
}

impl Session {
    pub fn new(user: AuthUser, habits: HabitStore, settings: SettingsModel) -> Self {
        Self {
            user,
            habits,
            settings,
        }
    }

    pub fn open(user: AuthUser, blobs: &SessionBlobs) -> (Self, SettingsSource) {
        let (settings, source) = SettingsModel::load(
            blobs.cookie_settings.as_deref(),
            blobs.local_settings.as_deref(),
        );
        let habits = HabitStore::load_or_default(blobs.habits.as_deref());
        (Self::new(user, habits, settings), source)
    }

    pub fn user(&self) -> &AuthUser {
        &self.user
    }

    pub fn habits(&self) -> &HabitStore {
        &self.habits
    }

    pub fn habits_mut(&mut self) -> &mut HabitStore {
        &mut self.habits
    }

    pub fn settings(&self) -> &SettingsModel {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut SettingsModel {
        &mut self.settings
    }

    /// Grid under the effective settings (the preview, if one is active).
    pub fn grid(&self, today: NaiveDate) -> GridSnapshot {
        let settings = self.settings.effective();
        let window = DayWindow::generate(today, settings.days_count);
        project(&self.habits, &window, &settings)
    }

    pub fn preview(&mut self, pending: Settings, today: NaiveDate) -> GridSnapshot {
        self.settings.apply_preview(pending);
        self.grid(today)
    }

    pub fn reset_preview(&mut self, today: NaiveDate) -> GridSnapshot {
        self.settings.reset_preview();
        self.grid(today)
    }
}
