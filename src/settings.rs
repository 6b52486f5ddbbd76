use crate::errors::HabitError;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const MIN_DAYS_COUNT: u32 = 7;
pub const MAX_DAYS_COUNT: u32 = 30;
pub const DEFAULT_DAYS_COUNT: u32 = 15;

pub const MIN_CELL_SIZE: f64 = 0.7;
pub const MAX_CELL_SIZE: f64 = 1.5;

pub const DEFAULT_SPACING: f64 = 1.1;
pub const DEFAULT_CELL_SIZE: f64 = 0.8;
pub const DEFAULT_CELL_GAP: f64 = 0.1;

/// Day count at which a cell size of 1.0 fills the grid.
const REFERENCE_DAYS: f64 = 15.0;
/// Gap at which the day count needs no adjustment.
const REFERENCE_GAP: f64 = 0.2;
const CELL_SIZE_DEADBAND: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "SettingsDraft")]
pub struct Settings {
    pub theme: Theme,
    pub spacing: f64,
    pub days_count: u32,
    pub cell_size: f64,
    pub cell_gap: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            spacing: DEFAULT_SPACING,
            days_count: DEFAULT_DAYS_COUNT,
            cell_size: DEFAULT_CELL_SIZE,
            cell_gap: DEFAULT_CELL_GAP,
        }
    }
}

impl Settings {
    pub fn clamped(self) -> Self {
        Self {
            theme: self.theme,
            spacing: if self.spacing.is_finite() && self.spacing > 0.0 {
                self.spacing
            } else {
                DEFAULT_SPACING
            },
            days_count: self.days_count.clamp(MIN_DAYS_COUNT, MAX_DAYS_COUNT),
            cell_size: clamp_cell_size(self.cell_size),
            cell_gap: if self.cell_gap.is_finite() {
                self.cell_gap.max(0.0)
            } else {
                DEFAULT_CELL_GAP
            },
        }
    }

    pub fn from_blob(blob: &str) -> Result<Self, HabitError> {
        Ok(serde_json::from_str(blob)?)
    }

    pub fn to_blob(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Wire shape accepted for settings: every field optional, numbers loosely
/// typed. Missing fields take their defaults and the result is clamped.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SettingsDraft {
    theme: Option<Theme>,
    spacing: Option<f64>,
    days_count: Option<f64>,
    cell_size: Option<f64>,
    cell_gap: Option<f64>,
}

impl From<SettingsDraft> for Settings {
    fn from(draft: SettingsDraft) -> Self {
        let defaults = Settings::default();
        Settings {
            theme: draft.theme.unwrap_or(defaults.theme),
            spacing: draft.spacing.unwrap_or(defaults.spacing),
            days_count: draft
                .days_count
                .filter(|days| days.is_finite())
                .map_or(defaults.days_count, clamp_days),
            cell_size: draft.cell_size.unwrap_or(defaults.cell_size),
            cell_gap: draft.cell_gap.unwrap_or(defaults.cell_gap),
        }
        .clamped()
    }
}

fn clamp_days(days: f64) -> u32 {
    if days.is_nan() {
        return DEFAULT_DAYS_COUNT;
    }
    days.round()
        .clamp(f64::from(MIN_DAYS_COUNT), f64::from(MAX_DAYS_COUNT)) as u32
}

fn clamp_cell_size(size: f64) -> f64 {
    if size.is_finite() {
        size.clamp(MIN_CELL_SIZE, MAX_CELL_SIZE)
    } else {
        DEFAULT_CELL_SIZE
    }
}

/// Which store the committed settings were restored from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsSource {
    Cookie,
    Local,
    Defaults,
}

/// A single slider or select change in the settings dialog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum SettingsChange {
    Theme(Theme),
    Spacing(f64),
    DaysCount(u32),
    CellSize(f64),
    CellGap(f64),
}

/// Applies `change` to `draft` and adjusts the coupled field.
///
/// A larger cell size or gap suggests fewer days; more days suggest a smaller
/// cell size, applied only outside a 0.1 deadband so sliders do not fight.
pub fn auto_balance(draft: Settings, change: SettingsChange) -> Settings {
    let mut next = draft.clamped();
    match change {
        SettingsChange::Theme(theme) => next.theme = theme,
        SettingsChange::Spacing(spacing) => {
            next.spacing = spacing;
        }
        SettingsChange::CellSize(size) => {
            next.cell_size = clamp_cell_size(size);
            next.days_count = clamp_days(f64::from(next.days_count) / next.cell_size);
        }
        SettingsChange::CellGap(gap) => {
            next.cell_gap = gap;
            next = next.clamped();
            let factor = next.cell_gap / REFERENCE_GAP;
            next.days_count = if factor > 0.0 {
                clamp_days(f64::from(next.days_count) / factor)
            } else {
                MAX_DAYS_COUNT
            };
        }
        SettingsChange::DaysCount(days) => {
            next.days_count = days.clamp(MIN_DAYS_COUNT, MAX_DAYS_COUNT);
            let suggested = (REFERENCE_DAYS / f64::from(next.days_count))
                .clamp(MIN_CELL_SIZE, MAX_CELL_SIZE);
            if (suggested - next.cell_size).abs() > CELL_SIZE_DEADBAND {
                next.cell_size = (suggested * 10.0).round() / 10.0;
            }
        }
    }
    next.clamped()
}

/// Committed settings plus an optional uncommitted preview.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SettingsModel {
    committed: Settings,
    preview: Option<Settings>,
}

impl SettingsModel {
    pub fn new(settings: Settings) -> Self {
        Self {
            committed: settings.clamped(),
            preview: None,
        }
    }

    /// Restores settings from the cookie blob, then the local blob, then
    /// defaults. Corrupt blobs are logged and skipped.
    pub fn load(cookie: Option<&str>, local: Option<&str>) -> (Self, SettingsSource) {
        let candidates = [(SettingsSource::Cookie, cookie), (SettingsSource::Local, local)];
        for (source, blob) in candidates {
            let Some(blob) = blob else { continue };
            match Settings::from_blob(blob) {
                Ok(settings) => return (Self::new(settings), source),
                Err(err) => warn!(?source, "ignoring stored settings: {err}"),
            }
        }
        (Self::default(), SettingsSource::Defaults)
    }

    pub fn committed(&self) -> Settings {
        self.committed
    }

    pub fn pending(&self) -> Option<Settings> {
        self.preview
    }

    /// Settings the grid should currently be drawn with.
    pub fn effective(&self) -> Settings {
        self.preview.unwrap_or(self.committed)
    }

    pub fn commit(&mut self, pending: Settings) -> Settings {
        self.committed = pending.clamped();
        self.preview = None;
        self.committed
    }

    pub fn apply_preview(&mut self, pending: Settings) -> Settings {
        let preview = pending.clamped();
        self.preview = Some(preview);
        preview
    }

    pub fn reset_preview(&mut self) -> Settings {
        self.preview = None;
        self.committed
    }

    pub fn restore_defaults(&mut self) -> Settings {
        self.commit(Settings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(days_count: u32, cell_size: f64, cell_gap: f64) -> Settings {
        Settings {
            days_count,
            cell_size,
            cell_gap,
            ..Settings::default()
        }
    }

    #[test]
    fn commit_clamps_out_of_range_values() {
        let mut model = SettingsModel::default();
        let committed = model.commit(Settings {
            spacing: -2.0,
            days_count: 999,
            cell_size: 9.0,
            cell_gap: -1.0,
            ..Settings::default()
        });
        assert_eq!(committed.days_count, 30);
        assert_eq!(committed.cell_size, MAX_CELL_SIZE);
        assert_eq!(committed.cell_gap, 0.0);
        assert_eq!(committed.spacing, DEFAULT_SPACING);

        let committed = model.commit(settings(1, 0.1, 0.3));
        assert_eq!(committed.days_count, 7);
        assert_eq!(committed.cell_size, MIN_CELL_SIZE);
        assert_eq!(model.committed(), committed);
    }

    #[test]
    fn partial_blob_fills_defaults() {
        let parsed = Settings::from_blob(r#"{"theme":"light","daysCount":999}"#).unwrap();
        assert_eq!(parsed.theme, Theme::Light);
        assert_eq!(parsed.days_count, 30);
        assert_eq!(parsed.spacing, DEFAULT_SPACING);
        assert_eq!(parsed.cell_size, DEFAULT_CELL_SIZE);
        assert_eq!(parsed.cell_gap, DEFAULT_CELL_GAP);
    }

    #[test]
    fn blob_round_trips_in_camel_case() {
        let saved = Settings {
            theme: Theme::Light,
            spacing: 1.3,
            days_count: 21,
            cell_size: 1.2,
            cell_gap: 0.4,
        };
        let blob = saved.to_blob().unwrap();
        assert!(blob.contains("\"daysCount\":21"));
        assert!(blob.contains("\"cellGap\":0.4"));
        assert_eq!(Settings::from_blob(&blob).unwrap(), saved);
    }

    #[test]
    fn load_prefers_cookie_then_local_then_defaults() {
        let cookie = r#"{"daysCount":20}"#;
        let local = r#"{"daysCount":25}"#;

        let (model, source) = SettingsModel::load(Some(cookie), Some(local));
        assert_eq!(source, SettingsSource::Cookie);
        assert_eq!(model.committed().days_count, 20);

        let (model, source) = SettingsModel::load(Some("{not json"), Some(local));
        assert_eq!(source, SettingsSource::Local);
        assert_eq!(model.committed().days_count, 25);

        let (model, source) = SettingsModel::load(None, Some("42"));
        assert_eq!(source, SettingsSource::Defaults);
        assert_eq!(model.committed(), Settings::default());
    }

    #[test]
    fn preview_never_touches_committed_state() {
        let mut model = SettingsModel::new(settings(15, 0.8, 0.1));
        for days in [7, 22, 30] {
            model.apply_preview(settings(days, 1.0, 0.2));
            assert_eq!(model.effective().days_count, days);
        }
        assert_eq!(model.committed().days_count, 15);
        let restored = model.reset_preview();
        assert_eq!(restored, settings(15, 0.8, 0.1));
        assert_eq!(model.effective(), restored);
        assert!(model.pending().is_none());
    }

    #[test]
    fn commit_clears_preview() {
        let mut model = SettingsModel::default();
        model.apply_preview(settings(20, 0.8, 0.1));
        model.commit(settings(10, 0.8, 0.1));
        assert!(model.pending().is_none());
        assert_eq!(model.effective().days_count, 10);
        model.restore_defaults();
        assert_eq!(model.committed(), Settings::default());
    }

    #[test]
    fn larger_cells_suggest_fewer_days() {
        let balanced = auto_balance(settings(20, 0.8, 0.1), SettingsChange::CellSize(1.5));
        assert_eq!(balanced.cell_size, 1.5);
        assert_eq!(balanced.days_count, 13);

        let balanced = auto_balance(settings(28, 0.8, 0.1), SettingsChange::CellSize(0.7));
        assert_eq!(balanced.days_count, 30);
    }

    #[test]
    fn wider_gaps_suggest_fewer_days() {
        let balanced = auto_balance(settings(20, 0.8, 0.1), SettingsChange::CellGap(0.4));
        assert_eq!(balanced.cell_gap, 0.4);
        assert_eq!(balanced.days_count, 10);

        let balanced = auto_balance(settings(20, 0.8, 0.1), SettingsChange::CellGap(0.0));
        assert_eq!(balanced.days_count, MAX_DAYS_COUNT);
    }

    #[test]
    fn more_days_suggest_smaller_cells_outside_deadband() {
        let balanced = auto_balance(settings(15, 1.4, 0.1), SettingsChange::DaysCount(30));
        assert_eq!(balanced.days_count, 30);
        assert_eq!(balanced.cell_size, 0.7);

        // 15 / 16 = 0.94 is within 0.1 of 0.9, so the size stays put
        let balanced = auto_balance(settings(15, 0.9, 0.1), SettingsChange::DaysCount(16));
        assert_eq!(balanced.cell_size, 0.9);

        let balanced = auto_balance(settings(15, 0.8, 0.1), SettingsChange::DaysCount(500));
        assert_eq!(balanced.days_count, 30);
    }

    #[test]
    fn theme_and_spacing_changes_pass_through() {
        let base = settings(18, 0.8, 0.1);
        let themed = auto_balance(base, SettingsChange::Theme(Theme::Light));
        assert_eq!(themed, Settings { theme: Theme::Light, ..base });
        let spaced = auto_balance(base, SettingsChange::Spacing(1.6));
        assert_eq!(spaced, Settings { spacing: 1.6, ..base });
    }

    #[test]
    fn change_uses_field_value_tags() {
        let change: SettingsChange =
            serde_json::from_str(r#"{"field":"cellSize","value":1.2}"#).unwrap();
        assert_eq!(change, SettingsChange::CellSize(1.2));
        let change: SettingsChange =
            serde_json::from_str(r#"{"field":"theme","value":"light"}"#).unwrap();
        assert_eq!(change, SettingsChange::Theme(Theme::Light));
    }
}
