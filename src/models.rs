use crate::auth::AuthUser;
use crate::habit::{HabitId, Status};
use crate::settings::{Settings, SettingsChange};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub user_id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user: AuthUser,
    pub settings: Settings,
}

#[derive(Debug, Deserialize)]
pub struct CreateHabitRequest {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateHabitRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CellResponse {
    pub habit_id: HabitId,
    pub date: NaiveDate,
    pub status: Status,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ColorResponse {
    pub color: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SettingsResponse {
    pub committed: Settings,
    pub preview: Option<Settings>,
}

#[derive(Debug, Deserialize)]
pub struct BalanceRequest {
    pub draft: Settings,
    pub change: SettingsChange,
}
