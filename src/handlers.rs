use crate::auth::AuthUser;
use crate::days::parse_date_key;
use crate::errors::{AppError, HabitError};
use crate::grid::GridSnapshot;
use crate::habit::{Habit, HabitId, Status};
use crate::models::{
    BalanceRequest, CellResponse, ColorResponse, CreateHabitRequest, SessionResponse,
    SetStatusRequest, SettingsResponse, SignInRequest, UpdateHabitRequest,
};
use crate::session::Session;
use crate::settings::{auto_balance, Settings, SettingsModel};
use crate::store::HabitStore;
use crate::state::AppState;
use crate::ui::render_index;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    Json,
};
use chrono::{Local, NaiveDate};
use tracing::{error, info};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let mut session = state.session.lock().await;
    // A fresh page starts from committed settings; any preview left by a
    // closed dialog is dropped.
    if let Some(session) = session.as_mut() {
        session.settings_mut().reset_preview();
    }
    Html(render_index(session.as_ref().map(Session::user)))
}

pub async fn sign_in(
    State(state): State<AppState>,
    Json(payload): Json<SignInRequest>,
) -> Result<StatusCode, AppError> {
    let id = payload.user_id.trim();
    if id.is_empty() {
        return Err(AppError::bad_request("user_id must not be empty"));
    }

    state.auth.sign_in(AuthUser {
        id: id.to_string(),
        email: payload.email.filter(|email| !email.trim().is_empty()),
    });
    Ok(StatusCode::ACCEPTED)
}

pub async fn sign_out(State(state): State<AppState>) -> StatusCode {
    state.auth.sign_out();
    StatusCode::ACCEPTED
}

pub async fn get_session(State(state): State<AppState>) -> Result<Json<SessionResponse>, AppError> {
    let mut guard = state.session.lock().await;
    let session = active(&mut guard)?;
    Ok(Json(SessionResponse {
        user: session.user().clone(),
        settings: session.settings().committed(),
    }))
}

pub async fn get_grid(State(state): State<AppState>) -> Result<Json<GridSnapshot>, AppError> {
    let mut guard = state.session.lock().await;
    let session = active(&mut guard)?;
    Ok(Json(session.grid(today())))
}

pub async fn create_habit(
    State(state): State<AppState>,
    Json(payload): Json<CreateHabitRequest>,
) -> Result<(StatusCode, Json<Habit>), AppError> {
    let mut guard = state.session.lock().await;
    let session = active(&mut guard)?;
    let before = session.habits().clone();
    let habit = session
        .habits_mut()
        .create(&payload.name, payload.color.as_deref(), &mut rand::thread_rng())?
        .clone();

    save_habits(&state, session, before).await?;
    info!(habit = habit.id, "habit created");
    Ok((StatusCode::CREATED, Json(habit)))
}

pub async fn update_habit(
    State(state): State<AppState>,
    Path(id): Path<HabitId>,
    Json(payload): Json<UpdateHabitRequest>,
) -> Result<Json<Habit>, AppError> {
    let mut guard = state.session.lock().await;
    let session = active(&mut guard)?;
    let before = session.habits().clone();
    let changed = session
        .habits_mut()
        .update(id, payload.name.as_deref(), payload.color.as_deref())?;

    if changed {
        save_habits(&state, session, before).await?;
    }
    let habit = session.habits().get(id).cloned().ok_or(HabitError::NotFound(id))?;
    Ok(Json(habit))
}

pub async fn delete_habit(
    State(state): State<AppState>,
    Path(id): Path<HabitId>,
) -> Result<StatusCode, AppError> {
    let mut guard = state.session.lock().await;
    let session = active(&mut guard)?;
    let before = session.habits().clone();
    session.habits_mut().delete(id)?;

    save_habits(&state, session, before).await?;
    info!(habit = id, "habit deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_day(
    State(state): State<AppState>,
    Path((id, date)): Path<(HabitId, String)>,
) -> Result<Json<CellResponse>, AppError> {
    let date = parse_date(&date)?;
    let mut guard = state.session.lock().await;
    let session = active(&mut guard)?;
    let before = session.habits().clone();
    let status = session.habits_mut().toggle(id, date)?;

    save_habits(&state, session, before).await?;
    Ok(Json(CellResponse {
        habit_id: id,
        date,
        status,
    }))
}

pub async fn set_day(
    State(state): State<AppState>,
    Path((id, date)): Path<(HabitId, String)>,
    Json(payload): Json<SetStatusRequest>,
) -> Result<Json<CellResponse>, AppError> {
    let date = parse_date(&date)?;
    let status = Status::parse(&payload.status)
        .ok_or_else(|| AppError::bad_request(format!("unknown status '{}'", payload.status)))?;
    let mut guard = state.session.lock().await;
    let session = active(&mut guard)?;
    let before = session.habits().clone();
    session.habits_mut().set_status(id, date, status)?;

    save_habits(&state, session, before).await?;
    Ok(Json(CellResponse {
        habit_id: id,
        date,
        status,
    }))
}

pub async fn next_color(State(state): State<AppState>) -> Result<Json<ColorResponse>, AppError> {
    let mut guard = state.session.lock().await;
    let session = active(&mut guard)?;
    let color = session
        .habits()
        .suggest_color(&mut rand::thread_rng())
        .map(str::to_string);
    Ok(Json(ColorResponse { color }))
}

pub async fn get_settings(State(state): State<AppState>) -> Result<Json<SettingsResponse>, AppError> {
    let mut guard = state.session.lock().await;
    let session = active(&mut guard)?;
    Ok(Json(SettingsResponse {
        committed: session.settings().committed(),
        preview: session.settings().pending(),
    }))
}

pub async fn commit_settings(
    State(state): State<AppState>,
    Json(pending): Json<Settings>,
) -> Result<Json<Settings>, AppError> {
    let mut guard = state.session.lock().await;
    let session = active(&mut guard)?;
    let before = session.settings().clone();
    let committed = session.settings_mut().commit(pending);

    save_settings(&state, session, before).await?;
    info!(days = committed.days_count, "settings committed");
    Ok(Json(committed))
}

pub async fn restore_default_settings(
    State(state): State<AppState>,
) -> Result<Json<Settings>, AppError> {
    let mut guard = state.session.lock().await;
    let session = active(&mut guard)?;
    let before = session.settings().clone();
    let committed = session.settings_mut().restore_defaults();

    save_settings(&state, session, before).await?;
    Ok(Json(committed))
}

pub async fn preview_settings(
    State(state): State<AppState>,
    Json(pending): Json<Settings>,
) -> Result<Json<GridSnapshot>, AppError> {
    let mut guard = state.session.lock().await;
    let session = active(&mut guard)?;
    Ok(Json(session.preview(pending, today())))
}

pub async fn reset_preview(State(state): State<AppState>) -> Result<Json<GridSnapshot>, AppError> {
    let mut guard = state.session.lock().await;
    let session = active(&mut guard)?;
    Ok(Json(session.reset_preview(today())))
}

pub async fn balance_settings(
    State(state): State<AppState>,
    Json(payload): Json<BalanceRequest>,
) -> Result<Json<Settings>, AppError> {
    let mut guard = state.session.lock().await;
    active(&mut guard)?;
    Ok(Json(auto_balance(payload.draft, payload.change)))
}

/// Persists the session's habits, putting `before` back if the write fails.
async fn save_habits(
    state: &AppState,
    session: &mut Session,
    before: HabitStore,
) -> Result<(), AppError> {
    if let Err(err) = state.storage.persist_habits(session).await {
        error!(user = %session.user().id, "failed to save habits: {}", err.message);
        *session.habits_mut() = before;
        return Err(err);
    }
    Ok(())
}

async fn save_settings(
    state: &AppState,
    session: &mut Session,
    before: SettingsModel,
) -> Result<(), AppError> {
    if let Err(err) = state.storage.persist_settings(session).await {
        error!(user = %session.user().id, "failed to save settings: {}", err.message);
        *session.settings_mut() = before;
        return Err(err);
    }
    Ok(())
}

fn active(session: &mut Option<Session>) -> Result<&mut Session, AppError> {
    session.as_mut().ok_or_else(AppError::unauthorized)
}

fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    parse_date_key(value)
        .ok_or_else(|| AppError::bad_request(format!("invalid date '{value}', expected YYYY-MM-DD")))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
