pub mod app;
pub mod auth;
pub mod color;
pub mod days;
pub mod errors;
pub mod grid;
pub mod habit;
pub mod handlers;
pub mod models;
pub mod session;
pub mod settings;
pub mod state;
pub mod storage;
pub mod store;
pub mod ui;

pub use app::router;
pub use auth::{AuthProvider, AuthUser};
pub use errors::{AppError, HabitError};
pub use session::Session;
pub use state::AppState;
pub use storage::{resolve_data_dir, Storage};
