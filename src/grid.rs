use crate::days::{DayWindow, MonthGroup};
use crate::habit::{HabitId, Status};
use crate::settings::Settings;
use crate::store::HabitStore;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayHeader {
    pub date: NaiveDate,
    pub day_number: u32,
    pub is_today: bool,
    pub is_week_start: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridCell {
    pub date: NaiveDate,
    pub status: Status,
    /// Only set for completed cells; other statuses are colored by the page.
    pub fill_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HabitRow {
    pub id: HabitId,
    pub name: String,
    pub color: String,
    pub cells: Vec<GridCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridSnapshot {
    pub settings: Settings,
    pub months: Vec<MonthGroup>,
    pub days: Vec<DayHeader>,
    pub rows: Vec<HabitRow>,
}

pub fn project(store: &HabitStore, window: &DayWindow, settings: &Settings) -> GridSnapshot {
    let days = window
        .entries()
        .iter()
        .map(|entry| DayHeader {
            date: entry.date,
            day_number: entry.day_number(),
            is_today: entry.is_today,
            is_week_start: entry.is_week_start,
        })
        .collect();

    let rows = store
        .habits()
        .iter()
        .map(|habit| HabitRow {
            id: habit.id,
            name: habit.name.clone(),
            color: habit.color.clone(),
            cells: window
                .entries()
                .iter()
                .map(|entry| {
                    let status = habit.status_on(entry.date);
                    GridCell {
                        date: entry.date,
                        status,
                        fill_color: (status == Status::Completed).then(|| habit.color.clone()),
                    }
                })
                .collect(),
        })
        .collect();

    GridSnapshot {
        settings: *settings,
        months: window.months(),
        days,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn completed_cells_take_the_habit_color() {
        let today = day(2026, 2, 2);
        let mut store = HabitStore::seeded();
        store.set_status(1, today, Status::Completed).unwrap();
        store.set_status(1, day(2026, 2, 1), Status::Failed).unwrap();

        let window = DayWindow::generate(today, 7);
        let grid = project(&store, &window, &Settings::default());

        let row = &grid.rows[0];
        assert_eq!(row.cells.len(), 7);
        let last = row.cells.last().unwrap();
        assert_eq!(last.status, Status::Completed);
        assert_eq!(last.fill_color.as_deref(), Some("#3b82f6"));
        let failed = &row.cells[5];
        assert_eq!(failed.status, Status::Failed);
        assert_eq!(failed.fill_color, None);
        assert!(row.cells[..5].iter().all(|c| c.status == Status::NotTracked));
    }

    #[test]
    fn headers_follow_the_window() {
        let today = day(2026, 2, 2);
        let window = DayWindow::generate(today, 10);
        let grid = project(&HabitStore::seeded(), &window, &Settings::default());

        assert_eq!(grid.days.len(), 10);
        assert_eq!(grid.days.last().unwrap().day_number, 2);
        assert!(grid.days.last().unwrap().is_today);
        assert_eq!(grid.days.iter().filter(|d| d.is_week_start).count(), 2);
        assert_eq!(grid.months.len(), 2);
        assert_eq!(grid.months[0].span + grid.months[1].span, 10);
        let names: Vec<_> = grid.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Біг", "Читання", "Медитація"]);
    }

    #[test]
    fn projection_is_idempotent() {
        let store = HabitStore::seeded();
        let window = DayWindow::generate(day(2026, 2, 2), 15);
        let settings = Settings::default();
        assert_eq!(
            project(&store, &window, &settings),
            project(&store, &window, &settings)
        );
    }
}
