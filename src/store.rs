use crate::color::{is_hex_color, next_color, DEFAULT_PALETTE};
use crate::errors::HabitError;
use crate::habit::{Habit, HabitId, Status};
use chrono::{NaiveDate, Utc};
use rand::Rng;
use std::collections::HashSet;
use tracing::warn;

/// Ordered habit collection. Display order is creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitStore {
    habits: Vec<Habit>,
}

impl HabitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Demo habits shown to a user with no stored data.
    pub fn seeded() -> Self {
        Self {
            habits: vec![
                Habit::new(1, "Біг", "#3b82f6"),
                Habit::new(2, "Читання", "#f59e0b"),
                Habit::new(3, "Медитація", "#10b981"),
            ],
        }
    }

    /// Restores a stored blob, falling back to [`HabitStore::seeded`] when the
    /// blob is missing or unreadable.
    pub fn load_or_default(blob: Option<&str>) -> Self {
        let Some(blob) = blob else {
            return Self::seeded();
        };
        match Self::deserialize(blob) {
            Ok(store) => store,
            Err(err) => {
                warn!("discarding stored habits: {err}");
                Self::seeded()
            }
        }
    }

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn len(&self) -> usize {
        self.habits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.habits.is_empty()
    }

    pub fn get(&self, id: HabitId) -> Option<&Habit> {
        self.habits.iter().find(|habit| habit.id == id)
    }

    pub fn used_colors(&self) -> Vec<&str> {
        self.habits.iter().map(|habit| habit.color.as_str()).collect()
    }

    pub fn suggest_color<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&'static str> {
        next_color(self.used_colors().as_slice(), &DEFAULT_PALETTE, rng)
    }

    pub fn create<R: Rng + ?Sized>(
        &mut self,
        name: &str,
        color: Option<&str>,
        rng: &mut R,
    ) -> Result<&Habit, HabitError> {
        self.create_with_palette(name, color, &DEFAULT_PALETTE, rng)
    }

    pub fn create_with_palette<P, R>(
        &mut self,
        name: &str,
        color: Option<&str>,
        palette: &[P],
        rng: &mut R,
    ) -> Result<&Habit, HabitError>
    where
        P: AsRef<str>,
        R: Rng + ?Sized,
    {
        let name = validate_name(name)?;
        let color = match color {
            Some(color) => validate_color(color)?,
            None => next_color(self.used_colors().as_slice(), palette, rng)
                .ok_or_else(|| HabitError::validation("no colors available"))?
                .to_string(),
        };

        let habit = Habit::new(self.next_id(), name, color);
        self.habits.push(habit);
        Ok(&self.habits[self.habits.len() - 1])
    }

    /// Returns whether anything changed.
    pub fn rename(&mut self, id: HabitId, name: &str) -> Result<bool, HabitError> {
        self.update(id, Some(name), None)
    }

    pub fn recolor(&mut self, id: HabitId, color: &str) -> Result<bool, HabitError> {
        self.update(id, None, Some(color))
    }

    /// Applies a rename and/or recolor together; both are validated before
    /// either is applied.
    pub fn update(
        &mut self,
        id: HabitId,
        name: Option<&str>,
        color: Option<&str>,
    ) -> Result<bool, HabitError> {
        let habit = self.find_mut(id)?;
        let name = name.map(validate_name).transpose()?;
        let color = color.map(validate_color).transpose()?;

        let mut changed = false;
        if let Some(name) = name.filter(|name| *name != habit.name) {
            habit.name = name;
            changed = true;
        }
        if let Some(color) = color.filter(|color| *color != habit.color) {
            habit.color = color;
            changed = true;
        }
        Ok(changed)
    }

    pub fn delete(&mut self, id: HabitId) -> Result<Habit, HabitError> {
        let index = self
            .habits
            .iter()
            .position(|habit| habit.id == id)
            .ok_or(HabitError::NotFound(id))?;
        Ok(self.habits.remove(index))
    }

    pub fn status(&self, id: HabitId, date: NaiveDate) -> Result<Status, HabitError> {
        self.get(id)
            .map(|habit| habit.status_on(date))
            .ok_or(HabitError::NotFound(id))
    }

    pub fn set_status(
        &mut self,
        id: HabitId,
        date: NaiveDate,
        status: Status,
    ) -> Result<(), HabitError> {
        self.find_mut(id)?.set_status(date, status);
        Ok(())
    }

    /// Advances one cell around the status ring and returns the new status.
    pub fn toggle(&mut self, id: HabitId, date: NaiveDate) -> Result<Status, HabitError> {
        let habit = self.find_mut(id)?;
        let next = habit.status_on(date).next();
        habit.set_status(date, next);
        Ok(next)
    }

    pub fn serialize(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.habits)
    }

    pub fn deserialize(blob: &str) -> Result<Self, HabitError> {
        let mut habits: Vec<Habit> = serde_json::from_str(blob)?;
        let mut seen = HashSet::with_capacity(habits.len());
        for habit in &mut habits {
            if !seen.insert(habit.id) {
                return Err(HabitError::parse(format!("duplicate habit id {}", habit.id)));
            }
            habit.name = validate_name(&habit.name)
                .map_err(|_| HabitError::parse(format!("habit {} has an empty name", habit.id)))?;
            habit.color = validate_color(&habit.color).map_err(|_| {
                HabitError::parse(format!("habit {} has an invalid color", habit.id))
            })?;
            habit.days.retain(|_, status| *status != Status::NotTracked);
        }
        Ok(Self { habits })
    }

    fn find_mut(&mut self, id: HabitId) -> Result<&mut Habit, HabitError> {
        self.habits
            .iter_mut()
            .find(|habit| habit.id == id)
            .ok_or(HabitError::NotFound(id))
    }

    // Millisecond timestamps keep ids compatible with stored blobs; the bump
    // keeps them unique when two habits are created in the same millisecond.
    fn next_id(&self) -> HabitId {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        let floor = self
            .habits
            .iter()
            .map(|habit| habit.id)
            .max()
            .map_or(0, |max| max.saturating_add(1));
        now.max(floor)
    }
}

fn validate_name(name: &str) -> Result<String, HabitError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(HabitError::validation("habit name must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn validate_color(color: &str) -> Result<String, HabitError> {
    let trimmed = color.trim();
    if !is_hex_color(trimmed) {
        return Err(HabitError::validation(format!("invalid color '{trimmed}'")));
    }
    Ok(trimmed.to_string())
}
