use std::rc::Rc;

use super::{Schedule, ScheduleDraft};
use crate::error::{CoreError, Result};
use crate::storage::{keys, save, KvStore};

/// Owns the schedule list, in insertion order.
///
/// The only writer of schedules. Tick handlers read through [`schedules`]
/// and never mutate. Every mutation is written through to the store before it
/// becomes visible, so a failed write leaves the in-memory list untouched.
///
/// [`schedules`]: ScheduleRepository::schedules
pub struct ScheduleRepository {
    schedules: Vec<Schedule>,
    store: Rc<dyn KvStore>,
}

impl ScheduleRepository {
    /// Load the persisted list.
    ///
    /// Entries are decoded one by one: an entry missing `type` is repaired to a
    /// focus schedule, an entry that cannot be decoded at all is dropped with a
    /// warning. An unreadable list loads as empty.
    pub fn load(store: Rc<dyn KvStore>) -> Self {
        let raw: Vec<serde_json::Value> = crate::storage::load_or_default(&*store, keys::SCHEDULES);
        let schedules = raw
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<Schedule>(entry) {
                Ok(schedule) => Some(schedule),
                Err(e) => {
                    tracing::warn!(error = %e, "dropping unreadable stored schedule");
                    None
                }
            })
            .collect::<Vec<_>>();
        tracing::debug!(count = schedules.len(), "schedules loaded");
        Self { schedules, store }
    }

    pub fn schedules(&self) -> &[Schedule] {
        &self.schedules
    }

    pub fn get(&self, id: &str) -> Option<&Schedule> {
        self.schedules.iter().find(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.schedules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schedules.is_empty()
    }

    /// Validate `draft`, assign it a fresh id, and append it.
    ///
    /// # Errors
    /// Returns a validation error for an invalid draft, or a store error if the
    /// write fails. Nothing is changed in either case.
    pub fn create(&mut self, draft: ScheduleDraft) -> Result<&Schedule> {
        draft.validate()?;
        let id = self.fresh_id();
        let mut next = self.schedules.clone();
        next.push(draft.into_schedule(id));
        self.commit(next)?;
        let created = &self.schedules[self.schedules.len() - 1];
        tracing::info!(id = %created.id, title = %created.title, "schedule created");
        Ok(created)
    }

    /// Replace the schedule with `id` in place, keeping its position.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown id, a validation error for an invalid
    /// draft, or a store error if the write fails.
    pub fn update(&mut self, id: &str, draft: ScheduleDraft) -> Result<&Schedule> {
        draft.validate()?;
        let index = self.index_of(id)?;
        let mut next = self.schedules.clone();
        next[index] = draft.into_schedule(id.to_string());
        self.commit(next)?;
        tracing::info!(id, "schedule updated");
        Ok(&self.schedules[index])
    }

    /// Remove the schedule with `id`.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown id or a store error if the write fails.
    pub fn delete(&mut self, id: &str) -> Result<Schedule> {
        let index = self.index_of(id)?;
        let mut next = self.schedules.clone();
        let removed = next.remove(index);
        self.commit(next)?;
        tracing::info!(id, "schedule deleted");
        Ok(removed)
    }

    fn index_of(&self, id: &str) -> Result<usize> {
        self.schedules
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| CoreError::NotFound {
                kind: "schedule",
                id: id.to_string(),
            })
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = uuid::Uuid::new_v4().to_string();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    fn commit(&mut self, next: Vec<Schedule>) -> Result<()> {
        save(&*self.store, keys::SCHEDULES, &next)?;
        self.schedules = next;
        Ok(())
    }
}
