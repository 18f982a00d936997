//! Per-session to-do list. Cleared whenever the timer is reset.

use serde::{Deserialize, Serialize};
use std::rc::Rc;

use crate::error::{CoreError, Result, ValidationError};
use crate::storage::{keys, load_or_default, save, KvStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: String,
    pub text: String,
    pub completed: bool,
}

pub struct TodoList {
    items: Vec<Todo>,
    store: Rc<dyn KvStore>,
}

impl TodoList {
    pub fn load(store: Rc<dyn KvStore>) -> Self {
        Self {
            items: load_or_default(&*store, keys::SESSION_TODOS),
            store,
        }
    }

    pub fn items(&self) -> &[Todo] {
        &self.items
    }

    pub fn remaining(&self) -> usize {
        self.items.iter().filter(|t| !t.completed).count()
    }

    /// Append a to-do. Text is trimmed and must not be empty.
    ///
    /// # Errors
    /// Returns `EmptyTodo` for blank text, or a store error if the write fails.
    pub fn add(&mut self, text: &str) -> Result<&Todo> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyTodo.into());
        }
        let mut next = self.items.clone();
        next.push(Todo {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.to_string(),
            completed: false,
        });
        self.commit(next)?;
        Ok(&self.items[self.items.len() - 1])
    }

    /// Flip the completed flag. Returns the new value.
    pub fn toggle(&mut self, id: &str) -> Result<bool> {
        let index = self.index_of(id)?;
        let mut next = self.items.clone();
        next[index].completed = !next[index].completed;
        let completed = next[index].completed;
        self.commit(next)?;
        Ok(completed)
    }

    pub fn delete(&mut self, id: &str) -> Result<Todo> {
        let index = self.index_of(id)?;
        let mut next = self.items.clone();
        let removed = next.remove(index);
        self.commit(next)?;
        Ok(removed)
    }

    /// Drop every item. A store failure is logged and the list still clears.
    pub fn clear(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.items.clear();
        let _ = save(&*self.store, keys::SESSION_TODOS, &self.items);
    }

    fn index_of(&self, id: &str) -> Result<usize> {
        self.items
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| CoreError::NotFound {
                kind: "todo",
                id: id.to_string(),
            })
    }

    fn commit(&mut self, next: Vec<Todo>) -> Result<()> {
        save(&*self.store, keys::SESSION_TODOS, &next)?;
        self.items = next;
        Ok(())
    }
}
