//! To-do record domain model.
//!
//! # Responsibility
//! - Define the persisted record shape and its store-assigned identity.
//! - Coerce externally supplied keys (UI attributes) into identifiers.
//!
//! # Invariants
//! - `TodoId` is always a positive integer.
//! - Callers can never construct a record id for insertion: `NewTodo` has no
//!   id field, ids only come back from the store.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Largest integer a UI layer can carry in a double without losing precision.
const MAX_SAFE_KEY: f64 = 9_007_199_254_740_991.0;

/// Store-assigned record identifier.
///
/// Monotonically increasing within one store and never reused, even after
/// the highest id is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(i64);

impl TodoId {
    /// Wraps a raw key, rejecting non-positive values.
    pub fn new(raw: i64) -> Option<Self> {
        if raw > 0 {
            Some(Self(raw))
        } else {
            None
        }
    }

    /// Raw integer key as stored in `todolist_os.id`.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl Display for TodoId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persisted to-do entry as yielded by a full scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoRecord {
    pub id: TodoId,
    pub title: String,
    pub description: String,
}

/// Insert payload. Empty strings are valid for both fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTodo {
    pub title: String,
    pub description: String,
}

impl NewTodo {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Caller supplied a key that does not name any possible record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTodoId {
    /// Raw key text, trimmed.
    pub raw: String,
}

impl Display for InvalidTodoId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid todo id `{}`: expected a positive integer",
            self.raw
        )
    }
}

impl Error for InvalidTodoId {}

/// Coerces a textual entry key into a `TodoId`.
///
/// Mirrors numeric coercion of a UI attribute value: surrounding whitespace
/// is ignored and decimal/exponent forms that denote an integer are accepted
/// (`"7"`, `" 7 "`, `"7.0"`, `"7e0"`). Keys that are not numbers, not finite,
/// fractional, or not positive are rejected.
pub fn coerce_todo_id(raw: &str) -> Result<TodoId, InvalidTodoId> {
    let trimmed = raw.trim();
    let invalid = || InvalidTodoId {
        raw: trimmed.to_string(),
    };

    if let Ok(value) = trimmed.parse::<i64>() {
        return TodoId::new(value).ok_or_else(invalid);
    }

    // `f64::from_str` accepts `inf`/`NaN` spellings; the finiteness check
    // below rejects them together with overflow.
    let value = trimmed.parse::<f64>().map_err(|_| invalid())?;
    if !value.is_finite() || value.fract() != 0.0 || value < 1.0 || value > MAX_SAFE_KEY {
        return Err(invalid());
    }

    TodoId::new(value as i64).ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::{coerce_todo_id, TodoId};

    #[test]
    fn todo_id_rejects_non_positive_values() {
        assert!(TodoId::new(0).is_none());
        assert!(TodoId::new(-3).is_none());
        assert_eq!(TodoId::new(9).map(TodoId::get), Some(9));
    }

    #[test]
    fn coerce_accepts_integer_spellings() {
        assert_eq!(coerce_todo_id("12").unwrap().get(), 12);
        assert_eq!(coerce_todo_id("  4 ").unwrap().get(), 4);
        assert_eq!(coerce_todo_id("3.0").unwrap().get(), 3);
        assert_eq!(coerce_todo_id("2e1").unwrap().get(), 20);
    }

    #[test]
    fn coerce_rejects_values_that_are_not_positive_integers() {
        for raw in ["", "  ", "abc", "NaN", "inf", "-1", "0", "1.5", "1e300"] {
            let err = coerce_todo_id(raw).expect_err("key should be rejected");
            assert_eq!(err.raw, raw.trim());
        }
    }
}
