//! # Page State
//!
//! The two pieces of state every page has: the list it last fetched and the
//! create/edit dialog.

use crate::RollbookError;
use crate::records::Record;

// =============================================================================
// LIST VIEW
// =============================================================================

/// Rows from the most recent successful list fetch.
///
/// A failed fetch leaves the rows exactly as they were.
#[derive(Debug, Clone)]
pub struct ListView<T> {
    rows: Vec<T>,
    loaded: bool,
}

impl<T> Default for ListView<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            loaded: false,
        }
    }
}

impl<T> ListView<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    /// Whether any fetch has succeeded yet.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Take a fetch result: replace the rows on success, keep them on failure.
    pub fn apply<E>(&mut self, result: Result<Vec<T>, E>) -> Result<(), E> {
        let rows = result?;
        self.rows = rows;
        self.loaded = true;
        Ok(())
    }
}

impl<T: Record> ListView<T> {
    /// Row with the given primary key.
    pub fn get(&self, id: T::Id) -> Option<&T> {
        self.rows.iter().find(|row| row.id() == id)
    }

    /// Row with the given primary key, or `RecordNotFound`.
    pub fn require(&self, id: T::Id) -> Result<&T, RollbookError> {
        self.get(id).ok_or_else(|| RollbookError::RecordNotFound {
            resource: T::NOUN,
            id: id.to_string(),
        })
    }
}

// =============================================================================
// EDITOR
// =============================================================================

/// The create/edit dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Editor<I, F> {
    Closed,
    Creating(F),
    Editing {
        id: I,
        form: F,
    },
}

impl<I, F> Default for Editor<I, F> {
    fn default() -> Self {
        Self::Closed
    }
}

impl<I: Copy, F> Editor<I, F> {
    pub fn open_create(&mut self, blank: F) {
        *self = Self::Creating(blank);
    }

    pub fn open_edit(&mut self, id: I, prefilled: F) {
        *self = Self::Editing {
            id,
            form: prefilled,
        };
    }

    pub fn close(&mut self) {
        *self = Self::Closed;
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    pub fn form(&self) -> Option<&F> {
        match self {
            Self::Closed => None,
            Self::Creating(form) | Self::Editing { form, .. } => Some(form),
        }
    }

    pub fn form_mut(&mut self) -> Option<&mut F> {
        match self {
            Self::Closed => None,
            Self::Creating(form) | Self::Editing { form, .. } => Some(form),
        }
    }

    /// Record being edited; `None` while creating or closed.
    pub fn target(&self) -> Option<I> {
        match self {
            Self::Editing { id, .. } => Some(*id),
            _ => None,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
