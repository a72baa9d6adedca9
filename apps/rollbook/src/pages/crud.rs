//! # CRUD Page
//!
//! The list / create / edit / delete page every resource shares.

use super::{Outcome, failed};
use crate::client::{RecordId, Resource, RollbookClient};
use crate::confirm::Confirm;
use rollbook_core::{Editor, ListView, Record, RecordForm, RollbookError};

/// A list of records with a modal create/edit form.
pub struct CrudPage<R: Resource> {
    list: ListView<R::Record>,
    editor: Editor<RecordId<R>, R::Form>,
    filters: Vec<(&'static str, String)>,
}

impl<R: Resource> Default for CrudPage<R> {
    fn default() -> Self {
        Self {
            list: ListView::new(),
            editor: Editor::default(),
            filters: Vec::new(),
        }
    }
}

impl<R: Resource> CrudPage<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[R::Record] {
        self.list.rows()
    }

    pub fn list(&self) -> &ListView<R::Record> {
        &self.list
    }

    pub fn editor(&self) -> &Editor<RecordId<R>, R::Form> {
        &self.editor
    }

    /// Set or clear a list filter; applies from the next refresh on.
    pub fn set_filter(&mut self, name: &'static str, value: Option<String>) {
        self.filters.retain(|(n, _)| *n != name);
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.filters.push((name, value));
        }
    }

    /// Refetch the list.
    pub async fn refresh(&mut self, client: &RollbookClient) -> Outcome {
        let result = client.endpoint::<R>().list_filtered(&self.filters).await;
        match self.list.apply(result) {
            Ok(()) => {
                tracing::debug!("Fetched {} {}", self.list.rows().len(), R::PATH);
                Outcome::Done
            }
            Err(e) => failed(&format!("fetching {}", R::PATH), e),
        }
    }

    /// Open the form blank, for a new record.
    pub fn open_create(&mut self) {
        self.editor.open_create(R::Form::blank());
    }

    /// Open the form pre-filled from a listed record.
    pub fn open_edit(&mut self, id: RecordId<R>) -> Result<(), RollbookError> {
        let form = R::Form::from_record(self.list.require(id)?);
        self.editor.open_edit(id, form);
        Ok(())
    }

    pub fn form_mut(&mut self) -> Option<&mut R::Form> {
        self.editor.form_mut()
    }

    pub fn close(&mut self) {
        self.editor.close();
    }

    /// Create or update from the open form, then close it and refetch.
    pub async fn submit(&mut self, client: &RollbookClient) -> Outcome {
        let noun = <R::Record as Record>::NOUN;
        let Some(form) = self.editor.form() else {
            return failed(&format!("saving {noun}"), RollbookError::EditorClosed);
        };
        let payload = form.to_payload();

        let endpoint = client.endpoint::<R>();
        let result = match self.editor.target() {
            Some(id) => endpoint.update(id, &payload).await,
            None => endpoint.create(&payload).await,
        };

        match result {
            Ok(saved) => {
                tracing::info!("Saved {} {}", noun, saved.label());
                self.editor.close();
                self.refresh(client).await;
                Outcome::Done
            }
            Err(e) => failed(&format!("saving {noun}"), e),
        }
    }

    /// Ask, then delete and refetch. Declining sends nothing.
    pub async fn delete(
        &mut self,
        client: &RollbookClient,
        id: RecordId<R>,
        confirm: &mut dyn Confirm,
    ) -> Outcome {
        let noun = <R::Record as Record>::NOUN;
        let prompt = match self.list.get(id) {
            Some(record) => format!("Delete {noun} {}?", record.label()),
            None => format!("Delete {noun} #{id}?"),
        };
        if !confirm.confirm(&prompt) {
            tracing::debug!("Delete of {} {} declined", noun, id);
            return Outcome::Declined;
        }

        match client.endpoint::<R>().delete(id).await {
            Ok(()) => {
                tracing::info!("Deleted {} {}", noun, id);
                self.refresh(client).await;
                Outcome::Done
            }
            Err(e) => failed(&format!("deleting {noun} {id}"), e),
        }
    }
}
