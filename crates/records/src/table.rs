//! Data grid over one entity list, with edit and confirmed delete.

use counsel_client::HttpError;
use counsel_core::error::CoreError;
use counsel_core::record::Record;
use counsel_core::schema::EntitySchema;
use counsel_core::types::RecordId;

use crate::form::RecordForm;
use crate::query::{EntityQuery, QuerySnapshot};
use crate::state::AppContext;

/// One grid column bound to a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub field: &'static str,
    pub header: &'static str,
}

impl Column {
    pub const fn new(field: &'static str, header: &'static str) -> Self {
        Self { field, header }
    }
}

/// Columns for the named fields, headed by their labels.
pub fn columns_for(schema: &EntitySchema, names: &[&str]) -> Result<Vec<Column>, CoreError> {
    names
        .iter()
        .map(|name| {
            let field = schema.require_field(name)?;
            Ok(Column::new(field.name, field.label))
        })
        .collect()
}

/// Every first-page field, in schema order.
pub fn default_columns(schema: &EntitySchema) -> Vec<Column> {
    schema
        .page_fields(1)
        .map(|f| Column::new(f.name, f.label))
        .collect()
}

/// Destructive action awaiting an explicit confirm.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ConfirmationState {
    #[default]
    Idle,
    Pending(Record),
}

/// One rendered row: the underlying record plus its cell text.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub record: Record,
    pub cells: Vec<String>,
}

/// What the grid shows.
///
/// Placeholders are checked in order: loading, then fetching, then error.
/// A background refetch therefore shows the fetching placeholder even when
/// rows are cached.
#[derive(Debug, Clone, PartialEq)]
pub enum TableView {
    Loading,
    Fetching,
    Error(String),
    Rows(Vec<TableRow>),
}

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("No row at index {0}")]
    NoSuchRow(usize),

    #[error("Record has not been saved yet")]
    Unsaved,

    #[error("No delete is awaiting confirmation")]
    NothingPending,

    #[error(transparent)]
    Http(#[from] HttpError),
}

pub struct RecordTable {
    ctx: AppContext,
    schema: &'static EntitySchema,
    columns: Vec<Column>,
    query: EntityQuery,
    confirmation: ConfirmationState,
}

impl RecordTable {
    /// Start observing `schema`'s list.
    pub fn new(ctx: AppContext, schema: &'static EntitySchema, columns: Vec<Column>) -> Self {
        let query = ctx.queries.observe(schema);
        Self {
            ctx,
            schema,
            columns,
            query,
            confirmation: ConfirmationState::Idle,
        }
    }

    pub fn schema(&self) -> &'static EntitySchema {
        self.schema
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn query(&self) -> &EntityQuery {
        &self.query
    }

    /// For awaiting updates of the underlying list.
    pub fn query_mut(&mut self) -> &mut EntityQuery {
        &mut self.query
    }

    pub fn view(&self) -> TableView {
        let snapshot = self.query.snapshot();
        if snapshot.is_loading() {
            return TableView::Loading;
        }
        if snapshot.is_fetching {
            return TableView::Fetching;
        }
        if snapshot.is_error() {
            return TableView::Error(snapshot.error.clone().unwrap_or_default());
        }
        TableView::Rows(self.rows(&snapshot))
    }

    fn rows(&self, snapshot: &QuerySnapshot) -> Vec<TableRow> {
        snapshot
            .data
            .iter()
            .map(|record| TableRow {
                cells: self
                    .columns
                    .iter()
                    .map(|c| record.field_text(c.field))
                    .collect(),
                record: record.clone(),
            })
            .collect()
    }

    /// Record behind the row at `index` in the current list.
    pub fn record_at(&self, index: usize) -> Result<Record, TableError> {
        self.query
            .snapshot()
            .data
            .get(index)
            .cloned()
            .ok_or(TableError::NoSuchRow(index))
    }

    /// Table-level "add new".
    pub fn open_new(&self) -> RecordForm {
        RecordForm::new(self.ctx.clone(), self.schema, None)
    }

    /// Row-level "edit": the form starts from the row's record.
    pub fn open_edit(&self, index: usize) -> Result<RecordForm, TableError> {
        let record = self.record_at(index)?;
        Ok(RecordForm::new(self.ctx.clone(), self.schema, Some(&record)))
    }

    pub fn confirmation(&self) -> &ConfirmationState {
        &self.confirmation
    }

    /// Row-level "delete": only asks for confirmation.
    pub fn request_delete(&mut self, index: usize) -> Result<(), TableError> {
        let record = self.record_at(index)?;
        if record.is_new() {
            return Err(TableError::Unsaved);
        }
        self.confirmation = ConfirmationState::Pending(record);
        Ok(())
    }

    pub fn cancel_delete(&mut self) {
        self.confirmation = ConfirmationState::Idle;
    }

    /// Delete the pending record, then invalidate the list.
    ///
    /// The confirmation is cleared whether or not the request succeeds.
    pub async fn confirm_delete(&mut self) -> Result<RecordId, TableError> {
        let pending = std::mem::take(&mut self.confirmation);
        let ConfirmationState::Pending(record) = pending else {
            return Err(TableError::NothingPending);
        };
        let id = record.id.ok_or(TableError::Unsaved)?;

        match self.ctx.api.delete(self.schema.endpoint, id).await {
            Ok(()) => {
                tracing::info!(entity = self.schema.key, id, "Record deleted");
                self.ctx.queries.invalidate(self.schema.key);
                self.ctx.notifier.success(format!("{} deleted", self.schema.title));
                Ok(id)
            }
            Err(e) => {
                tracing::error!(entity = self.schema.key, id, error = %e, "Failed to delete record");
                self.ctx
                    .notifier
                    .error(format!("Could not delete {}: {}", self.schema.title, e.user_message()));
                Err(e.into())
            }
        }
    }
}
