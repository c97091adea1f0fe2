//! Schema-driven create/update form.
//!
//! One [`RecordForm`] serves every entity: the [`EntitySchema`] decides
//! which fields exist, which are read-only and which page of the wizard
//! they sit on. Whether a submit creates or updates is decided solely by
//! the presence of the record id.

use serde_json::{Map, Value};
use tokio::task::JoinHandle;

use counsel_client::HttpError;
use counsel_core::error::CoreError;
use counsel_core::identity::{apply_candidate, StudentCandidate};
use counsel_core::record::Record;
use counsel_core::schema::{EntitySchema, FieldSchema};
use counsel_core::types::RecordId;
use counsel_core::wizard::Pager;

use crate::lookup::{LookupOutcome, StudentLookup};
use crate::state::AppContext;

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error(transparent)]
    Field(#[from] CoreError),

    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("{0} has no student lookup")]
    NoIdentity(&'static str),
}

/// Create or edit, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(RecordId),
}

pub struct RecordForm {
    ctx: AppContext,
    schema: &'static EntitySchema,
    id: Option<RecordId>,
    draft: Map<String, Value>,
    pager: Pager,
    lookup: Option<StudentLookup>,
}

impl std::fmt::Debug for RecordForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordForm")
            .field("schema", &self.schema)
            .field("id", &self.id)
            .field("draft", &self.draft)
            .field("pager", &self.pager)
            .finish_non_exhaustive()
    }
}

impl RecordForm {
    /// Open a form for `schema`.
    ///
    /// With an `initial` record every schema field is copied from it
    /// (missing ones take their default) and its id, if any, selects edit
    /// mode. Without one the draft is all defaults.
    pub fn new(ctx: AppContext, schema: &'static EntitySchema, initial: Option<&Record>) -> Self {
        let (id, draft) = match initial {
            Some(record) => {
                let draft = schema
                    .fields
                    .iter()
                    .map(|f| {
                        let value = match record.fields.get(f.name) {
                            Some(Value::Null) | None => Value::String(f.default.to_string()),
                            Some(v) => v.clone(),
                        };
                        (f.name.to_string(), value)
                    })
                    .collect();
                (record.id, draft)
            }
            None => (None, schema.defaults().fields),
        };

        Self {
            ctx,
            schema,
            id,
            draft,
            pager: Pager::new(schema.pages),
            lookup: None,
        }
    }

    /// Attach a student lookup used by [`search_identity`](Self::search_identity).
    pub fn with_lookup(mut self, lookup: StudentLookup) -> Self {
        self.lookup = Some(lookup);
        self
    }

    pub fn schema(&self) -> &'static EntitySchema {
        self.schema
    }

    pub fn mode(&self) -> FormMode {
        match self.id {
            Some(id) => FormMode::Edit(id),
            None => FormMode::Create,
        }
    }

    pub fn lookup(&self) -> Option<&StudentLookup> {
        self.lookup.as_ref()
    }

    /// Current value of a field as display text.
    pub fn value(&self, name: &str) -> String {
        match self.draft.get(name) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    /// The record that a submit would send (without its id).
    pub fn draft(&self) -> Record {
        Record {
            id: None,
            fields: self.draft.clone(),
        }
    }

    /// Keystroke-level edit of one field.
    ///
    /// Derived fields are rejected; they change only through
    /// [`select_candidate`](Self::select_candidate).
    pub fn set_field(&mut self, name: &str, value: impl Into<String>) -> Result<(), FormError> {
        let field = self.schema.require_field(name)?;
        if field.is_read_only() {
            return Err(CoreError::ReadOnlyField(name.to_string()).into());
        }
        let value = value.into();
        if !field.accepts(&value) {
            return Err(CoreError::InvalidChoice {
                field: name.to_string(),
                value,
            }
            .into());
        }
        self.draft.insert(field.name.to_string(), Value::String(value));
        Ok(())
    }

    /// Type into the student code field and search for matches.
    ///
    /// Only the code field changes here; the derived identity fields stay
    /// as they are until a candidate is selected.
    pub fn search_identity(&mut self, query: &str) -> Result<JoinHandle<LookupOutcome>, FormError> {
        let binding = self
            .schema
            .identity
            .ok_or(FormError::NoIdentity(self.schema.key))?;
        let lookup = self
            .lookup
            .as_ref()
            .ok_or(FormError::NoIdentity(self.schema.key))?;
        self.draft
            .insert(binding.code.to_string(), Value::String(query.to_string()));
        Ok(lookup.search(query))
    }

    /// Fill the identity fields from a lookup result.
    pub fn select_candidate(&mut self, candidate: &StudentCandidate) -> Result<(), FormError> {
        let binding = self
            .schema
            .identity
            .ok_or(FormError::NoIdentity(self.schema.key))?;
        apply_candidate(&binding, &mut self.draft, candidate);
        if let Some(lookup) = &self.lookup {
            lookup.clear();
        }
        tracing::debug!(entity = self.schema.key, sr_code = %candidate.sr_code, "Applied lookup candidate");
        Ok(())
    }

    // ---- paging ----

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn next_page(&mut self) -> bool {
        self.pager.next()
    }

    pub fn back_page(&mut self) -> bool {
        self.pager.back()
    }

    /// Fields on the page currently shown.
    pub fn visible_fields(&self) -> Vec<&'static FieldSchema> {
        let schema: &'static EntitySchema = self.schema;
        schema.page_fields(self.pager.current()).collect()
    }

    /// Back to an empty create-mode draft on the first page.
    pub fn reset(&mut self) {
        self.id = None;
        self.draft = self.schema.defaults().fields;
        self.pager.reset();
    }

    /// Save the draft with exactly one request.
    ///
    /// Creates when the form has no id, otherwise updates that id. On
    /// success the form resets, the entity's list is invalidated and
    /// `on_close` runs. On failure the draft is kept as entered.
    pub async fn submit<F>(&mut self, on_close: F) -> Result<Record, FormError>
    where
        F: FnOnce() + Send,
    {
        let schema = self.schema;
        let body = self.draft();
        let result = match self.id {
            None => self.ctx.api.create(schema.endpoint, &body).await,
            Some(id) => self.ctx.api.update(schema.endpoint, id, &body).await,
        };

        match result {
            Ok(saved) => {
                tracing::info!(entity = schema.key, id = ?saved.id, mode = ?self.mode(), "Record saved");
                self.reset();
                self.ctx.queries.invalidate(schema.key);
                on_close();
                self.ctx.notifier.success(format!("{} saved", schema.title));
                Ok(saved)
            }
            Err(e) => {
                tracing::error!(entity = schema.key, error = %e, "Failed to save record");
                self.ctx
                    .notifier
                    .error(format!("Could not save {}: {}", schema.title, e.user_message()));
                Err(e.into())
            }
        }
    }
}
