//! Declarative field schemas for record forms.
//!
//! Every form/table pair in the application is described by one
//! [`EntitySchema`]: which fields exist, how each is edited, which wizard
//! page it lives on, and which fields the student lookup fills in. Field
//! names are the server's JSON keys; there is no client-side renaming.

use std::collections::HashSet;

use crate::error::CoreError;
use crate::record::Record;

/// How a field is edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text.
    Text,
    /// Numeric value carried as a string.
    Numeric,
    /// Calendar date, `YYYY-MM-DD`.
    Date,
    /// Single choice from a fixed option list.
    Choice(&'static [&'static str]),
    /// Read-only; only changed by the student lookup.
    Derived,
}

/// One form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSchema {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub default: &'static str,
    /// 1-based wizard page. Single-page forms put everything on page 1.
    pub page: u8,
}

impl FieldSchema {
    /// Free-text field on page 1 with an empty default.
    pub const fn text(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Text,
            default: "",
            page: 1,
        }
    }

    pub const fn numeric(name: &'static str, label: &'static str) -> Self {
        Self {
            kind: FieldKind::Numeric,
            ..Self::text(name, label)
        }
    }

    pub const fn date(name: &'static str, label: &'static str) -> Self {
        Self {
            kind: FieldKind::Date,
            ..Self::text(name, label)
        }
    }

    pub const fn choice(
        name: &'static str,
        label: &'static str,
        options: &'static [&'static str],
    ) -> Self {
        Self {
            kind: FieldKind::Choice(options),
            ..Self::text(name, label)
        }
    }

    pub const fn derived(name: &'static str, label: &'static str) -> Self {
        Self {
            kind: FieldKind::Derived,
            ..Self::text(name, label)
        }
    }

    /// Move the field to another wizard page.
    pub const fn on_page(self, page: u8) -> Self {
        Self { page, ..self }
    }

    /// Override the default value.
    pub const fn with_default(self, default: &'static str) -> Self {
        Self { default, ..self }
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self.kind, FieldKind::Derived)
    }

    /// Check that `value` is something this field's input could produce.
    ///
    /// Only choice fields constrain their input; an empty string means
    /// "nothing selected" and is always accepted.
    pub fn accepts(&self, value: &str) -> bool {
        match self.kind {
            FieldKind::Choice(options) => value.is_empty() || options.contains(&value),
            _ => true,
        }
    }
}

/// Which fields of an entity receive the student lookup result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityBinding {
    /// Student code; also the field the user types the search query into.
    pub code: &'static str,
    pub name: &'static str,
    /// Grade or year level.
    pub grade: &'static str,
    /// Section or course.
    pub section: &'static str,
}

/// Default binding used by the grade-level forms.
pub const GRADE_IDENTITY: IdentityBinding = IdentityBinding {
    code: "sr_code",
    name: "name",
    grade: "grade",
    section: "section",
};

/// Binding used by the college forms (year level and course).
pub const COLLEGE_IDENTITY: IdentityBinding = IdentityBinding {
    code: "sr_code",
    name: "name",
    grade: "year",
    section: "course",
};

/// The full description of one entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitySchema {
    /// Cache key, e.g. `grade_one_records`.
    pub key: &'static str,
    /// REST collection segment, e.g. `grade-one` for `/grade-one/`.
    pub endpoint: &'static str,
    pub title: &'static str,
    pub fields: &'static [FieldSchema],
    pub identity: Option<IdentityBinding>,
    /// Number of wizard pages (1 for plain forms).
    pub pages: u8,
}

impl EntitySchema {
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Look up a field, failing with [`CoreError::UnknownField`].
    pub fn require_field(&self, name: &str) -> Result<&FieldSchema, CoreError> {
        self.field(name).ok_or_else(|| CoreError::UnknownField {
            entity: self.key,
            field: name.to_string(),
        })
    }

    /// Fields shown on a given wizard page.
    pub fn page_fields(&self, page: u8) -> impl Iterator<Item = &FieldSchema> {
        self.fields.iter().filter(move |f| f.page == page)
    }

    /// A fresh create-mode draft with every field at its default.
    pub fn defaults(&self) -> Record {
        Record::from_pairs(self.fields.iter().map(|f| (f.name, f.default)))
    }

    /// Structural validation of the schema itself.
    ///
    /// Checks field-name uniqueness, choice option lists and defaults,
    /// page numbering, and that the identity binding points at existing
    /// fields with the derived ones marked read-only.
    pub fn validate(&self) -> Result<(), CoreError> {
        let invalid = |reason: String| CoreError::InvalidSchema {
            entity: self.key,
            reason,
        };

        if self.key.is_empty() || self.endpoint.is_empty() {
            return Err(invalid("key and endpoint must not be empty".into()));
        }
        if self.pages == 0 {
            return Err(invalid("must have at least one page".into()));
        }

        let mut seen = HashSet::new();
        for field in self.fields {
            if field.name.is_empty() {
                return Err(invalid("field with an empty name".into()));
            }
            if !seen.insert(field.name) {
                return Err(invalid(format!("duplicate field '{}'", field.name)));
            }
            if field.page == 0 || field.page > self.pages {
                return Err(invalid(format!(
                    "field '{}' is on page {} (pages 1..={})",
                    field.name, field.page, self.pages
                )));
            }
            if let FieldKind::Choice(options) = field.kind {
                if options.is_empty() {
                    return Err(invalid(format!("choice field '{}' has no options", field.name)));
                }
                if !field.accepts(field.default) {
                    return Err(invalid(format!(
                        "default '{}' of '{}' is not an option",
                        field.default, field.name
                    )));
                }
            }
        }

        for page in 1..=self.pages {
            if self.page_fields(page).next().is_none() {
                return Err(invalid(format!("page {page} has no fields")));
            }
        }

        if let Some(binding) = self.identity {
            let code = self
                .field(binding.code)
                .ok_or_else(|| invalid(format!("identity code field '{}' missing", binding.code)))?;
            if matches!(code.kind, FieldKind::Choice(_)) {
                return Err(invalid("identity code field cannot be a choice".into()));
            }
            for name in [binding.name, binding.grade, binding.section] {
                match self.field(name) {
                    Some(f) if f.is_read_only() => {}
                    Some(_) => {
                        return Err(invalid(format!("identity field '{name}' must be derived")))
                    }
                    None => return Err(invalid(format!("identity field '{name}' missing"))),
                }
            }
        }

        Ok(())
    }
}
