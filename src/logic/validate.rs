//! Form validation and normalization.
//!
//! Every validator takes an untrusted [`RawForm`] and returns either the
//! canonical draft or a [`FormRejection`] carrying the sanitized submission
//! and one message per failing field, in form order. Nothing here touches the
//! store; reference existence is checked by the workflow afterwards.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::model::{
    format_date, Creator, CopyStatus, EntityKind, Id, PhysicalCopy, RawForm, Tag, Work,
};

const NAME_MAX_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// A submission that failed validation, kept whole for redisplay
#[derive(Debug, Clone, PartialEq)]
pub struct FormRejection<S> {
    pub submission: S,
    pub errors: Vec<FieldError>,
}

/// HTML-escapes text so it is safe to render verbatim
pub fn escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            '/' => escaped.push_str("&#x2F;"),
            '\\' => escaped.push_str("&#x5C;"),
            '`' => escaped.push_str("&#96;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Reverses [`escape`]. Stored text is escaped, so prefilling a form with it
/// has to undo that or an unchanged resubmission escapes it twice.
pub fn unescape(input: &str) -> String {
    input
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#x2F;", "/")
        .replace("&#x5C;", "\\")
        .replace("&#96;", "`")
        .replace("&amp;", "&")
}

/// `YYYY-MM-DD` with zero-padded month and day
fn has_date_shape(input: &str) -> bool {
    let bytes = input.as_bytes();
    bytes.len() >= 10
        && bytes[..10].iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Parses an ISO-8601 calendar date. Full timestamps are accepted and reduced
/// to their date part.
pub fn parse_iso_date(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    if !has_date_shape(trimmed) {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|value| value.date_naive())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|value| value.date())
        })
}

/// One field flowing through its rule chain. The first failing rule wins.
struct Field {
    name: &'static str,
    value: String,
    error: Option<String>,
}

impl Field {
    fn text(form: &RawForm, name: &'static str) -> Self {
        Self {
            name,
            value: form.text(name).trim().to_string(),
            error: None,
        }
    }

    fn check(mut self, ok: impl FnOnce(&str) -> bool, message: &str) -> Self {
        if self.error.is_none() && !ok(&self.value) {
            self.error = Some(message.to_string());
        }
        self
    }

    fn required(self, message: &str) -> Self {
        self.check(|v| !v.is_empty(), message)
    }

    fn alphanumeric(self, message: &str) -> Self {
        self.check(|v| v.chars().all(|c| c.is_ascii_alphanumeric()), message)
    }

    fn max_len(self, max: usize, message: &str) -> Self {
        self.check(|v| v.chars().count() <= max, message)
    }

    /// Empty is fine; anything else has to be a date
    fn optional_date(self, message: &str) -> Self {
        self.check(|v| v.is_empty() || parse_iso_date(v).is_some(), message)
    }

    fn date(&self) -> Option<NaiveDate> {
        if self.value.is_empty() {
            None
        } else {
            parse_iso_date(&self.value)
        }
    }

    fn escaped(&self) -> String {
        escape(&self.value)
    }

    fn raw(&self) -> String {
        self.value.clone()
    }
}

/// Collects field errors in the order fields are checked
#[derive(Default)]
struct Errors(Vec<FieldError>);

impl Errors {
    fn record(&mut self, field: &Field) {
        if let Some(message) = &field.error {
            self.0.push(FieldError::new(field.name, message));
        }
    }

    fn finish<T, S>(self, draft: T, submission: S) -> Result<T, FormRejection<S>> {
        if self.0.is_empty() {
            Ok(draft)
        } else {
            Err(FormRejection {
                submission,
                errors: self.0,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Creator
// ---------------------------------------------------------------------------

/// Creator form as typed by the requester (sanitized, dates as text)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatorForm {
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: String,
    pub date_of_death: String,
}

impl From<&Creator> for CreatorForm {
    fn from(creator: &Creator) -> Self {
        Self {
            first_name: unescape(&creator.first_name),
            family_name: unescape(&creator.family_name),
            date_of_birth: creator.date_of_birth_formatted(),
            date_of_death: creator.date_of_death_formatted(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatorDraft {
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl CreatorDraft {
    pub fn into_creator(self, id: Id) -> Creator {
        Creator {
            id,
            first_name: self.first_name,
            family_name: self.family_name,
            date_of_birth: self.date_of_birth,
            date_of_death: self.date_of_death,
        }
    }
}

pub fn validate_creator(form: &RawForm) -> Result<CreatorDraft, FormRejection<CreatorForm>> {
    let first_name = Field::text(form, "first_name")
        .required("First name must be specified.")
        .alphanumeric("First name has non-alphanumeric characters.")
        .max_len(NAME_MAX_LEN, "First name must be at most 100 characters.");
    let family_name = Field::text(form, "family_name")
        .required("Family name must be specified.")
        .alphanumeric("Family name has non-alphanumeric characters.")
        .max_len(NAME_MAX_LEN, "Family name must be at most 100 characters.");
    let date_of_birth = Field::text(form, "date_of_birth").optional_date("Invalid date of birth");
    let date_of_death = Field::text(form, "date_of_death").optional_date("Invalid date of death");

    let mut errors = Errors::default();
    for field in [&first_name, &family_name, &date_of_birth, &date_of_death] {
        errors.record(field);
    }

    let submission = CreatorForm {
        first_name: first_name.escaped(),
        family_name: family_name.escaped(),
        date_of_birth: date_of_birth.raw(),
        date_of_death: date_of_death.raw(),
    };
    let draft = CreatorDraft {
        first_name: first_name.escaped(),
        family_name: family_name.escaped(),
        date_of_birth: date_of_birth.date(),
        date_of_death: date_of_death.date(),
    };

    errors.finish(draft, submission)
}

// ---------------------------------------------------------------------------
// Work
// ---------------------------------------------------------------------------

/// Work form; also the canonical draft since every field stays textual
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkForm {
    pub title: String,
    pub creator: String,
    pub summary: String,
    pub isbn: String,
    pub tags: Vec<String>,
}

impl From<&Work> for WorkForm {
    fn from(work: &Work) -> Self {
        Self {
            title: unescape(&work.title),
            creator: unescape(&work.creator),
            summary: unescape(&work.summary),
            isbn: unescape(&work.isbn),
            tags: work.tags.iter().map(|tag| unescape(tag)).collect(),
        }
    }
}

impl WorkForm {
    /// Repeated tag selections collapse to one reference each; blank ones
    /// reference nothing and are dropped.
    pub fn into_work(self, id: Id) -> Work {
        Work {
            id,
            title: self.title,
            creator: self.creator,
            summary: self.summary,
            isbn: self.isbn,
            tags: self
                .tags
                .into_iter()
                .filter(|tag| !tag.is_empty())
                .unique()
                .collect(),
        }
    }
}

pub fn validate_work(form: &RawForm) -> Result<WorkForm, FormRejection<WorkForm>> {
    let title = Field::text(form, "title").required("Title must not be empty.");
    let creator = Field::text(form, "creator").required("Creator must not be empty.");
    let summary = Field::text(form, "summary").required("Summary must not be empty.");
    let isbn = Field::text(form, "isbn").required("ISBN must not be empty.");

    let mut errors = Errors::default();
    for field in [&title, &creator, &summary, &isbn] {
        errors.record(field);
    }

    let work = WorkForm {
        title: title.escaped(),
        creator: creator.escaped(),
        summary: summary.escaped(),
        isbn: isbn.escaped(),
        tags: normalize_list(form, "tags"),
    };

    errors.finish(work.clone(), work)
}

/// Multi-select values: always a list, each element escaped, empties allowed
pub fn normalize_list(form: &RawForm, name: &str) -> Vec<String> {
    form.list(name).iter().map(|v| escape(v.trim())).collect()
}

// ---------------------------------------------------------------------------
// Tag
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagForm {
    pub name: String,
}

impl From<&Tag> for TagForm {
    fn from(tag: &Tag) -> Self {
        Self {
            name: unescape(&tag.name),
        }
    }
}

pub fn validate_tag(form: &RawForm) -> Result<TagForm, FormRejection<TagForm>> {
    let name = Field::text(form, "name").required("Tag name required");

    let mut errors = Errors::default();
    errors.record(&name);

    let tag = TagForm {
        name: name.escaped(),
    };
    errors.finish(tag.clone(), tag)
}

// ---------------------------------------------------------------------------
// Copy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CopyForm {
    pub work: String,
    pub imprint: String,
    pub status: String,
    pub due_back: String,
}

impl From<&PhysicalCopy> for CopyForm {
    fn from(copy: &PhysicalCopy) -> Self {
        Self {
            work: unescape(&copy.work),
            imprint: unescape(&copy.imprint),
            status: copy.status.to_string(),
            due_back: format_date(copy.due_back),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CopyDraft {
    pub work: String,
    pub imprint: String,
    /// Not checked against the enumeration here; see [`CopyDraft::into_copy`]
    pub status: String,
    pub due_back: Option<NaiveDate>,
}

impl CopyDraft {
    /// Types the status. Empty means the default status.
    pub fn into_copy(self, id: Id) -> Result<PhysicalCopy, CatalogError> {
        let status = if self.status.is_empty() {
            CopyStatus::default()
        } else {
            self.status
                .parse::<CopyStatus>()
                .map_err(|message| CatalogError::InvalidRecord {
                    kind: EntityKind::Copy,
                    message,
                })?
        };

        Ok(PhysicalCopy {
            id,
            work: self.work,
            imprint: self.imprint,
            status,
            due_back: self.due_back,
        })
    }
}

impl From<&CopyDraft> for CopyForm {
    fn from(draft: &CopyDraft) -> Self {
        Self {
            work: draft.work.clone(),
            imprint: draft.imprint.clone(),
            status: draft.status.clone(),
            due_back: format_date(draft.due_back),
        }
    }
}

pub fn validate_copy(form: &RawForm) -> Result<CopyDraft, FormRejection<CopyForm>> {
    let work = Field::text(form, "work").required("Work must be specified");
    let imprint = Field::text(form, "imprint").required("Imprint must be specified");
    let due_back = Field::text(form, "due_back").optional_date("Invalid date");
    let status = Field::text(form, "status");

    let mut errors = Errors::default();
    for field in [&work, &imprint, &due_back] {
        errors.record(field);
    }

    let submission = CopyForm {
        work: work.escaped(),
        imprint: imprint.escaped(),
        status: status.escaped(),
        due_back: due_back.raw(),
    };
    let draft = CopyDraft {
        work: work.escaped(),
        imprint: imprint.escaped(),
        status: status.escaped(),
        due_back: due_back.date(),
    };

    errors.finish(draft, submission)
}
