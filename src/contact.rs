//! Contact form state machine.
//!
//! There is no backend. Submission is simulated: after field validation
//! passes, the form waits a fixed delay and then always succeeds.
//!
//! ```text
//!            submit() [valid]          complete()
//!  Editing ─────────────────> Submitting ─────────> Submitted
//!     ^  │ submit() [invalid]                           │
//!     │  └──> Editing (errors recorded)                 │
//!     └──────────────────── send_another() ─────────────┘
//! ```
//!
//! The generated contact page ships the same rules as a script; this type
//! is the reference for both and renders the page's initial state.

use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;
use std::thread;
use std::time::Duration;
use thiserror::Error;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern compiles"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    Name,
    Email,
    Message,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Name, Field::Email, Field::Message];

    /// Form control name and id.
    pub fn name(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Message => "message",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Email => "Email",
            Field::Message => "Message",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStatus {
    Editing,
    Submitting,
    Submitted,
}

/// A rejected transition. The form is left unchanged.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("cannot {action} while {from:?}")]
pub struct InvalidTransition {
    pub from: FormStatus,
    pub action: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
    status: FormStatus,
    errors: BTreeMap<Field, &'static str>,
}

impl Default for ContactForm {
    fn default() -> Self {
        Self::new()
    }
}

impl ContactForm {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            message: String::new(),
            status: FormStatus::Editing,
            errors: BTreeMap::new(),
        }
    }

    pub fn status(&self) -> FormStatus {
        self.status
    }

    pub fn errors(&self) -> &BTreeMap<Field, &'static str> {
        &self.errors
    }

    pub fn error(&self, field: Field) -> Option<&'static str> {
        self.errors.get(&field).copied()
    }

    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Message => &self.message,
        }
    }

    /// Update a field and clear its error. Only allowed while editing.
    pub fn edit(&mut self, field: Field, value: &str) -> Result<(), InvalidTransition> {
        self.expect_status(FormStatus::Editing, "edit")?;
        let slot = match field {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::Message => &mut self.message,
        };
        *slot = value.to_string();
        self.errors.remove(&field);
        Ok(())
    }

    /// Per-field error messages for the current values. Empty means valid.
    pub fn validate(&self) -> BTreeMap<Field, &'static str> {
        let mut errors = BTreeMap::new();
        if self.name.trim().is_empty() {
            errors.insert(Field::Name, "Name is required");
        }
        if self.email.trim().is_empty() {
            errors.insert(Field::Email, "Email is required");
        } else if !EMAIL_PATTERN.is_match(&self.email) {
            errors.insert(Field::Email, "Please enter a valid email address");
        }
        if self.message.trim().is_empty() {
            errors.insert(Field::Message, "Message is required");
        }
        errors
    }

    /// Start a submission. Returns `Ok(false)` and records the errors when
    /// validation fails; the form stays editable.
    pub fn submit(&mut self) -> Result<bool, InvalidTransition> {
        self.expect_status(FormStatus::Editing, "submit")?;
        self.errors = self.validate();
        if !self.errors.is_empty() {
            return Ok(false);
        }
        self.status = FormStatus::Submitting;
        Ok(true)
    }

    /// Finish a submission: clear every field and error.
    pub fn complete(&mut self) -> Result<(), InvalidTransition> {
        self.expect_status(FormStatus::Submitting, "complete")?;
        self.name.clear();
        self.email.clear();
        self.message.clear();
        self.errors.clear();
        self.status = FormStatus::Submitted;
        Ok(())
    }

    pub fn send_another(&mut self) -> Result<(), InvalidTransition> {
        self.expect_status(FormStatus::Submitted, "send another")?;
        self.status = FormStatus::Editing;
        Ok(())
    }

    fn expect_status(&self, want: FormStatus, action: &'static str) -> Result<(), InvalidTransition> {
        if self.status == want {
            Ok(())
        } else {
            Err(InvalidTransition {
                from: self.status,
                action,
            })
        }
    }
}

/// Submit, wait `delay`, complete. Returns whether the form was sent.
pub fn simulate_submission(
    form: &mut ContactForm,
    delay: Duration,
) -> Result<bool, InvalidTransition> {
    if !form.submit()? {
        return Ok(false);
    }
    thread::sleep(delay);
    form.complete()?;
    Ok(true)
}
