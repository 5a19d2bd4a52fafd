//! Pure transition function for the generation session.
//!
//! `Session::apply` never performs I/O. It returns the next session together
//! with the single side effect the controller has to carry out.

use tracing::debug;

use crate::generator::models::GenerationRequest;
use crate::i18n::{self, TextKey};
use crate::session::state::{FieldEdit, Session, Status};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Edit(FieldEdit),
    ClearAll,
    /// `confirmed` is set once the user has accepted the write-mode prompt.
    Generate { confirmed: bool },
    Stop,
    Resolved(Outcome),
}

/// How an in-flight request ended, as seen by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Sql(String),
    /// Non-2xx response. `message` is the best text the body offered.
    Server { message: Option<String> },
    Network,
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    Notice(TextKey),
    Confirm,
    Submit(GenerationRequest),
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub session: Session,
    pub effect: Effect,
}

impl Transition {
    fn unchanged(session: &Session) -> Self {
        Self::with(session.clone(), Effect::None)
    }

    fn with(session: Session, effect: Effect) -> Self {
        Self { session, effect }
    }
}

impl Session {
    pub fn apply(&self, event: Event) -> Transition {
        match event {
            Event::Edit(edit) => self.edit(edit),
            Event::ClearAll => self.clear_all(),
            Event::Generate { confirmed } => self.generate(confirmed),
            Event::Stop => self.stop(),
            Event::Resolved(outcome) => self.resolve(outcome),
        }
    }

    fn edit(&self, edit: FieldEdit) -> Transition {
        let mut next = self.clone();
        match edit {
            FieldEdit::Language(language) => next.language = language,
            FieldEdit::Database(database) => next.database = database,
            FieldEdit::SqlMode(mode) => {
                if next.sql_mode.is_some() {
                    next.sql_mode = Some(mode);
                } else {
                    debug!("Ignoring sql mode edit; modes are disabled");
                }
            }
            FieldEdit::Schema(schema) => next.schema = schema,
            FieldEdit::Criteria(criteria) => next.criteria = criteria,
        }
        Transition::with(next, Effect::None)
    }

    fn clear_all(&self) -> Transition {
        if self.status.is_loading() || !self.has_clearable_content() {
            return Transition::unchanged(self);
        }

        let mut next = self.clone();
        next.schema.clear();
        next.criteria.clear();
        next.output.clear();
        Transition::with(next, Effect::None)
    }

    fn generate(&self, confirmed: bool) -> Transition {
        if self.status.is_loading() {
            return Transition::with(self.clone(), Effect::Notice(TextKey::AlreadyGenerating));
        }
        if !self.has_required_fields() {
            return Transition::with(self.clone(), Effect::Notice(TextKey::RequiredFields));
        }
        if self.requires_confirmation() && !confirmed {
            return Transition::with(self.clone(), Effect::Confirm);
        }

        let request = GenerationRequest::snapshot(self);
        let mut next = self.clone();
        next.status = Status::Loading;
        Transition::with(next, Effect::Submit(request))
    }

    fn stop(&self) -> Transition {
        if !self.status.is_loading() {
            return Transition::unchanged(self);
        }

        let mut next = self.clone();
        next.status = Status::Aborted;
        Transition::with(next, Effect::Cancel)
    }

    fn resolve(&self, outcome: Outcome) -> Transition {
        // Anything arriving after stop() has already been settled as aborted.
        if !self.status.is_loading() {
            return Transition::unchanged(self);
        }

        let mut next = self.clone();
        match outcome {
            Outcome::Sql(sql) => {
                next.output = sql;
                next.status = Status::Success;
            }
            Outcome::Server { message } => {
                next.output = message.unwrap_or_else(|| self.generic_failure());
                next.status = Status::ServerError;
            }
            Outcome::Network => {
                next.output = self.generic_failure();
                next.status = Status::NetworkError;
            }
            Outcome::Aborted => next.status = Status::Aborted,
        }
        Transition::with(next, Effect::None)
    }

    fn generic_failure(&self) -> String {
        i18n::text(self.language, TextKey::GenerationFailed).to_string()
    }
}
