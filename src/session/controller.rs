//! Owns the generation session and drives its request lifecycle.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::access::AccessCredential;
use crate::generator::models::{GenerationRequest, SqlResult, server_message};
use crate::generator::{GeneratorError, RemoteGenerator};
use crate::i18n::{self, TextKey};
use crate::session::clipboard::{Clipboard, CopyFlag};
use crate::session::state::{FieldEdit, Session, Status};
use crate::session::transition::{Effect, Event, Outcome};

/// The host's blocking prompt and notice surface.
#[async_trait]
pub trait Prompter: Send {
    async fn confirm(&mut self, message: &str) -> bool;
    fn notify(&mut self, message: &str);
}

/// Result of a finished request, delivered back to the controller by the
/// task that ran it.
#[derive(Debug)]
pub struct Resolution {
    pub request_id: u64,
    pub result: Result<SqlResult, GeneratorError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateOutcome {
    Started { request_id: u64 },
    Rejected(TextKey),
    Declined,
}

struct InFlight {
    id: u64,
    cancel: CancellationToken,
}

pub struct GenerationController {
    session: Session,
    generator: Arc<dyn RemoteGenerator>,
    credential: AccessCredential,
    clipboard: Box<dyn Clipboard>,
    copied: CopyFlag,
    resolutions: mpsc::UnboundedSender<Resolution>,
    in_flight: Option<InFlight>,
    next_request_id: u64,
}

impl GenerationController {
    /// Requires a resolved credential; there is no way to build a controller
    /// without one. Resolutions arrive on the returned receiver and must be
    /// fed back through [`GenerationController::resolve`].
    pub fn new(
        session: Session,
        credential: AccessCredential,
        generator: Arc<dyn RemoteGenerator>,
        clipboard: Box<dyn Clipboard>,
    ) -> (Self, mpsc::UnboundedReceiver<Resolution>) {
        let (resolutions, receiver) = mpsc::unbounded_channel();
        let controller = Self {
            session,
            generator,
            credential,
            clipboard,
            copied: CopyFlag::default(),
            resolutions,
            in_flight: None,
            next_request_id: 1,
        };
        (controller, receiver)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn status(&self) -> Status {
        self.session.status
    }

    pub fn can_clear(&self) -> bool {
        !self.session.status.is_loading() && self.session.has_clearable_content()
    }

    pub fn is_copied(&self) -> bool {
        self.copied.is_active()
    }

    pub fn text(&self, key: TextKey) -> &'static str {
        i18n::text(self.session.language, key)
    }

    fn apply(&mut self, event: Event) -> Effect {
        let transition = self.session.apply(event);
        if transition.session.status != self.session.status {
            debug!(
                "Session status {:?} -> {:?}",
                self.session.status, transition.session.status
            );
        }
        self.session = transition.session;
        transition.effect
    }

    pub fn edit_field(&mut self, edit: FieldEdit) {
        self.apply(Event::Edit(edit));
    }

    /// Returns false when there was nothing to clear.
    pub fn clear_all(&mut self) -> bool {
        if !self.can_clear() {
            return false;
        }
        self.apply(Event::ClearAll);
        true
    }

    pub async fn generate<P>(&mut self, prompter: &mut P) -> GenerateOutcome
    where
        P: Prompter + ?Sized,
    {
        let mut confirmed = false;
        loop {
            match self.apply(Event::Generate { confirmed }) {
                Effect::Submit(request) => {
                    let request_id = self.spawn_request(request);
                    return GenerateOutcome::Started { request_id };
                }
                Effect::Confirm => {
                    if prompter.confirm(self.text(TextKey::ConfirmWrite)).await {
                        confirmed = true;
                    } else {
                        info!("Write-mode generation declined");
                        return GenerateOutcome::Declined;
                    }
                }
                Effect::Notice(key) => {
                    prompter.notify(self.text(key));
                    return GenerateOutcome::Rejected(key);
                }
                Effect::None | Effect::Cancel => {
                    return GenerateOutcome::Rejected(TextKey::AlreadyGenerating);
                }
            }
        }
    }

    fn spawn_request(&mut self, request: GenerationRequest) -> u64 {
        let id = self.next_request_id;
        self.next_request_id += 1;

        let cancel = CancellationToken::new();
        self.in_flight = Some(InFlight {
            id,
            cancel: cancel.clone(),
        });

        let generator = Arc::clone(&self.generator);
        let credential = self.credential.clone();
        let resolutions = self.resolutions.clone();

        info!("Starting SQL generation request {}", id);
        tokio::spawn(async move {
            let result = generator.submit(&request, &credential, cancel).await;
            if resolutions.send(Resolution { request_id: id, result }).is_err() {
                debug!("Controller dropped before request {} resolved", id);
            }
        });

        id
    }

    /// Cancels the in-flight request. Returns false when nothing was loading.
    pub fn stop(&mut self) -> bool {
        match self.apply(Event::Stop) {
            Effect::Cancel => {
                if let Some(in_flight) = &self.in_flight {
                    info!("Cancelling SQL generation request {}", in_flight.id);
                    in_flight.cancel.cancel();
                }
                true
            }
            _ => false,
        }
    }

    pub fn resolve(&mut self, resolution: Resolution) {
        let cancelled = match &self.in_flight {
            Some(in_flight) if in_flight.id == resolution.request_id => {
                in_flight.cancel.is_cancelled()
            }
            _ => {
                debug!("Discarding stale resolution for request {}", resolution.request_id);
                return;
            }
        };
        self.in_flight = None;

        // A stop() always wins, whatever the transport produced meanwhile.
        let outcome = if cancelled {
            Outcome::Aborted
        } else {
            match resolution.result {
                Ok(result) => Outcome::Sql(result.sql),
                Err(GeneratorError::Cancelled) => Outcome::Aborted,
                Err(GeneratorError::Server { status, body }) => {
                    warn!("SQL generation rejected with status {}", status);
                    Outcome::Server {
                        message: server_message(&body),
                    }
                }
                Err(err) => {
                    warn!("SQL generation failed: {}", err);
                    Outcome::Network
                }
            }
        };

        self.apply(Event::Resolved(outcome));
        info!(
            "SQL generation request {} finished as {:?}",
            resolution.request_id, self.session.status
        );
    }

    /// Copies the output to the clipboard. Best effort.
    pub fn copy_output(&mut self) -> bool {
        match self.clipboard.set_text(&self.session.output) {
            Ok(()) => {
                self.copied.mark();
                true
            }
            Err(err) => {
                warn!("Copy to clipboard failed: {}", err);
                self.copied.clear();
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
