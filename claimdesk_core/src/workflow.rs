use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    claim::{Address, CTypeHash, CTypeWithMetadata, ClaimEntry, Contact, PartialClaim},
    collaborator::{CTypeStore, ContactStore, Transport},
    event::{HandleEvent, WorkflowEvent},
    message::{Legitimations, MessageBody},
    presentation::CreatePresentation,
    selection::{CTypeFilter, ClaimSelector},
};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("there are no claims relevant to this workflow")]
    NoRelevantClaims,
    #[error("workflow has not been started")]
    NotStarted,
    #[error("a send is already in progress")]
    AlreadySending,
    #[error("workflow has already been sent")]
    AlreadySent,
    #[error("no contact with address {0}")]
    ContactNotFound(Address),
    #[error("cannot look up contact: {0}")]
    ContactLookup(String),
    #[error("cannot create presentation: {0}")]
    Presentation(String),
    #[error("cannot send message: {0}")]
    Transport(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum DisclosureContext {
    Default,
    /// The selected attestations vouch for `claim`, which is about to be attested.
    Legitimation { claim: PartialClaim },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkflowState {
    NoRelevantClaims,
    NotStarted,
    WorkflowStarted,
    Sending,
    Sent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    NothingToSend,
}

pub struct Collaborators<T, C, P, H> {
    pub transport: T,
    pub contacts: C,
    pub presenter: P,
    pub events: H,
}

pub struct SubmitClaimsWorkflow<T, C, P, H> {
    selector: ClaimSelector,
    ctypes: Vec<CTypeWithMetadata>,
    receiver: Address,
    context: DisclosureContext,
    state: WorkflowState,
    collaborators: Collaborators<T, C, P, H>,
    on_finished: Option<Box<dyn FnOnce() + Send>>,
}

impl<T, C, P, H> SubmitClaimsWorkflow<T, C, P, H>
where
    T: Transport,
    C: ContactStore,
    P: CreatePresentation,
    H: HandleEvent,
{
    /// Prepares the workflow over `entries`. CTypes in `ctype_hashes` that the store cannot
    /// resolve are dropped from the filter; if none resolve, the workflow has no relevant claims.
    pub async fn mount<S: CTypeStore>(
        entries: &[ClaimEntry],
        ctype_hashes: Vec<CTypeHash>,
        receiver: Address,
        context: DisclosureContext,
        ctype_store: &S,
        collaborators: Collaborators<T, C, P, H>,
    ) -> Self {
        let mut ctypes = vec![];
        let filter = if ctype_hashes.is_empty() {
            CTypeFilter::Any
        } else {
            let mut resolved = vec![];
            for hash in ctype_hashes {
                match ctype_store.find_by_hash(&hash).await {
                    Ok(Some(ctype)) => {
                        resolved.push(hash);
                        ctypes.push(ctype);
                    }
                    Ok(None) => warn!(ctype = %hash, "ctype not found, skipping its claims"),
                    Err(error) => warn!(
                        ctype = %hash,
                        error = %error,
                        "cannot load ctype, skipping its claims"
                    ),
                }
            }
            CTypeFilter::Only(resolved)
        };

        Self::new(entries, filter, ctypes, receiver, context, collaborators)
    }

    pub fn new(
        entries: &[ClaimEntry],
        filter: CTypeFilter,
        ctypes: Vec<CTypeWithMetadata>,
        receiver: Address,
        context: DisclosureContext,
        collaborators: Collaborators<T, C, P, H>,
    ) -> Self {
        let selector = ClaimSelector::new(entries, filter);
        let state = if selector.has_relevant_claims() {
            WorkflowState::NotStarted
        } else {
            WorkflowState::NoRelevantClaims
        };

        Self {
            selector,
            ctypes,
            receiver,
            context,
            state,
            collaborators,
            on_finished: None,
        }
    }

    pub fn on_finished<F>(mut self, on_finished: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.on_finished = Some(Box::new(on_finished));
        self
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn context(&self) -> &DisclosureContext {
        &self.context
    }

    pub fn receiver(&self) -> &Address {
        &self.receiver
    }

    pub fn ctypes(&self) -> &[CTypeWithMetadata] {
        &self.ctypes
    }

    pub fn selector(&self) -> &ClaimSelector {
        &self.selector
    }

    pub fn selector_mut(&mut self) -> Option<&mut ClaimSelector> {
        match self.state {
            WorkflowState::WorkflowStarted => Some(&mut self.selector),
            _ => None,
        }
    }

    pub fn events(&self) -> &H {
        &self.collaborators.events
    }

    pub fn title(&self) -> &'static str {
        match self.context {
            DisclosureContext::Default => "Select claims to send",
            DisclosureContext::Legitimation { .. } => "Select legitimations to send",
        }
    }

    pub fn start(&mut self) -> Result<(), WorkflowError> {
        match self.state {
            WorkflowState::NotStarted => {
                self.state = WorkflowState::WorkflowStarted;
                Ok(())
            }
            WorkflowState::WorkflowStarted => Ok(()),
            WorkflowState::NoRelevantClaims => Err(WorkflowError::NoRelevantClaims),
            WorkflowState::Sending => Err(WorkflowError::AlreadySending),
            WorkflowState::Sent => Err(WorkflowError::AlreadySent),
        }
    }

    pub fn can_send(&self) -> bool {
        self.state == WorkflowState::WorkflowStarted && !self.selector.contributions().is_empty()
    }

    /// Sends the current selection. On failure the selection is left untouched and the
    /// workflow returns to the started state so the user can retry.
    pub async fn send(&mut self) -> Result<SendOutcome, WorkflowError> {
        match self.state {
            WorkflowState::WorkflowStarted => {}
            WorkflowState::Sending => return Err(WorkflowError::AlreadySending),
            WorkflowState::Sent => return Err(WorkflowError::AlreadySent),
            WorkflowState::NotStarted => return Err(WorkflowError::NotStarted),
            WorkflowState::NoRelevantClaims => return Err(WorkflowError::NoRelevantClaims),
        }

        if self.selector.contributions().is_empty() {
            self.collaborators
                .events
                .handle_event(WorkflowEvent::NothingToSend);
            return Ok(SendOutcome::NothingToSend);
        }

        let result = {
            let mut sending = SendingGuard::enter(&mut self.state);
            let result = deliver(
                &self.selector,
                &self.context,
                &self.receiver,
                &self.collaborators,
            )
            .await;
            if result.is_ok() {
                sending.settle(WorkflowState::Sent);
            }
            result
        };

        match result {
            Ok(body) => {
                info!(
                    receiver = %self.receiver,
                    body_type = %body.body_type(),
                    claims = self.selector.contributions().len(),
                    "claims sent"
                );
                self.collaborators
                    .events
                    .handle_event(WorkflowEvent::Sent(self.receiver.clone(), body.body_type()));
                if let Some(on_finished) = self.on_finished.take() {
                    on_finished();
                }
                Ok(SendOutcome::Sent)
            }
            Err(err) => {
                error!(
                    origin = "submit claims",
                    receiver = %self.receiver,
                    error = %err,
                    "cannot send claims"
                );
                let event = match &err {
                    WorkflowError::ContactNotFound(_) | WorkflowError::ContactLookup(_) => {
                        WorkflowEvent::ContactNotResolved(self.receiver.clone())
                    }
                    other => WorkflowEvent::SendFailed(self.receiver.clone(), other.to_string()),
                };
                self.collaborators.events.handle_event(event);
                Err(err)
            }
        }
    }
}

/// Holds the workflow in `Sending` while a delivery is in flight. Unless settled, the state
/// goes back to `WorkflowStarted` when dropped, including when the send future is dropped.
struct SendingGuard<'a> {
    state: &'a mut WorkflowState,
    settled: Option<WorkflowState>,
}

impl<'a> SendingGuard<'a> {
    fn enter(state: &'a mut WorkflowState) -> Self {
        *state = WorkflowState::Sending;
        Self {
            state,
            settled: None,
        }
    }

    fn settle(&mut self, state: WorkflowState) {
        self.settled = Some(state);
    }
}

impl Drop for SendingGuard<'_> {
    fn drop(&mut self) {
        *self.state = self.settled.unwrap_or(WorkflowState::WorkflowStarted);
    }
}

async fn deliver<T, C, P, H>(
    selector: &ClaimSelector,
    context: &DisclosureContext,
    receiver: &Address,
    collaborators: &Collaborators<T, C, P, H>,
) -> Result<MessageBody, WorkflowError>
where
    T: Transport,
    C: ContactStore,
    P: CreatePresentation,
{
    let contact = resolve_receiver(&collaborators.contacts, receiver).await?;

    let presentations = selector
        .build_disclosure(&collaborators.presenter)
        .map_err(|e| WorkflowError::Presentation(e.to_string()))?;

    let body = match context {
        DisclosureContext::Default => MessageBody::SubmitClaimsForCTypes(presentations),
        DisclosureContext::Legitimation { claim } => {
            MessageBody::SubmitLegitimations(Legitimations {
                claim: claim.clone(),
                legitimations: presentations,
            })
        }
    };

    collaborators
        .transport
        .send(&contact, &body)
        .await
        .map_err(|e| WorkflowError::Transport(e.to_string()))?;

    Ok(body)
}

async fn resolve_receiver<C: ContactStore>(
    contacts: &C,
    receiver: &Address,
) -> Result<Contact, WorkflowError> {
    contacts
        .find_by_address(receiver)
        .await
        .map_err(|e| WorkflowError::ContactLookup(e.to_string()))?
        .ok_or_else(|| WorkflowError::ContactNotFound(receiver.clone()))
}
