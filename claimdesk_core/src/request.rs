use thiserror::Error;
use tracing::{error, info};

use crate::{
    claim::{Address, CTypeHash, PartialClaim},
    collaborator::{ContactStore, Transport},
    event::{HandleEvent, WorkflowEvent},
    message::MessageBody,
};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RequestError {
    #[error("no receivers given")]
    NoReceivers,
    #[error("no ctypes given")]
    NoCTypes,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestOutcome {
    pub delivered: Vec<Address>,
    pub failed: Vec<(Address, String)>,
}

impl RequestOutcome {
    pub fn all_delivered(&self) -> bool {
        self.failed.is_empty()
    }
}

pub async fn request_claims_for_ctypes<T, C, H>(
    transport: &T,
    contacts: &C,
    events: &mut H,
    ctype_hashes: Vec<CTypeHash>,
    receivers: &[Address],
) -> Result<RequestOutcome, RequestError>
where
    T: Transport,
    C: ContactStore,
    H: HandleEvent,
{
    if ctype_hashes.is_empty() {
        return Err(RequestError::NoCTypes);
    }

    let body = MessageBody::RequestClaimsForCTypes(ctype_hashes);
    send_to_receivers(transport, contacts, events, &body, receivers).await
}

pub async fn request_terms<T, C, H>(
    transport: &T,
    contacts: &C,
    events: &mut H,
    ctype_hash: CTypeHash,
    receivers: &[Address],
) -> Result<RequestOutcome, RequestError>
where
    T: Transport,
    C: ContactStore,
    H: HandleEvent,
{
    let body = MessageBody::RequestTerms(PartialClaim {
        ctype_hash,
        contents: None,
        owner: None,
    });
    send_to_receivers(transport, contacts, events, &body, receivers).await
}

/// Sends `body` to every receiver in turn. A receiver that cannot be resolved or reached is
/// recorded as failed without stopping the others.
pub async fn send_to_receivers<T, C, H>(
    transport: &T,
    contacts: &C,
    events: &mut H,
    body: &MessageBody,
    receivers: &[Address],
) -> Result<RequestOutcome, RequestError>
where
    T: Transport,
    C: ContactStore,
    H: HandleEvent,
{
    if receivers.is_empty() {
        return Err(RequestError::NoReceivers);
    }

    let mut outcome = RequestOutcome::default();

    for receiver in receivers {
        let contact = match contacts.find_by_address(receiver).await {
            Ok(Some(contact)) => contact,
            Ok(None) => {
                error!(origin = "request", receiver = %receiver, "contact not found");
                events.handle_event(WorkflowEvent::ContactNotResolved(receiver.clone()));
                outcome
                    .failed
                    .push((receiver.clone(), "contact not found".to_owned()));
                continue;
            }
            Err(err) => {
                error!(
                    origin = "request",
                    receiver = %receiver,
                    error = %err,
                    "cannot look up contact"
                );
                events.handle_event(WorkflowEvent::ContactNotResolved(receiver.clone()));
                outcome.failed.push((receiver.clone(), err.to_string()));
                continue;
            }
        };

        match transport.send(&contact, body).await {
            Ok(()) => {
                info!(receiver = %receiver, body_type = %body.body_type(), "request sent");
                events.handle_event(WorkflowEvent::Sent(receiver.clone(), body.body_type()));
                outcome.delivered.push(receiver.clone());
            }
            Err(err) => {
                error!(
                    origin = "request",
                    receiver = %receiver,
                    error = %err,
                    "cannot send request"
                );
                events.handle_event(WorkflowEvent::SendFailed(receiver.clone(), err.to_string()));
                outcome.failed.push((receiver.clone(), err.to_string()));
            }
        }
    }

    Ok(outcome)
}
