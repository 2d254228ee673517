use crate::{claim::Address, message::MessageBodyType};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkflowEvent {
    Sent(Address, MessageBodyType),
    SendFailed(Address, String),
    ContactNotResolved(Address),
    NothingToSend,
}

pub trait HandleEvent {
    fn handle_event(&mut self, event: WorkflowEvent);
}

/// Handler for callers that only want the `tracing` output.
#[derive(Clone, Copy, Debug, Default)]
pub struct IgnoreEvents;

impl HandleEvent for IgnoreEvents {
    fn handle_event(&mut self, _: WorkflowEvent) {}
}
