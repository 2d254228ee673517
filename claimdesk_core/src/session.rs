use thiserror::Error;

use crate::{
    dispatch::{TaskIntent, Workflow, dispatch_message, dispatch_task},
    message::Message,
};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("a workflow is already open in this session")]
    AlreadyOpen,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    Open,
    Completed,
    Cancelled,
}

/// Proof that a send was started while a particular workflow was open. Settling with a
/// ticket from an earlier opening is ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SendTicket {
    generation: u64,
}

/// Lifecycle of one opened message or task: `Closed -> Open -> {Completed | Cancelled} -> Closed`.
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    workflow: Option<Workflow>,
    generation: u64,
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: SessionState::Closed,
            workflow: None,
            generation: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn workflow(&self) -> Option<&Workflow> {
        self.workflow.as_ref()
    }

    /// Opens the workflow the message dispatches to. Returns `false` and stays closed when
    /// there is nothing to render.
    pub fn open_message(&mut self, message: &Message) -> Result<bool, SessionError> {
        self.open_dispatched(dispatch_message(message))
    }

    pub fn open_task(&mut self, intent: &TaskIntent) -> Result<bool, SessionError> {
        self.open_dispatched(dispatch_task(intent))
    }

    fn open_dispatched(&mut self, workflow: Option<Workflow>) -> Result<bool, SessionError> {
        match workflow {
            Some(workflow) => self.open(workflow).map(|_| true),
            None => Ok(false),
        }
    }

    pub fn open(&mut self, workflow: Workflow) -> Result<SendTicket, SessionError> {
        if self.state != SessionState::Closed {
            return Err(SessionError::AlreadyOpen);
        }

        self.state = SessionState::Open;
        self.workflow = Some(workflow);

        Ok(SendTicket {
            generation: self.generation,
        })
    }

    pub fn ticket(&self) -> Option<SendTicket> {
        match self.state {
            SessionState::Open => Some(SendTicket {
                generation: self.generation,
            }),
            _ => None,
        }
    }

    pub fn is_current(&self, ticket: SendTicket) -> bool {
        self.state == SessionState::Open && ticket.generation == self.generation
    }

    /// Marks the open workflow as completed. Only the first call for the current opening
    /// has an effect; later or stale calls return `false`.
    pub fn finish(&mut self, ticket: SendTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }

        self.state = SessionState::Completed;
        true
    }

    pub fn cancel(&mut self) -> bool {
        if self.state != SessionState::Open {
            return false;
        }

        self.state = SessionState::Cancelled;
        true
    }

    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }

        self.cancel();
        self.state = SessionState::Closed;
        self.workflow = None;
        self.generation += 1;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
