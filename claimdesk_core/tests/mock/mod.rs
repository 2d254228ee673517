use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use claimdesk_core::{
    claim::{Address, CTypeHash, CTypeWithMetadata, Contact},
    collaborator::{CTypeStore, ContactStore, Transport},
    event::{HandleEvent, WorkflowEvent},
    message::{Message, MessageBody},
};
use parking_lot::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MockError {
    #[error("mock backend is offline")]
    Offline,
}

#[derive(Clone, Default)]
pub struct MockTransport {
    pub sent: Arc<Mutex<Vec<(Contact, MessageBody)>>>,
    pub stored: Arc<Mutex<Vec<Message>>>,
    pub offline: Arc<AtomicBool>,
    pub hanging: Arc<AtomicBool>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn set_hanging(&self, hanging: bool) {
        self.hanging.store(hanging, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<(Contact, MessageBody)> {
        self.sent.lock().clone()
    }

    fn check_online(&self) -> Result<(), MockError> {
        match self.offline.load(Ordering::SeqCst) {
            true => Err(MockError::Offline),
            false => Ok(()),
        }
    }
}

impl Transport for MockTransport {
    type Error = MockError;

    async fn send(&self, receiver: &Contact, body: &MessageBody) -> Result<(), MockError> {
        self.check_online()?;
        if self.hanging.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.sent.lock().push((receiver.clone(), body.clone()));
        Ok(())
    }

    async fn find_by_my_identity(&self, address: &Address) -> Result<Vec<Message>, MockError> {
        self.check_online()?;
        Ok(self
            .stored
            .lock()
            .iter()
            .filter(|message| &message.receiver_address == address)
            .cloned()
            .collect())
    }

    async fn delete_by_message_id(&self, message_id: &str) -> Result<(), MockError> {
        self.check_online()?;
        self.stored
            .lock()
            .retain(|message| message.message_id.as_deref() != Some(message_id));
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MockContacts {
    pub contacts: Vec<Contact>,
}

impl MockContacts {
    pub fn with(names: &[&str]) -> Self {
        Self {
            contacts: names
                .iter()
                .map(|name| Contact {
                    address: Address::new(*name),
                    name: name.to_uppercase(),
                    box_public_key: None,
                })
                .collect(),
        }
    }
}

impl ContactStore for MockContacts {
    type Error = MockError;

    async fn find_all(&self) -> Result<Vec<Contact>, MockError> {
        Ok(self.contacts.clone())
    }

    async fn find_by_address(&self, address: &Address) -> Result<Option<Contact>, MockError> {
        Ok(self
            .contacts
            .iter()
            .find(|contact| &contact.address == address)
            .cloned())
    }
}

#[derive(Clone, Default)]
pub struct MockCTypes {
    pub ctypes: Vec<CTypeWithMetadata>,
}

impl MockCTypes {
    pub fn with(hashes: &[&str]) -> Self {
        Self {
            ctypes: hashes
                .iter()
                .map(|hash| CTypeWithMetadata {
                    ctype_hash: CTypeHash::new(*hash),
                    owner: None,
                    title: format!("CType {hash}"),
                    properties: vec![],
                })
                .collect(),
        }
    }
}

impl CTypeStore for MockCTypes {
    type Error = MockError;

    async fn find_by_hash(&self, hash: &CTypeHash) -> Result<Option<CTypeWithMetadata>, MockError> {
        Ok(self
            .ctypes
            .iter()
            .find(|ctype| &ctype.ctype_hash == hash)
            .cloned())
    }
}

#[derive(Default)]
pub struct RecordedEvents {
    pub events: Vec<WorkflowEvent>,
}

impl HandleEvent for RecordedEvents {
    fn handle_event(&mut self, event: WorkflowEvent) {
        self.events.push(event);
    }
}
