use std::cmp::Reverse;

use crate::{
    claim::Address,
    collaborator::Transport,
    dispatch::{Workflow, dispatch_message, is_json_displayable},
    message::Message,
};

#[derive(Clone, Debug, PartialEq)]
pub struct InboxItem {
    pub message: Message,
    pub workflow: Option<Workflow>,
    pub json_displayable: bool,
}

impl From<Message> for InboxItem {
    fn from(message: Message) -> Self {
        Self {
            workflow: dispatch_message(&message),
            json_displayable: is_json_displayable(&message),
            message,
        }
    }
}

pub struct Inbox<T: Transport> {
    transport: T,
    identity: Address,
}

impl<T: Transport> Inbox<T> {
    pub fn new(transport: T, identity: Address) -> Self {
        Self {
            transport,
            identity,
        }
    }

    pub fn identity(&self) -> &Address {
        &self.identity
    }

    /// Newest first; messages without a creation time go last.
    pub async fn fetch(&self) -> Result<Vec<InboxItem>, T::Error> {
        let mut messages = self.transport.find_by_my_identity(&self.identity).await?;

        messages.sort_by_key(|message| Reverse(message.created_at));

        Ok(messages.into_iter().map(InboxItem::from).collect())
    }

    pub async fn delete(&self, message_id: &str) -> Result<(), T::Error> {
        self.transport.delete_by_message_id(message_id).await
    }
}
