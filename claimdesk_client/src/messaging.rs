use claimdesk_core::{
    claim::{Address, Contact},
    collaborator::Transport,
    message::{Message, MessageBody},
};
use reqwest::{Client, Url};
use serde::Serialize;
use tracing::debug;

use crate::{
    error::ServiceError,
    service::{check_status, join, read_json, send_request},
};

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct OutgoingMessage<'a> {
    sender_address: &'a Address,
    receiver_address: &'a Address,
    nonce: String,
    body: &'a MessageBody,
}

/// Messaging endpoints of the backend:
///
/// | Method | Path | Operation |
/// |--------|------|-----------|
/// | POST   | `/` | send |
/// | GET    | `/inbox/{address}` | messages for an identity |
/// | DELETE | `/{messageId}` | delete |
#[derive(Clone, Debug)]
pub struct RestTransport {
    http: Client,
    base_url: Url,
    sender: Address,
}

impl RestTransport {
    pub fn new(http: Client, base_url: Url, sender: Address) -> Self {
        Self {
            http,
            base_url,
            sender,
        }
    }

    pub fn sender(&self) -> &Address {
        &self.sender
    }
}

impl Transport for RestTransport {
    type Error = ServiceError;

    async fn send(&self, receiver: &Contact, body: &MessageBody) -> Result<(), ServiceError> {
        let endpoint = "POST /messaging";
        let outgoing = OutgoingMessage {
            sender_address: &self.sender,
            receiver_address: &receiver.address,
            nonce: uuid::Uuid::new_v4().hyphenated().to_string(),
            body,
        };

        let response = send_request(
            self.http.post(self.base_url.clone()).json(&outgoing),
            endpoint,
        )
        .await?;
        check_status(response, endpoint).await?;

        debug!(receiver = %receiver.address, nonce = %outgoing.nonce, "message posted");

        Ok(())
    }

    async fn find_by_my_identity(&self, address: &Address) -> Result<Vec<Message>, ServiceError> {
        let endpoint = "GET /messaging/inbox";
        let url = join(&self.base_url, &["inbox", address.as_str()]);

        let response = send_request(self.http.get(url), endpoint).await?;
        let response = check_status(response, endpoint).await?;

        read_json(response, endpoint).await
    }

    async fn delete_by_message_id(&self, message_id: &str) -> Result<(), ServiceError> {
        let endpoint = "DELETE /messaging";
        let url = join(&self.base_url, &[message_id]);

        let response = send_request(self.http.delete(url), endpoint).await?;
        check_status(response, endpoint).await?;

        Ok(())
    }
}
