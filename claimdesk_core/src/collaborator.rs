use crate::{
    claim::{Address, CTypeHash, CTypeWithMetadata, Contact},
    message::{Message, MessageBody},
};

#[trait_variant::make(Transport: Send)]
pub trait TransportLocal {
    type Error: std::fmt::Display;

    async fn send(&self, receiver: &Contact, body: &MessageBody) -> Result<(), Self::Error>;

    async fn find_by_my_identity(&self, address: &Address) -> Result<Vec<Message>, Self::Error>;

    async fn delete_by_message_id(&self, message_id: &str) -> Result<(), Self::Error>;
}

#[trait_variant::make(ContactStore: Send)]
pub trait ContactStoreLocal {
    type Error: std::fmt::Display;

    async fn find_all(&self) -> Result<Vec<Contact>, Self::Error>;

    async fn find_by_address(&self, address: &Address) -> Result<Option<Contact>, Self::Error>;
}

#[trait_variant::make(CTypeStore: Send)]
pub trait CTypeStoreLocal {
    type Error: std::fmt::Display;

    async fn find_by_hash(&self, hash: &CTypeHash)
    -> Result<Option<CTypeWithMetadata>, Self::Error>;
}
