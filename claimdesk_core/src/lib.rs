pub mod claim;
pub mod collaborator;
pub mod dispatch;
pub mod event;
pub mod inbox;
pub mod message;
pub mod presentation;
pub mod request;
pub mod selection;
pub mod session;
pub mod workflow;
