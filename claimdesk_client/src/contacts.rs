use claimdesk_core::{
    claim::{Address, Contact},
    collaborator::ContactStore,
};
use reqwest::{Client, Url};

use crate::{
    error::ServiceError,
    service::{check_status, get_optional, join, read_json, send_request},
};

#[derive(Clone, Debug)]
pub struct RestContacts {
    http: Client,
    base_url: Url,
}

impl RestContacts {
    pub fn new(http: Client, base_url: Url) -> Self {
        Self { http, base_url }
    }
}

impl ContactStore for RestContacts {
    type Error = ServiceError;

    async fn find_all(&self) -> Result<Vec<Contact>, ServiceError> {
        let endpoint = "GET /contacts";

        let response = send_request(self.http.get(self.base_url.clone()), endpoint).await?;
        let response = check_status(response, endpoint).await?;

        read_json(response, endpoint).await
    }

    async fn find_by_address(&self, address: &Address) -> Result<Option<Contact>, ServiceError> {
        get_optional(
            &self.http,
            join(&self.base_url, &[address.as_str()]),
            "GET /contacts/{address}",
        )
        .await
    }
}
