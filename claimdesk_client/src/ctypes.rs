use claimdesk_core::{
    claim::{CTypeHash, CTypeWithMetadata},
    collaborator::CTypeStore,
};
use reqwest::{Client, Url};

use crate::{
    error::ServiceError,
    service::{get_optional, join},
};

#[derive(Clone, Debug)]
pub struct RestCTypes {
    http: Client,
    base_url: Url,
}

impl RestCTypes {
    pub fn new(http: Client, base_url: Url) -> Self {
        Self { http, base_url }
    }
}

impl CTypeStore for RestCTypes {
    type Error = ServiceError;

    async fn find_by_hash(
        &self,
        hash: &CTypeHash,
    ) -> Result<Option<CTypeWithMetadata>, ServiceError> {
        get_optional(
            &self.http,
            join(&self.base_url, &[hash.as_str()]),
            "GET /ctype/{hash}",
        )
        .await
    }
}
