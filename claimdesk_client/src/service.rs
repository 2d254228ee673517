use claimdesk_core::claim::Address;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::{
    config::ServiceConfig,
    contacts::RestContacts,
    ctypes::RestCTypes,
    error::ServiceError,
    messaging::RestTransport,
};

#[derive(Clone, Debug)]
pub struct ServiceClient {
    transport: RestTransport,
    contacts: RestContacts,
    ctypes: RestCTypes,
}

impl ServiceClient {
    pub fn new(config: &ServiceConfig) -> Result<Self, ServiceError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ServiceError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            transport: RestTransport::new(
                http.clone(),
                config.messaging_url.clone(),
                config.identity.clone(),
            ),
            contacts: RestContacts::new(http.clone(), config.contacts_url.clone()),
            ctypes: RestCTypes::new(http, config.ctype_url.clone()),
        })
    }

    pub fn identity(&self) -> &Address {
        self.transport.sender()
    }

    pub fn transport(&self) -> &RestTransport {
        &self.transport
    }

    pub fn contacts(&self) -> &RestContacts {
        &self.contacts
    }

    pub fn ctypes(&self) -> &RestCTypes {
        &self.ctypes
    }
}

pub(crate) fn join(base_url: &Url, segments: &[&str]) -> Url {
    let mut url = base_url.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

pub(crate) async fn send_request(
    request: reqwest::RequestBuilder,
    endpoint: &str,
) -> Result<Response, ServiceError> {
    request.send().await.map_err(|e| ServiceError::Http {
        endpoint: endpoint.to_owned(),
        source: e,
    })
}

pub(crate) async fn check_status(
    response: Response,
    endpoint: &str,
) -> Result<Response, ServiceError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(ServiceError::Api {
        endpoint: endpoint.to_owned(),
        status,
        body,
    })
}

pub(crate) async fn read_json<T: DeserializeOwned>(
    response: Response,
    endpoint: &str,
) -> Result<T, ServiceError> {
    response
        .json()
        .await
        .map_err(|e| ServiceError::Deserialization {
            endpoint: endpoint.to_owned(),
            source: e,
        })
}

/// GET that maps 404 to `None`.
pub(crate) async fn get_optional<T: DeserializeOwned>(
    http: &Client,
    url: Url,
    endpoint: &str,
) -> Result<Option<T>, ServiceError> {
    let response = send_request(http.get(url), endpoint).await?;

    if response.status() == StatusCode::NOT_FOUND {
        return Ok(None);
    }

    let response = check_status(response, endpoint).await?;
    read_json(response, endpoint).await.map(Some)
}
