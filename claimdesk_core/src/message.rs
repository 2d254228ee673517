use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::claim::{Address, AttestedClaim, CTypeHash, PartialClaim, RequestForAttestation};

/// Envelope as delivered by the messaging backend. The body stays untyped until
/// [`UntypedBody::interpret`] is called on it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub received_at: Option<DateTime<Utc>>,
    pub sender_address: Address,
    pub receiver_address: Address,
    #[serde(default)]
    pub nonce: Option<String>,
    #[serde(default)]
    pub encrypted_message: Option<String>,
    #[serde(default)]
    pub body: Option<UntypedBody>,
}

impl Message {
    pub fn body_type(&self) -> Option<MessageBodyType> {
        self.body
            .as_ref()
            .and_then(|body| MessageBodyType::from_tag(&body.body_type))
    }

    pub fn typed_body(&self) -> Option<MessageBody> {
        self.body.as_ref().and_then(UntypedBody::interpret)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UntypedBody {
    #[serde(rename = "type")]
    pub body_type: String,
    #[serde(default)]
    pub content: Option<Value>,
}

impl UntypedBody {
    /// Returns `None` when the content is absent, the tag is unknown, or the content does not
    /// have the shape its tag dictates.
    pub fn interpret(&self) -> Option<MessageBody> {
        let content = self.content.as_ref()?;
        let body_type = MessageBodyType::from_tag(&self.body_type)?;

        let body = match body_type {
            MessageBodyType::RequestTerms => MessageBody::RequestTerms(from_content(content)?),
            MessageBodyType::SubmitTerms => MessageBody::SubmitTerms(from_content(content)?),
            MessageBodyType::RequestAttestationForClaim => {
                MessageBody::RequestAttestationForClaim(from_content(content)?)
            }
            MessageBodyType::SubmitAttestationForClaim => {
                MessageBody::SubmitAttestationForClaim(from_content(content)?)
            }
            MessageBodyType::RequestClaimsForCTypes => {
                MessageBody::RequestClaimsForCTypes(from_content(content)?)
            }
            MessageBodyType::SubmitClaimsForCTypes => {
                MessageBody::SubmitClaimsForCTypes(from_content(content)?)
            }
            MessageBodyType::RequestAcceptDelegation => {
                MessageBody::RequestAcceptDelegation(from_content(content)?)
            }
            MessageBodyType::SubmitLegitimations => {
                MessageBody::SubmitLegitimations(from_content(content)?)
            }
        };

        Some(body)
    }
}

fn from_content<T: DeserializeOwned>(content: &Value) -> Option<T> {
    serde_json::from_value(content.clone()).ok()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageBodyType {
    RequestTerms,
    SubmitTerms,
    RequestAttestationForClaim,
    SubmitAttestationForClaim,
    RequestClaimsForCTypes,
    SubmitClaimsForCTypes,
    RequestAcceptDelegation,
    SubmitLegitimations,
}

impl MessageBodyType {
    pub const ALL: [MessageBodyType; 8] = [
        MessageBodyType::RequestTerms,
        MessageBodyType::SubmitTerms,
        MessageBodyType::RequestAttestationForClaim,
        MessageBodyType::SubmitAttestationForClaim,
        MessageBodyType::RequestClaimsForCTypes,
        MessageBodyType::SubmitClaimsForCTypes,
        MessageBodyType::RequestAcceptDelegation,
        MessageBodyType::SubmitLegitimations,
    ];

    pub fn as_tag(self) -> &'static str {
        match self {
            MessageBodyType::RequestTerms => "request-terms",
            MessageBodyType::SubmitTerms => "submit-terms",
            MessageBodyType::RequestAttestationForClaim => "request-attestation-for-claim",
            MessageBodyType::SubmitAttestationForClaim => "submit-attestation-for-claim",
            MessageBodyType::RequestClaimsForCTypes => "request-claims-for-ctypes",
            MessageBodyType::SubmitClaimsForCTypes => "submit-claims-for-ctypes",
            MessageBodyType::RequestAcceptDelegation => "request-accept-delegation",
            MessageBodyType::SubmitLegitimations => "submit-legitimations",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|body_type| body_type.as_tag() == tag)
    }
}

impl std::fmt::Display for MessageBodyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Typed message body. The shape of `content` is fixed by the `type` tag.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", content = "content")]
pub enum MessageBody {
    #[serde(rename = "request-terms")]
    RequestTerms(PartialClaim),
    #[serde(rename = "submit-terms")]
    SubmitTerms(Terms),
    #[serde(rename = "request-attestation-for-claim")]
    RequestAttestationForClaim(RequestForAttestation),
    #[serde(rename = "submit-attestation-for-claim")]
    SubmitAttestationForClaim(AttestedClaim),
    #[serde(rename = "request-claims-for-ctypes")]
    RequestClaimsForCTypes(Vec<CTypeHash>),
    #[serde(rename = "submit-claims-for-ctypes")]
    SubmitClaimsForCTypes(Vec<AttestedClaim>),
    #[serde(rename = "request-accept-delegation")]
    RequestAcceptDelegation(DelegationRequest),
    #[serde(rename = "submit-legitimations")]
    SubmitLegitimations(Legitimations),
}

impl MessageBody {
    pub fn body_type(&self) -> MessageBodyType {
        match self {
            MessageBody::RequestTerms(_) => MessageBodyType::RequestTerms,
            MessageBody::SubmitTerms(_) => MessageBodyType::SubmitTerms,
            MessageBody::RequestAttestationForClaim(_) => {
                MessageBodyType::RequestAttestationForClaim
            }
            MessageBody::SubmitAttestationForClaim(_) => MessageBodyType::SubmitAttestationForClaim,
            MessageBody::RequestClaimsForCTypes(_) => MessageBodyType::RequestClaimsForCTypes,
            MessageBody::SubmitClaimsForCTypes(_) => MessageBodyType::SubmitClaimsForCTypes,
            MessageBody::RequestAcceptDelegation(_) => MessageBodyType::RequestAcceptDelegation,
            MessageBody::SubmitLegitimations(_) => MessageBodyType::SubmitLegitimations,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Terms {
    pub claim: PartialClaim,
    #[serde(default)]
    pub legitimations: Vec<AttestedClaim>,
    #[serde(default)]
    pub delegation_id: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Legitimations {
    pub claim: PartialClaim,
    pub legitimations: Vec<AttestedClaim>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Attest,
    Delegate,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DelegationRequest {
    pub delegation_id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub account: Address,
    pub permissions: Vec<Permission>,
    #[serde(rename = "isPCR", default)]
    pub is_pcr: bool,
    #[serde(default)]
    pub alias: Option<String>,
    pub inviter_signature: String,
}
