use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new<S: Into<String>>(address: S) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct CTypeHash(String);

impl CTypeHash {
    pub fn new<S: Into<String>>(hash: S) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CTypeHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    #[serde(rename = "cTypeHash")]
    pub ctype_hash: CTypeHash,
    pub contents: BTreeMap<String, Value>,
    pub owner: Address,
}

impl Claim {
    pub fn property_names(&self) -> impl Iterator<Item = &String> {
        self.contents.keys()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PartialClaim {
    #[serde(rename = "cTypeHash")]
    pub ctype_hash: CTypeHash,
    #[serde(default)]
    pub contents: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    pub owner: Option<Address>,
}

impl From<&Claim> for PartialClaim {
    fn from(claim: &Claim) -> Self {
        Self {
            ctype_hash: claim.ctype_hash.clone(),
            contents: Some(claim.contents.clone()),
            owner: Some(claim.owner.clone()),
        }
    }
}

/// Chain-side record of an attestation. `revoked` mirrors what the chain reported and is
/// never changed locally.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Attestation {
    pub claim_hash: String,
    #[serde(rename = "cTypeHash")]
    pub ctype_hash: CTypeHash,
    pub owner: Address,
    pub revoked: bool,
    #[serde(default)]
    pub delegation_id: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RequestForAttestation {
    pub claim: Claim,
    #[serde(default)]
    pub legitimations: Vec<AttestedClaim>,
    #[serde(default)]
    pub delegation_id: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttestedClaim {
    pub request: RequestForAttestation,
    pub attestation: Attestation,
}

impl AttestedClaim {
    pub fn claim_hash(&self) -> &str {
        &self.attestation.claim_hash
    }

    pub fn is_revoked(&self) -> bool {
        self.attestation.revoked
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClaimEntry {
    pub id: String,
    #[serde(default)]
    pub alias: Option<String>,
    pub claim: Claim,
    #[serde(default)]
    pub attested_claims: Vec<AttestedClaim>,
}

impl ClaimEntry {
    pub fn ctype_hash(&self) -> &CTypeHash {
        &self.claim.ctype_hash
    }

    /// Attestations that may be offered for selection. Revoked ones never are.
    pub fn selectable_attested_claims(&self) -> impl Iterator<Item = &AttestedClaim> {
        self.attested_claims.iter().filter(|attested| !attested.is_revoked())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub address: Address,
    pub name: String,
    #[serde(default)]
    pub box_public_key: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CTypeWithMetadata {
    #[serde(rename = "cTypeHash")]
    pub ctype_hash: CTypeHash,
    pub owner: Option<Address>,
    pub title: String,
    #[serde(default)]
    pub properties: Vec<String>,
}
