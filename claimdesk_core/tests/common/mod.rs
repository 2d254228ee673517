use chrono::{DateTime, TimeZone, Utc};
use claimdesk_core::{
    claim::{
        Address, Attestation, AttestedClaim, CTypeHash, Claim, ClaimEntry, RequestForAttestation,
    },
    message::{Message, MessageBody, UntypedBody},
};
use serde_json::json;

pub fn claim_entry(
    id: &str,
    ctype: &str,
    properties: &[&str],
    attestations: &[(&str, bool)],
) -> ClaimEntry {
    let claim = Claim {
        ctype_hash: CTypeHash::new(ctype),
        contents: properties
            .iter()
            .map(|name| (name.to_string(), json!(format!("{id} {name}"))))
            .collect(),
        owner: Address::new("me"),
    };

    let attested_claims = attestations
        .iter()
        .map(|(claim_hash, revoked)| AttestedClaim {
            request: RequestForAttestation {
                claim: claim.clone(),
                legitimations: vec![],
                delegation_id: None,
            },
            attestation: Attestation {
                claim_hash: claim_hash.to_string(),
                ctype_hash: claim.ctype_hash.clone(),
                owner: Address::new("attester"),
                revoked: *revoked,
                delegation_id: None,
            },
        })
        .collect();

    ClaimEntry {
        id: id.to_owned(),
        alias: Some(format!("{id} alias")),
        claim,
        attested_claims,
    }
}

pub fn at(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(seconds, 0).unwrap()
}

pub fn message(
    id: &str,
    from: &str,
    to: &str,
    created_at: Option<DateTime<Utc>>,
    body: MessageBody,
) -> Message {
    let json = serde_json::to_value(&body).unwrap();

    Message {
        message_id: Some(id.to_owned()),
        created_at,
        received_at: None,
        sender_address: Address::new(from),
        receiver_address: Address::new(to),
        nonce: None,
        encrypted_message: None,
        body: Some(serde_json::from_value::<UntypedBody>(json).unwrap()),
    }
}
