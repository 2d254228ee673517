//! Maps inbound messages and outbound task intents to the interactive workflow that handles
//! them. Dispatching is pure: every side effect belongs to the workflow that gets started.

use serde::{Deserialize, Serialize};

use crate::{
    claim::{Address, AttestedClaim, CTypeHash, PartialClaim, RequestForAttestation},
    message::{DelegationRequest, Message, MessageBody, MessageBodyType, Terms},
};

#[derive(Clone, Debug, PartialEq)]
pub enum Workflow {
    SubmitTerms {
        claim: PartialClaim,
        receivers: Vec<Address>,
    },
    RequestAttestation {
        terms: Terms,
        attester: Address,
    },
    AttestClaim {
        request: RequestForAttestation,
        claimer: Address,
    },
    ImportAttestation {
        attested_claim: AttestedClaim,
    },
    SubmitClaimsForCTypes {
        ctype_hashes: Vec<CTypeHash>,
        receivers: Vec<Address>,
    },
    VerifyClaims {
        attested_claims: Vec<AttestedClaim>,
        sender: Address,
    },
    AcceptDelegation {
        request: DelegationRequest,
        inviter: Address,
    },
    RequestTerms {
        ctype_hash: Option<CTypeHash>,
        receivers: Vec<Address>,
    },
    RequestClaimsForCTypes {
        ctype_hashes: Vec<CTypeHash>,
        receivers: Vec<Address>,
    },
    RequestAcceptDelegation {
        delegation_id: Option<String>,
        is_pcr: bool,
        receivers: Vec<Address>,
    },
}

impl Workflow {
    pub fn name(&self) -> &'static str {
        match self {
            Workflow::SubmitTerms { .. } => "submit terms",
            Workflow::RequestAttestation { .. } => "request attestation",
            Workflow::AttestClaim { .. } => "attest claim",
            Workflow::ImportAttestation { .. } => "import attestation",
            Workflow::SubmitClaimsForCTypes { .. } => "submit claims",
            Workflow::VerifyClaims { .. } => "verify claims",
            Workflow::AcceptDelegation { .. } => "accept delegation",
            Workflow::RequestTerms { .. } => "request terms",
            Workflow::RequestClaimsForCTypes { .. } => "request claims",
            Workflow::RequestAcceptDelegation { .. } => "request delegation",
        }
    }
}

/// Resolves the workflow for a message the user opened. Messages without an interpretable
/// body resolve to `None`.
pub fn dispatch_message(message: &Message) -> Option<Workflow> {
    let sender = message.sender_address.clone();

    let workflow = match message.typed_body()? {
        MessageBody::RequestTerms(claim) => Workflow::SubmitTerms {
            claim,
            receivers: vec![sender],
        },
        MessageBody::SubmitTerms(terms) => Workflow::RequestAttestation {
            terms,
            attester: sender,
        },
        MessageBody::SubmitLegitimations(legitimations) => Workflow::RequestAttestation {
            terms: Terms {
                claim: legitimations.claim,
                legitimations: legitimations.legitimations,
                delegation_id: None,
            },
            attester: sender,
        },
        MessageBody::RequestAttestationForClaim(request) => Workflow::AttestClaim {
            request,
            claimer: sender,
        },
        MessageBody::SubmitAttestationForClaim(attested_claim) => {
            Workflow::ImportAttestation { attested_claim }
        }
        MessageBody::RequestClaimsForCTypes(ctype_hashes) => Workflow::SubmitClaimsForCTypes {
            ctype_hashes,
            receivers: vec![sender],
        },
        MessageBody::SubmitClaimsForCTypes(attested_claims) => Workflow::VerifyClaims {
            attested_claims,
            sender,
        },
        MessageBody::RequestAcceptDelegation(request) => Workflow::AcceptDelegation {
            request,
            inviter: sender,
        },
    };

    Some(workflow)
}

/// Whether the message content may be shown verbatim as JSON. Submitted claims have their own
/// presentation and are too large to dump.
pub fn is_json_displayable(message: &Message) -> bool {
    message.body_type() != Some(MessageBodyType::SubmitClaimsForCTypes)
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum TaskObjective {
    RequestTerms,
    SubmitTerms,
    RequestClaimsForCTypes,
    SubmitClaimsForCTypes,
    RequestAcceptDelegation,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskProps {
    #[serde(default, rename = "cTypeHashes")]
    pub ctype_hashes: Vec<CTypeHash>,
    #[serde(default, rename = "receiverAddresses")]
    pub receivers: Vec<Address>,
    #[serde(default)]
    pub claim: Option<PartialClaim>,
    #[serde(default)]
    pub delegation_id: Option<String>,
    #[serde(default, rename = "isPCR")]
    pub is_pcr: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskIntent {
    #[serde(default)]
    pub objective: Option<TaskObjective>,
    #[serde(default)]
    pub props: TaskProps,
}

/// Resolves the workflow for a task the user started. Intents without an objective resolve
/// to `None`, as does a submit-terms task with neither a claim nor a CType to build one from.
pub fn dispatch_task(intent: &TaskIntent) -> Option<Workflow> {
    let props = intent.props.clone();

    let workflow = match intent.objective? {
        TaskObjective::RequestTerms => Workflow::RequestTerms {
            ctype_hash: props.ctype_hashes.into_iter().next(),
            receivers: props.receivers,
        },
        TaskObjective::SubmitTerms => {
            let claim = props.claim.or_else(|| {
                props.ctype_hashes.into_iter().next().map(|ctype_hash| PartialClaim {
                    ctype_hash,
                    contents: None,
                    owner: None,
                })
            })?;

            Workflow::SubmitTerms {
                claim,
                receivers: props.receivers,
            }
        }
        TaskObjective::RequestClaimsForCTypes => Workflow::RequestClaimsForCTypes {
            ctype_hashes: props.ctype_hashes,
            receivers: props.receivers,
        },
        TaskObjective::SubmitClaimsForCTypes => Workflow::SubmitClaimsForCTypes {
            ctype_hashes: props.ctype_hashes,
            receivers: props.receivers,
        },
        TaskObjective::RequestAcceptDelegation => Workflow::RequestAcceptDelegation {
            delegation_id: props.delegation_id,
            is_pcr: props.is_pcr,
            receivers: props.receivers,
        },
    };

    Some(workflow)
}
