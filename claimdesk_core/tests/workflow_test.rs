use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use claimdesk_core::{
    claim::{Address, CTypeHash, ClaimEntry, PartialClaim},
    dispatch::Workflow,
    event::WorkflowEvent,
    message::{MessageBody, MessageBodyType},
    presentation::RedactingPresenter,
    request::{RequestError, request_claims_for_ctypes, request_terms},
    session::{Session, SessionState},
    workflow::{
        Collaborators, DisclosureContext, SendOutcome, SubmitClaimsWorkflow, WorkflowError,
        WorkflowState,
    },
};
use common::{claim_entry, message};
use mock::{MockCTypes, MockContacts, MockTransport, RecordedEvents};
use parking_lot::Mutex;

mod common;
mod mock;

type TestCollaborators =
    Collaborators<MockTransport, MockContacts, RedactingPresenter, RecordedEvents>;
type TestWorkflow =
    SubmitClaimsWorkflow<MockTransport, MockContacts, RedactingPresenter, RecordedEvents>;

fn collaborators(transport: &MockTransport, contacts: &[&str]) -> TestCollaborators {
    Collaborators {
        transport: transport.clone(),
        contacts: MockContacts::with(contacts),
        presenter: RedactingPresenter,
        events: RecordedEvents::default(),
    }
}

fn entries() -> Vec<ClaimEntry> {
    vec![
        claim_entry("e1", "A", &["age", "name"], &[("t1", false), ("t2", true)]),
        claim_entry("e2", "A", &["email"], &[("t3", false)]),
        claim_entry("e3", "B", &["city"], &[("t4", false)]),
    ]
}

async fn started_workflow(
    transport: &MockTransport,
    contacts: &[&str],
    context: DisclosureContext,
) -> TestWorkflow {
    let mut workflow = SubmitClaimsWorkflow::mount(
        &entries(),
        vec![CTypeHash::new("A")],
        Address::new("verifier"),
        context,
        &MockCTypes::with(&["A", "B"]),
        collaborators(transport, contacts),
    )
    .await;
    workflow.start().unwrap();
    workflow
}

fn presented(body: &MessageBody) -> Vec<(String, Vec<String>)> {
    let attested_claims = match body {
        MessageBody::SubmitClaimsForCTypes(attested_claims) => attested_claims,
        MessageBody::SubmitLegitimations(legitimations) => &legitimations.legitimations,
        other => panic!("unexpected body {other:?}"),
    };

    attested_claims
        .iter()
        .map(|attested| {
            (
                attested.claim_hash().to_owned(),
                attested.request.claim.property_names().cloned().collect(),
            )
        })
        .collect()
}

#[tokio::test]
async fn sends_minimized_disclosure_and_finishes_once() {
    let transport = MockTransport::new();
    let finished = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&finished);

    let mut workflow = started_workflow(&transport, &["verifier"], DisclosureContext::Default)
        .await
        .on_finished(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

    let selector = workflow.selector_mut().unwrap();
    selector.select("e1").unwrap();
    selector.toggle_property("e1", "age").unwrap();
    selector.select("e2").unwrap();
    assert!(workflow.can_send());

    assert_eq!(workflow.send().await, Ok(SendOutcome::Sent));
    assert_eq!(workflow.state(), WorkflowState::Sent);
    assert_eq!(finished.load(Ordering::SeqCst), 1);

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0.address, Address::new("verifier"));
    assert_eq!(
        presented(&sent[0].1),
        vec![
            ("t1".to_owned(), vec!["name".to_owned()]),
            ("t3".to_owned(), vec!["email".to_owned()]),
        ]
    );

    assert_eq!(workflow.send().await, Err(WorkflowError::AlreadySent));
    assert_eq!(finished.load(Ordering::SeqCst), 1);
    assert_eq!(
        workflow.events().events,
        vec![WorkflowEvent::Sent(
            Address::new("verifier"),
            MessageBodyType::SubmitClaimsForCTypes
        )]
    );
}

#[tokio::test]
async fn failed_send_keeps_selection_for_retry() {
    let transport = MockTransport::new();
    let mut workflow =
        started_workflow(&transport, &["verifier"], DisclosureContext::Default).await;

    workflow.selector_mut().unwrap().select("e1").unwrap();
    let before = workflow.selector().contributions().clone();

    transport.set_offline(true);
    let result = workflow.send().await;

    assert!(matches!(result, Err(WorkflowError::Transport(_))));
    assert_eq!(workflow.state(), WorkflowState::WorkflowStarted);
    assert_eq!(workflow.selector().contributions(), &before);
    assert!(transport.sent().is_empty());
    assert!(matches!(
        workflow.events().events.as_slice(),
        [WorkflowEvent::SendFailed(_, _)]
    ));

    transport.set_offline(false);
    assert_eq!(workflow.send().await, Ok(SendOutcome::Sent));
    assert_eq!(transport.sent().len(), 1);
}

#[tokio::test]
async fn unknown_contact_aborts_without_partial_send() {
    let transport = MockTransport::new();
    let mut workflow =
        started_workflow(&transport, &["someone else"], DisclosureContext::Default).await;

    workflow.selector_mut().unwrap().select("e2").unwrap();
    let before = workflow.selector().contributions().clone();

    assert_eq!(
        workflow.send().await,
        Err(WorkflowError::ContactNotFound(Address::new("verifier")))
    );
    assert!(transport.sent().is_empty());
    assert_eq!(workflow.selector().contributions(), &before);
    assert_eq!(workflow.state(), WorkflowState::WorkflowStarted);
    assert_eq!(
        workflow.events().events,
        vec![WorkflowEvent::ContactNotResolved(Address::new("verifier"))]
    );
}

#[tokio::test]
async fn empty_selection_is_never_sent() {
    let transport = MockTransport::new();
    let mut workflow =
        started_workflow(&transport, &["verifier"], DisclosureContext::Default).await;

    let selector = workflow.selector_mut().unwrap();
    selector.select("e1").unwrap();
    selector.deselect("e1").unwrap();

    assert!(!workflow.can_send());
    assert_eq!(workflow.send().await, Ok(SendOutcome::NothingToSend));
    assert!(transport.sent().is_empty());
    assert_eq!(workflow.state(), WorkflowState::WorkflowStarted);
}

#[tokio::test]
async fn workflow_must_be_started_explicitly() {
    let transport = MockTransport::new();
    let mut workflow: TestWorkflow = SubmitClaimsWorkflow::mount(
        &entries(),
        vec![],
        Address::new("verifier"),
        DisclosureContext::Default,
        &MockCTypes::default(),
        collaborators(&transport, &["verifier"]),
    )
    .await;

    assert_eq!(workflow.state(), WorkflowState::NotStarted);
    assert!(workflow.selector_mut().is_none());
    assert_eq!(workflow.send().await, Err(WorkflowError::NotStarted));

    workflow.start().unwrap();
    assert_eq!(workflow.selector().groups().len(), 2);
}

#[tokio::test]
async fn unknown_ctype_means_no_relevant_claims() {
    let transport = MockTransport::new();
    let mut workflow: TestWorkflow = SubmitClaimsWorkflow::mount(
        &entries(),
        vec![CTypeHash::new("A")],
        Address::new("verifier"),
        DisclosureContext::Default,
        &MockCTypes::with(&["B"]),
        collaborators(&transport, &["verifier"]),
    )
    .await;

    assert_eq!(workflow.state(), WorkflowState::NoRelevantClaims);
    assert_eq!(workflow.start(), Err(WorkflowError::NoRelevantClaims));
    assert!(workflow.selector().entries().is_empty());
}

#[tokio::test]
async fn legitimation_context_wraps_the_claim_being_vouched_for() {
    let transport = MockTransport::new();
    let claim = PartialClaim {
        ctype_hash: CTypeHash::new("C"),
        contents: None,
        owner: Some(Address::new("me")),
    };
    let mut workflow = started_workflow(
        &transport,
        &["verifier"],
        DisclosureContext::Legitimation {
            claim: claim.clone(),
        },
    )
    .await;
    assert_eq!(workflow.title(), "Select legitimations to send");

    workflow.selector_mut().unwrap().select("e2").unwrap();
    workflow.send().await.unwrap();

    let sent = transport.sent();
    match &sent[0].1 {
        MessageBody::SubmitLegitimations(legitimations) => {
            assert_eq!(legitimations.claim, claim);
            assert_eq!(legitimations.legitimations.len(), 1);
        }
        other => panic!("unexpected body {other:?}"),
    }
}

#[tokio::test]
async fn dispatched_request_drives_workflow_to_completed_session() {
    let transport = MockTransport::new();
    let session = Arc::new(Mutex::new(Session::new()));

    let request = message(
        "m1",
        "verifier",
        "me",
        None,
        MessageBody::RequestClaimsForCTypes(vec![CTypeHash::new("B")]),
    );
    assert!(session.lock().open_message(&request).unwrap());
    let ticket = session.lock().ticket().unwrap();

    let (ctype_hashes, receiver) = match session.lock().workflow() {
        Some(Workflow::SubmitClaimsForCTypes {
            ctype_hashes,
            receivers,
        }) => (ctype_hashes.clone(), receivers[0].clone()),
        other => panic!("unexpected workflow {other:?}"),
    };

    let finishing = Arc::clone(&session);
    let mut workflow = SubmitClaimsWorkflow::mount(
        &entries(),
        ctype_hashes,
        receiver,
        DisclosureContext::Default,
        &MockCTypes::with(&["B"]),
        collaborators(&transport, &["verifier"]),
    )
    .await
    .on_finished(move || {
        finishing.lock().finish(ticket);
    });

    workflow.start().unwrap();
    workflow.selector_mut().unwrap().select("e3").unwrap();
    workflow.send().await.unwrap();

    assert_eq!(session.lock().state(), SessionState::Completed);
    assert_eq!(
        presented(&transport.sent()[0].1),
        vec![("t4".to_owned(), vec!["city".to_owned()])]
    );
}

#[tokio::test]
async fn request_claims_reports_each_receiver() {
    let transport = MockTransport::new();
    let contacts = MockContacts::with(&["bob", "carol"]);
    let mut events = RecordedEvents::default();
    let receivers = [
        Address::new("bob"),
        Address::new("dave"),
        Address::new("carol"),
    ];

    let outcome = request_claims_for_ctypes(
        &transport,
        &contacts,
        &mut events,
        vec![CTypeHash::new("A")],
        &receivers,
    )
    .await
    .unwrap();

    assert_eq!(
        outcome.delivered,
        vec![Address::new("bob"), Address::new("carol")]
    );
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].0, Address::new("dave"));
    assert!(!outcome.all_delivered());
    assert_eq!(transport.sent().len(), 2);
    assert!(
        events
            .events
            .contains(&WorkflowEvent::ContactNotResolved(Address::new("dave")))
    );

    assert_eq!(
        request_claims_for_ctypes(&transport, &contacts, &mut events, vec![], &receivers).await,
        Err(RequestError::NoCTypes)
    );
}

#[tokio::test]
async fn abandoned_send_returns_workflow_to_started() {
    let transport = MockTransport::new();
    let mut workflow =
        started_workflow(&transport, &["verifier"], DisclosureContext::Default).await;

    workflow.selector_mut().unwrap().select("e1").unwrap();
    let before = workflow.selector().contributions().clone();

    transport.set_hanging(true);
    let result = tokio::time::timeout(Duration::from_millis(50), workflow.send()).await;

    assert!(result.is_err());
    assert_eq!(workflow.state(), WorkflowState::WorkflowStarted);
    assert!(workflow.can_send());
    assert!(workflow.selector_mut().is_some());
    assert_eq!(workflow.start(), Ok(()));
    assert_eq!(workflow.selector().contributions(), &before);

    transport.set_hanging(false);
    assert_eq!(workflow.send().await, Ok(SendOutcome::Sent));
    assert_eq!(workflow.state(), WorkflowState::Sent);
}

#[tokio::test]
async fn request_terms_asks_each_receiver_for_a_bare_claim() {
    let transport = MockTransport::new();
    let contacts = MockContacts::with(&["attester", "backup"]);
    let mut events = RecordedEvents::default();
    let receivers = [
        Address::new("attester"),
        Address::new("stranger"),
        Address::new("backup"),
    ];

    let outcome = request_terms(
        &transport,
        &contacts,
        &mut events,
        CTypeHash::new("A"),
        &receivers,
    )
    .await
    .unwrap();

    let expected = MessageBody::RequestTerms(PartialClaim {
        ctype_hash: CTypeHash::new("A"),
        contents: None,
        owner: None,
    });
    let sent = transport.sent();
    assert_eq!(
        sent.iter()
            .map(|(contact, _)| contact.address.clone())
            .collect::<Vec<_>>(),
        vec![Address::new("attester"), Address::new("backup")]
    );
    assert!(sent.iter().all(|(_, body)| body == &expected));
    assert_eq!(expected.body_type().as_tag(), "request-terms");

    assert_eq!(
        outcome.delivered,
        vec![Address::new("attester"), Address::new("backup")]
    );
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].0, Address::new("stranger"));
    assert_eq!(
        events.events,
        vec![
            WorkflowEvent::Sent(Address::new("attester"), MessageBodyType::RequestTerms),
            WorkflowEvent::ContactNotResolved(Address::new("stranger")),
            WorkflowEvent::Sent(Address::new("backup"), MessageBodyType::RequestTerms),
        ]
    );

    assert_eq!(
        request_terms(&transport, &contacts, &mut events, CTypeHash::new("A"), &[]).await,
        Err(RequestError::NoReceivers)
    );
}
