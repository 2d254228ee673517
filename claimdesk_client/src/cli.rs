use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use claimdesk_core::{
    claim::{Address, CTypeHash},
    event::{HandleEvent, WorkflowEvent},
    inbox::{Inbox, InboxItem},
    request::{RequestOutcome, request_claims_for_ctypes, request_terms},
};

use crate::{
    ServiceClient,
    config::{DEFAULT_CONFIG_FILE_PATH, ServiceConfig},
};

#[derive(Parser)]
#[command(version)]
#[command(arg_required_else_help(true))]
struct ClaimdeskCli {
    /// Config file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE_PATH)]
    config: PathBuf,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List messages addressed to the configured identity
    Inbox,
    /// Print the content of one message
    Show {
        /// Message id
        message_id: String,
    },
    /// Delete a message from the inbox
    Delete {
        /// Message id
        message_id: String,
    },
    /// Ask contacts for their claims of a CType
    RequestClaims {
        /// CType hash
        ctype_hash: String,
        /// Receiver addresses
        #[arg(required = true)]
        receivers: Vec<String>,
    },
    /// Ask attesters for the terms of a CType
    RequestTerms {
        /// CType hash
        ctype_hash: String,
        /// Receiver addresses
        #[arg(required = true)]
        receivers: Vec<String>,
    },
}

struct PrintEvents;

impl HandleEvent for PrintEvents {
    fn handle_event(&mut self, event: WorkflowEvent) {
        match event {
            WorkflowEvent::Sent(receiver, body_type) => println!("sent {body_type} to {receiver}"),
            WorkflowEvent::SendFailed(receiver, reason) => {
                eprintln!("could not send to {receiver}: {reason}")
            }
            WorkflowEvent::ContactNotResolved(receiver) => {
                eprintln!("{receiver} is not in your contacts")
            }
            WorkflowEvent::NothingToSend => eprintln!("nothing selected, nothing sent"),
        }
    }
}

pub async fn do_cli() -> Result<()> {
    let cli = ClaimdeskCli::parse();

    let Some(command) = cli.command else {
        return Ok(());
    };

    let config = ServiceConfig::load(&cli.config)
        .with_context(|| format!("can't read config from {}", cli.config.display()))?;
    let client = ServiceClient::new(&config)?;
    let inbox = Inbox::new(client.transport().clone(), client.identity().clone());

    match command {
        Commands::Inbox => {
            for item in inbox.fetch().await? {
                println!("{}", summarize(&item));
            }
        }
        Commands::Show { message_id } => {
            let item = inbox
                .fetch()
                .await?
                .into_iter()
                .find(|item| item.message.message_id.as_deref() == Some(message_id.as_str()))
                .ok_or_else(|| anyhow!("no message with id {message_id}"))?;

            println!("{}", summarize(&item));
            match (&item.message.body, item.json_displayable) {
                (Some(body), true) => println!("{}", serde_json::to_string_pretty(body)?),
                (Some(_), false) => println!("(content too large to display)"),
                (None, _) => println!("(message could not be decoded)"),
            }
        }
        Commands::Delete { message_id } => {
            inbox.delete(&message_id).await?;
            println!("deleted {message_id}");
        }
        Commands::RequestClaims {
            ctype_hash,
            receivers,
        } => {
            let receivers: Vec<Address> = receivers.into_iter().map(Address::new).collect();
            let outcome = request_claims_for_ctypes(
                client.transport(),
                client.contacts(),
                &mut PrintEvents,
                vec![CTypeHash::new(ctype_hash)],
                &receivers,
            )
            .await?;

            check_outcome(&outcome, receivers.len())?;
        }
        Commands::RequestTerms {
            ctype_hash,
            receivers,
        } => {
            let receivers: Vec<Address> = receivers.into_iter().map(Address::new).collect();
            let outcome = request_terms(
                client.transport(),
                client.contacts(),
                &mut PrintEvents,
                CTypeHash::new(ctype_hash),
                &receivers,
            )
            .await?;

            check_outcome(&outcome, receivers.len())?;
        }
    }

    Ok(())
}

fn check_outcome(outcome: &RequestOutcome, receivers: usize) -> Result<()> {
    match outcome.all_delivered() {
        true => Ok(()),
        false => Err(anyhow!(
            "{} of {} requests failed",
            outcome.failed.len(),
            receivers
        )),
    }
}

fn summarize(item: &InboxItem) -> String {
    let message = &item.message;

    format!(
        "{}  {}  from {}  {}  -> {}",
        message.message_id.as_deref().unwrap_or("-"),
        message
            .created_at
            .map(|created_at| created_at.to_rfc3339())
            .unwrap_or_else(|| "-".to_owned()),
        message.sender_address,
        message
            .body
            .as_ref()
            .map(|body| body.body_type.as_str())
            .unwrap_or("(undecodable)"),
        item.workflow
            .as_ref()
            .map(|workflow| workflow.name())
            .unwrap_or("no workflow"),
    )
}
