use crate::config::{CloseMode, DemoCommand, GlobalOptions, IdCommand, MessageCommand, VerifyCommand};
use crate::id_management::{assign_identity, default_id_path, load_or_create_identities, LocalIdentity};
use anyhow::anyhow;
use libbrick::address::Address;
use libbrick::amount::Amount;
use libbrick::balance::Balances;
use libbrick::channel::{ChannelEvent, ChannelParams};
use libbrick::cryptography::messages::{announcement_digest, state_digest};
use libbrick::cryptography::signer::{co_sign_announcement, sign_announcement, sign_state};
use libbrick::cryptography::{check_prefixed_sig, ChannelState, EcdsaSignature, SecretKey};
use libbrick::host::{BrickHost, InMemoryLedger, Ledger, Receipt};
use libbrick::storage::MemoryStore;
use log::*;

pub fn exec_id_command(cmd: IdCommand, config: GlobalOptions) -> Result<(), anyhow::Error> {
    let path = config.config_file.unwrap_or_else(default_id_path);
    match cmd {
        IdCommand::Create { name } => {
            let mut local_identities = load_or_create_identities(&path)?;
            let identity = LocalIdentity::random(name);
            if local_identities.contains(identity.name()) {
                return Err(anyhow!("Identity with name {} already exists.", identity.name()));
            }
            println!("Identity created: {identity}");
            local_identities.insert(identity);
            println!("Saving identities to {}", path.display());
            local_identities.save(&path)?;
        }
        IdCommand::List => {
            let local_identities = load_or_create_identities(&path)?;
            println!("{} Local identities found.", local_identities.len());
            for id in local_identities.identities.values() {
                println!("{id}");
            }
        }
        IdCommand::Delete { name } => {
            let mut local_identities = load_or_create_identities(&path)?;
            match local_identities.remove(&name) {
                Some(identity) => {
                    println!("Identity deleted: {identity}");
                    local_identities.save(&path)?;
                }
                None => {
                    return Err(anyhow!("Identity with name {name} not found."));
                }
            }
        }
    }
    Ok(())
}

/// Signs the message with the selected identity and returns the signature.
pub fn sign_message(message: &MessageCommand, key: &SecretKey) -> Result<EcdsaSignature, anyhow::Error> {
    let signature = match message {
        MessageCommand::State(args) => {
            let state = ChannelState::new(args.alice_value, args.bob_value, args.seq);
            sign_state(&args.channel, &state, key)?
        }
        MessageCommand::Announcement(args) => sign_announcement(&args.channel, args.seq, key)?,
    };
    Ok(signature)
}

pub fn exec_sign_command(message: MessageCommand, config: GlobalOptions) -> Result<(), anyhow::Error> {
    let path = config.config_file.unwrap_or_else(default_id_path);
    let identity = assign_identity(&path, config.id_name.as_ref())?;
    info!("Signing as {identity}");
    let signature = sign_message(&message, identity.secret_key())?;
    println!("Signer:    {}", identity.address());
    println!("Signature: {signature}");
    println!("{}", serde_json::to_string_pretty(&signature)?);
    Ok(())
}

/// True if the command's signature is the signer's signature over the command's message.
pub fn verify_message(cmd: &VerifyCommand) -> bool {
    let digest = match &cmd.message {
        MessageCommand::State(args) => {
            state_digest(&args.channel, &ChannelState::new(args.alice_value, args.bob_value, args.seq))
        }
        MessageCommand::Announcement(args) => announcement_digest(&args.channel, args.seq),
    };
    check_prefixed_sig(&cmd.signer, &digest, &cmd.signature)
}

pub fn exec_verify_command(cmd: VerifyCommand) -> Result<(), anyhow::Error> {
    if verify_message(&cmd) {
        println!("Valid signature by {}", cmd.signer);
        Ok(())
    } else {
        Err(anyhow!("The signature was not made by {} over this message", cmd.signer))
    }
}

pub fn print_random_keypair() -> Result<(), anyhow::Error> {
    let secret = SecretKey::random();
    println!("Private Key: {}", secret.as_hex().as_str());
    println!("Address: {}", secret.address());
    Ok(())
}

//------------------------------------           Demo            ------------------------------------------------//

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountSummary {
    pub role: String,
    pub address: Address,
    pub deposited: Amount,
    pub received: Amount,
}

#[derive(Clone, Debug)]
pub struct DemoReport {
    pub channel: Address,
    pub mode: CloseMode,
    pub fault_tolerance: usize,
    pub threshold: usize,
    pub initial: Balances,
    pub final_balance: Balances,
    pub accounts: Vec<AccountSummary>,
    pub events: Vec<ChannelEvent>,
}

struct Demo {
    host: BrickHost<InMemoryLedger, MemoryStore>,
    events: Vec<ChannelEvent>,
}

impl Demo {
    fn record<T>(&mut self, receipt: Receipt<T>) -> T {
        self.events.extend(receipt.events);
        receipt.output
    }
}

/// Runs a whole channel lifecycle with fresh keys on an in-memory ledger.
///
/// Every participant starts with exactly its deposit, so what each holds at the end is what the channel paid back.
pub fn run_demo(cmd: &DemoCommand) -> Result<DemoReport, anyhow::Error> {
    let alice = SecretKey::random();
    let bob = SecretKey::random();
    let towers = (0..cmd.watchtowers).map(|_| SecretKey::random()).collect::<Vec<_>>();

    let mut ledger = InMemoryLedger::new();
    ledger.mint(&alice.address(), cmd.alice_deposit)?;
    ledger.mint(&bob.address(), cmd.bob_deposit)?;
    for key in &towers {
        ledger.mint(&key.address(), cmd.collateral)?;
    }
    let mut demo = Demo { host: BrickHost::new(ledger, MemoryStore::new()), events: Vec::new() };

    let params = ChannelParams::new(cmd.fee, cmd.collateral);
    let members = towers.iter().map(SecretKey::address).collect();
    let receipt = demo.host.create_channel(alice.address(), cmd.alice_deposit, bob.address(), members, params)?;
    let id = demo.record(receipt);
    let receipt = demo.host.execute(&id, bob.address(), cmd.bob_deposit, |c, ctx| c.fund_bob(ctx))?;
    demo.record(receipt);
    for (i, key) in towers.iter().enumerate() {
        let receipt = demo.host.execute(&id, key.address(), cmd.collateral, |c, ctx| c.fund_watchtower(ctx, i))?;
        demo.record(receipt);
    }
    let receipt = demo.host.execute(&id, alice.address(), Amount::ZERO, |c, ctx| c.open(ctx))?;
    demo.record(receipt);

    let (initial, total, fault_tolerance, threshold) = demo.host.view(&id, |c| {
        (c.initial_balances(), c.total(), c.committee().fault_tolerance(), c.committee().quorum_threshold())
    })?;
    let initial = initial.ok_or_else(|| anyhow!("Channel {id} opened without initial balances"))?;
    let total = total.ok_or_else(|| anyhow!("Channel {id} has no total"))?;
    let final_balance = Balances::from_alice_share(total, cmd.alice_final)
        .ok_or_else(|| anyhow!("Alice's final value {} exceeds the channel total {total}", cmd.alice_final))?;

    match cmd.mode {
        CloseMode::Optimistic => {
            let alice_value = cmd.alice_final;
            let receipt = demo
                .host
                .execute(&id, alice.address(), Amount::ZERO, |c, ctx| c.optimistic_alice_close(ctx, alice_value))?;
            demo.record(receipt);
            let receipt = demo.host.execute(&id, bob.address(), Amount::ZERO, |c, ctx| c.optimistic_bob_close(ctx))?;
            demo.record(receipt);
        }
        CloseMode::Pessimistic => {
            // Three off-chain updates; the last one moves the balance to the requested split.
            let seq = 3;
            let state = ChannelState::new(final_balance.alice, final_balance.bob, seq);
            let alice_sig = sign_state(&id, &state, &alice)?;
            let announcement = co_sign_announcement(&id, seq, &alice, &bob)?;
            for (i, key) in towers.iter().enumerate().take(threshold) {
                let receipt = demo.host.execute(&id, key.address(), Amount::ZERO, |c, ctx| {
                    c.watchtower_claim_state(ctx, &announcement, i)
                })?;
                demo.record(receipt);
            }
            let receipt = demo.host.execute(&id, bob.address(), Amount::ZERO, |c, ctx| {
                c.pessimistic_close(ctx, &state, &alice_sig, &[])
            })?;
            demo.record(receipt);
        }
    }

    let ledger = demo.host.ledger();
    let mut accounts = vec![
        AccountSummary {
            role: "Alice".into(),
            address: alice.address(),
            deposited: cmd.alice_deposit,
            received: ledger.balance(&alice.address()),
        },
        AccountSummary {
            role: "Bob".into(),
            address: bob.address(),
            deposited: cmd.bob_deposit,
            received: ledger.balance(&bob.address()),
        },
    ];
    accounts.extend(towers.iter().enumerate().map(|(i, key)| AccountSummary {
        role: format!("Watchtower {i}"),
        address: key.address(),
        deposited: cmd.collateral,
        received: ledger.balance(&key.address()),
    }));
    Ok(DemoReport {
        channel: id,
        mode: cmd.mode,
        fault_tolerance,
        threshold,
        initial,
        final_balance,
        accounts,
        events: demo.events,
    })
}
