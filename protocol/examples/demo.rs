//! Interactive walkthrough of the Keyward key lifecycle.
//!
//! Alice registers three guardians, loses her key, migrates to a new one
//! with two guardian co-signatures, and an attestor publishes both a
//! private and a public attestation of what happened. The output uses ANSI
//! escape codes for colored, storytelling-style terminal rendering.
//!
//! Run with:
//!   cargo run --example demo --release

use std::time::Instant;

use keyward_protocol::event::unix_now;
use keyward_protocol::prelude::*;

// ---------------------------------------------------------------------------
// ANSI color constants
// ---------------------------------------------------------------------------

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const MAGENTA: &str = "\x1b[35m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";
const RED: &str = "\x1b[31m";

const BG_BLUE: &str = "\x1b[44m";

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

fn banner() {
    println!();
    println!(
        "{BG_BLUE}{BOLD}{WHITE}                                                                    {RESET}"
    );
    println!(
        "{BG_BLUE}{BOLD}{WHITE}    KEYWARD  --  Key Migration & Social Recovery Demo               {RESET}"
    );
    println!(
        "{BG_BLUE}{BOLD}{WHITE}    Version {:<8}|  Ed25519 + ChaCha20/HMAC-SHA256                 {RESET}",
        keyward_protocol::config::PROTOCOL_VERSION
    );
    println!(
        "{BG_BLUE}{BOLD}{WHITE}                                                                    {RESET}"
    );
    println!();
}

fn section(num: u32, title: &str) {
    println!();
    println!(
        "{BOLD}{CYAN}===[{YELLOW} Step {num} {CYAN}]=============================================================={RESET}"
    );
    println!("{BOLD}{WHITE}  {title}{RESET}");
    println!(
        "{CYAN}------------------------------------------------------------------------{RESET}"
    );
}

fn subsection(text: &str) {
    println!("{DIM}{CYAN}  >> {text}{RESET}");
}

fn success(text: &str) {
    println!("{GREEN}  [OK] {text}{RESET}");
}

fn failure(text: &str) {
    println!("{RED}  [!!] {text}{RESET}");
}

fn info(label: &str, value: &str) {
    println!("{WHITE}  {BOLD}{label}:{RESET} {YELLOW}{value}{RESET}");
}

fn timing(label: &str, elapsed: std::time::Duration) {
    let ms = elapsed.as_secs_f64() * 1000.0;
    println!("{DIM}{MAGENTA}  [{label}: {ms:.2} ms]{RESET}");
}

fn key_display(name: &str, key: &str, color: &str) {
    let prefix = &key[..8];
    let suffix = &key[key.len().saturating_sub(8)..];
    println!("  {color}{BOLD}{name:<12}{RESET}  {DIM}{prefix}...{suffix}{RESET}");
}

fn tags_display(event: &Event) {
    for tag in &event.tags {
        let values: Vec<String> = tag
            .values()
            .iter()
            .map(|v| {
                if v.len() > 24 {
                    format!("{}...", &v[..16])
                } else {
                    v.clone()
                }
            })
            .collect();
        println!("    {BLUE}[{}]{RESET} {DIM}{}{RESET}", tag.name(), values.join(", "));
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() {
    banner();
    let mut now = unix_now();

    // -----------------------------------------------------------------------
    section(1, "Identities");
    subsection("Generating Ed25519 keypairs for Alice, her guardians and an attestor...");

    let alice = Keypair::generate();
    let guardians: Vec<Keypair> = (0..3).map(|_| Keypair::generate()).collect();
    let attestor = Keypair::generate();

    key_display("Alice", &alice.public_key_hex(), GREEN);
    for (i, g) in guardians.iter().enumerate() {
        key_display(&format!("Guardian {}", i + 1), &g.public_key_hex(), CYAN);
    }
    key_display("Attestor", &attestor.public_key_hex(), MAGENTA);

    // -----------------------------------------------------------------------
    section(2, "Recovery Setup (kind 51)");
    subsection("Alice names three guardians; any two may approve a migration...");

    let mut setup = RecoveryKeysSetup::new(
        guardians.iter().map(Keypair::public_key_hex),
        2,
        "My recovery circle",
    )
    .to_event(now)
    .expect("setup builds");
    setup.sign(&alice).expect("alice signs setup");
    tags_display(&setup);
    validate_recovery_keys_setup(&setup).expect("setup is valid");
    success("Setup signed and structurally valid");
    info("Setup id", &setup.id);

    // -----------------------------------------------------------------------
    section(3, "Private Attestation of the Setup (kind 30051)");
    subsection("The attestor records the setup without revealing whose it is...");

    let secret = AttestationSecret::generate();
    let start = Instant::now();
    let mut private = Attestation::for_recovery_setup(&setup)
        .expect("setup is attestable")
        .with_secret(secret.clone())
        .to_event(now)
        .expect("attestation builds");
    private.sign(&attestor).expect("attestor signs");
    timing("build + encrypt + sign", start.elapsed());
    tags_display(&private);
    info("Disclosure", &Disclosure::of(&private).to_string());
    info("Content length", &format!("{} chars", private.content.len()));

    // -----------------------------------------------------------------------
    section(4, "Key Migration (kind 50)");
    subsection("Alice loses her phone and moves to a fresh key...");

    now += 60;
    let fresh = Keypair::generate();
    key_display("New key", &fresh.public_key_hex(), GREEN);
    let migration = KeyMigrationAndRevocation::migration(
        alice.public_key_hex(),
        fresh.public_key_hex(),
        setup.id.clone(),
        "Lost my phone, moving to a new key",
    )
    .to_event(now)
    .expect("migration builds");

    subsection("Guardians 1 and 3 co-sign; guardian 2 is on holiday...");
    let start = Instant::now();
    let sigs: Vec<String> = [&guardians[0], &guardians[2]]
        .iter()
        .map(|g| sign_co_signature(&migration, &g.secret_key_hex()).expect("guardian signs"))
        .collect();
    timing("2 co-signatures", start.elapsed());
    let mut migration = attach_co_signatures(migration, sigs);
    migration.sign(&alice).expect("alice signs migration");
    tags_display(&migration);
    validate_key_migration_and_revocation(&migration).expect("migration is valid");
    success("Migration signed and structurally valid");

    // -----------------------------------------------------------------------
    section(5, "Quorum");
    subsection("Counting distinct registered guardians with a valid co-signature...");

    let report = evaluate_quorum(&migration, &setup).expect("quorum evaluates");
    info(
        "Approvals",
        &format!(
            "{} of {} (threshold {})",
            report.approval_count(),
            report.guardian_count,
            report.threshold
        ),
    );
    if report.is_satisfied() {
        success("Quorum reached: the new key is vouched for");
    } else {
        failure("Quorum not reached");
    }

    // -----------------------------------------------------------------------
    section(6, "Public Attestation of the Migration (kind 30050)");

    now += 60;
    let mut public = Attestation::for_migration(&migration)
        .expect("migration is attestable")
        .to_event(now)
        .expect("attestation builds");
    public.sign(&attestor).expect("attestor signs");
    tags_display(&public);
    let bundle = read_public_attestation(AttestationKind::KeyMigration, &public)
        .expect("public attestation reads");
    key_display("Attested", &bundle.payload, GREEN);

    // -----------------------------------------------------------------------
    section(7, "Opening the Private Attestation");
    subsection("Only holders of the attestor's secret can read it...");

    let opened = open_private_attestation(AttestationKind::RecoveryKeys, &private, &secret)
        .expect("secret opens attestation");
    key_display("Subject", &opened.subject_key, GREEN);
    success("Decrypted bundle matches the setup and its pseudonym");

    let wrong = AttestationSecret::generate();
    match open_private_attestation(AttestationKind::RecoveryKeys, &private, &wrong) {
        Ok(_) => failure("A random secret opened the attestation?!"),
        Err(e) => success(&format!("A random secret is refused ({})", e.code())),
    }

    println!();
    println!("{BOLD}{GREEN}  Done.{RESET}");
    println!();
}
