// Signing, co-signing and attestation benchmarks for the Keyward protocol.
//
// Covers Ed25519 keypair generation, author signing of events, guardian
// co-signatures, quorum evaluation at various guardian counts, and private
// attestation building (pseudonym derivation plus encryption).

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use keyward_protocol::attestation::{Attestation, AttestationSecret};
use keyward_protocol::cosign::{attach_co_signatures, sign_co_signature};
use keyward_protocol::crypto::keys::Keypair;
use keyward_protocol::event::Event;
use keyward_protocol::migration::KeyMigrationAndRevocation;
use keyward_protocol::recovery::{evaluate_quorum, RecoveryKeysSetup};

fn migration_for(subject: &Keypair, setup_id: &str) -> Event {
    KeyMigrationAndRevocation::migration(
        subject.public_key_hex(),
        Keypair::generate().public_key_hex(),
        setup_id,
        "benchmark migration",
    )
    .to_event(1_725_402_774)
    .unwrap()
}

fn bench_keypair_generation(c: &mut Criterion) {
    c.bench_function("ed25519/keypair_generate", |b| {
        b.iter(Keypair::generate);
    });
}

fn bench_sign_event(c: &mut Criterion) {
    let subject = Keypair::generate();
    let event = migration_for(&subject, &"dd".repeat(32));

    c.bench_function("event/sign", |b| {
        b.iter(|| {
            let mut evt = event.clone();
            evt.sign(&subject).unwrap();
            evt
        });
    });
}

fn bench_co_sign(c: &mut Criterion) {
    let subject = Keypair::generate();
    let guardian = Keypair::generate();
    let secret = guardian.secret_key_hex();
    let event = migration_for(&subject, &"dd".repeat(32));

    c.bench_function("cosign/sign", |b| {
        b.iter(|| sign_co_signature(&event, &secret).unwrap());
    });
}

fn bench_quorum(c: &mut Criterion) {
    let mut group = c.benchmark_group("recovery/evaluate_quorum");

    for size in [3usize, 7, 15] {
        let subject = Keypair::generate();
        let guardians: Vec<Keypair> = (0..size).map(|_| Keypair::generate()).collect();
        let mut setup = RecoveryKeysSetup::new(
            guardians.iter().map(Keypair::public_key_hex),
            (size / 2 + 1) as u64,
            "",
        )
        .to_event(1_725_402_764)
        .unwrap();
        setup.sign(&subject).unwrap();

        let migration = migration_for(&subject, &setup.id);
        let sigs: Vec<String> = guardians
            .iter()
            .map(|g| sign_co_signature(&migration, &g.secret_key_hex()).unwrap())
            .collect();
        let migration = attach_co_signatures(migration, sigs);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(size),
            &(migration, setup),
            |b, (migration, setup)| {
                b.iter(|| evaluate_quorum(migration, setup).unwrap());
            },
        );
    }

    group.finish();
}

fn bench_private_attestation(c: &mut Criterion) {
    let secret = AttestationSecret::generate();
    let attestation = Attestation::key_migration("aa".repeat(32), "bb".repeat(32), "cc".repeat(32))
        .with_secret(secret);

    c.bench_function("attestation/build_private", |b| {
        b.iter(|| attestation.to_event(1_725_402_765).unwrap());
    });
}

criterion_group!(
    benches,
    bench_keypair_generation,
    bench_sign_event,
    bench_co_sign,
    bench_quorum,
    bench_private_attestation,
);
criterion_main!(benches);
