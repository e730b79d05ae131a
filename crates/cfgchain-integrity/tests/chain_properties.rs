//! Integrity properties of fingerprinted configuration chains.

use cfgchain_integrity::{
    compute_fingerprint, seal, verify_chain, verify_chain_with, BlockStatus, ChainExt,
    Fingerprinter,
};
use cfgchain_model::{Block, Chain, ChangeType, ConfigPayload, Timestamp, GENESIS_PREV_HASH};
use serde_json::{json, Value};
use std::collections::BTreeMap;

const H0: &str = "111a8d125334be8ebff7d0af8f866f9a33ef15c95fd2d03dd76e1b74514f3c23";
const H1: &str = "582627ab8576041abc12e825ec297453aecd04910cebafb3e1ca1ade4a216b60";

fn payload(version: u64, config: &str) -> ConfigPayload {
    ConfigPayload {
        device_id: "RTR01-NYC".to_string(),
        version,
        operator: "operator1".to_string(),
        config: config.to_string(),
        diff: format!("+ line {version}"),
        change_type: if version == 1 {
            ChangeType::Initial
        } else {
            ChangeType::Update
        },
        summary: format!("change {version}"),
        analysis: String::new(),
        security_risks: String::new(),
        extra: BTreeMap::new(),
    }
}

fn build_chain(len: u64) -> Chain {
    let fp = Fingerprinter::default();
    let mut chain: Chain = Chain::new();
    for version in 1..=len {
        let stamp = Timestamp::from_raw(format!("2024-03-01T12:00:{version:02}.000Z"));
        let config = format!("hostname RTR01-NYC\ninterface Gi0/{version}\n!\nend");
        chain
            .append_payload(&fp, payload(version, &config), stamp)
            .unwrap();
    }
    chain
}

fn first_invalid(chain: &Chain) -> Option<usize> {
    verify_chain(chain, &Fingerprinter::default())
        .unwrap()
        .first_invalid
}

#[test]
fn test_fresh_chains_always_verify() {
    for len in [1, 2, 5, 20] {
        let chain = build_chain(len);
        let verdict = verify_chain(&chain, &Fingerprinter::default()).unwrap();
        assert!(verdict.all_valid, "chain of {len} blocks failed");
        assert_eq!(verdict.checked as u64, len);
    }
}

#[test]
fn test_every_field_change_moves_the_fingerprint() {
    let stamp = Timestamp::from_raw("2024-01-01T00:00:00Z");
    let base = compute_fingerprint(4, &stamp, &payload(2, "x"), "abc").unwrap();

    let variants = [
        compute_fingerprint(5, &stamp, &payload(2, "x"), "abc").unwrap(),
        compute_fingerprint(
            4,
            &Timestamp::from_raw("2024-01-01T00:00:01Z"),
            &payload(2, "x"),
            "abc",
        )
        .unwrap(),
        compute_fingerprint(4, &stamp, &payload(3, "x"), "abc").unwrap(),
        compute_fingerprint(4, &stamp, &payload(2, "y"), "abc").unwrap(),
        compute_fingerprint(4, &stamp, &payload(2, "x"), "abd").unwrap(),
    ];
    for variant in &variants {
        assert_ne!(variant, &base);
    }
}

#[test]
fn test_mutating_block_k_is_reported_at_k() {
    let len = 5;
    for k in 0..len {
        let mutations: [(&str, fn(&mut Block)); 6] = [
            ("index", |b| b.index += 10),
            ("timestamp", |b| {
                b.timestamp = Timestamp::from_raw("1999-12-31T23:59:59.000Z")
            }),
            ("config", |b| b.data.config.push_str("\nno shutdown")),
            ("operator", |b| b.data.operator = "mallory".to_string()),
            ("prev_hash", |b| b.prev_hash = "e".repeat(64)),
            ("hash", |b| b.hash.replace_range(0..1, "x")),
        ];
        for (field, mutate) in mutations {
            let mut chain = build_chain(len as u64);
            mutate(&mut chain.blocks[k]);
            assert_eq!(
                first_invalid(&chain),
                Some(k),
                "mutating {field} of block {k}"
            );
        }
    }
}

#[test]
fn test_payload_tamper_surfaces_both_digests() {
    let mut chain = build_chain(3);
    let stored = chain.blocks[2].hash.clone();
    chain.blocks[2].data.security_risks = "none".to_string();

    let mut last = None;
    verify_chain_with(&chain, &Fingerprinter::default(), |report| {
        last = Some(report.clone())
    })
    .unwrap();

    let report = last.unwrap();
    assert_eq!(report.position, 2);
    match report.status {
        BlockStatus::Tampered {
            stored: s,
            recomputed,
        } => {
            assert_eq!(s, stored);
            assert_eq!(
                recomputed,
                Fingerprinter::default()
                    .fingerprint_block(&chain.blocks[2])
                    .unwrap()
            );
        }
        other => panic!("expected tampered, got {other:?}"),
    }
}

#[test]
fn test_removed_block_breaks_the_link() {
    let mut chain = build_chain(4);
    chain.blocks.remove(1);
    // Index continuity is checked first.
    assert_eq!(first_invalid(&chain), Some(1));
}

#[test]
fn test_json_round_trip_preserves_validity() {
    let chain = build_chain(3);
    let json = serde_json::to_string(&chain).unwrap();
    let loaded: Chain = serde_json::from_str(&json).unwrap();
    assert!(verify_chain(&loaded, &Fingerprinter::default())
        .unwrap()
        .all_valid);
}

#[test]
fn test_foreign_payload_keys_keep_chain_valid() {
    let fp = Fingerprinter::default();
    let mut data = serde_json::to_value(payload(1, "hostname R1")).unwrap();
    data["ticket"] = json!({"id": 1042, "approved": true});

    let genesis: Block<Value> = seal(
        &fp,
        0,
        Timestamp::from_raw("2024-01-01T00:00:00.000Z"),
        data,
        GENESIS_PREV_HASH,
    )
    .unwrap();
    let raw = serde_json::to_string(&vec![genesis]).unwrap();

    let typed: Chain = serde_json::from_str(&raw).unwrap();
    assert!(typed.blocks[0].data.extra.contains_key("ticket"));
    assert!(verify_chain(&typed, &fp).unwrap().all_valid);
}

#[test]
fn test_reference_scenario() {
    let fp = Fingerprinter::default();
    let genesis = seal(
        &fp,
        0,
        Timestamp::from_raw("2024-01-01T00:00:00Z"),
        json!({"config": "hostname R1"}),
        GENESIS_PREV_HASH,
    )
    .unwrap();
    assert_eq!(genesis.hash, H0);

    let second = seal(
        &fp,
        1,
        Timestamp::from_raw("2024-01-02T00:00:00Z"),
        json!({"config": "hostname R1\ninterface Gi0/1"}),
        H0,
    )
    .unwrap();
    assert_eq!(second.hash, H1);

    let mut chain = Chain::from_blocks(vec![genesis, second]);
    assert!(verify_chain(&chain, &fp).unwrap().all_valid);

    chain.blocks[1].hash.replace_range(0..1, "6");
    let verdict = verify_chain(&chain, &fp).unwrap();
    assert!(!verdict.all_valid);
    assert_eq!(verdict.first_invalid, Some(1));
}
