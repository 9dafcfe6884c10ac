//! Shared Cache Unit Tests.
//!
//! Verifies address decomposition, hit/miss logic, victim reset, and the MESI
//! transitions taken by `Cache::access`. The cache is driven directly through
//! the `Bench` helper; no trace parsing is involved.

use std::collections::BTreeSet;

use fsim_core::Config;
use fsim_core::cache::Cache;
use fsim_core::cache::detector::Detection;
use fsim_core::cache::line::MesiState;
use pretty_assertions::assert_eq;

use crate::common::harness::{Bench, one_set};

// ══════════════════════════════════════════════════════════
// 1. Address decomposition
// ══════════════════════════════════════════════════════════

/// With 64-byte lines and 64 sets, line address N lands in set N % 64 with tag N.
#[test]
fn index_tag_uses_line_address() {
    let cache = Cache::new(&Config::default()).unwrap();
    assert_eq!(cache.index_tag(0x0), (0, 0));
    assert_eq!(cache.index_tag(0x40), (1, 1));
    assert_eq!(cache.index_tag(0x3F), (0, 0));
    // 64 lines later wraps to set 0 with a distinct tag.
    assert_eq!(cache.index_tag(64 * 64), (0, 64));
}

/// Word index is the 4-byte word within the 64-byte line.
#[test]
fn word_index_within_line() {
    let cache = Cache::new(&Config::default()).unwrap();
    assert_eq!(cache.word_index(0x0), 0);
    assert_eq!(cache.word_index(0x4), 1);
    assert_eq!(cache.word_index(0x3C), 15);
    assert_eq!(cache.word_index(0x44), 1);
}

#[test]
fn word_index_follows_word_size() {
    let config = Config {
        word_bytes: 8,
        ..Config::default()
    };
    let cache = Cache::new(&config).unwrap();
    assert_eq!(cache.word_index(0x4), 0);
    assert_eq!(cache.word_index(0x8), 1);
    assert_eq!(cache.word_index(0x38), 7);
}

// ══════════════════════════════════════════════════════════
// 2. Hits and misses
// ══════════════════════════════════════════════════════════

#[test]
fn cold_miss_then_hit() {
    let mut bench = Bench::new(&Config::default());

    let first = bench.write(0, 0x1000);
    assert!(!first.hit);
    assert_eq!(first.state, MesiState::Modified);

    let second = bench.write(0, 0x1008);
    assert!(second.hit, "same line, different offset must hit");

    assert_eq!(bench.stats.misses, 1);
    assert_eq!(bench.stats.hits, 1);
    // Miss latency only; the per-instruction hit latency is the runner's job.
    assert_eq!(bench.stats.stall_cycles, 40);
}

#[test]
fn read_miss_installs_exclusive() {
    let mut bench = Bench::new(&Config::default());
    let outcome = bench.read(3, 0x80);
    assert!(!outcome.hit);
    assert_eq!(outcome.state, MesiState::Exclusive);

    let line = bench.cache.lookup(0x80).unwrap();
    assert_eq!(line.tag, Some(2));
    assert_eq!(line.owner, Some(3));
    assert_eq!(line.sharers, BTreeSet::from([3]));
    assert_eq!(line.last_writer_core, Some(3), "ownership counts as a write for the detector");
}

/// A miss never finds a valid prior holder, so it never invalidates or consults history.
#[test]
fn miss_never_invalidates() {
    let mut bench = Bench::new(&one_set(1));
    let _ = bench.write(0, 0x0);
    let outcome = bench.write(1, 0x40);
    assert!(!outcome.hit);
    assert_eq!(outcome.detection, Detection::Idle);
    assert_eq!(outcome.invalidated, 0);
    assert_eq!(bench.stats.invalidations, 0);
}

#[test]
fn lookup_does_not_touch_replacement() {
    let mut bench = Bench::new(&one_set(2));
    let _ = bench.write(0, 0x0);
    for _ in 0..5 {
        assert!(bench.cache.lookup(0x0).is_some());
    }
    let _ = bench.write(0, 0x40);
    assert!(bench.cache.lookup(0x0).is_some());
    assert!(bench.cache.lookup(0x40).is_some());
}

// ══════════════════════════════════════════════════════════
// 3. Eviction
// ══════════════════════════════════════════════════════════

/// Round-robin rotates on hits too: after a hit on way 0 the cursor points at
/// way 1, so the next miss evicts the line there.
#[test]
fn round_robin_hit_advances_cursor() {
    let mut bench = Bench::new(&one_set(2));
    let _ = bench.read(0, 0x0); // way 0
    let _ = bench.read(0, 0x40); // way 1
    let _ = bench.read(0, 0x0); // hit, cursor -> 1
    let _ = bench.read(0, 0x80); // evicts way 1

    assert!(bench.cache.lookup(0x0).is_some());
    assert!(bench.cache.lookup(0x40).is_none());
    assert!(bench.cache.lookup(0x80).is_some());
}

#[test]
fn evicted_slot_resets_coherence_but_keeps_history() {
    let mut bench = Bench::new(&one_set(1));
    let _ = bench.write(0, 0x0);
    let _ = bench.write(1, 0x4); // conflict on word 1, conf = 1
    let _ = bench.read(2, 0x40); // evicts line 0

    let line = &bench.cache.lines()[0];
    assert_eq!(line.tag, Some(1));
    assert_eq!(line.state, MesiState::Exclusive);
    assert_eq!(line.owner, Some(2));
    assert_eq!(line.sharers, BTreeSet::from([2]));
    assert_eq!(line.fs_conf, 1);
    assert_eq!(line.last_writer_core, Some(2));
}

#[test]
fn probe_on_miss_returns_invalid_victim() {
    let mut cache = Cache::new(&one_set(2)).unwrap();
    let probe = cache.probe(0x0);
    assert!(!probe.hit);
    assert_eq!(probe.way, 0);
    let victim = &cache.set(0)[probe.way];
    assert_eq!(victim.tag, None);
    assert_eq!(victim.state, MesiState::Invalid);
}

// ══════════════════════════════════════════════════════════
// 4. Coherence transitions
// ══════════════════════════════════════════════════════════

#[test]
fn write_hit_by_owner_stays_modified() {
    let mut bench = Bench::new(&Config::default());
    let _ = bench.write(0, 0x0);
    let outcome = bench.write(0, 0x0);
    assert_eq!(outcome.detection, Detection::Idle);
    assert_eq!(outcome.state, MesiState::Modified);
    assert_eq!(bench.stats.invalidations, 0);
}

#[test]
fn write_hit_by_remote_invalidates_owner() {
    let mut bench = Bench::new(&Config::default());
    let _ = bench.write(0, 0x0);
    let outcome = bench.write(1, 0x0);

    assert!(outcome.hit);
    assert_eq!(outcome.invalidated, 1);
    assert_eq!(bench.stats.invalidations, 1);
    assert_eq!(bench.stats.stall_cycles, 40 + 10);

    let line = bench.cache.lookup(0x0).unwrap();
    assert_eq!(line.state, MesiState::Modified);
    assert_eq!(line.owner, Some(1));
    assert_eq!(line.sharers, BTreeSet::from([1]));
}

/// Invalidation count is the number of other sharers, not a flat 1.
#[test]
fn write_hit_invalidates_every_other_sharer() {
    let mut bench = Bench::new(&Config::default());
    let _ = bench.read(0, 0x0);
    let _ = bench.read(1, 0x0);
    let _ = bench.read(2, 0x0);
    let outcome = bench.write(3, 0x0);

    assert_eq!(outcome.invalidated, 3);
    assert_eq!(bench.stats.stall_cycles, 40 + 10, "one invalidation latency per event");
    assert_eq!(bench.cache.lookup(0x0).unwrap().sharers, BTreeSet::from([3]));
}

/// The owner upgrading a Shared line still removes the other copies.
#[test]
fn owner_write_on_shared_line_invalidates_readers() {
    let mut bench = Bench::new(&Config::default());
    let _ = bench.read(0, 0x0);
    let _ = bench.read(1, 0x8);
    let outcome = bench.write(0, 0x0);

    assert_eq!(outcome.invalidated, 1);
    assert_eq!(outcome.detection, Detection::Benign, "same core as the last writer");
    let line = bench.cache.lookup(0x0).unwrap();
    assert_eq!(line.state, MesiState::Modified);
    assert_eq!(line.sharers, BTreeSet::from([0]));
}

#[test]
fn read_hit_on_remote_modified_downgrades_to_shared() {
    let mut bench = Bench::new(&Config::default());
    let _ = bench.write(0, 0x0);
    let outcome = bench.read(1, 0x4);

    assert_eq!(outcome.invalidated, 1);
    assert_eq!(outcome.state, MesiState::Shared);
    let line = bench.cache.lookup(0x0).unwrap();
    assert_eq!(line.owner, Some(0), "previous owner keeps its copy");
    assert_eq!(line.sharers, BTreeSet::from([0, 1]));
    assert_eq!(line.last_writer_core, Some(0), "a read does not take ownership");
    assert_eq!(line.last_word, 0);
}

#[test]
fn exclusive_downgrades_on_second_sharer() {
    let mut bench = Bench::new(&Config::default());
    let _ = bench.read(0, 0x0);
    assert_eq!(bench.read(0, 0x0).state, MesiState::Exclusive);
    assert_eq!(bench.read(1, 0x0).state, MesiState::Shared);
    assert_eq!(bench.stats.invalidations, 0);
}

#[test]
fn read_hit_on_shared_adds_sharer_without_detection() {
    let mut bench = Bench::new(&Config::default());
    let _ = bench.read(0, 0x0);
    let _ = bench.read(1, 0x0);
    let outcome = bench.read(2, 0x0);
    assert_eq!(outcome.detection, Detection::Idle);
    assert_eq!(bench.cache.lookup(0x0).unwrap().sharers, BTreeSet::from([0, 1, 2]));
}

#[test]
fn states_display_as_letters() {
    let rendered: Vec<String> = [
        MesiState::Modified,
        MesiState::Exclusive,
        MesiState::Shared,
        MesiState::Invalid,
    ]
    .iter()
    .map(ToString::to_string)
    .collect();
    assert_eq!(rendered, ["M", "E", "S", "I"]);
}

#[test]
fn write_records_writer_and_word() {
    let mut bench = Bench::new(&Config::default());
    let _ = bench.write(2, 0x1C);
    let line = bench.cache.lookup(0x0).unwrap();
    assert_eq!(line.last_writer_core, Some(2));
    assert_eq!(line.last_word, 7);
}
