//! Conformance tests for the in-memory shard.

use tsdb_cursor::{CursorType, config::ScanConfig, conformance::conformance, mem::MemShard};

#[test]
fn mem_shard_conformance() {
    conformance(&MemShard::new(1));
}

#[test]
fn mem_shard_conformance_batch_default() {
    let config = ScanConfig::new().with_default_cursor_type(CursorType::Batch).unwrap();
    conformance(&MemShard::with_config(1, config).with_batch_size(3));
}
