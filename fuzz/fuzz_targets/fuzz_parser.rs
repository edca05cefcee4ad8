#![no_main]
use haversine_json::{ArenaCapacities, ParserOptions, ValueRef, parse};
use libfuzzer_sys::fuzz_target;

const HEADER: usize = 1; // 1 flag byte

/// Walks the whole tree so every handle gets resolved at least once.
fn visit(value: ValueRef<'_>) -> usize {
    match value {
        ValueRef::Number(_) | ValueRef::String(_) => 1,
        ValueRef::Object(object) => object.values().map(visit).sum::<usize>() + 1,
        ValueRef::Array(array) => array.iter().map(visit).sum::<usize>() + 1,
    }
}

fn parser(data: &[u8]) {
    if data.len() < HEADER {
        return;
    }

    let flags = data[0];
    let data = &data[HEADER..];

    // Low bits pick tiny arenas so exhaustion paths get exercised too.
    let capacities = (flags & 1 != 0).then(|| ArenaCapacities {
        tokens: usize::from(flags >> 1 & 0x0F) * 4,
        literal_bytes: usize::from(flags >> 5) * 16,
        tree_slots: usize::from(flags >> 3) * 10,
    });

    let options = ParserOptions {
        capacities,
        allow_trailing_tokens: flags & 2 != 0,
        max_depth: 64,
        panic_on_error: false,
    };

    if let Ok(doc) = parse(data, options) {
        let root = doc.root();
        let _ = root.iter().map(|(_, v)| visit(v)).sum::<usize>();
        let _ = doc.dump_tokens().to_string();
        let usage = doc.arena_usage();
        assert!(usage.keys.used <= usage.keys.capacity);
        assert!(usage.values.used <= usage.values.capacity);
    }
}

fuzz_target!(|data: &[u8]| parser(data));
