//! Generates a uniform pairs document, parses it back and compares the mean
//! haversine distance computed from the parsed tree with the one computed while
//! generating.
//!
//! ```text
//! cargo run --example haversine_sum -- [seed] [pair_count]
//! ```
//!
//! Set `RUST_LOG=debug` to see arena usage.
#![allow(missing_docs)]

use std::{error::Error, fmt::Write};

use haversine_json::{ParserOptions, ValueRef, parse};
use rand::{Rng, SeedableRng, rngs::StdRng};

const EARTH_RADIUS: f64 = 6372.8;

fn haversine(x0: f64, y0: f64, x1: f64, y1: f64, earth_radius: f64) -> f64 {
    let d_lat = (y1 - y0).to_radians();
    let d_lon = (x1 - x0).to_radians();
    let lat0 = y0.to_radians();
    let lat1 = y1.to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat0.cos() * lat1.cos() * (d_lon / 2.0).sin().powi(2);
    earth_radius * 2.0 * a.sqrt().asin()
}

/// Writes `count` pairs and returns the document with its reference sum.
fn generate(seed: u64, count: usize) -> Result<(String, f64), std::fmt::Error> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut json = String::from("{\"pairs\":[\n");
    let mut sum = 0.0;
    for i in 0..count {
        let [x0, y0, x1, y1]: [f64; 4] = core::array::from_fn(|_| rng.random::<f64>() * 180.0);
        write!(
            json,
            "  {{\"x0\":{x0:.16}, \"y0\":{y0:.16}, \"x1\":{x1:.16}, \"y1\":{y1:.16}}}"
        )?;
        if i + 1 != count {
            json.push_str(",\n");
        }
        sum += haversine(x0, y0, x1, y1, EARTH_RADIUS);
    }
    json.push_str("\n]}");
    Ok((json, sum))
}

fn coordinate(pair: haversine_json::ObjectRef<'_>, key: &str) -> Result<f64, String> {
    pair.get(key)
        .and_then(ValueRef::as_number)
        .ok_or_else(|| format!("pair is missing numeric `{key}`"))
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed: u64 = args.next().map_or(Ok(1234), |s| s.parse())?;
    let count: usize = args.next().map_or(Ok(10_000), |s| s.parse())?;

    let (json, reference) = generate(seed, count)?;
    let doc = parse(json.as_bytes(), ParserOptions::default())?;

    let pairs = doc
        .root()
        .get("pairs")
        .and_then(ValueRef::as_array)
        .ok_or("document has no `pairs` array")?;

    let mut sum = 0.0;
    for pair in pairs.iter() {
        let pair = pair.as_object().ok_or("pair is not an object")?;
        sum += haversine(
            coordinate(pair, "x0")?,
            coordinate(pair, "y0")?,
            coordinate(pair, "x1")?,
            coordinate(pair, "y1")?,
            EARTH_RADIUS,
        );
    }

    let usage = doc.arena_usage();
    println!("Input size: {}", json.len());
    println!("Pair count: {}", pairs.len());
    // Pair counts stay far below 2^52.
    #[expect(clippy::cast_precision_loss)]
    let divisor = count.max(1) as f64;
    println!("Average distance: {:.16}", sum / divisor);
    println!();
    println!("Validation:");
    println!("Reference average: {:.16}", reference / divisor);
    println!("Difference: {:.16}", (sum - reference) / divisor);
    println!();
    for arena in [usage.tokens, usage.literals, usage.keys, usage.values] {
        println!(
            "{:>8}: {} of {} used, {} bytes held",
            arena.name, arena.used, arena.capacity, arena.reserved_bytes
        );
    }
    Ok(())
}
