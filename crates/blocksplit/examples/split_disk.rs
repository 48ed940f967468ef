//! Split a disk into weighted blocks and print the achieved fractions.
//!
//! Usage: `cargo run -p blocksplit --example split_disk -- 0.2 0.3 0.5`

use blocksplit::prelude::*;
use geo::coord;

fn main() {
    let weights: Vec<f64> = std::env::args()
        .skip(1)
        .map(|a| a.parse().expect("weights must be numbers"))
        .collect();
    let weights = if weights.is_empty() {
        vec![0.25; 4]
    } else {
        weights
    };

    let region = Region::from_polygon(circle_with_area(coord! { x: 0.0, y: 0.0 }, 100.0, 64))
        .expect("disk is a valid region");
    let mut splitter = BlockSplitter::new(region, weights, 0.05).expect("valid inputs");
    splitter.prepare().expect("prepare");
    let splits = splitter.optimize().expect("optimize").to_vec();
    println!("splits: {splits:?}");
    for seg in splitter.summary().expect("optimized") {
        println!(
            "segment {}: target {:.3} achieved {:.3} ({} cells, area {:.3})",
            seg.index, seg.target, seg.fraction, seg.cells, seg.area
        );
    }
}
