//! Efficient Frontier Example
//!
//! Four assets with known moments:
//!
//! minimize    w' Σ w                (minimize risk)
//! subject to  μ' w == r             (return level)
//!             sum(w) = 1            (fully invested)
//!             w >= 0                (long-only)
//!
//! swept over `r`, then matched against a return and a risk target.

use efficient_frontier::prelude::*;
use nalgebra::{DMatrix, DVector};

fn main() -> Result<()> {
    println!("=== Efficient Frontier ===\n");

    let universe = AssetUniverse::new(["A", "B", "C", "D"])?;
    let mu = DVector::from_vec(vec![0.12, 0.10, 0.07, 0.05]);

    #[rustfmt::skip]
    let sigma = DMatrix::from_row_slice(4, 4, &[
        0.04,  0.01,  0.00, -0.01,
        0.01,  0.03,  0.00,  0.00,
        0.00,  0.00,  0.02,  0.00,
        -0.01,  0.00,  0.00,  0.01,
    ]);

    let moments = MomentEstimate::from_parts(mu, sigma)?;
    let constraints = Constraints::long_only(universe.len());
    let builder = FrontierBuilder::new(&moments, &constraints)?;

    println!("Assets: A, B, C, D");
    println!("Expected returns: [12%, 10%, 7%, 5%]\n");

    let frontier = builder.build(8)?;
    for point in frontier.iter() {
        println!(
            "  Return: {:5.2}%  →  Risk: {:5.2}%",
            point.expected_return * 100.0,
            point.risk * 100.0
        );
    }

    let matcher = TargetMatcher::new(builder)?;

    println!("\n--- Target return 9% ---\n");
    let hit = matcher.by_return(0.09)?;
    for holding in hit.point.portfolio.holdings(&universe, 1e-4) {
        println!("  Asset {}: {:.2}%", holding.asset, holding.weight_pct);
    }
    println!("  Risk (std dev): {:.2}%", hit.point.risk * 100.0);

    println!("\n--- Target risk 15% ---\n");
    let hit = matcher.by_risk(0.15)?;
    println!("  Expected return: {:.2}%", hit.point.expected_return * 100.0);
    println!("  Bisection steps: {}", hit.iterations);

    let hit = matcher.by_return(0.20)?;
    if let Some(warning) = hit.warning {
        println!("\n{}", warning);
    }

    Ok(())
}
