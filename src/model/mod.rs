//! Portfolio data model.
//!
//! This module provides:
//! - The asset universe that fixes vector and matrix indexing
//! - Return samples and the moment estimates derived from them
//! - Weight constraints and portfolios

mod constraints;
mod moments;
mod portfolio;
mod universe;

pub use constraints::{Constraints, LinearInequality};
pub use moments::{MomentEstimate, ReturnSample};
pub use portfolio::{Holding, Portfolio};
pub use universe::AssetUniverse;
