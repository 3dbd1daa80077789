//! `prodintel-scoring`
//!
//! **Responsibility:** priority classification of merged, aggregated products.
//!
//! - It reads master products and the shared competitor context; it never mutates them.
//! - It emits **scored output records**, one per input product, in input order.

pub mod classifier;
pub mod context;
pub mod result;

pub use classifier::{FactorScores, PriorityClassifier, SIGNAL_SCORE, ScoringThresholds, tier_for};
pub use context::{CompetitorContext, ErosionSource, resolve_price_erosion};
pub use result::{
    Priority, RECOMMEND_BOTH, RECOMMEND_MONITOR, RECOMMEND_PRICING, RECOMMEND_RESTOCK, ScoredProduct,
};
