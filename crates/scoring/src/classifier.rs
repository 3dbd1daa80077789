//! Deterministic priority classification.
//!
//! Model:
//! - Risk: low stock while selling fast.
//! - Opportunity: cheap product in a market without meaningful price erosion.
//! - Each factor contributes `SIGNAL_SCORE` or nothing; the total picks a tier.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{error, info, trace};

use prodintel_core::{DomainError, DomainResult};
use prodintel_observability::EngineMetrics;
use prodintel_products::MasterProduct;

use crate::context::{CompetitorContext, resolve_price_erosion};
use crate::result::{
    Priority, RECOMMEND_BOTH, RECOMMEND_MONITOR, RECOMMEND_PRICING, RECOMMEND_RESTOCK, ScoredProduct,
};

/// Points a single triggered factor contributes.
pub const SIGNAL_SCORE: u32 = 10;

/// Configurable thresholds of the two-factor model.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringThresholds {
    /// Risk requires `current_stock` strictly below this.
    pub low_stock_threshold: i64,
    /// Risk requires `sales_velocity` strictly above this.
    pub high_velocity_threshold: i64,
    /// Opportunity requires `0 < price < max_opportunity_price`.
    pub max_opportunity_price: f64,
    /// Opportunity requires erosion (percent) strictly below this.
    pub max_price_erosion_pct: f64,
}

impl Default for ScoringThresholds {
    fn default() -> Self {
        Self {
            low_stock_threshold: 20,
            high_velocity_threshold: 100,
            max_opportunity_price: 150.0,
            max_price_erosion_pct: 5.0,
        }
    }
}

impl ScoringThresholds {
    pub fn validate(&self) -> DomainResult<()> {
        if !(self.max_opportunity_price.is_finite() && self.max_opportunity_price > 0.0) {
            return Err(DomainError::validation(
                "max_opportunity_price must be a finite positive number",
            ));
        }
        if !(self.max_price_erosion_pct.is_finite() && self.max_price_erosion_pct >= 0.0) {
            return Err(DomainError::validation(
                "max_price_erosion_pct must be a finite non-negative number",
            ));
        }
        if self.low_stock_threshold < 0 || self.high_velocity_threshold < 0 {
            return Err(DomainError::validation("stock and velocity thresholds must be non-negative"));
        }
        Ok(())
    }
}

/// Factor scores for one product, before tiering.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FactorScores {
    pub risk: u32,
    pub opportunity: u32,
}

/// Map factor scores to a tier and recommendation.
///
/// Only totals of 0, `SIGNAL_SCORE` and `2 * SIGNAL_SCORE` with a matching
/// factor split are valid; anything else means the constants drifted.
pub fn tier_for(scores: FactorScores) -> DomainResult<(Priority, &'static str)> {
    const S: u32 = SIGNAL_SCORE;
    match (scores.risk, scores.opportunity) {
        (S, S) => Ok((Priority::High, RECOMMEND_BOTH)),
        (S, 0) => Ok((Priority::Medium, RECOMMEND_RESTOCK)),
        (0, S) => Ok((Priority::Medium, RECOMMEND_PRICING)),
        (0, 0) => Ok((Priority::Low, RECOMMEND_MONITOR)),
        (risk, opportunity) => Err(DomainError::invariant(format!(
            "unreachable score split risk={risk} opportunity={opportunity} (total={})",
            risk + opportunity
        ))),
    }
}

#[derive(Debug, Copy, Clone, Default)]
pub struct PriorityClassifier {
    thresholds: ScoringThresholds,
}

impl PriorityClassifier {
    pub fn new(thresholds: ScoringThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ScoringThresholds {
        &self.thresholds
    }

    /// Score both factors. Pure: reads only the product and the shared context.
    pub fn score(&self, product: &MasterProduct, context: &CompetitorContext) -> FactorScores {
        let t = &self.thresholds;

        let at_risk = product.current_stock() < t.low_stock_threshold
            && product.sales_velocity() > t.high_velocity_threshold;

        let price = product.internal_price();
        let (erosion, source) = resolve_price_erosion(context, product);
        let opportunity = price > 0.0 && price < t.max_opportunity_price && erosion < t.max_price_erosion_pct;

        trace!(
            product_id = %product.product_id(),
            price,
            erosion,
            erosion_source = ?source,
            at_risk,
            opportunity,
            "factors scored"
        );

        FactorScores {
            risk: if at_risk { SIGNAL_SCORE } else { 0 },
            opportunity: if opportunity { SIGNAL_SCORE } else { 0 },
        }
    }

    /// Classify one product into its terminal output record.
    ///
    /// An invalid score split panics in debug builds; release builds clamp to
    /// Low/"Monitor" and report it.
    pub fn classify(
        &self,
        product: MasterProduct,
        context: &CompetitorContext,
        metrics: &EngineMetrics,
    ) -> ScoredProduct {
        let scores = self.score(&product, context);
        let (priority, recommendation) = match tier_for(scores) {
            Ok(tier) => tier,
            Err(e) => {
                if cfg!(debug_assertions) {
                    panic!("scoring invariant violated for {}: {e}", product.product_id());
                }
                metrics.record_invariant_violation();
                error!(product_id = %product.product_id(), error = %e, "scoring invariant violated; clamping to Low");
                (Priority::Low, RECOMMEND_MONITOR)
            }
        };
        ScoredProduct::new(product, scores.risk, scores.opportunity, priority, recommendation)
    }

    /// Classify a whole batch in parallel; output order equals input order.
    pub fn classify_all(
        &self,
        products: Vec<MasterProduct>,
        context: &CompetitorContext,
        metrics: &EngineMetrics,
    ) -> Vec<ScoredProduct> {
        let scored: Vec<ScoredProduct> = products
            .into_par_iter()
            .map(|p| self.classify(p, context, metrics))
            .collect();

        let count = |tier: Priority| scored.iter().filter(|s| s.priority() == tier).count();
        info!(
            products = scored.len(),
            high = count(Priority::High),
            medium = count(Priority::Medium),
            low = count(Priority::Low),
            "products classified"
        );
        scored
    }
}
