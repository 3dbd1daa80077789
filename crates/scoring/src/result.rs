use serde::{Deserialize, Serialize};

use prodintel_products::MasterProduct;

/// Operational priority tier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl core::fmt::Display for Priority {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const RECOMMEND_BOTH: &str = "Address stockout risk and price erosion";
pub const RECOMMEND_RESTOCK: &str = "Restock inventory (high sales velocity)";
pub const RECOMMEND_PRICING: &str = "Optimize pricing (favorable market opportunity)";
pub const RECOMMEND_MONITOR: &str = "Monitor";

/// Terminal engine output: the merged product plus its classification.
///
/// This is an insight record, not a mutation of the master data; it is
/// immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredProduct {
    #[serde(flatten)]
    product: MasterProduct,
    risk_score: u32,
    opportunity_score: u32,
    total_score: u32,
    priority: Priority,
    recommendation: String,
}

impl ScoredProduct {
    pub(crate) fn new(
        product: MasterProduct,
        risk_score: u32,
        opportunity_score: u32,
        priority: Priority,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            product,
            risk_score,
            opportunity_score,
            total_score: risk_score + opportunity_score,
            priority,
            recommendation: recommendation.into(),
        }
    }

    pub fn product(&self) -> &MasterProduct {
        &self.product
    }

    pub fn risk_score(&self) -> u32 {
        self.risk_score
    }

    pub fn opportunity_score(&self) -> u32 {
        self.opportunity_score
    }

    pub fn total_score(&self) -> u32 {
        self.total_score
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn recommendation(&self) -> &str {
        &self.recommendation
    }
}
