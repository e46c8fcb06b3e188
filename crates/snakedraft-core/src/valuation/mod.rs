// Valuation engine: positional scarcity and pick recommendations.

pub mod recommend;
pub mod scarcity;
