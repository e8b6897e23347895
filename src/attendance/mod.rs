pub mod scope;
pub mod stats;
pub mod timeframe;
