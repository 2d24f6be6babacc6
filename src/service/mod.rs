pub mod normalizer;
pub mod recommend;
pub mod reconciler;
pub mod scorer;

pub use reconciler::ImportReconciler;
pub use scorer::MatchConfig;
