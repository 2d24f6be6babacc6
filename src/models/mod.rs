pub mod import;
pub mod item;

pub use import::{
    CandidateItem, CommitDecision, DuplicateAction, DuplicateCandidateMatch, DuplicateSuggestion,
};
pub use item::{
    next_status, status_for_new, InventoryRecord, InventoryStatus, NewInventoryRecord,
};
