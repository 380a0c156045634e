//! Reaction prompts and the one-reaction-per-round budget.
mod prompt;
mod tracker;

pub use prompt::{ReactionKind, ReactionPrompt, ReactionTrigger};
pub use tracker::{
    ReactionCandidate, ReactionError, ReactionTracker, available_reactions, can_react, use_reaction,
};
