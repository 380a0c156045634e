//! Reaction budget checks and trigger detection.
//!
//! Every creature has one reaction per round. The tracker never blocks: it
//! emits [`ReactionPrompt`]s with an expiry taken from the caller's clock,
//! and the host resolves whatever the player or AI picks with a follow-up
//! call.

use crate::conditions::ConditionSet;
use crate::config::EngineConfig;
use crate::error::{CombatError, ErrorSeverity};
use crate::features::{Feature, FeatureSet};
use crate::geometry::Point;
use crate::state::{EntityId, Token, TurnState};

use super::{ReactionKind, ReactionPrompt, ReactionTrigger};

/// A creature that might react, with its round state at call time.
#[derive(Clone, Copy, Debug)]
pub struct ReactionCandidate<'a> {
    pub token: &'a Token,
    pub turn: &'a TurnState,
    pub conditions: &'a ConditionSet,
    /// Highest spell slot level still available, 0 for none.
    pub highest_slot: u8,
}

impl ReactionCandidate<'_> {
    pub fn can_react(&self) -> bool {
        can_react(self.turn, self.conditions)
    }

    fn reactions_for(&self, trigger: ReactionTrigger) -> Vec<ReactionKind> {
        let min_slot = match trigger {
            ReactionTrigger::SpellCast => EngineConfig::COUNTERSPELL_MIN_SLOT,
            _ => 1,
        };
        available_reactions(
            trigger,
            &self.token.features,
            &self.token.known_abilities,
            self.highest_slot >= min_slot,
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ReactionError {
    #[error("reaction already used this round")]
    AlreadyUsed,
}

impl CombatError for ReactionError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyUsed => "REACTION_ALREADY_USED",
        }
    }
}

/// Reaction unused this round and no incapacitating condition.
pub fn can_react(turn: &TurnState, conditions: &ConditionSet) -> bool {
    turn.reaction_available() && !conditions.cannot_react()
}

/// Reactions a creature could take for a trigger.
///
/// Spells (Shield, Counterspell, Absorb Elements, Hellish Rebuke) also need
/// `has_resource`; feat reactions only need the feat.
pub fn available_reactions(
    trigger: ReactionTrigger,
    features: &FeatureSet,
    known_abilities: &FeatureSet,
    has_resource: bool,
) -> Vec<ReactionKind> {
    let knows = |feature: Feature| known_abilities.contains(&feature) || features.contains(&feature);
    let spell = |feature: Feature, kind: ReactionKind| (has_resource && knows(feature)).then_some(kind);

    match trigger {
        ReactionTrigger::LeavesReach => {
            let mut kinds = vec![ReactionKind::OpportunityAttack];
            if features.contains(&Feature::WarCaster) {
                kinds.push(ReactionKind::WarCasterSpell);
            }
            kinds
        }
        ReactionTrigger::HitByAttack => spell(Feature::Shield, ReactionKind::Shield)
            .into_iter()
            .collect(),
        ReactionTrigger::SpellCast => spell(Feature::Counterspell, ReactionKind::Counterspell)
            .into_iter()
            .collect(),
        ReactionTrigger::ElementalDamage => spell(Feature::AbsorbElements, ReactionKind::AbsorbElements)
            .into_iter()
            .collect(),
        ReactionTrigger::Damaged => spell(Feature::HellishRebuke, ReactionKind::HellishRebuke)
            .into_iter()
            .collect(),
        ReactionTrigger::AllyAttacked => features
            .contains(&Feature::Sentinel)
            .then_some(ReactionKind::Sentinel)
            .into_iter()
            .collect(),
    }
}

/// Marks the reaction as spent for the round.
pub fn use_reaction(turn: &mut TurnState) -> Result<(), ReactionError> {
    if turn.spend_reaction() {
        Ok(())
    } else {
        Err(ReactionError::AlreadyUsed)
    }
}

/// Trigger detection parameterized by engine configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReactionTracker {
    prompt_timeout_ms: u64,
    counterspell_radius_ft: f64,
}

impl ReactionTracker {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            prompt_timeout_ms: config.prompt_timeout_ms,
            counterspell_radius_ft: config.counterspell_radius_ft,
        }
    }

    /// Prompts for hostiles whose reach the mover leaves on `from -> to`.
    ///
    /// A hostile that is itself disengaging is skipped.
    // TODO: the disengage exemption belongs to the mover; switch once hosts
    // stop relying on the hostile-side flag.
    pub fn check_opportunity_attack(
        &self,
        mover: &Token,
        from: Point,
        to: Point,
        hostiles: &[ReactionCandidate<'_>],
        cell_ft: f64,
        now_ms: u64,
    ) -> Vec<ReactionPrompt> {
        let before = mover.footprint_at(from);
        let after = mover.footprint_at(to);

        hostiles
            .iter()
            .filter(|h| h.token.id != mover.id && h.token.is_hostile_to(mover))
            .filter(|h| !h.turn.is_disengaging())
            .filter_map(|h| {
                let body = h.token.footprint();
                let reach = f64::from(h.token.reach_ft);
                let was_in_reach = body.distance_ft(&before, cell_ft) <= reach;
                let leaves = was_in_reach && body.distance_ft(&after, cell_ft) > reach;
                if !leaves || !h.can_react() {
                    return None;
                }
                let reactions = h.reactions_for(ReactionTrigger::LeavesReach);
                tracing::debug!("{} leaves reach of {}", mover.name, h.token.name);
                Some(self.prompt(
                    h.token,
                    ReactionTrigger::LeavesReach,
                    mover.id,
                    format!("{} is leaving {}'s reach", mover.name, h.token.name),
                    reactions,
                    now_ms,
                ))
            })
            .collect()
    }

    /// Prompts for candidates able to counter a spell cast from `position`.
    pub fn check_counterspell(
        &self,
        caster: &Token,
        position: Point,
        candidates: &[ReactionCandidate<'_>],
        cell_ft: f64,
        now_ms: u64,
    ) -> Vec<ReactionPrompt> {
        let origin = caster.footprint_at(position);

        candidates
            .iter()
            .filter(|c| c.token.id != caster.id)
            .filter(|c| c.token.footprint().distance_ft(&origin, cell_ft) <= self.counterspell_radius_ft)
            .filter(|c| c.can_react())
            .filter_map(|c| {
                let reactions = c.reactions_for(ReactionTrigger::SpellCast);
                if reactions.is_empty() {
                    return None;
                }
                Some(self.prompt(
                    c.token,
                    ReactionTrigger::SpellCast,
                    caster.id,
                    format!("{} is casting a spell", caster.name),
                    reactions,
                    now_ms,
                ))
            })
            .collect()
    }

    /// Prompt for a reactor that was just hit (Shield) or damaged.
    pub fn check_reactive_spell(
        &self,
        trigger: ReactionTrigger,
        reactor: &ReactionCandidate<'_>,
        source: EntityId,
        description: impl Into<String>,
        now_ms: u64,
    ) -> Option<ReactionPrompt> {
        if !reactor.can_react() {
            return None;
        }
        let reactions = reactor.reactions_for(trigger);
        (!reactions.is_empty()).then(|| {
            self.prompt(
                reactor.token,
                trigger,
                source,
                description.into(),
                reactions,
                now_ms,
            )
        })
    }

    fn prompt(
        &self,
        reactor: &Token,
        trigger: ReactionTrigger,
        source: EntityId,
        description: String,
        reactions: Vec<ReactionKind>,
        now_ms: u64,
    ) -> ReactionPrompt {
        ReactionPrompt {
            entity: reactor.id,
            entity_name: reactor.name.clone(),
            trigger,
            source,
            description,
            reactions,
            issued_at_ms: now_ms,
            expires_at_ms: now_ms.saturating_add(self.prompt_timeout_ms),
        }
    }
}
