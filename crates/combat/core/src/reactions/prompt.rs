use crate::state::EntityId;

/// Event that opens a reaction window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReactionTrigger {
    /// A hostile leaves the reactor's reach.
    #[strum(to_string = "leaves reach")]
    LeavesReach,
    /// A creature casts a spell nearby.
    #[strum(to_string = "spell cast")]
    SpellCast,
    /// The reactor is hit by an attack.
    #[strum(to_string = "hit by attack")]
    HitByAttack,
    /// The reactor takes acid, cold, fire, lightning or thunder damage.
    #[strum(to_string = "elemental damage")]
    ElementalDamage,
    /// The reactor is damaged by a creature it can see.
    #[strum(to_string = "damaged")]
    Damaged,
    /// A creature within 5 ft attacks someone other than the reactor.
    #[strum(to_string = "ally attacked")]
    AllyAttacked,
}

/// A reaction a creature can take.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReactionKind {
    #[strum(to_string = "Opportunity Attack")]
    OpportunityAttack,
    Shield,
    Counterspell,
    #[strum(to_string = "Absorb Elements")]
    AbsorbElements,
    #[strum(to_string = "Hellish Rebuke")]
    HellishRebuke,
    Sentinel,
    /// War Caster: cast a spell instead of an opportunity attack.
    #[strum(to_string = "War Caster Spell")]
    WarCasterSpell,
}

/// An advisory offer to react, consumed by the host's UI or AI.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReactionPrompt {
    pub entity: EntityId,
    pub entity_name: String,
    pub trigger: ReactionTrigger,
    /// Creature that caused the trigger.
    pub source: EntityId,
    pub description: String,
    pub reactions: Vec<ReactionKind>,
    pub issued_at_ms: u64,
    pub expires_at_ms: u64,
}

impl ReactionPrompt {
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at_ms
    }

    pub fn offers(&self, kind: ReactionKind) -> bool {
        self.reactions.contains(&kind)
    }
}
