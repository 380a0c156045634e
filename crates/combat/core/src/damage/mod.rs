//! Damage types, parsed defenses and the resolution pipeline.
mod defenses;
mod pipeline;
mod types;

pub use defenses::{DefensePhrase, Defenses, PhraseTypes};
pub use pipeline::{
    DamageApplication, DamageContext, DamageSummary, FlatReduction, ResolvedDamage, resolve_damage,
};
pub use types::DamageType;
