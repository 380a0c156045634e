//! Fixed-order damage resolution.
//!
//! ```text
//! raw ─► flat reduction (clamp ≥ 0) ─► immune? ─► 0
//!                                        │
//!                                        └─► resistant? halve (floor) ─► vulnerable? double
//! ```
//!
//! Several sources within one category never stack: two resistances still
//! halve once.

use super::{DamageType, Defenses};

/// One raw damage contribution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageApplication {
    pub raw: u32,
    pub damage_type: DamageType,
    pub is_magical: bool,
    pub is_silvered: bool,
}

impl DamageApplication {
    pub const fn new(raw: u32, damage_type: DamageType) -> Self {
        Self {
            raw,
            damage_type,
            is_magical: false,
            is_silvered: false,
        }
    }

    #[must_use]
    pub const fn magical(mut self, is_magical: bool) -> Self {
        self.is_magical = is_magical;
        self
    }

    #[must_use]
    pub const fn silvered(mut self, is_silvered: bool) -> Self {
        self.is_silvered = is_silvered;
        self
    }
}

/// Flat reduction against nonmagical physical damage (Heavy Armor Master).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlatReduction {
    pub amount: u32,
}

impl FlatReduction {
    pub fn heavy_armor_master(proficiency_bonus: i32) -> Self {
        Self {
            amount: proficiency_bonus.max(0) as u32,
        }
    }

    pub const fn applies_to(&self, application: &DamageApplication) -> bool {
        application.damage_type.is_physical() && !application.is_magical
    }
}

/// Target-side inputs to the pipeline.
#[derive(Clone, Copy, Debug)]
pub struct DamageContext<'a> {
    pub defenses: &'a Defenses,
    pub flat_reduction: Option<FlatReduction>,
    /// Targets fully underwater resist fire.
    pub underwater: bool,
}

impl<'a> DamageContext<'a> {
    pub const fn new(defenses: &'a Defenses) -> Self {
        Self {
            defenses,
            flat_reduction: None,
            underwater: false,
        }
    }

    #[must_use]
    pub const fn with_flat_reduction(mut self, reduction: Option<FlatReduction>) -> Self {
        self.flat_reduction = reduction;
        self
    }

    #[must_use]
    pub const fn underwater(mut self, underwater: bool) -> Self {
        self.underwater = underwater;
        self
    }
}

/// One component after resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolvedDamage {
    pub application: DamageApplication,
    pub final_damage: u32,
    /// Comma-separated steps that changed the value, empty when untouched.
    pub reason: String,
}

/// Resolved totals for a set of components.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageSummary {
    pub components: Vec<ResolvedDamage>,
    pub total_raw: u32,
    pub total_final: u32,
}

impl DamageSummary {
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Damage type of the first component, used for log entries.
    pub fn primary_type(&self) -> Option<DamageType> {
        self.components.first().map(|c| c.application.damage_type)
    }

    /// Appends another summary's components.
    pub fn merge(&mut self, other: DamageSummary) {
        self.total_raw += other.total_raw;
        self.total_final += other.total_final;
        self.components.extend(other.components);
    }
}

/// Resolves every component against the target's defenses.
pub fn resolve_damage(applications: &[DamageApplication], context: &DamageContext<'_>) -> DamageSummary {
    let components: Vec<ResolvedDamage> = applications
        .iter()
        .map(|application| resolve_component(application, context))
        .collect();

    DamageSummary {
        total_raw: applications.iter().map(|a| a.raw).sum(),
        total_final: components.iter().map(|c| c.final_damage).sum(),
        components,
    }
}

fn resolve_component(application: &DamageApplication, context: &DamageContext<'_>) -> ResolvedDamage {
    let DamageApplication {
        raw,
        damage_type,
        is_magical,
        is_silvered,
    } = *application;
    let defenses = context.defenses;
    let mut steps = Vec::new();
    let mut value = raw;

    if let Some(reduction) = context.flat_reduction.filter(|r| r.applies_to(application)) {
        let reduced = value.saturating_sub(reduction.amount);
        if reduced != value {
            steps.push(format!("reduced by {}", value - reduced));
        }
        value = reduced;
    }

    if defenses.is_immune(damage_type, is_magical, is_silvered) {
        steps.push("immune".to_string());
        return ResolvedDamage {
            application: *application,
            final_damage: 0,
            reason: steps.join(", "),
        };
    }

    let underwater_fire = context.underwater && damage_type == DamageType::Fire;
    if underwater_fire || defenses.resists(damage_type, is_magical, is_silvered) {
        value /= 2;
        steps.push("resisted".to_string());
    }

    if defenses.is_vulnerable(damage_type, is_magical, is_silvered) {
        value = value.saturating_mul(2);
        steps.push("vulnerable".to_string());
    }

    ResolvedDamage {
        application: *application,
        final_damage: value,
        reason: steps.join(", "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve_one(application: DamageApplication, context: &DamageContext<'_>) -> ResolvedDamage {
        resolve_damage(&[application], context).components.remove(0)
    }

    #[test]
    fn resistance_halves_and_floors() {
        let defenses = Defenses::from_phrases(["fire"], [], []);
        let out = resolve_one(DamageApplication::new(15, DamageType::Fire), &DamageContext::new(&defenses));
        assert_eq!(out.final_damage, 7);
        assert_eq!(out.reason, "resisted");
    }

    #[test]
    fn vulnerability_doubles() {
        let defenses = Defenses::from_phrases([], [], ["cold"]);
        let out = resolve_one(DamageApplication::new(10, DamageType::Cold), &DamageContext::new(&defenses));
        assert_eq!(out.final_damage, 20);
    }

    #[test]
    fn immunity_short_circuits() {
        let defenses = Defenses::from_phrases(["poison"], ["poison"], ["poison"]);
        let out = resolve_one(DamageApplication::new(12, DamageType::Poison), &DamageContext::new(&defenses));
        assert_eq!(out.final_damage, 0);
        assert_eq!(out.reason, "immune");
    }

    #[test]
    fn resistance_then_vulnerability() {
        let defenses = Defenses::from_phrases(["fire"], [], ["fire"]);
        let out = resolve_one(DamageApplication::new(15, DamageType::Fire), &DamageContext::new(&defenses));
        assert_eq!(out.final_damage, 14);
        assert_eq!(out.reason, "resisted, vulnerable");
    }

    #[test]
    fn resistances_do_not_stack() {
        let defenses = Defenses::from_phrases(["fire", "all"], [], []);
        let context = DamageContext::new(&defenses).underwater(true);
        let out = resolve_one(DamageApplication::new(20, DamageType::Fire), &context);
        assert_eq!(out.final_damage, 10);
    }

    #[test]
    fn nonmagical_qualifier_respects_magic_weapons() {
        let defenses = Defenses::from_phrases(["bludgeoning, piercing, and slashing from nonmagical attacks"], [], []);
        let context = DamageContext::new(&defenses);
        let plain = resolve_one(DamageApplication::new(9, DamageType::Slashing), &context);
        let magic = resolve_one(DamageApplication::new(9, DamageType::Slashing).magical(true), &context);
        assert_eq!(plain.final_damage, 4);
        assert_eq!(magic.final_damage, 9);
    }

    #[test]
    fn flat_reduction_only_hits_nonmagical_physical() {
        let defenses = Defenses::new();
        let context = DamageContext::new(&defenses)
            .with_flat_reduction(Some(FlatReduction::heavy_armor_master(3)));

        let summary = resolve_damage(
            &[
                DamageApplication::new(2, DamageType::Piercing),
                DamageApplication::new(8, DamageType::Piercing).magical(true),
                DamageApplication::new(8, DamageType::Fire),
                DamageApplication::new(8, DamageType::Bludgeoning),
            ],
            &context,
        );
        let finals: Vec<u32> = summary.components.iter().map(|c| c.final_damage).collect();
        assert_eq!(finals, vec![0, 8, 8, 5]);
        assert_eq!(summary.components[3].reason, "reduced by 3");
        assert_eq!(summary.total_raw, 26);
        assert_eq!(summary.total_final, 21);
    }
}
