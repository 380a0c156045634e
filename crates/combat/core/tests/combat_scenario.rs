use combat_core::{
    Ability, AbilityModifiers, AttackRequest, BlockReason, CombatEngine, Condition, ConditionKind,
    DamageType, Defenses, Dice, DiceFormula, EntityId, GrappleRequest, LogKind, Point,
    ReactionKind, SaveRequest, Scene, SceneOracle, ShoveChoice, SpellSlotState, Token, Wall,
    WeaponMastery, commit,
};

fn fighter() -> Token {
    Token::new(EntityId(1), "Fighter", Point::new(0.0, 0.0))
        .with_team(1)
        .with_abilities(AbilityModifiers::from_scores([16, 14, 14, 10, 12, 8]))
        .with_proficiency_bonus(3)
        .with_hp(44, 44)
}

fn hobgoblin(id: u32, x: f64) -> Token {
    Token::new(EntityId(id), "Hobgoblin", Point::new(x, 0.0))
        .with_team(2)
        .with_ac(17)
        .with_hp(15, 15)
}

/// One round at the table: strike, shove, a fireball with a counterspell
/// window, and everything committed to the scene.
#[test]
fn fighter_round_against_hobgoblins() {
    let engine = CombatEngine::default();
    let mut scene = Scene::default()
        .with_token(fighter())
        .with_token(hobgoblin(2, 1.0))
        .with_token(hobgoblin(3, 8.0));

    // ================================================================
    // Unarmed strike: +6 to hit, rolls 11 for 17 against AC 17
    // ================================================================
    let strike = AttackRequest::unarmed_strike(&fighter(), EntityId(2));
    let report = engine
        .resolve_attack(&scene, &strike, &mut Dice::scripted([11]), 0)
        .resolved()
        .expect("strike should resolve");
    assert!(report.hit);
    assert_eq!(report.roll.total, 17);
    assert_eq!(report.damage.total_final, 4);
    assert_eq!(report.damage.primary_type(), Some(DamageType::Bludgeoning));

    assert_eq!(commit(&report.effects, &mut scene), 0);
    assert_eq!(scene.token(EntityId(2)).map(|t| t.hp.current), Some(11));
    assert!(scene.log().iter().any(|e| e.kind == LogKind::Attack));
    assert!(scene.log().iter().any(|e| e.kind == LogKind::Damage && e.value == Some(4)));
    assert_eq!(scene.broadcasts().len(), 1);

    // ================================================================
    // Shove prone, then the next strike has advantage
    // ================================================================
    let shove = GrappleRequest::shove(EntityId(1), EntityId(2), ShoveChoice::Prone, 1);
    let shoved = engine
        .resolve_grapple(&scene, &shove, &mut Dice::scripted([4]))
        .resolved()
        .expect("shove should resolve");
    assert!(shoved.success);
    commit(&shoved.effects, &mut scene);
    assert!(scene.conditions_of(EntityId(2)).has(&ConditionKind::Prone));

    let followup = engine
        .resolve_attack(&scene, &strike, &mut Dice::scripted([2, 15]), 0)
        .resolved()
        .expect("followup should resolve");
    assert_eq!(followup.roll.natural, Some(15));
    assert!(followup.conditions.advantage_sources.iter().any(|s| s == "target prone"));

    // ================================================================
    // Fireball at the far hobgoblin: no counterspeller, resolves at once
    // ================================================================
    let fireball = SaveRequest::new(EntityId(3), Ability::Dexterity, 15, 1)
        .from_source(EntityId(1))
        .with_damage(DiceFormula::new(8, 6, 0), DamageType::Fire, true)
        .spell("Fireball");
    let burned = engine
        .resolve_save(&scene, &fireball, &mut Dice::scripted([3, 6, 6, 6, 6, 6, 6, 6, 6]), None, 0)
        .resolved()
        .expect("no reactor in range");
    assert!(!burned.success);
    commit(&burned.effects, &mut scene);
    assert_eq!(scene.token(EntityId(3)).map(|t| t.hp.current), Some(0));
}

#[test]
fn counterspell_reach_is_sixty_feet_inclusive() {
    let engine = CombatEngine::default();
    let caster = Token::new(EntityId(1), "Cult Fanatic", Point::new(0.0, 0.0)).with_team(2);
    let at_60 = Token::new(EntityId(2), "Wizard", Point::new(12.0, 0.0))
        .with_team(1)
        .with_known_abilities(["Counterspell"]);
    let at_61 = Token::new(EntityId(3), "Sorcerer", Point::new(12.2, 0.0))
        .with_team(1)
        .with_known_abilities(["counterspell"]);
    let scene = Scene::default()
        .with_token(caster)
        .with_token(at_60)
        .with_token(at_61)
        .with_spell_slots(EntityId(2), SpellSlotState::new().with_slots(3, 2))
        .with_spell_slots(EntityId(3), SpellSlotState::new().with_slots(3, 2));

    let prompts = engine.check_counterspell(&scene, EntityId(1), 500);
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0].entity, EntityId(2));
    assert!(prompts[0].offers(ReactionKind::Counterspell));
    assert_eq!(prompts[0].expires_at_ms, 15_500);
}

#[test]
fn natural_rolls_override_totals() {
    let engine = CombatEngine::default();
    let scene = Scene::default()
        .with_token(fighter())
        .with_token(hobgoblin(2, 1.0).with_ac(25));
    let strike = AttackRequest::unarmed_strike(&fighter(), EntityId(2));

    let crit = engine
        .resolve_attack(&scene, &strike, &mut Dice::scripted([20]), 0)
        .resolved()
        .expect("resolves");
    assert!(crit.hit && crit.critical);
    // Flat damage is never doubled.
    assert_eq!(crit.damage.total_final, 4);

    let easy = hobgoblin(2, 1.0).with_ac(1);
    let scene = Scene::default().with_token(fighter()).with_token(easy);
    let fumble = engine
        .resolve_attack(&scene, &strike, &mut Dice::scripted([1]), 0)
        .resolved()
        .expect("resolves");
    assert!(!fumble.hit);
}

#[test]
fn long_range_and_help_cancel_out() {
    let engine = CombatEngine::default();
    let scene = Scene::default()
        .with_token(fighter())
        .with_token(hobgoblin(2, 40.0));
    let shot = AttackRequest::new(
        EntityId(1),
        EntityId(2),
        "Longbow",
        5,
        DiceFormula::new(1, 8, 2),
        DamageType::Piercing,
    )
    .ranged(150, 600)
    .with_advantage("Help");

    let report = engine
        .resolve_attack(&scene, &shot, &mut Dice::scripted([4, 18, 5]), 0)
        .resolved()
        .expect("in long range");
    assert!(report.long_range);
    assert_eq!(report.roll.natural, Some(4));
    assert_eq!(report.conditions.advantage_sources, vec!["Help".to_string()]);
    assert!(!report.hit);
}

#[test]
fn total_cover_blocks_without_rolling() {
    let engine = CombatEngine::default();
    let scene = Scene::default()
        .with_token(fighter())
        .with_token(hobgoblin(2, 4.0))
        .with_wall(Wall::solid(Point::new(2.5, -10.0), Point::new(2.5, 10.0)));
    let shot = AttackRequest::new(
        EntityId(1),
        EntityId(2),
        "Longbow",
        5,
        DiceFormula::new(1, 8, 2),
        DamageType::Piercing,
    )
    .ranged(150, 600);

    let outcome = engine.resolve_attack(&scene, &shot, &mut Dice::scripted([]), 0);
    assert_eq!(outcome.blocked_reason(), Some(BlockReason::TotalCover));
}

#[test]
fn resistances_and_heavy_armor_master_stack_in_order() {
    let engine = CombatEngine::default();
    let knight = Token::new(EntityId(2), "Knight", Point::new(1.0, 0.0))
        .with_team(2)
        .with_ac(10)
        .with_hp(52, 52)
        .with_heavy_armor(true)
        .with_features(["Heavy Armor Master"])
        .with_proficiency_bonus(3)
        .with_defenses(Defenses::from_phrases(
            ["bludgeoning, piercing, and slashing from nonmagical attacks"],
            [],
            [],
        ));
    let scene = Scene::default().with_token(fighter()).with_token(knight);
    let maul = AttackRequest::new(
        EntityId(1),
        EntityId(2),
        "Maul",
        6,
        DiceFormula::new(2, 6, 3),
        DamageType::Bludgeoning,
    );
    // 6 + 6 + 3 = 15, minus 3 = 12, halved = 6.
    let report = engine
        .resolve_attack(&scene, &maul, &mut Dice::scripted([12, 6, 6]), 0)
        .resolved()
        .expect("resolves");
    assert_eq!(report.damage.total_raw, 15);
    assert_eq!(report.damage.total_final, 6);
}

#[test]
fn only_silvered_blades_cut_a_werewolf() {
    let engine = CombatEngine::default();
    let werewolf = Token::new(EntityId(2), "Werewolf", Point::new(1.0, 0.0))
        .with_team(2)
        .with_ac(12)
        .with_hp(58, 58)
        .with_defenses(Defenses::from_phrases(
            [],
            ["bludgeoning, piercing, and slashing from nonmagical attacks not made with silvered weapons"],
            [],
        ));
    let mut scene = Scene::default().with_token(fighter()).with_token(werewolf);
    let longsword = AttackRequest::new(
        EntityId(1),
        EntityId(2),
        "Longsword",
        6,
        DiceFormula::new(1, 8, 3),
        DamageType::Slashing,
    );

    let plain = engine
        .resolve_attack(&scene, &longsword, &mut Dice::scripted([15, 6]), 0)
        .resolved()
        .expect("resolves");
    assert!(plain.hit);
    assert_eq!(plain.damage.total_raw, 9);
    assert_eq!(plain.damage.total_final, 0);
    assert!(plain.effects.hp_changes.is_empty());

    let silvered = longsword.silvered(true);
    let cut = engine
        .resolve_attack(&scene, &silvered, &mut Dice::scripted([15, 6]), 0)
        .resolved()
        .expect("resolves");
    assert_eq!(cut.damage.total_final, 9);
    commit(&cut.effects, &mut scene);
    assert_eq!(scene.token(EntityId(2)).map(|t| t.hp.current), Some(49));
}

#[test]
fn push_mastery_moves_target_on_commit() {
    let engine = CombatEngine::default();
    let mut scene = Scene::default()
        .with_token(fighter())
        .with_token(hobgoblin(2, 1.0));
    let hammer = AttackRequest::new(
        EntityId(1),
        EntityId(2),
        "Warhammer",
        6,
        DiceFormula::new(1, 8, 3),
        DamageType::Bludgeoning,
    )
    .with_mastery(WeaponMastery::Push)
    .with_ability_modifier(3);

    let report = engine
        .resolve_attack(&scene, &hammer, &mut Dice::scripted([15, 4]), 0)
        .resolved()
        .expect("resolves");
    assert_eq!(report.effects.moves, vec![(EntityId(2), Point::new(3.0, 0.0))]);
    commit(&report.effects, &mut scene);
    assert_eq!(scene.token(EntityId(2)).map(|t| t.position), Some(Point::new(3.0, 0.0)));
}

#[test]
fn commit_without_map_skips_mutations_but_keeps_log() {
    let engine = CombatEngine::default();
    let mut scene = Scene::default()
        .with_token(fighter())
        .with_token(hobgoblin(2, 1.0))
        .without_map();
    let strike = AttackRequest::unarmed_strike(&fighter(), EntityId(2));
    let report = engine
        .resolve_attack(&scene, &strike, &mut Dice::scripted([19]), 0)
        .resolved()
        .expect("resolves");

    assert_eq!(commit(&report.effects, &mut scene), 1);
    assert_eq!(scene.token(EntityId(2)).map(|t| t.hp.current), Some(15));
    assert!(!scene.log().is_empty());
}

#[test]
fn stunned_creature_neither_attacks_nor_reacts() {
    let engine = CombatEngine::default();
    let guard = hobgoblin(2, 1.0);
    let scene = Scene::default()
        .with_token(fighter())
        .with_token(guard)
        .with_condition(Condition::new(EntityId(2), ConditionKind::Stunned));

    let strike = AttackRequest::unarmed_strike(&hobgoblin(2, 1.0), EntityId(1));
    let outcome = engine.resolve_attack(&scene, &strike, &mut Dice::scripted([]), 0);
    assert_eq!(outcome.blocked_reason(), Some(BlockReason::AttackerCannotAct));

    let prompts = engine.check_opportunity_attacks(
        &scene,
        EntityId(1),
        Point::new(0.0, 0.0),
        Point::new(-3.0, 0.0),
        0,
    );
    assert!(prompts.is_empty());
}
