//! Property tests for the exposure, momentum and layer models

use arc_melee::combat::damage::momentum_terms;
use arc_melee::combat::hit_location::AttackProfile;
use arc_melee::combat::penetration::Susceptibility;
use arc_melee::combat::stance::{ArmContribution, BodyContribution, Facing, Lean};
use arc_melee::combat::stats::StatSource;
use arc_melee::combat::technique::Scaling;
use arc_melee::combat::{
    resolve_layer, select_location, synthesize, Accessor, CombatStats, GripCategory, Guard,
    Height, LayerCoefficients, LayerPacket, RelativeAngle, ScriptedRandom, Side, Stance,
};
use arc_melee::data::{builtin, audit::THICKNESS_TOLERANCE};
use proptest::prelude::*;

fn grip() -> impl Strategy<Value = GripCategory> {
    prop_oneof![
        Just(GripCategory::OneHanded),
        Just(GripCategory::TwoHanded),
        Just(GripCategory::WeaponAndShield),
        Just(GripCategory::Polearm),
        Just(GripCategory::Unarmed),
    ]
}

fn height() -> impl Strategy<Value = Height> {
    prop_oneof![Just(Height::Low), Just(Height::Mid), Just(Height::High)]
}

fn angle() -> impl Strategy<Value = RelativeAngle> {
    prop_oneof![
        Just(RelativeAngle::Frontal),
        Just(RelativeAngle::Inside),
        Just(RelativeAngle::Outside),
        Just(RelativeAngle::Flank),
        Just(RelativeAngle::Rear),
    ]
}

fn facing() -> impl Strategy<Value = Facing> {
    prop_oneof![
        Just(Facing::Square),
        Just(Facing::Bladed),
        Just(Facing::BladedReverse),
    ]
}

fn lean() -> impl Strategy<Value = Lean> {
    prop_oneof![Just(Lean::Upright), Just(Lean::Forward), Just(Lean::Back)]
}

prop_compose! {
    fn stance()(
        grip in grip(),
        left_handed in any::<bool>(),
        height_override in proptest::option::of(height()),
        extension in 0.0f32..=1.0,
        hand_exposure in 0.0f32..=1.0,
        facing in facing(),
        crouch in 0.0f32..=1.0,
        lean in lean(),
        guard in proptest::option::of((height(), any::<bool>())),
    ) -> Stance {
        let dominant = if left_handed { Side::Left } else { Side::Right };
        Stance {
            arm: ArmContribution { height_override, extension, hand_exposure },
            body: BodyContribution { facing, crouch, lean },
            guard: guard.map(|(h, adjacent)| Guard::new(h, adjacent)),
            ..Stance::new(grip, dominant)
        }
    }
}

prop_compose! {
    fn coefficients()(
        deflection in 0.0f32..0.9,
        absorption in 0.0f32..0.9,
        dispersion in 0.0f32..0.9,
        geometry in (0.0f32..1.0, 0.0f32..=1.0),
        energy in (0.0f32..100.0, 0.0f32..=1.0),
        rigidity in (0.0f32..1.0, 0.0f32..=1.0),
    ) -> LayerCoefficients {
        LayerCoefficients {
            deflection,
            absorption,
            dispersion,
            geometry: Susceptibility::new(geometry.0, geometry.1),
            energy: Susceptibility::new(energy.0, energy.1),
            rigidity: Susceptibility::new(rigidity.0, rigidity.1),
        }
    }
}

prop_compose! {
    fn packet()(
        amount in 0.0f32..100.0,
        momentum in 0.0f32..200.0,
        geometry in 0.0f32..=1.0,
        rigidity in 0.0f32..=1.0,
    ) -> LayerPacket {
        LayerPacket { amount, momentum, geometry, rigidity }
    }
}

proptest! {
    #[test]
    fn prop_exposure_weights_never_negative(stance in stance(), angle in angle()) {
        let plan = builtin::humanoid_plan();
        let map = synthesize(&plan, &stance, angle);
        for entry in map.iter() {
            prop_assert!(entry.weight >= 0.0, "{} has weight {}", entry.part, entry.weight);
            prop_assert!(entry.weight.is_finite());
        }
    }

    #[test]
    fn prop_synthesis_is_idempotent(stance in stance(), angle in angle()) {
        let plan = builtin::humanoid_plan();
        let first = synthesize(&plan, &stance, angle);
        let second = synthesize(&plan, &stance, angle);
        prop_assert_eq!(first.parts(), second.parts());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_any_roll_lands_somewhere(stance in stance(), angle in angle(), roll in 0.0f32..=1.0) {
        let plan = builtin::humanoid_plan();
        let map = synthesize(&plan, &stance, angle);
        let profile = AttackProfile {
            primary: Some(Height::Mid),
            secondary: Some(Height::High),
            ..AttackProfile::default()
        };
        let mut rng = ScriptedRandom::new([roll]);
        prop_assert!(select_location(&map, &profile, &mut rng).is_some());
    }

    #[test]
    fn prop_velocity_stats_scale_momentum_quadratically(
        speed in 1.0f32..20.0,
        power in 1.0f32..20.0,
        heft in 0.05f32..0.95,
    ) {
        let scaling = Scaling {
            ratio: 1.0,
            stats: StatSource::Average(Accessor::Speed, Accessor::Power),
        };
        let stats = CombatStats { speed, power, ..CombatStats::default() };
        let doubled = CombatStats { speed: speed * 2.0, ..stats };

        let base = momentum_terms(&scaling, &stats, 5.0, heft);
        let fast = momentum_terms(&scaling, &doubled, 5.0, heft);
        prop_assert!((fast.velocity / base.velocity - 4.0).abs() < 1e-3);
        prop_assert!((fast.mass - base.mass).abs() < 1e-6);
        prop_assert!(fast.velocity > 2.0 * base.velocity);
    }

    #[test]
    fn prop_more_shielding_never_passes_more(
        layer in coefficients(),
        packet in packet(),
        extra_deflection in 0.0f32..0.5,
        extra_absorption in 0.0f32..0.5,
        penetration in 0.0f32..0.2,
    ) {
        let tougher = LayerCoefficients {
            deflection: (layer.deflection + extra_deflection).min(1.0),
            absorption: (layer.absorption + extra_absorption).min(1.0),
            ..layer
        };
        let soft = resolve_layer(&packet, &layer, penetration);
        let hard = resolve_layer(&packet, &tougher, penetration);
        prop_assert!(hard.passed.amount <= soft.passed.amount + 1e-4);
        prop_assert!(hard.passed.momentum <= soft.passed.momentum + 1e-4);
    }

    #[test]
    fn prop_layer_never_amplifies(layer in coefficients(), packet in packet(), penetration in 0.0f32..0.2) {
        let result = resolve_layer(&packet, &layer, penetration);
        prop_assert!(result.passed.amount <= packet.amount + 1e-4);
        prop_assert!(result.passed.momentum <= packet.momentum + 1e-4);
    }
}

#[test]
fn test_builtin_templates_sum_to_one() {
    let tables = builtin::tables();
    for template in tables.tissue_templates() {
        let total = template.thickness_total();
        assert!(
            (total - 1.0).abs() <= THICKNESS_TOLERANCE,
            "{} sums to {}",
            template.id,
            total
        );
    }
}
