//! Tick resolver
//!
//! Orders a tick's committed actions, applies footwork, pairs every
//! offensive action with its targets and their overlapping defences, and
//! runs each pair through the resolution pipeline.

use ahash::AHashSet;

use crate::combat::action::CommittedAction;
use crate::combat::context::{build_context, Pairing, Prepared, SkipReason};
use crate::combat::events::{CombatEvent, EventSink};
use crate::combat::random::RandomSource;
use crate::combat::resolution::{resolve_attack, Outcome, ResolutionEntry, SynergyRules};
use crate::combat::state::Encounter;
use crate::combat::technique::{TargetQuery, Technique, TechniqueRole};
use crate::core::config::ResolutionConfig;
use crate::core::error::Result;
use crate::core::types::{AgentId, Tick};
use crate::data::DataTables;

/// Resolves one tick at a time against borrowed tables and config
pub struct TickResolver<'a, T: DataTables + ?Sized> {
    tables: &'a T,
    config: &'a ResolutionConfig,
    synergy: SynergyRules,
}

impl<'a, T: DataTables + ?Sized> TickResolver<'a, T> {
    pub fn new(tables: &'a T, config: &'a ResolutionConfig) -> Self {
        Self {
            tables,
            config,
            synergy: SynergyRules::default(),
        }
    }

    pub fn with_synergy(mut self, synergy: SynergyRules) -> Self {
        self.synergy = synergy;
        self
    }

    /// Resolve every action of one tick
    ///
    /// Actions run in non-decreasing `time_start`, ties in the order given.
    /// Data-integrity errors abort the tick; everything else becomes an
    /// entry. The tick runs against a staged copy of the encounter and its
    /// events are held back, so an aborted tick changes nothing but the
    /// random source. On success every combatant bleeds and recovers, and
    /// the tick counter advances.
    pub fn resolve(
        &self,
        actions: &[CommittedAction],
        encounter: &mut Encounter,
        rng: &mut impl RandomSource,
        events: &mut impl EventSink,
    ) -> Result<Vec<ResolutionEntry>> {
        let mut staged = encounter.clone();
        let mut held: Vec<CombatEvent> = Vec::new();
        let entries = self.resolve_staged(actions, &mut staged, rng, &mut held)?;

        *encounter = staged;
        for event in held {
            events.push(event);
        }
        Ok(entries)
    }

    fn resolve_staged(
        &self,
        actions: &[CommittedAction],
        encounter: &mut Encounter,
        rng: &mut impl RandomSource,
        events: &mut Vec<CombatEvent>,
    ) -> Result<Vec<ResolutionEntry>> {
        let tick = encounter.tick;

        // ===== PHASE 1: LOOKUP & ORDER =====
        let techniques: Vec<&Technique> = actions
            .iter()
            .map(|a| self.tables.technique(&a.technique))
            .collect::<Result<_>>()?;

        let mut order: Vec<usize> = (0..actions.len()).collect();
        order.sort_by(|&a, &b| actions[a].time_start.total_cmp(&actions[b].time_start));

        let moved: AHashSet<AgentId> = actions
            .iter()
            .zip(&techniques)
            .filter(|(_, t)| t.role == TechniqueRole::Footwork)
            .map(|(a, _)| a.actor)
            .collect();

        let mut entries = Vec::new();

        for &idx in &order {
            let action = &actions[idx];
            let technique = techniques[idx];

            match technique.role {
                // ===== PHASE 2: FOOTWORK =====
                TechniqueRole::Footwork => self.apply_footwork(action, technique, encounter),

                // ===== PHASE 3: OFFENSE =====
                TechniqueRole::Offensive => {
                    for target in self.targets(action, technique, encounter) {
                        let pairing = Pairing {
                            target: Some(target),
                            defence: find_overlapping(actions, &techniques, &order, action, target, TechniqueRole::Defensive),
                            defender_action: find_overlapping(actions, &techniques, &order, action, target, TechniqueRole::Offensive),
                            footwork: find_overlapping(actions, &techniques, &order, action, action.actor, TechniqueRole::Footwork),
                            target_moved: moved.contains(&target),
                        };
                        let entry = self.resolve_pair(idx, action, pairing, encounter, rng)?;
                        self.emit(tick, &entry, encounter, events);
                        entries.push(entry);
                    }
                }

                // Defences only ever answer an attack
                TechniqueRole::Defensive => {}
            }
        }

        // ===== PHASE 4: ADVANCE =====
        for combatant in encounter.combatants_mut() {
            let lost = combatant.end_tick(self.config);
            if lost > 0.0 {
                tracing::debug!("{} bleeds {:.2}", combatant.name, lost);
            }
        }
        encounter.advance_tick();
        tracing::debug!("Tick {} resolved {} pair(s)", tick, entries.len());
        Ok(entries)
    }

    fn apply_footwork(&self, action: &CommittedAction, technique: &Technique, encounter: &mut Encounter) {
        let Some(effect) = technique.footwork else {
            return;
        };
        let others = match action.target {
            Some(target) => vec![target],
            None => encounter.engagements.opponents_of(action.actor),
        };
        for other in others {
            if effect.range_steps != 0 {
                if let Some(range) = encounter
                    .engagements
                    .step_range(action.actor, other, effect.range_steps)
                {
                    tracing::debug!("{} moves to {:?} range", technique.id, range);
                }
            }
            if let Some(angle) = effect.angle {
                encounter.engagements.set_angle(action.actor, other, angle);
            }
        }
    }

    fn targets(&self, action: &CommittedAction, technique: &Technique, encounter: &Encounter) -> Vec<AgentId> {
        if let Some(target) = action.target {
            return vec![target];
        }
        let enemies = encounter.enemies_of(action.actor);
        match technique.target {
            TargetQuery::Single => enemies.into_iter().take(1).collect(),
            TargetQuery::AllEnemies => enemies,
        }
    }

    fn resolve_pair(
        &self,
        action_index: usize,
        action: &CommittedAction,
        pairing: Pairing<'_>,
        encounter: &mut Encounter,
        rng: &mut impl RandomSource,
    ) -> Result<ResolutionEntry> {
        let target = pairing.target.unwrap_or(action.actor);
        let weapon = encounter
            .get(action.actor)
            .and_then(|c| c.active_weapon().map(str::to_string))
            .unwrap_or_default();
        let entry = |outcome| ResolutionEntry {
            action_index,
            actor: action.actor,
            target,
            technique: action.technique.clone(),
            weapon: weapon.clone(),
            outcome,
        };

        if let Some(actor) = encounter.get(action.actor) {
            let plan = self.tables.body_plan(&actor.body_plan)?;
            if actor.is_incapacitated(plan) {
                return Ok(entry(Outcome::Skipped {
                    reason: SkipReason::Incapacitated,
                }));
            }
        }

        let ctx = match build_context(self.tables, encounter, action, pairing)? {
            Prepared::Ready(ctx) => ctx,
            Prepared::Skipped(reason) => {
                tracing::warn!("Skipping {} on {:?}: {:?}", action.technique, target, reason);
                return Ok(entry(Outcome::Skipped { reason }));
            }
        };

        let reach = ctx.attacker.reach;
        let range = ctx.attacker.engagement.range;
        if reach < range {
            return Ok(entry(Outcome::OutOfRange { reach, range }));
        }

        let Some(defender) = encounter.get_mut(target) else {
            return Ok(entry(Outcome::Skipped {
                reason: SkipReason::UnknownCombatant,
            }));
        };
        let outcome = resolve_attack(self.tables, &ctx, defender, &self.synergy, rng, self.config)?;
        Ok(entry(outcome))
    }

    /// Engagement updates and events for one entry
    fn emit(&self, tick: Tick, entry: &ResolutionEntry, encounter: &mut Encounter, events: &mut Vec<CombatEvent>) {
        let (actor, target) = (entry.actor, entry.target);
        let mut damage = 0.0;

        let shift = match &entry.outcome {
            Outcome::Hit(report) => {
                damage = report.reached;
                encounter
                    .engagements
                    .add_pressure(target, actor, self.config.pressure_per_hit);
                events.push(CombatEvent::WoundInflicted {
                    tick,
                    target,
                    part: report.part.clone(),
                    severity: report.wound.severity,
                    lost: report.wound.lost,
                });
                if let Some(weapon) = &report.dropped {
                    events.push(CombatEvent::WeaponDropped {
                        tick,
                        actor: target,
                        weapon: weapon.clone(),
                    });
                }
                self.config.control_shift_on_hit
            }
            Outcome::Defended { .. } => -self.config.control_shift_on_defence,
            Outcome::OutOfRange { reach, range } => {
                events.push(CombatEvent::AttackOutOfRange {
                    tick,
                    actor,
                    target,
                    reach: *reach,
                    range: *range,
                });
                0.0
            }
            _ => 0.0,
        };

        events.push(CombatEvent::TechniqueResolved {
            tick,
            actor,
            target,
            technique: entry.technique.clone(),
            weapon: entry.weapon.clone(),
            outcome: entry.outcome.kind(),
            damage,
        });

        if shift != 0.0 {
            if let Some((from, to)) = encounter.engagements.shift_control(actor, target, shift) {
                if from != to {
                    events.push(CombatEvent::AdvantageChanged {
                        tick,
                        actor,
                        opponent: target,
                        from,
                        to,
                    });
                }
            }
        }
    }
}

/// First action by `owner` with `role` overlapping `attack`, in tick order
fn find_overlapping<'a>(
    actions: &'a [CommittedAction],
    techniques: &[&Technique],
    order: &[usize],
    attack: &CommittedAction,
    owner: AgentId,
    role: TechniqueRole,
) -> Option<&'a CommittedAction> {
    order
        .iter()
        .map(|&i| (&actions[i], techniques[i]))
        .find(|(a, t)| a.actor == owner && t.role == role && a.overlaps(attack))
        .map(|(a, _)| a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::engagement::RelativeAngle;
    use crate::combat::events::{EventLog, OutcomeKind};
    use crate::combat::random::{RandomStream, ScriptedRandom};
    use crate::combat::species::Species;
    use crate::combat::state::Combatant;
    use crate::combat::weapons::Reach;
    use crate::core::types::TeamId;
    use crate::data::builtin;

    fn ids() -> (AgentId, AgentId) {
        (AgentId::from_u128(1), AgentId::from_u128(2))
    }

    fn encounter(range: Reach) -> Encounter {
        let (a, b) = ids();
        let mut encounter = Encounter::new();
        encounter.add(Combatant::new(a, "Alda", TeamId(0), &Species::human()).with_weapon("arming_sword"));
        encounter.add(Combatant::new(b, "Brann", TeamId(1), &Species::human()).with_weapon("arming_sword"));
        encounter.engage(a, b, range);
        encounter
    }

    #[test]
    fn test_out_of_range_skips_pipeline() {
        let tables = builtin::tables();
        let config = ResolutionConfig::default();
        let resolver = TickResolver::new(&tables, &config);
        let (a, b) = ids();
        let mut encounter = encounter(Reach::Long);
        let mut rng = ScriptedRandom::default();
        let mut log = EventLog::new();

        let actions = vec![CommittedAction::new(a, "thrust", 0.0, 0.5).at(b)];
        let entries = resolver.resolve(&actions, &mut encounter, &mut rng, &mut log).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].outcome,
            Outcome::OutOfRange {
                reach: Reach::Short,
                range: Reach::Long
            }
        );
        assert!(log
            .iter()
            .any(|e| matches!(e, CombatEvent::AttackOutOfRange { .. })));
        assert!(encounter.get(b).unwrap().wounds.iter().next().is_none());
    }

    #[test]
    fn test_stable_order_by_start_time() {
        let tables = builtin::tables();
        let config = ResolutionConfig::default();
        let resolver = TickResolver::new(&tables, &config);
        let (a, b) = ids();
        let mut encounter = encounter(Reach::Short);
        let mut rng = ScriptedRandom::default().with_fallback(0.99);
        let mut log = EventLog::new();

        let actions = vec![
            CommittedAction::new(b, "swing", 0.4, 0.8).at(a),
            CommittedAction::new(a, "thrust", 0.1, 0.3).at(b),
            CommittedAction::new(a, "swing", 0.4, 0.9).at(b),
        ];
        let entries = resolver.resolve(&actions, &mut encounter, &mut rng, &mut log).unwrap();

        let order: Vec<usize> = entries.iter().map(|e| e.action_index).collect();
        assert_eq!(order, vec![1, 0, 2]);
        assert!(entries.iter().all(|e| e.outcome == Outcome::Miss));
        assert_eq!(encounter.tick, 1);
    }

    #[test]
    fn test_defensive_actions_are_not_resolved_alone() {
        let tables = builtin::tables();
        let config = ResolutionConfig::default();
        let resolver = TickResolver::new(&tables, &config);
        let (_, b) = ids();
        let mut encounter = encounter(Reach::Short);
        let mut rng = ScriptedRandom::default();
        let mut log = EventLog::new();

        let actions = vec![CommittedAction::new(b, "parry", 0.0, 1.0)];
        let entries = resolver.resolve(&actions, &mut encounter, &mut rng, &mut log).unwrap();
        assert!(entries.is_empty());
        assert!(log.is_empty());
    }

    #[test]
    fn test_only_overlapping_defence_counts() {
        let tables = builtin::tables();
        let config = ResolutionConfig::default();
        let resolver = TickResolver::new(&tables, &config);
        let (a, b) = ids();

        // Roll 0.4 lands under the open chance but over the parried one
        let actions_late = vec![
            CommittedAction::new(a, "swing", 0.0, 0.4).at(b),
            CommittedAction::new(b, "parry", 0.5, 0.9),
        ];
        let mut encounter_late = encounter(Reach::Short);
        let mut rng = ScriptedRandom::default().with_stream(RandomStream::Combat, [0.4]);
        let late = resolver
            .resolve(&actions_late, &mut encounter_late, &mut rng, &mut EventLog::new())
            .unwrap();
        assert!(matches!(late[0].outcome, Outcome::Hit(_)));

        let actions_overlap = vec![
            CommittedAction::new(a, "swing", 0.0, 0.4).at(b),
            CommittedAction::new(b, "parry", 0.2, 0.6),
        ];
        let mut encounter_overlap = encounter(Reach::Short);
        let mut rng = ScriptedRandom::default().with_stream(RandomStream::Combat, [0.4]);
        let overlap = resolver
            .resolve(&actions_overlap, &mut encounter_overlap, &mut rng, &mut EventLog::new())
            .unwrap();
        assert!(matches!(overlap[0].outcome, Outcome::Defended { .. }));
    }

    #[test]
    fn test_hit_and_defence_shift_control() {
        let tables = builtin::tables();
        let config = ResolutionConfig::default();
        let resolver = TickResolver::new(&tables, &config);
        let (a, b) = ids();
        let mut encounter = encounter(Reach::Short);
        let mut rng = ScriptedRandom::default().with_stream(RandomStream::Combat, [0.0]);
        let mut events: Vec<CombatEvent> = Vec::new();

        let actions = vec![CommittedAction::new(a, "swing", 0.0, 0.4).at(b)];
        resolver.resolve(&actions, &mut encounter, &mut rng, &mut events).unwrap();

        let engagement = encounter.engagements.get(a, b).unwrap();
        assert!((engagement.control - config.control_shift_on_hit).abs() < 1e-6);
        assert!(encounter.engagements.get(b, a).unwrap().pressure > 0.0);
        assert!(events.iter().any(|e| matches!(e, CombatEvent::AdvantageChanged { .. })));
        assert!(events.iter().any(|e| matches!(e, CombatEvent::WoundInflicted { .. })));
        assert!(events.iter().any(|e| matches!(
            e,
            CombatEvent::TechniqueResolved {
                outcome: OutcomeKind::Hit,
                ..
            }
        )));
    }

    #[test]
    fn test_footwork_changes_range_and_angle() {
        let tables = builtin::tables();
        let config = ResolutionConfig::default();
        let resolver = TickResolver::new(&tables, &config);
        let (a, b) = ids();
        let mut encounter = encounter(Reach::Medium);
        let mut rng = ScriptedRandom::default();

        let actions = vec![
            CommittedAction::new(a, "advance", 0.0, 0.2).at(b),
            CommittedAction::new(a, "sidestep", 0.2, 0.4).at(b),
        ];
        let entries = resolver
            .resolve(&actions, &mut encounter, &mut rng, &mut EventLog::new())
            .unwrap();
        assert!(entries.is_empty());

        let engagement = encounter.engagements.get(a, b).unwrap();
        assert_eq!(engagement.range, Reach::Short);
        assert_eq!(engagement.angle, RelativeAngle::Flank);
    }

    #[test]
    fn test_advance_brings_thrust_into_range() {
        let tables = builtin::tables();
        let config = ResolutionConfig::default();
        let resolver = TickResolver::new(&tables, &config);
        let (a, b) = ids();
        let mut encounter = encounter(Reach::Medium);
        let mut rng = ScriptedRandom::default().with_fallback(0.99);

        let actions = vec![
            CommittedAction::new(a, "thrust", 0.3, 0.6).at(b),
            CommittedAction::new(a, "advance", 0.0, 0.3).at(b),
        ];
        let entries = resolver
            .resolve(&actions, &mut encounter, &mut rng, &mut EventLog::new())
            .unwrap();
        assert_eq!(entries[0].outcome, Outcome::Miss);
    }

    #[test]
    fn test_query_targets_all_enemies() {
        let tables = builtin::tables();
        let config = ResolutionConfig::default();
        let resolver = TickResolver::new(&tables, &config);
        let (a, b) = ids();
        let c = AgentId::from_u128(3);
        let mut encounter = encounter(Reach::Short);
        encounter.add(Combatant::new(c, "Cato", TeamId(1), &Species::human()));
        encounter.engage(a, c, Reach::Short);
        let mut rng = ScriptedRandom::default().with_fallback(0.99);

        let sweep = vec![CommittedAction::new(a, "sweep", 0.0, 0.5)];
        let entries = resolver
            .resolve(&sweep, &mut encounter, &mut rng, &mut EventLog::new())
            .unwrap();
        let targets: Vec<AgentId> = entries.iter().map(|e| e.target).collect();
        assert_eq!(targets, vec![b, c]);

        let single = vec![CommittedAction::new(a, "swing", 0.0, 0.5)];
        let entries = resolver
            .resolve(&single, &mut encounter, &mut rng, &mut EventLog::new())
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].target, b);
    }

    #[test]
    fn test_unknown_technique_aborts_tick() {
        let tables = builtin::tables();
        let config = ResolutionConfig::default();
        let resolver = TickResolver::new(&tables, &config);
        let (a, b) = ids();
        let mut encounter = encounter(Reach::Short);
        let mut rng = ScriptedRandom::default();

        let actions = vec![CommittedAction::new(a, "fireball", 0.0, 0.5).at(b)];
        let result = resolver.resolve(&actions, &mut encounter, &mut rng, &mut EventLog::new());
        assert!(result.is_err());
        assert_eq!(encounter.tick, 0);
    }

    #[test]
    fn test_missing_engagement_is_skipped_not_fatal() {
        let tables = builtin::tables();
        let config = ResolutionConfig::default();
        let resolver = TickResolver::new(&tables, &config);
        let (a, b) = ids();
        let mut encounter = encounter(Reach::Short);
        encounter.engagements.disengage(a, b);
        let mut rng = ScriptedRandom::default();

        let actions = vec![CommittedAction::new(a, "thrust", 0.0, 0.5).at(b)];
        let entries = resolver
            .resolve(&actions, &mut encounter, &mut rng, &mut EventLog::new())
            .unwrap();
        assert_eq!(
            entries[0].outcome,
            Outcome::Skipped {
                reason: SkipReason::NoEngagement
            }
        );
    }

    #[test]
    fn test_defenders_overlapping_attack_is_paired() {
        let tables = builtin::tables();
        let (a, b) = ids();
        let attack = CommittedAction::new(a, "thrust", 0.0, 0.5).at(b);
        let counter = CommittedAction::new(b, "swing", 0.2, 0.7).at(a);
        let late = CommittedAction::new(b, "swing", 0.6, 0.9).at(a);
        let actions = vec![attack.clone(), counter.clone(), late];
        let techniques: Vec<&Technique> = actions
            .iter()
            .map(|a| tables.technique(&a.technique).unwrap())
            .collect();
        let order = vec![0, 1, 2];

        let found = find_overlapping(&actions, &techniques, &order, &attack, b, TechniqueRole::Offensive);
        assert_eq!(found, Some(&counter));
        assert_eq!(
            find_overlapping(&actions, &techniques, &order, &attack, b, TechniqueRole::Defensive),
            None
        );
    }

    #[test]
    fn test_end_of_tick_recovers_stamina() {
        let tables = builtin::tables();
        let config = ResolutionConfig::default();
        let resolver = TickResolver::new(&tables, &config);
        let (a, _) = ids();
        let mut encounter = encounter(Reach::Short);
        encounter.get_mut(a).unwrap().spend_stamina(0.5);
        let mut rng = ScriptedRandom::default();

        resolver
            .resolve(&[], &mut encounter, &mut rng, &mut EventLog::new())
            .unwrap();
        let recovered = encounter.get(a).unwrap().vitals.stamina;
        assert!((recovered - (0.5 + Species::human().recovery().stamina)).abs() < 1e-6);
        assert_eq!(encounter.tick, 1);
    }

    #[test]
    fn test_failed_tick_leaves_encounter_untouched() {
        let tables = builtin::tables();
        let config = ResolutionConfig::default();
        let (a, b) = ids();
        let mut encounter = encounter(Reach::Short);
        // The first swing lands cleanly; the second fails on unknown armour
        encounter.get_mut(b).unwrap().armour = vec!["mithril_coat".into()];
        let resolver = TickResolver::new(&tables, &config);
        let mut rng = ScriptedRandom::default().with_fallback(0.0);
        let mut log = EventLog::new();

        let actions = vec![
            CommittedAction::new(b, "swing", 0.0, 0.3).at(a),
            CommittedAction::new(a, "swing", 0.4, 0.8).at(b),
        ];
        let before = encounter.clone();
        let result = resolver.resolve(&actions, &mut encounter, &mut rng, &mut log);

        assert!(result.unwrap_err().is_data_integrity());
        assert!(log.is_empty());
        assert_eq!(encounter.tick, before.tick);
        assert!(encounter.get(a).unwrap().wounds.iter().next().is_none());
        assert_eq!(encounter.engagements.get(a, b), before.engagements.get(a, b));
    }
}
