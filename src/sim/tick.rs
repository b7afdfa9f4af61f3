//! Per-frame simulation
//!
//! The clock drives everything through [`tick`]: advance the state machine to
//! the frame time, apply taps, then resolve the contacts that began this frame.

use glam::Vec2;

use super::collision::{ContactOutcome, resolve_contacts};
use super::entity::{EntityId, Role};
use super::projectiles::{clear_enemy_beams, fire_player_beam};
use super::spawner::{run_task, tick_spawner};
use super::state::{GameEvent, GamePhase, GameState, PendingTransition, RunStats};
use crate::audio::Cue;
use crate::consts::WIN_FLASH_CYCLES;
use crate::{box_contains, step_axis};

/// Intents sampled for a single frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Tilt in [-1, 1] per axis; `None` when no sample arrived this frame
    pub steer: Option<Vec2>,
    /// Discrete taps since the last frame, in scene coordinates
    pub taps: Vec<Vec2>,
}

/// What a tap did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    Fired(EntityId),
    /// Fire attempted with the beam budget spent (or no player)
    Dropped,
    Restarted,
    Ignored,
}

/// Advance the simulation to the frame time `now` and resolve contacts
pub fn tick(state: &mut GameState, input: &FrameInput, now: f64) -> Vec<ContactOutcome> {
    advance(state, input.steer, now);

    for &at in &input.taps {
        tap(state, at);
    }

    let outcomes = resolve_contacts(state);
    state.sweep();
    outcomes
}

/// Advance the state machine to `now`.
///
/// Runs delayed phase changes, entity motions and due behaviors in every
/// phase; steering where the phase allows it; spawning, progress and the win
/// check only while `Playing`.
pub fn advance(state: &mut GameState, steer: Option<Vec2>, now: f64) {
    if now < state.now {
        log::warn!("clock went backwards ({:.3} < {:.3}), holding", now, state.now);
    }
    state.now = state.now.max(now);
    let now = state.now;

    if let Some(pending) = state.pending.filter(|p| now >= p.due) {
        state.pending = None;
        state.set_phase(pending.to);
        if pending.to == GamePhase::WaitToRestartFromWin {
            state.push_event(GameEvent::RestartShown);
        }
    }

    for entity in state.entities.iter_mut().filter(|e| e.alive) {
        entity.apply_motions(now);
    }

    for task in state.scheduler.take_due(now) {
        run_task(state, task);
    }

    if state.phase.allows_steering() {
        apply_steering(state, steer);
    }

    if state.phase == GamePhase::Playing {
        tick_spawner(state);

        let rate = state.settings.distance_rate;
        let distance = state.progress.tick(now, rate);
        log::trace!("t={:.3} distance={:.2}", now, distance);
        if distance >= state.settings.win_distance {
            enter_game_win(state);
        }
    }

    state.sweep();
}

/// Move the player one binary step per axis outside the dead zone, then clamp
pub fn apply_steering(state: &mut GameState, steer: Option<Vec2>) {
    let dead_zone = state.settings.steer_dead_zone;
    let step = state.settings.steer_step;
    let viewport = state.settings.viewport();

    let delta = steer.map_or(Vec2::ZERO, |s| {
        Vec2::new(step_axis(s.x, dead_zone, step), step_axis(s.y, dead_zone, step))
    });

    let Some(id) = state.player else { return };
    if let Some(player) = state.entity_mut(id).filter(|e| e.alive) {
        player.pos += delta;
        player.clamp_to(viewport);
    }
}

/// Handle one discrete tap at `at` (scene coordinates)
pub fn tap(state: &mut GameState, at: Vec2) -> TapOutcome {
    match state.phase {
        GamePhase::Playing => fire(state),
        GamePhase::WaitToRestartFromLose => {
            restart(state);
            TapOutcome::Restarted
        }
        GamePhase::WaitToRestartFromWin => {
            let (center, half) = state.settings.restart_control();
            if box_contains(center, half, at) {
                restart(state);
                TapOutcome::Restarted
            } else {
                fire(state)
            }
        }
        GamePhase::GameWin | GamePhase::GameOver => TapOutcome::Ignored,
    }
}

fn fire(state: &mut GameState) -> TapOutcome {
    match fire_player_beam(state) {
        Some(id) => TapOutcome::Fired(id),
        None => TapOutcome::Dropped,
    }
}

/// `Playing -> GameOver`; a no-op outside `Playing`
pub fn enter_game_over(state: &mut GameState) -> bool {
    if state.phase != GamePhase::Playing {
        return false;
    }
    state.set_phase(GamePhase::GameOver);
    state.push_event(GameEvent::InputSuspended);
    state.push_event(GameEvent::StopLoop(Cue::Background));
    state.push_event(GameEvent::PlayOnce(Cue::Lose));
    state.push_event(GameEvent::ScoreboardHidden);
    state.pending = Some(PendingTransition {
        to: GamePhase::WaitToRestartFromLose,
        due: state.now + state.settings.lose_settle_secs,
    });
    log::info!("Run {} lost with score {}", state.run, state.score);
    true
}

/// `Playing -> GameWin`; a no-op outside `Playing`.
///
/// Every remaining enemy is destroyed with full effects and score; enemy beams
/// are removed quietly.
pub fn enter_game_win(state: &mut GameState) -> bool {
    if state.phase != GamePhase::Playing {
        return false;
    }
    state.set_phase(GamePhase::GameWin);

    for id in state.alive_ids(Role::Enemy) {
        state.destroy(id);
    }
    clear_enemy_beams(state);

    state.push_event(GameEvent::PlayOnce(Cue::Win));
    state.push_event(GameEvent::WinFlash {
        cycles: WIN_FLASH_CYCLES,
    });
    state.pending = Some(PendingTransition {
        to: GamePhase::WaitToRestartFromWin,
        due: state.now + state.settings.win_settle_secs,
    });
    log::info!("Run {} won with score {}", state.run, state.score);
    true
}

/// Reset to a fresh `Playing` run; only valid while waiting to restart
pub fn restart(state: &mut GameState) -> bool {
    if !state.phase.is_waiting_to_restart() {
        return false;
    }

    let live: Vec<EntityId> = state
        .entities
        .iter()
        .filter(|e| e.alive)
        .map(|e| e.id)
        .collect();
    for id in live {
        state.despawn(id);
    }
    state.sweep();
    state.scheduler.clear();
    state.contacts.clear();
    state.player_beams = 0;
    state.score = 0;
    state.progress.clear();
    state.spawner.reset();
    state.pending = None;
    state.stats = RunStats::default();
    state.run += 1;

    state.spawn_player();
    state.push_event(GameEvent::ScoreChanged(0));
    state.push_event(GameEvent::RestartHidden);
    state.push_event(GameEvent::StopLoop(Cue::Background));
    state.push_event(GameEvent::PlayLoop(Cue::Background));
    state.push_event(GameEvent::InputResumed);
    state.set_phase(GamePhase::Playing);
    log::info!("Run {} started", state.run);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::collision::on_contact;
    use crate::sim::spawner::spawn_enemy_with_descent;
    use proptest::prelude::*;

    const FPS: f64 = 60.0;

    fn frame_time(i: u32) -> f64 {
        i as f64 / FPS
    }

    fn new_state() -> GameState {
        let mut state = GameState::new(Settings::with_seed(42));
        advance(&mut state, None, 0.0);
        state
    }

    /// Advance frame by frame over `(from, to]`
    fn advance_frames(state: &mut GameState, from: u32, to: u32) {
        for i in from + 1..=to {
            advance(state, None, frame_time(i));
        }
    }

    fn lose(state: &mut GameState) {
        let player = state.player.unwrap();
        let pos = state.player_entity().unwrap().pos;
        let enemy = state.spawn(Role::Enemy, pos, Vec2::splat(20.0));
        on_contact(state, player, enemy);
    }

    #[test]
    fn test_scenario_a_descent_despawns_without_score() {
        let mut state = new_state();
        let enemy = spawn_enemy_with_descent(&mut state, 4.0);

        advance_frames(&mut state, 0, 239);
        assert!(state.is_alive(enemy));

        advance(&mut state, None, 4.01);
        assert!(state.entity(enemy).is_none());
        assert_eq!(state.score, 0);
        assert!(state.scheduler.tasks_for(enemy).next().is_none());
    }

    #[test]
    fn test_scenario_b_fourth_beam_is_dropped() {
        let mut state = new_state();
        let at = Vec2::new(10.0, 10.0);
        for _ in 0..3 {
            assert!(matches!(tap(&mut state, at), TapOutcome::Fired(_)));
        }
        let count = state.entities.len();
        assert_eq!(tap(&mut state, at), TapOutcome::Dropped);
        assert_eq!(state.entities.len(), count);
        assert_eq!(state.player_beams, 3);
    }

    #[test]
    fn test_scenario_c_hit_scores_and_returns_budget() {
        let mut state = new_state();
        advance_frames(&mut state, 0, 100);
        let beam = fire_player_beam(&mut state).unwrap();
        fire_player_beam(&mut state).unwrap();
        let enemy = spawn_enemy_with_descent(&mut state, 5.0);
        let score = state.score;

        on_contact(&mut state, beam, enemy);
        assert_eq!(state.score, score + 10);
        assert_eq!(state.player_beams, 1);
    }

    #[test]
    fn test_scenario_d_loss_settles_into_wait() {
        let mut state = new_state();
        advance_frames(&mut state, 0, 60);
        lose(&mut state);
        assert_eq!(state.phase, GamePhase::GameOver);

        advance(&mut state, None, 1.0 + 1.49);
        assert_eq!(state.phase, GamePhase::GameOver);
        advance(&mut state, None, 1.0 + 1.5);
        assert_eq!(state.phase, GamePhase::WaitToRestartFromLose);
    }

    #[test]
    fn test_scenario_e_win_at_fifty_seconds() {
        let mut state = new_state();
        let mut won_at = None;
        let mut waiting_at = None;
        let mut wins = 0;

        for i in 1..=3200 {
            advance(&mut state, None, frame_time(i));
            wins += state
                .drain_events()
                .iter()
                .filter(|e| {
                    matches!(
                        e,
                        GameEvent::PhaseChanged {
                            to: GamePhase::GameWin,
                            ..
                        }
                    )
                })
                .count();
            if state.phase == GamePhase::GameWin && won_at.is_none() {
                won_at = Some(state.now);
            }
            if state.phase == GamePhase::WaitToRestartFromWin && waiting_at.is_none() {
                waiting_at = Some(state.now);
            }
        }

        assert_eq!(won_at, Some(50.0));
        assert_eq!(waiting_at, Some(52.5));
        assert_eq!(wins, 1);
        assert_eq!(state.alive_count(Role::Enemy), 0);
        assert_eq!(state.alive_count(Role::EnemyBeam), 0);
    }

    #[test]
    fn test_win_destroys_enemies_with_score() {
        let mut state = new_state();
        spawn_enemy_with_descent(&mut state, 5.0);
        spawn_enemy_with_descent(&mut state, 5.0);
        let shooter = spawn_enemy_with_descent(&mut state, 5.0);
        crate::sim::projectiles::fire_enemy_beam(&mut state, shooter);

        assert!(enter_game_win(&mut state));
        assert!(!enter_game_win(&mut state));
        assert_eq!(state.score, 30);
        assert_eq!(state.alive_count(Role::Enemy), 0);
        assert_eq!(state.alive_count(Role::EnemyBeam), 0);
        assert!(state.scheduler.is_empty());
        assert!(state.is_alive(state.player.unwrap()));
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut state = new_state();
        advance_frames(&mut state, 0, 600);
        fire_player_beam(&mut state);
        lose(&mut state);
        advance(&mut state, None, 12.0);
        assert_eq!(state.phase, GamePhase::WaitToRestartFromLose);

        assert_eq!(tap(&mut state, Vec2::new(1.0, 1.0)), TapOutcome::Restarted);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.score, 0);
        assert_eq!(state.player_beams, 0);
        assert_eq!(state.distance(), 0.0);
        assert_eq!(state.alive_count(Role::Enemy), 0);
        assert_eq!(state.alive_count(Role::EnemyBeam), 0);
        assert_eq!(state.alive_count(Role::PlayerBeam), 0);
        assert!(state.scheduler.is_empty());
        assert_eq!(
            state.player_entity().unwrap().pos,
            state.settings.dock_position()
        );
        assert_eq!(state.run, 2);

        // Progress restarts from the first Playing frame after restart
        advance(&mut state, None, 13.0);
        assert_eq!(state.progress.start_time, Some(13.0));
        advance(&mut state, None, 14.0);
        assert_eq!(state.distance(), 2.0);
    }

    #[test]
    fn test_restart_ignored_while_playing() {
        let mut state = new_state();
        assert!(!restart(&mut state));
        lose(&mut state);
        assert!(!restart(&mut state));
        assert_eq!(tap(&mut state, Vec2::ZERO), TapOutcome::Ignored);
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_win_wait_tap_fires_unless_on_restart_control() {
        let mut state = new_state();
        enter_game_win(&mut state);
        advance(&mut state, None, 3.0);
        assert_eq!(state.phase, GamePhase::WaitToRestartFromWin);
        assert!(state.events().contains(&GameEvent::RestartShown));

        assert!(matches!(tap(&mut state, Vec2::new(5.0, 5.0)), TapOutcome::Fired(_)));
        let (center, _) = state.settings.restart_control();
        assert_eq!(tap(&mut state, center), TapOutcome::Restarted);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_steering_is_binary_with_dead_zone() {
        let mut state = new_state();
        let start = state.player_entity().unwrap().pos;

        advance(&mut state, Some(Vec2::new(0.19, -0.1)), 0.1);
        assert_eq!(state.player_entity().unwrap().pos, start);

        advance(&mut state, Some(Vec2::new(0.25, 0.0)), 0.2);
        advance(&mut state, Some(Vec2::new(1.0, 0.9)), 0.3);
        let pos = state.player_entity().unwrap().pos;
        assert_eq!(pos.x, start.x + 10.0);
        assert_eq!(pos.y, start.y + 5.0);
    }

    #[test]
    fn test_steering_frozen_after_loss_but_not_after_win() {
        let mut state = new_state();
        enter_game_win(&mut state);
        let before = state.player_entity().unwrap().pos;
        advance(&mut state, Some(Vec2::new(1.0, 0.0)), 0.5);
        assert_eq!(state.player_entity().unwrap().pos.x, before.x + 5.0);

        let mut state = new_state();
        lose(&mut state);
        advance(&mut state, Some(Vec2::new(1.0, 0.0)), 0.5);
        assert!(state.player_entity().is_none());
    }

    #[test]
    fn test_loss_event_sequence() {
        let mut state = new_state();
        state.drain_events();
        lose(&mut state);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::StopLoop(Cue::Background)));
        assert!(events.contains(&GameEvent::PlayOnce(Cue::Lose)));
        assert!(events.contains(&GameEvent::ScoreboardHidden));
        assert!(events.contains(&GameEvent::InputSuspended));
        let explosions = events
            .iter()
            .filter(|e| matches!(e, GameEvent::Explosion { .. }))
            .count();
        assert_eq!(explosions, 2);
    }

    #[test]
    fn test_tick_resolves_frame_contacts() {
        let mut state = new_state();
        let pos = state.player_entity().unwrap().pos;
        state.spawn(Role::EnemyBeam, pos, Vec2::new(2.0, 8.0));

        let outcomes = tick(&mut state, &FrameInput::default(), 1.0 / 60.0);
        assert_eq!(outcomes, vec![ContactOutcome::PlayerShot]);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.entities.iter().all(|e| e.alive));
    }

    #[test]
    fn test_beam_expires_and_returns_budget() {
        let mut state = new_state();
        let input = FrameInput {
            steer: None,
            taps: vec![Vec2::ZERO],
        };
        tick(&mut state, &input, 1.0);
        assert_eq!(state.player_beams, 1);
        tick(&mut state, &FrameInput::default(), 1.49);
        assert_eq!(state.player_beams, 1);
        tick(&mut state, &FrameInput::default(), 1.5);
        assert_eq!(state.player_beams, 0);
        assert_eq!(state.alive_count(Role::PlayerBeam), 0);
    }

    #[test]
    fn test_same_seed_same_run() {
        let run = |seed| {
            let mut state = GameState::new(Settings::with_seed(seed));
            for i in 0..1800 {
                let input = FrameInput {
                    steer: Some(Vec2::new(((i / 90) % 2) as f32 * 2.0 - 1.0, 0.0)),
                    taps: if i % 20 == 0 { vec![Vec2::ZERO] } else { vec![] },
                };
                tick(&mut state, &input, frame_time(i));
            }
            (state.score, state.phase, state.stats, state.entities.len())
        };
        assert_eq!(run(7), run(7));
    }

    proptest! {
        #[test]
        fn prop_player_stays_in_bounds(
            steers in proptest::collection::vec((-1.0f32..=1.0, -1.0f32..=1.0), 1..300)
        ) {
            let mut state = new_state();
            let viewport = state.settings.viewport();
            let half = state.settings.player_half();
            for (i, (x, y)) in steers.into_iter().enumerate() {
                advance(&mut state, Some(Vec2::new(x, y)), frame_time(i as u32 + 1));
                if let Some(p) = state.player_entity() {
                    prop_assert!(p.pos.x >= half.x && p.pos.x <= viewport.x - half.x);
                    prop_assert!(p.pos.y >= half.y && p.pos.y <= viewport.y - half.y);
                }
            }
        }

        #[test]
        fn prop_beam_budget_holds(
            seed in any::<u64>(),
            frames in proptest::collection::vec((any::<bool>(), 1u32..20), 1..200)
        ) {
            let mut state = GameState::new(Settings::with_seed(seed));
            let mut frame = 0;
            for (fire, gap) in frames {
                frame += gap;
                let input = FrameInput {
                    steer: None,
                    taps: if fire { vec![Vec2::ZERO] } else { vec![] },
                };
                tick(&mut state, &input, frame_time(frame));
                prop_assert!(state.player_beams <= 3);
                prop_assert_eq!(state.player_beams as usize, state.alive_count(Role::PlayerBeam));
                if state.phase.is_waiting_to_restart() {
                    restart(&mut state);
                }
            }
        }

        #[test]
        fn prop_distance_never_decreases_and_win_fires_once(rate in 1.0f64..10.0) {
            let settings = Settings { distance_rate: rate, ..Settings::with_seed(3) };
            let mut state = GameState::new(settings);
            let mut last = 0.0;
            let mut wins = 0;
            for i in 0..(120.0 / rate * FPS) as u32 + 200 {
                advance(&mut state, None, frame_time(i));
                prop_assert!(state.distance() >= last);
                if state.phase == GamePhase::Playing {
                    prop_assert!(state.distance() < state.settings.win_distance);
                }
                last = state.distance();
                wins += state
                    .drain_events()
                    .iter()
                    .filter(|e| matches!(e, GameEvent::PhaseChanged { to: GamePhase::GameWin, .. }))
                    .count();
            }
            prop_assert_eq!(wins, 1);
        }
    }
}
