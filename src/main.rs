//! Star Runner headless host
//!
//! Drives the simulation with the fixed frame clock and a simple autopilot,
//! logging what a renderer and mixer would be asked to do.
//!
//! Usage: `star-runner [settings.json] [--seed N] [--seconds N] [--realtime] [--mute]`

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;
    use std::thread;
    use std::time::{Duration, Instant};

    use clap::Parser;
    use glam::Vec2;
    use star_runner::audio::LogAudio;
    use star_runner::consts::MAX_SUBSTEPS;
    use star_runner::platform::{FrameClock, InputGateway, SceneSink, dispatch, sync_positions};
    use star_runner::sim::{EntityId, GameEvent, GamePhase, GameState, Role, RunSummary, tick};
    use star_runner::Settings;

    /// Scene sink that keeps a node count and logs
    #[derive(Default)]
    struct LogScene {
        nodes: usize,
        explosions: usize,
    }

    impl SceneSink for LogScene {
        fn add_entity(&mut self, id: EntityId, role: Role, pos: Vec2, _half_extents: Vec2) {
            self.nodes += 1;
            log::trace!("add {:?} {} at ({:.0}, {:.0})", role, id, pos.x, pos.y);
        }

        fn remove_entity(&mut self, id: EntityId) {
            self.nodes = self.nodes.saturating_sub(1);
            log::trace!("remove {}", id);
        }

        fn set_position(&mut self, _id: EntityId, _pos: Vec2) {}

        fn show_explosion(&mut self, pos: Vec2) {
            self.explosions += 1;
            log::debug!("explosion at ({:.0}, {:.0})", pos.x, pos.y);
        }

        fn hud(&mut self, event: &GameEvent) {
            match event {
                GameEvent::ScoreChanged(score) => log::debug!("score {}", score),
                GameEvent::WinFlash { cycles } => log::info!("YOU WIN (flash x{})", cycles),
                GameEvent::RestartShown => log::info!("restart control shown"),
                _ => {}
            }
        }
    }

    #[derive(Parser)]
    #[command(name = "star-runner")]
    #[command(about = "Run the Star Runner simulation headless with an autopilot")]
    struct Args {
        /// JSON settings file; defaults are used when omitted or unreadable
        settings: Option<PathBuf>,

        /// Override the RNG seed from the settings
        #[arg(long)]
        seed: Option<u64>,

        /// Simulated seconds to run
        #[arg(long, default_value_t = 180.0)]
        seconds: f64,

        /// Pace frames against the wall clock instead of running flat out
        #[arg(long)]
        realtime: bool,

        /// Silence the audio log
        #[arg(long)]
        mute: bool,
    }

    /// Steer toward the nearest enemy's column, stay low, fire when lined up.
    /// Feeds raw-looking samples through the gateway like a device would.
    fn autopilot(state: &GameState, input: &mut InputGateway, frame: u64) {
        if state.phase.is_waiting_to_restart() {
            if frame % 60 == 0 {
                let (center, _) = state.settings.restart_control();
                let screen_y = state.settings.viewport_height - center.y;
                input.on_touch_began(center.x, screen_y);
            }
            return;
        }

        let Some(player) = state.player_entity() else { return };
        let target = state
            .entities
            .iter()
            .filter(|e| e.alive && e.role == Role::Enemy)
            .min_by(|a, b| {
                let da = (a.pos - player.pos).length_squared();
                let db = (b.pos - player.pos).length_squared();
                da.total_cmp(&db)
            });

        let dx = target.map_or(state.settings.viewport_width * 0.5 - player.pos.x, |e| {
            e.pos.x - player.pos.x
        });
        let tilt_x = (dx / 40.0).clamp(-1.0, 1.0);
        input.on_tilt(tilt_x, -0.5);

        if target.is_some() && dx.abs() < 12.0 && frame % 10 == 0 {
            input.on_touch_began(player.pos.x, state.settings.viewport_height - player.pos.y);
        }
    }

    /// Everything one frame touches
    struct Host {
        state: GameState,
        input: InputGateway,
        scene: LogScene,
        audio: LogAudio,
        finished: Vec<RunSummary>,
        frame: u64,
    }

    impl Host {
        fn frame(&mut self, now: f64) {
            autopilot(&self.state, &mut self.input, self.frame);
            let before = self.state.phase;
            let summary = self.state.summary();

            tick(&mut self.state, &self.input.sample(), now);

            if before.is_waiting_to_restart() && self.state.phase == GamePhase::Playing {
                self.finished.push(summary);
            }
            dispatch(
                self.state.drain_events(),
                &mut self.scene,
                &mut self.audio,
                &mut self.input,
            );
            sync_positions(&self.state, &mut self.scene);
            self.frame += 1;
        }
    }

    pub fn run() {
        env_logger::init();
        log::info!("Star Runner (headless) starting...");

        let args = Args::parse();
        let mut settings = Settings::load_or_default(args.settings.as_deref());
        if let Some(seed) = args.seed {
            settings.seed = seed;
        }

        let mut clock = FrameClock::new(settings.frame_rate, MAX_SUBSTEPS);
        let mut audio = LogAudio::new();
        audio.set_muted(args.mute);
        let mut host = Host {
            input: InputGateway::new(settings.viewport_height),
            scene: LogScene::default(),
            audio,
            state: GameState::new(settings),
            finished: Vec::new(),
            frame: 0,
        };

        if args.realtime {
            let mut last = Instant::now();
            while clock.now() < args.seconds {
                let real_dt = last.elapsed().as_secs_f64();
                last = Instant::now();
                for now in clock.update(real_dt) {
                    host.frame(now);
                }
                thread::sleep(Duration::from_secs_f64(clock.step() * 0.5));
            }
        } else {
            while clock.now() < args.seconds {
                let now = clock.next_frame();
                host.frame(now);
            }
        }
        host.finished.push(host.state.summary());

        log::info!(
            "{} runs, {} explosions, {} nodes in scene at exit",
            host.finished.len(),
            host.scene.explosions,
            host.scene.nodes
        );
        match serde_json::to_string_pretty(&host.finished) {
            Ok(json) => println!("{json}"),
            Err(e) => log::error!("failed to serialize run summaries: {e}"),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No wasm host; embed the library instead
}
