use clap::Parser;
use embassy_executor::Executor;
use embedded_hal::delay::DelayNs;
use std::{io::BufRead, path::PathBuf};
use tracing::{debug, error, info};
use vacpi_core::mk_static;
use vacpi_core::utils::connection::shell::{self, ShellCommand};
use vacpi_core::utils::controllers::{ChassisConfig, ObstacleSensors, SystemController};
use vacpi_core::utils::navigation::{Direction, Movements, Obstruction, Speed, Turn};
use vacpi_core::utils::{Delay, Duration};

#[derive(Parser)]
#[clap(version = "1.0")]
struct Opts
{
    /// control cycle period in milliseconds
    #[clap(long, default_value_t = 50)]
    period_ms: u64,
    /// stop after this many cycles (runs forever if omitted)
    #[clap(long)]
    cycles: Option<u32>,
    /// put an obstacle in front of the robot every N cycles
    #[clap(long, default_value_t = 60)]
    obstacle_every: u32,
    /// number of cycles each obstacle stays in front
    #[clap(long, default_value_t = 3)]
    obstacle_len: u32,
    /// lift the robot off the floor for five cycles starting at this cycle
    #[clap(long)]
    lift_at: Option<u32>,
    /// JSON file overriding the chassis speed tiers and timings
    #[clap(long)]
    config: Option<PathBuf>,
}

/// Chassis stand-in that logs the wheel commands it would apply.
struct LogChassis {
    config: ChassisConfig,
    delay: Delay,
}

impl Movements for LogChassis {
    fn stop_all(&mut self) {
        info!("stop all engines");
    }

    fn start_vacuum(&mut self) {
        debug!(brush = self.config.brush, vacuum = self.config.vacuum, "vacuum on");
    }

    fn stop_vacuum(&mut self) {
        info!("vacuum off");
    }

    fn move_straight(
        &mut self,
        direction: Direction,
    ) {
        info!(?direction, speed = self.config.fast, "straight");
    }

    fn rotate45(
        &mut self,
        turn: Turn,
    ) {
        let (left, right) = self.config.rotation(turn);
        info!(?turn, ?left, ?right, "rotate 45");
        self.delay.delay_ms(self.config.rotate_settle_ms);
    }

    fn spiral(
        &mut self,
        turn: Turn,
        age: u32,
    ) {
        let inner = self.config.spiral.inner_speed(age);
        let (left, right) = self.config.differential(Direction::Forward, turn, inner);
        info!(?turn, age, ?left, ?right, "spiral");
    }

    fn curve(
        &mut self,
        direction: Direction,
        turn: Turn,
        speed: Speed,
    ) {
        let inner = self.config.curve_speed(speed);
        let (left, right) = self.config.differential(direction, turn, inner);
        info!(?direction, ?turn, ?speed, ?left, ?right, "curve");
    }
}

/// Replays a fixed obstacle pattern instead of reading real sensors.
struct ScriptedSensors {
    cycle: u32,
    obstacle_every: u32,
    obstacle_len: u32,
    lift_at: Option<u32>,
}

impl ObstacleSensors for ScriptedSensors {
    fn read(&mut self) -> Obstruction {
        self.cycle = self.cycle.wrapping_add(1);
        let front = self.obstacle_every > 0 && self.cycle % self.obstacle_every < self.obstacle_len;
        let lifted = self
            .lift_at
            .is_some_and(|at| (at..at.saturating_add(5)).contains(&self.cycle));
        Obstruction {
            front,
            left: lifted,
            right: lifted,
            ..Default::default()
        }
    }
}

type Controller = SystemController<LogChassis, ScriptedSensors>;

#[embassy_executor::task]
async fn control_task(
    ctrl: Controller,
    period: Duration,
    limit: Option<u32>,
) {
    let mut ctrl = ctrl;
    ctrl.run(period, limit).await;
    info!(state = ctrl.looper().state().name(), "simulation finished");
    std::process::exit(0);
}

/// Forward `;`-terminated commands typed on stdin to the control loop.
fn spawn_shell_reader() {
    std::thread::spawn(|| {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    for command in ShellCommand::parse_all(&line) {
                        shell::forward(command);
                    }
                }
                Err(e) => {
                    error!("stdin read failed: {:?}", e);
                    break;
                }
            }
        }
    });
}

fn load_config(path: Option<&PathBuf>) -> Result<ChassisConfig, String> {
    let Some(path) = path else {
        return Ok(ChassisConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    serde_json::from_str(&raw).map_err(|e| format!("invalid config {}: {}", path.display(), e))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let opts: Opts = Opts::parse();
    let config = match load_config(opts.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    info!(?config, "chassis configuration");

    let chassis = LogChassis {
        config,
        delay: Delay,
    };
    let sensors = ScriptedSensors {
        cycle: 0,
        obstacle_every: opts.obstacle_every,
        obstacle_len: opts.obstacle_len,
        lift_at: opts.lift_at,
    };
    let ctrl = SystemController::new(chassis, sensors, None);
    let period = Duration::from_millis(opts.period_ms);

    spawn_shell_reader();
    info!("type `debug;` or `test;` to toggle shell flags");

    let executor = mk_static!(Executor, Executor::new());
    executor.run(move |spawner| {
        if let Err(e) = spawner.spawn(control_task(ctrl, period, opts.cycles)) {
            error!("failed to spawn control task: {:?}", e);
            std::process::exit(1);
        }
    });
}
