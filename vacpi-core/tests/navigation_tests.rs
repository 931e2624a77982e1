use vacpi_core::utils::connection::shell::ShellCommand;
use vacpi_core::utils::controllers::{DebugFlags, SystemController};
use vacpi_core::utils::navigation::{
    Circling, Direction, EdgeRun, LinearRun, Looper, Movements, NavigationState, Obstruction,
    Speed, Turn,
};

/// Movement command as seen by the actuator binding.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Cmd {
    StopAll,
    StartVacuum,
    StopVacuum,
    Straight(Direction),
    Rotate(Turn),
    Spiral(Turn, u32),
    Curve(Direction, Turn, Speed),
}

/// Records every command it receives.
#[derive(Default)]
struct Recorder {
    log: Vec<Cmd>,
}

impl Recorder {
    /// Commands other than the per-cycle vacuum start.
    fn motions(&self) -> Vec<Cmd> {
        self.log
            .iter()
            .copied()
            .filter(|c| *c != Cmd::StartVacuum)
            .collect()
    }
}

impl Movements for Recorder {
    fn stop_all(&mut self) {
        self.log.push(Cmd::StopAll);
    }

    fn start_vacuum(&mut self) {
        self.log.push(Cmd::StartVacuum);
    }

    fn stop_vacuum(&mut self) {
        self.log.push(Cmd::StopVacuum);
    }

    fn move_straight(
        &mut self,
        direction: Direction,
    ) {
        self.log.push(Cmd::Straight(direction));
    }

    fn rotate45(
        &mut self,
        turn: Turn,
    ) {
        self.log.push(Cmd::Rotate(turn));
    }

    fn spiral(
        &mut self,
        turn: Turn,
        age: u32,
    ) {
        self.log.push(Cmd::Spiral(turn, age));
    }

    fn curve(
        &mut self,
        direction: Direction,
        turn: Turn,
        speed: Speed,
    ) {
        self.log.push(Cmd::Curve(direction, turn, speed));
    }
}

fn clear() -> Obstruction {
    Obstruction::default()
}

fn front() -> Obstruction {
    Obstruction {
        front: true,
        ..Default::default()
    }
}

fn run_clear<M: Movements>(
    looper: &mut Looper<M>,
    ticks: u32,
) {
    for _ in 0..ticks {
        looper.advance(clear());
    }
}

#[test]
fn starts_in_fresh_linear_run() {
    let looper = Looper::new(Recorder::default());
    assert_eq!(*looper.state(), NavigationState::LinearRun(LinearRun::new()));
    assert_eq!(looper.state().timer(), 0);
}

#[test]
fn linear_run_switches_to_fresh_circling_on_tick_101() {
    let mut looper = Looper::new(Recorder::default());
    run_clear(&mut looper, 100);
    assert!(matches!(looper.state(), NavigationState::LinearRun(_)));
    assert_eq!(looper.state().timer(), 100);

    looper.advance(clear());
    assert_eq!(*looper.state(), NavigationState::Circling(Circling::new()));

    let motions = looper.movements().motions();
    assert_eq!(motions.len(), 100);
    assert!(motions.iter().all(|c| *c == Cmd::Straight(Direction::Forward)));
}

#[test]
fn linear_run_obstruction_rotates_without_resetting_age() {
    let mut looper = Looper::new(Recorder::default());
    run_clear(&mut looper, 10);
    looper.advance(front());

    assert!(matches!(looper.state(), NavigationState::LinearRun(_)));
    assert_eq!(looper.state().timer(), 11);
    let rotations = looper
        .movements()
        .log
        .iter()
        .filter(|c| matches!(c, Cmd::Rotate(_)))
        .count();
    assert_eq!(rotations, 1);
    assert_eq!(looper.movements().log.last(), Some(&Cmd::Rotate(Turn::Left)));
}

#[test]
fn obstruction_on_tick_101_is_checked_before_age() {
    let mut looper = Looper::new(Recorder::default());
    run_clear(&mut looper, 100);
    looper.advance(front());

    let motions = looper.movements().motions();
    assert_eq!(motions.len(), 101);
    assert!(motions[..100]
        .iter()
        .all(|c| *c == Cmd::Straight(Direction::Forward)));
    assert_eq!(motions[100], Cmd::Rotate(Turn::Left));
    assert!(matches!(looper.state(), NavigationState::LinearRun(_)));
    assert_eq!(looper.state().timer(), 101);

    // The next clear tick finally hands over to circling.
    looper.advance(clear());
    assert_eq!(*looper.state(), NavigationState::Circling(Circling::new()));
}

#[test]
fn circling_restarts_spiral_after_101_ticks() {
    let mut looper = Looper::new(Recorder::default());
    run_clear(&mut looper, 101);
    looper.movements_mut().log.clear();

    run_clear(&mut looper, 100);
    assert_eq!(looper.state().timer(), 100);
    assert_eq!(
        looper.movements().motions().last(),
        Some(&Cmd::Spiral(Turn::Left, 100))
    );

    looper.advance(clear());
    assert_eq!(*looper.state(), NavigationState::Circling(Circling::new()));

    // The new spiral starts again from its innermost radius.
    looper.advance(clear());
    assert_eq!(
        looper.movements().motions().last(),
        Some(&Cmd::Spiral(Turn::Left, 1))
    );
}

#[test]
fn circling_obstruction_enters_edge_run() {
    let mut looper = Looper::new(Recorder::default());
    run_clear(&mut looper, 101);
    run_clear(&mut looper, 7);
    looper.advance(front());
    assert_eq!(*looper.state(), NavigationState::EdgeRun(EdgeRun::new()));
}

#[test]
fn edge_run_contact_reverses_and_clear_run_returns_to_circling() {
    let mut looper = Looper::new(Recorder::default());
    run_clear(&mut looper, 101);
    looper.advance(front());
    looper.movements_mut().log.clear();

    run_clear(&mut looper, 30);
    looper.advance(front());
    match looper.state() {
        NavigationState::EdgeRun(edge) => {
            assert_eq!(edge.straight_timer(), 0);
            assert_eq!(edge.obstruction_timer(), 0);
            assert_eq!(edge.timer(), 31);
        }
        other => panic!("expected edge run, got {:?}", other),
    }
    assert_eq!(
        looper.movements().log.last(),
        Some(&Cmd::Curve(Direction::Backward, Turn::Right, Speed::Fast))
    );

    let motions = looper.movements().motions();
    assert_eq!(motions[..5], [Cmd::Straight(Direction::Forward); 5]);
    assert_eq!(
        motions[5],
        Cmd::Curve(Direction::Forward, Turn::Right, Speed::Slow)
    );

    run_clear(&mut looper, 50);
    assert!(matches!(looper.state(), NavigationState::EdgeRun(_)));
    looper.advance(clear());
    assert_eq!(*looper.state(), NavigationState::Circling(Circling::new()));
}

#[test]
fn dust_alarm_stops_and_keeps_state() {
    let mut looper = Looper::new(Recorder::default());
    run_clear(&mut looper, 42);
    let before = *looper.state();
    looper.movements_mut().log.clear();

    for front in [false, true] {
        looper.advance(Obstruction {
            dust_level: true,
            front,
            center: true,
            ..Default::default()
        });
    }

    assert_eq!(*looper.state(), before);
    assert_eq!(looper.movements().log, vec![Cmd::StopAll, Cmd::StopAll]);
}

#[test]
fn lifted_chassis_stops_and_keeps_state() {
    let mut looper = Looper::new(Recorder::default());
    run_clear(&mut looper, 101);
    looper.advance(front());
    run_clear(&mut looper, 3);
    let before = *looper.state();
    looper.movements_mut().log.clear();

    looper.advance(Obstruction {
        left: true,
        right: true,
        center: true,
        front: true,
        ..Default::default()
    });

    assert_eq!(*looper.state(), before);
    assert_eq!(looper.movements().log, vec![Cmd::StopAll]);
}

#[test]
fn safety_stop_latches_until_sensors_clear() {
    let mut looper = Looper::new(Recorder::default());
    run_clear(&mut looper, 5);
    let lifted = Obstruction {
        left: true,
        right: true,
        ..Default::default()
    };

    for _ in 0..3 {
        looper.advance(lifted);
        assert!(looper.is_halted());
    }
    assert_eq!(looper.state().timer(), 5);

    looper.advance(clear());
    assert!(!looper.is_halted());
    assert_eq!(looper.state().timer(), 6);
    assert_eq!(
        looper.movements().motions()[5..],
        [
            Cmd::StopAll,
            Cmd::StopAll,
            Cmd::StopAll,
            Cmd::Straight(Direction::Forward)
        ]
    );
}

#[test]
fn single_side_sensor_does_not_steer() {
    let mut looper = Looper::new(Recorder::default());
    looper.advance(Obstruction {
        left: true,
        center: true,
        ..Default::default()
    });
    assert_eq!(
        looper.movements().log,
        vec![Cmd::StartVacuum, Cmd::Straight(Direction::Forward)]
    );
}

#[test]
fn looper_borrows_binding() {
    let mut recorder = Recorder::default();
    {
        let mut looper = Looper::new(&mut recorder);
        run_clear(&mut looper, 3);
    }
    assert_eq!(recorder.log.len(), 6);
}

#[test]
fn controller_toggles_flags_from_shell() {
    let mut ctrl = SystemController::new(Recorder::default(), clear, None);
    assert_eq!(ctrl.flags(), DebugFlags::default());

    ctrl.handle_command(ShellCommand::Debug);
    assert!(ctrl.flags().debug);
    ctrl.handle_command(ShellCommand::Invalid);
    assert!(ctrl.flags().debug);
    ctrl.handle_command(ShellCommand::Debug);
    assert!(!ctrl.flags().debug);
}

#[test]
fn controller_test_mode_holds_navigation() {
    let mut ctrl = SystemController::new(Recorder::default(), front, None);
    ctrl.handle_command(ShellCommand::Test);
    assert!(ctrl.flags().test_mode);

    for _ in 0..5 {
        ctrl.cycle();
    }
    assert_eq!(ctrl.looper().movements().log, vec![Cmd::StopAll]);
    assert_eq!(ctrl.looper().state().timer(), 0);

    ctrl.handle_command(ShellCommand::Test);
    ctrl.cycle();
    assert_eq!(ctrl.looper().state().timer(), 1);
    assert_eq!(
        ctrl.looper().movements().log.last(),
        Some(&Cmd::Rotate(Turn::Left))
    );
}

#[test]
fn controller_cycle_feeds_sensor_snapshot() {
    let mut tick = 0u32;
    let sensors = move || {
        tick += 1;
        Obstruction {
            front: tick % 2 == 0,
            ..Default::default()
        }
    };
    let mut ctrl = SystemController::new(
        Recorder::default(),
        sensors,
        Some(DebugFlags {
            debug: true,
            test_mode: false,
        }),
    );
    for _ in 0..4 {
        ctrl.cycle();
    }
    assert_eq!(
        ctrl.looper().movements().motions(),
        vec![
            Cmd::Straight(Direction::Forward),
            Cmd::Rotate(Turn::Left),
            Cmd::Straight(Direction::Forward),
            Cmd::Rotate(Turn::Left),
        ]
    );
}
