use approx::assert_relative_eq;

use stellar_core::simulation::timewarp::{time_warp_settings, TimewarpScheduler, WarpSettings, DEFAULT_LADDER};

fn settings(steps: u32, sub_time_step: f64, render_skip: u32) -> WarpSettings {
    WarpSettings { steps, sub_time_step, render_skip }
}

// ==================================================================================
// Warp bands
// ==================================================================================

#[test]
fn real_time_runs_one_tick() {
    assert_eq!(time_warp_settings(1), settings(1, 1.0, 1));
    assert_eq!(time_warp_settings(0), settings(1, 1.0, 1));
}

#[test]
fn low_warp_runs_unit_ticks() {
    assert_eq!(time_warp_settings(2), settings(2, 1.0, 1));
    assert_eq!(time_warp_settings(5), settings(5, 1.0, 1));
}

#[test]
fn mid_warp_stretches_five_ticks() {
    assert_eq!(time_warp_settings(10), settings(5, 2.0, 1));
    assert_eq!(time_warp_settings(25), settings(5, 5.0, 2));
}

#[test]
fn render_skip_never_drops_to_zero() {
    assert_eq!(time_warp_settings(6).render_skip, 1);
    assert_relative_eq!(time_warp_settings(6).sub_time_step, 1.2);
}

#[test]
fn high_warp_bands() {
    let s50 = time_warp_settings(50);
    assert_eq!(s50.steps, 13);
    assert_eq!(s50.render_skip, 2);
    assert_relative_eq!(s50.sub_time_step, 50.0 / 13.0);

    assert_eq!(time_warp_settings(100), settings(25, 4.0, 4));
    assert_eq!(time_warp_settings(200), settings(40, 5.0, 8));
    assert_eq!(time_warp_settings(1000), settings(200, 5.0, 8));
}

// ==================================================================================
// Scheduler
// ==================================================================================

#[test]
fn ladder_clamps_at_both_ends() {
    let mut tw = TimewarpScheduler::default();
    assert_eq!(tw.current_warp(), 1);
    assert_eq!(tw.decrease(), 1);

    for _ in 0..10 {
        tw.increase();
    }
    assert_eq!(tw.current_warp(), *DEFAULT_LADDER.last().expect("non-empty ladder"));
    assert_eq!(tw.level(), DEFAULT_LADDER.len() - 1);

    assert_eq!(tw.decrease(), DEFAULT_LADDER[DEFAULT_LADDER.len() - 2]);
}

#[test]
fn empty_ladder_falls_back_to_real_time() {
    let tw = TimewarpScheduler::new(Vec::new());
    assert_eq!(tw.ladder(), &[1]);
    assert_eq!(tw.current_warp(), 1);
}

#[test]
fn set_level_clamps() {
    let mut tw = TimewarpScheduler::new(vec![1, 10, 100]);
    assert_eq!(tw.set_level(1), 10);
    assert_eq!(tw.set_level(99), 100);
}

#[test]
fn pause_stops_physics_but_keeps_rendering() {
    let mut tw = TimewarpScheduler::new(vec![1, 25]);
    tw.increase();
    assert!(tw.toggle_pause());
    assert_eq!(tw.current_warp(), 0);

    for _ in 0..3 {
        let plan = tw.plan_frame();
        assert_eq!(plan.physics_steps, 0);
        assert!(plan.render);
    }

    assert!(!tw.toggle_pause());
    assert_eq!(tw.current_warp(), 25);
}

#[test]
fn reset_returns_to_first_rung_and_unpauses() {
    let mut tw = TimewarpScheduler::default();
    tw.increase();
    tw.increase();
    tw.toggle_pause();

    tw.reset();

    assert!(!tw.is_paused());
    assert_eq!(tw.level(), 0);
    assert_eq!(tw.current_warp(), 1);
}

#[test]
fn plan_frame_skips_renders_at_high_warp() {
    let mut tw = TimewarpScheduler::new(vec![25]);

    let renders: Vec<bool> = (0..4).map(|_| tw.plan_frame().render).collect();
    assert_eq!(renders, vec![false, true, false, true]);

    let plan = tw.plan_frame();
    assert_eq!(plan.physics_steps, 5);
    assert_relative_eq!(plan.sub_time_step, 5.0);
}
