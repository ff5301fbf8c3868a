//! Integration tests for the starfield simulator and its animator.

use starscape::prelude::*;
use starscape::starfield::wrap;
use starscape::{DrawCommand, StarfieldError};

// ============================================================================
// Helpers
// ============================================================================

fn quiet_config() -> StarfieldConfig {
    StarfieldConfig::default().with_comets(0.0, 2)
}

fn field(config: StarfieldConfig, seed: u64, width: f32, height: f32) -> Starfield<SeededRandom> {
    let mut field = Starfield::new(config, SeededRandom::new(seed));
    field.resize(width, height);
    field
}

fn wrapped_distance(a: f32, b: f32, extent: f32) -> f32 {
    let d = (a - b).abs();
    d.min(extent - d)
}

// ============================================================================
// Populations
// ============================================================================

#[test]
fn test_full_hd_population() {
    let field = field(StarfieldConfig::default(), 1, 1920.0, 1080.0);
    let counts = field.counts();
    assert_eq!(counts.drift, 518);
    assert_eq!(counts.fixed, 172);
    assert_eq!(counts.scroll, 259);
    assert!(field.comets().is_empty());
}

#[test]
fn test_zero_size_draws_nothing() {
    let mut field = field(quiet_config(), 1, 0.0, 600.0);
    let mut surface = RecordingSurface::new(0.0, 600.0);
    field.step(&mut surface, FrameInput::default());
    assert_eq!(surface.clear_count(), 1);
    assert!(surface.commands().is_empty());
}

#[test]
fn test_every_star_starts_inside_the_surface() {
    let field = field(StarfieldConfig::default(), 9, 800.0, 600.0);
    let all = field
        .fixed_stars()
        .iter()
        .chain(field.scroll_stars())
        .chain(field.drift_stars());
    for star in all {
        assert!((0.0..800.0).contains(&star.position.x));
        assert!((0.0..600.0).contains(&star.position.y));
        assert!(star.alpha > 0.0);
    }
}

// ============================================================================
// Motion
// ============================================================================

#[test]
fn test_fixed_stars_never_move() {
    let mut field = field(quiet_config(), 3, 800.0, 600.0);
    let before: Vec<Vec2> = field.fixed_stars().iter().map(|s| s.position).collect();
    let mut surface = RecordingSurface::new(800.0, 600.0);
    for frame in 0..30 {
        field.step(
            &mut surface,
            FrameInput {
                pointer: Some(Vec2::new(400.0, 300.0)),
                scroll_y: frame as f32 * 20.0,
            },
        );
    }
    let after: Vec<Vec2> = field.fixed_stars().iter().map(|s| s.position).collect();
    assert_eq!(before, after);
}

#[test]
fn test_first_frame_has_no_scroll_kick() {
    let mut field = field(quiet_config(), 4, 800.0, 600.0);
    let before: Vec<f32> = field.scroll_stars().iter().map(|s| s.position.y).collect();
    let mut surface = RecordingSurface::new(800.0, 600.0);
    field.step(
        &mut surface,
        FrameInput {
            pointer: None,
            scroll_y: 1200.0,
        },
    );
    let after: Vec<f32> = field.scroll_stars().iter().map(|s| s.position.y).collect();
    assert_eq!(before, after);
}

#[test]
fn test_scroll_moves_bright_stars_further() {
    let config = quiet_config();
    let mut field = field(config.clone(), 5, 800.0, 600.0);
    let mut surface = RecordingSurface::new(800.0, 600.0);
    field.step(&mut surface, FrameInput::default());
    let before: Vec<(f32, f32)> = field
        .scroll_stars()
        .iter()
        .map(|s| (s.position.y, s.alpha))
        .collect();

    field.step(
        &mut surface,
        FrameInput {
            pointer: None,
            scroll_y: 100.0,
        },
    );

    for ((y0, alpha), star) in before.iter().zip(field.scroll_stars()) {
        let velocity = -100.0 * config.scroll_parallax * (alpha * 2.0) * config.scroll_damping;
        let expected = wrap(y0 + velocity, 600.0);
        assert!(
            wrapped_distance(star.position.y, expected, 600.0) < 1e-2,
            "expected {expected}, got {}",
            star.position.y
        );
    }
}

#[test]
fn test_pointer_pulls_nearby_stars_in() {
    let pointer = Vec2::new(400.0, 300.0);
    let mut attracted = field(quiet_config(), 11, 800.0, 600.0);
    let mut free = field(quiet_config(), 11, 800.0, 600.0);
    let mut surface = RecordingSurface::new(800.0, 600.0);

    let watched: Vec<usize> = attracted
        .drift_stars()
        .iter()
        .enumerate()
        .filter(|(_, s)| (100.0..300.0).contains(&s.position.distance(pointer)))
        .map(|(i, _)| i)
        .collect();
    assert!(!watched.is_empty());

    for _ in 0..30 {
        attracted.step(
            &mut surface,
            FrameInput {
                pointer: Some(pointer),
                scroll_y: 0.0,
            },
        );
        free.step(&mut surface, FrameInput::default());
    }

    let mean = |field: &Starfield<SeededRandom>| {
        watched
            .iter()
            .map(|&i| field.drift_stars()[i].position.distance(pointer))
            .sum::<f32>()
            / watched.len() as f32
    };
    assert!(mean(&attracted) < mean(&free) - 10.0);
}

// ============================================================================
// Comets
// ============================================================================

#[test]
fn test_comet_cap_holds() {
    let config = StarfieldConfig::default().with_comets(1.0, 2);
    let mut field = field(config, 21, 800.0, 600.0);
    let mut surface = RecordingSurface::new(800.0, 600.0);
    let mut most = 0;
    for _ in 0..400 {
        field.step(&mut surface, FrameInput::default());
        assert!(field.comets().len() <= 2);
        most = most.max(field.comets().len());
    }
    assert_eq!(most, 2);
}

#[test]
fn test_faded_comets_are_never_drawn() {
    let config = StarfieldConfig {
        comet_decay: 0.6,
        ..StarfieldConfig::default().with_comets(1.0, 2)
    };
    let mut field = field(config, 8, 800.0, 600.0);
    let mut surface = RecordingSurface::new(800.0, 600.0);
    for _ in 0..20 {
        field.step(&mut surface, FrameInput::default());
        assert!(field.comets().iter().all(|c| c.alpha > 0.0));
        for command in surface.commands() {
            if let DrawCommand::Circle { alpha, .. } = command {
                assert!(*alpha > 0.0);
            }
        }
    }
}

// ============================================================================
// Animator
// ============================================================================

#[test]
fn test_animator_needs_a_surface() {
    let mut clock = ManualClock::new();
    let field = Starfield::new(StarfieldConfig::default(), SeededRandom::new(1));
    let refused = matches!(
        StarfieldAnimator::<RecordingSurface, _, _>::start(field, None, &mut clock),
        Err(StarfieldError::MissingSurface)
    );
    assert!(refused);
    assert_eq!(clock.request_count(), 0);
}

#[test]
fn test_animator_runs_until_dropped() {
    let mut clock = ManualClock::new();
    {
        let field = Starfield::new(quiet_config(), SeededRandom::new(1));
        let surface = RecordingSurface::new(640.0, 480.0);
        let mut animator = StarfieldAnimator::start(field, Some(surface), &mut clock).unwrap();
        assert_eq!(animator.field().counts().drift, 76);

        for _ in 0..3 {
            assert!(animator.frame(FrameInput::default()));
        }
        assert_eq!(animator.surface().clear_count(), 3);

        animator.surface_mut().resize(320.0, 240.0);
        animator.frame(FrameInput::default());
        assert_eq!(animator.field().counts().drift, 19);
    }
    assert_eq!(clock.request_count(), 5);
    assert_eq!(clock.cancel_count(), 1);
    assert!(!clock.is_pending());
}
