//! Playback arrangement integration tests.

use vidgif::{PlayMode, VidgifError, arrange, arrangement_order};

// ── Orders ─────────────────────────────────────────────────────────

#[test]
fn forward_is_identity() {
    assert_eq!(arrange(&[1, 2, 3, 4], PlayMode::Forward), [1, 2, 3, 4]);
}

#[test]
fn backward_reverses() {
    assert_eq!(arrange(&[1, 2, 3, 4], PlayMode::Backward), [4, 3, 2, 1]);
}

#[test]
fn ping_pong_odd_length() {
    assert_eq!(arrangement_order(5, PlayMode::PingPong), [0, 2, 4, 3, 1]);
}

#[test]
fn ping_pong_even_length() {
    assert_eq!(arrangement_order(6, PlayMode::PingPong), [0, 2, 4, 5, 3, 1]);
}

#[test]
fn short_sequences() {
    for mode in PlayMode::ALL {
        assert!(arrangement_order(0, mode).is_empty());
        assert_eq!(arrangement_order(1, mode), [0]);
    }
    assert_eq!(arrangement_order(2, PlayMode::PingPong), [0, 1]);
}

#[test]
fn every_order_is_a_permutation() {
    for mode in PlayMode::ALL {
        for len in 0..40 {
            let mut order = arrangement_order(len, mode);
            order.sort_unstable();
            assert_eq!(order, (0..len).collect::<Vec<_>>(), "{mode} with {len} frames");
        }
    }
}

#[test]
fn backward_twice_restores_original_order() {
    for len in 0..20 {
        let frames: Vec<usize> = (0..len).collect();
        let twice = arrange(&arrange(&frames, PlayMode::Backward), PlayMode::Backward);
        assert_eq!(twice, frames, "{len} frames");
    }
}

#[test]
fn arrange_leaves_input_untouched() {
    let frames = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    let arranged = arrange(&frames, PlayMode::Backward);
    assert_eq!(frames, ["a", "b", "c"]);
    assert_eq!(arranged, ["c", "b", "a"]);
}

#[test]
fn apply_matches_arrange() {
    let frames: Vec<u32> = (0..9).collect();
    for mode in PlayMode::ALL {
        assert_eq!(mode.apply(frames.clone()), arrange(&frames, mode));
    }
}

// ── Toggling ───────────────────────────────────────────────────────

#[test]
fn toggle_cycles_through_all_modes() {
    let mut mode = PlayMode::default();
    assert_eq!(mode, PlayMode::Forward);

    mode = mode.next();
    assert_eq!(mode, PlayMode::Backward);
    mode = mode.next();
    assert_eq!(mode, PlayMode::PingPong);
    mode = mode.next();
    assert_eq!(mode, PlayMode::Forward);
}

// ── Parsing ────────────────────────────────────────────────────────

#[test]
fn names_round_trip_through_from_str() {
    for mode in PlayMode::ALL {
        assert_eq!(mode.to_string().parse::<PlayMode>().unwrap(), mode);
    }
}

#[test]
fn aliases_parse() {
    assert_eq!("REVERSE".parse::<PlayMode>().unwrap(), PlayMode::Backward);
    assert_eq!("ping-pong".parse::<PlayMode>().unwrap(), PlayMode::PingPong);
    assert_eq!("boomerang".parse::<PlayMode>().unwrap(), PlayMode::PingPong);
}

#[test]
fn unknown_mode_is_invalid_input() {
    assert!(matches!(
        "sideways".parse::<PlayMode>(),
        Err(VidgifError::InvalidInput(_))
    ));
}
