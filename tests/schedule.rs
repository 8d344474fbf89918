//! Strength schedule behavior.

use meltdown::{DEFAULT_BASE_STRENGTH, strength_at};

#[test]
fn first_frame_of_ten_gets_base_plus_a_tenth() {
    assert_eq!(strength_at(1, 10, 1.7), 1.8);
}

#[test]
fn last_frame_reaches_base_plus_one() {
    assert_eq!(strength_at(10, 10, 1.7), 2.7);
    assert_eq!(strength_at(24, 24, 2.0), 3.0);
}

#[test]
fn strength_rounds_to_two_decimals() {
    // 1/3 + 1.7 = 2.0333... -> 2.03
    assert_eq!(strength_at(1, 3, 1.7), 2.03);
    // 2/3 + 1.7 = 2.3666... -> 2.37
    assert_eq!(strength_at(2, 3, 1.7), 2.37);
}

#[test]
fn strength_never_decreases_over_a_sequence() {
    let total = 60;
    let mut previous = 0.0;
    for frame in 1..=total {
        let strength = strength_at(frame, total, DEFAULT_BASE_STRENGTH);
        assert!(
            strength >= previous,
            "strength dropped at frame {frame}: {previous} -> {strength}"
        );
        previous = strength;
    }
}

#[test]
fn single_frame_sequence_gets_base_plus_one() {
    assert_eq!(strength_at(1, 1, 1.7), 2.7);
}
