//! Map absolute times onto the bar grid.
//!
//! The playhead and every detected beat go through the same two functions, so
//! both land on the same horizontal scale. `delay` shifts the grid to
//! compensate for the microphone round trip.

/// Fraction of the way through the current bar, in [0, 1).
///
/// Times before the grid origin (the look-ahead lead-in, or a clap that
/// lands just early) clamp to 0 rather than wrapping to the end of a bar.
pub fn position_in_bar(t: f64, start_time: f64, seconds_per_bar: f64, delay: f64) -> f64 {
    let elapsed = t - start_time - delay;
    let fraction = (elapsed % seconds_per_bar) / seconds_per_bar;

    if fraction >= 1.0 {
        0.0
    } else {
        fraction.max(0.0)
    }
}

/// Index of the bar containing `t`. Negative before the grid origin.
pub fn bar_number(t: f64, start_time: f64, seconds_per_bar: f64, delay: f64) -> i64 {
    ((t - start_time - delay) / seconds_per_bar).floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_of_a_bar() {
        assert!((position_in_bar(1.5, 1.0, 2.0, 0.0) - 0.25).abs() < 1e-12);
        assert_eq!(bar_number(1.5, 1.0, 2.0, 0.0), 0);
    }

    #[test]
    fn delay_shifts_grid() {
        assert!((position_in_bar(1.6, 1.0, 2.0, 0.1) - 0.25).abs() < 1e-12);
        assert_eq!(bar_number(3.05, 1.0, 2.0, 0.1), 0);
        assert_eq!(bar_number(3.15, 1.0, 2.0, 0.1), 1);
    }

    #[test]
    fn position_always_in_unit_range() {
        let spb = 60.0 / 97.0 * 7.0;
        let mut t = -3.0;
        while t < 40.0 {
            let p = position_in_bar(t, 0.37, spb, 0.042);
            assert!((0.0..1.0).contains(&p), "position {p} at t={t}");
            t += 0.0137;
        }

        assert!((0.0..1.0).contains(&position_in_bar(-1e-17, 0.0, 2.0, 0.0)));
    }

    #[test]
    fn bar_number_never_decreases() {
        let mut last = i64::MIN;
        let mut t = 0.0;
        while t < 30.0 {
            let bar = bar_number(t, 0.1, 1.5, 0.03);
            assert!(bar >= last);
            last = bar;
            t += 0.01;
        }
        assert_eq!(last, 19);
    }

    #[test]
    fn before_origin_is_negative_bar() {
        assert_eq!(bar_number(0.5, 1.0, 2.0, 0.0), -1);
        assert_eq!(position_in_bar(0.5, 1.0, 2.0, 0.0), 0.0);
    }

    #[test]
    fn early_clap_clamps_to_bar_start() {
        // Lead-in before the first downbeat, and a clap 30ms ahead of a
        // delayed grid
        assert_eq!(position_in_bar(0.95, 1.0, 2.0, 0.0), 0.0);
        assert_eq!(position_in_bar(1.05, 1.0, 2.0, 0.08), 0.0);
        assert_eq!(bar_number(1.05, 1.0, 2.0, 0.08), -1);

        // Past the origin nothing changes
        assert!((position_in_bar(3.5, 1.0, 2.0, 0.0) - 0.25).abs() < 1e-12);
    }
}
