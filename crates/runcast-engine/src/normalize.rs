// Turns six adjusted outcome probabilities into a valid seven-way
// distribution.

use runcast_core::{EventRates, OutcomeProbabilities};

/// Sums within this distance above 1.0 are treated as exactly full. Keeps a
/// second pass over normalized output from rescaling rounding noise.
const RESCALE_TOLERANCE: f64 = 1e-12;

fn clamp_unit(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

/// 1. Clamp each outcome to [0, 1] (NaN counts as 0).
/// 2. If the six sum to more than 1, divide each by the sum.
/// 3. `out` takes the remainder, clamped to [0, 1].
///
/// The result sums to 1 within 1e-9 and normalizing it again changes nothing.
pub fn normalize(raw: &EventRates) -> OutcomeProbabilities {
    let clamped = EventRates::from_fn(|o| clamp_unit(raw.get(o)));
    let total = clamped.sum();

    let events = if total > 1.0 + RESCALE_TOLERANCE {
        EventRates::from_fn(|o| clamped.get(o) / total)
    } else {
        clamped
    };

    let out = clamp_unit(1.0 - events.sum());

    OutcomeProbabilities {
        k: events.k,
        bb: events.bb,
        single: events.single,
        double: events.double,
        triple: events.triple,
        hr: events.hr,
        out,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runcast_core::Outcome;

    fn rates(values: [f64; 6]) -> EventRates {
        EventRates {
            k: values[0],
            bb: values[1],
            single: values[2],
            double: values[3],
            triple: values[4],
            hr: values[5],
        }
    }

    fn assert_valid(p: &OutcomeProbabilities) {
        assert!((p.sum() - 1.0).abs() <= 1e-9, "sum {} for {p:?}", p.sum());
        for v in [p.k, p.bb, p.single, p.double, p.triple, p.hr, p.out] {
            assert!((0.0..=1.0).contains(&v), "component {v} out of range in {p:?}");
        }
    }

    /// Inputs spanning typical, empty, saturated and degenerate vectors.
    fn input_grid() -> Vec<EventRates> {
        let mut grid = vec![
            rates([0.2, 0.1, 0.15, 0.05, 0.005, 0.04]),
            rates([0.0; 6]),
            rates([1.0; 6]),
            rates([0.5, 0.5, 0.0, 0.0, 0.0, 0.0]),
            rates([0.9, 0.3, 0.2, 0.1, 0.05, 0.2]),
            rates([1.7, 0.0, 0.0, 0.0, 0.0, 0.0]),
            rates([-0.2, 0.1, 0.15, 0.05, 0.005, 0.04]),
            rates([f64::NAN, 0.1, 0.15, 0.05, 0.005, 0.04]),
            rates([0.1, 0.2, 0.3, 0.4 - 1e-13, 0.0, 0.0]),
            rates([1e-300, 1e-300, 0.0, 0.0, 0.0, 1e-300]),
        ];
        for step in 1..=20 {
            let s = step as f64 * 0.0375;
            grid.push(rates([s, s / 2.0, s * 0.8, s / 3.0, s / 40.0, s / 4.0]));
        }
        grid
    }

    #[test]
    fn output_is_a_valid_distribution() {
        for raw in input_grid() {
            assert_valid(&normalize(&raw));
        }
    }

    #[test]
    fn normalizing_twice_is_a_no_op() {
        for raw in input_grid() {
            let once = normalize(&raw);
            let twice = normalize(&once.events());
            assert_eq!(once, twice, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn sub_unit_sum_is_left_alone() {
        let raw = rates([0.2, 0.1, 0.15, 0.05, 0.005, 0.04]);
        let p = normalize(&raw);
        assert_eq!(p.events(), raw);
        assert!((p.out - 0.455).abs() < 1e-12);
    }

    #[test]
    fn over_unit_sum_is_scaled_proportionally() {
        let raw = rates([0.6, 0.3, 0.6, 0.3, 0.0, 0.2]);
        let p = normalize(&raw);
        assert!(p.out < 1e-12);
        assert!((p.k / p.bb - 2.0).abs() < 1e-12);
        assert!((p.single / p.hr - 3.0).abs() < 1e-12);
        assert_valid(&p);
    }

    #[test]
    fn components_are_clamped_before_summing() {
        let p = normalize(&rates([-0.5, 2.0, 0.0, 0.0, 0.0, 0.0]));
        assert_eq!(p.k, 0.0);
        assert_eq!(p.bb, 1.0);
        assert_eq!(p.out, 0.0);
    }

    #[test]
    fn raising_home_run_input_never_lowers_home_run_output() {
        let base = [0.25, 0.1, 0.2, 0.06, 0.01, 0.0];
        let mut previous = 0.0;
        for step in 0..=200 {
            let hr = step as f64 * 0.01;
            let p = normalize(&rates([base[0], base[1], base[2], base[3], base[4], hr]));
            assert!(
                p.hr >= previous,
                "p_hr decreased from {previous} to {} at input {hr}",
                p.hr
            );
            previous = p.hr;
        }
    }

    #[test]
    fn all_outcomes_survive_normalization() {
        let raw = rates([0.2, 0.1, 0.15, 0.05, 0.005, 0.04]);
        let p = normalize(&raw).events();
        for o in Outcome::ALL {
            assert!(p.get(o) > 0.0);
        }
    }
}
