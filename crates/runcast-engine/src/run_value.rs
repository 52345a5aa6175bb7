// Linear-weights conversion from outcome probabilities to expected runs.

use runcast_core::{LinearWeights, Outcome, OutcomeProbabilities};

/// Per-PA and total run value for one projection row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunValue {
    pub runs_per_pa: f64,
    pub expected_runs: f64,
}

/// Weighted sum of outcome probabilities. Strikeouts and outs are worth 0.
pub fn runs_per_pa(probabilities: &OutcomeProbabilities, weights: &LinearWeights) -> f64 {
    let events = probabilities.events();
    Outcome::ALL
        .into_iter()
        .map(|o| events.get(o) * weights.weight(o))
        .sum()
}

/// Run value over `plate_appearances` (callers guarantee it is >= 0).
pub fn run_value(
    probabilities: &OutcomeProbabilities,
    weights: &LinearWeights,
    plate_appearances: f64,
) -> RunValue {
    let per_pa = runs_per_pa(probabilities, weights);
    RunValue {
        runs_per_pa: per_pa,
        expected_runs: per_pa * plate_appearances,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probs() -> OutcomeProbabilities {
        OutcomeProbabilities {
            k: 0.2,
            bb: 0.1,
            single: 0.15,
            double: 0.05,
            triple: 0.005,
            hr: 0.04,
            out: 0.455,
        }
    }

    #[test]
    fn standard_weights() {
        let rpa = runs_per_pa(&probs(), &LinearWeights::default());
        let expected = 0.1 * 0.33 + 0.15 * 0.47 + 0.05 * 0.77 + 0.005 * 1.04 + 0.04 * 1.40;
        assert!((rpa - expected).abs() < 1e-12);
    }

    #[test]
    fn strikeouts_and_outs_are_worthless() {
        let all_outs = OutcomeProbabilities {
            k: 0.4,
            bb: 0.0,
            single: 0.0,
            double: 0.0,
            triple: 0.0,
            hr: 0.0,
            out: 0.6,
        };
        assert_eq!(runs_per_pa(&all_outs, &LinearWeights::default()), 0.0);
    }

    #[test]
    fn zero_plate_appearances_is_zero_runs() {
        let rv = run_value(&probs(), &LinearWeights::default(), 0.0);
        assert!(rv.runs_per_pa > 0.0);
        assert_eq!(rv.expected_runs, 0.0);
    }

    #[test]
    fn doubling_plate_appearances_doubles_runs() {
        let weights = LinearWeights::default();
        for pa in [0.5, 1.0, 3.7, 4.3, 5.0] {
            let single = run_value(&probs(), &weights, pa).expected_runs;
            let double = run_value(&probs(), &weights, pa * 2.0).expected_runs;
            assert_eq!(double, single * 2.0);
        }
    }

    #[test]
    fn custom_weights_are_honored() {
        let weights = LinearWeights {
            walk: 0.0,
            single: 0.0,
            double: 0.0,
            triple: 0.0,
            home_run: 1.0,
        };
        assert_eq!(runs_per_pa(&probs(), &weights), 0.04);
    }
}
