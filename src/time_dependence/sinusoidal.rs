//! Sinusoidal time dependence.

use super::{ftd, TimeDependence};
use crate::constants::TWO_PI;

/// Time dependence given by a sum of sinusoids,
/// `sum_i a_i/2 sin(2 pi f_i t + p_i) + o_i`.
///
/// The amplitudes `a_i` are peak to peak. Each term takes its parameters
/// from the same position in the phase, amplitude and offset lists; a list
/// that is too short supplies a phase of 0, an amplitude of 1 or an offset
/// of 0. The number of terms is the number of frequencies.
#[derive(Clone, Debug, PartialEq)]
pub struct SinusoidalTimeDependence {
    frequencies: Vec<ftd>,
    phases: Vec<ftd>,
    amplitudes: Vec<ftd>,
    offsets: Vec<ftd>,
}

#[derive(Clone, Copy, Debug)]
struct SinusoidTerm {
    frequency: ftd,
    phase: ftd,
    amplitude: ftd,
    offset: ftd,
}

impl SinusoidalTimeDependence {
    pub fn new(
        frequencies: Vec<ftd>,
        phases: Vec<ftd>,
        amplitudes: Vec<ftd>,
        offsets: Vec<ftd>,
    ) -> Self {
        Self {
            frequencies,
            phases,
            amplitudes,
            offsets,
        }
    }

    fn terms(&self) -> impl Iterator<Item = SinusoidTerm> + '_ {
        self.frequencies
            .iter()
            .enumerate()
            .map(move |(idx, &frequency)| SinusoidTerm {
                frequency,
                phase: self.phases.get(idx).copied().unwrap_or(0.0),
                amplitude: self.amplitudes.get(idx).copied().unwrap_or(1.0),
                offset: self.offsets.get(idx).copied().unwrap_or(0.0),
            })
    }
}

impl TimeDependence for SinusoidalTimeDependence {
    fn value(&self, time: ftd) -> ftd {
        self.terms()
            .map(|term| {
                0.5 * term.amplitude * ftd::sin(TWO_PI * term.frequency * time + term.phase)
                    + term.offset
            })
            .sum()
    }

    fn integral(&self, time: ftd) -> ftd {
        self.terms()
            .map(|term| {
                let oscillating = if term.frequency == 0.0 {
                    0.5 * term.amplitude * ftd::sin(term.phase) * time
                } else {
                    let angular_frequency = TWO_PI * term.frequency;
                    0.5 * term.amplitude
                        * (ftd::cos(term.phase)
                            - ftd::cos(angular_frequency * time + term.phase))
                        / angular_frequency
                };
                oscillating + term.offset * time
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::constants::PI;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn sinusoid_value_is_correct() {
        let sinusoid = SinusoidalTimeDependence::new(vec![1.0], vec![0.0], vec![2.0], vec![0.5]);
        assert_abs_diff_eq!(sinusoid.value(0.0), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(sinusoid.value(0.25), 1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(sinusoid.value(0.75), -0.5, epsilon = 1e-12);
    }

    #[test]
    fn missing_parameters_use_defaults() {
        let sinusoid = SinusoidalTimeDependence::new(vec![1.0, 2.0], Vec::new(), vec![4.0], Vec::new());
        // 2 sin(2 pi t) + 1/2 sin(4 pi t)
        let time = 0.1;
        let expected = 2.0 * f64::sin(2.0 * PI * time) + 0.5 * f64::sin(4.0 * PI * time);
        assert_relative_eq!(sinusoid.value(time), expected, max_relative = 1e-12);
    }

    #[test]
    fn integral_matches_numerical_quadrature() {
        let sinusoid = SinusoidalTimeDependence::new(
            vec![0.7, 0.0],
            vec![0.3, 1.1],
            vec![1.5, 2.0],
            vec![0.2, -0.1],
        );
        let end_time = 1.3;
        let n_intervals = 20000;
        let dt = end_time / n_intervals as f64;
        let mut quadrature = 0.0;
        for i in 0..n_intervals {
            let t = (i as f64 + 0.5) * dt;
            quadrature += sinusoid.value(t) * dt;
        }
        assert_relative_eq!(sinusoid.integral(end_time), quadrature, max_relative = 1e-7);
        assert_eq!(sinusoid.integral(0.0), 0.0);
    }
}
