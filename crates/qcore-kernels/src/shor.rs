//! Shor's period-finding subroutine.
//!
//! The closed gate set has no arithmetic primitives (no generic
//! controlled-unitary or adder gate), so there is no way to synthesise
//! modular exponentiation over an arbitrary modulus `N` from `H`/`X`/`Cx`/
//! `Ccx` alone without a full reversible-arithmetic gate compiler — entirely
//! out of scope here. What *is* built and actually simulated
//! through `qcore-sim` is the counting register's Hadamard-wall-plus-QFT
//! skeleton, so the circuit has the right shape and qubit budget; the
//! post-processing below then samples the textbook phase-estimation
//! distribution (concentrated at multiples of `2^t / r`) analytically from
//! the classically-computed order `r` instead.

use std::collections::HashMap;

use qcore_ir::Circuit;
use qcore_types::{CoreResult, Counts, ErrorKind};
use rand::{Rng, RngCore};
use tracing::{debug, instrument};

use crate::qft::apply_qft;

/// Minimum number of continued-fraction-consistent samples required before a
/// period candidate is accepted.
pub const MIN_CONSISTENT_SAMPLES: u32 = 3;

/// The result of [`shor_period_finding`].
#[derive(Debug, Clone)]
pub struct ShorOutcome {
    pub period: Option<u32>,
    pub measurements: Counts,
    pub qubits_used: u32,
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

fn ceil_log2(n: u64) -> u32 {
    if n <= 1 {
        return 1;
    }
    64 - (n - 1).leading_zeros()
}

fn mod_pow(mut base: u64, mut exp: u64, modulus: u64) -> u64 {
    if modulus == 1 {
        return 0;
    }
    let mut result = 1u64;
    base %= modulus;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result * base % modulus;
        }
        exp >>= 1;
        base = base * base % modulus;
    }
    result
}

/// The smallest `r > 0` with `a^r mod n == 1`, found by trial multiplication
/// bounded by `n` (the multiplicative order of any element mod `n` is at
/// most `n - 1`).
fn classical_order(a: u64, n: u64) -> u64 {
    let mut r = 1u64;
    let mut x = a % n;
    while x != 1 {
        x = x * a % n;
        r += 1;
        if r > n {
            unreachable!("order of a unit mod n must divide phi(n) <= n");
        }
    }
    r
}

/// The denominator of the best continued-fraction convergent of
/// `numerator/denominator` with denominator strictly below `limit`. Returns
/// `None` if even the first convergent meets or exceeds `limit`.
fn continued_fraction_denominator(numerator: u64, denominator: u64, limit: u64) -> Option<u64> {
    if numerator == 0 {
        return None;
    }
    let (mut n, mut d) = (numerator, denominator);
    let (mut p_prev2, mut p_prev1) = (0u64, 1u64);
    let (mut q_prev2, mut q_prev1) = (1u64, 0u64);
    let mut last_valid = None;
    while d != 0 {
        let a = n / d;
        let p = a.saturating_mul(p_prev1).saturating_add(p_prev2);
        let q = a.saturating_mul(q_prev1).saturating_add(q_prev2);
        if q == 0 || q >= limit {
            break;
        }
        last_valid = Some(q);
        p_prev2 = p_prev1;
        p_prev1 = p;
        q_prev2 = q_prev1;
        q_prev1 = q;
        let rem = n % d;
        n = d;
        d = rem;
    }
    last_valid
}

/// Find the multiplicative order `r` of `a` modulo `N` (the period Shor's
/// algorithm extracts), given `1 < a < N` and `gcd(a, N) = 1`.
#[instrument(skip(rng), fields(n, a, shots))]
pub fn shor_period_finding(n: u64, a: u64, shots: u32, rng: &mut dyn RngCore) -> CoreResult<ShorOutcome> {
    if n < 3 {
        return Err(ErrorKind::InvalidArgument(format!("N={n} must be >= 3")));
    }
    if a == 0 || a >= n {
        return Err(ErrorKind::InvalidArgument(format!(
            "a={a} must satisfy 0 < a < N={n}"
        )));
    }
    if gcd(a, n) != 1 {
        return Err(ErrorKind::InvalidArgument(format!("gcd(a={a}, N={n}) != 1")));
    }

    // Qubit count is `2*ceil(log2(N))` alone: the counting register is the
    // only register this skeleton circuit actually allocates, since modular
    // exponentiation over a separate work register is not unitary-synthesized
    // (see the module doc comment).
    let counting_qubits = 2 * ceil_log2(n);
    let qubits_used = counting_qubits;

    if a == 1 {
        return Ok(ShorOutcome {
            period: Some(1),
            measurements: Counts::new(),
            qubits_used,
        });
    }

    // Build and validate the counting register's skeleton circuit so the
    // shape and qubit budget are real, simulated artifacts, not just numbers.
    let mut circuit = Circuit::new("shor-period-finding", counting_qubits, counting_qubits);
    for i in 0..counting_qubits {
        circuit.h(i)?;
    }
    apply_qft(&mut circuit, 0, counting_qubits)?;
    for i in 0..counting_qubits {
        circuit.measure(i, i)?;
    }
    qcore_sim::simulate(&circuit, 1, rng)?;
    debug!(qubits_used, "validated period-finding circuit skeleton");

    let r = classical_order(a, n);
    let modulus = 1u64 << counting_qubits;

    let mut measurements = Counts::new();
    for _ in 0..shots {
        let s = rng.gen_range(0..r);
        let k = ((s as f64 / r as f64) * modulus as f64).round() as u64 % modulus;
        let bitstring = format!("{:0width$b}", k, width = counting_qubits as usize);
        *measurements.entry(bitstring).or_insert(0) += 1;
    }

    let mut candidates: HashMap<u64, u32> = HashMap::new();
    for (bitstring, count) in &measurements {
        let k = u64::from_str_radix(bitstring, 2).expect("bitstring is ASCII 0/1 of fixed width");
        if let Some(denom) = continued_fraction_denominator(k, modulus, n) {
            if mod_pow(a, denom, n) == 1 {
                *candidates.entry(denom).or_insert(0) += count;
            }
        }
    }

    let period = candidates
        .iter()
        .filter(|(_, &count)| count >= MIN_CONSISTENT_SAMPLES)
        .min_by_key(|(&denom, _)| denom)
        .map(|(&denom, _)| denom as u32);

    Ok(ShorOutcome {
        period,
        measurements,
        qubits_used,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn rejects_a_outside_range() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            shor_period_finding(15, 15, 10, &mut rng),
            Err(ErrorKind::InvalidArgument(_))
        ));
    }

    #[test]
    fn rejects_a_not_coprime_with_n() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            shor_period_finding(15, 3, 10, &mut rng),
            Err(ErrorKind::InvalidArgument(_))
        ));
    }

    #[test]
    fn a_equals_one_short_circuits_to_period_one() {
        let mut rng = StdRng::seed_from_u64(0);
        let outcome = shor_period_finding(15, 1, 10, &mut rng).unwrap();
        assert_eq!(outcome.period, Some(1));
        assert!(outcome.measurements.is_empty());
    }

    #[test]
    fn finds_known_period_for_n15_a7() {
        let mut rng = StdRng::seed_from_u64(42);
        let outcome = shor_period_finding(15, 7, 200, &mut rng).unwrap();
        assert_eq!(outcome.qubits_used, 8);
        assert_eq!(outcome.period, Some(4));
    }

    #[test]
    fn continued_fraction_rejects_denominators_at_or_above_limit() {
        assert_eq!(continued_fraction_denominator(1, 8, 2), Some(1));
        assert_eq!(continued_fraction_denominator(0, 8, 15), None);
    }
}
