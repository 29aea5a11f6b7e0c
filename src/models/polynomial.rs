//! Power-series polynomial.

use std::fmt;

use serde::{Deserialize, Serialize};

/// `p(x) = c0 + c1·x + … + cn·xⁿ`.
///
/// Coefficients are stored lowest power first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polynomial {
    pub coefficients: Vec<f64>,
}

impl Polynomial {
    pub fn new(coefficients: Vec<f64>) -> Self {
        Self { coefficients }
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// Horner evaluation.
    pub fn evaluate(&self, x: f64) -> f64 {
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, &c| acc * x + c)
    }

    /// Rewrite `q(u)` with `u = offset + scale·x` as a polynomial in `x`.
    ///
    /// Used to undo the domain mapping applied before fitting.
    pub fn compose_linear(&self, offset: f64, scale: f64) -> Polynomial {
        let mut out: Vec<f64> = Vec::with_capacity(self.coefficients.len());
        for &c in self.coefficients.iter().rev() {
            // out <- out * (offset + scale·x) + c
            let mut next = vec![0.0; out.len() + 1];
            for (k, &a) in out.iter().enumerate() {
                next[k] += a * offset;
                next[k + 1] += a * scale;
            }
            next[0] += c;
            out = next;
        }
        out.truncate(self.coefficients.len().max(1));
        if out.is_empty() {
            out.push(0.0);
        }
        Polynomial::new(out)
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (power, &c) in self.coefficients.iter().enumerate() {
            if power == 0 {
                write!(f, "{}", fmt_coefficient(c))?;
                continue;
            }
            let sign = if c.is_sign_negative() { '-' } else { '+' };
            write!(f, " {sign} {}·x{}", fmt_coefficient(c.abs()), superscript(power))?;
        }
        Ok(())
    }
}

fn fmt_coefficient(c: f64) -> String {
    let a = c.abs();
    if a == 0.0 || (1e-4..1e6).contains(&a) {
        format!("{c:.6}")
    } else {
        format!("{c:.4e}")
    }
}

fn superscript(power: usize) -> String {
    if power == 1 {
        return String::new();
    }
    power
        .to_string()
        .chars()
        .map(|d| match d {
            '0' => '⁰',
            '1' => '¹',
            '2' => '²',
            '3' => '³',
            '4' => '⁴',
            '5' => '⁵',
            '6' => '⁶',
            '7' => '⁷',
            '8' => '⁸',
            _ => '⁹',
        })
        .collect()
}
