//! symbol/pdf417/ecc.rs
//! Reed-Solomon error correction over the prime field GF(929), generator 3.
//!
//! Codeword sequences are polynomials with the first codeword as the highest
//! degree term. Error-correction codewords are the negated remainder of
//! `data(x) * x^k` by `g(x) = (x - 3)(x - 3^2)...(x - 3^k)`, so every valid
//! sequence evaluates to zero at `3^1..=3^k`.
//!
//! The decoder follows the classic syndrome / extended-Euclid / Chien /
//! Forney sequence and corrects up to `k / 2` codeword errors.

use std::sync::OnceLock;

use crate::symbol::types::SymbolError;

pub const MODULUS: u32 = 929;
const GENERATOR: u32 = 3;

struct Field {
    exp: [u32; MODULUS as usize],
    log: [u32; MODULUS as usize],
}

fn field() -> &'static Field {
    static FIELD: OnceLock<Field> = OnceLock::new();
    FIELD.get_or_init(|| {
        let mut exp = [0u32; MODULUS as usize];
        let mut log = [0u32; MODULUS as usize];
        let mut x = 1u32;
        for slot in exp.iter_mut() {
            *slot = x;
            x = (x * GENERATOR) % MODULUS;
        }
        for (i, &value) in exp.iter().enumerate().take(MODULUS as usize - 1) {
            log[value as usize] = i as u32;
        }
        Field { exp, log }
    })
}

fn add(a: u32, b: u32) -> u32 {
    (a + b) % MODULUS
}

fn sub(a: u32, b: u32) -> u32 {
    (MODULUS + a - b) % MODULUS
}

fn mul(a: u32, b: u32) -> u32 {
    (a * b) % MODULUS
}

fn exp(a: u32) -> u32 {
    field().exp[(a % (MODULUS - 1)) as usize]
}

fn log(a: u32) -> Result<u32, SymbolError> {
    if a == 0 {
        return Err(SymbolError::Uncorrectable("log of zero".into()));
    }
    Ok(field().log[a as usize])
}

fn inverse(a: u32) -> Result<u32, SymbolError> {
    if a == 0 {
        return Err(SymbolError::Uncorrectable("inverse of zero".into()));
    }
    Ok(exp((MODULUS - 1) - field().log[a as usize]))
}

/// Polynomial over GF(929), highest degree first, no leading zeros except for
/// the zero polynomial itself.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Poly(Vec<u32>);

impl Poly {
    fn new(coefficients: Vec<u32>) -> Self {
        match coefficients.iter().position(|&c| c != 0) {
            Some(first) => Poly(coefficients[first..].to_vec()),
            None => Poly(vec![0]),
        }
    }

    fn zero() -> Self {
        Poly(vec![0])
    }

    fn one() -> Self {
        Poly(vec![1])
    }

    fn monomial(degree: usize, coefficient: u32) -> Self {
        if coefficient == 0 {
            return Self::zero();
        }
        let mut c = vec![0; degree + 1];
        c[0] = coefficient;
        Poly(c)
    }

    fn degree(&self) -> usize {
        self.0.len() - 1
    }

    fn is_zero(&self) -> bool {
        self.0[0] == 0
    }

    fn coefficient(&self, degree: usize) -> u32 {
        self.0[self.0.len() - 1 - degree]
    }

    fn evaluate_at(&self, a: u32) -> u32 {
        if a == 0 {
            return self.coefficient(0);
        }
        self.0.iter().fold(0, |acc, &c| add(mul(a, acc), c))
    }

    fn add(&self, other: &Poly) -> Poly {
        if self.is_zero() {
            return other.clone();
        }
        if other.is_zero() {
            return self.clone();
        }
        let (small, large) = if self.0.len() > other.0.len() { (&other.0, &self.0) } else { (&self.0, &other.0) };
        let diff = large.len() - small.len();
        let mut sum = large[..diff].to_vec();
        sum.extend(small.iter().zip(&large[diff..]).map(|(&a, &b)| add(a, b)));
        Poly::new(sum)
    }

    fn negative(&self) -> Poly {
        Poly::new(self.0.iter().map(|&c| sub(0, c)).collect())
    }

    fn subtract(&self, other: &Poly) -> Poly {
        if other.is_zero() {
            return self.clone();
        }
        self.add(&other.negative())
    }

    fn multiply(&self, other: &Poly) -> Poly {
        if self.is_zero() || other.is_zero() {
            return Self::zero();
        }
        let mut product = vec![0; self.0.len() + other.0.len() - 1];
        for (i, &a) in self.0.iter().enumerate() {
            for (j, &b) in other.0.iter().enumerate() {
                product[i + j] = add(product[i + j], mul(a, b));
            }
        }
        Poly::new(product)
    }

    fn scale(&self, scalar: u32) -> Poly {
        if scalar == 0 {
            return Self::zero();
        }
        Poly::new(self.0.iter().map(|&c| mul(c, scalar)).collect())
    }

    fn multiply_by_monomial(&self, degree: usize, coefficient: u32) -> Poly {
        if coefficient == 0 {
            return Self::zero();
        }
        let mut c: Vec<u32> = self.0.iter().map(|&x| mul(x, coefficient)).collect();
        c.resize(c.len() + degree, 0);
        Poly::new(c)
    }
}

/// `g(x)` for `k` error-correction codewords, highest degree first (monic).
fn generator(k: usize) -> Vec<u32> {
    let mut g = Poly::one();
    for i in 1..=k {
        g = g.multiply(&Poly(vec![1, sub(0, exp(i as u32))]));
    }
    g.0
}

/// Error-correction codewords for `data`.
pub fn ec_codewords(data: &[u16], k: usize) -> Vec<u16> {
    let g = generator(k);
    let mut buf: Vec<u32> = data.iter().map(|&c| u32::from(c)).collect();
    buf.resize(data.len() + k, 0);

    // Synthetic division by the monic generator.
    for i in 0..data.len() {
        let coef = buf[i];
        if coef != 0 {
            for (j, &gj) in g.iter().enumerate().skip(1) {
                buf[i + j] = sub(buf[i + j], mul(coef, gj));
            }
        }
    }

    buf[data.len()..].iter().map(|&r| sub(0, r) as u16).collect()
}

/// Correct `received` in place. Returns the number of corrected codewords.
pub fn correct(received: &mut [u16], k: usize) -> Result<usize, SymbolError> {
    if received.len() >= MODULUS as usize {
        return Err(SymbolError::Uncorrectable(format!("{} codewords exceed the field", received.len())));
    }
    let poly = Poly::new(received.iter().map(|&c| u32::from(c) % MODULUS).collect());

    // S[k - i] = r(3^i); as a polynomial S(x) = sum S_i x^(i-1).
    let mut syndromes = vec![0u32; k];
    let mut has_error = false;
    for i in (1..=k).rev() {
        let value = poly.evaluate_at(exp(i as u32));
        syndromes[k - i] = value;
        if value != 0 {
            has_error = true;
        }
    }
    if !has_error {
        return Ok(0);
    }

    let syndrome = Poly::new(syndromes);
    let (sigma, omega) = euclid(Poly::monomial(k, 1), syndrome, k)?;
    let locations = error_locations(&sigma)?;
    let magnitudes = error_magnitudes(&omega, &sigma, &locations)?;

    for (location, magnitude) in locations.iter().zip(&magnitudes) {
        let power = log(*location)? as usize;
        if power >= received.len() {
            return Err(SymbolError::Uncorrectable("error location outside symbol".into()));
        }
        let position = received.len() - 1 - power;
        received[position] = sub(u32::from(received[position]), *magnitude) as u16;
    }
    Ok(locations.len())
}

fn euclid(a: Poly, b: Poly, r: usize) -> Result<(Poly, Poly), SymbolError> {
    let (mut r_last, mut r_cur) = if a.degree() < b.degree() { (b, a) } else { (a, b) };
    let mut t_last = Poly::zero();
    let mut t_cur = Poly::one();

    while r_cur.degree() >= r / 2 {
        let r_last_last = r_last;
        let t_last_last = t_last;
        r_last = r_cur;
        t_last = t_cur;

        if r_last.is_zero() {
            return Err(SymbolError::Uncorrectable("euclid remainder vanished".into()));
        }
        r_cur = r_last_last;
        let mut q = Poly::zero();
        let lead_inverse = inverse(r_last.coefficient(r_last.degree()))?;
        while r_cur.degree() >= r_last.degree() && !r_cur.is_zero() {
            let degree_diff = r_cur.degree() - r_last.degree();
            let scale = mul(r_cur.coefficient(r_cur.degree()), lead_inverse);
            q = q.add(&Poly::monomial(degree_diff, scale));
            r_cur = r_cur.subtract(&r_last.multiply_by_monomial(degree_diff, scale));
        }

        t_cur = q.multiply(&t_last).subtract(&t_last_last).negative();
    }

    let sigma_at_zero = t_cur.coefficient(0);
    if sigma_at_zero == 0 {
        return Err(SymbolError::Uncorrectable("sigma(0) is zero".into()));
    }
    let inv = inverse(sigma_at_zero)?;
    Ok((t_cur.scale(inv), r_cur.scale(inv)))
}

/// Chien search: roots of the locator, returned as their inverses.
fn error_locations(locator: &Poly) -> Result<Vec<u32>, SymbolError> {
    let count = locator.degree();
    let mut found = Vec::with_capacity(count);
    for i in 1..MODULUS {
        if found.len() >= count {
            break;
        }
        if locator.evaluate_at(i) == 0 {
            found.push(inverse(i)?);
        }
    }
    if found.len() != count {
        return Err(SymbolError::Uncorrectable(format!(
            "locator degree {} but {} roots",
            count,
            found.len()
        )));
    }
    Ok(found)
}

/// Forney: `e = -omega(X^-1) / sigma'(X^-1)`.
fn error_magnitudes(evaluator: &Poly, locator: &Poly, locations: &[u32]) -> Result<Vec<u32>, SymbolError> {
    let degree = locator.degree();
    let mut derivative = vec![0u32; degree];
    for i in 1..=degree {
        derivative[degree - i] = mul(i as u32 % MODULUS, locator.coefficient(i));
    }
    let derivative = Poly::new(derivative);

    locations
        .iter()
        .map(|&location| {
            let xi_inverse = inverse(location)?;
            let numerator = sub(0, evaluator.evaluate_at(xi_inverse));
            let denominator = inverse(derivative.evaluate_at(xi_inverse))?;
            Ok(mul(numerator, denominator))
        })
        .collect()
}
