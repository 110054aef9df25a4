// src/noyau/numerique.rs
//
// Noyau numérique
// ---------------
// - Décimal : division / puissance à précision donnée, π et e (calculés une fois)
// - Factorielle : exacte (entiers) ou produit décimal
// - Gamma (Lanczos g=7, 9 termes) et erf (Abramowitz–Stegun) : double précision, toujours
// - nCr / nPr : exact (réduction par pgcd), décimal itératif, ou rapport de Gamma
//
// Plafonds :
// - gamma/erf ne dépassent jamais la double précision, quelle que soit la session
// - les boucles (factorielle décimale, combinatoire) sont bornées par LIMITE_ITERATIONS

use std::str::FromStr;
use std::sync::OnceLock;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};

use super::erreurs::ArithmeticError;
use super::valeur::{arrondir, Value, LIMITE_BITS, LIMITE_EXPOSANT};

/// Au-delà, la factorielle exacte bascule en décimal même en mode exact.
pub const SEUIL_FACTORIELLE_EXACTE: u32 = 2000;

/// Exposant entier maximal calculé par multiplications successives.
pub const LIMITE_EXPOSANT_ENTIER: u32 = 100_000;

/// Garde-fou anti-gel : nombre maximal de tours de boucle d’un produit.
pub const LIMITE_ITERATIONS: u64 = 100_000;

/// Chiffres gardés pour π et e (précision max de session + marge).
const CHIFFRES_CONSTANTES: usize = 220;

/// Chiffres de garde pendant les calculs intermédiaires.
const GARDE: u32 = 5;

fn pow10(n: u64) -> BigInt {
    BigInt::from(10).pow(n as u32)
}

/* ------------------------ Décimal ------------------------ */

/// a / b arrondi à `precision` chiffres significatifs.
pub fn diviser(
    a: &BigDecimal,
    b: &BigDecimal,
    precision: u32,
) -> Result<BigDecimal, ArithmeticError> {
    if b.is_zero() {
        return Err(ArithmeticError::DivisionByZero);
    }
    if a.is_zero() {
        return Ok(BigDecimal::zero());
    }

    let (na, sa) = a.as_bigint_and_exponent();
    let (nb, sb) = b.as_bigint_and_exponent();

    // quotient entier avec au moins precision + GARDE chiffres
    let extra = u64::from(precision + GARDE) + b.digits();
    let q = (na * pow10(extra)) / nb;

    Ok(arrondir(&BigDecimal::new(q, sa - sb + extra as i64), precision))
}

/// base^n (n entier >= 0), par carrés successifs.
fn puissance_entiere(base: &BigDecimal, n: u32, precision: u32) -> BigDecimal {
    let travail = precision + GARDE;

    let mut e = n;
    let mut acc = BigDecimal::one();
    let mut b = base.clone();

    while e > 0 {
        if (e & 1) == 1 {
            acc = arrondir(&(&acc * &b), travail);
        }
        e >>= 1;
        if e > 0 {
            b = arrondir(&(&b * &b), travail);
        }
    }
    acc
}

/// base^exposant en décimal.
///
/// L’exposant passe par un f64 : exposant entier => multiplications exactes
/// (arrondies), sinon powf double précision.
pub fn puissance_decimale(
    base: &BigDecimal,
    exposant: &BigDecimal,
    precision: u32,
) -> Result<BigDecimal, ArithmeticError> {
    let e = exposant.to_f64().unwrap_or(f64::NAN);
    if !e.is_finite() {
        return Err(ArithmeticError::MathError);
    }

    if e.fract() == 0.0 && e.abs() <= f64::from(LIMITE_EXPOSANT_ENTIER) {
        if base.is_zero() && e < 0.0 {
            return Err(ArithmeticError::MathError);
        }
        let p = puissance_entiere(base, e.abs() as u32, precision);
        return if e < 0.0 {
            diviser(&BigDecimal::one(), &p, precision)
        } else {
            Ok(arrondir(&p, precision))
        };
    }

    let b = base.to_f64().unwrap_or(f64::NAN);
    decimal_depuis_f64(b.powf(e), precision)
}

/// f64 -> décimal (représentation la plus courte du f64, puis arrondi).
pub fn decimal_depuis_f64(x: f64, precision: u32) -> Result<BigDecimal, ArithmeticError> {
    if !x.is_finite() {
        return Err(ArithmeticError::MathError);
    }
    let d = BigDecimal::from_str(&format!("{x:e}")).map_err(|_| ArithmeticError::MathError)?;
    Ok(arrondir(&d, precision))
}

/* ------------------------ π (Machin) et e (série) ------------------------ */

/// arctan(1/q) en entier scalé (troncature) :
/// atan(z) = z - z^3/3 + z^5/5 - ...
fn arctan_inv_q_scaled(q: i64, scale: &BigInt) -> BigInt {
    let q = BigInt::from(q);
    let q2 = &q * &q;

    let mut k: u64 = 0;
    let mut positif = true;
    let mut q_pow = q;
    let mut sum = BigInt::zero();

    loop {
        let term = scale / (&q_pow * BigInt::from(2 * k + 1));
        if term.is_zero() {
            break;
        }
        if positif {
            sum += &term;
        } else {
            sum -= &term;
        }
        q_pow *= &q2;
        positif = !positif;
        k += 1;
    }
    sum
}

fn pi_calcule(chiffres: usize) -> BigDecimal {
    let extra = 10usize;
    let scale = pow10((chiffres + extra) as u64);

    // Machin : π = 16*atan(1/5) - 4*atan(1/239)
    let a = arctan_inv_q_scaled(5, &scale);
    let b = arctan_inv_q_scaled(239, &scale);
    let pi = BigInt::from(16) * a - BigInt::from(4) * b;

    BigDecimal::new(pi / pow10(extra as u64), chiffres as i64)
}

fn e_calcule(chiffres: usize) -> BigDecimal {
    let extra = 10usize;
    let scale = pow10((chiffres + extra) as u64);

    // e = Σ 1/k!
    let mut sum = scale.clone();
    let mut term = scale;
    let mut k: u64 = 1;
    loop {
        term /= BigInt::from(k);
        if term.is_zero() {
            break;
        }
        sum += &term;
        k += 1;
    }

    BigDecimal::new(sum / pow10(extra as u64), chiffres as i64)
}

static PI_CACHE: OnceLock<BigDecimal> = OnceLock::new();
static E_CACHE: OnceLock<BigDecimal> = OnceLock::new();

pub fn pi(precision: u32) -> BigDecimal {
    arrondir(PI_CACHE.get_or_init(|| pi_calcule(CHIFFRES_CONSTANTES)), precision)
}

pub fn e(precision: u32) -> BigDecimal {
    arrondir(E_CACHE.get_or_init(|| e_calcule(CHIFFRES_CONSTANTES)), precision)
}

/* ------------------------ Gamma / erf (double précision) ------------------------ */

const LANCZOS_G: f64 = 7.0;
const LANCZOS_P: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

/// Γ(z), Lanczos (g=7) + réflexion pour z < 0.5.
pub fn gamma(z: f64) -> f64 {
    use std::f64::consts::PI;

    if z < 0.5 {
        return PI / ((PI * z).sin() * gamma(1.0 - z));
    }

    let z = z - 1.0;
    let mut x = LANCZOS_P[0];
    for (i, p) in LANCZOS_P.iter().enumerate().skip(1) {
        x += p / (z + i as f64);
    }
    let t = z + LANCZOS_G + 0.5;
    (2.0 * PI).sqrt() * t.powf(z + 0.5) * (-t).exp() * x
}

/// erf(x), Abramowitz–Stegun 7.1.26.
pub fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254_829_592;
    const A2: f64 = -0.284_496_736;
    const A3: f64 = 1.421_413_741;
    const A4: f64 = -1.453_152_027;
    const A5: f64 = 1.061_405_429;
    const P: f64 = 0.327_591_1;

    let signe = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t * (-x * x).exp();
    signe * y
}

/* ------------------------ Factorielle ------------------------ */

fn factorielle_exacte(n: u32) -> BigInt {
    let mut acc = BigInt::one();
    for i in 2..=n {
        acc *= i;
    }
    acc
}

fn factorielle_decimale(n: u64, precision: u32) -> BigDecimal {
    let travail = precision + GARDE;
    let mut acc = BigDecimal::one();
    for i in 2..=n {
        acc = arrondir(&(acc * BigDecimal::from(i)), travail);
    }
    arrondir(&acc, precision)
}

/// x! : exacte si entier >= 0 (mode exact, sous le seuil), décimale sinon,
/// Γ(x+1) double précision pour un x non entier.
pub fn factorielle(v: &Value, mode_exact: bool, precision: u32) -> Result<Value, ArithmeticError> {
    let Some(n) = v.en_entier() else {
        let g = gamma(v.en_f64() + 1.0);
        return Ok(Value::Decimal(decimal_depuis_f64(g, precision)?));
    };

    if n.is_negative() {
        return Err(ArithmeticError::NegativeFactorial);
    }

    if mode_exact && n < BigInt::from(SEUIL_FACTORIELLE_EXACTE) {
        let k = n.to_u32().ok_or(ArithmeticError::MathError)?;
        return Ok(Value::ExactInteger(factorielle_exacte(k)));
    }

    let k = n
        .to_u64()
        .filter(|k| *k <= LIMITE_ITERATIONS)
        .ok_or(ArithmeticError::MathError)?;
    Ok(Value::Decimal(factorielle_decimale(k, precision)))
}

/* ------------------------ Combinatoire ------------------------ */

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combinatoire {
    Combinaisons, // nCr
    Arrangements, // nPr
}

/// n(n-1)...(n-k+1) / k!, avec réduction par pgcd à chaque pas.
fn combinaisons_exactes(n: &BigInt, k: u64) -> BigInt {
    let mut num = BigInt::one();
    let mut den = BigInt::one();

    for i in 0..k {
        num *= n - BigInt::from(i);
        den *= BigInt::from(i + 1);

        let g = num.gcd(&den);
        if !g.is_one() {
            num /= &g;
            den /= &g;
        }
    }
    num / den
}

fn arrangements_exacts(n: &BigInt, r: u64) -> BigInt {
    let mut acc = BigInt::one();
    for i in 0..r {
        acc *= n - BigInt::from(i);
    }
    acc
}

fn combinaisons_decimales(
    n: &BigInt,
    k: u64,
    precision: u32,
) -> Result<BigDecimal, ArithmeticError> {
    let travail = precision + GARDE;
    let mut acc = BigDecimal::one();

    // C(n,k) = Π (n-k+i)/i
    for i in 1..=k {
        let facteur = BigDecimal::new(n - BigInt::from(k) + BigInt::from(i), 0);
        acc = diviser(&(acc * facteur), &BigDecimal::from(i), travail)?;
    }
    Ok(arrondir(&acc, precision))
}

fn arrangements_decimaux(n: &BigInt, r: u64, precision: u32) -> BigDecimal {
    let travail = precision + GARDE;
    let mut acc = BigDecimal::one();
    for i in 0..r {
        let facteur = BigDecimal::new(n - BigInt::from(i), 0);
        acc = arrondir(&(acc * facteur), travail);
    }
    arrondir(&acc, precision)
}

fn zero_du_domaine(mode_exact: bool) -> Value {
    if mode_exact {
        Value::ExactInteger(BigInt::zero())
    } else {
        Value::default()
    }
}

fn verifier_portee(genre: Combinatoire, n: &BigInt, k: u64) -> Result<(), ArithmeticError> {
    if minorant_log10(genre, n, k) > LIMITE_EXPOSANT as f64 {
        return Err(ArithmeticError::MathError);
    }
    Ok(())
}

/// Majorant n^k du résultat exact, en bits.
fn exact_raisonnable(n: &BigInt, k: u64) -> bool {
    n.bits().saturating_mul(k) <= LIMITE_BITS
}

fn nombre_de_tours(k: &BigInt) -> Result<u64, ArithmeticError> {
    k.to_u64()
        .filter(|k| *k <= LIMITE_ITERATIONS)
        .ok_or(ArithmeticError::MathError)
}

/// Minorant de log10 du résultat : nPr >= (n-k+1)^k, nCr >= (n/k)^k.
/// Au-delà de LIMITE_EXPOSANT, inutile de lancer la boucle.
fn minorant_log10(genre: Combinatoire, n: &BigInt, k: u64) -> f64 {
    let log2_bas = |x: &BigInt| x.bits().saturating_sub(1) as f64;
    let bits = match genre {
        Combinatoire::Arrangements => log2_bas(&(n - BigInt::from(k) + 1)),
        Combinatoire::Combinaisons => log2_bas(n) - BigInt::from(k).bits() as f64,
    };
    k as f64 * bits.max(0.0) * std::f64::consts::LOG10_2
}

/// nCr / nPr.
///
/// - entiers + mode exact : domaine exact (r<0, n<0 ou r>n => 0), tant que n^k tient
///   dans LIMITE_BITS ; sinon produit décimal
/// - entiers sinon        : produit décimal itératif
/// - non entiers          : rapport de Gamma (double précision)
pub fn combinatoire(
    genre: Combinatoire,
    n: &Value,
    r: &Value,
    mode_exact: bool,
    precision: u32,
) -> Result<Value, ArithmeticError> {
    let (Some(ni), Some(ri)) = (n.en_entier(), r.en_entier()) else {
        let (nf, rf) = (n.en_f64(), r.en_f64());
        let x = match genre {
            Combinatoire::Combinaisons => {
                gamma(nf + 1.0) / (gamma(rf + 1.0) * gamma(nf - rf + 1.0))
            }
            Combinatoire::Arrangements => gamma(nf + 1.0) / gamma(nf - rf + 1.0),
        };
        return Ok(Value::Decimal(decimal_depuis_f64(x, precision)?));
    };

    if ri.is_negative() || ni.is_negative() || ri > ni {
        return Ok(zero_du_domaine(mode_exact));
    }

    match genre {
        Combinatoire::Combinaisons => {
            let k = nombre_de_tours(&ri.clone().min(&ni - &ri))?;
            verifier_portee(genre, &ni, k)?;
            if mode_exact && exact_raisonnable(&ni, k) {
                Ok(Value::ExactInteger(combinaisons_exactes(&ni, k)))
            } else {
                Ok(Value::Decimal(combinaisons_decimales(&ni, k, precision)?))
            }
        }
        Combinatoire::Arrangements => {
            let k = nombre_de_tours(&ri)?;
            verifier_portee(genre, &ni, k)?;
            if mode_exact && exact_raisonnable(&ni, k) {
                Ok(Value::ExactInteger(arrangements_exacts(&ni, k)))
            } else {
                Ok(Value::Decimal(arrangements_decimaux(&ni, k, precision)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn entier(n: i64) -> Value {
        Value::ExactInteger(BigInt::from(n))
    }

    #[test]
    fn division_arrondie() {
        let q = diviser(&dec("1"), &dec("3"), 10).unwrap();
        assert_eq!(q, dec("0.3333333333"));

        let q = diviser(&dec("2"), &dec("0.5"), 34).unwrap();
        assert_eq!(q, dec("4"));

        assert_eq!(
            diviser(&dec("1"), &dec("0"), 34),
            Err(ArithmeticError::DivisionByZero)
        );
    }

    #[test]
    fn puissance_entiere_et_negative() {
        assert_eq!(puissance_decimale(&dec("2"), &dec("10"), 34).unwrap(), dec("1024"));
        assert_eq!(puissance_decimale(&dec("2"), &dec("-2"), 34).unwrap(), dec("0.25"));
        assert_eq!(
            puissance_decimale(&dec("0"), &dec("-1"), 34),
            Err(ArithmeticError::MathError)
        );
    }

    #[test]
    fn puissance_fractionnaire_passe_par_f64() {
        let r = puissance_decimale(&dec("4"), &dec("0.5"), 34).unwrap();
        assert_eq!(r, dec("2"));
        // base négative, exposant non entier => NaN => erreur
        assert!(puissance_decimale(&dec("-8"), &dec("0.5"), 34).is_err());
    }

    #[test]
    fn constantes_haute_precision() {
        assert_eq!(pi(20), dec("3.1415926535897932385"));
        assert_eq!(e(20), dec("2.7182818284590452354"));
        assert!(pi(200).digits() >= 195);
    }

    #[test]
    fn gamma_lanczos() {
        assert!((gamma(5.0) - 24.0).abs() < 1e-9);
        assert!((gamma(0.5) - std::f64::consts::PI.sqrt()).abs() < 1e-12);
        assert!((gamma(5.5) - 52.342_777_784_553_5).abs() < 1e-9);
        // réflexion
        assert!((gamma(-0.5) + 2.0 * std::f64::consts::PI.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn erf_abramowitz_stegun() {
        assert!(erf(0.0).abs() < 1e-7);
        assert!((erf(1.0) - 0.842_700_79).abs() < 1e-6);
        assert!((erf(-1.0) + 0.842_700_79).abs() < 1e-6);
    }

    #[test]
    fn factorielle_domaines() {
        assert_eq!(factorielle(&entier(5), true, 34).unwrap(), entier(120));
        assert_eq!(
            factorielle(&Value::Decimal(dec("5")), false, 34).unwrap(),
            Value::Decimal(dec("120"))
        );
        assert_eq!(
            factorielle(&entier(-3), true, 34),
            Err(ArithmeticError::NegativeFactorial)
        );
    }

    #[test]
    fn factorielle_au_dela_du_seuil_exact() {
        let v = factorielle(&entier(2500), true, 34).unwrap();
        assert!(matches!(v, Value::Decimal(_)));
    }

    #[test]
    fn factorielle_non_entiere_par_gamma() {
        let v = factorielle(&Value::Decimal(dec("4.5")), true, 34).unwrap();
        assert!((v.en_f64() - 52.342_777_784_553_5).abs() < 1e-9);
    }

    #[test]
    fn combinaisons_exactes_reduites() {
        let v = combinatoire(Combinatoire::Combinaisons, &entier(50), &entier(6), true, 34);
        assert_eq!(v.unwrap(), entier(15_890_700));

        let v = combinatoire(Combinatoire::Arrangements, &entier(10), &entier(3), true, 34);
        assert_eq!(v.unwrap(), entier(720));
    }

    #[test]
    fn combinatoire_hors_bornes_vaut_zero() {
        let v = combinatoire(Combinatoire::Combinaisons, &entier(3), &entier(5), true, 34);
        assert_eq!(v.unwrap(), entier(0));
        let v = combinatoire(Combinatoire::Arrangements, &entier(3), &entier(-1), true, 34);
        assert_eq!(v.unwrap(), entier(0));
    }

    #[test]
    fn combinatoire_hors_portee() {
        let n = Value::ExactInteger(BigInt::from(10).pow(1000));
        let v = combinatoire(Combinatoire::Arrangements, &n, &entier(1000), true, 34);
        assert_eq!(v, Err(ArithmeticError::MathError));
        let v = combinatoire(Combinatoire::Combinaisons, &n, &entier(1000), false, 34);
        assert_eq!(v, Err(ArithmeticError::MathError));
    }

    #[test]
    fn combinatoire_trop_grande_pour_l_exact() {
        // C(50000,25000) ~ 1.1e15049 : dans la portée, mais n^k dépasse la borne exacte
        let v = combinatoire(
            Combinatoire::Combinaisons,
            &entier(50_000),
            &entier(25_000),
            true,
            34,
        )
        .unwrap();
        assert!(matches!(v, Value::Decimal(_)));
        assert_eq!(v.exposant_decimal(), Some(15049));
    }

    #[test]
    fn combinatoire_decimale_et_gamma() {
        let v = combinatoire(Combinatoire::Combinaisons, &entier(10), &entier(4), false, 34);
        assert_eq!(v.unwrap(), Value::Decimal(dec("210")));

        let v = combinatoire(
            Combinatoire::Combinaisons,
            &Value::Decimal(dec("4.5")),
            &entier(2),
            true,
            34,
        )
        .unwrap();
        // Γ(5.5)/(Γ(3)Γ(3.5)) = 4.5*3.5/2
        assert!((v.en_f64() - 7.875).abs() < 1e-9);
    }
}
