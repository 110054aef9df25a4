// src/noyau/valeur.rs
//
// Valeur calculée : deux domaines, jamais ambigus.
// - ExactInteger : entier non borné (aucun arrondi)
// - Decimal      : décimal arrondi à la précision de la session
//
// Les promotions sont des fonctions pures : l’appelant choisit explicitement
// le domaine cible (pas de coercition implicite).

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

/// Ordre de grandeur maximal d’une valeur (puissance de 10, dans les deux sens).
/// Au-delà, le texte pleine notation du tampon ne tient plus en mémoire.
pub const LIMITE_EXPOSANT: i64 = 100_000;

/// Même borne pour un entier exact, en bits (100 000 × log2(10)).
pub const LIMITE_BITS: u64 = 332_193;

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    ExactInteger(BigInt),
    Decimal(BigDecimal),
}

impl Default for Value {
    fn default() -> Self {
        Value::Decimal(BigDecimal::zero())
    }
}

/// Arrondit à `precision` chiffres significatifs (zéros de queue retirés).
pub fn arrondir(d: &BigDecimal, precision: u32) -> BigDecimal {
    if d.is_zero() {
        return BigDecimal::zero();
    }
    d.with_prec(u64::from(precision)).normalized()
}

impl Value {
    /// Construit une valeur décimale déjà arrondie.
    pub fn decimal(d: &BigDecimal, precision: u32) -> Value {
        Value::Decimal(arrondir(d, precision))
    }

    /// Promotion vers le domaine décimal (sans arrondi).
    pub fn en_decimal(&self) -> BigDecimal {
        match self {
            Value::ExactInteger(n) => BigDecimal::new(n.clone(), 0),
            Value::Decimal(d) => d.clone(),
        }
    }

    /// Lecture double précision (NaN si hors de portée).
    pub fn en_f64(&self) -> f64 {
        let x = match self {
            Value::ExactInteger(n) => n.to_f64(),
            Value::Decimal(d) => d.to_f64(),
        };
        x.unwrap_or(f64::NAN)
    }

    pub fn est_entier(&self) -> bool {
        match self {
            Value::ExactInteger(_) => true,
            Value::Decimal(d) => d.is_integer(),
        }
    }

    /// Valeur entière (si la valeur est entière), quel que soit le domaine.
    /// Un décimal hors portée n’est jamais développé en entier.
    pub fn en_entier(&self) -> Option<BigInt> {
        match self {
            Value::ExactInteger(n) => Some(n.clone()),
            Value::Decimal(d) if d.is_integer() && self.dans_la_portee() => {
                Some(d.with_scale(0).as_bigint_and_exponent().0)
            }
            Value::Decimal(_) => None,
        }
    }

    pub fn est_zero(&self) -> bool {
        match self {
            Value::ExactInteger(n) => n.is_zero(),
            Value::Decimal(d) => d.is_zero(),
        }
    }

    /// Négation dans le domaine d’origine.
    pub fn negation(&self) -> Value {
        match self {
            Value::ExactInteger(n) => Value::ExactInteger(-n),
            Value::Decimal(d) => Value::Decimal(-d),
        }
    }

    /// Exposant décimal du premier chiffre : 1234 -> 3, 0.05 -> -2 (None pour zéro).
    /// Pour un entier exact, estimation par le nombre de bits (sans conversion en texte).
    pub fn exposant_decimal(&self) -> Option<i64> {
        if self.est_zero() {
            return None;
        }
        match self {
            Value::ExactInteger(n) => {
                Some(((n.bits() - 1) as f64 * std::f64::consts::LOG10_2) as i64)
            }
            Value::Decimal(d) => {
                let (_, scale) = d.as_bigint_and_exponent();
                Some(d.digits() as i64 - 1 - scale)
            }
        }
    }

    /// Magnitude dans [1e-100000, 1e100000] (zéro compris).
    pub fn dans_la_portee(&self) -> bool {
        self.exposant_decimal()
            .map_or(true, |e| e.abs() <= LIMITE_EXPOSANT)
    }
}
