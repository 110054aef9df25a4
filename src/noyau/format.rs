// src/noyau/format.rs
//
// Deux sorties :
// - affichage (contrat de présentation) :
//     |x| < 1e-6          -> exponentiel, 10 chiffres après la virgule
//     entier, |x| < 1e21  -> entier groupé par milliers
//     sinon               -> 12 chiffres significatifs
// - tampon : notation pleine, sans séparateur ni exposant, pleine précision
//   (doit pouvoir être relu par le lexer tel quel) ; hors portée seulement,
//   "mantisse*10^exposant" pour ne jamais développer des milliards de zéros

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::{Signed, Zero};

use super::valeur::{Value, LIMITE_EXPOSANT};

const CHIFFRES_AFFICHES: u32 = 12;
const CHIFFRES_EXPONENTIEL: u32 = 10;

/* ------------------------ Helpers ------------------------ */

/// Chiffres (sans signe ni zéros de queue) et exposant décimal du premier chiffre.
/// 0.00123 -> ("123", -3)
fn chiffres_et_exposant(d: &BigDecimal) -> (String, i64) {
    let (n, scale) = d.as_bigint_and_exponent();
    let brut = n.abs().to_string();
    let exposant = brut.len() as i64 - 1 - scale;
    let chiffres = brut.trim_end_matches('0');
    let chiffres = if chiffres.is_empty() { "0" } else { chiffres };
    (chiffres.to_string(), exposant)
}

/// Notation pleine à partir des chiffres significatifs et de l’exposant.
fn notation_pleine(negatif: bool, chiffres: &str, exposant: i64) -> String {
    let mut s = String::new();
    if negatif {
        s.push('-');
    }

    let n = chiffres.len() as i64;
    if exposant < 0 {
        s.push_str("0.");
        s.push_str(&"0".repeat((-exposant - 1) as usize));
        s.push_str(chiffres);
    } else if exposant + 1 >= n {
        s.push_str(chiffres);
        s.push_str(&"0".repeat((exposant + 1 - n) as usize));
    } else {
        let (entier, frac) = chiffres.split_at((exposant + 1) as usize);
        s.push_str(entier);
        s.push('.');
        s.push_str(frac);
    }
    s
}

/// "1.5*10^-200000" : relisible, de taille bornée.
fn notation_puissance(negatif: bool, chiffres: &str, exposant: i64) -> String {
    let signe = if negatif { "-" } else { "" };
    let (tete, queue) = chiffres.split_at(1);
    if queue.is_empty() {
        format!("{signe}{tete}*10^{exposant}")
    } else {
        format!("{signe}{tete}.{queue}*10^{exposant}")
    }
}

fn grouper_milliers(n: &BigInt) -> String {
    let brut = n.abs().to_string();
    let mut out = String::with_capacity(brut.len() + brut.len() / 3 + 1);
    for (i, c) in brut.chars().enumerate() {
        if i > 0 && (brut.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if n.is_negative() {
        out.insert(0, '-');
    }
    out
}

fn exponentiel(d: &BigDecimal) -> String {
    let (chiffres, exposant) = chiffres_et_exposant(&d.with_prec(u64::from(CHIFFRES_EXPONENTIEL + 1)));
    let mut mantisse = chiffres;
    while mantisse.len() < (CHIFFRES_EXPONENTIEL + 1) as usize {
        mantisse.push('0');
    }
    let (tete, queue) = mantisse.split_at(1);
    let signe = if d.is_negative() { "-" } else { "" };
    let signe_exp = if exposant < 0 { "-" } else { "+" };
    format!("{signe}{tete}.{queue}e{signe_exp}{}", exposant.abs())
}

/// 12 chiffres significatifs, zéros de queue retirés ; exposant au-delà de 1e21.
fn significatif(d: &BigDecimal) -> String {
    let arrondi = d.with_prec(u64::from(CHIFFRES_AFFICHES));
    let (chiffres, exposant) = chiffres_et_exposant(&arrondi);

    if exposant >= 21 {
        let (tete, queue) = chiffres.split_at(1);
        let signe = if d.is_negative() { "-" } else { "" };
        return if queue.is_empty() {
            format!("{signe}{tete}e+{exposant}")
        } else {
            format!("{signe}{tete}.{queue}e+{exposant}")
        };
    }
    notation_pleine(d.is_negative(), &chiffres, exposant)
}

/* ------------------------ API ------------------------ */

/// Affichage utilisateur (contrat de présentation).
pub fn format_affichage(v: &Value) -> String {
    if v.est_zero() {
        return "0".to_string();
    }

    // seuils comparés sur l’exposant : |x| < 1e-6 <=> exposant <= -7, |x| < 1e21 <=> exposant <= 20
    let d = v.en_decimal();
    let (_, exposant) = chiffres_et_exposant(&d);

    if exposant <= -7 {
        return exponentiel(&d);
    }
    if v.est_entier() && exposant <= 20 {
        if let Some(n) = v.en_entier() {
            return grouper_milliers(&n);
        }
    }
    significatif(&d)
}

/// Texte du tampon : relisible par le lexer, pleine précision.
pub fn format_tampon(v: &Value) -> String {
    match v {
        Value::ExactInteger(n) => n.to_string(),
        Value::Decimal(d) => {
            if d.is_zero() {
                return "0".to_string();
            }
            let (chiffres, exposant) = chiffres_et_exposant(d);
            if exposant.abs() > LIMITE_EXPOSANT {
                return notation_puissance(d.is_negative(), &chiffres, exposant);
            }
            notation_pleine(d.is_negative(), &chiffres, exposant)
        }
    }
}
