//! Tests scientifiques (campagne) : propriétés du pipeline complet.
//!
//! But : vérifier les contrats observables, de bout en bout.
//! - précédences (dont la négation avant la puissance, volontaire)
//! - aller-retour texte du tampon -> valeur
//! - domaine exact (factorielle, combinatoire) vs décimal
//! - plafond double précision de Gamma
//!
//! Notes :
//! - les nombres saisis sont TOUJOURS décimaux ; le domaine exact n’apparaît
//!   qu’à travers factorielle / nCr / nPr / ans.

use std::str::FromStr;
use std::time::{Duration, Instant};

use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use super::erreurs::{ArithmeticError, EvaluationError, ParseError};
use super::format::{format_affichage, format_tampon};
use super::{evaluate, ModeAngle, Session, Value};

fn eval_ok(expr: &str, session: &Session) -> Value {
    evaluate(expr, session).unwrap_or_else(|e| panic!("expr={expr:?} err={e}"))
}

fn affiche(expr: &str) -> String {
    format_affichage(&eval_ok(expr, &Session::default()))
}

fn assert_err(expr: &str, attendu: EvaluationError) {
    let r = evaluate(expr, &Session::default());
    assert_eq!(r, Err(attendu), "expr={expr:?}");
}

/// Budget global anti-gel.
fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Précédences ------------------------ */

#[test]
fn sci_precedences() {
    assert_eq!(affiche("2+3*4"), "14");
    assert_eq!(affiche("(2+3)*4"), "20");
    assert_eq!(affiche("2^3^2"), "512");
    assert_eq!(affiche("100/10/2"), "5");
}

#[test]
fn sci_negation_avant_puissance() {
    // choix assumé : (-3)^2
    assert_eq!(affiche("-3^2"), "9");
    assert_eq!(affiche("-2^3"), "-8");
    assert_eq!(affiche("2*-3"), "-6");
}

#[test]
fn sci_operateurs_de_compatibilite() {
    let s = Session::default();
    assert_eq!(eval_ok("2×3", &s), eval_ok("2*3", &s));
    assert_eq!(eval_ok("2÷2", &s), eval_ok("2/2", &s));
    assert_eq!(affiche("2×3"), "6");
    assert_eq!(affiche("2÷2"), "1");
}

/* ------------------------ Aller-retour ------------------------ */

#[test]
fn sci_aller_retour_tampon() {
    let s = Session::default();
    for expr in ["1/7", "-22/7", "pi*1000000", "0.000000123/3", "2^100", "e^-20", "5!"] {
        let v = eval_ok(expr, &s);
        let texte = format_tampon(&v);
        let relu = eval_ok(&texte, &s);
        assert_eq!(relu.en_decimal(), v.en_decimal(), "expr={expr:?} texte={texte:?}");
    }
}

#[test]
fn sci_ans_idempotent() {
    let mut s = Session::default();
    for expr in ["1/3", "nCr(30,15)", "-2.5", "sqrt(2)"] {
        let v = eval_ok(expr, &s);
        s.set_derniere_reponse(v.clone());
        assert_eq!(eval_ok("ans", &s), v, "expr={expr:?}");
    }
}

/* ------------------------ Domaine exact ------------------------ */

#[test]
fn sci_combinatoire_exacte() {
    let s = Session::default();
    assert_eq!(
        eval_ok("nCr(50,6)", &s),
        Value::ExactInteger(BigInt::from(15_890_700))
    );
    assert_eq!(eval_ok("nPr(10,3)", &s), Value::ExactInteger(BigInt::from(720)));
    assert_eq!(eval_ok("nCr(5,7)", &s), Value::ExactInteger(BigInt::from(0)));
}

#[test]
fn sci_grande_combinaison_exacte() {
    let s = Session::default();
    // C(100,50) = 100891344545564193334812497256
    let attendu = BigInt::from_str("100891344545564193334812497256").unwrap();
    assert_eq!(eval_ok("nCr(100,50)", &s), Value::ExactInteger(attendu));
}

#[test]
fn sci_factorielle_exacte_enchainee() {
    let s = Session::default();
    let v = eval_ok("5!!", &s);
    let attendu: BigInt = (1..=120u32).map(BigInt::from).product();
    assert_eq!(v, Value::ExactInteger(attendu));
}

#[test]
fn sci_factorielle_sans_mode_exact() {
    let s = Session::new(34, ModeAngle::Degres, false);
    let v = eval_ok("25!", &s);
    // 25! = 15511210043330985984000000 (26 chiffres, tient en 34)
    assert_eq!(
        v,
        Value::Decimal(BigDecimal::from_str("15511210043330985984000000").unwrap())
    );
}

#[test]
fn sci_plafond_gamma() {
    let s = Session::default();
    let v = eval_ok("4.5!", &s);
    assert!((v.en_f64() - 52.342_777_784_553_5).abs() < 1e-9);
    assert_eq!(affiche("4.5!"), "52.3427777846");
}

/* ------------------------ Erreurs ------------------------ */

#[test]
fn sci_erreurs_typees() {
    assert_err(
        "5/0",
        EvaluationError::Arithmetic(ArithmeticError::DivisionByZero),
    );
    assert_err("(2+3", EvaluationError::Parse(ParseError::MismatchedParen));
    assert!(matches!(
        evaluate("root(8)", &Session::default()),
        Err(EvaluationError::Arithmetic(ArithmeticError::ArityMismatch { .. }))
    ));
    assert!(matches!(
        evaluate("2#3", &Session::default()),
        Err(EvaluationError::Lex(_))
    ));
}

/* ------------------------ Précision ------------------------ */

#[test]
fn sci_precision_non_retroactive() {
    let mut s = Session::default();
    let v = eval_ok("1/3", &s);
    s.set_derniere_reponse(v.clone());
    s.set_precision(8);
    // la valeur stockée garde ses 34 chiffres
    assert_eq!(s.derniere_reponse(), &v);
    // les nouvelles opérations arrondissent à 8
    assert_eq!(
        eval_ok("ans*1", &s),
        Value::Decimal(BigDecimal::from_str("0.33333333").unwrap())
    );
}

#[test]
fn sci_haute_precision() {
    let mut s = Session::default();
    s.set_precision(200);
    let v = eval_ok("1/3", &s);
    assert_eq!(format_tampon(&v).len(), 202);
}

/* ------------------------ Stress borné ------------------------ */

#[test]
fn sci_stress_parentheses_imbriquees() {
    let start = Instant::now();
    let max = Duration::from_secs(2);

    let s = Session::default();
    for profondeur in [10usize, 100, 1000] {
        let expr = format!("{}1{}", "(".repeat(profondeur), ")".repeat(profondeur));
        assert_eq!(eval_ok(&expr, &s), Value::Decimal(BigDecimal::from(1)));
        budget(start, max);
    }
}

#[test]
fn sci_stress_longue_somme() {
    let start = Instant::now();
    let max = Duration::from_secs(2);

    let s = Session::default();
    let expr = vec!["1"; 2000].join("+");
    assert_eq!(format_affichage(&eval_ok(&expr, &s)), "2,000");
    budget(start, max);
}
