//! Tests fuzz safe : robustesse + déterminisme + limites contrôlées.
//!
//! But : marteler le pipeline sans brûler la machine.
//! - RNG déterministe (seed fixe)
//! - profondeur bornée, exposants et factorielles petits
//! - budget temps global
//! - invariant clé : jamais de panique ; soit une Value, soit une EvaluationError
//! - une Value produite se relit depuis son texte de tampon

use std::time::{Duration, Instant};

use super::format::{format_affichage, format_tampon};
use super::{evaluate, EvaluationError, ModeAngle, Session, Value};

/* ------------------------ RNG déterministe minimal ------------------------ */

#[derive(Clone)]
struct Rng {
    state: u64,
}
impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }
    fn next_u32(&mut self) -> u32 {
        // LCG simple (déterministe)
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
    fn pick(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.next_u32() % n
        }
    }
    fn coin(&mut self) -> bool {
        (self.next_u32() & 1) == 1
    }
}

/* ------------------------ Budget anti-gel ------------------------ */

fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Helpers fuzz ------------------------ */

fn check_valeur(expr: &str, v: &Value, session: &Session) {
    assert!(!format_affichage(v).is_empty(), "affichage vide: expr={expr:?}");

    // le texte du tampon doit rester une expression valide
    let texte = format_tampon(v);
    assert!(
        evaluate(&texte, session).is_ok(),
        "tampon illisible: expr={expr:?} texte={texte:?}"
    );
}

fn check_erreur(expr: &str, e: &EvaluationError) {
    assert!(!e.to_string().is_empty(), "message vide: expr={expr:?}");
    assert!(!e.categorie().message().is_empty());
}

/* ------------------------ Génération d’expressions (bornée) ------------------------ */

fn gen_nombre(rng: &mut Rng) -> String {
    // 0 inclus : la division par zéro doit pouvoir arriver
    match rng.pick(8) {
        0 => "0".to_string(),
        1 => "1".to_string(),
        2 => "2".to_string(),
        3 => "0.5".to_string(),
        4 => "3.25".to_string(),
        5 => ".75".to_string(),
        6 => "10".to_string(),
        _ => "7".to_string(),
    }
}

fn gen_atom(rng: &mut Rng) -> String {
    match rng.pick(8) {
        0 | 1 | 2 => gen_nombre(rng),
        3 => "pi".to_string(),
        4 => "e".to_string(),
        5 => "ans".to_string(),
        // factorielles petites seulement
        6 => format!("{}!", rng.pick(8)),
        _ => format!("{}%", gen_nombre(rng)),
    }
}

fn gen_fonction_unaire(rng: &mut Rng) -> &'static str {
    match rng.pick(10) {
        0 => "sin",
        1 => "cos",
        2 => "tan",
        3 => "ln",
        4 => "log",
        5 => "sqrt",
        6 => "abs",
        7 => "erf",
        8 => "atan",
        _ => "gamma",
    }
}

fn gen_expr(rng: &mut Rng, depth: usize) -> String {
    if depth == 0 {
        return gen_atom(rng);
    }

    match rng.pick(10) {
        0 => gen_atom(rng),
        1 => format!("({}+{})", gen_expr(rng, depth - 1), gen_expr(rng, depth - 1)),
        2 => format!("({}-{})", gen_expr(rng, depth - 1), gen_expr(rng, depth - 1)),
        3 => format!("({}*{})", gen_expr(rng, depth - 1), gen_expr(rng, depth - 1)),
        4 => format!("({}/{})", gen_expr(rng, depth - 1), gen_expr(rng, depth - 1)),
        // exposant borné
        5 => format!("({})^{}", gen_expr(rng, depth - 1), rng.pick(4)),
        6 => format!("-{}", gen_expr(rng, depth - 1)),
        7 => format!("{}({})", gen_fonction_unaire(rng), gen_expr(rng, depth - 1)),
        8 => {
            let f = if rng.coin() { "nCr" } else { "nPr" };
            format!("{f}({},{})", rng.pick(30), rng.pick(12))
        }
        _ => format!("root({},{})", gen_expr(rng, depth - 1), 1 + rng.pick(4)),
    }
}

/// Soupe de jetons : majoritairement invalide, ne doit jamais paniquer.
fn gen_soupe(rng: &mut Rng) -> String {
    const MORCEAUX: &[&str] = &[
        "1", "2", "0.5", ".", "3", "+", "-", "*", "/", "^", "!", "%", "(", ")", ",", "sin",
        "nCr", "root", "pi", "e", "ans", "#", " ", "×", "÷", "−", "√", "π", "foo",
    ];
    let n = 1 + rng.pick(12) as usize;
    (0..n)
        .map(|_| MORCEAUX[rng.pick(MORCEAUX.len() as u32) as usize])
        .collect()
}

/* ------------------------ Helper somme balancée anti pile ------------------------ */

fn somme_balancee(terme: &str, n: usize) -> String {
    let mut items: Vec<String> = (0..n).map(|_| terme.to_string()).collect();
    while items.len() > 1 {
        let mut next = Vec::new();
        let mut i = 0;
        while i < items.len() {
            if i + 1 < items.len() {
                next.push(format!("({}+{})", items[i], items[i + 1]));
                i += 2;
            } else {
                next.push(items[i].clone());
                i += 1;
            }
        }
        items = next;
    }
    items.pop().unwrap_or_else(|| "0".to_string())
}

/* ------------------------ Tests ------------------------ */

#[test]
fn fuzz_safe_expressions_sans_panique() {
    let t0 = Instant::now();
    let max = Duration::from_secs(3);

    let mut rng = Rng::new(0xC0FFEE_u64);
    let mut session = Session::default();

    let mut seen_ok = 0usize;

    for i in 0..120 {
        budget(t0, max);

        // alterne les modes pour couvrir les deux domaines
        session.set_mode_exact(i % 3 != 0);
        session.set_mode_angle(if i % 2 == 0 {
            ModeAngle::Degres
        } else {
            ModeAngle::Radians
        });

        let expr = gen_expr(&mut rng, 3);
        match evaluate(&expr, &session) {
            Ok(v) => {
                check_valeur(&expr, &v, &session);
                session.set_derniere_reponse(v);
                seen_ok += 1;
            }
            Err(e) => check_erreur(&expr, &e),
        }
    }

    // sinon le fuzz ne "balaye" rien
    assert!(seen_ok > 10, "trop peu de succès: {seen_ok}");
}

#[test]
fn fuzz_safe_determinisme() {
    let passe = |seed: u64| -> Vec<Result<Value, EvaluationError>> {
        let mut rng = Rng::new(seed);
        let session = Session::default();
        (0..40)
            .map(|_| evaluate(&gen_expr(&mut rng, 3), &session))
            .collect()
    };

    // Même seed => mêmes expressions => mêmes sorties
    assert_eq!(passe(0xBADC0DE_u64), passe(0xBADC0DE_u64));
}

#[test]
fn fuzz_safe_soupe_de_jetons() {
    let t0 = Instant::now();
    let max = Duration::from_secs(2);

    let mut rng = Rng::new(0x5EED_u64);
    let session = Session::default();
    let mut seen_err = 0usize;

    for _ in 0..400 {
        budget(t0, max);

        let expr = gen_soupe(&mut rng);
        match evaluate(&expr, &session) {
            Ok(v) => check_valeur(&expr, &v, &session),
            Err(e) => {
                check_erreur(&expr, &e);
                seen_err += 1;
            }
        }
    }

    assert!(seen_err > 0, "aucune erreur vue: soupe trop \"sage\"");
}

#[test]
fn fuzz_safe_somme_balancee_anti_pile() {
    let t0 = Instant::now();
    let max = Duration::from_millis(500);

    let expr = somme_balancee("1/2", 800);
    let v = evaluate(&expr, &Session::default()).unwrap_or_else(|e| panic!("err: {e}"));
    budget(t0, max);

    // 800*(1/2) = 400
    assert_eq!(format_affichage(&v), "400");
}
