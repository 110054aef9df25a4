//! Noyau : évaluation (pipeline réel)
//!
//! lex -> parse (RPN) -> run (pile d’opérandes) -> Value
//!
//! Règles de domaine :
//! - deux ExactInteger : + - * ^(n >= 0) restent exacts, / tronque
//! - sinon : les deux opérandes passent en Decimal (précision de session)
//! - fonctions transcendantes / spéciales : double précision, toujours

use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};
use tracing::debug;

use super::erreurs::{ArithmeticError, EvaluationError, ParseError};
use super::fonctions::Fonction;
use super::jetons::{format_tokens, tokenize, Constante, Operateur, Postfixe, Tok};
use super::numerique::{self, Combinatoire, LIMITE_EXPOSANT_ENTIER};
use super::rpn::{format_rpn, to_rpn, ElementRpn};
use super::session::Session;
use super::valeur::{arrondir, Value, LIMITE_BITS};

/// Garde-fou : taille maximale de la pile d’opérandes.
pub const TAILLE_PILE_MAX: usize = 5000;

/* ------------------------ API publique ------------------------ */

pub fn lex(texte: &str) -> Result<Vec<Tok>, EvaluationError> {
    Ok(tokenize(texte)?)
}

pub fn parse(jetons: &[Tok]) -> Result<Vec<ElementRpn>, EvaluationError> {
    Ok(to_rpn(jetons)?)
}

/// Évalue une expression complète avec la session donnée (lecture seule).
pub fn evaluate(texte: &str, session: &Session) -> Result<Value, EvaluationError> {
    let jetons = lex(texte)?;
    debug!(jetons = %format_tokens(&jetons), "lexer");

    let rpn = parse(&jetons)?;
    debug!(rpn = %format_rpn(&rpn), "parseur");

    let v = run(&rpn, session)?;
    debug!(resultat = ?v, "évaluation");
    Ok(v)
}

/// Exécute une RPN sur une pile d’opérandes (un seul passage gauche -> droite).
pub fn run(rpn: &[ElementRpn], session: &Session) -> Result<Value, EvaluationError> {
    let precision = session.precision();
    let mut pile: Vec<Value> = Vec::with_capacity(16);

    for element in rpn {
        let v = match element {
            ElementRpn::Nombre(s) => {
                let d = BigDecimal::from_str(s).map_err(|_| ParseError::InvalidExpression)?;
                Value::decimal(&d, precision)
            }

            ElementRpn::Constante(c) => match c {
                Constante::Pi => Value::Decimal(numerique::pi(precision)),
                Constante::E => Value::Decimal(numerique::e(precision)),
                Constante::Ans => session.derniere_reponse().clone(),
            },

            ElementRpn::Op(Operateur::Negation) => {
                let a = pile.pop().ok_or(ParseError::MissingOperand)?;
                a.negation()
            }

            ElementRpn::Op(op) => {
                let b = pile.pop().ok_or(ParseError::MissingOperand)?;
                let a = pile.pop().ok_or(ParseError::MissingOperand)?;
                operation_binaire(*op, &a, &b, precision)?
            }

            ElementRpn::Postfixe(p) => {
                let a = pile.pop().ok_or(ParseError::MissingOperand)?;
                match p {
                    Postfixe::Factorielle => {
                        numerique::factorielle(&a, session.mode_exact(), precision)?
                    }
                    Postfixe::Pourcent => pourcent(&a, precision)?,
                }
            }

            ElementRpn::Fonction { fonction, arite } => {
                if pile.len() < *arite {
                    return Err(ArithmeticError::MissingArguments(fonction.nom().to_string()).into());
                }
                let args = pile.split_off(pile.len() - arite);
                appliquer_fonction(*fonction, &args, session)?
            }
        };

        pile.push(borner(v)?);
        if pile.len() > TAILLE_PILE_MAX {
            return Err(ArithmeticError::StackOverflow.into());
        }
    }

    if pile.len() != 1 {
        return Err(ParseError::InvalidExpression.into());
    }
    pile.pop().ok_or_else(|| ParseError::InvalidExpression.into())
}

/* ------------------------ Opérateurs ------------------------ */

/// Toute valeur produite reste dans la portée (sinon MathError).
fn borner(v: Value) -> Result<Value, ArithmeticError> {
    if v.dans_la_portee() {
        Ok(v)
    } else {
        Err(ArithmeticError::MathError)
    }
}

/// a + b selon les règles de domaine (utilisé aussi par la mémoire).
pub(crate) fn addition(a: &Value, b: &Value, precision: u32) -> Result<Value, ArithmeticError> {
    borner(operation_binaire(Operateur::Plus, a, b, precision)?)
}

fn operation_binaire(
    op: Operateur,
    a: &Value,
    b: &Value,
    precision: u32,
) -> Result<Value, ArithmeticError> {
    if let (Value::ExactInteger(x), Value::ExactInteger(y)) = (a, b) {
        if let Some(v) = operation_exacte(op, x, y)? {
            return Ok(v);
        }
    }

    let (x, y) = (a.en_decimal(), b.en_decimal());
    let d = match op {
        Operateur::Plus => arrondir(&(x + y), precision),
        Operateur::Moins => arrondir(&(x - y), precision),
        Operateur::Fois => arrondir(&(x * y), precision),
        Operateur::Divise => numerique::diviser(&x, &y, precision)?,
        Operateur::Puissance => numerique::puissance_decimale(&x, &y, precision)?,
        Operateur::Negation => return Ok(a.negation()),
    };
    Ok(Value::Decimal(d))
}

/// Domaine exact. `None` => l’opération doit passer en décimal
/// (exposant négatif ou trop grand, ou résultat au-delà de LIMITE_BITS).
fn operation_exacte(
    op: Operateur,
    x: &BigInt,
    y: &BigInt,
) -> Result<Option<Value>, ArithmeticError> {
    let v = match op {
        Operateur::Plus => x + y,
        Operateur::Moins => x - y,
        Operateur::Fois => x * y,
        Operateur::Divise => {
            if y.is_zero() {
                return Err(ArithmeticError::DivisionByZero);
            }
            // troncature vers zéro (contrat du domaine exact)
            x / y
        }
        Operateur::Puissance => {
            let borne = |n: &u32| {
                *n <= LIMITE_EXPOSANT_ENTIER
                    && x.bits().saturating_mul(u64::from(*n)) <= LIMITE_BITS
            };
            match y.to_u32().filter(borne) {
                Some(n) => x.pow(n),
                None => return Ok(None),
            }
        }
        Operateur::Negation => -x,
    };
    Ok(Some(Value::ExactInteger(v)))
}

/// x% : /100 dans le domaine décimal ; un entier exact passe par un ratio flottant.
fn pourcent(a: &Value, precision: u32) -> Result<Value, ArithmeticError> {
    match a {
        Value::Decimal(d) => Ok(Value::Decimal(numerique::diviser(
            d,
            &BigDecimal::from(100),
            precision,
        )?)),
        Value::ExactInteger(_) => Ok(Value::Decimal(numerique::decimal_depuis_f64(
            a.en_f64() / 100.0,
            precision,
        )?)),
    }
}

/* ------------------------ Fonctions ------------------------ */

fn verifier_arite(f: Fonction, args: &[Value]) -> Result<(), ArithmeticError> {
    if args.len() != f.arite() {
        return Err(ArithmeticError::ArityMismatch {
            fonction: f.nom().to_string(),
            attendu: f.arite(),
            recu: args.len(),
        });
    }
    Ok(())
}

fn appliquer_fonction(
    f: Fonction,
    args: &[Value],
    session: &Session,
) -> Result<Value, ArithmeticError> {
    verifier_arite(f, args)?;

    let precision = session.precision();
    let angle = session.mode_angle();

    match f {
        Fonction::NCr | Fonction::NPr => {
            let genre = if f == Fonction::NCr {
                Combinatoire::Combinaisons
            } else {
                Combinatoire::Arrangements
            };
            return numerique::combinatoire(
                genre,
                &args[0],
                &args[1],
                session.mode_exact(),
                precision,
            );
        }
        Fonction::Abs => {
            return Ok(match &args[0] {
                Value::ExactInteger(n) => Value::ExactInteger(n.abs()),
                Value::Decimal(d) => Value::Decimal(d.abs()),
            });
        }
        _ => {}
    }

    let x = args[0].en_f64();
    let r = match f {
        Fonction::Sin => angle.vers_radians(x).sin(),
        Fonction::Cos => angle.vers_radians(x).cos(),
        Fonction::Tan => angle.vers_radians(x).tan(),
        Fonction::Asin => angle.depuis_radians(x.asin()),
        Fonction::Acos => angle.depuis_radians(x.acos()),
        Fonction::Atan => angle.depuis_radians(x.atan()),
        Fonction::Sinh => x.sinh(),
        Fonction::Cosh => x.cosh(),
        Fonction::Tanh => x.tanh(),
        Fonction::Asinh => x.asinh(),
        Fonction::Acosh => x.acosh(),
        Fonction::Atanh => x.atanh(),
        Fonction::Ln => x.ln(),
        Fonction::Log => x.log10(),
        Fonction::Sqrt => x.sqrt(),
        Fonction::Exp => x.exp(),
        Fonction::Gamma => numerique::gamma(x),
        Fonction::Erf => numerique::erf(x),
        Fonction::Root => x.powf(1.0 / args[1].en_f64()),
        Fonction::Abs | Fonction::NCr | Fonction::NPr => {
            return Err(ArithmeticError::MathError);
        }
    };

    Ok(Value::Decimal(numerique::decimal_depuis_f64(r, precision)?))
}
