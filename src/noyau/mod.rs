//! Noyau de calcul
//!
//! Organisation interne :
//! - erreurs.rs    : taxonomie (lex / parse / arithmétique) + classes d’affichage
//! - valeur.rs     : Value (ExactInteger | Decimal) + promotions
//! - numerique.rs  : division/puissance décimales, π/e, factorielle, Gamma, erf, nCr/nPr
//! - jetons.rs     : tokenisation (+ moins unaire)
//! - fonctions.rs  : fonctions nommées + arités
//! - rpn.rs        : shunting-yard -> RPN
//! - session.rs    : réglages + dernière réponse + mémoire
//! - eval.rs       : pile RPN + pipeline complet
//! - format.rs     : affichage (contrat de présentation) + texte du tampon

pub mod erreurs;
pub mod eval;
pub mod fonctions;
pub mod format;
pub mod jetons;
pub mod numerique;
pub mod rpn;
pub mod session;
pub mod valeur;

#[cfg(test)]
mod tests_scientifiques;

#[cfg(test)]
mod tests_fuzz_safe;

// API publique minimale
pub use erreurs::{ArithmeticError, CategorieErreur, EvaluationError, LexError, ParseError};
pub use eval::{evaluate, lex, parse, run};
pub use session::{ModeAngle, Session};
pub use valeur::Value;
