//! Calculatrice scientifique : noyau + composition
//!
//! - noyau  : lexer -> RPN -> pile -> Value (entier exact | décimal)
//! - app    : contrôleur de composition + stockage de l’état
//! - config : réglages TOML

pub mod app;
pub mod config;
pub mod noyau;

pub use noyau::{evaluate, lex, parse, run, EvaluationError, ModeAngle, Session, Value};
