// src/noyau/erreurs.rs
//
// Taxonomie des erreurs du pipeline.
// - LexError        : texte -> jetons
// - ParseError      : jetons -> RPN (et structure RPN invalide)
// - ArithmeticError : noyau numérique
//
// Le type précis reste disponible (tests, diagnostic) ; l’affichage utilisateur
// passe par `categorie()` qui regroupe en deux classes.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("caractère inattendu '{caractere}' (position {position})")]
    UnknownToken { caractere: char, position: usize },

    #[error("nombre mal formé (position {position})")]
    MalformedNumber { position: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("parenthèses non appariées")]
    MismatchedParen,

    #[error("virgule hors d’un appel de fonction")]
    MisplacedComma,

    #[error("expression invalide")]
    InvalidExpression,

    #[error("opérande manquant")]
    MissingOperand,

    #[error("fonction inconnue: {0}")]
    UnknownFunction(String),

    #[error("fonction '{0}' sans parenthèse")]
    DanglingFunction(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArithmeticError {
    #[error("division par zéro")]
    DivisionByZero,

    #[error("factorielle d’un entier négatif")]
    NegativeFactorial,

    #[error("arguments manquants pour {0}")]
    MissingArguments(String),

    #[error("{fonction} attend {attendu} argument(s), reçu {recu}")]
    ArityMismatch {
        fonction: String,
        attendu: usize,
        recu: usize,
    },

    #[error("résultat non fini")]
    MathError,

    #[error("pile de calcul saturée")]
    StackOverflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),
}

/// Classes d’erreur montrées à l’utilisateur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategorieErreur {
    Syntaxe,
    Math,
}

impl CategorieErreur {
    pub fn message(self) -> &'static str {
        match self {
            CategorieErreur::Syntaxe => "Erreur de syntaxe",
            CategorieErreur::Math => "Erreur mathématique",
        }
    }
}

impl EvaluationError {
    pub fn categorie(&self) -> CategorieErreur {
        match self {
            EvaluationError::Lex(_) | EvaluationError::Parse(_) => CategorieErreur::Syntaxe,
            EvaluationError::Arithmetic(_) => CategorieErreur::Math,
        }
    }
}
