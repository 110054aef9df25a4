// src/noyau/fonctions.rs
//
// Fonctions nommées reconnues (noms en minuscules).

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fonction {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Asinh,
    Acosh,
    Atanh,
    Ln,
    Log,
    Sqrt,
    Exp,
    Abs,
    Gamma,
    Erf,
    Root,
    NCr,
    NPr,
}

const TOUTES: [Fonction; 22] = [
    Fonction::Sin,
    Fonction::Cos,
    Fonction::Tan,
    Fonction::Asin,
    Fonction::Acos,
    Fonction::Atan,
    Fonction::Sinh,
    Fonction::Cosh,
    Fonction::Tanh,
    Fonction::Asinh,
    Fonction::Acosh,
    Fonction::Atanh,
    Fonction::Ln,
    Fonction::Log,
    Fonction::Sqrt,
    Fonction::Exp,
    Fonction::Abs,
    Fonction::Gamma,
    Fonction::Erf,
    Fonction::Root,
    Fonction::NCr,
    Fonction::NPr,
];

impl Fonction {
    /// Nom canonique (tel que saisi dans le tampon).
    pub fn nom(self) -> &'static str {
        match self {
            Fonction::Sin => "sin",
            Fonction::Cos => "cos",
            Fonction::Tan => "tan",
            Fonction::Asin => "asin",
            Fonction::Acos => "acos",
            Fonction::Atan => "atan",
            Fonction::Sinh => "sinh",
            Fonction::Cosh => "cosh",
            Fonction::Tanh => "tanh",
            Fonction::Asinh => "asinh",
            Fonction::Acosh => "acosh",
            Fonction::Atanh => "atanh",
            Fonction::Ln => "ln",
            Fonction::Log => "log",
            Fonction::Sqrt => "sqrt",
            Fonction::Exp => "exp",
            Fonction::Abs => "abs",
            Fonction::Gamma => "gamma",
            Fonction::Erf => "erf",
            Fonction::Root => "root",
            Fonction::NCr => "nCr",
            Fonction::NPr => "nPr",
        }
    }

    /// Résolution insensible à la casse.
    pub fn depuis_nom(nom: &str) -> Option<Fonction> {
        TOUTES
            .iter()
            .copied()
            .find(|f| f.nom().eq_ignore_ascii_case(nom))
    }

    /// Nombre d’arguments attendu.
    pub fn arite(self) -> usize {
        if self.est_binaire() {
            2
        } else {
            1
        }
    }

    pub fn est_binaire(self) -> bool {
        matches!(self, Fonction::Root | Fonction::NCr | Fonction::NPr)
    }
}
