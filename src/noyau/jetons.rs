// src/noyau/jetons.rs
//
// Lexer : texte -> jetons.
// - normalisation : × -> *, ÷ -> /, − (U+2212) -> -
// - nombres : chiffres + au plus un '.'
// - identifiants : pi / e / ans => constantes, sinon nom de fonction (minuscules)
// - π => constante pi, √ => fonction sqrt
// - moins unaire : retagué Negation en tête, après un opérateur, '(' ou ','

use super::erreurs::LexError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operateur {
    Plus,
    Moins,
    Fois,
    Divise,
    Puissance,
    Negation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Postfixe {
    Factorielle,
    Pourcent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Constante {
    Pi,
    E,
    Ans,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Tok {
    /// Texte décimal normalisé (ex: "0.5", "12")
    Nombre(String),
    Constante(Constante),
    /// Nom de fonction en minuscules ; résolu par le parseur.
    Fonction(String),
    Op(Operateur),
    Postfixe(Postfixe),
    ParOuvrante,
    ParFermante,
    Virgule,
}

impl Operateur {
    pub fn symbole(self) -> &'static str {
        match self {
            Operateur::Plus => "+",
            Operateur::Moins => "-",
            Operateur::Fois => "*",
            Operateur::Divise => "/",
            Operateur::Puissance => "^",
            Operateur::Negation => "neg",
        }
    }
}

impl Postfixe {
    pub fn symbole(self) -> &'static str {
        match self {
            Postfixe::Factorielle => "!",
            Postfixe::Pourcent => "%",
        }
    }
}

impl Constante {
    pub fn nom(self) -> &'static str {
        match self {
            Constante::Pi => "pi",
            Constante::E => "e",
            Constante::Ans => "ans",
        }
    }
}

/// Opérateurs de compatibilité (clavier / copier-coller).
fn normaliser(c: char) -> char {
    match c {
        '×' => '*',
        '÷' => '/',
        '−' => '-',
        _ => c,
    }
}

/// Tokenize une chaîne en jetons.
pub fn tokenize(s: &str) -> Result<Vec<Tok>, LexError> {
    let chars: Vec<char> = s.chars().map(normaliser).collect();
    let mut out: Vec<Tok> = Vec::new();
    let mut i: usize = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        // Caractères simples
        let simple = match c {
            '+' => Some(Tok::Op(Operateur::Plus)),
            '-' => Some(Tok::Op(Operateur::Moins)),
            '*' => Some(Tok::Op(Operateur::Fois)),
            '/' => Some(Tok::Op(Operateur::Divise)),
            '^' => Some(Tok::Op(Operateur::Puissance)),
            '(' => Some(Tok::ParOuvrante),
            ')' => Some(Tok::ParFermante),
            ',' => Some(Tok::Virgule),
            '!' => Some(Tok::Postfixe(Postfixe::Factorielle)),
            '%' => Some(Tok::Postfixe(Postfixe::Pourcent)),
            'π' => Some(Tok::Constante(Constante::Pi)),
            '√' => Some(Tok::Fonction("sqrt".to_string())),
            _ => None,
        };
        if let Some(t) = simple {
            out.push(t);
            i += 1;
            continue;
        }

        // Nombre : chiffres et au plus un '.'
        if c.is_ascii_digit() || c == '.' {
            let start = i;
            let mut point = false;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                if chars[i] == '.' {
                    if point {
                        return Err(LexError::MalformedNumber { position: i });
                    }
                    point = true;
                }
                i += 1;
            }
            let brut: String = chars[start..i].iter().collect();
            out.push(Tok::Nombre(normaliser_nombre(&brut, start)?));
            continue;
        }

        // Identifiants : lettre puis [lettre|chiffre|_]*
        if c.is_alphabetic() {
            let start = i;
            i += 1;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let mot: String = chars[start..i].iter().collect::<String>().to_lowercase();

            out.push(match mot.as_str() {
                "pi" => Tok::Constante(Constante::Pi),
                "e" => Tok::Constante(Constante::E),
                "ans" => Tok::Constante(Constante::Ans),
                _ => Tok::Fonction(mot),
            });
            continue;
        }

        return Err(LexError::UnknownToken {
            caractere: c,
            position: i,
        });
    }

    retaguer_moins_unaire(&mut out);
    Ok(out)
}

/// ".5" -> "0.5", "5." -> "5.0" ; "." seul est refusé.
fn normaliser_nombre(brut: &str, position: usize) -> Result<String, LexError> {
    if !brut.chars().any(|c| c.is_ascii_digit()) {
        return Err(LexError::MalformedNumber { position });
    }
    let mut s = brut.to_string();
    if s.starts_with('.') {
        s.insert(0, '0');
    }
    if s.ends_with('.') {
        s.push('0');
    }
    Ok(s)
}

/// '-' => Negation s’il est en tête, ou suit un opérateur, '(' ou ','.
fn retaguer_moins_unaire(jetons: &mut [Tok]) {
    for i in 0..jetons.len() {
        if jetons[i] != Tok::Op(Operateur::Moins) {
            continue;
        }
        let unaire = match i.checked_sub(1).map(|p| &jetons[p]) {
            None => true,
            Some(Tok::Op(_) | Tok::ParOuvrante | Tok::Virgule) => true,
            Some(_) => false,
        };
        if unaire {
            jetons[i] = Tok::Op(Operateur::Negation);
        }
    }
}

/// Format utilitaire (debug/diagnostic) : liste de jetons en texte.
pub fn format_tokens(tokens: &[Tok]) -> String {
    tokens
        .iter()
        .map(|t| match t {
            Tok::Nombre(s) => s.clone(),
            Tok::Constante(c) => c.nom().to_string(),
            Tok::Fonction(nom) => nom.clone(),
            Tok::Op(op) => op.symbole().to_string(),
            Tok::Postfixe(p) => p.symbole().to_string(),
            Tok::ParOuvrante => "(".to_string(),
            Tok::ParFermante => ")".to_string(),
            Tok::Virgule => ",".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
