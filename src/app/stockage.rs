//! src/app/stockage.rs
//!
//! Collaborateur de persistance : dernière réponse + mémoire.
//!
//! Contrats :
//! - Le noyau ne connaît que le trait `Stockage`.
//! - Écritures "best effort" : l’appelant journalise l’échec, l’évaluation n’échoue jamais pour ça.
//! - Format fichier : TOML, chaque valeur = { domaine = "exact"|"decimal", texte = "..." }.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::noyau::format::format_tampon;
use crate::noyau::Value;

#[derive(Error, Debug)]
pub enum StockageError {
    #[error("lecture de l’état impossible: {0}")]
    Lecture(#[from] std::io::Error),

    #[error("état illisible: {0}")]
    Analyse(#[from] toml::de::Error),

    #[error("sérialisation de l’état impossible: {0}")]
    Serialisation(#[from] toml::ser::Error),

    #[error("valeur persistée invalide: {0}")]
    ValeurInvalide(String),
}

/// État persisté entre deux lancements.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EtatPersiste {
    pub derniere_reponse: Value,
    pub memoire: Value,
}

pub trait Stockage {
    /// `None` si rien n’a encore été enregistré.
    fn charger(&mut self) -> Result<Option<EtatPersiste>, StockageError>;

    fn enregistrer(&mut self, etat: &EtatPersiste) -> Result<(), StockageError>;
}

/// Aucun stockage (tests, usage éphémère).
#[derive(Clone, Copy, Debug, Default)]
pub struct StockageNul;

impl Stockage for StockageNul {
    fn charger(&mut self) -> Result<Option<EtatPersiste>, StockageError> {
        Ok(None)
    }

    fn enregistrer(&mut self, _etat: &EtatPersiste) -> Result<(), StockageError> {
        Ok(())
    }
}

/* ------------------------ Fichier TOML ------------------------ */

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum Domaine {
    Exact,
    Decimal,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
struct ValeurToml {
    domaine: Domaine,
    texte: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
struct EtatToml {
    derniere_reponse: ValeurToml,
    memoire: ValeurToml,
}

impl From<&Value> for ValeurToml {
    fn from(v: &Value) -> Self {
        let domaine = match v {
            Value::ExactInteger(_) => Domaine::Exact,
            Value::Decimal(_) => Domaine::Decimal,
        };
        Self {
            domaine,
            texte: format_tampon(v),
        }
    }
}

impl TryFrom<&ValeurToml> for Value {
    type Error = StockageError;

    fn try_from(v: &ValeurToml) -> Result<Self, Self::Error> {
        let invalide = || StockageError::ValeurInvalide(v.texte.clone());
        let valeur = match v.domaine {
            Domaine::Exact => BigInt::from_str(&v.texte)
                .map(Value::ExactInteger)
                .map_err(|_| invalide())?,
            Domaine::Decimal => BigDecimal::from_str(&v.texte)
                .map(Value::Decimal)
                .map_err(|_| invalide())?,
        };
        // "1E+10000000000" se lit sans peine mais ne s’affiche plus en notation pleine
        if !valeur.dans_la_portee() {
            return Err(invalide());
        }
        Ok(valeur)
    }
}

/// État dans un fichier TOML.
#[derive(Clone, Debug)]
pub struct FichierEtat {
    chemin: PathBuf,
}

impl FichierEtat {
    pub fn new(chemin: impl Into<PathBuf>) -> Self {
        Self {
            chemin: chemin.into(),
        }
    }

    pub fn chemin(&self) -> &Path {
        &self.chemin
    }
}

impl Stockage for FichierEtat {
    fn charger(&mut self) -> Result<Option<EtatPersiste>, StockageError> {
        if !self.chemin.exists() {
            return Ok(None);
        }
        let texte = fs::read_to_string(&self.chemin)?;
        let brut: EtatToml = toml::from_str(&texte)?;
        Ok(Some(EtatPersiste {
            derniere_reponse: Value::try_from(&brut.derniere_reponse)?,
            memoire: Value::try_from(&brut.memoire)?,
        }))
    }

    fn enregistrer(&mut self, etat: &EtatPersiste) -> Result<(), StockageError> {
        let brut = EtatToml {
            derniere_reponse: ValeurToml::from(&etat.derniere_reponse),
            memoire: ValeurToml::from(&etat.memoire),
        };
        if let Some(parent) = self.chemin.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.chemin, toml::to_string(&brut)?)?;
        Ok(())
    }
}
