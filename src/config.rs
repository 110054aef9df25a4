//! Réglages (fichier TOML)
//!
//! Exemple :
//! ```toml
//! precision = 50
//! mode_angle = "radians"
//! mode_exact = false
//! ```
//! Chaque champ est optionnel ; les absents prennent la valeur par défaut.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::noyau::session::PRECISION_DEFAUT;
use crate::noyau::{ModeAngle, Session};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("lecture des réglages impossible: {0}")]
    Lecture(#[from] std::io::Error),

    #[error("réglages illisibles: {0}")]
    Analyse(#[from] toml::de::Error),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reglages {
    pub precision: u32,
    pub mode_angle: ModeAngle,
    pub mode_exact: bool,
}

impl Default for Reglages {
    fn default() -> Self {
        Self {
            precision: PRECISION_DEFAUT,
            mode_angle: ModeAngle::Degres,
            mode_exact: true,
        }
    }
}

impl Reglages {
    pub fn depuis_texte(texte: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(texte)?)
    }

    pub fn charger(chemin: &Path) -> Result<Self, ConfigError> {
        let texte = fs::read_to_string(chemin)?;
        Self::depuis_texte(&texte)
    }

    /// Session neuve (précision bornée dans [8, 200]).
    pub fn session(&self) -> Session {
        Session::new(self.precision, self.mode_angle, self.mode_exact)
    }
}
