// src/noyau/session.rs
//
// Session : réglages + dernière réponse + mémoire.
// Construite une fois au démarrage, modifiée seulement par ses setters.
// L’évaluateur ne fait que lire.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::erreurs::ArithmeticError;
use super::valeur::Value;

pub const PRECISION_MIN: u32 = 8;
pub const PRECISION_MAX: u32 = 200;
pub const PRECISION_DEFAUT: u32 = 34;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeAngle {
    #[default]
    Degres,
    Radians,
}

impl ModeAngle {
    /// angle (mode courant) -> radians
    pub fn vers_radians(self, x: f64) -> f64 {
        match self {
            ModeAngle::Degres => x.to_radians(),
            ModeAngle::Radians => x,
        }
    }

    /// radians -> angle (mode courant)
    pub fn depuis_radians(self, x: f64) -> f64 {
        match self {
            ModeAngle::Degres => x.to_degrees(),
            ModeAngle::Radians => x,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Session {
    precision: u32,
    mode_angle: ModeAngle,
    mode_exact: bool,
    derniere_reponse: Value,
    memoire: Value,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            precision: PRECISION_DEFAUT,
            mode_angle: ModeAngle::default(),
            mode_exact: true,
            derniere_reponse: Value::default(),
            memoire: Value::default(),
        }
    }
}

impl Session {
    pub fn new(precision: u32, mode_angle: ModeAngle, mode_exact: bool) -> Self {
        let mut s = Self {
            mode_angle,
            mode_exact,
            ..Self::default()
        };
        s.precision = precision.clamp(PRECISION_MIN, PRECISION_MAX);
        s
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn mode_angle(&self) -> ModeAngle {
        self.mode_angle
    }

    pub fn mode_exact(&self) -> bool {
        self.mode_exact
    }

    pub fn derniere_reponse(&self) -> &Value {
        &self.derniere_reponse
    }

    pub fn memoire(&self) -> &Value {
        &self.memoire
    }

    /* ------------------------ Setters ------------------------ */

    /// Borne la précision dans [8, 200]. Les valeurs déjà stockées ne sont pas réécrites.
    pub fn set_precision(&mut self, precision: u32) -> u32 {
        self.precision = precision.clamp(PRECISION_MIN, PRECISION_MAX);
        info!(precision = self.precision, "précision modifiée");
        self.precision
    }

    pub fn set_mode_angle(&mut self, mode: ModeAngle) {
        self.mode_angle = mode;
        info!(?mode, "mode d’angle modifié");
    }

    pub fn set_mode_exact(&mut self, actif: bool) {
        self.mode_exact = actif;
        info!(actif, "mode exact modifié");
    }

    pub fn set_derniere_reponse(&mut self, v: Value) {
        self.derniere_reponse = v;
    }

    /// Restauration au démarrage (valeurs persistées).
    pub fn restaurer(&mut self, derniere_reponse: Value, memoire: Value) {
        self.derniere_reponse = derniere_reponse;
        self.memoire = memoire;
    }

    /// M+
    pub fn memoire_ajouter(&mut self, v: &Value) -> Result<(), ArithmeticError> {
        self.memoire = super::eval::addition(&self.memoire, v, self.precision)?;
        Ok(())
    }

    /// M-
    pub fn memoire_soustraire(&mut self, v: &Value) -> Result<(), ArithmeticError> {
        self.memoire = super::eval::addition(&self.memoire, &v.negation(), self.precision)?;
        Ok(())
    }

    /// MC
    pub fn memoire_effacer(&mut self) {
        self.memoire = Value::default();
    }
}
