//! src/app/etat.rs
//!
//! Contrôleur de composition (sans vue).
//!
//! Rôle : décider comment une nouvelle saisie compose avec le résultat précédent.
//! - Edition : le tampon est en construction
//! - Evalue  : le tampon reflète le dernier résultat
//!
//! Contrats :
//! - Le tampon reste toujours relisible par le lexer (notation pleine, sans séparateur).
//! - Chaque évaluation réussie met à jour la dernière réponse et la pousse au stockage.
//! - En cas d’erreur : tampon vidé, message grossier affiché, type précis conservé.

use std::collections::VecDeque;

use tracing::{debug, warn};

use super::stockage::{EtatPersiste, Stockage, StockageNul};
use crate::noyau::fonctions::Fonction;
use crate::noyau::format::{format_affichage, format_tampon};
use crate::noyau::jetons::Postfixe;
use crate::noyau::{evaluate, EvaluationError, ModeAngle, Session, Value};

/// Garde-fou : nombre d’entrées d’historique conservées.
const HISTORIQUE_MAX: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Edition,
    Evalue,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntreeHistorique {
    pub expression: String,
    pub affichage: String,
}

pub struct Calculatrice {
    session: Session,

    // --- composition ---
    tampon: String,
    mode: Mode,

    // --- sorties ---
    affichage: String,
    erreur: Option<EvaluationError>,
    historique: VecDeque<EntreeHistorique>,

    stockage: Box<dyn Stockage>,
}

impl Default for Calculatrice {
    fn default() -> Self {
        Self::new(Session::default(), Box::new(StockageNul))
    }
}

impl Calculatrice {
    /// Construit le contrôleur ; dernière réponse et mémoire sont restaurées si le stockage en a.
    pub fn new(mut session: Session, mut stockage: Box<dyn Stockage>) -> Self {
        match stockage.charger() {
            Ok(Some(etat)) => session.restaurer(etat.derniere_reponse, etat.memoire),
            Ok(None) => {}
            Err(e) => warn!(erreur = %e, "état persisté ignoré"),
        }

        Self {
            session,
            tampon: String::new(),
            mode: Mode::Edition,
            affichage: String::new(),
            erreur: None,
            historique: VecDeque::new(),
            stockage,
        }
    }

    /* ------------------------ Lecture ------------------------ */

    pub fn tampon(&self) -> &str {
        &self.tampon
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Dernier résultat (contrat d’affichage) ou message d’erreur.
    pub fn affichage(&self) -> &str {
        &self.affichage
    }

    pub fn erreur(&self) -> Option<&EvaluationError> {
        self.erreur.as_ref()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Plus ancien d’abord.
    pub fn historique(&self) -> impl Iterator<Item = &EntreeHistorique> {
        self.historique.iter()
    }

    /* ------------------------ Réglages ------------------------ */

    pub fn set_precision(&mut self, precision: u32) -> u32 {
        self.session.set_precision(precision)
    }

    pub fn set_mode_angle(&mut self, mode: ModeAngle) {
        self.session.set_mode_angle(mode);
    }

    pub fn set_mode_exact(&mut self, actif: bool) {
        self.session.set_mode_exact(actif);
    }

    /* ------------------------ Actions ------------------------ */

    /// Chiffres, point, opérateurs, parenthèses, constantes...
    /// Après un résultat : un chiffre (ou '.') repart de zéro, le reste prolonge le résultat.
    pub fn saisir(&mut self, texte: &str) {
        self.erreur = None;
        if self.mode == Mode::Evalue {
            let nouveau_nombre = texte
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_digit() || c == '.');
            if nouveau_nombre {
                self.tampon.clear();
            }
        }
        self.tampon.push_str(texte);
        self.mode = Mode::Edition;
    }

    /// Bouton de fonction.
    /// - Evalue + unaire  : f(résultat) évalué tout de suite (chaînage)
    /// - Evalue + binaire : "f(résultat," en attente du second argument
    /// - Edition          : "f(" ajouté, sans évaluation
    pub fn fonction(&mut self, f: Fonction) {
        self.erreur = None;
        match self.mode {
            Mode::Evalue if f.est_binaire() => {
                self.tampon = format!("{}({},", f.nom(), self.tampon);
                self.mode = Mode::Edition;
            }
            Mode::Evalue => {
                let expression = format!("{}({})", f.nom(), self.tampon);
                self.executer(expression);
            }
            Mode::Edition => {
                self.tampon.push_str(f.nom());
                self.tampon.push('(');
            }
        }
    }

    /// `!` ou `%` : après un résultat, ajouté puis évalué tout de suite.
    pub fn postfixe(&mut self, p: Postfixe) {
        self.erreur = None;
        self.tampon.push_str(p.symbole());
        if self.mode == Mode::Evalue {
            let expression = self.tampon.clone();
            self.executer(expression);
        }
    }

    /// "=" : évalue le tampon (ignoré s’il est vide).
    pub fn evaluer(&mut self) -> Option<&Value> {
        if self.tampon.trim().is_empty() {
            return None;
        }
        let expression = self.tampon.clone();
        if self.executer(expression) {
            Some(self.session.derniere_reponse())
        } else {
            None
        }
    }

    /// C : tampon vidé.
    pub fn effacer(&mut self) {
        self.tampon.clear();
        self.erreur = None;
        self.mode = Mode::Edition;
    }

    /// DEL : un caractère en édition ; après un résultat, tout le tampon.
    pub fn supprimer(&mut self) {
        match self.mode {
            Mode::Evalue => {
                self.tampon.clear();
                self.mode = Mode::Edition;
            }
            Mode::Edition => {
                self.tampon.pop();
            }
        }
    }

    /* ------------------------ Mémoire ------------------------ */

    /// MR : insère la mémoire (remplace le tampon après un résultat).
    pub fn memoire_rappel(&mut self) {
        if self.mode == Mode::Evalue {
            self.tampon.clear();
        }
        let texte = format_tampon(self.session.memoire());
        self.tampon.push_str(&texte);
        self.erreur = None;
        self.mode = Mode::Edition;
    }

    /// M+
    pub fn memoire_ajouter(&mut self) -> Result<(), EvaluationError> {
        if let Some(v) = self.valeur_courante()? {
            self.session.memoire_ajouter(&v)?;
            self.persister();
        }
        Ok(())
    }

    /// M-
    pub fn memoire_soustraire(&mut self) -> Result<(), EvaluationError> {
        if let Some(v) = self.valeur_courante()? {
            self.session.memoire_soustraire(&v)?;
            self.persister();
        }
        Ok(())
    }

    /// MC
    pub fn memoire_effacer(&mut self) {
        self.session.memoire_effacer();
        self.persister();
    }

    /* ------------------------ Interne ------------------------ */

    /// Valeur sur laquelle agit la mémoire : le résultat affiché, ou le tampon évalué.
    fn valeur_courante(&self) -> Result<Option<Value>, EvaluationError> {
        match self.mode {
            Mode::Evalue => Ok(Some(self.session.derniere_reponse().clone())),
            Mode::Edition if self.tampon.trim().is_empty() => Ok(None),
            Mode::Edition => evaluate(&self.tampon, &self.session).map(Some),
        }
    }

    /// Pipeline complet sur `expression` ; met à jour tampon/affichage/mode.
    fn executer(&mut self, expression: String) -> bool {
        match evaluate(&expression, &self.session) {
            Ok(v) => {
                self.affichage = format_affichage(&v);
                self.tampon = format_tampon(&v);
                self.erreur = None;
                self.mode = Mode::Evalue;

                self.historique.push_back(EntreeHistorique {
                    expression,
                    affichage: self.affichage.clone(),
                });
                while self.historique.len() > HISTORIQUE_MAX {
                    self.historique.pop_front();
                }

                self.session.set_derniere_reponse(v);
                self.persister();
                true
            }
            Err(e) => {
                debug!(%expression, erreur = %e, "évaluation échouée");
                self.affichage = e.categorie().message().to_string();
                self.tampon.clear();
                self.erreur = Some(e);
                self.mode = Mode::Edition;
                false
            }
        }
    }

    fn persister(&mut self) {
        let etat = EtatPersiste {
            derniere_reponse: self.session.derniere_reponse().clone(),
            memoire: self.session.memoire().clone(),
        };
        if let Err(e) = self.stockage.enregistrer(&etat) {
            warn!(erreur = %e, "état non enregistré");
        }
    }
}
