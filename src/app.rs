// src/app.rs
//
// Couche application (sans vue)
// -----------------------------
// Rôle:
// - Déclarer les sous-modules (etat.rs + stockage.rs)
// - Ré-exporter Calculatrice (pour main.rs: use calculatrice_sci::app::Calculatrice;)
//
// Important:
// - Le rendu (boutons, historique, clavier) appartient à l’hôte ; ici, seulement l’état.

pub mod etat;
pub mod stockage;

// Ré-export pratique : `use crate::app::Calculatrice;`
pub use etat::{Calculatrice, EntreeHistorique, Mode};
pub use stockage::{EtatPersiste, FichierEtat, Stockage, StockageError, StockageNul};
