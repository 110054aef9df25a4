// src/main.rs
//
// Calculatrice scientifique : shell interactif (ligne par ligne)
// -------------------------------------------------------------
// But:
// - Brancher le contrôleur de composition sur stdin/stdout
// - Réglages : fichier TOML (--config) puis options de ligne de commande
// - État (ans + mémoire) : fichier TOML optionnel (--etat)
//
// Saisie :
//   une ligne = saisie puis "=" ; commandes préfixées par ':' (voir AIDE)

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error};

use calculatrice_sci::app::{Calculatrice, FichierEtat, Mode, Stockage, StockageNul};
use calculatrice_sci::config::Reglages;
use calculatrice_sci::noyau::fonctions::Fonction;
use calculatrice_sci::noyau::jetons::Postfixe;
use calculatrice_sci::ModeAngle;

const AIDE: &str = "\
commandes :
  :f <nom>        applique une fonction (sin, sqrt, nCr, ...)
  :! / :%         factorielle / pourcentage
  :deg / :rad     mode d’angle
  :exact on|off   mode exact
  :prec <n>       précision (8..200)
  :m+ :m- :mr :mc mémoire
  :c / :del       effacer / supprimer
  :hist           historique
  :q              quitter";

#[derive(Parser)]
#[command(name = "calculatrice_sci")]
#[command(about = "Calculatrice scientifique (entiers exacts + décimal à précision arbitraire)", long_about = None)]
struct Cli {
    /// Fichier de réglages (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Précision décimale (chiffres significatifs, 8..200)
    #[arg(long)]
    precision: Option<u32>,

    /// Angles en radians (degrés par défaut)
    #[arg(long)]
    radians: bool,

    /// Active le mode exact (factorielle / combinatoire)
    #[arg(long, overrides_with = "no_exact")]
    exact: bool,

    /// Désactive le mode exact ; la dernière des deux options l’emporte
    #[arg(long, overrides_with = "exact")]
    no_exact: bool,

    /// Fichier d’état (dernière réponse + mémoire)
    #[arg(long)]
    etat: Option<PathBuf>,

    /// Journalisation détaillée
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let mut reglages = match &cli.config {
        Some(chemin) => Reglages::charger(chemin)
            .with_context(|| format!("réglages: {}", chemin.display()))?,
        None => Reglages::default(),
    };
    if let Some(p) = cli.precision {
        reglages.precision = p;
    }
    if cli.radians {
        reglages.mode_angle = ModeAngle::Radians;
    }
    if cli.exact {
        reglages.mode_exact = true;
    }
    if cli.no_exact {
        reglages.mode_exact = false;
    }
    debug!(?reglages, "réglages");

    let stockage: Box<dyn Stockage> = match cli.etat {
        Some(chemin) => {
            let fichier = FichierEtat::new(chemin);
            debug!(chemin = %fichier.chemin().display(), "état persistant");
            Box::new(fichier)
        }
        None => Box::new(StockageNul),
    };
    let mut calc = Calculatrice::new(reglages.session(), stockage);

    boucle(&mut calc)
}

fn boucle(calc: &mut Calculatrice) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for ligne in stdin.lock().lines() {
        let ligne = ligne.context("lecture stdin")?;
        let ligne = ligne.trim();
        if ligne.is_empty() {
            continue;
        }

        if let Some(commande) = ligne.strip_prefix(':') {
            if commande == "q" {
                break;
            }
            commander(calc, commande, &mut stdout)?;
        } else {
            calc.saisir(ligne);
            calc.evaluer();
            writeln!(stdout, "{}", calc.affichage())?;
        }
        stdout.flush()?;
    }
    Ok(())
}

fn commander(calc: &mut Calculatrice, commande: &str, out: &mut impl Write) -> Result<()> {
    let mut mots = commande.split_whitespace();
    let tete = mots.next().unwrap_or_default();
    let arg = mots.next();

    match (tete, arg) {
        ("f", Some(nom)) => match Fonction::depuis_nom(nom) {
            Some(f) => {
                calc.fonction(f);
                writeln!(out, "{}", ligne_etat(calc))?;
            }
            None => writeln!(out, "fonction inconnue: {nom}")?,
        },
        ("!", None) | ("%", None) => {
            let p = if tete == "!" {
                Postfixe::Factorielle
            } else {
                Postfixe::Pourcent
            };
            calc.postfixe(p);
            writeln!(out, "{}", ligne_etat(calc))?;
        }
        ("deg", None) => calc.set_mode_angle(ModeAngle::Degres),
        ("rad", None) => calc.set_mode_angle(ModeAngle::Radians),
        ("exact", Some("on")) => calc.set_mode_exact(true),
        ("exact", Some("off")) => calc.set_mode_exact(false),
        ("prec", Some(n)) => match n.parse::<u32>() {
            Ok(n) => writeln!(out, "précision = {}", calc.set_precision(n))?,
            Err(_) => writeln!(out, "précision invalide: {n}")?,
        },
        ("m+", None) | ("m-", None) => {
            let r = if tete == "m+" {
                calc.memoire_ajouter()
            } else {
                calc.memoire_soustraire()
            };
            if let Err(e) = r {
                error!(erreur = %e, "mémoire");
                writeln!(out, "{}", e.categorie().message())?;
            }
        }
        ("mr", None) => {
            calc.memoire_rappel();
            writeln!(out, "{}", calc.tampon())?;
        }
        ("mc", None) => calc.memoire_effacer(),
        ("c", None) => calc.effacer(),
        ("del", None) => {
            calc.supprimer();
            writeln!(out, "{}", calc.tampon())?;
        }
        ("hist", None) => {
            for h in calc.historique() {
                writeln!(out, "{} = {}", h.expression, h.affichage)?;
            }
        }
        _ => writeln!(out, "{AIDE}")?,
    }
    Ok(())
}

/// Résultat si évalué, sinon le tampon en cours.
fn ligne_etat(calc: &Calculatrice) -> &str {
    match calc.mode() {
        Mode::Evalue => calc.affichage(),
        Mode::Edition if calc.erreur().is_some() => calc.affichage(),
        Mode::Edition => calc.tampon(),
    }
}
