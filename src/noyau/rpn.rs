// src/noyau/rpn.rs
//
// Shunting-yard -> RPN
// Objectif:
// - Convertir une suite de Tok en RPN (postfix), arité des fonctions comprise
//
// Précédences (plus haut = plus lié) :
//   postfixe (! %) = 6, négation = 5, puissance = 4 (droite), * / = 3, + - = 2
//
// NOTE:
// - la négation passe AVANT la puissance : "-3^2" => (-3)^2 = 9 (choix assumé)
// - la pile contient des cadres typés : opérateur, fonction en attente, groupe "("

use super::erreurs::ParseError;
use super::fonctions::Fonction;
use super::jetons::{Constante, Operateur, Postfixe, Tok};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElementRpn {
    Nombre(String),
    Constante(Constante),
    Op(Operateur),
    Postfixe(Postfixe),
    Fonction { fonction: Fonction, arite: usize },
}

/// Cadres de la pile d’opérateurs.
#[derive(Clone, Debug)]
enum Cadre {
    Op(Operateur),
    Postfixe(Postfixe),
    FonctionEnAttente(Fonction),
    Groupe { virgules: usize, a_contenu: bool },
}

fn precedence(c: &Cadre) -> u8 {
    match c {
        Cadre::Postfixe(_) => 6,
        Cadre::Op(Operateur::Negation) => 5,
        Cadre::Op(Operateur::Puissance) => 4,
        Cadre::Op(Operateur::Fois | Operateur::Divise) => 3,
        Cadre::Op(Operateur::Plus | Operateur::Moins) => 2,
        Cadre::FonctionEnAttente(_) | Cadre::Groupe { .. } => 0,
    }
}

fn is_right_associative(c: &Cadre) -> bool {
    matches!(c, Cadre::Op(Operateur::Puissance | Operateur::Negation))
}

fn sortie_de(c: Cadre) -> Option<ElementRpn> {
    match c {
        Cadre::Op(op) => Some(ElementRpn::Op(op)),
        Cadre::Postfixe(p) => Some(ElementRpn::Postfixe(p)),
        Cadre::FonctionEnAttente(_) | Cadre::Groupe { .. } => None,
    }
}

/// Marque le groupe "(" le plus proche comme non vide.
fn marquer_contenu(ops: &mut [Cadre]) {
    let groupe = ops
        .iter_mut()
        .rev()
        .find(|c| matches!(c, Cadre::Groupe { .. }));
    if let Some(Cadre::Groupe { a_contenu, .. }) = groupe {
        *a_contenu = true;
    }
}

/// Dépile les opérateurs qui lient plus fort que `entrant`
/// (arrêt sur un groupe ou une fonction en attente).
fn depiler_pour(entrant: &Cadre, ops: &mut Vec<Cadre>, out: &mut Vec<ElementRpn>) {
    while let Some(top) = ops.last() {
        if matches!(top, Cadre::Groupe { .. } | Cadre::FonctionEnAttente(_)) {
            break;
        }

        let p_top = precedence(top);
        let p_tok = precedence(entrant);
        let doit_pop = if is_right_associative(entrant) {
            p_top > p_tok
        } else {
            p_top >= p_tok
        };
        if !doit_pop {
            break;
        }

        if let Some(e) = ops.pop().and_then(sortie_de) {
            out.push(e);
        }
    }
}

/// Dépile jusqu’au groupe le plus proche (sans le retirer).
/// Retourne false si aucun groupe n’est trouvé ; une fonction restée sans "(" est une erreur.
fn depiler_jusqu_au_groupe(
    ops: &mut Vec<Cadre>,
    out: &mut Vec<ElementRpn>,
) -> Result<bool, ParseError> {
    while let Some(top) = ops.pop() {
        match top {
            groupe @ Cadre::Groupe { .. } => {
                ops.push(groupe);
                return Ok(true);
            }
            Cadre::FonctionEnAttente(f) => {
                return Err(ParseError::DanglingFunction(f.nom().to_string()));
            }
            autre => {
                if let Some(e) = sortie_de(autre) {
                    out.push(e);
                }
            }
        }
    }
    Ok(false)
}

/// Un opérande ne peut pas suivre directement un autre opérande ("1 2", "2(3)", "2sin(1)").
fn exiger_position_operande(attend_operande: bool) -> Result<(), ParseError> {
    if attend_operande {
        Ok(())
    } else {
        Err(ParseError::InvalidExpression)
    }
}

/// Convertit une suite de jetons en RPN (notation polonaise inversée).
///
/// Exemple:
///   tokens: [Fonction("root"), (, 8, ",", 3, )]
///   rpn:    [8, 3, root/2]
pub fn to_rpn(tokens: &[Tok]) -> Result<Vec<ElementRpn>, ParseError> {
    let mut out: Vec<ElementRpn> = Vec::new();
    let mut ops: Vec<Cadre> = Vec::new();

    // true tant qu’on attend un opérande (début, après opérateur, "(" ou ",")
    let mut attend_operande = true;

    for tok in tokens {
        match tok {
            Tok::Nombre(s) => {
                exiger_position_operande(attend_operande)?;
                marquer_contenu(&mut ops);
                out.push(ElementRpn::Nombre(s.clone()));
                attend_operande = false;
            }

            Tok::Constante(c) => {
                exiger_position_operande(attend_operande)?;
                marquer_contenu(&mut ops);
                out.push(ElementRpn::Constante(*c));
                attend_operande = false;
            }

            Tok::Fonction(nom) => {
                exiger_position_operande(attend_operande)?;
                let f = Fonction::depuis_nom(nom)
                    .ok_or_else(|| ParseError::UnknownFunction(nom.clone()))?;
                marquer_contenu(&mut ops);
                ops.push(Cadre::FonctionEnAttente(f));
            }

            Tok::ParOuvrante => {
                exiger_position_operande(attend_operande)?;
                marquer_contenu(&mut ops);
                ops.push(Cadre::Groupe {
                    virgules: 0,
                    a_contenu: false,
                });
            }

            Tok::Virgule => {
                if !depiler_jusqu_au_groupe(&mut ops, &mut out)? {
                    return Err(ParseError::MisplacedComma);
                }
                if let Some(Cadre::Groupe { virgules, .. }) = ops.last_mut() {
                    *virgules += 1;
                }
                attend_operande = true;
            }

            Tok::ParFermante => {
                if !depiler_jusqu_au_groupe(&mut ops, &mut out)? {
                    return Err(ParseError::MismatchedParen);
                }
                attend_operande = false;
                let arite = match ops.pop() {
                    Some(Cadre::Groupe {
                        virgules,
                        a_contenu,
                    }) => {
                        if a_contenu {
                            virgules + 1
                        } else {
                            0
                        }
                    }
                    _ => return Err(ParseError::MismatchedParen),
                };

                // fonction juste sous le groupe : elle sort avec son arité
                if let Some(Cadre::FonctionEnAttente(f)) = ops.last() {
                    let fonction = *f;
                    ops.pop();
                    out.push(ElementRpn::Fonction { fonction, arite });
                }
            }

            Tok::Op(Operateur::Negation) => {
                // préfixe : rien à gauche à dépiler
                marquer_contenu(&mut ops);
                ops.push(Cadre::Op(Operateur::Negation));
            }

            Tok::Op(op) => {
                marquer_contenu(&mut ops);
                let cadre = Cadre::Op(*op);
                depiler_pour(&cadre, &mut ops, &mut out);
                ops.push(cadre);
                attend_operande = true;
            }

            Tok::Postfixe(p) => {
                marquer_contenu(&mut ops);
                let cadre = Cadre::Postfixe(*p);
                depiler_pour(&cadre, &mut ops, &mut out);
                ops.push(cadre);
            }
        }
    }

    // vide la pile ops
    while let Some(cadre) = ops.pop() {
        match cadre {
            Cadre::Groupe { .. } => return Err(ParseError::MismatchedParen),
            Cadre::FonctionEnAttente(f) => {
                return Err(ParseError::DanglingFunction(f.nom().to_string()))
            }
            autre => {
                if let Some(e) = sortie_de(autre) {
                    out.push(e);
                }
            }
        }
    }

    Ok(out)
}

/// Format utilitaire (debug/diagnostic) : RPN en texte.
pub fn format_rpn(rpn: &[ElementRpn]) -> String {
    rpn.iter()
        .map(|e| match e {
            ElementRpn::Nombre(s) => s.clone(),
            ElementRpn::Constante(c) => c.nom().to_string(),
            ElementRpn::Op(op) => op.symbole().to_string(),
            ElementRpn::Postfixe(p) => p.symbole().to_string(),
            ElementRpn::Fonction { fonction, arite } => format!("{}/{arite}", fonction.nom()),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
