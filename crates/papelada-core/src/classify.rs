use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::contract::DocumentType;

/// A scoring signal for one document type: either a literal vocabulary term
/// or a regex over the lowercased text. Strong markers (registry numbers,
/// document titles) weigh more than supporting vocabulary.
#[derive(Debug, Clone)]
enum Marker {
    Term { term: &'static str, weight: u32 },
    Pattern { regex: Regex, weight: u32 },
}

impl Marker {
    fn score(&self, lowered: &str) -> u32 {
        match self {
            Self::Term { term, weight } => {
                if lowered.contains(term) {
                    *weight
                } else {
                    0
                }
            }
            Self::Pattern { regex, weight } => {
                if regex.is_match(lowered) {
                    *weight
                } else {
                    0
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
struct TypeProfile {
    doc_type: DocumentType,
    markers: Vec<Marker>,
}

impl TypeProfile {
    fn score(&self, lowered: &str) -> u32 {
        self.markers.iter().map(|m| m.score(lowered)).sum()
    }

    /// Fewer markers means a narrower, more specific profile.
    fn specificity(&self) -> usize {
        self.markers.len()
    }
}

/// How a document type was decided, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub doc_type: DocumentType,
    pub score: u32,
    pub hinted: bool,
}

/// Assigns a document type from extracted text, honoring a valid
/// caller-supplied hint without further inference. UNKNOWN is a valid
/// terminal classification, not an error.
pub struct DocumentClassifier {
    profiles: Vec<TypeProfile>,
    min_score: u32,
}

impl DocumentClassifier {
    #[must_use]
    pub fn new(min_score: u32) -> Self {
        Self {
            profiles: default_profiles(),
            min_score,
        }
    }

    pub fn classify(&self, text: &str, hint: Option<&str>) -> Classification {
        if let Some(doc_type) = hint.and_then(DocumentType::from_hint) {
            tracing::debug!(%doc_type, "classification hint honored");
            return Classification {
                doc_type,
                score: 0,
                hinted: true,
            };
        }

        let lowered = text.to_lowercase();
        let mut best: Option<(&TypeProfile, u32)> = None;

        for profile in &self.profiles {
            let score = profile.score(&lowered);
            if score == 0 {
                continue;
            }
            best = match best {
                None => Some((profile, score)),
                Some((current, current_score)) => {
                    // Ties favor the more specific (narrower) profile.
                    if score > current_score
                        || (score == current_score
                            && profile.specificity() < current.specificity())
                    {
                        Some((profile, score))
                    } else {
                        Some((current, current_score))
                    }
                }
            };
        }

        match best {
            Some((profile, score)) if score >= self.min_score => {
                tracing::debug!(doc_type = %profile.doc_type, score, "classified by keywords");
                Classification {
                    doc_type: profile.doc_type,
                    score,
                    hinted: false,
                }
            }
            _ => Classification {
                doc_type: DocumentType::Unknown,
                score: best.map_or(0, |(_, s)| s),
                hinted: false,
            },
        }
    }
}

fn term(term: &'static str, weight: u32) -> Marker {
    Marker::Term { term, weight }
}

fn pattern(source: &str, weight: u32) -> Option<Marker> {
    Regex::new(source).ok().map(|regex| Marker::Pattern { regex, weight })
}

fn default_profiles() -> Vec<TypeProfile> {
    let mut profiles = vec![
        TypeProfile {
            doc_type: DocumentType::Antt,
            markers: vec![
                term("rntrc", 2),
                term("antt", 2),
                term("transportador", 1),
                term("registro nacional de transportadores", 2),
            ],
        },
        TypeProfile {
            doc_type: DocumentType::Vehicle,
            markers: vec![
                term("crlv", 2),
                term("renavam", 2),
                term("certificado de registro de veículo", 2),
                term("certificado de registro de veiculo", 2),
                term("chassi", 1),
                term("licenciamento", 1),
            ],
        },
        TypeProfile {
            doc_type: DocumentType::Cnh,
            markers: vec![
                term("carteira nacional de habilitação", 2),
                term("carteira nacional de habilitacao", 2),
                term("habilitação", 1),
                term("habilitacao", 1),
                term("categoria", 1),
                term("detran", 1),
                term("condutor", 1),
            ],
        },
        TypeProfile {
            doc_type: DocumentType::Cnpj,
            markers: vec![
                term("cnpj", 1),
                term("sociedade", 1),
                term("razão social", 1),
                term("razao social", 1),
                term("nome fantasia", 1),
                term("natureza jurídica", 1),
                term("natureza juridica", 1),
                term("comprovante de inscrição", 2),
                term("comprovante de inscricao", 2),
            ],
        },
        TypeProfile {
            doc_type: DocumentType::Residence,
            markers: vec![
                term("conta de energia", 2),
                term("energia elétrica", 2),
                term("energia eletrica", 2),
                term("kwh", 1),
                term("fatura", 1),
                term("consumo", 1),
                term("distribuidora", 1),
                term("leitura anterior", 1),
            ],
        },
    ];

    // Formatted registry numbers are strong supporting evidence.
    if let Some(marker) = pattern(r"\d{2}\.\d{3}\.\d{3}/\d{4}-\d{2}", 1) {
        if let Some(cnpj) = profiles
            .iter_mut()
            .find(|p| p.doc_type == DocumentType::Cnpj)
        {
            cnpj.markers.push(marker);
        }
    }
    if let Some(marker) = pattern(r"\b[a-z]{3}-?\d[a-z0-9]\d{2}\b", 1) {
        if let Some(vehicle) = profiles
            .iter_mut()
            .find(|p| p.doc_type == DocumentType::Vehicle)
        {
            vehicle.markers.push(marker);
        }
    }

    profiles
}
