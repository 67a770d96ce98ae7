use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Closed set of document types the pipeline understands. Serialized with
/// the wire names the upload boundary exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentType {
    #[serde(rename = "CERTIFICADO_ANTT")]
    Antt,
    #[serde(rename = "CNH")]
    Cnh,
    #[serde(rename = "CNPJ")]
    Cnpj,
    #[serde(rename = "CRLV")]
    Vehicle,
    #[serde(rename = "CONTA_ENERGIA")]
    Residence,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl DocumentType {
    pub const ALL: [Self; 6] = [
        Self::Antt,
        Self::Cnh,
        Self::Cnpj,
        Self::Vehicle,
        Self::Residence,
        Self::Unknown,
    ];

    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Antt => "CERTIFICADO_ANTT",
            Self::Cnh => "CNH",
            Self::Cnpj => "CNPJ",
            Self::Vehicle => "CRLV",
            Self::Residence => "CONTA_ENERGIA",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Parses a caller-supplied type hint. Accepts the wire names plus the
    /// aliases historically accepted at the upload boundary.
    pub fn from_hint(hint: &str) -> Option<Self> {
        match hint.trim().to_uppercase().as_str() {
            "ANTT" | "CERTIFICADO_ANTT" | "EXTRATO_ANTT" => Some(Self::Antt),
            "CNH" => Some(Self::Cnh),
            "CNPJ" => Some(Self::Cnpj),
            "CRLV" | "CRV" | "VEICULO" => Some(Self::Vehicle),
            "CONTA_ENERGIA" | "FATURA_ENERGIA" | "RESIDENCIA" => Some(Self::Residence),
            "UNKNOWN" => Some(Self::Unknown),
            _ => None,
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// One named field in a contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub required: bool,
}

impl FieldSpec {
    fn required(name: &str) -> Self {
        Self {
            name: name.to_string(),
            required: true,
        }
    }

    fn optional(name: &str) -> Self {
        Self {
            name: name.to_string(),
            required: false,
        }
    }
}

/// The ordered field set a structured record must conform to for a given
/// document type. Versioned independently of the pipeline code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldContract {
    pub version: u16,
    pub fields: Vec<FieldSpec>,
}

impl FieldContract {
    #[must_use]
    pub fn new(version: u16, fields: Vec<FieldSpec>) -> Self {
        Self { version, fields }
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn required_names(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
    }

    pub fn required_count(&self) -> usize {
        self.fields.iter().filter(|f| f.required).count()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// Checks that a structured record carries exactly this contract's
    /// field keys: no omissions, no extras.
    pub fn validate_keys(&self, fields: &Map<String, Value>) -> Result<(), ContractViolation> {
        let missing: Vec<String> = self
            .field_names()
            .filter(|name| !fields.contains_key(*name))
            .map(String::from)
            .collect();
        let unexpected: Vec<String> = fields
            .keys()
            .filter(|key| !self.contains(key))
            .cloned()
            .collect();

        if missing.is_empty() && unexpected.is_empty() {
            Ok(())
        } else {
            Err(ContractViolation { missing, unexpected })
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Record does not match contract (missing: {missing:?}, unexpected: {unexpected:?})")]
pub struct ContractViolation {
    pub missing: Vec<String>,
    pub unexpected: Vec<String>,
}

/// Single registry mapping each document type to its contract, so per-type
/// behavior lives in one place instead of branching across components.
#[derive(Debug, Clone)]
pub struct ContractRegistry {
    contracts: HashMap<DocumentType, FieldContract>,
}

impl ContractRegistry {
    #[must_use]
    pub fn new() -> Self {
        let mut contracts = HashMap::new();
        contracts.insert(DocumentType::Antt, antt_contract());
        contracts.insert(DocumentType::Cnh, cnh_contract());
        contracts.insert(DocumentType::Cnpj, cnpj_contract());
        contracts.insert(DocumentType::Vehicle, vehicle_contract());
        contracts.insert(DocumentType::Residence, residence_contract());
        contracts.insert(DocumentType::Unknown, generic_contract());
        Self { contracts }
    }

    /// Replaces the contract for one type, keeping the rest.
    #[must_use]
    pub fn with_contract(mut self, doc_type: DocumentType, contract: FieldContract) -> Self {
        self.contracts.insert(doc_type, contract);
        self
    }

    pub fn contract(&self, doc_type: DocumentType) -> &FieldContract {
        // The registry is total over the closed enum by construction.
        &self.contracts[&doc_type]
    }
}

impl Default for ContractRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn antt_contract() -> FieldContract {
    FieldContract::new(
        1,
        vec![
            FieldSpec::optional("tipo_documento"),
            FieldSpec::required("transportador"),
            FieldSpec::optional("endereco"),
            FieldSpec::optional("resumo_frota"),
            FieldSpec::optional("responsavel_tecnico"),
            FieldSpec::required("veiculos"),
        ],
    )
}

fn cnh_contract() -> FieldContract {
    FieldContract::new(
        1,
        vec![
            FieldSpec::required("nome"),
            FieldSpec::required("cpf"),
            FieldSpec::optional("rg"),
            FieldSpec::optional("data_nascimento"),
            FieldSpec::optional("data_emissao"),
            FieldSpec::optional("data_vencimento"),
            FieldSpec::required("categoria"),
            FieldSpec::optional("numero_registro"),
            FieldSpec::optional("local_emissao"),
            FieldSpec::optional("endereco"),
            FieldSpec::optional("filiacao"),
            FieldSpec::optional("orgao_emissor"),
            FieldSpec::optional("observacoes"),
            FieldSpec::optional("nacionalidade"),
            FieldSpec::optional("primeira_habilitacao"),
        ],
    )
}

fn cnpj_contract() -> FieldContract {
    FieldContract::new(
        1,
        vec![
            FieldSpec::required("cnpj"),
            FieldSpec::required("razao_social"),
            FieldSpec::optional("nome_fantasia"),
            FieldSpec::optional("natureza_juridica"),
            FieldSpec::optional("atividade_principal"),
            FieldSpec::optional("data_abertura"),
            FieldSpec::optional("situacao_cadastral"),
            FieldSpec::optional("data_situacao"),
            FieldSpec::optional("endereco"),
            FieldSpec::optional("capital_social"),
            FieldSpec::optional("porte"),
            FieldSpec::optional("responsavel_federativo"),
            FieldSpec::optional("socios"),
            FieldSpec::optional("telefone"),
            FieldSpec::optional("email"),
            FieldSpec::optional("site"),
        ],
    )
}

fn vehicle_contract() -> FieldContract {
    FieldContract::new(
        1,
        vec![
            FieldSpec::required("dados_veiculo"),
            FieldSpec::optional("situacao"),
            FieldSpec::required("proprietario"),
        ],
    )
}

fn residence_contract() -> FieldContract {
    FieldContract::new(
        1,
        vec![
            FieldSpec::optional("tipo_conta"),
            FieldSpec::optional("emissor"),
            FieldSpec::required("fatura"),
            FieldSpec::required("titular"),
            FieldSpec::required("endereco_instalacao"),
            FieldSpec::optional("leituras"),
        ],
    )
}

fn generic_contract() -> FieldContract {
    FieldContract::new(
        1,
        vec![
            FieldSpec::optional("tipo_documento"),
            FieldSpec::optional("nome"),
            FieldSpec::optional("cpf_cnpj"),
            FieldSpec::optional("documento_numero"),
            FieldSpec::optional("data_emissao"),
            FieldSpec::optional("endereco"),
            FieldSpec::optional("dados_principais"),
            FieldSpec::optional("informacoes_adicionais"),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_registry_covers_every_type() {
        let registry = ContractRegistry::new();
        for doc_type in DocumentType::ALL {
            let contract = registry.contract(doc_type);
            assert!(!contract.fields.is_empty(), "{doc_type} has no fields");
        }
    }

    #[test]
    fn test_cnh_required_fields() {
        let registry = ContractRegistry::new();
        let contract = registry.contract(DocumentType::Cnh);

        let required: Vec<&str> = contract.required_names().collect();
        assert_eq!(required, vec!["nome", "cpf", "categoria"]);
        assert_eq!(contract.required_count(), 3);
    }

    #[test]
    fn test_unknown_has_no_required_fields() {
        let registry = ContractRegistry::new();
        assert_eq!(registry.contract(DocumentType::Unknown).required_count(), 0);
    }

    #[test]
    fn test_wire_names_round_trip() {
        for doc_type in DocumentType::ALL {
            let json = serde_json::to_string(&doc_type).unwrap();
            assert_eq!(json, format!("\"{}\"", doc_type.wire_name()));
            let parsed: DocumentType = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, doc_type);
        }
    }

    #[test]
    fn test_hint_aliases() {
        assert_eq!(DocumentType::from_hint("antt"), Some(DocumentType::Antt));
        assert_eq!(DocumentType::from_hint("VEICULO"), Some(DocumentType::Vehicle));
        assert_eq!(DocumentType::from_hint("crv"), Some(DocumentType::Vehicle));
        assert_eq!(
            DocumentType::from_hint("fatura_energia"),
            Some(DocumentType::Residence)
        );
        assert_eq!(DocumentType::from_hint("generic"), None);
        assert_eq!(DocumentType::from_hint(""), None);
    }

    #[test]
    fn test_validate_keys_exact_match() {
        let registry = ContractRegistry::new();
        let contract = registry.contract(DocumentType::Vehicle);

        let record = as_map(json!({
            "dados_veiculo": {"placa": "MRK1B41"},
            "situacao": null,
            "proprietario": {"nome": "Fulano"},
        }));
        assert!(contract.validate_keys(&record).is_ok());
    }

    #[test]
    fn test_validate_keys_reports_missing_and_unexpected() {
        let registry = ContractRegistry::new();
        let contract = registry.contract(DocumentType::Vehicle);

        let record = as_map(json!({
            "dados_veiculo": {},
            "cor": "prata",
        }));
        let violation = contract.validate_keys(&record).unwrap_err();
        assert!(violation.missing.contains(&"situacao".to_string()));
        assert!(violation.missing.contains(&"proprietario".to_string()));
        assert_eq!(violation.unexpected, vec!["cor".to_string()]);
    }

    #[test]
    fn test_contract_override() {
        let custom = FieldContract::new(2, vec![FieldSpec::required("placa")]);
        let registry = ContractRegistry::new().with_contract(DocumentType::Vehicle, custom);

        let contract = registry.contract(DocumentType::Vehicle);
        assert_eq!(contract.version, 2);
        assert_eq!(contract.fields.len(), 1);
    }
}
