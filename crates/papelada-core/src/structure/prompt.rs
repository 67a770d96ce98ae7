use crate::contract::DocumentType;

/// System message framing every structuring call.
pub const SYSTEM_PROMPT: &str = "Você é um especialista em extração de dados de documentos \
     brasileiros. Analise o texto fornecido e extraia as informações solicitadas em formato \
     JSON válido.";

/// Rules repeated in every prompt so the model returns bare, parseable JSON.
const CRITICAL_RULES: &str = "\
REGRAS CRÍTICAS:
1. Sua resposta deve conter APENAS o objeto JSON válido
2. NÃO inclua NENHUM texto antes ou depois do JSON
3. NÃO use formatação markdown como ```json
4. O JSON deve ser 100% válido, sem vírgulas finais
5. Use aspas duplas para todas as chaves e valores string
6. Se não encontrar uma informação, use null para o campo
7. Mantenha a estrutura exata do schema fornecido";

/// Renders the instruction set for one document type around the extracted
/// text. Each type owns its schema; the structure must match its field
/// contract exactly.
pub fn prompt_for(doc_type: DocumentType, text: &str) -> String {
    match doc_type {
        DocumentType::Antt => antt_prompt(text),
        DocumentType::Cnh => cnh_prompt(text),
        DocumentType::Cnpj => cnpj_prompt(text),
        DocumentType::Vehicle => vehicle_prompt(text),
        DocumentType::Residence => residence_prompt(text),
        DocumentType::Unknown => generic_prompt(text),
    }
}

fn antt_prompt(text: &str) -> String {
    format!(
        r#"Analise o texto extraído de um Extrato ou Certificado ANTT.
O texto pode estar desformatado devido ao OCR, com linhas de tabelas misturadas.

{CRITICAL_RULES}

Instruções de Extração:
1. CABEÇALHO: Procure por pares Chave/Valor.
   Ex: "RNTRC:" seguido de números. "RAZÃO SOCIAL:" seguido do nome. "CNPJ:" seguido do número.
2. VEÍCULOS: Procure por padrões de PLACA (AAA-0000 ou AAA0A00) e RENAVAM (aprox 9-11 dígitos).
   Um bloco de veículo geralmente contém placa, renavam, tipo (Automotor, Implemento),
   categoria/descrição e situação. Identifique e liste TODOS os veículos encontrados.
3. ENDEREÇO: Procure por Logradouro, Bairro, CEP (xxxxx-xxx) e Cidade/UF.

SCHEMA DO JSON DE RESPOSTA:
{{
  "tipo_documento": "CERTIFICADO_ANTT | EXTRATO_ANTT",
  "transportador": {{
    "rntrc": "string - RNTRC encontrado",
    "razao_social_nome": "string - Nome ou Razão Social",
    "cpf_cnpj": "string - CPF ou CNPJ (apenas números)",
    "situacao_rntrc": "string - Situação do RNTRC (Ativo/Suspenso)",
    "categoria": "string - Categoria (ETC, TAC, CTC)",
    "data_cadastro": "string - Data de cadastro",
    "data_validade": "string - Data de validade se houver",
    "data_emissao": "string - Data de emissão do documento"
  }},
  "endereco": {{
    "logradouro": "string",
    "numero": "string",
    "complemento": "string",
    "bairro": "string",
    "cidade": "string",
    "uf": "string",
    "cep": "string"
  }},
  "resumo_frota": {{
    "total_veiculos": "integer - Total de veículos",
    "veiculos_ativos": "integer - Total ativos",
    "veiculos_automotores": "integer - Qtd automotores",
    "veiculos_implementos": "integer - Qtd implementos"
  }},
  "responsavel_tecnico": {{
    "nome": "string",
    "cpf": "string"
  }},
  "veiculos": [
    {{
      "placa": "string - Placa do veículo",
      "renavam": "string - Renavam",
      "tipo": "string - Tipo (Automotor/Implemento)",
      "tipo_carroceria": "string - Descrição/Carroceria",
      "situacao": "string - Situação (Ativo/Outro)",
      "propriedade": "string - Propriedade (Arrendado/Próprio/Leasing)"
    }}
  ]
}}

TEXTO DO DOCUMENTO:
{text}

Retorne apenas o JSON estruturado:"#
    )
}

fn cnh_prompt(text: &str) -> String {
    format!(
        r#"Você é um especialista em extração de dados de Carteira Nacional de Habilitação (CNH) brasileira.

TAREFA: Extrair informações estruturadas do texto de uma CNH.

{CRITICAL_RULES}

SCHEMA DO JSON DE RESPOSTA:
{{
  "nome": "string - Nome completo do portador",
  "cpf": "string - CPF formatado (xxx.xxx.xxx-xx)",
  "rg": "string - Número do RG/Registro",
  "data_nascimento": "string - Data no formato DD/MM/AAAA",
  "data_emissao": "string - Data de emissão DD/MM/AAAA",
  "data_vencimento": "string - Data de validade DD/MM/AAAA",
  "categoria": "string - Categoria(s) habilitada(s)",
  "numero_registro": "string - Número do registro/CNH",
  "local_emissao": "string - Local onde foi emitida",
  "endereco": {{
    "logradouro": "string - Rua/Avenida com número",
    "bairro": "string - Bairro",
    "cidade": "string - Cidade",
    "estado": "string - Estado (sigla)",
    "cep": "string - CEP"
  }},
  "filiacao": {{
    "pai": "string - Nome do pai",
    "mae": "string - Nome da mãe"
  }},
  "orgao_emissor": "string - Órgão emissor (ex: DETRAN)",
  "observacoes": "string - Observações ou restrições se houver",
  "nacionalidade": "string - Nacionalidade do portador",
  "primeira_habilitacao": "string - Data da primeira habilitação"
}}

TEXTO DA CNH:
{text}

Retorne apenas o JSON estruturado:"#
    )
}

fn cnpj_prompt(text: &str) -> String {
    format!(
        r#"Você é um especialista em extração de dados de documentos de CNPJ (Cadastro Nacional da Pessoa Jurídica) brasileiros.

TAREFA: Extrair informações estruturadas do texto de um documento de CNPJ.

{CRITICAL_RULES}

SCHEMA DO JSON DE RESPOSTA:
{{
  "cnpj": "string - CNPJ formatado (xx.xxx.xxx/xxxx-xx)",
  "razao_social": "string - Razão social da empresa",
  "nome_fantasia": "string - Nome fantasia",
  "natureza_juridica": "string - Natureza jurídica",
  "atividade_principal": "string - Atividade econômica principal",
  "data_abertura": "string - Data de abertura DD/MM/AAAA",
  "situacao_cadastral": "string - Situação (Ativa, Baixada, etc)",
  "data_situacao": "string - Data da situação atual",
  "endereco": {{
    "logradouro": "string - Logradouro com número",
    "complemento": "string - Complemento",
    "bairro": "string - Bairro",
    "cidade": "string - Município",
    "estado": "string - Estado (sigla)",
    "cep": "string - CEP"
  }},
  "capital_social": "string - Capital social",
  "porte": "string - Porte da empresa",
  "responsavel_federativo": "string - Ente federativo responsável",
  "socios": [
    {{
      "nome": "string - Nome do sócio",
      "cpf_cnpj": "string - CPF ou CNPJ do sócio",
      "qualificacao": "string - Qualificação do sócio"
    }}
  ],
  "telefone": "string - Telefone se presente",
  "email": "string - Email se presente",
  "site": "string - Website se presente"
}}

TEXTO DO DOCUMENTO CNPJ:
{text}

Retorne apenas o JSON estruturado:"#
    )
}

fn vehicle_prompt(text: &str) -> String {
    format!(
        r#"Analise o texto extraído de um documento veicular (CRV, CRLV ou Ficha Cadastral de Veículo).

{CRITICAL_RULES}

Instruções:
1. Identifique os dados principais do veículo e do proprietário.
2. Normalize datas para AAAA-MM-DD.
3. Extraia informações técnicas detalhadas se disponíveis.

SCHEMA DO JSON DE RESPOSTA:
{{
  "dados_veiculo": {{
    "placa": "string",
    "placa_anterior": "string",
    "chassi": "string",
    "renavam": "string",
    "marca_modelo": "string",
    "ano_fabricacao": "integer",
    "ano_modelo": "integer",
    "cor": "string",
    "combustivel": "string",
    "categoria": "string",
    "especie": "string",
    "tipo": "string",
    "potencia": "string",
    "cilindrada": "string",
    "motor": "string",
    "lotacao": "string",
    "peso_bruto_total": "string"
  }},
  "situacao": {{
    "exercicio": "string - ANO",
    "restricoes": ["alienacao", "restricao_judicial", "roubo_furto"],
    "observacoes": "string"
  }},
  "proprietario": {{
    "nome": "string",
    "cpf_cnpj": "string",
    "endereco": "string",
    "cidade": "string",
    "uf": "string"
  }}
}}

TEXTO DO DOCUMENTO:
{text}

Retorne apenas o JSON estruturado:"#
    )
}

fn residence_prompt(text: &str) -> String {
    format!(
        r#"Analise o texto extraído de um comprovante de residência (Conta de consumo: Energia, Água, Gás, Internet, etc.).

{CRITICAL_RULES}

Instruções:
1. Identifique a concessionária/empresa emissora.
2. Identifique o titular e o endereço COMPLETO.
3. Normalize datas para AAAA-MM-DD e valores numéricos (float, separado por ponto).

SCHEMA DO JSON DE RESPOSTA:
{{
  "tipo_conta": "ENERGIA | AGUA | TELECOM | GAS | OUTROS",
  "emissor": {{
    "nome_empresa": "string - Nome da Concessionária",
    "cnpj": "string - CNPJ da Concessionária"
  }},
  "fatura": {{
    "mes_referencia": "string - MM/AAAA",
    "vencimento": "string - AAAA-MM-DD",
    "valor_total": "number",
    "numero_instalacao": "string",
    "codigo_cliente": "string",
    "codigo_barras": "string"
  }},
  "titular": {{
    "nome": "string",
    "cpf_cnpj": "string"
  }},
  "endereco_instalacao": {{
    "logradouro": "string",
    "numero": "string",
    "complemento": "string",
    "bairro": "string",
    "cidade": "string",
    "uf": "string"
  }},
  "leituras": {{
    "leitura_atual": "string",
    "leitura_anterior": "string",
    "consumo": "string"
  }}
}}

TEXTO DO DOCUMENTO:
{text}

Retorne apenas o JSON estruturado:"#
    )
}

fn generic_prompt(text: &str) -> String {
    format!(
        r#"Você é um especialista em extração de dados de documentos brasileiros.

TAREFA: Extrair informações estruturadas do texto de um documento de tipo desconhecido.

{CRITICAL_RULES}

SCHEMA DO JSON DE RESPOSTA:
{{
  "tipo_documento": "string - Tipo detectado do documento",
  "nome": "string - Nome da pessoa se identificado",
  "cpf_cnpj": "string - CPF ou CNPJ se presente",
  "documento_numero": "string - Número do documento",
  "data_emissao": "string - Data de emissão se presente",
  "endereco": "string - Endereço se presente",
  "dados_principais": {{
    "campo1": "valor1",
    "campo2": "valor2"
  }},
  "informacoes_adicionais": "string - Outras informações relevantes"
}}

TEXTO DO DOCUMENTO:
{text}

Retorne apenas o JSON estruturado:"#
    )
}
