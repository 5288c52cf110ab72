//! Built-in tool definitions present on first run.
//!
//! Inserted by id with insert-if-absent semantics, so re-seeding never
//! duplicates a record or overwrites administrator edits. Secrets ship
//! empty; operators fill them in.

use std::collections::BTreeMap;

use crate::tools::{
    Authentication, FieldMapping, FieldType, ParamDef, ParamType, ResponseMapping,
    ToolDefinition, ToolKind,
};

pub const DISPENSAS_API_ID: &str = "afya_dispensas_api";
pub const MATRIZ_CURRICULAR_ID: &str = "matriz_curricular_db";
pub const TOTVS_WEBHOOK_ID: &str = "totvs_integration";

fn json_headers(accept: bool) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    if accept {
        headers.insert("Accept".to_string(), "application/json".to_string());
    }
    headers
}

/// The three default tools, in creation order.
pub fn default_tools() -> Vec<ToolDefinition> {
    vec![dispensas_api(), matriz_curricular(), totvs_webhook()]
}

/// Historical equivalence lookups.
fn dispensas_api() -> ToolDefinition {
    let mut tool = ToolDefinition::new(
        DISPENSAS_API_ID,
        "API de Dispensas AFYA",
        "Consulta histórico de dispensas e equivalências acadêmicas aprovadas",
        ToolKind::Api,
        "https://api.afya.edu.br/v1/dispensas",
    );
    tool.method = "GET".to_string();
    tool.authentication = Authentication::Bearer {
        token: String::new(),
    };
    tool.headers = json_headers(true);
    tool.parameters = vec![
        ParamDef::new(
            "curso_origem",
            ParamType::String,
            false,
            "Filtrar por curso de origem",
        ),
        ParamDef::new(
            "disciplina",
            ParamType::String,
            false,
            "Nome da disciplina para buscar equivalências",
        ),
        ParamDef::new(
            "instituicao",
            ParamType::String,
            false,
            "Instituição de origem do estudante",
        ),
    ];
    tool.response_mapping = ResponseMapping {
        data_path: "data.dispensas".to_string(),
        fields: vec![
            FieldMapping::new("disciplina_origem", "disciplina_origem", FieldType::String),
            FieldMapping::new("disciplina_destino", "disciplina_destino", FieldType::String),
            FieldMapping::new("percentual_equivalencia", "equivalencia", FieldType::Number),
            FieldMapping::new("observacoes", "observacoes", FieldType::String),
        ],
    };
    tool
}

/// Curriculum matrix lookups.
fn matriz_curricular() -> ToolDefinition {
    let mut tool = ToolDefinition::new(
        MATRIZ_CURRICULAR_ID,
        "Base de Matriz Curricular AFYA",
        "Consulta matrizes curriculares atualizadas dos cursos AFYA",
        ToolKind::Database,
        "https://db.afya.edu.br/api/matriz-curricular",
    );
    tool.method = "POST".to_string();
    tool.authentication = Authentication::ApiKey {
        key: String::new(),
        header_name: Some("X-API-Key".to_string()),
    };
    tool.headers = json_headers(false);
    tool.parameters = vec![
        ParamDef::new(
            "curso_id",
            ParamType::String,
            true,
            "ID do curso para consultar matriz",
        ),
        ParamDef::new(
            "ano_letivo",
            ParamType::String,
            false,
            "Ano letivo da matriz (padrão: atual)",
        ),
    ];
    tool.response_mapping = ResponseMapping {
        data_path: "matriz.disciplinas".to_string(),
        fields: vec![
            FieldMapping::new("codigo", "codigo_disciplina", FieldType::String),
            FieldMapping::new("nome", "nome_disciplina", FieldType::String),
            FieldMapping::new("carga_horaria", "carga_horaria", FieldType::Number),
            FieldMapping::new("creditos", "creditos", FieldType::Number),
            FieldMapping::new("periodo", "periodo", FieldType::Number),
        ],
    };
    tool
}

/// Downstream system sync. Ships inactive.
fn totvs_webhook() -> ToolDefinition {
    let mut tool = ToolDefinition::new(
        TOTVS_WEBHOOK_ID,
        "Integração TOTVS Educacional",
        "Webhook para sincronização com sistema TOTVS",
        ToolKind::Webhook,
        "https://totvs.afya.edu.br/webhook/aproveitamento",
    );
    tool.method = "POST".to_string();
    tool.authentication = Authentication::Basic {
        username: String::new(),
        password: String::new(),
    };
    tool.headers = json_headers(false);
    tool.parameters = vec![
        ParamDef::new(
            "estudante_id",
            ParamType::String,
            true,
            "ID do estudante no sistema TOTVS",
        ),
        ParamDef::new(
            "disciplinas_aproveitadas",
            ParamType::Array,
            true,
            "Array de disciplinas aproveitadas",
        ),
    ];
    tool.response_mapping = ResponseMapping {
        data_path: "result".to_string(),
        fields: vec![
            FieldMapping::new("status", "status_sincronizacao", FieldType::String),
            FieldMapping::new("message", "mensagem", FieldType::String),
            FieldMapping::new("id_processo", "id_processo", FieldType::String),
        ],
    };
    tool.is_active = false;
    tool
}
