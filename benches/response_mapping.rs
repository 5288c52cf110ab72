//! Response mapping benchmark.
//!
//! Measures map-and-render latency over response bodies of growing size
//! using Criterion. Truncation caps the rendered list, so the interesting
//! cost is path traversal and coercion.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Value};
use toolgate::tools::{FieldMapping, FieldType, ResponseMapper, ResponseMapping, ToolDefinition, ToolKind};

fn tool() -> ToolDefinition {
    let mut tool = ToolDefinition::new(
        "bench",
        "Base de Matriz Curricular",
        "Consulta matrizes",
        ToolKind::Database,
        "http://localhost",
    );
    tool.response_mapping = ResponseMapping {
        data_path: "matriz.disciplinas".to_string(),
        fields: vec![
            FieldMapping::new("codigo", "codigo_disciplina", FieldType::String),
            FieldMapping::new("nome", "nome_disciplina", FieldType::String),
            FieldMapping::new("carga_horaria", "carga_horaria", FieldType::Number),
            FieldMapping::new("creditos", "creditos", FieldType::Number),
            FieldMapping::new("obrigatoria", "obrigatoria", FieldType::Boolean),
        ],
    };
    tool
}

fn body(items: usize) -> Value {
    let disciplinas: Vec<Value> = (0..items)
        .map(|i| {
            json!({
                "codigo": format!("MED{:03}", i),
                "nome": format!("Disciplina {}", i),
                "carga_horaria": "80",
                "creditos": "4.5",
                "obrigatoria": i % 2,
                "ementa": "x".repeat(256),
            })
        })
        .collect();
    json!({"matriz": {"disciplinas": disciplinas}})
}

fn bench_render(c: &mut Criterion) {
    let tool = tool();
    let mapper = ResponseMapper::default();

    let mut group = c.benchmark_group("render");
    for &items in &[1usize, 10, 100, 1000] {
        let raw = body(items);
        group.bench_with_input(BenchmarkId::from_parameter(items), &raw, |b, r| {
            b.iter(|| mapper.render(&tool, black_box(r)));
        });
    }
    group.finish();
}

fn bench_fallback(c: &mut Criterion) {
    let tool = tool();
    let mapper = ResponseMapper::default();
    let raw = json!({"matriz": {"disciplinas": "indisponível"}});

    c.bench_function("render_fallback", |b| {
        b.iter(|| mapper.render(&tool, black_box(&raw)));
    });
}

criterion_group!(benches, bench_render, bench_fallback);
criterion_main!(benches);
