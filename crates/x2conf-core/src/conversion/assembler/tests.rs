use super::*;
use crate::conversion::catalog::{Manifest, MemoryTemplates, TemplateKind, TransformerTable};
use crate::conversion::source::SourceDocument;
use crate::conversion::template::ResolverOptions;
use crate::Error;
use chrono::{TimeZone, Utc};
use serde_json::json;

const ENV: &str = "env {\n  parallelism = {{ datax.job.setting.speed.channel | default(1) }}\n  job.mode = \"BATCH\"\n}\n";
const JDBC: &str = r#"source {
  Jdbc {
    url = "{{ datax.job.content[0].reader.parameter.connection[0].jdbcUrl[0] }}"
    driver = "{{ datax.job.content[0].reader.parameter.connection[0].jdbcUrl[0] | jdbc_driver_mapper }}"
    user = "{{ datax.job.content[0].reader.parameter.username }}"
    password = "{{ datax.job.content[0].reader.parameter.password }}"
  }
}
"#;
const HDFS: &str = r#"sink {
  HdfsFile {
    path = "{{ datax.job.content[0].writer.parameter.path }}"
    file_format_type = "{{ datax.job.content[0].writer.parameter.fileType | default('text') }}"
  }
}
"#;

fn manifest() -> Manifest {
    Manifest::new()
        .with_template(TemplateKind::Env, "batch", "datax/env/batch-env.conf")
        .with_template(TemplateKind::Source, "mysqlreader", "datax/sources/jdbc-source.conf")
        .with_template(TemplateKind::Sink, "hdfswriter", "datax/sinks/hdfs-sink.conf")
        .with_transformer(
            "jdbc_driver_mapper",
            TransformerTable::new()
                .with_entry("mysql", "com.mysql.cj.jdbc.Driver")
                .with_entry("postgresql", "org.postgresql.Driver"),
        )
}

fn templates() -> MemoryTemplates {
    MemoryTemplates::new()
        .with("datax/env/batch-env.conf", ENV)
        .with("datax/sources/jdbc-source.conf", JDBC)
        .with("datax/sinks/hdfs-sink.conf", HDFS)
}

fn document(reader: &str) -> SourceDocument {
    SourceDocument::from_value(json!({
        "job": {
            "setting": {"speed": {"channel": 3}},
            "content": [{
                "reader": {
                    "name": reader,
                    "parameter": {
                        "username": "root",
                        "password": "secret",
                        "column": ["id", "name"],
                        "connection": [{"jdbcUrl": ["jdbc:mysql://localhost:3306/test_db"]}]
                    }
                },
                "writer": {
                    "name": "hdfswriter",
                    "parameter": {"path": "/warehouse/test_ods/ods_user_info/"}
                }
            }]
        }
    }))
    .unwrap()
}

fn fixed_time() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap()
}

#[test]
fn test_assemble_full_configuration() {
    let manifest = manifest();
    let templates = templates();
    let assembly = ConfigAssembler::new(&manifest, &templates)
        .with_timestamp(fixed_time())
        .assemble(&document("mysqlreader"))
        .unwrap();

    let expected_prefix = "# Generated by x2conf template engine\n# Generated at: 2025-03-14T09:26:53Z\n\nenv {\n  parallelism = 3\n";
    assert!(assembly.text.starts_with(expected_prefix));
    assert!(assembly.text.contains("}\n\nsource {"));
    assert!(assembly.text.contains("}\n\nsink {"));
    assert!(assembly.text.ends_with("}\n"));
    assert!(!assembly.text.ends_with("}\n\n"));
    assert!(assembly.text.contains("driver = \"com.mysql.cj.jdbc.Driver\""));
    assert!(assembly.text.contains("file_format_type = \"text\""));
}

#[test]
fn test_assembly_metadata() {
    let manifest = manifest();
    let templates = templates();
    let result = ConfigAssembler::new(&manifest, &templates)
        .assemble(&document("MysqlReader"))
        .unwrap()
        .result;

    assert!(result.success);
    assert_eq!(result.reader_type.as_deref(), Some("MysqlReader"));
    assert_eq!(result.writer_type.as_deref(), Some("hdfswriter"));
    assert_eq!(
        result.source_template.as_deref(),
        Some("datax/sources/jdbc-source.conf")
    );
    assert_eq!(result.env_template.as_deref(), Some("datax/env/batch-env.conf"));
}

#[test]
fn test_unmapped_spans_all_fragments() {
    let manifest = manifest();
    let templates = templates();
    let result = ConfigAssembler::new(&manifest, &templates)
        .assemble(&document("mysqlreader"))
        .unwrap()
        .result;

    let unmapped: Vec<&str> = result
        .unmapped
        .iter()
        .filter_map(|e| e.source_path.as_deref())
        .collect();
    assert_eq!(unmapped, vec!["job.content[0].reader.parameter.column"]);
    assert_eq!(result.unmapped[0].value.as_deref(), Some("id,name"));
    assert_eq!(
        result.unmapped[0].note,
        "Exists in DataX but not referenced in template"
    );
    assert_eq!(result.defaults.len(), 1);
    assert_eq!(result.transform.len(), 1);
}

#[test]
fn test_unsupported_reader_uses_fallback() {
    let manifest = manifest();
    let templates = templates();
    let assembly = ConfigAssembler::new(&manifest, &templates)
        .assemble(&document("mongodbreader"))
        .unwrap();

    assert_eq!(
        assembly.result.source_template.as_deref(),
        Some(TemplateKind::Source.fallback_template())
    );
    let reader = assembly
        .result
        .unmapped
        .iter()
        .find(|e| e.source_path.as_deref() == Some("reader.name"))
        .unwrap();
    assert_eq!(reader.value.as_deref(), Some("mongodbreader"));
    assert_eq!(reader.note, "No template mapping for reader type");
}

#[test]
fn test_malformed_fragment_aborts_before_resolution() {
    let manifest = manifest();
    let templates = templates().with("datax/sinks/hdfs-sink.conf", "sink {\n  HdfsFile {\n");
    let err = ConfigAssembler::new(&manifest, &templates)
        .assemble(&document("mysqlreader"))
        .unwrap_err();

    match err {
        Error::TemplateSyntax { fragment, .. } => {
            assert_eq!(fragment.as_deref(), Some("datax/sinks/hdfs-sink.conf"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_missing_template_file() {
    let manifest = manifest();
    let templates = MemoryTemplates::new().with("datax/env/batch-env.conf", ENV);
    let err = ConfigAssembler::new(&manifest, &templates)
        .assemble(&document("mysqlreader"))
        .unwrap_err();
    assert!(matches!(err, Error::TemplateNotFound { ref path } if path == "datax/sources/jdbc-source.conf"));
}

#[test]
fn test_invalid_json_is_fatal() {
    let manifest = manifest();
    let templates = templates();
    let assembler = ConfigAssembler::new(&manifest, &templates);

    assert!(matches!(
        assembler.assemble_str("{ not json"),
        Err(Error::SourceParse { .. })
    ));
    assert!(matches!(
        assembler.assemble_str(r#"{"job": {"content": []}}"#),
        Err(Error::SourceParse { .. })
    ));
}

#[test]
fn test_assemble_custom_template() {
    let manifest = manifest();
    let templates = MemoryTemplates::new();
    let template = "source {\n  Jdbc {\n    user = \"{{ datax.job.content[0].reader.parameter.username }}\"\n  }\n}";

    let assembly = ConfigAssembler::new(&manifest, &templates)
        .assemble_custom(&document("mysqlreader"), template)
        .unwrap();

    assert_eq!(
        assembly.text,
        "source {\n  Jdbc {\n    user = \"root\"\n  }\n}"
    );
    assert_eq!(assembly.result.direct.len(), 1);
    assert_eq!(assembly.result.unmapped.len(), 5);
    assert_eq!(assembly.result.source_template, None);
}

#[test]
fn test_assemble_custom_rejects_bad_syntax() {
    let manifest = manifest();
    let templates = MemoryTemplates::new();
    let err = ConfigAssembler::new(&manifest, &templates)
        .assemble_custom(&document("mysqlreader"), "a = {{ }}")
        .unwrap_err();
    assert!(matches!(err, Error::TemplateSyntax { fragment: Some(ref f), .. } if f == "custom"));
}

#[test]
fn test_runs_are_independent() {
    let manifest = manifest();
    let templates = templates();
    let assembler = ConfigAssembler::new(&manifest, &templates).with_timestamp(fixed_time());

    let first = assembler.assemble(&document("mysqlreader")).unwrap();
    let second = assembler.assemble(&document("mysqlreader")).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_custom_namespace_option() {
    let manifest = manifest();
    let templates = MemoryTemplates::new();
    let options = ResolverOptions {
        namespace: "job_src".to_string(),
        ..ResolverOptions::default()
    };

    let assembly = ConfigAssembler::new(&manifest, &templates)
        .with_options(options)
        .assemble_custom(&document("mysqlreader"), "ch = {{ job_src.setting.speed.channel }}")
        .unwrap();

    assert_eq!(assembly.text, "ch = 3");
}
