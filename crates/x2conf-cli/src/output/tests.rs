// Tests for output formatting
//
// These tests verify the human and machine renderings of mapping results
// and template analyses, and the writer's quiet/format gating.

use super::*;
use std::sync::{Arc, Mutex};
use x2conf_core::MappingKind;

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn writer(format: OutputFormat, quiet: bool) -> (OutputWriter, SharedBuffer) {
    let buffer = SharedBuffer::default();
    let writer = OutputWriter::with_writer(format, false, quiet, Box::new(buffer.clone()));
    (writer, buffer)
}

fn sample_result() -> MappingResult {
    MappingResult {
        direct: vec![MappingEvent::new(MappingKind::Direct, "Directly extracted")
            .with_source(Some("job.content[0].reader.parameter.username"))
            .with_target(Some("source.Jdbc.user"))
            .with_value(Some("root"))],
        missing: vec![MappingEvent::new(MappingKind::Missing, "Field not found")
            .with_source(Some("job.content[0].writer.parameter.path"))
            .with_target(Some("sink.HdfsFile.path"))],
        unmapped: vec![
            MappingEvent::new(MappingKind::Unmapped, "Not referenced by template")
                .with_source(Some("job.content[0].reader.parameter.password"))
                .with_value(Some("123456")),
            MappingEvent::new(MappingKind::Unmapped, "Not referenced by template")
                .with_source(Some("job.content[0].writer.parameter.writeMode"))
                .with_value(Some("append")),
        ],
        success: true,
        reader_type: Some("mysqlreader".to_string()),
        writer_type: Some("hdfswriter".to_string()),
        source_template: Some("datax/sources/jdbc-source.conf".to_string()),
        ..MappingResult::default()
    }
}

#[test]
fn test_mapping_result_formatting_human() {
    let formatted = OutputFormat::Human
        .format_mapping_result(&sample_result())
        .unwrap();

    assert!(formatted.starts_with("🔧 mysqlreader → hdfswriter\n"));
    assert!(formatted.contains("  Source template: datax/sources/jdbc-source.conf\n"));
    assert!(formatted.contains("  Direct:       1 (25.0%)\n"));
    assert!(formatted.contains("  Unmapped:     2 (50.0%)\n"));
    assert!(formatted.contains("  Total:        4\n"));
    assert!(formatted.contains("  • sink.HdfsFile.path ← job.content[0].writer.parameter.path\n"));
    assert!(formatted.contains("job.content[0].writer.parameter.writeMode = append"));
}

#[test]
fn test_unmapped_credentials_are_hidden() {
    let formatted = OutputFormat::Human
        .format_mapping_result(&sample_result())
        .unwrap();

    assert!(formatted.contains("job.content[0].reader.parameter.password = ***"));
    assert!(!formatted.contains("123456"));
}

#[test]
fn test_failed_result_formatting_human() {
    let formatted = OutputFormat::Human
        .format_mapping_result(&MappingResult::failed("Template not found: x.conf"))
        .unwrap();

    assert_eq!(formatted, "❌ Conversion failed\n  Template not found: x.conf\n");
}

#[test]
fn test_mapping_result_machine_formats() {
    let result = sample_result();

    let json = OutputFormat::Json.format_mapping_result(&result).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["direct"][0]["target_path"], "source.Jdbc.user");
    assert_eq!(parsed["success"], true);

    let yaml = OutputFormat::Yaml.format_mapping_result(&result).unwrap();
    assert!(yaml.contains("reader_type: mysqlreader"));
}

#[test]
fn test_field_mappings_formatting() {
    let mappings = vec![
        FieldMapping {
            target: "source.Jdbc.url".to_string(),
            sources: vec!["datax.job.content[0].reader.parameter.connection[0].jdbcUrl[0]".to_string()],
        },
        FieldMapping {
            target: "source.Jdbc.query".to_string(),
            sources: vec![
                "datax.job.content[0].reader.parameter.column".to_string(),
                "datax.job.content[0].reader.parameter.connection[0].table[0]".to_string(),
            ],
        },
    ];

    let human = OutputFormat::Human.format_field_mappings(&mappings).unwrap();
    assert!(human.starts_with("🔍 2 target field(s) read from the source:\n"));
    assert!(human.contains("  source.Jdbc.query ← datax.job.content[0].reader.parameter.column, datax.job.content[0].reader.parameter.connection[0].table[0]\n"));

    let empty = OutputFormat::Human.format_field_mappings(&[]).unwrap();
    assert_eq!(empty, "No source field references found\n");

    let json = OutputFormat::Json.format_field_mappings(&mappings).unwrap();
    assert!(json.starts_with("[{\"target\":\"source.Jdbc.url\""));
}

#[test]
fn test_quiet_writer_suppresses_messages() {
    let (mut out, buffer) = writer(OutputFormat::Human, true);

    out.info("starting").unwrap();
    out.success("done").unwrap();
    out.section("Summary").unwrap();
    out.mapping_result(&sample_result()).unwrap();
    out.warning("careful").unwrap();

    assert_eq!(buffer.contents(), "WARNING: careful\n");
}

#[test]
fn test_machine_format_skips_human_messages() {
    let (mut out, buffer) = writer(OutputFormat::Json, false);

    out.info("starting").unwrap();
    out.success("done").unwrap();
    out.data(&serde_json::json!({"ok": true})).unwrap();

    assert_eq!(buffer.contents(), "{\"ok\":true}\n");
}

#[test]
fn test_table_rendering() {
    let (mut out, buffer) = writer(OutputFormat::Human, false);

    out.table(
        &["#", "Source File"],
        vec![vec!["1".to_string(), "jobs/a.json".to_string()]],
    )
    .unwrap();

    assert_eq!(
        buffer.contents(),
        "# │ Source File\n──┼────────────\n1 │ jobs/a.json\n"
    );
}

#[test]
fn test_custom_writer_has_no_progress() {
    let (out, _) = writer(OutputFormat::Human, false);
    assert!(out.spinner("working").is_none());
    assert!(out.progress_bar(3, "files").is_none());
}
