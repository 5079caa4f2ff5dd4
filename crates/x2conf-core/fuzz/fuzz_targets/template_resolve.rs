//! Fuzzing target for whole-template resolution
//!
//! Resolves arbitrary template text against a fixed job. Syntax errors are
//! fine; panics are not.

#![no_main]

use libfuzzer_sys::fuzz_target;
use serde_json::json;
use x2conf_core::{ConfigAssembler, Manifest, MemoryTemplates, SourceDocument};

fuzz_target!(|data: &[u8]| {
    let Ok(template) = std::str::from_utf8(data) else {
        return;
    };

    let job = json!({
        "job": {
            "setting": {"speed": {"channel": 2}},
            "content": [{
                "reader": {
                    "name": "mysqlreader",
                    "parameter": {
                        "username": "root",
                        "column": ["id", "name"],
                        "connection": [{"jdbcUrl": ["jdbc:mysql://h:3306/db"], "table": ["t"]}]
                    }
                },
                "writer": {
                    "name": "hdfswriter",
                    "parameter": {"path": "/warehouse/ods/t/"}
                }
            }]
        }
    });
    let Ok(doc) = SourceDocument::from_value(job) else {
        return;
    };

    let manifest = Manifest::new();
    let templates = MemoryTemplates::new();
    let assembler = ConfigAssembler::new(&manifest, &templates);

    if let Ok(assembly) = assembler.assemble_custom(&doc, template) {
        // Per-field problems never turn a resolved run into a failure
        assert!(assembly.result.success);
    }
});
