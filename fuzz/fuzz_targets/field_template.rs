#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use serde_json::{Map, Value};

use kayvee_router::FieldTemplate;

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    template: String,
    fields: Vec<(String, String)>,
}

fuzz_target!(|input: FuzzInput| {
    let template = FieldTemplate::compile(&input.template);

    let mut record = Map::new();
    for (key, value) in input.fields.into_iter().take(16) {
        record.insert(key, Value::String(value));
    }

    // 토큰이 없으면 원문 그대로여야 함
    let rendered = template.render(&record);
    if !template.has_fields() {
        assert_eq!(rendered, input.template);
    }
});
