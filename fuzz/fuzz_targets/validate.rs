#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|source_and_instance: (String, Vec<u8>)| {
    // We're only interested in fuzzing against schemas that parse.
    let schema = match jshape::parse(&source_and_instance.0) {
        Ok(schema) => schema,
        Err(_) => return,
    };

    if let Ok(instance) = serde_json::from_slice::<serde_json::Value>(&source_and_instance.1) {
        let value = jshape::Value::from(instance);
        let _ = jshape::validate(&value, &schema);
    }
});
