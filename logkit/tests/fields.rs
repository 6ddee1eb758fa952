use std::io;
use std::time::Duration;

use logkit::{field, Encoding, Level, Logger, MemorySink, Sink};
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Serialize)]
struct Peer {
    host: &'static str,
    port: u16,
}

fn emit(fields: &[logkit::Field]) -> Value {
    let mem = MemorySink::new();
    let logger = Logger::from_parts(Level::Debug, Encoding::Json, Sink::Memory(mem.clone()));
    logger.info("fields", fields);
    serde_json::from_str(&mem.lines()[0]).unwrap()
}

#[test]
fn test_every_builder_renders_key_and_value() {
    let err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
    let entry = emit(&[
        field::string("s", "text"),
        field::int("i", 42),
        field::int64("i64", -9_000_000_000),
        field::float64("f", 3.5),
        field::boolean("b", false),
        field::error(&err),
        field::any("peer", &Peer { host: "db", port: 5432 }),
        field::duration("d", 0.75),
        field::elapsed("e", Duration::from_secs(2)),
    ]);

    assert_eq!(entry["s"], "text");
    assert_eq!(entry["i"], 42);
    assert_eq!(entry["i64"], -9_000_000_000i64);
    assert_eq!(entry["f"], 3.5);
    assert_eq!(entry["b"], false);
    assert_eq!(entry["error"], "access denied");
    assert_eq!(entry["peer"], json!({"host": "db", "port": 5432}));
    assert_eq!(entry["d"], 0.75);
    assert_eq!(entry["e"], "2s");
}

#[test]
fn test_console_renders_fields_as_object() {
    let mem = MemorySink::new();
    let logger = Logger::from_parts(Level::Info, Encoding::Console, Sink::Memory(mem.clone()));
    logger
        .with_fields(&[field::string("svc", "api")])
        .info("ready", &[field::boolean("tls", true)]);

    let line = mem.lines().remove(0);
    assert!(line.ends_with("\tready\t{\"svc\":\"api\",\"tls\":true}"), "{}", line);
}
