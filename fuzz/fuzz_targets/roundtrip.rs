#![no_main]

use libfuzzer_sys::fuzz_target;

use asct::parse::parse_str;
use asct::write::write;

fuzz_target!(|code: &str| {
    let Ok(ast) = parse_str(code) else { return };

    let written = write(&ast);
    let reparsed = parse_str(&written).expect("the written code must parse");

    assert_eq!(write(&reparsed), written);
});
