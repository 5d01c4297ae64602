#![no_main]

use libfuzzer_sys::fuzz_target;

use sqltable::invocation::DirectiveInvocation;
use sqltable::SqlTableDirective;

fuzz_target!(|data: &[u8]| {
    const MAX_BODY_LINES: usize = 16;
    const MAX_LINE_BYTES: usize = 512;

    if data.is_empty() {
        return;
    }

    let mut i = 0usize;
    let line_count = (data[i] as usize % MAX_BODY_LINES).max(1);
    i += 1;

    let mut builder = DirectiveInvocation::builder("fuzz block", u64::from(data[0]));
    for _ in 0..line_count {
        if i + 2 > data.len() {
            break;
        }
        let raw_len = u16::from_le_bytes([data[i], data[i + 1]]) as usize;
        i += 2;
        let line_len = raw_len % MAX_LINE_BYTES;
        if i + line_len > data.len() {
            break;
        }
        let line = String::from_utf8_lossy(&data[i..i + line_len]).into_owned();
        i += line_len;
        builder = builder.body_line(line);
    }
    if i < data.len() && data[i] % 2 == 0 {
        builder = builder.widths(vec![u32::from(data[i]) + 1]);
    }
    let invocation = builder.build();

    // Arbitrary query text against a throwaway database must never panic and
    // must always produce at least one node (a table or an error marker).
    let directive = SqlTableDirective::sqlite(":memory:");
    let nodes = directive.run(&invocation);
    assert!(!nodes.is_empty());
    for node in &nodes {
        if let Some(error) = node.as_error() {
            let _ = error.message().len();
        }
    }
});
