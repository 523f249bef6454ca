//! Response Parser Tests
//!
//! The incremental parser against every operation's documented response
//! shapes, the global error words, and arbitrary chunk boundaries.

use beanqueue::protocol::{self, FieldValue, Outcome, Reply, Request, DEFAULT_MAX_JOB_SIZE};
use beanqueue::BeanError;

/// Feed a complete response in one chunk and expect a finished reply.
fn parse_one(req: &Request, bytes: &[u8]) -> Reply {
    let mut parser = req.parser();
    parser
        .feed(bytes)
        .expect("parse failed")
        .expect("response was not complete")
}

/// Feed a complete response and expect a failure.
fn parse_err(req: &Request, bytes: &[u8]) -> BeanError {
    let mut parser = req.parser();
    match parser.feed(bytes) {
        Err(e) => e,
        Ok(r) => panic!("expected error, got {r:?}"),
    }
}

// =============================================================================
// Per-Operation Success Shapes
// =============================================================================

#[test]
fn test_put_inserted_and_buried() {
    let req = protocol::put(b"test data", 0, 0, 0, DEFAULT_MAX_JOB_SIZE).unwrap();

    let reply = parse_one(&req, b"INSERTED 3\r\n");
    assert_eq!(reply.outcome, Outcome::Ok);
    assert_eq!(reply.jid(), Some(3));
    assert!(reply.body.is_none());

    let reply = parse_one(&req, b"BURIED 3\r\n");
    assert_eq!(reply.outcome, Outcome::Buried);
    assert_eq!(reply.jid(), Some(3));
}

#[test]
fn test_use_reports_tube() {
    let reply = parse_one(&protocol::use_tube("jobs").unwrap(), b"USING jobs\r\n");
    assert_eq!(reply.outcome, Outcome::Ok);
    assert_eq!(reply.tube(), Some("jobs"));
}

#[test]
fn test_reserve_carries_payload() {
    let reply = parse_one(&protocol::reserve(), b"RESERVED 12 5\r\nabcde\r\n");
    assert_eq!(reply.outcome, Outcome::Ok);
    assert_eq!(reply.jid(), Some(12));
    assert_eq!(reply.byte_count(), Some(5));
    assert_eq!(reply.raw_body().unwrap().as_ref(), b"abcde");
}

#[test]
fn test_reserve_with_timeout_both_shapes() {
    let req = protocol::reserve_with_timeout(3);

    let reply = parse_one(&req, b"RESERVED 12 5\r\nabcde\r\n");
    assert_eq!(reply.outcome, Outcome::Ok);

    let reply = parse_one(&req, b"TIMED_OUT\r\n");
    assert_eq!(reply.outcome, Outcome::TimedOut);
    assert!(reply.fields.is_empty());
    assert!(reply.body.is_none());
}

#[test]
fn test_release_both_shapes() {
    let req = protocol::release(33, 22, 17);
    assert_eq!(parse_one(&req, b"RELEASED\r\n").outcome, Outcome::Ok);
    assert_eq!(parse_one(&req, b"BURIED\r\n").outcome, Outcome::Buried);
}

#[test]
fn test_bare_word_replies() {
    assert_eq!(
        parse_one(&protocol::delete(12), b"DELETED\r\n").outcome,
        Outcome::Ok
    );
    assert_eq!(
        parse_one(&protocol::bury(29, 21), b"BURIED\r\n").outcome,
        Outcome::Ok
    );
    assert_eq!(
        parse_one(&protocol::touch(7), b"TOUCHED\r\n").outcome,
        Outcome::Ok
    );
}

#[test]
fn test_watch_and_ignore_report_count() {
    let reply = parse_one(&protocol::watch("jobs").unwrap(), b"WATCHING 2\r\n");
    assert_eq!(reply.count(), Some(2));

    let reply = parse_one(&protocol::ignore("jobs").unwrap(), b"WATCHING 1\r\n");
    assert_eq!(reply.count(), Some(1));
}

#[test]
fn test_peek_found_with_payload() {
    let reply = parse_one(&protocol::peek(Some(39)), b"FOUND 39 3\r\nxyz\r\n");
    assert_eq!(reply.jid(), Some(39));
    assert_eq!(reply.raw_body().unwrap().as_ref(), b"xyz");

    let reply = parse_one(&protocol::peek_ready(), b"FOUND 1 2\r\nok\r\n");
    assert_eq!(reply.jid(), Some(1));
}

#[test]
fn test_kick_reports_count() {
    let reply = parse_one(&protocol::kick(200), b"KICKED 59\r\n");
    assert_eq!(reply.count(), Some(59));
}

#[test]
fn test_stats_decodes_yaml_map() {
    let reply = parse_one(&protocol::stats(), b"OK 15\r\n---\ntest: good\n\r\n");
    assert_eq!(reply.outcome, Outcome::Ok);
    assert_eq!(reply.byte_count(), Some(15));
    let body = reply.yaml_body().unwrap();
    assert_eq!(body.get("test").and_then(|v| v.as_str()), Some("good"));
}

#[test]
fn test_stats_decodes_numeric_values() {
    let body = b"---\ncurrent-jobs-ready: 5\nmax-job-size: 65535\nversion: \"1.13\"\n";
    let response = [
        format!("OK {}\r\n", body.len()).into_bytes(),
        body.to_vec(),
        b"\r\n".to_vec(),
    ]
    .concat();
    let reply = parse_one(&protocol::stats(), &response);
    let stats = reply.yaml_body().unwrap();
    assert_eq!(
        stats.get("current-jobs-ready").and_then(|v| v.as_u64()),
        Some(5)
    );
    assert_eq!(stats.get("max-job-size").and_then(|v| v.as_u64()), Some(65535));
    assert_eq!(stats.get("version").and_then(|v| v.as_str()), Some("1.13"));
}

#[test]
fn test_list_tubes_decodes_yaml_sequence() {
    let reply = parse_one(
        &protocol::list_tubes(),
        b"OK 21\r\n---\n- default\n- jobs\n\r\n",
    );
    let tubes = reply.yaml_body().unwrap().as_sequence().unwrap();
    let names: Vec<&str> = tubes.iter().filter_map(|v| v.as_str()).collect();
    assert_eq!(names, ["default", "jobs"]);
}

#[test]
fn test_list_tube_used_is_bodyless() {
    let reply = parse_one(&protocol::list_tube_used(), b"USING default\r\n");
    assert_eq!(reply.tube(), Some("default"));
    assert!(reply.body.is_none());
}

// =============================================================================
// Field Coercion
// =============================================================================

#[test]
fn test_numeric_fields_are_coerced() {
    let reply = parse_one(&protocol::reserve(), b"RESERVED 12 5\r\nabcde\r\n");
    assert_eq!(reply.field("jid"), Some(&FieldValue::Int(12)));
    assert_eq!(reply.field("bytes"), Some(&FieldValue::Int(5)));
}

#[test]
fn test_non_numeric_fields_stay_strings() {
    let reply = parse_one(&protocol::use_tube("a.b").unwrap(), b"USING a.b\r\n");
    assert_eq!(reply.field("tube"), Some(&FieldValue::Str("a.b".to_string())));
}

// =============================================================================
// Error Words
// =============================================================================

#[test]
fn test_every_error_word_yields_typed_error() {
    let cases: [(&[u8], fn(&BeanError) -> bool); 10] = [
        (b"OUT_OF_MEMORY\r\n", |e| matches!(e, BeanError::OutOfMemory)),
        (b"INTERNAL_ERROR\r\n", |e| matches!(e, BeanError::InternalError)),
        (b"DRAINING\r\n", |e| matches!(e, BeanError::Draining)),
        (b"BAD_FORMAT\r\n", |e| matches!(e, BeanError::BadFormat(_))),
        (b"UNKNOWN_COMMAND\r\n", |e| matches!(e, BeanError::UnknownCommand)),
        (b"EXPECTED_CRLF\r\n", |e| matches!(e, BeanError::ExpectedCrlf(_))),
        (b"JOB_TOO_BIG\r\n", |e| matches!(e, BeanError::JobTooBig(_))),
        (b"NOT_FOUND\r\n", |e| matches!(e, BeanError::NotFound)),
        (b"NOT_IGNORED\r\n", |e| matches!(e, BeanError::NotIgnored)),
        (b"DEADLINE_SOON\r\n", |e| matches!(e, BeanError::DeadlineSoon)),
    ];
    for (line, check) in cases {
        // error words short-circuit regardless of the operation
        let err = parse_err(&protocol::reserve(), line);
        assert!(check(&err), "reserve: wrong error for {line:?}: {err:?}");
        let err = parse_err(&protocol::stats(), line);
        assert!(check(&err), "stats: wrong error for {line:?}: {err:?}");
    }
}

// =============================================================================
// Protocol Errors
// =============================================================================

#[test]
fn test_unknown_status_word_is_rejected() {
    let err = parse_err(&protocol::delete(1), b"SHRUGGED\r\n");
    assert!(matches!(err, BeanError::UnexpectedResponse(_)));
    assert!(err.to_string().contains("SHRUGGED"));
}

#[test]
fn test_word_valid_for_other_operation_is_rejected() {
    let err = parse_err(&protocol::delete(1), b"RESERVED 1 5\r\n");
    assert!(matches!(err, BeanError::UnexpectedResponse(_)));
}

#[test]
fn test_wrong_field_count_is_rejected() {
    let err = parse_err(&protocol::reserve(), b"RESERVED 12\r\n");
    assert!(matches!(err, BeanError::UnexpectedResponse(_)));

    let err = parse_err(&protocol::delete(1), b"DELETED 9\r\n");
    assert!(matches!(err, BeanError::UnexpectedResponse(_)));
}

#[test]
fn test_body_missing_terminator_is_rejected() {
    let err = parse_err(&protocol::reserve(), b"RESERVED 1 3\r\nabcXY");
    assert!(matches!(err, BeanError::ExpectedCrlf(_)));
}

#[test]
fn test_body_overrun_is_rejected() {
    // one byte past the declared length plus terminator
    let err = parse_err(&protocol::reserve(), b"RESERVED 1 3\r\nabc\r\nX");
    assert!(matches!(err, BeanError::ExpectedCrlf(_)));
}

#[test]
fn test_huge_declared_length_is_rejected() {
    // declared lengths near u64::MAX cannot be counted, let alone
    // buffered; the parser must fail cleanly instead of panicking
    let lines: [&[u8]; 2] = [
        b"RESERVED 1 18446744073709551615\r\n",
        b"RESERVED 1 18446744073709551614\r\n",
    ];
    for line in lines {
        let err = parse_err(&protocol::reserve(), line);
        assert!(
            matches!(err, BeanError::UnexpectedResponse(_)),
            "wrong error for {line:?}: {err:?}"
        );
    }
}

// =============================================================================
// Chunking Invariance
// =============================================================================

fn parse_in_chunks(req: &Request, chunks: &[&[u8]]) -> Reply {
    let mut parser = req.parser();
    let mut done = None;
    for chunk in chunks {
        if let Some(reply) = parser.feed(chunk).expect("parse failed") {
            done = Some(reply);
        }
    }
    done.expect("response was not complete")
}

#[test]
fn test_every_split_point_yields_identical_reply() {
    let cases: Vec<(Request, &[u8])> = vec![
        (protocol::reserve(), b"RESERVED 12 5\r\nabcde\r\n"),
        (protocol::stats(), b"OK 15\r\n---\ntest: good\n\r\n"),
        (protocol::delete(1), b"DELETED\r\n"),
        (
            protocol::put(b"x", 0, 0, 0, DEFAULT_MAX_JOB_SIZE).unwrap(),
            b"INSERTED 3\r\n",
        ),
        (protocol::reserve_with_timeout(0), b"TIMED_OUT\r\n"),
    ];

    for (req, bytes) in cases {
        let whole = parse_one(&req, bytes);
        for at in 0..=bytes.len() {
            let split = parse_in_chunks(&req, &[&bytes[..at], &bytes[at..]]);
            assert_eq!(split, whole, "split at {at} diverged for {:?}", req.op_name());
        }
    }
}

#[test]
fn test_byte_at_a_time_feeding() {
    let bytes = b"RESERVED 12 5\r\nabcde\r\n";
    let req = protocol::reserve();
    let whole = parse_one(&req, bytes);

    let singles: Vec<&[u8]> = bytes.chunks(1).collect();
    assert_eq!(parse_in_chunks(&req, &singles), whole);
}

#[test]
fn test_split_inside_body_of_yaml_reply() {
    let bytes = b"OK 15\r\n---\ntest: good\n\r\n";
    let req = protocol::stats();
    let whole = parse_one(&req, bytes);
    // split inside the declared-length body and inside its terminator
    for at in [8, 12, bytes.len() - 1] {
        let split = parse_in_chunks(&req, &[&bytes[..at], &bytes[at..]]);
        assert_eq!(split, whole);
    }
}

// =============================================================================
// Parser Lifecycle
// =============================================================================

#[test]
fn test_parsers_from_one_request_are_independent() {
    let req = protocol::reserve();
    let bytes = b"RESERVED 12 5\r\nabcde\r\n";

    let mut a = req.parser();
    let mut b = req.parser();
    // interleave feeding to catch hidden shared state
    assert!(a.feed(b"RESERVED 12 5\r\n").unwrap().is_none());
    let whole = b.feed(bytes).unwrap().unwrap();
    let resumed = a.feed(b"abcde\r\n").unwrap().unwrap();
    assert_eq!(resumed, whole);
}

#[test]
fn test_parser_is_one_shot() {
    let mut parser = protocol::delete(1).parser();
    parser.feed(b"DELETED\r\n").unwrap().unwrap();
    assert!(parser.is_terminal());
    assert!(parser.feed(b"anything").is_err());
}

#[test]
fn test_failed_parser_stays_failed() {
    let mut parser = protocol::delete(1).parser();
    assert!(parser.feed(b"NOT_FOUND\r\n").is_err());
    assert!(parser.is_terminal());
    assert!(parser.feed(b"DELETED\r\n").is_err());
}

#[test]
fn test_remaining_is_a_usable_read_hint() {
    let mut parser = protocol::reserve().parser();
    assert!(parser.remaining() > 0);
    parser.feed(b"RESERVED 9 10\r\n").unwrap();
    assert_eq!(parser.remaining(), 12);
    parser.feed(b"0123456789").unwrap();
    assert_eq!(parser.remaining(), 2);
    parser.feed(b"\r\n").unwrap().unwrap();
    assert_eq!(parser.remaining(), 0);
}
