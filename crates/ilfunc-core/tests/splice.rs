use ilfunc_core::{
    decode_payload, encode_payload, extract_blob, render_hex, rewrite_il, Newline, RewriteError,
    RewriteOptions, Rewriter, SpliceError, BODY_END,
};
use pretty_assertions::assert_eq;

const HEADER: &str = "  .method public hidebysig static int32 ";

/// A method the way ildasm prints it, with an ILFunc marker carrying `payload`.
fn marked_method(name: &str, payload: &str, stub: &str) -> String {
    let blob = encode_payload(payload).unwrap();
    let hex = render_hex(&blob).replace('\n', "\r\n      ");
    format!(
        "{HEADER}{name}(int32 a, int32 b) cil managed\r\n  {{\r\n    .custom instance void [ILFunc]ILFunc.ILFuncAttribute::.ctor(string) = {hex} // ..\r\n    // Code size       6 (0x6)\r\n    .maxstack  8\r\n{stub}  {BODY_END} Program::{name}\r\n\r\n"
    )
}

/// What `marked_method` turns into: the attribute is gone (its annotation stays),
/// the payload takes the place of `.maxstack` and the stub.
fn spliced_method(name: &str, payload: &str) -> String {
    format!(
        "{HEADER}{name}(int32 a, int32 b) cil managed\r\n  {{\r\n     // ..\r\n    // Code size       6 (0x6)\r\n    {payload}\r\n{BODY_END} Program::{name}\r\n\r\n"
    )
}

const STUB: &str = "    IL_0000:  ldnull\r\n    IL_0001:  throw\r\n";

#[test]
fn payload_round_trips_through_hex_text() {
    let long = "nop\r\n".repeat(100);
    for payload in ["", "ret", "ldarg.0\r\nldarg.1\r\nadd\r\nret", long.as_str()] {
        let text = format!("= {}", render_hex(&encode_payload(payload).unwrap()));
        let blob = extract_blob(&text, 0).unwrap();
        assert_eq!(decode_payload(&blob.bytes).unwrap(), payload);
    }
}

#[test]
fn single_marker_is_spliced() {
    let payload = ".maxstack 2\r\nldarg.0\r\nldarg.1\r\nadd\r\nret";
    let text = marked_method("Add", payload, STUB);
    assert_eq!(rewrite_il(&text).unwrap(), spliced_method("Add", payload));
}

#[test]
fn two_markers_with_different_sizes() {
    let short = "ldc.i4.0\r\nret";
    let long = ".maxstack 3\r\n".to_string() + &"ldarg.0\r\npop\r\n".repeat(90) + "ldc.i4.1\r\nret";
    let long_stub = "    IL_0000:  nop\r\n".repeat(20);

    let text = format!(
        ".assembly extern mscorlib {{}}\r\n{}{}",
        marked_method("First", &long, STUB),
        marked_method("Second", short, &long_stub)
    );

    let rewriter = Rewriter::default();
    let plan = rewriter.plan(&text).unwrap();
    assert_eq!(plan.splices.len(), 2);
    assert_eq!(plan.edits.len(), 6);

    let out = plan.apply(&text).unwrap();

    let removed: usize = plan
        .splices
        .iter()
        .map(|s| s.marker.len() + s.body.len())
        .sum();
    let inserted: usize = plan.splices.iter().map(|s| s.replacement.len() + 2).sum();
    assert_eq!(out.len(), text.len() - removed + inserted);

    assert!(!out.contains("ILFuncAttribute"));
    assert!(!out.contains("IL_0001:  throw"));
    assert!(!out.contains("IL_0000:  nop"));
    assert!(out.contains(&spliced_method("First", &long)));
    assert!(out.contains(&spliced_method("Second", short)));
    assert!(out.starts_with(".assembly extern mscorlib {}\r\n"));
}

#[test]
fn unmarked_text_is_byte_identical() {
    let text = marked_method("Add", "ret", STUB).replace("ILFuncAttribute", "DebuggableAttribute");
    assert_eq!(rewrite_il(&text).unwrap(), text);
    assert_eq!(rewrite_il("").unwrap(), "");
}

#[test]
fn missing_stack_directive_fails_whole_pass() {
    let good = marked_method("Good", "ret", STUB);
    let bad = marked_method("Bad", "ret", STUB).replace(".maxstack  8", ".locals init (int32 V_0)");
    let text = good.clone() + &bad;

    let err = Rewriter::default().plan(&text).unwrap_err();
    match &err {
        RewriteError::Marker {
            occurrence,
            offset,
            source: SpliceError::StructuralMismatch { .. },
        } => {
            assert_eq!(*occurrence, 1);
            assert_eq!(*offset, good.len() + bad.find(".custom").unwrap());
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(rewrite_il(&text).is_err());
}

#[test]
fn decode_errors_carry_occurrence() {
    // declared length 0x10 but only five bytes follow
    let text = marked_method("Add", "ret", STUB).replace("( 01 00 03", "( 01 00 10");
    let err = rewrite_il(&text).unwrap_err();
    assert_eq!(
        err.splice_error(),
        Some(&SpliceError::TruncatedPayload {
            index: 3,
            needed: 16,
            available: 5
        })
    );
    assert!(err.to_string().starts_with("marker #0 at offset "));

    let text = marked_method("Add", "ret", STUB).replace("( 01 00 03", "( 01 00 E3");
    assert_eq!(
        rewrite_il(&text).unwrap_err().splice_error().map(SpliceError::kind),
        Some("invalid-length-encoding")
    );
}

#[test]
fn lf_output_with_detected_newline() {
    let text = marked_method("Add", "ret", STUB).replace("\r\n", "\n");
    let rewriter = Rewriter::new(&RewriteOptions {
        newline: Newline::Detect,
        ..Default::default()
    })
    .unwrap();
    let out = rewriter.rewrite(&text).unwrap();
    assert_eq!(out, spliced_method("Add", "ret").replace("\r\n", "\n"));
    assert!(!out.contains('\r'));
}

#[test]
fn bodiless_marked_method_leaves_next_method_alone() {
    let abstract_method = marked_method("Foo", "ret", STUB).replace("    .maxstack  8\r\n", "");
    let next = "  .method public hidebysig instance void Bar() cil managed\r\n  {\r\n    .maxstack  8\r\n    IL_0000:  call       void Important()\r\n    IL_0005:  ret\r\n  } // end of method Program::Bar\r\n";
    let text = abstract_method + next;

    let err = rewrite_il(&text).unwrap_err();
    assert!(matches!(
        err,
        RewriteError::Marker {
            occurrence: 0,
            source: SpliceError::StructuralMismatch { anchor: ".maxstack", .. },
            ..
        }
    ));
}

#[test]
fn second_marker_on_same_method_is_reported_with_its_location() {
    let text = marked_method("Add", "ret", STUB);
    let marker_line = text
        .lines()
        .find(|l| l.contains(".custom"))
        .unwrap()
        .to_string();
    let doubled = text.replacen(&marker_line, &format!("{marker_line}\r\n{marker_line}"), 1);

    let err = rewrite_il(&doubled).unwrap_err();
    match err {
        RewriteError::Marker {
            occurrence,
            offset,
            source: SpliceError::InvalidEdit { start, .. },
        } => {
            let second = doubled.match_indices(".custom").nth(1).unwrap().0;
            assert_eq!(occurrence, 1);
            assert_eq!(offset, second);
            assert_eq!(start, second);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
