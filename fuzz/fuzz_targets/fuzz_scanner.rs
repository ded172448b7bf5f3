#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pegn::{
    Choice, Literal, Not, Repeat, Rule, ScanOptions, Scanner, Seq, Tree, UNTYPED,
    builtin::{Any, Digit, EndLine, EndOfData, EndPara, Field, Uprint, WhiteSpace},
    driver,
};

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    bytes: &'a [u8],
    rule: u8,
    max_errors: Option<u8>,
    preview_len: u8,
    steps: u8,
}

fn rule(which: u8) -> Box<dyn Rule> {
    match which % 12 {
        0 => EndOfData.boxed(),
        1 => WhiteSpace.boxed(),
        2 => EndLine.boxed(),
        3 => EndPara.boxed(),
        4 => Field.boxed(),
        5 => Uprint.boxed(),
        6 => Digit.boxed(),
        7 => Any.boxed(),
        8 => Repeat::zero_or_more(
            1,
            Choice::new(UNTYPED, [Field.boxed(), WhiteSpace.boxed(), EndLine.boxed()]),
        )
        .boxed(),
        9 => Seq::new(2, [Not::new(UNTYPED, Digit).boxed(), Repeat::one_or_more(3, Any).boxed()])
            .boxed(),
        10 => Repeat::one_or_more(UNTYPED, Seq::new(4, [Field.boxed(), EndPara.boxed()])).boxed(),
        _ => Choice::new(5, (0..8).map(|k| Literal::new(10 + k, "ab").boxed())).boxed(),
    }
}

fuzz_target!(|input: Input| {
    let options = ScanOptions {
        max_errors: input.max_errors.map(usize::from),
        preview_len: usize::from(input.preview_len),
        ..ScanOptions::default()
    };
    let rule = rule(input.rule);

    // Failure contract on a raw scanner.
    let mut s = Scanner::new(options.clone());
    s.set_buffer(input.bytes);
    for _ in 0..input.steps % 8 {
        s.scan();
    }
    let before = s.mark();
    let errors = s.errors().len();
    if rule.scan(&mut s) {
        assert!(s.cursor().end >= before.end);
    } else {
        assert_eq!(s.cursor(), before);
        assert!(s.errors().len() > errors);
    }
    let _ = s.to_string();
    let _ = s.positions(&[0, before.end, s.cursor().end, input.bytes.len() + 1]);

    // Parse results survive a JSON round trip.
    if let Ok((tree, root)) = driver::parse(rule.as_ref(), input.bytes, &options) {
        let json = tree.to_json(root);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let serialized = serde_json::to_string(&tree.get(root)).unwrap();
        assert_eq!(serde_json::from_str::<serde_json::Value>(&serialized).unwrap(), value);

        let mut back = Tree::new();
        let copy = back.insert_json(&json).unwrap();
        assert_eq!(back.to_json(copy), json);
    }
});
