//! Value model: coercions, arithmetic, comparison, chunks.
use wt_runtime::{Chunk, ChunkPos, Prep, RuntimeError, Value};

#[test]
fn empty_is_zero_but_not_boolean() {
    let v = Value::empty();
    assert_eq!(v.as_integer(), Some(0));
    assert_eq!(v.as_float(), Some(0.0));
    assert_eq!(v.as_bool(), None);
}

#[test]
fn coercions_are_derived_from_the_text() {
    let v = Value::new("12");
    assert!(v.is_integer());
    assert_eq!(v.as_float(), Some(12.0));

    let v = Value::new(" 3.5 ");
    assert_eq!(v.as_str(), " 3.5 ");
    assert_eq!(v.as_integer(), None);
    assert_eq!(v.as_float(), Some(3.5));

    assert_eq!(Value::new("TRUE").as_bool(), Some(true));
    assert_eq!(Value::new("False").as_bool(), Some(false));
    assert_eq!(Value::new("yes").as_bool(), None);
    assert_eq!(Value::new("12dogs").as_float(), None);
}

#[test]
fn integral_float_results_render_without_fraction() {
    assert_eq!(Value::from_float(8.0).as_str(), "8");
    assert_eq!(Value::from_float(2.5).as_str(), "2.5");
    assert_eq!(Value::from_int(-3).as_str(), "-3");
}

#[test]
fn arithmetic_prefers_exact_integers() {
    let a = Value::new("7");
    let b = Value::new("2");
    assert_eq!(a.add(&b).unwrap().as_str(), "9");
    assert_eq!(a.divide(&b).unwrap().as_str(), "3.5");
    assert_eq!(a.int_divide(&b).unwrap().as_str(), "3");
    assert_eq!(a.modulo(&b).unwrap().as_str(), "1");
    assert_eq!(
        Value::new("8").divide(&Value::new("2")).unwrap().as_str(),
        "4"
    );
    assert_eq!(Value::new("2").power(&Value::new("10")).unwrap().as_str(), "1024");
}

#[test]
fn mixed_arithmetic_falls_back_to_floats() {
    let sum = Value::new("2").add(&Value::new("3.5")).unwrap();
    assert_eq!(sum.as_str(), "5.5");
}

#[test]
fn integer_overflow_is_an_error_not_a_wrap() {
    let max = Value::from_int(i64::MAX);
    let err = max.add(&Value::new("1")).unwrap_err();
    assert_eq!(err, RuntimeError::Overflow { op: "+" });
    assert_eq!(
        Value::from_int(i64::MIN).negate().unwrap_err(),
        RuntimeError::Overflow { op: "-" }
    );
}

#[test]
fn division_by_zero_is_reported_for_every_divider() {
    let one = Value::new("1");
    let zero = Value::new("0");
    assert_eq!(one.divide(&zero).unwrap_err(), RuntimeError::DivideByZero);
    assert_eq!(one.int_divide(&zero).unwrap_err(), RuntimeError::DivideByZero);
    assert_eq!(one.modulo(&zero).unwrap_err(), RuntimeError::DivideByZero);
}

#[test]
fn non_numeric_operand_names_the_offender() {
    let err = Value::new("7").add(&Value::new("dog")).unwrap_err();
    assert_eq!(err, RuntimeError::not_a_number("dog"));
}

#[test]
fn equality_coerces_before_comparing() {
    assert_eq!(Value::new("7"), Value::new(" 7 "));
    assert_eq!(Value::new("true"), Value::new("TRUE"));
    assert_eq!(Value::new("Hello"), Value::new("hello"));
    assert_ne!(Value::new("7"), Value::new("8"));
    // Numeric beats lexical: "10" > "9".
    assert!(Value::new("10").compare(&Value::new("9")).is_gt());
    assert!(Value::new("apple").compare(&Value::new("Banana")).is_lt());
}

#[test]
fn containment_ignores_case() {
    assert!(Value::new("Hello World").contains(&Value::new("WORLD")));
    assert!(!Value::new("Hello").contains(&Value::new("world")));
}

#[test]
fn chunk_reads_are_one_based() {
    let v = Value::new("a,bb,ccc");
    let item2 = v.get_chunk(Chunk::Item, ChunkPos::At(2), None).unwrap();
    assert_eq!(item2.as_str(), "bb");
    let ch = item2.get_chunk(Chunk::Char, ChunkPos::At(1), None).unwrap();
    assert_eq!(ch.as_str(), "b");
}

#[test]
fn chunk_ranges_read_inclusively() {
    let v = Value::new("one two three four");
    let words = v
        .get_chunk(Chunk::Word, ChunkPos::At(2), Some(ChunkPos::At(3)))
        .unwrap();
    assert_eq!(words.as_str(), "two three");
}

#[test]
fn out_of_range_chunks_read_as_empty() {
    let v = Value::new("a,b");
    assert_eq!(v.get_chunk(Chunk::Item, ChunkPos::At(9), None).unwrap().as_str(), "");
    assert_eq!(
        Value::empty()
            .get_chunk(Chunk::Line, ChunkPos::At(1), None)
            .unwrap()
            .as_str(),
        ""
    );
}

#[test]
fn middle_is_the_ceiling_midpoint() {
    let v = Value::new("one two three");
    assert_eq!(
        v.get_chunk(Chunk::Word, ChunkPos::Middle, None).unwrap().as_str(),
        "two"
    );
    let v = Value::new("a,b,c,d");
    assert_eq!(
        v.get_chunk(Chunk::Item, ChunkPos::Middle, None).unwrap().as_str(),
        "b"
    );
}

#[test]
fn items_between_consecutive_commas_are_empty_chunks() {
    let v = Value::new("a,,c");
    assert_eq!(v.chunk_count(Chunk::Item), 3);
    assert_eq!(v.get_chunk(Chunk::Item, ChunkPos::At(2), None).unwrap().as_str(), "");
}

#[test]
fn chunk_writes_replace_pad_and_splice() {
    let v = Value::new("a,b,c");
    let into = v
        .set_chunk(Prep::Into, Chunk::Item, ChunkPos::At(2), None, &Value::new("X"))
        .unwrap();
    assert_eq!(into.as_str(), "a,X,c");

    let before = v
        .set_chunk(Prep::Before, Chunk::Item, ChunkPos::At(2), None, &Value::new("X"))
        .unwrap();
    assert_eq!(before.as_str(), "a,Xb,c");

    let after = v
        .set_chunk(Prep::After, Chunk::Item, ChunkPos::At(2), None, &Value::new("X"))
        .unwrap();
    assert_eq!(after.as_str(), "a,bX,c");
}

#[test]
fn writing_past_the_end_pads_with_the_separator() {
    let v = Value::new("a,b");
    let out = v
        .set_chunk(Prep::Into, Chunk::Item, ChunkPos::At(5), None, &Value::new("x"))
        .unwrap();
    assert_eq!(out.as_str(), "a,b,,,x");

    let out = Value::empty()
        .set_chunk(Prep::Into, Chunk::Line, ChunkPos::At(3), None, &Value::new("x"))
        .unwrap();
    assert_eq!(out.as_str(), "\n\nx");
}

#[test]
fn concat_variants() {
    let hello = Value::new("hello");
    let world = Value::new("world");
    assert_eq!(hello.concat(&world).as_str(), "helloworld");
    assert_eq!(hello.concat_with_space(&world).as_str(), "hello world");
}

#[test]
fn chunk_pos_parsing() {
    assert_eq!(Value::new("3").as_chunk_pos().unwrap(), ChunkPos::At(3));
    assert_eq!(Value::new("Middle").as_chunk_pos().unwrap(), ChunkPos::Middle);
    assert!(Value::new("0").as_chunk_pos().is_err());
    assert!(Value::new("-1").as_chunk_pos().is_err());
    assert!(Value::new("first").as_chunk_pos().is_err());
}

#[test]
fn chunk_writes_pad_only_a_bounded_distance() {
    let v = Value::new("a,b");
    let err = v
        .set_chunk(
            Prep::Into,
            Chunk::Item,
            ChunkPos::At(usize::MAX),
            None,
            &Value::new("x"),
        )
        .unwrap_err();
    assert!(matches!(err, RuntimeError::Semantic(_)));

    // A large but sane index still pads out to the written chunk.
    let ok = v
        .set_chunk(
            Prep::Into,
            Chunk::Item,
            ChunkPos::At(1000),
            None,
            &Value::new("x"),
        )
        .unwrap();
    assert_eq!(ok.chunk_count(Chunk::Item), 1000);
    assert_eq!(
        ok.get_chunk(Chunk::Item, ChunkPos::At(1000), None)
            .unwrap()
            .as_str(),
        "x"
    );
}
