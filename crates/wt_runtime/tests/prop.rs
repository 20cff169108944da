//! Property tests for the value model.
use proptest::prelude::*;
use wt_runtime::{Chunk, ChunkPos, Value};

proptest! {
    #[test]
    fn integer_values_round_trip(i in any::<i64>()) {
        let v = Value::from_int(i);
        prop_assert_eq!(v.as_integer(), Some(i));
        prop_assert_eq!(Value::new(v.as_str()).as_integer(), Some(i));
    }

    #[test]
    fn small_integer_addition_is_exact(a in any::<i32>(), b in any::<i32>()) {
        let sum = Value::from_int(a as i64).add(&Value::from_int(b as i64)).unwrap();
        prop_assert_eq!(sum.as_integer(), Some(a as i64 + b as i64));
    }

    #[test]
    fn chunk_reads_never_panic(text in ".{0,64}", n in 1usize..50) {
        for kind in [Chunk::Char, Chunk::Word, Chunk::Item, Chunk::Line] {
            let v = Value::new(text.clone());
            v.get_chunk(kind, ChunkPos::At(n), None).unwrap();
            v.get_chunk(kind, ChunkPos::Middle, Some(ChunkPos::At(n))).unwrap();
        }
    }

    #[test]
    fn items_split_on_commas(fields in prop::collection::vec("[a-z]{0,5}", 1..6)) {
        let v = Value::new(fields.join(","));
        for (i, field) in fields.iter().enumerate() {
            let got = v.get_chunk(Chunk::Item, ChunkPos::At(i + 1), None).unwrap();
            prop_assert_eq!(got.as_str(), field.as_str());
        }
    }
}
