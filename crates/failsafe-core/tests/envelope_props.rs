//! Property tests for envelope equality, hashing, framing and the
//! conversion helpers.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use failsafe_core::FailsafeEnvelope;
use failsafe_core::conversion::{
    convert_json_string_to_map, convert_map_to_args, convert_map_to_json_string,
    convert_tag_string_to_list, convert_timestamp_millis,
};
use failsafe_core::domain::row::{Row, Value, double_val, int64_val, str_val};
use failsafe_core::typed::{BytesCodec, EnvelopeCodec, PayloadCodec, Utf8Codec};
use proptest::prelude::*;

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn envelope_strategy() -> impl Strategy<Value = FailsafeEnvelope<Vec<u8>, String>> {
    (
        proptest::collection::vec(any::<u8>(), 0..64),
        ".{0,32}",
        proptest::option::of(".{0,32}"),
        proptest::option::of(".{0,32}"),
    )
        .prop_map(|(original, current, message, trace)| {
            let mut env = FailsafeEnvelope::new(original, current);
            if let Some(m) = message {
                env = env.with_error_message(m);
            }
            if let Some(t) = trace {
                env = env.with_stacktrace(t);
            }
            env
        })
}

/// Few distinct values per field, so equal pairs and triples are common.
fn small_envelope_strategy() -> impl Strategy<Value = FailsafeEnvelope<Vec<u8>, String>> {
    (
        proptest::collection::vec(0u8..2, 0..2),
        "[ab]?",
        proptest::option::of("x"),
        proptest::option::of("t"),
    )
        .prop_map(|(original, current, message, trace)| {
            let mut env = FailsafeEnvelope::new(original, current);
            if let Some(m) = message {
                env = env.with_error_message(m);
            }
            if let Some(t) = trace {
                env = env.with_stacktrace(t);
            }
            env
        })
}

fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(double_val(f64::NAN)),
        any::<f64>().prop_map(double_val),
        any::<i64>().prop_map(int64_val),
        "[a-z]{0,4}".prop_map(str_val),
    ]
}

fn row_strategy() -> impl Strategy<Value = Row> {
    proptest::collection::btree_map("[a-c]", value_strategy(), 0..4)
}

proptest! {
    #[test]
    fn equality_is_reflexive_and_symmetric(a in envelope_strategy(), b in envelope_strategy()) {
        let same = &a;
        prop_assert!(a == *same);
        prop_assert_eq!(a == b, b == a);
    }

    #[test]
    fn equality_is_transitive(
        a in small_envelope_strategy(),
        b in small_envelope_strategy(),
        c in small_envelope_strategy(),
    ) {
        if a == b && b == c {
            prop_assert_eq!(&a, &c);
        }
        if a == b {
            prop_assert_eq!(hash_of(&a), hash_of(&b));
        }
    }

    #[test]
    fn row_envelopes_are_reflexive_and_hash_consistently(row in row_strategy()) {
        let env = FailsafeEnvelope::new(b"raw".to_vec(), row);
        let copy = FailsafeEnvelope::copy_of(&env);
        let same = &env;
        prop_assert!(env == *same);
        prop_assert_eq!(&copy, &env);
        prop_assert_eq!(hash_of(&copy), hash_of(&env));
    }

    #[test]
    fn equal_envelopes_hash_equally(a in envelope_strategy()) {
        let b = FailsafeEnvelope::copy_of(&a);
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn failed_iff_a_diagnostic_is_present(a in envelope_strategy()) {
        let expected = a.error_message().is_some() || a.stacktrace().is_some();
        prop_assert_eq!(a.is_failed(), expected);
    }

    #[test]
    fn frame_roundtrip(a in envelope_strategy()) {
        let codec = EnvelopeCodec::new(BytesCodec, Utf8Codec);
        let bytes = codec.encode(&a).unwrap();
        let back: FailsafeEnvelope<Vec<u8>, String> = codec.decode(&bytes).unwrap();
        prop_assert_eq!(back, a);
    }

    #[test]
    fn json_roundtrip(a in envelope_strategy()) {
        let s = serde_json::to_string(&a).unwrap();
        let back: FailsafeEnvelope<Vec<u8>, String> = serde_json::from_str(&s).unwrap();
        prop_assert_eq!(back, a);
    }

    #[test]
    fn timestamp_nanos_stay_in_range(millis in any::<i64>()) {
        let ts = convert_timestamp_millis(millis);
        prop_assert!((0..1_000_000_000).contains(&ts.nanos));
        prop_assert_eq!(
            i128::from(ts.seconds) * 1_000 + i128::from(ts.nanos / 1_000_000),
            i128::from(millis)
        );
    }

    #[test]
    fn tag_list_rejoins_to_input(tags in proptest::collection::vec("[a-z]{1,8}", 1..8)) {
        let joined = tags.join(",");
        prop_assert_eq!(convert_tag_string_to_list(&joined), tags);
    }

    #[test]
    fn string_maps_survive_json(map in proptest::collection::hash_map("[a-z]{1,8}", ".{0,16}", 0..8)) {
        let json = convert_map_to_json_string(&map);
        prop_assert_eq!(convert_json_string_to_map(&json).unwrap(), map);
    }

    #[test]
    fn one_arg_per_entry(map in proptest::collection::hash_map("[a-z]{1,8}", "[a-z0-9]{0,8}", 0..8)) {
        let args = convert_map_to_args(&map);
        prop_assert_eq!(args.len(), map.len());
        for (k, v) in &map {
            let expected = format!("--{k}={v}");
            prop_assert!(args.contains(&expected));
        }
    }
}

#[test]
fn envelopes_work_as_hash_map_keys() {
    let mut seen = HashMap::new();
    let env = FailsafeEnvelope::new(b"raw".to_vec(), "row".to_string()).with_error_message("e");
    seen.insert(env.clone(), 1);
    assert_eq!(seen.get(&FailsafeEnvelope::copy_of(&env)), Some(&1));
}
