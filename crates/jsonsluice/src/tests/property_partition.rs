use quickcheck::QuickCheck;

use crate::{
    tests::utils::{collect_items, direct_children, from_serde, VecSource},
    value::Map,
    ItemKey, ItemStream, Value, ValueDecoder,
};

fn property_test_count() -> u64 {
    if is_ci::cached() {
        10_000
    } else {
        1_000
    }
}

/// Property: feeding a document in arbitrary chunk sizes must yield exactly
/// the same items as feeding it in one piece, and those items must be the
/// container's direct children.
#[test]
fn partition_invariance_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(children: Vec<Value>, splits: Vec<usize>) -> bool {
        let doc = Value::Array(children.clone()).to_string();

        let expected: Vec<_> = children
            .iter()
            .cloned()
            .enumerate()
            .map(|(i, v)| (ItemKey::Index(i), v))
            .collect();

        let whole = collect_items(doc.as_bytes(), "");
        if whole != expected {
            return false;
        }

        let source = VecSource::partition(doc.as_bytes(), &splits);
        let chunked: Vec<_> = ItemStream::with_decoder(source, "", ValueDecoder)
            .unwrap()
            .map(Result::unwrap)
            .collect();
        chunked == expected
    }

    QuickCheck::new()
        .tests(property_test_count())
        .quickcheck(prop as fn(Vec<Value>, Vec<usize>) -> bool);
}

/// Property: iterating an object root yields its entries, in the order the
/// serializer wrote them, regardless of chunking.
#[test]
fn object_partition_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(map: Map, splits: Vec<usize>) -> bool {
        let value = Value::Object(map);
        let doc = value.to_string();
        let expected = direct_children(&value).unwrap();

        let source = VecSource::partition(doc.as_bytes(), &splits);
        let items: Vec<_> = ItemStream::with_decoder(source, "", ValueDecoder)
            .unwrap()
            .map(Result::unwrap)
            .collect();
        items == expected
    }

    QuickCheck::new()
        .tests(property_test_count())
        .quickcheck(prop as fn(Map, Vec<usize>) -> bool);
}

/// Property: a pointer one level down selects exactly the children of the
/// wrapped container.
#[test]
fn nested_pointer_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(children: Vec<Value>, splits: Vec<usize>) -> bool {
        let mut wrapper = Map::new();
        wrapper.insert("skip".into(), Value::String("x".into()));
        wrapper.insert("target".into(), Value::Array(children.clone()));
        let doc = Value::Object(wrapper).to_string();

        let expected: Vec<_> = children
            .into_iter()
            .enumerate()
            .map(|(i, v)| (ItemKey::Index(i), v))
            .collect();

        let source = VecSource::partition(doc.as_bytes(), &splits);
        let items: Vec<_> = ItemStream::with_decoder(source, "/target", ValueDecoder)
            .unwrap()
            .map(Result::unwrap)
            .collect();
        items == expected
    }

    QuickCheck::new()
        .tests(property_test_count())
        .quickcheck(prop as fn(Vec<Value>, Vec<usize>) -> bool);
}

/// Property: streamed items agree with a standard full-document decode.
#[test]
fn differential_against_serde_json_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(children: Vec<Value>) -> bool {
        let doc = Value::Array(children).to_string();

        let full: serde_json::Value = serde_json::from_str(&doc).unwrap();
        let expected: Vec<_> = full
            .as_array()
            .unwrap()
            .iter()
            .enumerate()
            .map(|(i, v)| (ItemKey::Index(i), from_serde(v)))
            .collect();

        collect_items(doc.as_bytes(), "") == expected
    }

    QuickCheck::new()
        .tests(property_test_count())
        .quickcheck(prop as fn(Vec<Value>) -> bool);
}
