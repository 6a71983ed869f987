//! Encoders must reproduce the fixed vectors byte for byte.

use wordidx_codec::{encode_record, read_sections, ContainerWriter};
use wordidx_core::{Index, IndexCollection, WordEntry};
use wordidx_testkit::prelude::*;

fn parse_pair(pair: &str) -> (&str, u32) {
    let (token, frequency) = pair.split_once(':').unwrap();
    (token, frequency.parse().unwrap())
}

#[test]
fn record_vectors_encode() {
    for vector in record_vectors() {
        let mut buf = Vec::new();
        for pair in &vector.input {
            let (token, frequency) = parse_pair(pair);
            encode_record(token, frequency, &mut buf).unwrap();
        }
        assert_eq!(hex_encode(&buf), hex_encode(&vector.bytes()), "vector {}", vector.id);
    }
}

#[test]
fn record_vectors_decode_into_index() {
    for vector in record_vectors() {
        let index = Index::from_bytes(&vector.bytes()).unwrap();
        let expected: Vec<(String, u32)> = vector
            .input
            .iter()
            .map(|p| {
                let (t, f) = parse_pair(p);
                (t.to_string(), f)
            })
            .collect();
        assert_eq!(entries(&index), expected, "vector {}", vector.id);
    }
}

#[test]
fn container_vectors_encode() {
    for vector in container_vectors() {
        let mut writer = ContainerWriter::new();
        for section in &vector.input {
            let (url, pairs) = section.split_once('=').unwrap();
            let mut tree = Vec::new();
            for pair in pairs.split(',').filter(|p| !p.is_empty()) {
                let (token, frequency) = parse_pair(pair);
                encode_record(token, frequency, &mut tree).unwrap();
            }
            writer.push_section(url, &tree).unwrap();
        }
        assert_eq!(hex_encode(&writer.finish()), hex_encode(&vector.bytes()), "vector {}", vector.id);
        assert_eq!(read_sections(&vector.bytes()).unwrap().len(), vector.input.len());
    }
}

#[test]
fn collection_writer_matches_vector() {
    let collection = IndexCollection::from_iter([(
        "a.com".to_string(),
        {
            let index = Index::new();
            index.put(WordEntry::with_frequency("cat", 2)).unwrap();
            index
        },
    )]);
    let vector = container_vectors()
        .into_iter()
        .find(|v| v.id == "container_one_document")
        .unwrap();
    assert_eq!(collection.to_bytes().unwrap(), vector.bytes());
}
