use proptest::prelude::*;

use crate::records;
use crate::stream::{encode_record, RecordStream, MAX_RECORD_PAYLOAD};

/// Walk encoded frames, checking the continuation structure, and
/// reassemble the payload.
fn reassemble(bytes: &[u8]) -> (u16, Vec<u8>) {
    let mut payload = Vec::new();
    let mut lead_id = None;
    let mut pos = 0;
    while pos < bytes.len() {
        let id = u16::from_le_bytes([bytes[pos], bytes[pos + 1]]);
        let len = u16::from_le_bytes([bytes[pos + 2], bytes[pos + 3]]) as usize;
        assert!(len <= MAX_RECORD_PAYLOAD, "frame over the cap");
        match lead_id {
            None => lead_id = Some(id),
            Some(_) => {
                assert_eq!(id, records::CONTINUE, "trailing frame must be CONTINUE");
                assert!(len > 0, "zero-length continuation frame");
            }
        }
        payload.extend_from_slice(&bytes[pos + 4..pos + 4 + len]);
        pos += 4 + len;
    }
    assert_eq!(pos, bytes.len(), "trailing garbage after last frame");
    (lead_id.expect("at least one frame"), payload)
}

proptest! {
    #[test]
    fn prop_framing_round_trips(
        id in any::<u16>(),
        payload in proptest::collection::vec(any::<u8>(), 0..40_000),
    ) {
        let encoded = encode_record(id, &payload);
        let (decoded_id, decoded) = reassemble(&encoded);
        prop_assert_eq!(decoded_id, id);
        prop_assert_eq!(decoded, payload);
    }

    #[test]
    fn prop_append_len_matches_size_formula(
        payload in proptest::collection::vec(any::<u8>(), 0..40_000),
    ) {
        let mut stream = RecordStream::new();
        stream.append(0x00FC, &payload);

        let frames = if payload.is_empty() {
            1
        } else {
            (payload.len() + MAX_RECORD_PAYLOAD - 1) / MAX_RECORD_PAYLOAD
        };
        prop_assert_eq!(stream.len(), payload.len() + 4 * frames);
    }

    #[test]
    fn prop_drain_matches_snapshot_and_empties(
        payloads in proptest::collection::vec(
            proptest::collection::vec(any::<u8>(), 0..200),
            1..8,
        ),
        prepend_mask in any::<u8>(),
    ) {
        let mut stream = RecordStream::new();
        for (i, payload) in payloads.iter().enumerate() {
            if prepend_mask & (1 << (i % 8)) != 0 {
                stream.prepend(0x0200 + i as u16, payload);
            } else {
                stream.append(0x0200 + i as u16, payload);
            }
        }

        let snapshot = stream.to_bytes();
        prop_assert_eq!(&stream.to_bytes(), &snapshot);
        prop_assert_eq!(stream.take_bytes(), snapshot);
        prop_assert_eq!(stream.take_bytes(), Vec::<u8>::new());
    }
}
