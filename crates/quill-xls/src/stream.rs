//! Record framing and stream buffers.
//!
//! A record is `[type: u16][length: u16][payload]`, all little-endian.
//! Payloads longer than [`MAX_RECORD_PAYLOAD`] spill into CONTINUE
//! records so that no single frame exceeds the cap.
//!
//! [`RecordStream`] buffers encoded records for one substream. Records
//! are appended as they are produced; headers whose contents are only
//! known at close time (the stream-begin record and anything that
//! depends on final offsets) are prepended afterwards, so the stream
//! keeps a prepend block list next to its append buffer and joins the
//! two when drained.

use crate::records;

/// Maximum payload bytes in a single record frame.
pub const MAX_RECORD_PAYLOAD: usize = 8224;

/// Frame `payload` as a leading `record_id` record plus as many CONTINUE
/// records as the cap requires, appending the frames to `out`. Returns
/// the number of bytes written.
///
/// An empty payload is a single bare 4-byte frame. A payload of exactly
/// [`MAX_RECORD_PAYLOAD`] bytes stays in one frame; a continuation frame
/// is only ever emitted with at least one payload byte.
pub fn encode_record_into(out: &mut Vec<u8>, record_id: u16, payload: &[u8]) -> usize {
    let start = out.len();
    let mut offset = 0;
    let mut id = record_id;
    loop {
        let chunk = (payload.len() - offset).min(MAX_RECORD_PAYLOAD);
        debug_assert!(chunk <= MAX_RECORD_PAYLOAD && chunk <= u16::MAX as usize);
        out.extend_from_slice(&id.to_le_bytes());
        out.extend_from_slice(&(chunk as u16).to_le_bytes());
        out.extend_from_slice(&payload[offset..offset + chunk]);
        offset += chunk;
        if offset == payload.len() {
            break;
        }
        id = records::CONTINUE;
    }
    out.len() - start
}

/// Frame `payload` as with [`encode_record_into`], returning the frames
/// as a fresh vector.
pub fn encode_record(record_id: u16, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 4 * frame_count(payload.len()));
    encode_record_into(&mut out, record_id, payload);
    out
}

fn frame_count(payload_len: usize) -> usize {
    if payload_len == 0 {
        1
    } else {
        (payload_len + MAX_RECORD_PAYLOAD - 1) / MAX_RECORD_PAYLOAD
    }
}

/// Buffered record stream for one substream.
#[derive(Debug, Default)]
pub struct RecordStream {
    /// Prepended blocks in push order; the newest sits at the back and
    /// is emitted first.
    head: Vec<Vec<u8>>,
    body: Vec<u8>,
    size: usize,
}

impl RecordStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame `payload` and append it at the end of the stream.
    pub fn append(&mut self, record_id: u16, payload: &[u8]) {
        let written = encode_record_into(&mut self.body, record_id, payload);
        self.size += written;
    }

    /// Frame `payload` and insert it at the front of the stream, ahead
    /// of everything already buffered including earlier prepends.
    pub fn prepend(&mut self, record_id: u16, payload: &[u8]) {
        let encoded = encode_record(record_id, payload);
        self.size += encoded.len();
        self.head.push(encoded);
    }

    /// Cumulative encoded byte count across every append and prepend.
    ///
    /// Grows monotonically and is not reduced by [`take_bytes`]; record
    /// offsets computed against it stay valid after the buffers drain.
    ///
    /// [`take_bytes`]: RecordStream::take_bytes
    pub fn len(&self) -> usize {
        self.size
    }

    /// True until the first append or prepend.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Currently buffered bytes, prepends first (most recent outermost),
    /// then appends in order. Non-draining: repeated calls see the same
    /// bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.buffered_len());
        for block in self.head.iter().rev() {
            out.extend_from_slice(block);
        }
        out.extend_from_slice(&self.body);
        out
    }

    /// Drain the buffered bytes in the same order as [`to_bytes`],
    /// leaving the stream's buffers empty. Draining an already-drained
    /// stream yields an empty vector. [`len`] is unaffected.
    ///
    /// [`to_bytes`]: RecordStream::to_bytes
    /// [`len`]: RecordStream::len
    pub fn take_bytes(&mut self) -> Vec<u8> {
        if self.head.is_empty() {
            return std::mem::take(&mut self.body);
        }
        let mut out = Vec::with_capacity(self.buffered_len());
        for block in self.head.drain(..).rev() {
            out.extend_from_slice(&block);
        }
        out.append(&mut self.body);
        out
    }

    /// Drain `other` and append its bytes after everything buffered
    /// here. Joins closed substreams into one document stream.
    pub fn append_stream(&mut self, mut other: RecordStream) {
        let bytes = other.take_bytes();
        self.size += bytes.len();
        self.body.extend_from_slice(&bytes);
    }

    /// Prepend the stream-begin record for `substream_kind` (one of the
    /// `records::BOF_*` subtypes). Done when the substream closes, so it
    /// lands ahead of every record already buffered.
    pub fn prepend_bof(&mut self, substream_kind: u16) {
        let mut payload = [0u8; 16];
        payload[0..2].copy_from_slice(&records::BIFF8_VERSION.to_le_bytes());
        payload[2..4].copy_from_slice(&substream_kind.to_le_bytes());
        payload[4..6].copy_from_slice(&records::BOF_BUILD_ID.to_le_bytes());
        payload[6..8].copy_from_slice(&records::BOF_BUILD_YEAR.to_le_bytes());
        payload[8..12].copy_from_slice(&records::BOF_FILE_HISTORY.to_le_bytes());
        payload[12..16].copy_from_slice(&records::BOF_LOWEST_VERSION.to_le_bytes());
        self.prepend(records::BOF, &payload);
    }

    /// Append the empty stream-end record.
    pub fn append_eof(&mut self) {
        self.append(records::EOF, &[]);
    }

    fn buffered_len(&self) -> usize {
        self.head.iter().map(Vec::len).sum::<usize>() + self.body.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Walk encoded frames, returning (type, payload) pairs.
    fn decode_frames(bytes: &[u8]) -> Vec<(u16, Vec<u8>)> {
        let mut frames = Vec::new();
        let mut pos = 0;
        while pos < bytes.len() {
            let id = u16::from_le_bytes([bytes[pos], bytes[pos + 1]]);
            let len = u16::from_le_bytes([bytes[pos + 2], bytes[pos + 3]]) as usize;
            frames.push((id, bytes[pos + 4..pos + 4 + len].to_vec()));
            pos += 4 + len;
        }
        frames
    }

    fn expected_encoded_len(payload_len: usize) -> usize {
        let frames = if payload_len == 0 {
            1
        } else {
            (payload_len + MAX_RECORD_PAYLOAD - 1) / MAX_RECORD_PAYLOAD
        };
        payload_len + 4 * frames
    }

    #[test]
    fn test_empty_payload_is_one_bare_frame() {
        assert_eq!(encode_record(0x0031, &[]), vec![0x31, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_payload_at_cap_stays_in_one_frame() {
        let payload = vec![0x5A; MAX_RECORD_PAYLOAD];
        let encoded = encode_record(0x00FC, &payload);
        assert_eq!(encoded.len(), MAX_RECORD_PAYLOAD + 4);
        let frames = decode_frames(&encoded);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].0, 0x00FC);
        assert_eq!(frames[0].1, payload);
    }

    #[test]
    fn test_payload_one_over_cap_splits_into_two_frames() {
        let mut payload = vec![0x11; MAX_RECORD_PAYLOAD];
        payload.push(0x99);
        let encoded = encode_record(0x00FC, &payload);
        assert_eq!(encoded.len(), MAX_RECORD_PAYLOAD + 1 + 8);

        let frames = decode_frames(&encoded);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].0, 0x00FC);
        assert_eq!(frames[0].1.len(), MAX_RECORD_PAYLOAD);
        assert_eq!(frames[1].0, records::CONTINUE);
        assert_eq!(frames[1].1, vec![0x99]);
    }

    #[test]
    fn test_long_payload_reassembles_across_continues() {
        let payload: Vec<u8> = (0..20_000).map(|i| (i % 256) as u8).collect();
        let encoded = encode_record(0x00FC, &payload);

        let frames = decode_frames(&encoded);
        assert_eq!(frames.len(), 3);
        assert!(frames.iter().skip(1).all(|f| f.0 == records::CONTINUE));
        assert!(frames.iter().all(|f| !f.1.is_empty()));

        let joined: Vec<u8> = frames.into_iter().flat_map(|f| f.1).collect();
        assert_eq!(joined, payload);
    }

    #[test]
    fn test_append_grows_len_by_encoded_size() {
        let mut stream = RecordStream::new();
        let mut expected = 0;
        for payload_len in [0, 1, 100, MAX_RECORD_PAYLOAD, MAX_RECORD_PAYLOAD + 1, 20_000] {
            stream.append(0x0200, &vec![0xAA; payload_len]);
            expected += expected_encoded_len(payload_len);
            assert_eq!(stream.len(), expected);
        }
    }

    #[test]
    fn test_prepends_stack_in_front() {
        let mut stream = RecordStream::new();
        stream.append(0x000B, b"B");
        stream.prepend(0x000A, b"A");
        stream.prepend(0x001A, b"Z");

        let frames = decode_frames(&stream.to_bytes());
        let order: Vec<u16> = frames.iter().map(|f| f.0).collect();
        assert_eq!(order, vec![0x001A, 0x000A, 0x000B]);
    }

    #[test]
    fn test_to_bytes_is_stable() {
        let mut stream = RecordStream::new();
        stream.append(0x0200, &[1, 2, 3]);
        stream.prepend(0x0031, &[4]);
        assert_eq!(stream.to_bytes(), stream.to_bytes());
    }

    #[test]
    fn test_take_bytes_drains_once() {
        let mut stream = RecordStream::new();
        stream.append(0x0200, &[1, 2, 3]);
        stream.prepend(0x0031, &[4]);
        let snapshot = stream.to_bytes();
        let len_before = stream.len();

        assert_eq!(stream.take_bytes(), snapshot);
        assert_eq!(stream.take_bytes(), Vec::<u8>::new());
        assert_eq!(stream.len(), len_before);
    }

    #[test]
    fn test_len_accumulates_across_drains() {
        let mut stream = RecordStream::new();
        stream.append(0x0200, &[0; 10]);
        let _ = stream.take_bytes();
        stream.append(0x0201, &[0; 6]);
        assert_eq!(stream.len(), (10 + 4) + (6 + 4));
        assert_eq!(stream.to_bytes().len(), 6 + 4);
    }

    #[test]
    fn test_bof_record_bytes() {
        let mut stream = RecordStream::new();
        stream.prepend_bof(records::BOF_WORKBOOK_GLOBALS);
        let bytes = stream.to_bytes();
        assert_eq!(
            bytes,
            vec![
                0x09, 0x08, 0x10, 0x00, // type 0x0809, length 16
                0x00, 0x06, // BIFF8
                0x05, 0x00, // workbook globals
                0xBB, 0x0D, // build id
                0xCC, 0x07, // build year
                0x41, 0x00, 0x00, 0x00, // file history flags
                0x06, 0x00, 0x00, 0x00, // lowest readable version
            ]
        );
    }

    #[test]
    fn test_eof_record_bytes() {
        let mut stream = RecordStream::new();
        stream.append_eof();
        assert_eq!(stream.to_bytes(), vec![0x0A, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_append_stream_joins_substreams_in_order() {
        let mut globals = RecordStream::new();
        globals.append_eof();
        globals.prepend_bof(records::BOF_WORKBOOK_GLOBALS);

        let mut sheet = RecordStream::new();
        sheet.append_eof();
        sheet.prepend_bof(records::BOF_WORKSHEET);

        let mut doc = RecordStream::new();
        let expected: Vec<u8> = [globals.to_bytes(), sheet.to_bytes()].concat();
        doc.append_stream(globals);
        doc.append_stream(sheet);

        assert_eq!(doc.to_bytes(), expected);
        assert_eq!(doc.len(), 2 * (20 + 4));
    }

    #[test]
    fn test_closed_stream_is_bookended() {
        let mut stream = RecordStream::new();
        stream.append(0x0085, &[0u8; 6]);
        stream.append_eof();
        stream.prepend_bof(records::BOF_WORKSHEET);

        let bytes = stream.to_bytes();
        assert_eq!(bytes.len(), 20 + 10 + 4);
        assert_eq!(&bytes[0..4], &[0x09, 0x08, 0x10, 0x00]);
        assert_eq!(&bytes[bytes.len() - 4..], &[0x0A, 0x00, 0x00, 0x00]);
    }
}
