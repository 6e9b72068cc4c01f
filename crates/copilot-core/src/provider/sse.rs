//! Line-buffering parser for Server-Sent Events.
//!
//! TCP chunk boundaries do not line up with SSE event boundaries: one chunk
//! may carry several events, and one event's JSON payload may arrive split
//! across two chunks.  The buffer accumulates bytes and only emits payloads
//! for complete `data:` lines.  `event:`/`id:`/`retry:` fields and comment
//! lines are skipped; the Anthropic stream repeats the event type inside the
//! JSON payload, so the `data:` lines carry everything needed.

/// A complete `data:` payload with the prefix stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseData(pub String);

#[derive(Debug, Default)]
pub struct SseLineBuffer {
    // Raw bytes; a chunk boundary can fall inside a multi-byte UTF-8
    // character, so decoding happens per complete line, never per chunk.
    buffer: Vec<u8>,
}

impl SseLineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one network chunk; returns the payloads of every complete
    /// `data:` line it finished.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<SseData> {
        self.buffer.extend_from_slice(bytes);

        let mut out = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let line_bytes: Vec<u8> = self.buffer.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&line_bytes);
            let line = line.trim_end_matches(['\n', '\r']);

            if let Some(data) = line.strip_prefix("data:") {
                let data = data.strip_prefix(' ').unwrap_or(data);
                if !data.is_empty() {
                    out.push(SseData(data.to_owned()));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn multiple_events_in_one_chunk() {
        let mut buf = SseLineBuffer::new();
        let events = buf.feed(b"event: a\ndata: {\"x\":1}\n\nevent: b\ndata: {\"x\":2}\n\n");
        assert_eq!(events, vec![SseData("{\"x\":1}".into()), SseData("{\"x\":2}".into())]);
    }

    #[test]
    fn payload_split_across_chunks() {
        let mut buf = SseLineBuffer::new();
        assert!(buf.feed(b"data: {\"text\":\"hel").is_empty());
        let events = buf.feed(b"lo\"}\n");
        assert_eq!(events, vec![SseData("{\"text\":\"hello\"}".into())]);
    }

    #[test]
    fn non_data_fields_are_skipped() {
        let mut buf = SseLineBuffer::new();
        let events = buf.feed(b": keepalive\nid: 7\nretry: 100\ndata: payload\n");
        assert_eq!(events, vec![SseData("payload".into())]);
    }

    #[test]
    fn multibyte_character_split_across_chunks() {
        // "café" with the chunk boundary inside the two-byte 'é'.
        let whole = "data: caf\u{e9}\n".as_bytes();
        let (head, tail) = whole.split_at(10);

        let mut buf = SseLineBuffer::new();
        assert!(buf.feed(head).is_empty());
        let events = buf.feed(tail);
        assert_eq!(events, vec![SseData("caf\u{e9}".into())]);
    }

    #[test]
    fn crlf_line_endings() {
        let mut buf = SseLineBuffer::new();
        let events = buf.feed(b"data: one\r\ndata: two\r\n");
        assert_eq!(events, vec![SseData("one".into()), SseData("two".into())]);
    }
}
