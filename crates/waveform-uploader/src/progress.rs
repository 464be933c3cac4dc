//! Chunked request body with progress reporting.
//!
//! The body is split into fixed-size chunks and handed to the transport as a
//! stream; the sink is called with 0-100 as each chunk is handed off. This is
//! transport-handoff progress, not acknowledgement progress: the terminal 100
//! for a successful upload is confirmed by the uploader once the response
//! arrives.

use bytes::Bytes;
use futures::stream;

use crate::direct::ItemProgressSink;

pub(crate) const DEFAULT_CHUNK_SIZE: usize = 256 * 1024;

/// Zero-copy split of `file` into `chunk_size` slices (last one may be short).
pub(crate) fn split_chunks(file: &Bytes, chunk_size: usize) -> Vec<Bytes> {
    let total = file.len();
    let chunk_size = chunk_size.max(1);
    (0..total)
        .step_by(chunk_size)
        .map(|start| file.slice(start..(start + chunk_size).min(total)))
        .collect()
}

pub(crate) fn percent_sent(sent: usize, total: usize) -> u8 {
    if total == 0 {
        100
    } else {
        ((sent * 100) / total).min(100) as u8
    }
}

/// Wrap `file` in a streaming body that reports cumulative progress through
/// `sink` as each chunk is pulled by the transport.
pub(crate) fn chunked_body(
    file: Bytes,
    chunk_size: usize,
    sink: Option<ItemProgressSink>,
) -> reqwest::Body {
    let total = file.len();
    if total == 0 {
        return reqwest::Body::from(file);
    }

    let mut sent = 0usize;
    let stream = stream::iter(split_chunks(&file, chunk_size).into_iter().map(move |chunk| {
        sent += chunk.len();
        if let Some(sink) = &sink {
            sink(percent_sent(sent, total));
        }
        Ok::<Bytes, std::io::Error>(chunk)
    }));

    reqwest::Body::wrap_stream(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_chunks_covers_whole_payload() {
        let file = Bytes::from(vec![7u8; 10]);
        let chunks = split_chunks(&file, 4);
        assert_eq!(
            chunks.iter().map(|c| c.len()).collect::<Vec<_>>(),
            vec![4, 4, 2]
        );
        let total: usize = chunks.iter().map(|c| c.len()).sum();
        assert_eq!(total, 10);
    }

    #[test]
    fn test_split_chunks_single_chunk_when_small() {
        let file = Bytes::from_static(b"abc");
        let chunks = split_chunks(&file, 1024);
        assert_eq!(chunks.len(), 1);
        assert_eq!(&chunks[0][..], b"abc");
    }

    #[test]
    fn test_percent_sent_reaches_exactly_100() {
        assert_eq!(percent_sent(4, 10), 40);
        assert_eq!(percent_sent(8, 10), 80);
        assert_eq!(percent_sent(10, 10), 100);
        assert_eq!(percent_sent(0, 0), 100);
    }
}
