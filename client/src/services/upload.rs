use bytes::Bytes;
use futures_util::stream::{self, Stream};
use tokio::sync::mpsc::UnboundedSender;

/// Upload payloads are handed to the transport in chunks of this size so
/// progress can be observed while the transfer is in flight.
const CHUNK_SIZE: usize = 64 * 1024;

/// Wrap an upload payload in a chunked byte stream that reports
/// `floor(bytes_sent * 100 / bytes_total)` on `progress` as each chunk is
/// pulled by the transport.
///
/// Percentages are cumulative and therefore non-decreasing; an empty payload
/// produces no progress events at all. The receiver may be dropped at any
/// time (view teardown); progress is informative only, so failed sends are
/// ignored and never abort the transfer.
pub(crate) fn progress_stream(
    data: Bytes,
    progress: UnboundedSender<u8>,
) -> impl Stream<Item = Result<Bytes, std::io::Error>> {
    let total = data.len() as u64;
    stream::unfold((data, 0usize, progress), move |(data, offset, progress)| async move {
        if offset >= data.len() {
            return None;
        }
        let end = usize::min(offset + CHUNK_SIZE, data.len());
        let chunk = data.slice(offset..end);
        let percent = (end as u64 * 100 / total) as u8;
        let _ = progress.send(percent);
        Some((Ok(chunk), (data, end, progress)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use tokio::sync::mpsc;

    async fn run(data: Bytes) -> (Vec<Bytes>, Vec<u8>) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let chunks: Vec<Bytes> = progress_stream(data, tx)
            .map(|chunk| chunk.unwrap())
            .collect()
            .await;
        let mut events = Vec::new();
        while let Ok(percent) = rx.try_recv() {
            events.push(percent);
        }
        (chunks, events)
    }

    #[tokio::test]
    async fn test_progress_is_monotonic_and_ends_at_100() {
        let data = Bytes::from(vec![7u8; CHUNK_SIZE * 3 + 500]);
        let (chunks, events) = run(data.clone()).await;

        let reassembled: Vec<u8> = chunks.iter().flat_map(|c| c.to_vec()).collect();
        assert_eq!(reassembled.len(), data.len());
        assert_eq!(chunks.len(), 4);
        assert_eq!(events.len(), 4);
        assert!(events.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(*events.last().unwrap(), 100);
    }

    #[tokio::test]
    async fn test_single_chunk_payload_reports_100() {
        let (chunks, events) = run(Bytes::from_static(b"small")).await;
        assert_eq!(chunks.len(), 1);
        assert_eq!(events, vec![100]);
    }

    #[tokio::test]
    async fn test_empty_payload_emits_no_progress() {
        let (chunks, events) = run(Bytes::new()).await;
        assert!(chunks.is_empty());
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_percent_uses_floor() {
        // 3 chunks of a payload that is not an even multiple: the first
        // chunk is 64 KiB of 150 000 bytes -> floor(43.69) = 43.
        let data = Bytes::from(vec![0u8; 150_000]);
        let (_, events) = run(data).await;
        assert_eq!(events, vec![43, 87, 100]);
    }

    #[tokio::test]
    async fn test_dropped_receiver_does_not_stop_the_stream() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let chunks: Vec<_> = progress_stream(Bytes::from(vec![1u8; CHUNK_SIZE * 2]), tx)
            .collect()
            .await;
        assert_eq!(chunks.len(), 2);
    }
}
