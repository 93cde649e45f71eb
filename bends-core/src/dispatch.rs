//! Splits digests into transport-sized chunks and hands them to a [`DigestSink`].

use tracing::{error, info};

use crate::contract::DigestSink;
use crate::digest::PresentationBlock;

/// Largest number of blocks sent in one delivery. The chat transport
/// truncates payloads above this.
pub const MAX_BLOCKS_PER_MESSAGE: usize = 10;

/// Delivery counts for one or more dispatched digests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failed: usize,
}

impl DispatchReport {
    fn merge(&mut self, other: DispatchReport) {
        self.delivered += other.delivered;
        self.failed += other.failed;
    }
}

pub struct DigestDispatcher<'s, S: ?Sized> {
    sink: &'s S,
    max_blocks: usize,
}

impl<'s, S: DigestSink + ?Sized> DigestDispatcher<'s, S> {
    pub fn new(sink: &'s S) -> Self {
        Self {
            sink,
            max_blocks: MAX_BLOCKS_PER_MESSAGE,
        }
    }

    pub fn with_max_blocks(mut self, max_blocks: usize) -> Self {
        self.max_blocks = max_blocks.max(1);
        self
    }

    /// Send `blocks` to `team` in consecutive chunks.
    ///
    /// Chunks are cut purely by position. A failed chunk is logged and the
    /// remaining chunks are still sent.
    pub async fn dispatch(&self, team: &str, blocks: &[PresentationBlock]) -> DispatchReport {
        let mut report = DispatchReport::default();
        for (index, chunk) in blocks.chunks(self.max_blocks).enumerate() {
            match self.sink.deliver(team, chunk.to_vec()).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    error!(team, chunk = index, error = %e, "Error posting digest chunk");
                    report.failed += 1;
                }
            }
        }
        report
    }

    /// Dispatch several digests in the given order.
    pub async fn dispatch_all(&self, digests: &[(String, Vec<PresentationBlock>)]) -> DispatchReport {
        info!(digests = digests.len(), "Posting summaries");
        let mut report = DispatchReport::default();
        for (team, blocks) in digests {
            report.merge(self.dispatch(team, blocks).await);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::MockDigestSink;
    use mockall::Sequence;

    fn blocks(n: usize) -> Vec<PresentationBlock> {
        (0..n).map(|i| PresentationBlock::section(format!("block {i}"))).collect()
    }

    #[tokio::test]
    async fn splits_into_chunks_of_ten() {
        let mut sink = MockDigestSink::new();
        let mut seq = Sequence::new();
        for expected in [10usize, 10, 3] {
            sink.expect_deliver()
                .times(1)
                .in_sequence(&mut seq)
                .withf(move |team, chunk| team.to_string() == "core" && chunk.len() == expected)
                .returning(|_, _| Ok(()));
        }

        let report = DigestDispatcher::new(&sink).dispatch("core", &blocks(23)).await;
        assert_eq!(report, DispatchReport { delivered: 3, failed: 0 });
    }

    #[tokio::test]
    async fn failed_chunk_does_not_stop_the_rest() {
        let mut sink = MockDigestSink::new();
        let mut seq = Sequence::new();
        sink.expect_deliver()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err("webhook returned 500".into()));
        sink.expect_deliver()
            .times(1)
            .in_sequence(&mut seq)
            .withf(|_, chunk| chunk[0].text() == Some("block 10"))
            .returning(|_, _| Ok(()));

        let report = DigestDispatcher::new(&sink).dispatch("core", &blocks(12)).await;
        assert_eq!(report, DispatchReport { delivered: 1, failed: 1 });
    }

    #[tokio::test]
    async fn empty_digest_sends_nothing() {
        let sink = MockDigestSink::new();
        let report = DigestDispatcher::new(&sink).dispatch("core", &[]).await;
        assert_eq!(report, DispatchReport::default());
    }
}
