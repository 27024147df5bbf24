//! Bounded packet queue between an async producer and the blocking
//! spectral worker.

use qrss_backend_spectrum::SampleSource;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::IntakeError;

/// Capacity of a sample queue, in packets.
pub const SAMPLE_QUEUE_PACKETS: usize = 64;

/// Receiving end of a sample queue.
///
/// Packets are drained in order. The stream ends when every sender has been
/// dropped and the queue is empty.
#[derive(Debug)]
pub struct SampleStream {
    rx: mpsc::Receiver<Vec<i16>>,
    pending: Vec<i16>,
    pos: usize,
}

impl SampleStream {
    pub fn new(rx: mpsc::Receiver<Vec<i16>>) -> Self {
        Self {
            rx,
            pending: Vec::new(),
            pos: 0,
        }
    }

    /// A fresh queue holding at most `capacity` packets.
    pub fn channel(capacity: usize) -> (mpsc::Sender<Vec<i16>>, SampleStream) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (tx, SampleStream::new(rx))
    }
}

impl SampleSource for SampleStream {
    /// Blocks the calling thread; only call from outside the async runtime
    /// (for example inside `spawn_blocking`).
    fn read(&mut self, out: &mut [f64]) -> usize {
        loop {
            if self.pos < self.pending.len() {
                let available = &self.pending[self.pos..];
                let n = available.len().min(out.len());
                for (slot, &s) in out.iter_mut().zip(&available[..n]) {
                    *slot = s as f64;
                }
                self.pos += n;
                return n;
            }
            match self.rx.blocking_recv() {
                Some(packet) => {
                    self.pending = packet;
                    self.pos = 0;
                }
                None => return 0,
            }
        }
    }
}

/// An opened intake: the sample stream plus the task feeding it.
///
/// The feeder resolves when recording is over, with the number of samples
/// it delivered.
#[derive(Debug)]
pub struct Capture {
    pub stream: SampleStream,
    pub feeder: JoinHandle<Result<u64, IntakeError>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_packets_drain_in_order_then_end() {
        let (tx, mut stream) = SampleStream::channel(4);
        tx.try_send(vec![1, 2, 3]).unwrap();
        tx.try_send(vec![]).unwrap();
        tx.try_send(vec![4, 5]).unwrap();
        drop(tx);

        let mut out = [0.0; 2];
        assert_eq!(stream.read(&mut out), 2);
        assert_eq!(out, [1.0, 2.0]);
        assert_eq!(stream.read(&mut out), 1);
        assert_eq!(out[0], 3.0);
        assert_eq!(stream.read(&mut out), 2);
        assert_eq!(out, [4.0, 5.0]);
        assert_eq!(stream.read(&mut out), 0);
    }
}
