use parking_lot::RwLock;
use std::sync::{Arc, Barrier};

/// One worker's endpoint of the group transport. Every exchange is a
/// symmetric rendezvous: each endpoint contributes a fixed-size block
/// and leaves with the concatenation of all blocks in rank order.
///
/// All endpoints must issue the same sequence of calls with the same
/// payload sizes. An endpoint that diverges stalls the whole group at
/// the barrier; there is no recovery, the run has to be torn down.
pub struct Collective {
    rank: usize,
    size: usize,
    barrier: Arc<Barrier>,
    ints: Arc<RwLock<Vec<i32>>>,
    reals: Arc<RwLock<Vec<f64>>>,
}

impl Collective {
    /// Builds the connected endpoints of a group of `size` workers, in
    /// rank order. Staging space is allocated once up front: `int_slots`
    /// integers and `real_slots` doubles, sized for the largest payloads
    /// the callers will ever exchange.
    pub fn connect(size: usize, int_slots: usize, real_slots: usize) -> Vec<Collective> {
        assert!(size > 0);
        let barrier = Arc::new(Barrier::new(size));
        let ints = Arc::new(RwLock::new(vec![0; int_slots]));
        let reals = Arc::new(RwLock::new(vec![0.0; real_slots]));
        (0..size)
            .map(|rank| Collective {
                rank,
                size,
                barrier: Arc::clone(&barrier),
                ints: Arc::clone(&ints),
                reals: Arc::clone(&reals),
            })
            .collect()
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Contributes `send` and fills `recv` with every worker's block in
    /// rank order. `recv` must be exactly `size` blocks long.
    pub fn all_gather_ints(&self, send: &[i32], recv: &mut [i32]) {
        debug_assert_eq!(send.len() * self.size, recv.len());
        {
            let mut stage = self.ints.write();
            debug_assert!(recv.len() <= stage.len());
            stage[self.rank * send.len()..(self.rank + 1) * send.len()].copy_from_slice(send);
        }
        self.barrier.wait();
        {
            let stage = self.ints.read();
            recv.copy_from_slice(&stage[..recv.len()]);
        }
        // Nobody may start the next exchange before everyone has read.
        self.barrier.wait();
    }

    /// Same rendezvous for double payloads.
    pub fn all_gather_reals(&self, send: &[f64], recv: &mut [f64]) {
        debug_assert_eq!(send.len() * self.size, recv.len());
        {
            let mut stage = self.reals.write();
            debug_assert!(recv.len() <= stage.len());
            stage[self.rank * send.len()..(self.rank + 1) * send.len()].copy_from_slice(send);
        }
        self.barrier.wait();
        {
            let stage = self.reals.read();
            recv.copy_from_slice(&stage[..recv.len()]);
        }
        self.barrier.wait();
    }

    /// Publishes the root's buffer to every endpoint; the other workers
    /// overwrite their local copy, the root's is left untouched.
    pub fn broadcast_reals(&self, root: usize, buffer: &mut [f64]) {
        debug_assert!(root < self.size);
        if self.rank == root {
            let mut stage = self.reals.write();
            debug_assert!(buffer.len() <= stage.len());
            stage[..buffer.len()].copy_from_slice(buffer);
        }
        self.barrier.wait();
        if self.rank != root {
            let stage = self.reals.read();
            buffer.copy_from_slice(&stage[..buffer.len()]);
        }
        self.barrier.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_all_gather_ints_concatenates_in_rank_order() {
        let endpoints = Collective::connect(3, 6, 0);
        let results: Vec<Vec<i32>> = thread::scope(|scope| {
            let handles: Vec<_> = endpoints
                .iter()
                .map(|link| {
                    scope.spawn(move || {
                        let send = [link.rank() as i32 * 10, link.rank() as i32 * 10 + 1];
                        let mut recv = [0i32; 6];
                        link.all_gather_ints(&send, &mut recv);
                        recv.to_vec()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        for recv in &results {
            assert_eq!(recv, &vec![0, 1, 10, 11, 20, 21]);
        }
    }

    #[test]
    fn test_all_gather_reals_is_reusable() {
        // Two back-to-back exchanges through the same staging buffer.
        let endpoints = Collective::connect(2, 0, 2);
        let results: Vec<(Vec<f64>, Vec<f64>)> = thread::scope(|scope| {
            let handles: Vec<_> = endpoints
                .iter()
                .map(|link| {
                    scope.spawn(move || {
                        let mut first = [0.0f64; 2];
                        let mut second = [0.0f64; 2];
                        link.all_gather_reals(&[link.rank() as f64], &mut first);
                        link.all_gather_reals(&[link.rank() as f64 + 0.5], &mut second);
                        (first.to_vec(), second.to_vec())
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        for (first, second) in &results {
            assert_eq!(first, &vec![0.0, 1.0]);
            assert_eq!(second, &vec![0.5, 1.5]);
        }
    }

    #[test]
    fn test_broadcast_reaches_every_worker() {
        let endpoints = Collective::connect(3, 0, 4);
        let results: Vec<Vec<f64>> = thread::scope(|scope| {
            let handles: Vec<_> = endpoints
                .iter()
                .map(|link| {
                    scope.spawn(move || {
                        let mut buffer = if link.rank() == 0 {
                            vec![1.0, 2.0, 3.0, 4.0]
                        } else {
                            vec![0.0; 4]
                        };
                        link.broadcast_reals(0, &mut buffer);
                        buffer
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        for buffer in &results {
            assert_eq!(buffer, &vec![1.0, 2.0, 3.0, 4.0]);
        }
    }
}
