//! Thin façade over single-process, in-process (threads) or inter-process
//! (MPI) collective communication.
//!
//! Messages are *contiguous byte slices*. Every operation here is a blocking
//! collective: all members of the communicator must call the same operations
//! in the same order, or the group stalls. There are no timeouts.
//!
//! A backend implements one data-moving primitive, [`Communicator::all_to_all_bytes`],
//! plus `barrier` and `split`. Gather, all-gather, broadcast and scatter are
//! provided on top of it; backends with native versions may override them.

use crate::algs::wire::{decode, encode};
use crate::renumber_error::RenumberError;
use dashmap::DashMap;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;

/// Blocking collective communication interface.
pub trait Communicator: Sized {
    fn rank(&self) -> usize;
    fn size(&self) -> usize;

    /// Personalized exchange: `sends[d]` goes to member `d`; the result holds
    /// one buffer per source member, in rank order.
    fn all_to_all_bytes(&self, sends: Vec<Vec<u8>>) -> Result<Vec<Vec<u8>>, RenumberError>;

    /// Block until every member has entered the barrier.
    fn barrier(&self) -> Result<(), RenumberError>;

    /// Partition the group by `color`; members are ordered by `(key, rank)`.
    fn split(&self, color: usize, key: usize) -> Result<Self, RenumberError>;

    fn is_single(&self) -> bool {
        self.size() == 1
    }

    fn all_gather_bytes(&self, buf: &[u8]) -> Result<Vec<Vec<u8>>, RenumberError> {
        self.all_to_all_bytes(vec![buf.to_vec(); self.size()])
    }

    /// Gather to `root`; non-root members receive `None`.
    fn gather_bytes(&self, root: usize, buf: &[u8]) -> Result<Option<Vec<Vec<u8>>>, RenumberError> {
        let mut sends = vec![Vec::new(); self.size()];
        sends[root] = buf.to_vec();
        let recv = self.all_to_all_bytes(sends)?;
        Ok((self.rank() == root).then_some(recv))
    }

    /// Broadcast `buf` from `root`; the argument is ignored on other members.
    fn broadcast_bytes(&self, root: usize, buf: &[u8]) -> Result<Vec<u8>, RenumberError> {
        let sends = if self.rank() == root {
            vec![buf.to_vec(); self.size()]
        } else {
            vec![Vec::new(); self.size()]
        };
        let mut recv = self.all_to_all_bytes(sends)?;
        Ok(std::mem::take(&mut recv[root]))
    }

    /// Scatter one buffer per member from `root`.
    ///
    /// Every buffer travels behind a status byte, so a root holding the wrong
    /// number of buffers still joins the exchange and the other members
    /// return `RemoteFailure` instead of waiting on it.
    fn scatter_bytes(&self, root: usize, bufs: Vec<Vec<u8>>) -> Result<Vec<u8>, RenumberError> {
        let size = self.size();
        let mut local_err = None;
        let sends = if self.rank() == root {
            if bufs.len() == size {
                bufs.into_iter()
                    .map(|b| {
                        let mut framed = Vec::with_capacity(b.len() + 1);
                        framed.push(SCATTER_OK);
                        framed.extend_from_slice(&b);
                        framed
                    })
                    .collect()
            } else {
                local_err = Some(RenumberError::CommError {
                    neighbor: root,
                    message: format!("scatter needs {size} buffers, got {}", bufs.len()),
                });
                vec![vec![SCATTER_FAILED]; size]
            }
        } else {
            vec![Vec::new(); size]
        };
        let mut recv = self.all_to_all_bytes(sends)?;
        if let Some(e) = local_err {
            return Err(e);
        }
        let mut framed = std::mem::take(&mut recv[root]);
        match framed.first() {
            Some(&SCATTER_OK) => {
                framed.remove(0);
                Ok(framed)
            }
            Some(&SCATTER_FAILED) => Err(RenumberError::RemoteFailure { ranks: vec![root] }),
            _ => Err(RenumberError::CommError {
                neighbor: root,
                message: "scatter buffer without status byte".into(),
            }),
        }
    }
}

const SCATTER_OK: u8 = 0;
const SCATTER_FAILED: u8 = 1;

/// Size-1 communicator for single-process mode and serial unit tests.
#[derive(Clone, Debug, Default)]
pub struct NoComm;

impl Communicator for NoComm {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn all_to_all_bytes(&self, sends: Vec<Vec<u8>>) -> Result<Vec<Vec<u8>>, RenumberError> {
        if sends.len() != 1 {
            return Err(RenumberError::CommError {
                neighbor: 0,
                message: format!("expected 1 send buffer, got {}", sends.len()),
            });
        }
        Ok(sends)
    }

    fn barrier(&self) -> Result<(), RenumberError> {
        Ok(())
    }

    fn split(&self, _color: usize, _key: usize) -> Result<Self, RenumberError> {
        Ok(NoComm)
    }
}

// --- ThreadComm: intra-process / one thread per member ---

#[derive(Default)]
struct RoundState {
    /// `slots[dst][src]`
    slots: Vec<Vec<Vec<u8>>>,
    arrived: usize,
    departed: usize,
    draining: bool,
    generation: u64,
}

struct Rendezvous {
    size: usize,
    state: Mutex<RoundState>,
    cv: Condvar,
    /// Sub-groups created by `split`, keyed by (round generation, color).
    splits: DashMap<(u64, usize), Arc<Rendezvous>>,
}

impl Rendezvous {
    fn new(size: usize) -> Self {
        Self {
            size,
            state: Mutex::new(RoundState {
                slots: vec![vec![Vec::new(); size]; size],
                ..RoundState::default()
            }),
            cv: Condvar::new(),
            splits: DashMap::new(),
        }
    }
}

/// In-process communicator: members are threads sharing one rendezvous.
#[derive(Clone)]
pub struct ThreadComm {
    rank: usize,
    shared: Arc<Rendezvous>,
}

impl std::fmt::Debug for ThreadComm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadComm")
            .field("rank", &self.rank)
            .field("size", &self.shared.size)
            .finish()
    }
}

impl ThreadComm {
    /// One handle per member of a fresh `n`-member group.
    pub fn group(n: usize) -> Vec<ThreadComm> {
        let shared = Arc::new(Rendezvous::new(n));
        (0..n)
            .map(|rank| ThreadComm {
                rank,
                shared: shared.clone(),
            })
            .collect()
    }

    /// Run `f` on `n` scoped threads, one per member, and collect results by rank.
    pub fn run<R, F>(n: usize, f: F) -> Vec<R>
    where
        R: Send,
        F: Fn(ThreadComm) -> R + Sync,
    {
        let f = &f;
        std::thread::scope(|s| {
            let handles: Vec<_> = Self::group(n)
                .into_iter()
                .map(|comm| s.spawn(move || f(comm)))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                .collect()
        })
    }

    fn exchange(&self, sends: Vec<Vec<u8>>) -> (u64, Vec<Vec<u8>>) {
        let shared = &*self.shared;
        let mut st = shared.state.lock();
        while st.draining {
            shared.cv.wait(&mut st);
        }
        for (dst, buf) in sends.into_iter().enumerate() {
            st.slots[dst][self.rank] = buf;
        }
        st.arrived += 1;
        let generation = st.generation;
        if st.arrived == shared.size {
            st.draining = true;
            shared.cv.notify_all();
        } else {
            while !(st.draining && st.generation == generation) {
                shared.cv.wait(&mut st);
            }
        }
        let out = std::mem::replace(&mut st.slots[self.rank], vec![Vec::new(); shared.size]);
        st.departed += 1;
        if st.departed == shared.size {
            st.arrived = 0;
            st.departed = 0;
            st.draining = false;
            st.generation += 1;
            shared.cv.notify_all();
        }
        (generation, out)
    }
}

impl Communicator for ThreadComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.shared.size
    }

    fn all_to_all_bytes(&self, sends: Vec<Vec<u8>>) -> Result<Vec<Vec<u8>>, RenumberError> {
        if sends.len() != self.shared.size {
            return Err(RenumberError::CommError {
                neighbor: self.rank,
                message: format!(
                    "expected {} send buffers, got {}",
                    self.shared.size,
                    sends.len()
                ),
            });
        }
        Ok(self.exchange(sends).1)
    }

    fn barrier(&self) -> Result<(), RenumberError> {
        self.exchange(vec![Vec::new(); self.shared.size]);
        Ok(())
    }

    fn split(&self, color: usize, key: usize) -> Result<Self, RenumberError> {
        let mine = encode(&[color as u64, key as u64]);
        let (generation, all) = self.exchange(vec![mine; self.shared.size]);
        let mut members = Vec::new();
        for (src, bytes) in all.iter().enumerate() {
            let ck = decode::<u64>(bytes)?;
            if ck.len() != 2 {
                return Err(RenumberError::CommError {
                    neighbor: src,
                    message: "malformed split request".into(),
                });
            }
            if ck[0] as usize == color {
                members.push((ck[1] as usize, src));
            }
        }
        members.sort_unstable();
        let rank = members
            .iter()
            .position(|&(_, src)| src == self.rank)
            .ok_or_else(|| RenumberError::CommError {
                neighbor: self.rank,
                message: "member missing from its own split".into(),
            })?;
        let shared = self
            .shared
            .splits
            .entry((generation, color))
            .or_insert_with(|| Arc::new(Rendezvous::new(members.len())))
            .value()
            .clone();
        Ok(ThreadComm { rank, shared })
    }
}

// --- MPI backend (feature = "mpi-support") ---
#[cfg(feature = "mpi-support")]
mod mpi_backend {
    use super::*;
    use mpi::datatype::{Partition, PartitionMut};
    use mpi::environment::Universe;
    use mpi::topology::{Color, SimpleCommunicator};
    use mpi::traits::*;
    use mpi::Count;
    use std::rc::Rc;

    pub struct MpiComm {
        comm: SimpleCommunicator,
        _universe: Rc<Universe>,
    }

    impl MpiComm {
        /// Initialize MPI and wrap the world communicator.
        pub fn new() -> Option<Self> {
            let universe = mpi::initialize()?;
            let comm = universe.world();
            Some(Self {
                comm,
                _universe: Rc::new(universe),
            })
        }
    }

    fn displacements(counts: &[Count]) -> Vec<Count> {
        counts
            .iter()
            .scan(0, |acc, &c| {
                let d = *acc;
                *acc += c;
                Some(d)
            })
            .collect()
    }

    impl Communicator for MpiComm {
        fn rank(&self) -> usize {
            self.comm.rank() as usize
        }

        fn size(&self) -> usize {
            self.comm.size() as usize
        }

        fn all_to_all_bytes(&self, sends: Vec<Vec<u8>>) -> Result<Vec<Vec<u8>>, RenumberError> {
            let send_counts: Vec<Count> = sends.iter().map(|b| b.len() as Count).collect();
            let mut recv_counts = vec![0 as Count; self.size()];
            self.comm
                .all_to_all_into(&send_counts[..], &mut recv_counts[..]);
            let send_displs = displacements(&send_counts);
            let recv_displs = displacements(&recv_counts);
            let send_buf = sends.concat();
            let total: usize = recv_counts.iter().map(|&c| c as usize).sum();
            let mut recv_buf = vec![0u8; total];
            {
                let send_part = Partition::new(&send_buf[..], &send_counts[..], &send_displs[..]);
                let mut recv_part =
                    PartitionMut::new(&mut recv_buf[..], &recv_counts[..], &recv_displs[..]);
                self.comm.all_to_all_varcount_into(&send_part, &mut recv_part);
            }
            Ok(recv_counts
                .iter()
                .zip(&recv_displs)
                .map(|(&c, &d)| recv_buf[d as usize..(d + c) as usize].to_vec())
                .collect())
        }

        fn barrier(&self) -> Result<(), RenumberError> {
            self.comm.barrier();
            Ok(())
        }

        fn split(&self, color: usize, key: usize) -> Result<Self, RenumberError> {
            let comm = self
                .comm
                .split_by_color_with_key(Color::with_value(color as i32), key as i32)
                .ok_or_else(|| RenumberError::CommError {
                    neighbor: self.rank(),
                    message: format!("split by color {color} returned no communicator"),
                })?;
            Ok(Self {
                comm,
                _universe: self._universe.clone(),
            })
        }

        fn broadcast_bytes(&self, root: usize, buf: &[u8]) -> Result<Vec<u8>, RenumberError> {
            let root_proc = self.comm.process_at_rank(root as i32);
            let mut len = buf.len() as u64;
            root_proc.broadcast_into(&mut len);
            let mut out = if self.rank() == root {
                buf.to_vec()
            } else {
                vec![0u8; len as usize]
            };
            root_proc.broadcast_into(&mut out[..]);
            Ok(out)
        }
    }
}

#[cfg(feature = "mpi-support")]
pub use mpi_backend::MpiComm;
