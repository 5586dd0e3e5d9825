//! The distributed context threaded through every collective entry point.
//!
//! A [`GridComm`] bundles the world communicator with its row and column
//! sub-groups. Row and column sub-groups are reused across phases, so every
//! transition from row-axis to column-axis collectives (or back) must pass
//! through [`GridComm::phase_barrier`]; skipping it lets collectives of the two
//! sub-groups interleave on shared transport resources.

use crate::algs::communicator::{Communicator, NoComm};
use crate::partitioning::GridShape;
use crate::renumber_error::RenumberError;

pub struct GridComm<C: Communicator> {
    world: C,
    row: C,
    col: C,
    shape: GridShape,
}

impl<C: Communicator> GridComm<C> {
    /// Split `world` into row and column sub-groups (collective).
    ///
    /// World rank `r` sits at grid position `(r / cols, r % cols)`.
    pub fn new(world: C, rows: usize, cols: usize) -> Result<Self, RenumberError> {
        let shape = GridShape::new(rows, cols);
        if rows == 0 || cols == 0 || shape.size() != world.size() {
            return Err(RenumberError::GridShapeMismatch {
                rows,
                cols,
                size: world.size(),
            });
        }
        let rank = world.rank();
        let row = world.split(shape.row_of(rank), shape.col_of(rank))?;
        let col = world.split(rows + shape.col_of(rank), shape.row_of(rank))?;
        log::trace!(
            "rank {rank}: grid {rows}x{cols}, row rank {}, col rank {}",
            row.rank(),
            col.rank()
        );
        Ok(Self {
            world,
            row,
            col,
            shape,
        })
    }

    pub fn world(&self) -> &C {
        &self.world
    }

    /// Members sharing this process's row; size `cols`, rank = column index.
    pub fn row(&self) -> &C {
        &self.row
    }

    /// Members sharing this process's column; size `rows`, rank = row index.
    pub fn col(&self) -> &C {
        &self.col
    }

    pub fn shape(&self) -> GridShape {
        self.shape
    }

    pub fn rank(&self) -> usize {
        self.world.rank()
    }

    pub fn size(&self) -> usize {
        self.world.size()
    }

    pub fn row_rank(&self) -> usize {
        self.shape.row_of(self.world.rank())
    }

    pub fn col_rank(&self) -> usize {
        self.shape.col_of(self.world.rank())
    }

    /// Full-group barrier separating phases that switch sub-groups.
    pub fn phase_barrier(&self, label: &str) -> Result<(), RenumberError> {
        log::trace!("rank {}: barrier before {label}", self.world.rank());
        self.world.barrier()
    }
}

impl GridComm<NoComm> {
    /// The 1x1 context used in single-process mode.
    pub fn single() -> Self {
        Self {
            world: NoComm,
            row: NoComm,
            col: NoComm,
            shape: GridShape::single(),
        }
    }
}
