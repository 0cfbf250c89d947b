use tracing::debug;

use crate::config::{EcalParameters, ParameterSet};
use crate::error::Result;
use crate::geometry::{BoxShape, Material, Tube};
use crate::math::Vector3;
use crate::tree::{GridIndex, Placement, Sensitive, VolumeId, VolumeKey, VolumeNode, VolumeStore};

/// Placements produced by [`BuildBlocks`], ready to be put in the world.
#[derive(Debug, Clone)]
pub struct BlockLayout {
    /// One placement per block, row-major in `(i, j)`.
    pub blocks: Vec<Placement>,
    /// Glue inside each 2x2 module between rows `2p` and `2p + 1`.
    pub horizontal_glue: Vec<Placement>,
    /// Glue inside each 2x2 module between columns `2q` and `2q + 1`.
    pub vertical_glue: Vec<Placement>,
}

/// Lays out the M x M grid of fiber blocks, their glue and fiber lattices.
///
/// Blocks are bonded in 2x2 modules: a glue layer separates the two rows
/// and the two columns of a module, and the clearance gap separates
/// neighbouring modules. Every block holds `rows x cols` fibers, each a
/// cladding shell around a sensitive core, with odd rows shifted by half a
/// fiber pitch.
pub struct BuildBlocks<'a> {
    params: &'a ParameterSet,
}

impl<'a> BuildBlocks<'a> {
    /// Creates a new `BuildBlocks` operation.
    #[must_use]
    pub fn new(params: &'a ParameterSet) -> Self {
        Self { params }
    }

    /// World position of the centre of block `(0, 0)`.
    ///
    /// The section's top-left corner is anchored `anchor_towers` tower
    /// pitches from the beam axis, inset by the clearance gap.
    #[must_use]
    pub fn first_block_center(&self) -> Vector3 {
        let ecal = &self.params.ecal;
        let hcal = &self.params.hcal;
        Vector3::new(
            -ecal.anchor_towers * hcal.pitch_x + ecal.block_x / 2.0 + ecal.clearance_gap,
            ecal.anchor_towers * hcal.pitch_y - ecal.block_y / 2.0 - ecal.clearance_gap,
            0.0,
        )
    }

    /// World position of the centre of block `index`.
    #[must_use]
    pub fn block_center(&self, index: GridIndex) -> Vector3 {
        let ecal = &self.params.ecal;
        let origin = self.first_block_center();
        Vector3::new(
            origin.x + module_offset(index.i, ecal.block_x, ecal),
            origin.y - module_offset(index.j, ecal.block_y, ecal),
            0.0,
        )
    }

    /// Position of fiber `(row, col)` in its block's frame.
    #[must_use]
    pub fn fiber_center(ecal: &EcalParameters, row: u32, col: u32) -> Vector3 {
        let stagger = if row % 2 == 1 {
            ecal.fiber_pitch / 2.0
        } else {
            0.0
        };
        Vector3::new(
            ecal.block_x / 2.0 - ecal.fiber_offset_x - stagger - f64::from(col) * ecal.fiber_pitch,
            ecal.block_y / 2.0 - ecal.fiber_offset_y - f64::from(row) * ecal.fiber_row_spacing,
            0.0,
        )
    }

    /// Executes the operation, adding every block, glue and fiber volume to
    /// the store.
    ///
    /// # Errors
    ///
    /// Returns a configuration error, before touching the store, if the
    /// parameters are invalid. Returns a tree error if a volume key is
    /// already taken in the store.
    pub fn execute(&self, store: &mut VolumeStore) -> Result<BlockLayout> {
        self.params.validate()?;
        let ecal = &self.params.ecal;
        let m = ecal.block_count;

        let mut blocks = Vec::with_capacity((m * m) as usize);
        for index in GridIndex::grid(m) {
            let block = store.add_volume(VolumeNode::new(
                VolumeKey::Block(index),
                BoxShape::from_size(ecal.block_x, ecal.block_y, ecal.thickness)?,
                Material::TungstenPolystyrene,
            ))?;
            self.build_fibers(store, block, index)?;
            blocks.push(Placement::new(block, self.block_center(index), index.flat(m)));
        }

        let horizontal_glue = self.build_horizontal_glue(store)?;
        let vertical_glue = self.build_vertical_glue(store)?;

        debug!(
            blocks = blocks.len(),
            horizontal_glue = horizontal_glue.len(),
            vertical_glue = vertical_glue.len(),
            fibers_per_block = ecal.fibers_per_block(),
            "laid out block grid"
        );
        Ok(BlockLayout {
            blocks,
            horizontal_glue,
            vertical_glue,
        })
    }

    fn build_fibers(&self, store: &mut VolumeStore, block: VolumeId, index: GridIndex) -> Result<()> {
        let ecal = &self.params.ecal;
        let core_radius = ecal.core_radius();
        let half_length = ecal.thickness / 2.0;

        let cladding = store.add_volume(VolumeNode::new(
            VolumeKey::FiberCladding(index),
            Tube::new(core_radius, ecal.fiber_radius, half_length)?,
            Material::Plexiglass,
        ))?;
        let core = store.add_volume(
            VolumeNode::new(
                VolumeKey::FiberCore(index),
                Tube::new(0.0, core_radius, half_length)?,
                Material::Polystyrene,
            )
            .with_sensitive(Sensitive::FiberCore {
                block: index,
                fiber_cols: ecal.fiber_cols,
            }),
        )?;

        let mut copy_number = 0;
        for row in 0..ecal.fiber_rows {
            for col in 0..ecal.fiber_cols {
                let center = Self::fiber_center(ecal, row, col);
                store.place(block, Placement::new(cladding, center, copy_number))?;
                store.place(block, Placement::new(core, center, copy_number))?;
                copy_number += 1;
            }
        }
        Ok(())
    }

    fn build_horizontal_glue(&self, store: &mut VolumeStore) -> Result<Vec<Placement>> {
        let ecal = &self.params.ecal;
        let m = ecal.block_count;
        let pairs = m / 2;

        let mut glue = Vec::with_capacity((m * pairs) as usize);
        for column in 0..m {
            for pair in 0..pairs {
                let id = store.add_volume(VolumeNode::new(
                    VolumeKey::HorizontalGlue { column, pair },
                    BoxShape::from_size(ecal.block_x, ecal.glue_thickness, ecal.thickness)?,
                    Material::Polystyrene,
                ))?;
                let top = self.block_center(GridIndex::new(column, 2 * pair));
                let center = Vector3::new(
                    top.x,
                    top.y - (ecal.block_y + ecal.glue_thickness) / 2.0,
                    0.0,
                );
                glue.push(Placement::new(id, center, column * pairs + pair));
            }
        }
        Ok(glue)
    }

    fn build_vertical_glue(&self, store: &mut VolumeStore) -> Result<Vec<Placement>> {
        let ecal = &self.params.ecal;
        let pairs = ecal.block_count / 2;

        let mut glue = Vec::with_capacity((pairs * pairs) as usize);
        for pair in 0..pairs {
            for row_pair in 0..pairs {
                let id = store.add_volume(VolumeNode::new(
                    VolumeKey::VerticalGlue { pair, row_pair },
                    BoxShape::from_size(
                        ecal.glue_thickness,
                        2.0 * ecal.block_y + ecal.glue_thickness,
                        ecal.thickness,
                    )?,
                    Material::Polystyrene,
                ))?;
                let corner = self.block_center(GridIndex::new(2 * pair, 2 * row_pair));
                let center = Vector3::new(
                    corner.x + (ecal.block_x + ecal.glue_thickness) / 2.0,
                    corner.y - (ecal.block_y + ecal.glue_thickness) / 2.0,
                    0.0,
                );
                glue.push(Placement::new(id, center, pair * pairs + row_pair));
            }
        }
        Ok(glue)
    }
}

/// Distance from the first block centre to block `k` along one axis.
///
/// Boundary `b` (between blocks `b` and `b + 1`) is glue when `b` is even and
/// a clearance gap when it is odd.
fn module_offset(k: u32, size: f64, ecal: &EcalParameters) -> f64 {
    let glue_gaps = k.div_ceil(2);
    let clearance_gaps = k / 2;
    f64::from(k) * size
        + f64::from(glue_gaps) * ecal.glue_thickness
        + f64::from(clearance_gaps) * ecal.clearance_gap
}
