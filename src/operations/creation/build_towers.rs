use tracing::debug;

use crate::config::ParameterSet;
use crate::error::Result;
use crate::geometry::{BoxShape, Material};
use crate::math::Vector3;
use crate::tree::{GridIndex, Placement, Sensitive, VolumeId, VolumeKey, VolumeNode, VolumeStore};

/// Placements produced by [`BuildTowers`], ready to be put in the world.
#[derive(Debug, Clone)]
pub struct TowerLayout {
    /// One placement per tower, row-major in `(i, j)`.
    pub towers: Vec<Placement>,
}

/// Lays out the N x N grid of sandwich towers.
///
/// Each tower is a full-pitch envelope holding a layer stack inset by the
/// shims. The stack repeats one layer volume `layer_count` times along z; a
/// layer holds the absorber plate followed by the active plate. Towers with
/// `i >= 1` carry a WLS shim on their -x face and towers with `j >= 1` a steel
/// shim on their +y face, so shims only sit on interior boundaries.
pub struct BuildTowers<'a> {
    params: &'a ParameterSet,
}

impl<'a> BuildTowers<'a> {
    /// Creates a new `BuildTowers` operation.
    #[must_use]
    pub fn new(params: &'a ParameterSet) -> Self {
        Self { params }
    }

    /// World z of every tower centre: right behind the fiber section.
    #[must_use]
    pub fn z_offset(&self) -> f64 {
        self.params.ecal.thickness / 2.0 + self.params.hcal.thickness() / 2.0
    }

    /// World position of the centre of tower `index`.
    ///
    /// Tower `((n-1)/2, (n-1)/2)` sits on the beam axis; `i` grows towards +x
    /// and `j` towards -y.
    #[must_use]
    pub fn tower_center(&self, index: GridIndex) -> Vector3 {
        let hcal = &self.params.hcal;
        let half_span = (f64::from(hcal.tower_count) - 1.0) / 2.0;
        Vector3::new(
            (-half_span + f64::from(index.i)) * hcal.pitch_x,
            (half_span - f64::from(index.j)) * hcal.pitch_y,
            self.z_offset(),
        )
    }

    /// Executes the operation, adding every tower volume to the store.
    ///
    /// # Errors
    ///
    /// Returns a configuration error, before touching the store, if the
    /// parameters are invalid. Returns a tree error if a volume key is
    /// already taken in the store.
    pub fn execute(&self, store: &mut VolumeStore) -> Result<TowerLayout> {
        self.params.validate()?;
        let hcal = &self.params.hcal;
        let n = hcal.tower_count;
        let thickness = hcal.thickness();
        let stack_x = hcal.pitch_x - hcal.wls_thickness;
        let stack_y = hcal.pitch_y - hcal.steel_thickness;

        let mut towers = Vec::with_capacity((n * n) as usize);
        for index in GridIndex::grid(n) {
            let tower = store.add_volume(VolumeNode::new(
                VolumeKey::Tower(index),
                BoxShape::from_size(hcal.pitch_x, hcal.pitch_y, thickness)?,
                Material::Vacuum,
            ))?;

            let stack = self.build_layer_stack(store, index, stack_x, stack_y)?;
            store.place(
                tower,
                Placement::new(
                    stack,
                    Vector3::new(hcal.wls_thickness / 2.0, -hcal.steel_thickness / 2.0, 0.0),
                    0,
                ),
            )?;

            if index.i > 0 {
                let wls = store.add_volume(VolumeNode::new(
                    VolumeKey::WlsShim(index),
                    BoxShape::from_size(hcal.wls_thickness, stack_y, thickness)?,
                    Material::Polystyrene,
                ))?;
                store.place(
                    tower,
                    Placement::new(
                        wls,
                        Vector3::new(-stack_x / 2.0, -hcal.steel_thickness / 2.0, 0.0),
                        0,
                    ),
                )?;
            }

            if index.j > 0 {
                let steel = store.add_volume(VolumeNode::new(
                    VolumeKey::SteelShim(index),
                    BoxShape::from_size(hcal.pitch_x, hcal.steel_thickness, thickness)?,
                    Material::Iron,
                ))?;
                store.place(
                    tower,
                    Placement::new(steel, Vector3::new(0.0, stack_y / 2.0, 0.0), 0),
                )?;
            }

            towers.push(Placement::new(tower, self.tower_center(index), index.flat(n)));
        }

        debug!(
            towers = towers.len(),
            layers = hcal.layer_count,
            shims_per_axis = (n - 1) * n,
            "laid out tower grid"
        );
        Ok(TowerLayout { towers })
    }

    fn build_layer_stack(
        &self,
        store: &mut VolumeStore,
        index: GridIndex,
        stack_x: f64,
        stack_y: f64,
    ) -> Result<VolumeId> {
        let hcal = &self.params.hcal;
        let thickness = hcal.thickness();
        let layer_thickness = hcal.layer_thickness();

        let stack = store.add_volume(VolumeNode::new(
            VolumeKey::LayerStack(index),
            BoxShape::from_size(stack_x, stack_y, thickness)?,
            Material::Vacuum,
        ))?;
        let layer = store.add_volume(VolumeNode::new(
            VolumeKey::Layer(index),
            BoxShape::from_size(stack_x, stack_y, layer_thickness)?,
            Material::Vacuum,
        ))?;

        // absorber first, then the active plate behind it
        let absorber = store.add_volume(VolumeNode::new(
            VolumeKey::Absorber(index),
            BoxShape::from_size(stack_x, stack_y, hcal.absorber_thickness)?,
            Material::Iron,
        ))?;
        store.place(
            layer,
            Placement::new(absorber, Vector3::new(0.0, 0.0, -hcal.active_thickness / 2.0), 0),
        )?;
        let active = store.add_volume(
            VolumeNode::new(
                VolumeKey::Active(index),
                BoxShape::from_size(stack_x, stack_y, hcal.active_thickness)?,
                Material::Polystyrene,
            )
            .with_sensitive(Sensitive::TowerActive { tower: index }),
        )?;
        store.place(
            layer,
            Placement::new(active, Vector3::new(0.0, 0.0, hcal.absorber_thickness / 2.0), 0),
        )?;

        for k in 0..hcal.layer_count {
            let z = -thickness / 2.0 + (f64::from(k) + 0.5) * layer_thickness;
            store.place(stack, Placement::new(layer, Vector3::new(0.0, 0.0, z), k))?;
        }
        Ok(stack)
    }
}
