use std::fmt;

/// Position of a tower or block in its square grid.
///
/// `i` runs along x and `j` along y; `(0, 0)` is the tower or block with the
/// most negative x and most positive y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GridIndex {
    pub i: u32,
    pub j: u32,
}

impl GridIndex {
    #[must_use]
    pub fn new(i: u32, j: u32) -> Self {
        Self { i, j }
    }

    /// Row-major flat index in a grid with `n` entries per side.
    #[must_use]
    pub fn flat(self, n: u32) -> u32 {
        self.i * n + self.j
    }

    /// Iterates every index of an `n` x `n` grid in row-major order.
    pub fn grid(n: u32) -> impl Iterator<Item = Self> {
        (0..n).flat_map(move |i| (0..n).map(move |j| Self::new(i, j)))
    }
}

impl fmt::Display for GridIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.i, self.j)
    }
}

/// Structured identity of a logical volume.
///
/// Every volume in a tree has a distinct key. The human-readable label is
/// derived from the key through [`fmt::Display`] and is never used for lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VolumeKey {
    World,
    /// Full-pitch tower envelope.
    Tower(GridIndex),
    /// Container for the replicated layers, inset by the shims.
    LayerStack(GridIndex),
    Layer(GridIndex),
    Absorber(GridIndex),
    Active(GridIndex),
    /// Wavelength-shifting plate on the -x side of a tower.
    WlsShim(GridIndex),
    /// Steel plate on the +y side of a tower.
    SteelShim(GridIndex),
    Block(GridIndex),
    /// Glue between rows `2 * pair` and `2 * pair + 1` of one block column.
    HorizontalGlue { column: u32, pair: u32 },
    /// Glue between columns `2 * pair` and `2 * pair + 1`, spanning one row pair.
    VerticalGlue { pair: u32, row_pair: u32 },
    FiberCladding(GridIndex),
    FiberCore(GridIndex),
}

impl fmt::Display for VolumeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::World => f.write_str("World"),
            Self::Tower(ij) => write!(f, "HCal{ij}"),
            Self::LayerStack(ij) => write!(f, "HCalLayerHolder{ij}"),
            Self::Layer(ij) => write!(f, "HCalLayer{ij}"),
            Self::Absorber(ij) => write!(f, "HCalAbsorber{ij}"),
            Self::Active(ij) => write!(f, "HCalActive{ij}"),
            Self::WlsShim(ij) => write!(f, "HCalWLS{ij}"),
            Self::SteelShim(ij) => write!(f, "HCalSteel{ij}"),
            Self::Block(ij) => write!(f, "ECal{ij}"),
            Self::HorizontalGlue { column, pair } => write!(f, "ECal_HorizGlue[{column},{pair}]"),
            Self::VerticalGlue { pair, row_pair } => write!(f, "ECal_VertGlue[{pair},{row_pair}]"),
            Self::FiberCladding(ij) => write!(f, "ECal_FiberCladding{ij}"),
            Self::FiberCore(ij) => write!(f, "ECal_Fiber{ij}"),
        }
    }
}

/// Identifier of a scoring-eligible leaf instance.
///
/// Energy deposits are accumulated per `ScoringId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScoringId {
    /// Scintillator plate of one tower layer.
    TowerActive { tower: GridIndex, layer: u32 },
    /// Core of one fiber in a block.
    FiberCore { block: GridIndex, row: u32, col: u32 },
}

const TAG_SHIFT: u32 = 60;
const I_SHIFT: u32 = 48;
const J_SHIFT: u32 = 36;
const GRID_MASK: u64 = 0x0FFF;
const SUB_MASK: u64 = 0xFFFF;

impl ScoringId {
    /// Packs the identifier into a single integer.
    ///
    /// Layout: 4-bit section tag, 12 bits each for `i` and `j`, then the layer
    /// or `row << 16 | col`. Distinct identifiers within the validated
    /// parameter ranges always map to distinct codes.
    #[must_use]
    pub fn code(self) -> u64 {
        let (tag, grid, sub) = match self {
            Self::TowerActive { tower, layer } => (1_u64, tower, u64::from(layer) & SUB_MASK),
            Self::FiberCore { block, row, col } => (
                2_u64,
                block,
                ((u64::from(row) & SUB_MASK) << 16) | (u64::from(col) & SUB_MASK),
            ),
        };
        (tag << TAG_SHIFT)
            | ((u64::from(grid.i) & GRID_MASK) << I_SHIFT)
            | ((u64::from(grid.j) & GRID_MASK) << J_SHIFT)
            | sub
    }

    /// Recovers an identifier from [`ScoringId::code`].
    #[must_use]
    pub fn from_code(code: u64) -> Option<Self> {
        let grid = GridIndex::new(
            u32::try_from((code >> I_SHIFT) & GRID_MASK).ok()?,
            u32::try_from((code >> J_SHIFT) & GRID_MASK).ok()?,
        );
        let sub = code & ((1 << J_SHIFT) - 1);
        match code >> TAG_SHIFT {
            1 => Some(Self::TowerActive {
                tower: grid,
                layer: u32::try_from(sub).ok()?,
            }),
            2 => Some(Self::FiberCore {
                block: grid,
                row: u32::try_from((sub >> 16) & SUB_MASK).ok()?,
                col: u32::try_from(sub & SUB_MASK).ok()?,
            }),
            _ => None,
        }
    }

    /// Returns the tower or block this leaf belongs to.
    #[must_use]
    pub fn cell(self) -> GridIndex {
        match self {
            Self::TowerActive { tower, .. } => tower,
            Self::FiberCore { block, .. } => block,
        }
    }
}

impl fmt::Display for ScoringId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TowerActive { tower, layer } => write!(f, "HCalActive{tower}/layer{layer}"),
            Self::FiberCore { block, row, col } => write!(f, "ECal_Fiber{block}/fiber[{row},{col}]"),
        }
    }
}
