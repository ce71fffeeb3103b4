/// Traversal order in which framebuffer bytes map to panel rows and columns.
///
/// The first half of the name is the fast axis. Only the axis family matters
/// to the driver: it decides whether the buffer is swept row-first or
/// column-first. The controller registers are the same for all of them.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScanDirection {
    /// Left to right, up to down.
    #[default]
    L2R_U2D,
    L2R_D2U,
    R2L_U2D,
    R2L_D2U,
    /// Up to down, left to right.
    U2D_L2R,
    U2D_R2L,
    D2U_L2R,
    D2U_R2L,
}

impl ScanDirection {
    /// True for the four directions that sweep along a row first.
    pub fn is_horizontal(self) -> bool {
        matches!(
            self,
            Self::L2R_U2D | Self::L2R_D2U | Self::R2L_U2D | Self::R2L_D2U
        )
    }
}

/// Sweep extents derived from the panel size and scan direction.
///
/// `column` is the pixel extent of one sweep and `page` the number of sweeps.
/// `column * page` always equals `width * height`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanGeometry {
    direction: ScanDirection,
    column: u16,
    page: u16,
}

impl ScanGeometry {
    pub fn new(direction: ScanDirection, width: u16, height: u16) -> Self {
        let (column, page) = if direction.is_horizontal() {
            (width, height)
        } else {
            (height, width)
        };
        Self {
            direction,
            column,
            page,
        }
    }

    pub fn direction(&self) -> ScanDirection {
        self.direction
    }

    pub fn column(&self) -> u16 {
        self.column
    }

    pub fn page(&self) -> u16 {
        self.page
    }

    /// Packed bytes sent per page during a flush.
    pub fn row_bytes(&self) -> usize {
        usize::from(self.column / 2)
    }
}
