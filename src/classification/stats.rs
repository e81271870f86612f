//! Class axes, the 3×3 class matrix, and per-SKU statistics.

use statrs::distribution::{ContinuousCDF, Normal};
use std::fmt;
use std::iter::Sum;

/// Tolerance absorbing float rounding at the exact 80% / 95% cumulative
/// share boundaries.
const SHARE_EPSILON: f64 = 1e-9;

/// Revenue-contribution class from cumulative share of total sales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AbcClass {
    A,
    B,
    C,
}

/// Demand-volatility class from the coefficient of variation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum XyzClass {
    X,
    Y,
    Z,
}

/// Indexing surface shared by the two class axes, used by
/// [`ClassMatrix`] and the transition matrices.
pub trait ClassIndex: Copy + Eq {
    const ALL: [Self; 3];
    fn index(self) -> usize;
    fn as_str(self) -> &'static str;
}

impl AbcClass {
    /// Assign the class for a cumulative revenue share.
    pub fn from_cumulative_share(cum_share: f64) -> Self {
        if cum_share <= 0.80 + SHARE_EPSILON {
            AbcClass::A
        } else if cum_share <= 0.95 + SHARE_EPSILON {
            AbcClass::B
        } else {
            AbcClass::C
        }
    }
}

impl XyzClass {
    /// Assign the class for a coefficient of variation. An undefined or
    /// non-finite CoV means no stable baseline, so it lands in `Z`.
    pub fn from_cov(cov: Option<f64>) -> Self {
        match cov {
            Some(c) if c.is_finite() && c <= 0.10 => XyzClass::X,
            Some(c) if c.is_finite() && c <= 0.25 => XyzClass::Y,
            _ => XyzClass::Z,
        }
    }

    /// Target service level for the volatility class.
    pub fn service_level(self) -> f64 {
        match self {
            XyzClass::X => 0.95,
            XyzClass::Y => 0.90,
            XyzClass::Z => 0.85,
        }
    }
}

impl ClassIndex for AbcClass {
    const ALL: [Self; 3] = [AbcClass::A, AbcClass::B, AbcClass::C];

    fn index(self) -> usize {
        self as usize
    }

    fn as_str(self) -> &'static str {
        match self {
            AbcClass::A => "A",
            AbcClass::B => "B",
            AbcClass::C => "C",
        }
    }
}

impl ClassIndex for XyzClass {
    const ALL: [Self; 3] = [XyzClass::X, XyzClass::Y, XyzClass::Z];

    fn index(self) -> usize {
        self as usize
    }

    fn as_str(self) -> &'static str {
        match self {
            XyzClass::X => "X",
            XyzClass::Y => "Y",
            XyzClass::Z => "Z",
        }
    }
}

impl fmt::Display for AbcClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for XyzClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A 3×3 container addressed by the (ABC, XYZ) class pair.
///
/// Cells that were never written read as `T::default()`, mirroring the
/// implicit zero of a sparse count map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassMatrix<T> {
    cells: [[T; 3]; 3],
}

impl<T: Copy + Default + Sum> ClassMatrix<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, abc: AbcClass, xyz: XyzClass) -> T {
        self.cells[abc.index()][xyz.index()]
    }

    pub fn get_mut(&mut self, abc: AbcClass, xyz: XyzClass) -> &mut T {
        &mut self.cells[abc.index()][xyz.index()]
    }

    /// Sum over one ABC row.
    pub fn row_total(&self, abc: AbcClass) -> T {
        self.cells[abc.index()].iter().copied().sum()
    }

    /// Sum over one XYZ column.
    pub fn column_total(&self, xyz: XyzClass) -> T {
        self.cells.iter().map(|row| row[xyz.index()]).sum()
    }

    /// Sum over all nine cells.
    pub fn grand_total(&self) -> T {
        self.cells.iter().flat_map(|row| row.iter().copied()).sum()
    }
}

/// Computed classification record for one SKU within one window.
#[derive(Debug, Clone, PartialEq)]
pub struct SkuStat {
    pub sku: String,
    pub group: Option<String>,
    pub total: f64,
    pub mean: f64,
    pub std: f64,
    /// `std / mean`; undefined when the mean is not positive.
    pub cov: Option<f64>,
    /// Fraction of the window's grand total.
    pub share: f64,
    /// Running share after sorting by total descending.
    pub cum_share: f64,
    pub abc: AbcClass,
    pub xyz: XyzClass,
    pub service_level: f64,
    pub safety_stock: f64,
}

/// Inverse standard-normal quantile with the probability clamped to
/// `[0.001, 0.999]`.
fn normal_quantile(p: f64) -> f64 {
    let normal = Normal::new(0.0, 1.0).unwrap();
    normal.inverse_cdf(p.clamp(0.001, 0.999))
}

/// Safety stock at the target service level.
///
/// `z × std` covers demand variability; the `0.01 × mean` term keeps the
/// recommendation above zero for smooth but non-zero demand. A series
/// with no variability at all gets no safety stock.
pub fn safety_stock(std: f64, mean: f64, service_level: f64) -> f64 {
    if !std.is_finite() || std <= 0.0 {
        return 0.0;
    }
    normal_quantile(service_level) * std + 0.01 * mean
}
