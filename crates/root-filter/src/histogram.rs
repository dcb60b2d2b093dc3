//! Public histogram bin type returned by `RootData::read_histogram`.

/// One cell of a 1D histogram.
///
/// Cells come in storage order: index 0 is the underflow bin (with a lower
/// edge of negative infinity), the last index is the overflow bin.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BinPars {
    /// Lower edge of the bin.
    pub lowedge: f64,
    /// Bin content.
    pub content: f64,
    /// Sum of squared weights, 0 when the histogram stores none.
    pub sumw2: f64,
}

impl BinPars {
    /// Statistical error: `sqrt(sumw2)` when weights are stored, `sqrt(|content|)` otherwise.
    pub fn error(&self, weighted: bool) -> f64 {
        if weighted {
            self.sumw2.sqrt()
        } else {
            self.content.abs().sqrt()
        }
    }
}

/// Whether any bin carries a sum of squared weights.
pub fn is_weighted(bins: &[BinPars]) -> bool {
    bins.iter().any(|b| b.sumw2 != 0.0)
}

/// Bin center: midpoint of the bin's lower edge and the next bin's lower edge.
///
/// The underflow bin reports negative infinity, the overflow bin positive infinity.
pub fn bin_center(bins: &[BinPars], i: usize) -> f64 {
    match (bins.get(i), bins.get(i + 1)) {
        (Some(b), Some(next)) => 0.5 * (b.lowedge + next.lowedge),
        (Some(_), None) => f64::INFINITY,
        _ => f64::NAN,
    }
}
