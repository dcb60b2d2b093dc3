//! TH1x deserialization, driven by the `TH1` and `TAxis` layouts.
//!
//! Payload shape:
//! ```text
//! TH1x (version header)
//!   ├─ TH1 (version header, byte count)
//!   │    ├─ ... base classes ...
//!   │    ├─ fNcells (i32)            bins + under/overflow
//!   │    ├─ fXaxis (TAxis)
//!   │    │    ├─ fNbins, fXmin, fXmax
//!   │    │    └─ fXbins (TArrayD)    empty for uniform binning
//!   │    ├─ ...
//!   │    └─ fSumw2 (TArrayD)         empty when unweighted
//!   └─ TArrayX (n i32 + n values)    bin contents
//! ```

use crate::error::{Result, RootError};
use crate::histogram::BinPars;
use crate::key::ContentType;
use crate::layout::{advance_to, seek_field, CounterCache};
use crate::rbuffer::RBuffer;
use crate::streamer::{StreamerInfo, StreamerRegistry};
use crate::tree::read_value;

/// Read `fNcells` (bins including underflow and overflow).
pub fn read_n_bins(payload: &[u8], streamers: &StreamerRegistry) -> Result<usize> {
    let th1 = streamers.require("TH1")?;
    let mut r = RBuffer::new(payload);
    let mut counters = CounterCache::default();

    r.read_version()?; // TH1x
    r.read_version()?; // TH1
    seek_field(&mut r, th1, "", "fNcells", &mut counters)?;
    Ok(r.read::<i32>()?.max(0) as usize)
}

/// Read every cell of a histogram whose content array is stored as `content_type`.
pub fn read_histogram(
    payload: &[u8],
    content_type: ContentType,
    streamers: &StreamerRegistry,
) -> Result<Vec<BinPars>> {
    let th1 = streamers.require("TH1")?;
    let taxis = streamers.require("TAxis")?;
    let mut r = RBuffer::new(payload);
    let mut counters = CounterCache::default();

    r.read_version()?; // TH1x
    let base = r.read_version()?;
    seek_field(&mut r, th1, "", "fNcells", &mut counters)?;
    let ncells = r.read::<i32>()?;
    if ncells < 3 {
        return Err(RootError::Deserialization(format!("fNcells = {}", ncells)));
    }
    let ncells = ncells as usize;
    if ncells > payload.len() {
        return Err(RootError::Deserialization(format!(
            "fNcells {} exceeds payload of {} bytes",
            ncells,
            payload.len()
        )));
    }

    let mut bins = vec![BinPars::default(); ncells];
    bins[0].lowedge = f64::NEG_INFINITY;

    seek_field(&mut r, th1, "fNcells", "fXaxis", &mut counters)?;
    read_axis(&mut r, taxis, &mut bins)?;

    if advance_to(&mut r, th1, "fXaxis", "fSumw2", &mut counters)? {
        let n = r.read::<i32>()?;
        if n as usize == ncells {
            for bin in bins.iter_mut() {
                bin.sumw2 = r.read::<f64>()?;
            }
        }
    }

    r.seek_end(base.end)?;
    let n = r.read::<i32>()?;
    if n as usize == ncells {
        for bin in bins.iter_mut() {
            bin.content = read_value::<f64>(&mut r, content_type, true)?;
        }
    } else {
        log::debug!("content array holds {} values for {} cells", n, ncells);
    }
    Ok(bins)
}

/// Fill the lower edges of `bins[1..]` from the x axis.
fn read_axis(r: &mut RBuffer, taxis: &[StreamerInfo], bins: &mut [BinPars]) -> Result<()> {
    let axis = r.read_version()?;
    let mut counters = CounterCache::default();

    seek_field(r, taxis, "", "fNbins", &mut counters)?;
    let nbins = r.read::<i32>()?;
    seek_field(r, taxis, "fNbins", "fXmin", &mut counters)?;
    let xmin = r.read::<f64>()?;
    seek_field(r, taxis, "fXmin", "fXmax", &mut counters)?;
    let xmax = r.read::<f64>()?;
    seek_field(r, taxis, "fXmax", "fXbins", &mut counters)?;

    let edges = bins.len() - 1;
    let n = r.read::<i32>()?;
    if n as usize == edges {
        for bin in bins[1..].iter_mut() {
            bin.lowedge = r.read::<f64>()?;
        }
    } else {
        let nbins = if nbins > 0 { nbins as usize } else { edges - 1 };
        let width = (xmax - xmin) / nbins as f64;
        for (i, bin) in bins[1..].iter_mut().enumerate() {
            bin.lowedge = xmin + i as f64 * width;
        }
    }

    r.seek_end(axis.end)
}
