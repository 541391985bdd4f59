//! The [hhea](https://learn.microsoft.com/en-us/typography/opentype/spec/hhea)
//! and [hmtx](https://learn.microsoft.com/en-us/typography/opentype/spec/hmtx) tables

use font_types::GlyphId;
use write_fonts::read::{
    tables::{hhea::Hhea, hmtx::Hmtx},
    FontData, FontRead, ReadError, TopLevelTable,
};

use crate::SubsetError;

pub const HHEA_LEN: usize = 36;
const LONG_METRIC_LEN: usize = 4;

/// Parse `hhea`, rejecting tables of any length but [`HHEA_LEN`].
pub fn read_hhea(data: FontData) -> Result<Hhea, SubsetError> {
    if data.len() != HHEA_LEN {
        return Err(SubsetError::LayoutMismatch {
            tag: Hhea::TAG,
            expected: HHEA_LEN as u32,
            actual: data.len() as u32,
        });
    }
    Ok(Hhea::read(data)?)
}

/// Copy `hhea`, replacing `numberOfHMetrics`.
pub fn write_hhea(hhea: &Hhea, num_h_metrics: u16) -> Vec<u8> {
    let mut out = hhea.offset_data().as_bytes().to_owned();
    let start = hhea.shape().number_of_h_metrics_byte_range().start;
    if let Some(field) = out.get_mut(start..start + 2) {
        field.copy_from_slice(&num_h_metrics.to_be_bytes());
    }
    out
}

/// Rebuild `hmtx` in output glyph order.
///
/// Trailing glyphs sharing the last advance only store their side bearing.
/// Returns the new table along with its `numberOfHMetrics`.
pub fn remap_hmtx(hmtx: &Hmtx, glyph_order: &[u16]) -> Result<(Vec<u8>, u16), ReadError> {
    let metrics = glyph_order
        .iter()
        .map(|gid| {
            let gid = GlyphId::from(*gid);
            let advance = hmtx
                .advance(gid)
                .ok_or(ReadError::MalformedData("hhea.numberOfHMetrics is zero"))?;
            let side_bearing = hmtx.side_bearing(gid).ok_or(ReadError::OutOfBounds)?;
            Ok((advance, side_bearing))
        })
        .collect::<Result<Vec<_>, ReadError>>()?;
    let num_long_metrics = compute_num_long_metrics(&metrics);

    let mut out = Vec::with_capacity(metrics.len() * LONG_METRIC_LEN);
    for (i, (advance, side_bearing)) in metrics.iter().enumerate() {
        if i < num_long_metrics {
            out.extend_from_slice(&advance.to_be_bytes());
        }
        out.extend_from_slice(&side_bearing.to_be_bytes());
    }
    Ok((out, num_long_metrics as u16))
}

fn compute_num_long_metrics(metrics: &[(u16, i16)]) -> usize {
    let Some((last_advance, _)) = metrics.last() else {
        return 0;
    };
    let mut num_long_metrics = metrics.len();
    while num_long_metrics > 1 && metrics[num_long_metrics - 2].0 == *last_advance {
        num_long_metrics -= 1;
    }
    num_long_metrics
}
