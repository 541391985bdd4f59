//! The [maxp](https://learn.microsoft.com/en-us/typography/opentype/spec/maxp) table
//!
//! Only `numGlyphs` changes; the limits of a version 1.0 table are upper
//! bounds that remain valid for any subset.

use write_fonts::{
    read::{tables::maxp::Maxp, FontData, FontRead, TopLevelTable},
    types::Version16Dot16,
};

use crate::SubsetError;

fn expected_len(version: Version16Dot16) -> usize {
    if version == Version16Dot16::VERSION_0_5 {
        6
    } else {
        32
    }
}

/// Parse `maxp`, rejecting tables whose length doesn't match their version.
pub fn read_maxp(data: FontData) -> Result<Maxp, SubsetError> {
    let maxp = Maxp::read(data)?;
    let expected = expected_len(maxp.version());
    if data.len() != expected {
        return Err(SubsetError::LayoutMismatch {
            tag: Maxp::TAG,
            expected: expected as u32,
            actual: data.len() as u32,
        });
    }
    Ok(maxp)
}

/// Copy `maxp`, replacing the glyph count.
pub fn write_maxp(maxp: &Maxp, num_glyphs: u16) -> Vec<u8> {
    let mut out = maxp.offset_data().as_bytes().to_owned();
    let start = maxp.shape().num_glyphs_byte_range().start;
    if let Some(field) = out.get_mut(start..start + 2) {
        field.copy_from_slice(&num_glyphs.to_be_bytes());
    }
    out
}
