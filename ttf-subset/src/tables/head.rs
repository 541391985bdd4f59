//! The [head](https://learn.microsoft.com/en-us/typography/opentype/spec/head) table

use std::ops::Range;

use write_fonts::{
    read::{tables::head::Head, FontData, FontRead, ReadError, TopLevelTable},
    tables::loca::LocaFormat,
};

use crate::SubsetError;

/// The only valid length of a `head` table.
pub const HEAD_LEN: usize = 54;

/// The checksum adjustment is chosen so that the whole font sums to this.
pub const CHECKSUM_MAGIC: u32 = 0xB1B0AFBA;

/// Parse `head`, rejecting tables of any length but [`HEAD_LEN`].
pub fn read_head(data: FontData) -> Result<Head, SubsetError> {
    if data.len() != HEAD_LEN {
        return Err(SubsetError::LayoutMismatch {
            tag: Head::TAG,
            expected: HEAD_LEN as u32,
            actual: data.len() as u32,
        });
    }
    Ok(Head::read(data)?)
}

/// The loca format named by `head.indexToLocFormat`.
pub fn loca_format(head: &Head) -> Result<LocaFormat, ReadError> {
    match head.index_to_loc_format() {
        0 => Ok(LocaFormat::Short),
        1 => Ok(LocaFormat::Long),
        _ => Err(ReadError::MalformedData("unknown indexToLocFormat")),
    }
}

/// Copy `head`, replacing the loca format.
///
/// The checksum adjustment is left zeroed; `FontBuilder` fills it in once
/// the whole font has been assembled.
pub fn write_head(head: &Head, loca_format: LocaFormat) -> Vec<u8> {
    let mut out = head.offset_data().as_bytes().to_owned();
    let shape = head.shape();
    patch(&mut out, shape.checksum_adjustment_byte_range(), &0u32.to_be_bytes());
    patch(
        &mut out,
        shape.index_to_loc_format_byte_range(),
        &(loca_format as i16).to_be_bytes(),
    );
    patch(&mut out, shape.glyph_data_format_byte_range(), &0i16.to_be_bytes());
    out
}

fn patch(out: &mut [u8], range: Range<usize>, value: &[u8]) {
    if let Some(field) = out.get_mut(range) {
        field.copy_from_slice(value);
    }
}
