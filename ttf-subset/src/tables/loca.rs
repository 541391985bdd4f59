//! The [loca](https://learn.microsoft.com/en-us/typography/opentype/spec/loca) table

use std::ops::Range;

use write_fonts::{
    read::{tables::loca::Loca, ReadError},
    tables::loca::LocaFormat,
};

use crate::SubsetError;

/// The outline locations of a source font.
///
/// Only the first `maxp.numGlyphs` glyphs are addressable, whatever the
/// length of the `loca` table.
#[derive(Clone)]
pub struct GlyphLocations<'a> {
    loca: Loca<'a>,
    num_glyphs: u16,
}

impl<'a> GlyphLocations<'a> {
    pub fn new(loca: Loca<'a>, num_glyphs: u16) -> Self {
        GlyphLocations { loca, num_glyphs }
    }

    /// The number of glyphs with a known location.
    pub fn num_glyphs(&self) -> usize {
        self.loca.len().min(self.num_glyphs as usize)
    }

    /// The byte range of a glyph's outline in the `glyf` table.
    ///
    /// An empty range is a glyph without an outline.
    pub fn glyph_range(&self, gid: u16) -> Result<Range<usize>, SubsetError> {
        let idx = gid as usize;
        if idx >= self.num_glyphs() {
            return Err(SubsetError::GlyphIsMissing(gid));
        }
        let (Some(start), Some(end)) = (self.loca.get_raw(idx), self.loca.get_raw(idx + 1)) else {
            return Err(SubsetError::GlyphIsMissing(gid));
        };
        if start > end {
            return Err(ReadError::MalformedData("loca offsets are decreasing").into());
        }
        Ok(start as usize..end as usize)
    }
}

/// The smallest format able to represent these offsets.
///
/// Short offsets store half the real offset, so odd offsets force the long
/// format.
pub fn format_for_offsets(offsets: &[u32]) -> LocaFormat {
    let max_offset = offsets.last().copied().unwrap_or(0);
    if max_offset <= 0xFFFF && offsets.iter().all(|offset| offset % 2 == 0) {
        LocaFormat::Short
    } else {
        LocaFormat::Long
    }
}

/// Serialize the loca table, choosing the smallest possible format.
pub fn write_loca(offsets: &[u32]) -> (Vec<u8>, LocaFormat) {
    let format = format_for_offsets(offsets);
    let mut out = Vec::with_capacity(offsets.len() * 4);
    for offset in offsets {
        match format {
            LocaFormat::Short => out.extend_from_slice(&((offset / 2) as u16).to_be_bytes()),
            LocaFormat::Long => out.extend_from_slice(&offset.to_be_bytes()),
        }
    }
    (out, format)
}
