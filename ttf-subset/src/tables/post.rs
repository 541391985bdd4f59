//! The [post](https://learn.microsoft.com/en-us/typography/opentype/spec/post) table

use write_fonts::read::{FontData, ReadError};

/// The length of the fixed header shared by all versions.
pub const POST_HEADER_LEN: usize = 32;
/// Version 3.0 carries no glyph names.
const VERSION_3_0: u32 = 0x00030000;

/// Rewrite `post` as version 3.0, dropping any glyph names.
///
/// Glyph names are keyed by glyph id, which no longer match after subsetting.
pub fn write_post(source: FontData) -> Result<Vec<u8>, ReadError> {
    let header = source
        .slice(0..POST_HEADER_LEN)
        .ok_or(ReadError::MalformedData("post table is shorter than its header"))?;
    let mut out = Vec::with_capacity(POST_HEADER_LEN);
    out.extend_from_slice(&VERSION_3_0.to_be_bytes());
    out.extend_from_slice(&header.as_bytes()[4..]);
    Ok(out)
}
