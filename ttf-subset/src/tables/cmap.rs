//! The [cmap](https://learn.microsoft.com/en-us/typography/opentype/spec/cmap) table

use std::collections::BTreeMap;

use font_types::{GlyphId, GlyphId16};
use write_fonts::{
    dump_table,
    read::{
        tables::cmap::{Cmap, CmapIterLimits, CmapSubtable, EncodingRecord, PlatformId},
        ReadError,
    },
    tables::cmap as out,
};

use crate::SubsetError;

pub const PLATFORM_UNICODE: u16 = 0;
pub const PLATFORM_MACINTOSH: u16 = 1;
pub const PLATFORM_WINDOWS: u16 = 3;

// https://learn.microsoft.com/en-us/typography/opentype/spec/cmap#windows-platform-platform-id--3
pub const WINDOWS_BMP_ENCODING: u16 = 1;
pub const WINDOWS_FULL_REPERTOIRE_ENCODING: u16 = 10;

/// The subtable formats we know how to decode.
const SUPPORTED_FORMATS: [u16; 4] = [0, 4, 6, 12];

/// The largest segment count whose format 4 length still fits in 16 bits.
const MAX_FORMAT_4_SEGMENTS: usize = (u16::MAX as usize - 16) / 8;

/// A mapping from Unicode code points to glyph identifiers, ordered by code point.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CharacterMap {
    mappings: BTreeMap<u32, GlyphId16>,
}

fn platform_matches(record: &EncodingRecord, platform_id: u16) -> bool {
    let platform = record.platform_id();
    platform != PlatformId::Unknown && platform as u16 == platform_id
}

/// Call `f` with every (code point, glyph id) pair in a subtable.
///
/// Pairs may map to glyph 0; callers decide what to do with those.
fn for_each_mapping(
    subtable: &CmapSubtable,
    mut f: impl FnMut(u32, GlyphId),
) -> Result<(), SubsetError> {
    match subtable {
        CmapSubtable::Format0(cmap0) => {
            for (code_point, gid) in cmap0.glyph_id_array().iter().enumerate() {
                f(code_point as u32, GlyphId::new(*gid as u32));
            }
        }
        CmapSubtable::Format4(cmap4) => cmap4.iter().for_each(|(cp, gid)| f(cp, gid)),
        CmapSubtable::Format6(cmap6) => {
            let first_code = cmap6.first_code() as u32;
            for (i, gid) in cmap6.glyph_id_array().iter().enumerate() {
                f(first_code + i as u32, GlyphId::from(gid.get()));
            }
        }
        CmapSubtable::Format12(cmap12) => cmap12
            .iter_with_limits(CmapIterLimits::default())
            .for_each(|(cp, gid)| f(cp, gid)),
        other => return Err(SubsetError::UnsupportedFormat(other.format())),
    }
    Ok(())
}

impl CharacterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a mapping, unless the code point is already mapped.
    ///
    /// Glyph 0 is never recorded. Returns `true` if the mapping was added.
    pub fn insert(&mut self, code_point: u32, gid: u16) -> bool {
        if gid == 0 {
            return false;
        }
        match self.mappings.get(&code_point) {
            Some(existing) if existing.to_u16() != gid => {
                log::warn!(
                    "U+{code_point:04X} is mapped to glyph {} and {gid}, keeping {}",
                    existing.to_u16(),
                    existing.to_u16()
                );
                false
            }
            Some(_) => false,
            None => {
                self.mappings.insert(code_point, GlyphId16::new(gid));
                true
            }
        }
    }

    /// Merge every subtable of `cmap` whose platform matches `platform_id`.
    ///
    /// A subtable in an unsupported format is skipped if some other subtable
    /// for the platform could be decoded; otherwise it is an error.
    pub fn resolve(cmap: &Cmap, platform_id: u16, debug: bool) -> Result<Self, SubsetError> {
        let data = cmap.offset_data();
        let mut map = CharacterMap::new();
        let mut decoded = 0;
        let mut unsupported = None;
        for record in cmap.encoding_records() {
            if debug {
                log::debug!(
                    "cmap subtable platform {:?} encoding {} at offset {}",
                    record.platform_id(),
                    record.encoding_id(),
                    record.subtable_offset().to_u32()
                );
            }
            if !platform_matches(record, platform_id) {
                continue;
            }
            let format: u16 = data.read_at(record.subtable_offset().to_u32() as usize)?;
            if !SUPPORTED_FORMATS.contains(&format) {
                log::warn!(
                    "skipping cmap subtable ({platform_id}, {}) in unsupported format {format}",
                    record.encoding_id()
                );
                unsupported.get_or_insert(format);
                continue;
            }
            let subtable = record.subtable(data)?;
            for_each_mapping(&subtable, |code_point, gid| {
                match u16::try_from(gid.to_u32()) {
                    Ok(gid) => {
                        map.insert(code_point, gid);
                    }
                    Err(_) => log::warn!("U+{code_point:04X} maps to out of range glyph {gid}"),
                }
            })?;
            decoded += 1;
        }
        if let (0, Some(format)) = (decoded, unsupported) {
            return Err(SubsetError::UnsupportedFormat(format));
        }
        if debug {
            log::debug!("resolved {} code points: {:?}", map.len(), map.mappings);
        }
        Ok(map)
    }

    pub fn get(&self, code_point: u32) -> Option<GlyphId16> {
        self.mappings.get(&code_point).copied()
    }

    /// Iterate over all mappings in code point order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, GlyphId16)> + '_ {
        self.mappings.iter().map(|(cp, gid)| (*cp, *gid))
    }

    pub fn code_points(&self) -> impl Iterator<Item = u32> + '_ {
        self.mappings.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

impl FromIterator<(u32, u16)> for CharacterMap {
    fn from_iter<T: IntoIterator<Item = (u32, u16)>>(iter: T) -> Self {
        let mut map = CharacterMap::new();
        for (code_point, gid) in iter {
            map.insert(code_point, gid);
        }
        map
    }
}

/// A run of consecutive code points sharing the same glyph id delta.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Segment {
    start: u16,
    end: u16,
    delta: i16,
}

fn format_4_segments(mappings: &[(u32, GlyphId16)]) -> Vec<Segment> {
    let mut segments: Vec<Segment> = Vec::new();
    for (code_point, gid) in mappings {
        let Ok(code_point) = u16::try_from(*code_point) else {
            // sorted, so the rest are beyond the BMP too
            break;
        };
        let delta = gid.to_u16().wrapping_sub(code_point) as i16;
        match segments.last_mut() {
            Some(last)
                if last.end != 0xFFFF && last.end + 1 == code_point && last.delta == delta =>
            {
                last.end = code_point;
            }
            _ => segments.push(Segment {
                start: code_point,
                end: code_point,
                delta,
            }),
        }
    }

    // the last segment must end at 0xFFFF
    if segments.last().map(|seg| seg.end) != Some(0xFFFF) {
        segments.push(Segment {
            start: 0xFFFF,
            end: 0xFFFF,
            delta: 1,
        });
    }
    segments
}

/// A format 4 subtable using only `idDelta` addressing.
///
/// Mappings must be sorted by code point; code points beyond the BMP are
/// ignored. Returns `None` when the segments don't fit in the 16-bit length
/// field.
pub fn build_format_4(mappings: &[(u32, GlyphId16)]) -> Option<out::CmapSubtable> {
    let segments = format_4_segments(mappings);
    if segments.len() > MAX_FORMAT_4_SEGMENTS {
        return None;
    }
    Some(out::CmapSubtable::format_4(
        0,
        segments.iter().map(|seg| seg.end).collect(),
        segments.iter().map(|seg| seg.start).collect(),
        segments.iter().map(|seg| seg.delta).collect(),
        vec![0; segments.len()],
        Vec::new(),
    ))
}

/// A format 12 subtable covering every mapping.
pub fn build_format_12(mappings: &[(u32, GlyphId16)]) -> out::CmapSubtable {
    let mut groups: Vec<out::SequentialMapGroup> = Vec::new();
    for (code_point, gid) in mappings {
        let gid = gid.to_u16() as u32;
        match groups.last_mut() {
            Some(last)
                if last.end_char_code + 1 == *code_point
                    && last.start_glyph_id + (code_point - last.start_char_code) == gid =>
            {
                last.end_char_code = *code_point;
            }
            _ => groups.push(out::SequentialMapGroup::new(*code_point, *code_point, gid)),
        }
    }
    out::CmapSubtable::format_12(0, groups)
}

/// Write a cmap table for the (code point, output glyph id) pairs.
///
/// The table has a Windows BMP format 4 subtable, plus a Windows full
/// repertoire format 12 subtable if any code point is beyond the BMP. When
/// the format 4 subtable would overflow its length field, only the format 12
/// subtable is written.
pub fn write_cmap(mappings: &[(u32, GlyphId16)]) -> Result<Vec<u8>, SubsetError> {
    let mut records = Vec::new();
    let format_4 = build_format_4(mappings);
    let needs_format_12 = format_4.is_none() || mappings.iter().any(|(cp, _)| *cp > 0xFFFF);
    match format_4 {
        Some(subtable) => records.push(out::EncodingRecord::new(
            PlatformId::Windows,
            WINDOWS_BMP_ENCODING,
            subtable,
        )),
        None => log::warn!(
            "{} mappings need too many segments for cmap format 4, writing format 12 only",
            mappings.len()
        ),
    }
    if needs_format_12 {
        records.push(out::EncodingRecord::new(
            PlatformId::Windows,
            WINDOWS_FULL_REPERTOIRE_ENCODING,
            build_format_12(mappings),
        ));
    }
    Ok(dump_table(&out::Cmap::new(records))?)
}
