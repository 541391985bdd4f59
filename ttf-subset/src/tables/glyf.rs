//! The [glyf](https://learn.microsoft.com/en-us/typography/opentype/spec/glyf) table

use std::collections::HashMap;

use write_fonts::read::{tables::glyf::CompositeGlyphFlags, FontData, ReadError};

use crate::{tables::loca::GlyphLocations, SubsetError};

/// Composite glyphs may not be nested deeper than this.
pub const MAX_NESTING_LEVEL: usize = 64;

/// The glyphs every subset starts with, keeping their ids.
pub const MANDATORY_GLYPHS: [u16; 4] = [0, 1, 2, 3];

/// The number of contours and the bounding box.
const GLYPH_HEADER_LEN: usize = 10;

/// The size of the two arguments following a component's glyph index.
fn args_len(flags: CompositeGlyphFlags) -> usize {
    if flags.contains(CompositeGlyphFlags::ARG_1_AND_2_ARE_WORDS) {
        4
    } else {
        2
    }
}

/// The size of the optional transform following the arguments.
fn transform_len(flags: CompositeGlyphFlags) -> usize {
    if flags.contains(CompositeGlyphFlags::WE_HAVE_A_SCALE) {
        2
    } else if flags.contains(CompositeGlyphFlags::WE_HAVE_AN_X_AND_Y_SCALE) {
        4
    } else if flags.contains(CompositeGlyphFlags::WE_HAVE_A_TWO_BY_TWO) {
        8
    } else {
        0
    }
}

/// The outlines and offsets of a subset, along with the glyph id mapping.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlyfSubset {
    /// The new glyf table.
    pub glyf: Vec<u8>,
    /// Offsets into `glyf`, including the final end offset.
    pub loca: Vec<u32>,
    /// Source glyph ids, indexed by output glyph id.
    glyph_order: Vec<u16>,
    glyph_map: HashMap<u16, u16>,
}

impl GlyfSubset {
    pub fn num_glyphs(&self) -> u16 {
        self.glyph_order.len() as u16
    }

    /// The output id of a source glyph, if it is part of the subset.
    pub fn new_gid(&self, old_gid: u16) -> Option<u16> {
        self.glyph_map.get(&old_gid).copied()
    }

    /// Source glyph ids in output order.
    pub fn glyph_order(&self) -> &[u16] {
        &self.glyph_order
    }

    /// The bytes of an output glyph.
    pub fn glyph_data(&self, new_gid: u16) -> Option<&[u8]> {
        let idx = new_gid as usize;
        let start = *self.loca.get(idx)? as usize;
        let end = *self.loca.get(idx + 1)? as usize;
        self.glyf.get(start..end)
    }
}

/// The state threaded through the recursive extraction of glyphs.
struct GlyfBuilder<'a> {
    glyf: FontData<'a>,
    locations: &'a GlyphLocations<'a>,
    debug: bool,
    // outlines by output id; `None` is a reserved slot not yet filled
    outlines: Vec<Option<Vec<u8>>>,
    glyph_order: Vec<u16>,
    glyph_map: HashMap<u16, u16>,
    // composites currently being rewritten, outermost first
    in_progress: Vec<u16>,
}

/// Copy the outlines of the requested glyphs, and everything they depend on,
/// into a new glyf table.
///
/// Glyphs 0 to 3 keep their ids, even when they are composites whose
/// components are only added later. Components are extracted before the
/// composite that references them, so every component's output id is known
/// when the composite is rewritten. A glyph is only ever copied once.
pub fn extract(
    glyf: FontData,
    locations: &GlyphLocations,
    requested: &[u16],
    debug: bool,
) -> Result<GlyfSubset, SubsetError> {
    let mut builder = GlyfBuilder {
        glyf,
        locations,
        debug,
        outlines: Vec::new(),
        glyph_order: Vec::new(),
        glyph_map: HashMap::new(),
        in_progress: Vec::new(),
    };
    for gid in MANDATORY_GLYPHS {
        builder.reserve(gid);
    }
    for gid in MANDATORY_GLYPHS.iter().chain(requested) {
        builder.extract_glyph(*gid)?;
    }
    Ok(builder.finish())
}

impl GlyfBuilder<'_> {
    fn reserve(&mut self, gid: u16) -> u16 {
        let new_gid = self.glyph_order.len() as u16;
        self.outlines.push(None);
        self.glyph_order.push(gid);
        self.glyph_map.insert(gid, new_gid);
        new_gid
    }

    /// Copy a glyph, returning its output id.
    fn extract_glyph(&mut self, gid: u16) -> Result<u16, SubsetError> {
        if self.in_progress.contains(&gid) {
            return Err(SubsetError::ComponentCycle(gid));
        }
        let reserved = match self.glyph_map.get(&gid) {
            Some(&new_gid) if self.outlines[new_gid as usize].is_some() => return Ok(new_gid),
            other => other.copied(),
        };
        if self.in_progress.len() >= MAX_NESTING_LEVEL {
            return Err(SubsetError::NestingTooDeep(gid));
        }

        let range = self.locations.glyph_range(gid)?;
        let data = self.glyf.slice(range).ok_or(ReadError::MalformedData(
            "glyph extends past the end of the glyf table",
        ))?;
        let bytes = if data.is_empty() {
            Vec::new()
        } else {
            let num_contours: i16 = data
                .read_at(0)
                .map_err(|_| ReadError::MalformedData("glyph is too short"))?;
            match num_contours {
                0.. => data.as_bytes().to_vec(),
                -1 => {
                    self.in_progress.push(gid);
                    let bytes = self.rewrite_composite(data);
                    self.in_progress.pop();
                    bytes?
                }
                contours => return Err(SubsetError::InvalidContourCount { gid, contours }),
            }
        };
        let new_gid = reserved.unwrap_or_else(|| self.reserve(gid));
        if self.debug {
            log::debug!("glyph {gid} -> {new_gid} ({} bytes)", bytes.len());
        }
        self.outlines[new_gid as usize] = Some(bytes);
        Ok(new_gid)
    }

    /// Copy a composite glyph, replacing each component's glyph id with its
    /// output id.
    ///
    /// Anything after the instructions is zeroed; the length is unchanged.
    fn rewrite_composite(&mut self, data: FontData) -> Result<Vec<u8>, SubsetError> {
        let mut out = data.as_bytes().to_owned();

        // reads are bounded by the glyph, so a component list that never
        // ends runs out of data instead of into the next glyph.
        let mut i = GLYPH_HEADER_LEN;
        let mut flags;
        loop {
            flags = CompositeGlyphFlags::from_bits_truncate(data.read_at::<u16>(i)?);
            let component: u16 = data.read_at(i + 2)?;
            let new_component = self.extract_glyph(component)?;
            if let Some(field) = out.get_mut(i + 2..i + 4) {
                field.copy_from_slice(&new_component.to_be_bytes());
            }
            i += 4 + args_len(flags) + transform_len(flags);
            if !flags.contains(CompositeGlyphFlags::MORE_COMPONENTS) {
                break;
            }
        }

        if flags.contains(CompositeGlyphFlags::WE_HAVE_INSTRUCTIONS) {
            let instruction_len: u16 = data.read_at(i)?;
            i += 2 + instruction_len as usize;
        }

        let Some(padding) = out.get_mut(i..) else {
            return Err(ReadError::OutOfBounds.into());
        };
        padding.fill(0);
        Ok(out)
    }

    fn finish(self) -> GlyfSubset {
        let mut glyf = Vec::new();
        let mut loca = Vec::with_capacity(self.outlines.len() + 1);
        for outline in self.outlines.into_iter().flatten() {
            loca.push(glyf.len() as u32);
            glyf.extend_from_slice(&outline);
        }
        loca.push(glyf.len() as u32);
        GlyfSubset {
            glyf,
            loca,
            glyph_order: self.glyph_order,
            glyph_map: self.glyph_map,
        }
    }
}
