//! small utilities used in tests

use font_types::{Scalar, Tag};
use write_fonts::{
    read::{tables::glyf::CompositeGlyphFlags, FontData},
    tables::loca::LocaFormat,
    FontBuilder,
};

/// A convenience type for generating a buffer of big-endian bytes.
#[derive(Debug, Clone, Default)]
pub struct BeBuffer {
    data: Vec<u8>,
}

impl BeBuffer {
    pub fn new() -> Self {
        Default::default()
    }

    /// The current length of the buffer in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Write any scalar to this buffer.
    pub fn push(mut self, item: impl Scalar) -> Self {
        self.data.extend(item.to_raw().as_ref());
        self
    }

    /// Write multiple scalars into the buffer
    pub fn extend<T: Scalar>(mut self, iter: impl IntoIterator<Item = T>) -> Self {
        for item in iter {
            self.data.extend(item.to_raw().as_ref());
        }
        self
    }

    pub fn font_data(&self) -> FontData {
        FontData::new(&self.data)
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.data.clone()
    }
}

impl std::ops::Deref for BeBuffer {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

/// A simple glyph with `num_contours` contours and `len` bytes in total.
///
/// The bytes after the header are filler; nothing here interprets them.
pub fn simple_glyph(num_contours: i16, len: usize) -> Vec<u8> {
    assert!(len >= 10);
    let mut glyph = BeBuffer::new()
        .push(num_contours)
        .extend([0i16, 0, 500, 700])
        .to_vec();
    glyph.extend((0..len - 10).map(|i| (i % 251) as u8 + 1));
    glyph
}

/// A component record: flags, child glyph id and the trailing argument and
/// transform bytes (whose size is implied by the flags).
pub fn component(flags: CompositeGlyphFlags, gid: u16) -> BeBuffer {
    let mut buf = BeBuffer::new().push(flags.bits()).push(gid);
    buf = if flags.contains(CompositeGlyphFlags::ARG_1_AND_2_ARE_WORDS) {
        buf.extend([100i16, -100])
    } else {
        buf.extend([10i8, -10])
    };
    if flags.contains(CompositeGlyphFlags::WE_HAVE_A_SCALE) {
        buf = buf.push(0x2000u16);
    } else if flags.contains(CompositeGlyphFlags::WE_HAVE_AN_X_AND_Y_SCALE) {
        buf = buf.extend([0x2000u16, 0x3000]);
    } else if flags.contains(CompositeGlyphFlags::WE_HAVE_A_TWO_BY_TWO) {
        buf = buf.extend([0x4000u16, 0, 0, 0x4000]);
    }
    buf
}

/// A composite glyph built from the given components.
pub fn composite_glyph(components: &[BeBuffer], instructions: Option<&[u8]>) -> Vec<u8> {
    let mut glyph = BeBuffer::new().push(-1i16).extend([0i16, 0, 600, 700]).to_vec();
    for component in components {
        glyph.extend_from_slice(component);
    }
    if let Some(instructions) = instructions {
        glyph.extend_from_slice(&(instructions.len() as u16).to_be_bytes());
        glyph.extend_from_slice(instructions);
    }
    glyph
}

/// A format 4 subtable with one segment per mapping.
pub fn cmap4(mappings: &[(u16, u16)]) -> Vec<u8> {
    let mut mappings = mappings.to_vec();
    mappings.sort();
    let seg_count = mappings.len() as u16 + 1;
    let ends = mappings.iter().map(|(cp, _)| *cp).chain([0xFFFF]);
    let deltas = mappings
        .iter()
        .map(|(cp, gid)| gid.wrapping_sub(*cp))
        .chain([1]);
    BeBuffer::new()
        .extend([4u16, 16 + 8 * seg_count, 0, seg_count * 2, 0, 0, 0])
        .extend(ends.clone())
        .push(0u16)
        .extend(ends)
        .extend(deltas)
        .extend(std::iter::repeat(0u16).take(seg_count as usize))
        .to_vec()
}

/// Builds small but structurally complete TrueType fonts.
///
/// Glyphs 0..=3 are a .notdef outline followed by three empty glyphs.
#[derive(Clone, Debug)]
pub struct TestFont {
    glyphs: Vec<Vec<u8>>,
    cmap_subtables: Vec<(u16, u16, Vec<u8>)>,
    long_loca: bool,
    extra_tables: Vec<(Tag, Vec<u8>)>,
}

impl Default for TestFont {
    fn default() -> Self {
        TestFont {
            glyphs: vec![simple_glyph(1, 20), Vec::new(), Vec::new(), Vec::new()],
            cmap_subtables: Vec::new(),
            long_loca: false,
            extra_tables: Vec::new(),
        }
    }
}

impl TestFont {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a glyph; its id is the number of glyphs added before it.
    pub fn glyph(mut self, data: Vec<u8>) -> Self {
        self.glyphs.push(data);
        self
    }

    /// Swap out the outline of an existing glyph.
    pub fn replace_glyph(mut self, gid: u16, data: Vec<u8>) -> Self {
        self.glyphs[gid as usize] = data;
        self
    }

    pub fn num_glyphs(&self) -> u16 {
        self.glyphs.len() as u16
    }

    pub fn cmap_subtable(mut self, platform_id: u16, encoding_id: u16, data: Vec<u8>) -> Self {
        self.cmap_subtables.push((platform_id, encoding_id, data));
        self
    }

    pub fn cmap4(self, mappings: &[(u16, u16)]) -> Self {
        self.cmap_subtable(3, 1, cmap4(mappings))
    }

    pub fn long_loca(mut self, long: bool) -> Self {
        self.long_loca = long;
        self
    }

    pub fn loca_format(&self) -> LocaFormat {
        if self.long_loca {
            LocaFormat::Long
        } else {
            LocaFormat::Short
        }
    }

    /// Replace (or add) a table with raw data.
    pub fn table(mut self, tag: Tag, data: Vec<u8>) -> Self {
        self.extra_tables.push((tag, data));
        self
    }

    pub fn cmap_bytes(&self) -> Vec<u8> {
        let mut header = BeBuffer::new().extend([0u16, self.cmap_subtables.len() as u16]);
        let mut offset = 4 + 8 * self.cmap_subtables.len() as u32;
        for (platform_id, encoding_id, data) in &self.cmap_subtables {
            header = header.extend([*platform_id, *encoding_id]).push(offset);
            offset += data.len() as u32;
        }
        let mut out = header.to_vec();
        for (_, _, data) in &self.cmap_subtables {
            out.extend_from_slice(data);
        }
        out
    }

    pub fn glyf_and_loca(&self) -> (Vec<u8>, Vec<u8>) {
        let mut glyf = Vec::new();
        let mut loca = Vec::new();
        for glyph in &self.glyphs {
            self.write_loca_entry(&mut loca, glyf.len());
            glyf.extend_from_slice(glyph);
        }
        self.write_loca_entry(&mut loca, glyf.len());
        (glyf, loca)
    }

    fn write_loca_entry(&self, loca: &mut Vec<u8>, offset: usize) {
        if self.long_loca {
            loca.extend_from_slice(&(offset as u32).to_be_bytes());
        } else {
            assert!(offset % 2 == 0, "short loca needs even glyph lengths");
            loca.extend_from_slice(&((offset / 2) as u16).to_be_bytes());
        }
    }

    pub fn head_bytes(&self) -> Vec<u8> {
        BeBuffer::new()
            .extend([1u16, 0]) // version
            .extend([2u16, 0x8000]) // font revision
            .push(0u32) // checksum adjustment
            .push(0x5F0F3CF5u32) // magic
            .extend([0x000Bu16, 1000]) // flags, units per em
            .extend([0u32, 0x12345678, 0, 0x23456789]) // created, modified
            .extend([-10i16, -200, 900, 800]) // bbox
            .extend([0u16, 8]) // mac style, lowest rec ppem
            .push(2i16) // font direction hint
            .push(self.long_loca as i16)
            .push(0i16)
            .to_vec()
    }

    pub fn hhea_bytes(&self) -> Vec<u8> {
        BeBuffer::new()
            .extend([1u16, 0])
            .extend([800i16, -200, 0]) // ascender, descender, line gap
            .push(900u16) // advance width max
            .extend([-10i16, -20, 900, 1, 0, 0]) // lsb/rsb/extent/caret
            .extend([0i16; 4]) // reserved
            .push(0i16) // metric data format
            .push(self.num_glyphs())
            .to_vec()
    }

    pub fn hmtx_bytes(&self) -> Vec<u8> {
        let mut buf = BeBuffer::new();
        for gid in 0..self.num_glyphs() {
            buf = buf.push(500 + gid * 10).push(gid as i16);
        }
        buf.to_vec()
    }

    pub fn maxp_bytes(&self) -> Vec<u8> {
        BeBuffer::new()
            .push(0x00010000u32)
            .push(self.num_glyphs())
            .extend([40u16, 4, 80, 8, 2, 0, 0, 0, 0, 64, 0, 2, 1])
            .to_vec()
    }

    pub fn name_bytes(&self) -> Vec<u8> {
        BeBuffer::new()
            .extend([0u16, 1, 18]) // format, count, storage offset
            .extend([3u16, 1, 0x409, 1, 8, 0]) // family name record
            .extend("Test".encode_utf16())
            .to_vec()
    }

    pub fn post_bytes(&self) -> Vec<u8> {
        let mut buf = BeBuffer::new()
            .push(0x00020000u32)
            .push(0xFFF10000u32) // italic angle -15
            .extend([-75i16, 50])
            .push(1u32) // fixed pitch
            .extend([0u32; 4])
            .push(self.num_glyphs());
        for gid in 0..self.num_glyphs() {
            buf = buf.push(gid);
        }
        buf.to_vec()
    }

    pub fn build(&self) -> Vec<u8> {
        let (glyf, loca) = self.glyf_and_loca();
        let mut builder = FontBuilder::new();
        builder
            .add_raw(Tag::new(b"cmap"), self.cmap_bytes())
            .add_raw(Tag::new(b"glyf"), glyf)
            .add_raw(Tag::new(b"head"), self.head_bytes())
            .add_raw(Tag::new(b"hhea"), self.hhea_bytes())
            .add_raw(Tag::new(b"hmtx"), self.hmtx_bytes())
            .add_raw(Tag::new(b"loca"), loca)
            .add_raw(Tag::new(b"maxp"), self.maxp_bytes())
            .add_raw(Tag::new(b"name"), self.name_bytes())
            .add_raw(Tag::new(b"post"), self.post_bytes());
        for (tag, data) in &self.extra_tables {
            builder.add_raw(*tag, data.clone());
        }
        builder.build()
    }
}
