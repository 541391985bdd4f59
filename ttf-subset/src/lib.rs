//! Extract a minimal TrueType font from a larger one.
//!
//! A subset keeps only the glyph outlines needed to render some text, along
//! with the character mappings for that text. Composite glyphs pull in the
//! glyphs they are built from, and glyphs are renumbered so that the output
//! is as small as possible.
//!
//! ```no_run
//! # fn main() -> Result<(), ttf_subset::SubsetError> {
//! use ttf_subset::{SubsetOptions, Subsetter};
//!
//! let subsetter = Subsetter::open("NotoSans-Regular.ttf", SubsetOptions::default())?;
//! let font = subsetter.subset("Hello")?;
//! std::fs::write("NotoSans-Hello.ttf", font)?;
//! # Ok(())
//! # }
//! ```

pub mod parsing_util;
pub mod plan;
pub mod tables;

#[cfg(test)]
mod test_helpers;

use std::{collections::BTreeSet, path::Path, sync::OnceLock};

use font_types::{Tag, CFF_SFNT_VERSION};
use thiserror::Error;
use write_fonts::{
    read::{
        tables::{cmap::Cmap, hmtx::Hmtx, loca::Loca},
        FontData, FontRead, FontRef, TableProvider,
    },
    tables::loca::LocaFormat,
    FontBuilder,
};

pub use parsing_util::{parse_gids, parse_unicodes};
pub use plan::SubsetRequest;
pub use write_fonts::read::{ReadError, TableRecord};

use plan::Plan;
use tables::{
    cmap::{write_cmap, CharacterMap, PLATFORM_WINDOWS},
    glyf,
    head::{loca_format, read_head, write_head},
    hmtx::{read_hhea, remap_hmtx, write_hhea},
    loca::{write_loca, GlyphLocations},
    maxp::{read_maxp, write_maxp},
    post::write_post,
    CMAP, GLYF, HEAD, HHEA, HMTX, LOCA, MAXP, NAME, POST,
};

#[derive(Debug, Error)]
pub enum SubsetError {
    #[error("Corrupt font: {0}")]
    CorruptFont(#[from] ReadError),

    #[error("Unsupported cmap subtable format {0}")]
    UnsupportedFormat(u16),

    #[error("Unexpected length for table '{tag}': expected {expected}, found {actual}")]
    LayoutMismatch { tag: Tag, expected: u32, actual: u32 },

    #[error("Glyph {0} is not in the font")]
    GlyphIsMissing(u16),

    #[error("Glyph {gid} has an invalid contour count {contours}")]
    InvalidContourCount { gid: u16, contours: i16 },

    #[error("Glyph {0} is a component of itself")]
    ComponentCycle(u16),

    #[error("Components of glyph {0} are nested too deeply")]
    NestingTooDeep(u16),

    #[error("Invalid input gid {0}")]
    InvalidGid(String),

    #[error("Invalid gid range {start}-{end}")]
    InvalidGidRange { start: u32, end: u32 },

    #[error("Invalid input unicode {0}")]
    InvalidUnicode(String),

    #[error("Invalid unicode range {start}-{end}")]
    InvalidUnicodeRange { start: u32, end: u32 },

    #[error("Failed to write table: {0}")]
    Write(#[from] write_fonts::error::Error),

    #[error("Failed to read font file: {0}")]
    Io(#[from] std::io::Error),
}

/// Settings that apply to every subset made from a font.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubsetOptions {
    /// The cmap platform whose subtables are used to map characters.
    pub platform_id: u16,
    /// Log the table directory, the decoded cmap and every extracted glyph.
    ///
    /// This never changes the output.
    pub debug: bool,
    /// Rebuild `hmtx` in output glyph order instead of copying it.
    pub remap_metrics: bool,
}

impl Default for SubsetOptions {
    fn default() -> Self {
        SubsetOptions {
            platform_id: PLATFORM_WINDOWS,
            debug: false,
            remap_metrics: false,
        }
    }
}

impl SubsetOptions {
    pub fn with_platform_id(mut self, platform_id: u16) -> Self {
        self.platform_id = platform_id;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_remap_metrics(mut self, remap_metrics: bool) -> Self {
        self.remap_metrics = remap_metrics;
        self
    }
}

/// A source font, ready to be subset any number of times.
///
/// The table directory is read up front; the character map is decoded the
/// first time it is needed and then reused.
#[derive(Debug)]
pub struct Subsetter {
    data: Vec<u8>,
    records: Vec<TableRecord>,
    options: SubsetOptions,
    char_map: OnceLock<CharacterMap>,
}

impl Subsetter {
    /// Read the font at `path`.
    pub fn open(path: impl AsRef<Path>, options: SubsetOptions) -> Result<Self, SubsetError> {
        let path = path.as_ref();
        log::info!("reading {}", path.display());
        Subsetter::new(std::fs::read(path)?, options)
    }

    /// Check the table directory of a TrueType font.
    ///
    /// Every table must lie within the file; CFF outlines are rejected.
    pub fn new(data: Vec<u8>, options: SubsetOptions) -> Result<Self, SubsetError> {
        let font = FontRef::new(&data)?;
        let sfnt_version = font.table_directory().sfnt_version();
        if sfnt_version == CFF_SFNT_VERSION {
            return Err(ReadError::InvalidSfnt(sfnt_version).into());
        }
        let records = font.table_directory().table_records().to_vec();
        for record in &records {
            if options.debug {
                log::debug!(
                    "table '{}' offset {} length {} checksum 0x{:08X}",
                    record.tag(),
                    record.offset(),
                    record.length(),
                    record.checksum()
                );
            }
            if record.length() > 0 && font.table_data(record.tag()).is_none() {
                return Err(
                    ReadError::MalformedData("table extends past the end of the file").into(),
                );
            }
        }
        Ok(Subsetter {
            data,
            records,
            options,
            char_map: OnceLock::new(),
        })
    }

    pub fn options(&self) -> &SubsetOptions {
        &self.options
    }

    /// The records of every table in the source font.
    pub fn table_records(&self) -> &[TableRecord] {
        &self.records
    }

    fn font(&self) -> Result<FontRef<'_>, ReadError> {
        FontRef::new(&self.data)
    }

    fn table_data(&self, tag: Tag) -> Result<FontData<'_>, SubsetError> {
        Ok(self.font()?.expect_data_for_tag(tag)?)
    }

    /// The mapping from code points to glyphs for the configured platform.
    pub fn character_map(&self) -> Result<&CharacterMap, SubsetError> {
        if let Some(char_map) = self.char_map.get() {
            return Ok(char_map);
        }
        let cmap = Cmap::read(self.table_data(CMAP)?)?;
        let char_map = CharacterMap::resolve(&cmap, self.options.platform_id, self.options.debug)?;
        Ok(self.char_map.get_or_init(|| char_map))
    }

    /// The glyph the font maps a code point to.
    pub fn glyph_id(&self, code_point: u32) -> Result<Option<u16>, SubsetError> {
        Ok(self
            .character_map()?
            .get(code_point)
            .map(|gid| gid.to_u16()))
    }

    /// Every code point mapped by the font.
    pub fn supported_code_points(&self) -> Result<BTreeSet<u32>, SubsetError> {
        Ok(self.character_map()?.code_points().collect())
    }

    /// Every character mapped by the font, in code point order.
    ///
    /// Code points that aren't valid characters (such as surrogates) are
    /// left out.
    pub fn supported_text(&self) -> Result<String, SubsetError> {
        Ok(self
            .character_map()?
            .code_points()
            .filter_map(char::from_u32)
            .collect())
    }

    /// Build a font containing only what `request` needs.
    ///
    /// Glyphs 0 to 3 are always kept, as output glyphs 0 to 3.
    pub fn subset(&self, request: impl Into<SubsetRequest>) -> Result<Vec<u8>, SubsetError> {
        let request = request.into();
        let head = read_head(self.table_data(HEAD)?)?;
        let maxp = read_maxp(self.table_data(MAXP)?)?;
        let is_long = loca_format(&head)? == LocaFormat::Long;
        let loca = Loca::read(self.table_data(LOCA)?, is_long)?;
        let locations = GlyphLocations::new(loca, maxp.num_glyphs());

        let plan = Plan::new(&request, self.character_map()?);
        let glyf = glyf::extract(
            self.table_data(GLYF)?,
            &locations,
            &plan.glyphs,
            self.options.debug,
        )?;
        if self.options.debug {
            log::debug!("glyph order {:?}", glyf.glyph_order());
        }
        log::info!(
            "keeping {} code points and {} of {} glyphs",
            plan.unicode_to_old_gid.len(),
            glyf.num_glyphs(),
            maxp.num_glyphs()
        );

        let (loca_table, loca_format) = write_loca(&glyf.loca);
        let hhea_data = self.table_data(HHEA)?;
        let hmtx_data = self.table_data(HMTX)?;
        let (hhea_table, hmtx_table) = if self.options.remap_metrics {
            let hhea = read_hhea(hhea_data)?;
            let hmtx = Hmtx::read(hmtx_data, hhea.number_of_h_metrics())?;
            let (hmtx_table, num_long_metrics) = remap_hmtx(&hmtx, glyf.glyph_order())?;
            (write_hhea(&hhea, num_long_metrics), hmtx_table)
        } else {
            (hhea_data.as_bytes().to_vec(), hmtx_data.as_bytes().to_vec())
        };

        let mut builder = FontBuilder::new();
        builder
            .add_raw(CMAP, write_cmap(&plan.output_mappings(&glyf))?)
            .add_raw(HEAD, write_head(&head, loca_format))
            .add_raw(HHEA, hhea_table)
            .add_raw(HMTX, hmtx_table)
            .add_raw(LOCA, loca_table)
            .add_raw(MAXP, write_maxp(&maxp, glyf.num_glyphs()))
            .add_raw(NAME, self.table_data(NAME)?.as_bytes())
            .add_raw(POST, write_post(self.table_data(POST)?)?)
            .add_raw(GLYF, glyf.glyf);
        Ok(builder.build())
    }
}
