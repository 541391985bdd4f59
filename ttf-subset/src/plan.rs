//! Turning a request into the glyphs to keep

use std::collections::BTreeSet;

use font_types::GlyphId16;

use crate::tables::{cmap::CharacterMap, glyf::GlyfSubset};

/// What a subset should contain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubsetRequest {
    /// Every character of some text.
    Text(String),
    /// Unicode code points.
    CodePoints(BTreeSet<u32>),
    /// Glyph ids, along with every code point the font maps to them.
    Glyphs(BTreeSet<u16>),
}

impl SubsetRequest {
    pub fn glyphs(gids: impl IntoIterator<Item = u16>) -> Self {
        SubsetRequest::Glyphs(gids.into_iter().collect())
    }

    pub fn code_points(code_points: impl IntoIterator<Item = u32>) -> Self {
        SubsetRequest::CodePoints(code_points.into_iter().collect())
    }
}

impl From<&str> for SubsetRequest {
    fn from(text: &str) -> Self {
        SubsetRequest::Text(text.to_owned())
    }
}

impl From<String> for SubsetRequest {
    fn from(text: String) -> Self {
        SubsetRequest::Text(text)
    }
}

impl From<&[u32]> for SubsetRequest {
    fn from(code_points: &[u32]) -> Self {
        SubsetRequest::code_points(code_points.iter().copied())
    }
}

impl From<Vec<u32>> for SubsetRequest {
    fn from(code_points: Vec<u32>) -> Self {
        SubsetRequest::code_points(code_points)
    }
}

impl From<BTreeSet<u32>> for SubsetRequest {
    fn from(code_points: BTreeSet<u32>) -> Self {
        SubsetRequest::CodePoints(code_points)
    }
}

/// The code points and glyphs retained by a subset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Plan {
    /// Retained code points and their source glyph ids, in code point order.
    pub unicode_to_old_gid: Vec<(u32, u16)>,
    /// Source glyph ids to extract, in order. Glyphs 0 to 3 are implied.
    pub glyphs: Vec<u16>,
}

impl Plan {
    pub fn new(request: &SubsetRequest, char_map: &CharacterMap) -> Plan {
        let unicode_to_old_gid: Vec<_> = match request {
            SubsetRequest::Text(text) => {
                let code_points: BTreeSet<u32> = text.chars().map(u32::from).collect();
                lookup_code_points(&code_points, char_map)
            }
            SubsetRequest::CodePoints(code_points) => lookup_code_points(code_points, char_map),
            SubsetRequest::Glyphs(gids) => char_map
                .iter()
                .map(|(cp, gid)| (cp, gid.to_u16()))
                .filter(|(_, gid)| gids.contains(gid))
                .collect(),
        };

        let glyphs = match request {
            SubsetRequest::Glyphs(gids) => gids.iter().copied().collect(),
            _ => {
                let mut seen = BTreeSet::new();
                unicode_to_old_gid
                    .iter()
                    .map(|(_, gid)| *gid)
                    .filter(|gid| seen.insert(*gid))
                    .collect()
            }
        };
        Plan {
            unicode_to_old_gid,
            glyphs,
        }
    }

    /// The retained code points mapped to output glyph ids.
    pub fn output_mappings(&self, glyf: &GlyfSubset) -> Vec<(u32, GlyphId16)> {
        self.unicode_to_old_gid
            .iter()
            .filter_map(|(cp, old_gid)| Some((*cp, GlyphId16::new(glyf.new_gid(*old_gid)?))))
            .collect()
    }
}

fn lookup_code_points(code_points: &BTreeSet<u32>, char_map: &CharacterMap) -> Vec<(u32, u16)> {
    code_points
        .iter()
        .filter_map(|cp| match char_map.get(*cp) {
            Some(gid) => Some((*cp, gid.to_u16())),
            None => {
                log::warn!("U+{cp:04X} is not mapped by the font, skipping");
                None
            }
        })
        .collect()
}
