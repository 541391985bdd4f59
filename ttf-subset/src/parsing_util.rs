//! subsetter input parsing util functions

use std::{collections::BTreeSet, sync::LazyLock};

use regex::Regex;

use crate::SubsetError;

/// The largest Unicode code point.
const MAX_UNICODE: u32 = 0x10FFFF;

static UNICODE_SEPARATORS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[><\+,;&#}{\\xXuUnNiI\n\t\v\f\r]").expect("separator pattern is valid")
});

/// Parse a comma/whitespace-separated list of glyph ids or ranges of glyph
/// ids, for example `1,5,7-9`.
pub fn parse_gids(gid_str: &str) -> Result<BTreeSet<u16>, SubsetError> {
    let mut result = BTreeSet::new();
    for gid in gid_str
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|raw| !raw.is_empty())
    {
        if let Some((start, end)) = gid.split_once('-') {
            let start = parse_gid(start)?;
            let end = parse_gid(end)?;
            if start > end {
                return Err(SubsetError::InvalidGidRange {
                    start: start as u32,
                    end: end as u32,
                });
            }
            result.extend(start..=end);
        } else {
            result.insert(parse_gid(gid)?);
        }
    }
    Ok(result)
}

fn parse_gid(raw: &str) -> Result<u16, SubsetError> {
    raw.parse::<u16>()
        .map_err(|_| SubsetError::InvalidGid(raw.to_owned()))
}

/// parse input unicodes string, which is a comma/whitespace-separated list of Unicode codepoints or ranges as hex numbers,
/// optionally prefixed with 'U+', 'u', etc. For example: --unicodes=41-5a,61-7a adds ASCII letters, so does the more verbose --unicodes=U+0041-005A,U+0061-007A.
pub fn parse_unicodes(unicode_str: &str) -> Result<BTreeSet<u32>, SubsetError> {
    let mut result = BTreeSet::new();
    let s = UNICODE_SEPARATORS.replace_all(unicode_str, " ");
    for cp in s.split_whitespace() {
        if let Some((start, end)) = cp.split_once('-') {
            let start = parse_unicode(start)?;
            let end = parse_unicode(end)?;
            if start > end {
                return Err(SubsetError::InvalidUnicodeRange { start, end });
            }
            result.extend(start..=end);
        } else {
            result.insert(parse_unicode(cp)?);
        }
    }
    Ok(result)
}

fn parse_unicode(raw: &str) -> Result<u32, SubsetError> {
    u32::from_str_radix(raw, 16)
        .ok()
        .filter(|cp| *cp <= MAX_UNICODE)
        .ok_or_else(|| SubsetError::InvalidUnicode(raw.to_owned()))
}
