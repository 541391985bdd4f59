//! The tables read from the source font and written to the subset.

pub mod cmap;
pub mod glyf;
pub mod head;
pub mod hmtx;
pub mod loca;
pub mod maxp;
pub mod post;

use font_types::Tag;

pub const CMAP: Tag = Tag::new(b"cmap");
pub const GLYF: Tag = Tag::new(b"glyf");
pub const HEAD: Tag = Tag::new(b"head");
pub const HHEA: Tag = Tag::new(b"hhea");
pub const HMTX: Tag = Tag::new(b"hmtx");
pub const LOCA: Tag = Tag::new(b"loca");
pub const MAXP: Tag = Tag::new(b"maxp");
pub const NAME: Tag = Tag::new(b"name");
pub const POST: Tag = Tag::new(b"post");

/// The tables every subset is built from, in table directory order.
pub const REQUIRED_TABLES: [Tag; 9] = [CMAP, GLYF, HEAD, HHEA, HMTX, LOCA, MAXP, NAME, POST];
