//! Font handling for PDF documents

use crate::{PdfError, Result};
use lopdf::{Dictionary, Object, Stream};
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use subsetter::GlyphRemapper;

/// Font weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

/// Glyph subset produced at save time
#[derive(Debug, Clone)]
struct FontSubset {
    /// Subsetted TrueType program
    data: Vec<u8>,
    /// Original glyph ID -> subset glyph ID
    gid_map: HashMap<u16, u16>,
    /// Six-letter subset tag (e.g. "KQWZBT")
    tag: String,
}

/// Font data structure for embedded fonts
#[derive(Debug, Clone)]
pub struct FontData {
    /// Font name/identifier
    pub name: String,
    /// Raw TTF data
    ttf_data: &'static [u8],
    /// Characters used (for subsetting)
    pub used_chars: HashSet<char>,
    /// Parsed font face
    face: ttf_parser::Face<'static>,
    /// Subset created by `create_subset`
    subset: Option<FontSubset>,
}

/// PDF objects generated for font embedding
pub struct FontObjects {
    /// Type0 font dictionary
    pub type0_font: Dictionary,
    /// CIDFont Type2 dictionary
    pub cid_font: Dictionary,
    /// Font descriptor dictionary
    pub font_descriptor: Dictionary,
    /// Font file stream (TTF data)
    pub font_file_stream: Stream,
    /// ToUnicode CMap stream
    pub tounicode_stream: Stream,
}

/// Font family with a regular and an optional bold variant
#[derive(Debug, Clone)]
pub struct FontFamily {
    /// Regular variant (required)
    pub regular: FontData,
    /// Bold variant
    pub bold: Option<FontData>,
}

impl FontFamily {
    /// Get the font data for the specified weight
    /// Falls back to regular if bold is not available
    pub fn get_variant(&self, weight: FontWeight) -> &FontData {
        match weight {
            FontWeight::Bold => self.bold.as_ref().unwrap_or(&self.regular),
            FontWeight::Regular => &self.regular,
        }
    }

    /// Iterate over every loaded variant
    pub fn variants(&self) -> impl Iterator<Item = &FontData> {
        std::iter::once(&self.regular).chain(self.bold.as_ref())
    }

    /// Iterate mutably over every loaded variant
    pub fn variants_mut(&mut self) -> impl Iterator<Item = &mut FontData> {
        std::iter::once(&mut self.regular).chain(self.bold.as_mut())
    }
}

/// Builder for registering font families
///
/// Font programs must outlive the process-wide face tables, so variants are
/// passed as `'static` byte slices (typically from a font cache or
/// `include_bytes!`).
#[derive(Debug, Default)]
pub struct FontFamilyBuilder {
    regular: Option<&'static [u8]>,
    bold: Option<&'static [u8]>,
}

impl FontFamilyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn regular(mut self, ttf_data: &'static [u8]) -> Self {
        self.regular = Some(ttf_data);
        self
    }

    pub fn bold(mut self, ttf_data: &'static [u8]) -> Self {
        self.bold = Some(ttf_data);
        self
    }

    /// Build the FontFamily from the provided TTF data
    pub fn build(self, family_name: &str) -> Result<FontFamily> {
        let regular = match self.regular {
            Some(data) => FontData::from_static(family_name, data)?,
            None => {
                return Err(PdfError::FontParseError(
                    "FontFamily must have at least a regular variant".to_string(),
                ))
            }
        };

        let bold = self
            .bold
            .map(|data| FontData::from_static(&variant_name(family_name, FontWeight::Bold), data))
            .transpose()?;

        Ok(FontFamily { regular, bold })
    }
}

/// Internal font name for a family variant (used to look fonts up by name)
pub(crate) fn variant_name(family_name: &str, weight: FontWeight) -> String {
    match weight {
        FontWeight::Bold => format!("{family_name}-bold"),
        FontWeight::Regular => family_name.to_string(),
    }
}

impl FontData {
    /// Create font data from TTF bytes that live for the rest of the process
    pub fn from_static(name: &str, ttf_data: &'static [u8]) -> Result<Self> {
        let face = ttf_parser::Face::parse(ttf_data, 0)
            .map_err(|e| PdfError::FontParseError(format!("{e:?}")))?;

        Ok(Self {
            name: name.to_string(),
            ttf_data,
            used_chars: HashSet::new(),
            face,
            subset: None,
        })
    }

    /// Add characters to the used set (for subsetting)
    pub fn add_chars(&mut self, text: &str) {
        self.used_chars.extend(text.chars());
    }

    /// Get glyph ID for a character
    pub fn glyph_id(&self, c: char) -> Option<u16> {
        self.face.glyph_index(c).map(|id| id.0)
    }

    /// Check if font has a glyph for the given character
    pub fn has_glyph(&self, c: char) -> bool {
        self.glyph_id(c).map(|id| id != 0).unwrap_or(false)
    }

    /// Get glyph advance width in font units
    pub fn glyph_advance(&self, c: char) -> Option<u16> {
        let glyph_id = self.face.glyph_index(c)?;
        self.face.glyph_hor_advance(glyph_id)
    }

    /// Get font units per em
    pub fn units_per_em(&self) -> u16 {
        self.face.units_per_em()
    }

    /// Get font ascender
    pub fn ascender(&self) -> i16 {
        self.face.ascender()
    }

    /// Get font descender
    pub fn descender(&self) -> i16 {
        self.face.descender()
    }

    /// Calculate text width in font units
    pub fn text_width(&self, text: &str) -> u32 {
        text.chars()
            .filter_map(|c| self.glyph_advance(c))
            .map(|w| w as u32)
            .sum()
    }

    /// Calculate text width in points for a given font size
    pub fn text_width_points(&self, text: &str, font_size: f32) -> f32 {
        let width = self.text_width(text);
        let units_per_em = self.units_per_em() as f32;
        (width as f32 / units_per_em) * font_size
    }

    /// Whether `create_subset` has run
    pub fn is_subsetted(&self) -> bool {
        self.subset.is_some()
    }

    /// Size in bytes of the font program that will be embedded
    pub fn embedded_size(&self) -> usize {
        self.subset
            .as_ref()
            .map(|s| s.data.len())
            .unwrap_or(self.ttf_data.len())
    }

    /// Reduce the font program to the glyphs of `used_chars`
    ///
    /// Glyph IDs are renumbered; text must be encoded afterwards with
    /// `encode_text_hex_remapped`.
    pub fn create_subset(&mut self) -> Result<()> {
        let mut gids: Vec<u16> = self
            .used_chars
            .iter()
            .filter_map(|&c| self.glyph_id(c))
            .collect();
        gids.sort_unstable();
        gids.dedup();

        let mut remapper = GlyphRemapper::new();
        let mut gid_map = HashMap::with_capacity(gids.len() + 1);
        gid_map.insert(0, remapper.remap(0));
        for &gid in &gids {
            gid_map.insert(gid, remapper.remap(gid));
        }

        let data = subsetter::subset(self.ttf_data, 0, &remapper)
            .map_err(|e| PdfError::FontSubsetError(format!("{}: {e:?}", self.name)))?;

        tracing::debug!(
            font = %self.name,
            glyphs = gid_map.len(),
            original_bytes = self.ttf_data.len(),
            subset_bytes = data.len(),
            "font subsetted"
        );

        self.subset = Some(FontSubset {
            data,
            tag: subset_tag(&gids),
            gid_map,
        });

        Ok(())
    }

    /// Glyph ID written to the content stream for `c`
    fn output_gid(&self, c: char) -> u16 {
        let gid = self.glyph_id(c).unwrap_or(0);
        match &self.subset {
            Some(subset) => subset.gid_map.get(&gid).copied().unwrap_or(0),
            None => gid,
        }
    }

    /// Encode text as hex string for PDF Tj operator using original glyph IDs
    pub fn encode_text_hex(&self, text: &str) -> String {
        let mut result = String::with_capacity(text.len() * 4 + 2);
        result.push('<');
        for c in text.chars() {
            let gid = self.glyph_id(c).unwrap_or(0);
            result.push_str(&format!("{gid:04X}"));
        }
        result.push('>');
        result
    }

    /// Encode text as hex string using subset glyph IDs
    ///
    /// Falls back to original glyph IDs when the font was not subsetted.
    pub fn encode_text_hex_remapped(&self, text: &str) -> String {
        let mut result = String::with_capacity(text.len() * 4 + 2);
        result.push('<');
        for c in text.chars() {
            result.push_str(&format!("{:04X}", self.output_gid(c)));
        }
        result.push('>');
        result
    }

    /// PostScript name from the font's name table
    fn postscript_name(&self) -> String {
        self.face
            .names()
            .into_iter()
            .filter(|n| n.name_id == ttf_parser::name_id::POST_SCRIPT_NAME)
            .find_map(|n| n.to_string())
            .map(|n| n.chars().filter(|c| c.is_ascii_graphic()).collect::<String>())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| self.name.clone())
    }

    /// BaseFont name, prefixed with the subset tag when subsetted
    pub fn base_font_name(&self) -> String {
        match &self.subset {
            Some(subset) => format!("{}+{}", subset.tag, self.postscript_name()),
            None => self.postscript_name(),
        }
    }

    /// Scale a value in font units to PDF glyph space (1/1000 em)
    fn to_glyph_space(&self, value: i32) -> i64 {
        (value as f64 * 1000.0 / self.units_per_em() as f64).round() as i64
    }

    /// Generate all PDF objects needed to embed this font
    pub fn to_pdf_objects(&self) -> Result<FontObjects> {
        let font_name = Object::Name(self.base_font_name().into_bytes());

        // Generate ToUnicode CMap
        let tounicode_content = self.generate_tounicode_cmap();
        let tounicode_stream = Stream::new(Dictionary::new(), tounicode_content.into_bytes());

        // Generate font file stream
        let program = match &self.subset {
            Some(subset) => subset.data.clone(),
            None => self.ttf_data.to_vec(),
        };
        let font_file_stream = Stream::new(
            Dictionary::from_iter(vec![("Length1", (program.len() as i64).into())]),
            program,
        );

        let bbox = self.face.global_bounding_box();
        let font_bbox: Vec<Object> = vec![
            self.to_glyph_space(bbox.x_min as i32).into(),
            self.to_glyph_space(bbox.y_min as i32).into(),
            self.to_glyph_space(bbox.x_max as i32).into(),
            self.to_glyph_space(bbox.y_max as i32).into(),
        ];
        let ascent = self.to_glyph_space(self.ascender() as i32);
        let descent = self.to_glyph_space(self.descender() as i32);
        let cap_height = self
            .face
            .capital_height()
            .map(|h| self.to_glyph_space(h as i32))
            .unwrap_or(ascent);

        let font_descriptor = Dictionary::from_iter(vec![
            ("Type", "FontDescriptor".into()),
            ("FontName", font_name.clone()),
            ("Flags", 4.into()), // Symbolic font
            ("FontBBox", font_bbox.into()),
            ("ItalicAngle", 0.into()),
            ("Ascent", ascent.into()),
            ("Descent", descent.into()),
            ("CapHeight", cap_height.into()),
            ("StemV", 80.into()),
            ("FontFile2", Object::Reference((0, 0))), // Placeholder, set when embedding
        ]);

        let cid_system_info = Dictionary::from_iter(vec![
            ("Registry", Object::string_literal("Adobe")),
            ("Ordering", Object::string_literal("Identity")),
            ("Supplement", 0.into()),
        ]);

        let cid_font = Dictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("Subtype", "CIDFontType2".into()),
            ("BaseFont", font_name.clone()),
            ("CIDSystemInfo", cid_system_info.into()),
            ("FontDescriptor", Object::Reference((0, 0))), // Placeholder, set when embedding
            ("CIDToGIDMap", "Identity".into()),
            ("W", self.generate_widths_array().into()),
            ("DW", 1000.into()),
        ]);

        let type0_font = Dictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("Subtype", "Type0".into()),
            ("BaseFont", font_name),
            ("Encoding", "Identity-H".into()),
            ("DescendantFonts", vec![Object::Reference((0, 0))].into()), // Placeholder
            ("ToUnicode", Object::Reference((0, 0))),                   // Placeholder
        ]);

        Ok(FontObjects {
            type0_font,
            cid_font,
            font_descriptor,
            font_file_stream,
            tounicode_stream,
        })
    }

    /// Used characters with their output glyph IDs, ordered by glyph then char
    fn used_glyphs(&self) -> Vec<(u16, char)> {
        let mut glyphs: Vec<(u16, char)> = self
            .used_chars
            .iter()
            .map(|&c| (self.output_gid(c), c))
            .collect();
        glyphs.sort_unstable();
        glyphs
    }

    /// Generate /W array for glyph widths: [gid1 [width1] gid2 [width2] ...]
    fn generate_widths_array(&self) -> Vec<Object> {
        let mut widths = Vec::new();
        let mut last_gid = None;

        for (gid, c) in self.used_glyphs() {
            if last_gid == Some(gid) {
                continue;
            }
            last_gid = Some(gid);

            let advance = self.glyph_advance(c).unwrap_or(0) as i32;
            widths.push((gid as i64).into());
            widths.push(vec![self.to_glyph_space(advance).into()].into());
        }

        widths
    }

    /// Generate ToUnicode CMap stream content
    fn generate_tounicode_cmap(&self) -> String {
        let mut cmap = String::new();

        cmap.push_str("/CIDInit /ProcSet findresource begin\n");
        cmap.push_str("12 dict begin\n");
        cmap.push_str("begincmap\n");
        cmap.push_str("/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
        cmap.push_str("/CMapName /Adobe-Identity-UCS def\n");
        cmap.push_str("/CMapType 2 def\n");
        cmap.push_str("1 begincodespacerange\n");
        cmap.push_str("<0000> <FFFF>\n");
        cmap.push_str("endcodespacerange\n");

        // First char wins when several chars share a glyph
        let mut mappings: Vec<(u16, char)> = Vec::new();
        for (gid, c) in self.used_glyphs() {
            if gid != 0 && mappings.last().map(|(g, _)| *g) != Some(gid) {
                mappings.push((gid, c));
            }
        }

        // bfchar sections hold at most 100 entries
        for chunk in mappings.chunks(100) {
            cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
            for (gid, c) in chunk {
                let mut units = [0u16; 2];
                let unicode: String = c
                    .encode_utf16(&mut units)
                    .iter()
                    .map(|u| format!("{u:04X}"))
                    .collect();
                cmap.push_str(&format!("<{gid:04X}> <{unicode}>\n"));
            }
            cmap.push_str("endbfchar\n");
        }

        cmap.push_str("endcmap\n");
        cmap.push_str("CMapName currentdict /CMap defineresource pop\n");
        cmap.push_str("end\n");
        cmap.push_str("end\n");

        cmap
    }
}

/// Derive a deterministic six-letter subset tag from the glyph set
fn subset_tag(gids: &[u16]) -> String {
    let mut hasher = DefaultHasher::new();
    gids.hash(&mut hasher);
    let mut hash = hasher.finish();

    (0..6)
        .map(|_| {
            let letter = (b'A' + (hash % 26) as u8) as char;
            hash /= 26;
            letter
        })
        .collect()
}
