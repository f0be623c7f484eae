//! PDF Document wrapper

use crate::text::{generate_line_operators, generate_text_operators, TextRenderContext};
use crate::{Align, FontData, FontFamily, FontFamilyBuilder, FontWeight, PdfError, Result};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::collections::{BTreeMap, HashMap};
use std::io::Write;

/// A text string placed on a page
///
/// Text is buffered during rendering and encoded during `to_bytes`,
/// after fonts have been subsetted and glyph IDs remapped.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// The text to render
    pub text: String,
    /// Font variant name (e.g., "invoice-bold")
    pub font_name: String,
    /// Font resource name (e.g., "F1")
    font_resource_name: String,
    /// Page number (1-indexed)
    pub page: usize,
    /// Left edge of the text after alignment (PDF coordinates)
    pub x: f64,
    /// Baseline (PDF coordinates, from bottom)
    pub y: f64,
    /// Font size in points
    pub font_size: f32,
    /// Text color
    pub color: Color,
}

/// RGB Color (values 0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Create a new RGB color (values 0.0 - 1.0)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Black color
    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }

    /// Gray of the given level (0.0 black - 1.0 white)
    pub fn gray(level: f32) -> Self {
        Self::rgb(level, level, level)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// A page created by `add_page`
#[derive(Debug, Clone, Copy)]
struct PageInfo {
    id: ObjectId,
    width: f64,
    height: f64,
}

/// PDF Document builder providing high-level drawing operations
pub struct PdfDocument {
    /// The underlying lopdf document
    inner: Document,
    /// Page tree root
    pages_id: ObjectId,
    /// Pages in order (page number = index + 1)
    pages: Vec<PageInfo>,
    /// Registered font families
    font_families: HashMap<String, FontFamily>,
    /// Current font family name
    current_family: Option<String>,
    /// Current font weight
    current_weight: FontWeight,
    /// Current font size
    current_font_size: f32,
    /// Current text color
    current_text_color: Color,
    /// Embedded fonts (font name -> PDF object ID)
    embedded_fonts: HashMap<String, ObjectId>,
    /// Page font resources (page number -> font name -> resource name)
    page_font_resources: BTreeMap<usize, BTreeMap<String, String>>,
    /// Next font resource number
    next_font_resource: u32,
    /// Buffered content operators per page (page number -> operators)
    page_content_buffer: BTreeMap<usize, Vec<u8>>,
    /// Buffered text operations (encoded during save after font subsetting)
    buffered_text_ops: Vec<TextRun>,
    /// Flate-compress content and font streams
    compress: bool,
    /// Document title for the Info dictionary
    title: Option<String>,
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfDocument {
    /// Create an empty document with no pages
    ///
    /// # Example
    /// ```ignore
    /// let mut doc = PdfDocument::new();
    /// let page = doc.add_page(612.0, 792.0)?;
    /// ```
    pub fn new() -> Self {
        let mut inner = Document::with_version("1.7");

        let pages_id = inner.new_object_id();
        inner.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => Vec::<Object>::new(),
                "Count" => 0,
            }),
        );

        let catalog_id = inner.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        inner.trailer.set("Root", catalog_id);

        Self {
            inner,
            pages_id,
            pages: Vec::new(),
            font_families: HashMap::new(),
            current_family: None,
            current_weight: FontWeight::default(),
            current_font_size: 12.0,
            current_text_color: Color::default(),
            embedded_fonts: HashMap::new(),
            page_font_resources: BTreeMap::new(),
            next_font_resource: 1,
            page_content_buffer: BTreeMap::new(),
            buffered_text_ops: Vec::new(),
            compress: true,
            title: None,
        }
    }

    /// Enable or disable Flate compression of content and font streams
    pub fn set_compression(&mut self, compress: bool) {
        self.compress = compress;
    }

    /// Set the document title written to the Info dictionary
    pub fn set_title(&mut self, title: &str) {
        self.title = Some(title.to_string());
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Append a blank page of the given size in points
    ///
    /// # Returns
    /// New page number (1-indexed)
    pub fn add_page(&mut self, width: f64, height: f64) -> Result<usize> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(PdfError::InvalidPageSize(width, height));
        }

        let page_id = self.inner.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => media_box(width, height),
            "Resources" => Dictionary::new(),
        });
        self.pages.push(PageInfo {
            id: page_id,
            width,
            height,
        });
        self.update_page_tree();

        Ok(self.pages.len())
    }

    /// Rewrite the page tree root after the page list changed
    fn update_page_tree(&mut self) {
        let kids: Vec<Object> = self.pages.iter().map(|p| Object::Reference(p.id)).collect();
        self.inner.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => self.pages.len() as i64,
            }),
        );
    }

    fn page_info(&self, page: usize) -> Result<PageInfo> {
        if page == 0 || page > self.pages.len() {
            return Err(PdfError::InvalidPage(page, self.pages.len()));
        }
        Ok(self.pages[page - 1])
    }

    /// Get page (width, height) in points
    pub fn page_size(&self, page: usize) -> Result<(f64, f64)> {
        let info = self.page_info(page)?;
        Ok((info.width, info.height))
    }

    /// Register a font family with its variants
    ///
    /// # Example
    /// ```ignore
    /// doc.register_font_family("sans",
    ///     FontFamilyBuilder::new()
    ///         .regular(regular_bytes)
    ///         .bold(bold_bytes)
    /// )?;
    /// ```
    pub fn register_font_family(&mut self, name: &str, builder: FontFamilyBuilder) -> Result<()> {
        if self.font_families.contains_key(name) {
            return Err(PdfError::FontAlreadyExists(name.to_string()));
        }

        let family = builder.build(name)?;
        self.font_families.insert(name.to_string(), family);

        Ok(())
    }

    /// Set the current font family and size
    ///
    /// # Example
    /// ```ignore
    /// doc.set_font("sans", 12.0)?;  // Regular 12pt
    /// doc.set_font_weight(FontWeight::Bold)?;  // Now bold 12pt
    /// doc.set_font_size(16.0)?;  // Now bold 16pt
    /// ```
    pub fn set_font(&mut self, family: &str, size: f32) -> Result<()> {
        if !self.font_families.contains_key(family) {
            return Err(PdfError::FontNotFound(family.to_string()));
        }

        self.current_family = Some(family.to_string());
        self.current_font_size = size;

        Ok(())
    }

    /// Set only the font size (keeps current family/weight)
    pub fn set_font_size(&mut self, size: f32) -> Result<()> {
        if self.current_family.is_none() {
            return Err(PdfError::FontNotFound("No font family set".to_string()));
        }

        self.current_font_size = size;
        Ok(())
    }

    /// Set the font weight (keeps current family/size)
    pub fn set_font_weight(&mut self, weight: FontWeight) -> Result<()> {
        if self.current_family.is_none() {
            return Err(PdfError::FontNotFound("No font family set".to_string()));
        }

        self.current_weight = weight;
        Ok(())
    }

    /// Set the text color
    pub fn set_text_color(&mut self, color: Color) {
        self.current_text_color = color;
    }

    /// Get the current font variant
    fn current_font(&self) -> Result<&FontData> {
        let family_name = self
            .current_family
            .as_ref()
            .ok_or_else(|| PdfError::FontNotFound("No font family set".to_string()))?;
        let family = self
            .font_families
            .get(family_name)
            .ok_or_else(|| PdfError::FontNotFound(family_name.clone()))?;

        Ok(family.get_variant(self.current_weight))
    }

    /// Insert text at a specific position
    ///
    /// Coordinates are PDF user space: `y` is the baseline measured from the
    /// bottom edge of the page.
    ///
    /// # Arguments
    /// * `text` - Text to insert
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate in points (anchor for `align`)
    /// * `y` - Y coordinate in points (from bottom)
    /// * `align` - Text alignment
    pub fn insert_text(
        &mut self,
        text: &str,
        page: usize,
        x: f64,
        y: f64,
        align: Align,
    ) -> Result<()> {
        self.page_info(page)?;

        // Skip empty text - nothing to render
        if text.is_empty() {
            return Ok(());
        }

        let (font_name, width) = {
            let font = self.current_font()?;
            (
                font.name.clone(),
                font.text_width_points(text, self.current_font_size) as f64,
            )
        };

        let start_x = match align {
            Align::Left => x,
            Align::Center => x - (width / 2.0),
            Align::Right => x - width,
        };

        // Track characters used in font for subsetting
        self.get_font_data_mut(&font_name)?.add_chars(text);

        let font_resource_name = self.get_or_create_font_ref(&font_name, page);

        self.buffered_text_ops.push(TextRun {
            text: text.to_string(),
            font_name,
            font_resource_name,
            page,
            x: start_x,
            y,
            font_size: self.current_font_size,
            color: self.current_text_color,
        });

        Ok(())
    }

    /// Draw a straight stroked line between two points (PDF coordinates)
    pub fn draw_line(
        &mut self,
        page: usize,
        from: (f64, f64),
        to: (f64, f64),
        line_width: f64,
        color: Color,
    ) -> Result<()> {
        self.page_info(page)?;

        let operators = generate_line_operators(from, to, line_width, color);
        self.buffer_content(page, &operators);

        Ok(())
    }

    /// Get current font's text width for a string in points
    ///
    /// # Example
    /// ```ignore
    /// doc.set_font("sans", 12.0)?;
    /// let width = doc.get_text_width("Hello")?;
    /// ```
    pub fn get_text_width(&self, text: &str) -> Result<f64> {
        let font = self.current_font()?;
        Ok(font.text_width_points(text, self.current_font_size) as f64)
    }

    /// Text placed on a page so far, in drawing order
    pub fn text_runs(&self, page: usize) -> impl Iterator<Item = &TextRun> + '_ {
        self.buffered_text_ops
            .iter()
            .filter(move |run| run.page == page)
    }

    /// The strings placed on a page so far, in drawing order
    pub fn page_text(&self, page: usize) -> Vec<&str> {
        self.text_runs(page).map(|run| run.text.as_str()).collect()
    }

    /// Get font data by variant name
    fn get_font_data(&self, name: &str) -> Result<&FontData> {
        self.font_families
            .values()
            .flat_map(|family| family.variants())
            .find(|variant| variant.name == name)
            .ok_or_else(|| PdfError::FontNotFound(name.to_string()))
    }

    /// Get mutable font data by variant name
    fn get_font_data_mut(&mut self, name: &str) -> Result<&mut FontData> {
        self.font_families
            .values_mut()
            .flat_map(|family| family.variants_mut())
            .find(|variant| variant.name == name)
            .ok_or_else(|| PdfError::FontNotFound(name.to_string()))
    }

    /// Names of every font variant with at least one used character, sorted
    fn used_font_names(&self) -> Vec<String> {
        let mut font_names: Vec<String> = self
            .font_families
            .values()
            .flat_map(|family| family.variants())
            .filter(|font| !font.used_chars.is_empty())
            .map(|font| font.name.clone())
            .collect();
        font_names.sort();
        font_names.dedup();
        font_names
    }

    /// Get or create a font resource name for a specific page
    ///
    /// Returns the resource name (e.g., "F1", "F2") for use in content streams.
    /// The font itself is embedded at save time when all characters are known.
    fn get_or_create_font_ref(&mut self, font_name: &str, page: usize) -> String {
        let page_resources = self.page_font_resources.entry(page).or_default();

        if let Some(resource_name) = page_resources.get(font_name) {
            return resource_name.clone();
        }

        let resource_name = format!("F{}", self.next_font_resource);
        self.next_font_resource += 1;
        page_resources.insert(font_name.to_string(), resource_name.clone());

        resource_name
    }

    /// Serialize the document to bytes
    ///
    /// Consumes the document: fonts are subsetted, buffered text is encoded
    /// against the subset glyph IDs, and every page gets its final content
    /// stream and resources.
    pub fn to_bytes(mut self) -> Result<Vec<u8>> {
        // 1. Subset fonts (creates subsets with only used glyphs)
        self.subset_fonts()?;

        // 2. Encode buffered text with remapped glyph IDs
        self.encode_buffered_text()?;

        // 3. Embed subsetted fonts into PDF
        self.embed_fonts()?;

        // 4. Write content streams and resources to pages
        self.finalize_pages()?;

        self.write_info();

        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;

        Ok(buffer)
    }

    /// Create subsets for all fonts that have been used
    fn subset_fonts(&mut self) -> Result<()> {
        for font_name in self.used_font_names() {
            self.get_font_data_mut(&font_name)?.create_subset()?;
        }

        Ok(())
    }

    /// Encode buffered text operations and add them to content buffers
    fn encode_buffered_text(&mut self) -> Result<()> {
        let text_ops = std::mem::take(&mut self.buffered_text_ops);

        for op in text_ops {
            let (text_hex, text_width) = {
                let font_data = self.get_font_data(&op.font_name)?;
                (
                    font_data.encode_text_hex_remapped(&op.text),
                    font_data.text_width_points(&op.text, op.font_size) as f64,
                )
            };

            let ctx = TextRenderContext {
                font_name: op.font_resource_name,
                font_size: op.font_size,
                text_width,
                color: op.color,
            };

            // Position already resolved in insert_text, so always Left here
            let operators = generate_text_operators(&text_hex, op.x, op.y, Align::Left, &ctx);
            self.buffer_content(op.page, &operators);
        }

        Ok(())
    }

    /// Embed all used fonts into the PDF
    fn embed_fonts(&mut self) -> Result<()> {
        self.embedded_fonts.clear();

        for font_name in self.used_font_names() {
            self.embed_font_object(&font_name)?;
        }

        Ok(())
    }

    /// Embed a single font object into the PDF
    fn embed_font_object(&mut self, font_name: &str) -> Result<ObjectId> {
        let font_objects = self.get_font_data(font_name)?.to_pdf_objects()?;

        let font_file_stream = self.encode_stream(font_objects.font_file_stream)?;
        let font_file_id = self.inner.add_object(font_file_stream);

        let mut font_descriptor = font_objects.font_descriptor;
        font_descriptor.set("FontFile2", Object::Reference(font_file_id));
        let font_descriptor_id = self.inner.add_object(font_descriptor);

        let mut cid_font = font_objects.cid_font;
        cid_font.set("FontDescriptor", Object::Reference(font_descriptor_id));
        let cid_font_id = self.inner.add_object(cid_font);

        let tounicode_stream = self.encode_stream(font_objects.tounicode_stream)?;
        let tounicode_id = self.inner.add_object(tounicode_stream);

        let mut type0_font = font_objects.type0_font;
        type0_font.set(
            "DescendantFonts",
            Object::Array(vec![Object::Reference(cid_font_id)]),
        );
        type0_font.set("ToUnicode", Object::Reference(tounicode_id));
        let type0_font_id = self.inner.add_object(type0_font);

        self.embedded_fonts
            .insert(font_name.to_string(), type0_font_id);

        Ok(type0_font_id)
    }

    /// Write each page's content stream and font resources
    fn finalize_pages(&mut self) -> Result<()> {
        for (index, page) in self.pages.clone().into_iter().enumerate() {
            let page_number = index + 1;

            let mut resources = Dictionary::new();
            if let Some(fonts) = self.page_font_resources.get(&page_number) {
                let mut font_dict = Dictionary::new();
                for (font_name, resource_name) in fonts {
                    let font_ref = self
                        .embedded_fonts
                        .get(font_name)
                        .ok_or_else(|| PdfError::FontNotFound(font_name.clone()))?;
                    font_dict.set(resource_name.as_bytes(), Object::Reference(*font_ref));
                }
                resources.set("Font", Object::Dictionary(font_dict));
            }

            let mut page_dict = dictionary! {
                "Type" => "Page",
                "Parent" => self.pages_id,
                "MediaBox" => media_box(page.width, page.height),
                "Resources" => resources,
            };

            let content = self
                .page_content_buffer
                .remove(&page_number)
                .unwrap_or_default();
            let stream = self.encode_stream(Stream::new(Dictionary::new(), content))?;
            let contents_id = self.inner.add_object(stream);
            page_dict.set("Contents", Object::Reference(contents_id));

            self.inner
                .objects
                .insert(page.id, Object::Dictionary(page_dict));
        }

        Ok(())
    }

    /// Add the Info dictionary (producer and optional title)
    fn write_info(&mut self) {
        let mut info = dictionary! {
            "Producer" => text_string("invoice pdf-core"),
        };
        if let Some(title) = &self.title {
            info.set("Title", text_string(title));
        }
        let info_id = self.inner.add_object(info);
        self.inner.trailer.set("Info", info_id);
    }

    /// Flate-compress a stream when compression is enabled
    fn encode_stream(&self, stream: Stream) -> Result<Stream> {
        if !self.compress {
            return Ok(stream);
        }

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&stream.content)?;
        let compressed = encoder.finish()?;

        let mut dict = stream.dict;
        dict.set("Filter", "FlateDecode");

        Ok(Stream::new(dict, compressed))
    }

    /// Buffer content operators for a page (written at save time)
    fn buffer_content(&mut self, page: usize, content: &[u8]) {
        self.page_content_buffer
            .entry(page)
            .or_default()
            .extend_from_slice(content);
    }
}

fn media_box(width: f64, height: f64) -> Vec<Object> {
    vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Real(width as f32),
        Object::Real(height as f32),
    ]
}

/// Encode a PDF text string: literal for ASCII, UTF-16BE with BOM otherwise
fn text_string(value: &str) -> Object {
    if value.is_ascii() {
        return Object::string_literal(value);
    }

    let mut bytes = vec![0xFE, 0xFF];
    for unit in value.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}
