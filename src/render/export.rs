use std::cell::OnceCell;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use eframe::egui::FontDefinitions;
use resvg::{tiny_skia, usvg};

use crate::figure::CANVAS_DPI;

/// Key of the proportional face in egui's default font set.
const BUNDLED_FONT: &str = "Ubuntu-Light";

// ---------------------------------------------------------------------------
// Chart font
// ---------------------------------------------------------------------------

/// The sans-serif face every chart is drawn with.
///
/// Taken from the fonts egui bundles, so charts carry text whether or not the
/// host has any fonts installed. System fonts stay loaded as glyph fallback.
struct ChartFont {
    data: Vec<u8>,
    family: String,
}

impl ChartFont {
    fn bundled() -> Result<Self> {
        let data = FontDefinitions::default()
            .font_data
            .get(BUNDLED_FONT)
            .map(|font| font.font.to_vec())
            .ok_or_else(|| anyhow!("font '{BUNDLED_FONT}' is not bundled"))?;

        let mut db = usvg::fontdb::Database::new();
        db.load_font_data(data.clone());
        let family = db
            .faces()
            .next()
            .and_then(|face| face.families.first())
            .map(|(name, _)| name.clone())
            .ok_or_else(|| anyhow!("font '{BUNDLED_FONT}' has no family name"))?;

        Ok(Self { data, family })
    }
}

// ---------------------------------------------------------------------------
// SVG → PNG / PDF
// ---------------------------------------------------------------------------

/// Writes rendered SVG documents to raster and vector files.
///
/// Fonts are loaded once per exporter, so keep one around for a whole run
/// rather than building one per image.
pub struct ImageExporter {
    font: ChartFont,
    raster: usvg::Options<'static>,
    vector: OnceCell<svg2pdf::usvg::Options<'static>>,
}

impl ImageExporter {
    pub fn new() -> Result<Self> {
        let font = ChartFont::bundled()?;

        let mut raster = usvg::Options::default();
        raster.font_family = font.family.clone();
        let db = raster.fontdb_mut();
        db.load_system_fonts();
        db.load_font_data(font.data.clone());
        db.set_sans_serif_family(font.family.clone());
        log::debug!(
            "loaded {} font faces for raster export, sans-serif is '{}'",
            raster.fontdb.len(),
            font.family
        );

        Ok(Self {
            font,
            raster,
            vector: OnceCell::new(),
        })
    }

    /// Rasterise `svg` to a PNG at `dpi`.
    pub fn write_png(&self, svg: &str, path: &Path, dpi: f64) -> Result<()> {
        let tree = usvg::Tree::from_str(svg, &self.raster).context("parsing rendered SVG")?;

        let scale = (dpi / CANVAS_DPI) as f32;
        let size = tree.size();
        let width = (size.width() * scale).ceil() as u32;
        let height = (size.height() * scale).ceil() as u32;

        let mut pixmap = tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| anyhow!("cannot allocate a {width}x{height} image"))?;
        resvg::render(
            &tree,
            tiny_skia::Transform::from_scale(scale, scale),
            &mut pixmap.as_mut(),
        );

        pixmap
            .save_png(path)
            .with_context(|| format!("writing {}", path.display()))
    }

    /// Convert `svg` to a single-page PDF.
    pub fn write_pdf(&self, svg: &str, path: &Path) -> Result<()> {
        let options = self.vector.get_or_init(|| {
            let mut options = svg2pdf::usvg::Options::default();
            options.font_family = self.font.family.clone();
            let db = options.fontdb_mut();
            db.load_system_fonts();
            db.load_font_data(self.font.data.clone());
            db.set_sans_serif_family(self.font.family.clone());
            options
        });
        let tree = svg2pdf::usvg::Tree::from_str(svg, options).context("parsing rendered SVG")?;

        let pdf = svg2pdf::to_pdf(
            &tree,
            svg2pdf::ConversionOptions::default(),
            svg2pdf::PageOptions {
                dpi: CANVAS_DPI as f32,
            },
        )
        .map_err(|e| anyhow!("converting to PDF: {e:?}"))?;

        std::fs::write(path, pdf).with_context(|| format!("writing {}", path.display()))
    }
}
