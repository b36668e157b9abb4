pub mod map;
pub mod raster;
pub mod template;

use std::path::PathBuf;

use geo::Coord;

use crate::config::RenderConfig;
use crate::station_tree::StationTree;

use self::raster::{compose, save_png, Rasterizer};
use self::template::{TemplateFields, TemplateFiller};

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("Template {0} does not exist")]
    TemplateMissing(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SVG error: {0}")]
    Svg(#[from] resvg::usvg::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Raster error: {0}")]
    Raster(String),
}

pub type RenderResult<T> = Result<T, RenderError>;

/// Departure panel from the SVG template, station map beside it
pub struct RenderPipeline {
    config: RenderConfig,
    filler: TemplateFiller,
    rasterizer: Rasterizer,
}

impl RenderPipeline {
    /// Fails when the template asset is missing
    pub fn new(config: RenderConfig) -> RenderResult<Self> {
        if !config.template.exists() {
            return Err(RenderError::TemplateMissing(config.template.clone()));
        }
        let rasterizer = Rasterizer::new(config.font_dir.as_deref());
        Ok(Self {
            config,
            filler: TemplateFiller::new(),
            rasterizer,
        })
    }

    /// Writes the composed board and returns its path
    pub fn render(
        &self,
        fields: &TemplateFields,
        tree: Option<&StationTree>,
        markers: &[Coord],
    ) -> RenderResult<PathBuf> {
        log::info!("Create departure image");
        let template = std::fs::read_to_string(&self.config.template).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RenderError::TemplateMissing(self.config.template.clone())
            } else {
                RenderError::Io(e)
            }
        })?;
        let mut board = self.rasterizer.rasterize(&self.filler.fill(&template, fields))?;

        match tree.filter(|t| !t.is_empty()) {
            Some(tree) => {
                log::info!("Draw station map ({} stations, {} trains)", tree.len(), markers.len());
                let (width, height) = self.config.map_size;
                let svg = map::station_map_svg(tree, markers, width, height);
                let station_map = self.rasterizer.rasterize(&svg)?;
                save_png(&station_map, &self.config.station_map_image)?;
                compose(&mut board, &station_map, self.config.map_offset);
            }
            None => log::warn!("No station tree to draw"),
        }

        save_png(&board, &self.config.departure_image)?;
        Ok(self.config.departure_image.clone())
    }
}
