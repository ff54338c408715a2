use crate::report::model::CoverageReport;
use anyhow::{anyhow, Context};
use covcore::raster::HeatmapRaster;
use image::RgbaImage;
use std::fs;
use std::path::Path;

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }
    Ok(())
}

pub fn write_report(report: &CoverageReport, path: &Path) -> anyhow::Result<()> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(report).context("serializing coverage report")?;
    fs::write(path, json).with_context(|| format!("writing report {}", path.display()))?;
    log::info!("wrote coverage report to {}", path.display());
    Ok(())
}

/// Saves the raster as a PNG, one pixel per cell with row 0 at the top.
pub fn write_heatmap(raster: &HeatmapRaster, path: &Path) -> anyhow::Result<()> {
    ensure_parent(path)?;
    let width = u32::try_from(raster.width()).context("raster width")?;
    let height = u32::try_from(raster.height()).context("raster height")?;
    let image = RgbaImage::from_raw(width, height, raster.pixels.clone())
        .ok_or_else(|| anyhow!("pixel buffer does not match {}x{} raster", width, height))?;
    image
        .save(path)
        .with_context(|| format!("writing heatmap {}", path.display()))?;
    log::info!("wrote {}x{} heatmap to {}", width, height, path.display());
    Ok(())
}
