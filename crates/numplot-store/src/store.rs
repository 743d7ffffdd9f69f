use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use numplot_core::{Analysis, NumError, NumResult, PlotRecord, PlotStore};

use crate::render::render_png;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotSize {
    pub width: u32,
    pub height: u32,
}

impl Default for PlotSize {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

impl PlotSize {
    /// Smallest side that leaves room for the caption, axis labels and legend.
    pub const MIN_SIDE: u32 = 100;

    pub fn validate(&self) -> NumResult<()> {
        if self.width < Self::MIN_SIDE || self.height < Self::MIN_SIDE {
            return Err(NumError::Plot(format!(
                "plot size {}x{} is below the {min}x{min} minimum",
                self.width,
                self.height,
                min = Self::MIN_SIDE
            )));
        }
        Ok(())
    }
}

/// Stores every plot as `<ULID>.png` in a single directory.
pub struct PngStore {
    dir: PathBuf,
    size: PlotSize,
}

impl PngStore {
    pub fn new(dir: &Path, size: PlotSize) -> NumResult<Self> {
        size.validate()?;
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            size,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of an image, after checking the name cannot escape the
    /// directory.
    pub fn path_of(&self, name: &str) -> NumResult<PathBuf> {
        validate_name(name)?;
        Ok(self.dir.join(name))
    }
}

/// Accept only plain `*.png` file names built from `[A-Za-z0-9_-]`.
fn validate_name(name: &str) -> NumResult<()> {
    let stem = name
        .strip_suffix(".png")
        .ok_or_else(|| NumError::InvalidName(name.to_string()))?;
    let ok = !stem.is_empty()
        && stem
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(NumError::InvalidName(name.to_string()))
    }
}

fn record_for(path: &Path) -> NumResult<Option<PlotRecord>> {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return Ok(None);
    };
    if validate_name(name).is_err() {
        return Ok(None);
    }
    let meta = fs::metadata(path)?;
    if !meta.is_file() {
        return Ok(None);
    }
    let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
    Ok(Some(PlotRecord {
        name: name.to_string(),
        created_at: DateTime::<Utc>::from(modified),
        size_bytes: meta.len(),
    }))
}

impl PlotStore for PngStore {
    fn save(&self, analysis: &Analysis) -> NumResult<PlotRecord> {
        let name = format!("{}.png", ulid::Ulid::new());
        let path = self.dir.join(&name);
        render_png(analysis, &path, (self.size.width, self.size.height))?;
        let size_bytes = fs::metadata(&path)?.len();
        debug!(name = %name, method = %analysis.method(), size_bytes, "plot saved");
        Ok(PlotRecord {
            name,
            created_at: Utc::now(),
            size_bytes,
        })
    }

    fn open(&self, name: &str) -> NumResult<Option<Vec<u8>>> {
        let path = self.path_of(name)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self) -> NumResult<Vec<PlotRecord>> {
        let mut records = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if let Some(rec) = record_for(&entry.path())? {
                records.push(rec);
            }
        }
        // ULIDs sort by creation time; ties on mtime fall back to the name.
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.name.cmp(&a.name))
        });
        Ok(records)
    }

    fn prune(&self, max_age: Duration) -> NumResult<usize> {
        let now = SystemTime::now();
        let mut removed = 0;
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if validate_name(name).is_err() {
                continue;
            }
            let modified = match fs::metadata(&path) {
                Ok(m) if !m.is_file() => continue,
                Ok(m) => m.modified().unwrap_or(now),
                Err(e) => {
                    warn!("skipping {}: {e}", path.display());
                    continue;
                }
            };
            let age = now.duration_since(modified).unwrap_or_default();
            if age >= max_age {
                fs::remove_file(&path)?;
                removed += 1;
            }
        }
        info!(removed, max_age_secs = max_age.as_secs(), "pruned plots");
        Ok(removed)
    }
}
