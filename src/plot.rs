//! The top-level plot: views plus shared setup, built and handed off.
//!
//! A [`Plot`] is created in one of two terminal modes. Programmatic mode
//! accumulates views and builds the document by merging their fragments;
//! replay mode wraps a pre-built configuration file and returns its content
//! verbatim. The mode is fixed at construction — mixing them is an error.

use std::path::{Path, PathBuf};

use crate::config::Document;
use crate::error::AtomlensError;
use crate::schema::{FramedSchema, MolecularSchema, SpatiallyResolvedSchema};
use crate::shell::RenderShell;
use crate::view::PlotView;

/// The schemas a plot validates its data sources against.
#[derive(Debug, Clone, Default)]
pub struct PlotSchemas {
    /// Schema for per-atom molecular data sources.
    pub molecular: Option<MolecularSchema>,
    /// Schema for volumetric data sources.
    pub spatially_resolved: Option<SpatiallyResolvedSchema>,
    /// Frame column declaration for multi-frame data.
    pub framed: Option<FramedSchema>,
}

impl PlotSchemas {
    /// Adds a molecular schema.
    #[must_use]
    pub fn with_molecular(mut self, schema: MolecularSchema) -> Self {
        self.molecular = Some(schema);
        self
    }

    /// Adds a spatially resolved schema.
    #[must_use]
    pub fn with_spatially_resolved(mut self, schema: SpatiallyResolvedSchema) -> Self {
        self.spatially_resolved = Some(schema);
        self
    }

    /// Adds a framed schema.
    #[must_use]
    pub fn with_framed(mut self, schema: FramedSchema) -> Self {
        self.framed = Some(schema);
        self
    }

    /// At least one data schema, and the frame column (when framed) must be
    /// declared by every provided data schema.
    fn validate(&self) -> Result<(), AtomlensError> {
        if self.molecular.is_none() && self.spatially_resolved.is_none() {
            return Err(AtomlensError::Schema(
                "a plot needs a molecular or spatially resolved schema".to_owned(),
            ));
        }
        if let Some(framed) = &self.framed {
            let frame_column = framed.frame_column();
            if let Some(molecular) = &self.molecular {
                if !molecular.columns().iter().any(|c| c == frame_column) {
                    return Err(AtomlensError::Schema(format!(
                        "frame column '{frame_column}' must be declared in the molecular \
                         schema columns [{}]",
                        molecular.columns().join(", ")
                    )));
                }
            }
            if let Some(spatial) = &self.spatially_resolved {
                if !spatial.columns().iter().any(|c| c == frame_column) {
                    return Err(AtomlensError::Schema(format!(
                        "frame column '{frame_column}' must be declared in the spatially \
                         resolved schema columns [{}]",
                        spatial.columns().join(", ")
                    )));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
enum Mode {
    Programmatic {
        schemas: PlotSchemas,
        views: Vec<PlotView>,
    },
    Replay {
        path: PathBuf,
    },
}

/// A plot: the aggregate that produces one configuration document.
#[derive(Debug)]
pub struct Plot {
    mode: Mode,
}

impl Plot {
    /// Programmatic plot over the given schemas. Views are added with
    /// [`Plot::add_view`].
    pub fn new(schemas: PlotSchemas) -> Result<Self, AtomlensError> {
        schemas.validate()?;
        Ok(Self {
            mode: Mode::Programmatic {
                schemas,
                views: Vec::new(),
            },
        })
    }

    /// Replay plot over a pre-built configuration file. The document is
    /// parsed fresh on every build and returned verbatim; views cannot be
    /// added.
    pub fn from_configuration_file(path: impl Into<PathBuf>) -> Self {
        Self {
            mode: Mode::Replay { path: path.into() },
        }
    }

    /// Append a view. Fails on a replay plot.
    pub fn add_view(&mut self, view: impl Into<PlotView>) -> Result<(), AtomlensError> {
        match &mut self.mode {
            Mode::Programmatic { views, .. } => {
                views.push(view.into());
                Ok(())
            }
            Mode::Replay { .. } => Err(AtomlensError::InvalidOperation(
                "views cannot be added to a plot built from a configuration file".to_owned(),
            )),
        }
    }

    /// Remove the view at `index`, returning it.
    pub fn remove_view(&mut self, index: usize) -> Result<PlotView, AtomlensError> {
        match &mut self.mode {
            Mode::Programmatic { views, .. } => {
                if index >= views.len() {
                    return Err(AtomlensError::InvalidOperation(format!(
                        "no view at index {index}; the plot has {} views",
                        views.len()
                    )));
                }
                Ok(views.remove(index))
            }
            Mode::Replay { .. } => Err(AtomlensError::InvalidOperation(
                "views cannot be removed from a plot built from a configuration file".to_owned(),
            )),
        }
    }

    /// Build the configuration document from current state.
    ///
    /// Rebuilding is idempotent: the same views and schemas produce the
    /// same document (aside from side-car file writes for sources with an
    /// output file).
    pub fn configuration(&self) -> Result<Document, AtomlensError> {
        match &self.mode {
            Mode::Replay { path } => {
                let content =
                    std::fs::read_to_string(path).map_err(|e| AtomlensError::io(path, e))?;
                serde_json::from_str(&content).map_err(|e| AtomlensError::ConfigParse {
                    path: path.clone(),
                    message: e.to_string(),
                })
            }
            Mode::Programmatic { schemas, views } => {
                if views.is_empty() {
                    return Err(AtomlensError::InvalidOperation(
                        "the plot has no views; add at least one before building the \
                         configuration"
                            .to_owned(),
                    ));
                }
                let mut document = Document::default();
                for view in views {
                    let (view_config, setup) = view.configuration(schemas)?;
                    document.views.push(view_config);
                    document.plot_setup.merge(setup);
                }
                Ok(document)
            }
        }
    }

    /// Build the document and hand it to a render shell for display.
    /// Returns when the shell does — for the embedded browser shell, once
    /// the user closes the window.
    pub fn render(&self, shell: &dyn RenderShell) -> Result<(), AtomlensError> {
        shell.render(&self.configuration()?)
    }

    /// Build the document and write it to `path` as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), AtomlensError> {
        let path = path.as_ref();
        let document = self.configuration()?;
        let content =
            serde_json::to_string_pretty(&document).map_err(|e| AtomlensError::ConfigParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        std::fs::write(path, content).map_err(|e| AtomlensError::io(path, e))
    }
}
