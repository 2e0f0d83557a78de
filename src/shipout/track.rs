//! Output tracks.

/// Which route a shipout takes from drawn layers to the final file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputTrack {
    /// EPS without labels: the drawing is the output.
    EpsDirect,
    /// EPS with labels from a DVI engine: dvips output is filtered into the final file.
    EpsLabels,
    /// PDF with labels from a PDF engine: the engine's output is renamed into place.
    RenameFromEngine,
    /// PDF otherwise: the EPS is distilled with Ghostscript.
    Distill,
    /// Any other format (and EPS from a PDF engine): converted with ImageMagick.
    Convert,
}

impl OutputTrack {
    pub fn select(format: &str, labels: bool, pdf_engine: bool) -> Self {
        match format {
            "eps" if labels && pdf_engine => Self::Convert,
            "eps" if labels => Self::EpsLabels,
            "eps" => Self::EpsDirect,
            "pdf" if labels && pdf_engine => Self::RenameFromEngine,
            "pdf" => Self::Distill,
            _ => Self::Convert,
        }
    }

    /// The pre-final file is a different file than the output and is turned into it.
    pub fn converts(self) -> bool {
        !matches!(self, Self::EpsDirect | Self::EpsLabels)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/shipout/track.rs"]
mod tests;
