//! Engine, alignment and paper enums.

use serde::{Deserialize, Serialize};

/// Typesetting engine used for labels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TexEngine {
    #[default]
    Latex,
    Pdflatex,
    Xelatex,
    Lualatex,
    Tex,
    Pdftex,
    Context,
    /// Labels are disabled entirely.
    None,
}

impl TexEngine {
    pub fn name(self) -> &'static str {
        match self {
            Self::Latex => "latex",
            Self::Pdflatex => "pdflatex",
            Self::Xelatex => "xelatex",
            Self::Lualatex => "lualatex",
            Self::Tex => "tex",
            Self::Pdftex => "pdftex",
            Self::Context => "context",
            Self::None => "none",
        }
    }

    /// Engine writes PDF directly instead of DVI.
    pub fn produces_pdf(self) -> bool {
        matches!(
            self,
            Self::Pdflatex | Self::Xelatex | Self::Lualatex | Self::Pdftex | Self::Context
        )
    }

    /// Engine understands LaTeX documents.
    pub fn is_latex(self) -> bool {
        matches!(
            self,
            Self::Latex | Self::Pdflatex | Self::Xelatex | Self::Lualatex
        )
    }

    pub fn is_none(self) -> bool {
        self == Self::None
    }
}

/// Where the picture is placed on the page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    /// Keep user coordinates untouched.
    Zero,
    /// Move the lower-left corner to the origin.
    Bottom,
    /// Move to the top of the page.
    Top,
    /// Center on the page.
    #[default]
    Center,
}

/// Named paper sizes, in big points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperType {
    #[default]
    Letter,
    A4,
    Legal,
}

impl PaperType {
    pub fn dimensions(self) -> (f64, f64) {
        match self {
            Self::Letter => (612.0, 792.0),
            Self::A4 => (595.276, 841.89),
            Self::Legal => (612.0, 1008.0),
        }
    }
}
