//! Label dimensions.

use crate::foundation::error::PictorResult;
use crate::settings::TexEngine;

/// Box dimensions of a typeset label, in bp.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LabelExtent {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

/// Source of label dimensions.
pub trait LabelMetrics {
    fn engine(&self) -> TexEngine;

    /// Bring the engine up; called before the first label is measured. Idempotent.
    fn init(&mut self) -> PictorResult<()>;

    fn measure(&mut self, text: &str, size: f64) -> PictorResult<LabelExtent>;
}

/// Metrics guessed from character counts; never starts a process.
#[derive(Clone, Debug)]
pub struct EstimatedMetrics {
    engine: TexEngine,
    initialized: bool,
}

impl EstimatedMetrics {
    pub fn new(engine: TexEngine) -> Self {
        Self {
            engine,
            initialized: false,
        }
    }

    pub fn initialized(&self) -> bool {
        self.initialized
    }

    /// Average advance of Computer Modern at 1bp.
    const ADVANCE: f64 = 0.5;
    const ASCENT: f64 = 0.683;
    const DESCENT: f64 = 0.217;

    pub fn estimate(text: &str, size: f64) -> LabelExtent {
        let visible = text
            .chars()
            .filter(|c| !matches!(c, '\\' | '{' | '}' | '$'))
            .count();
        let descends = text.chars().any(|c| matches!(c, 'g' | 'j' | 'p' | 'q' | 'y'));
        LabelExtent {
            width: visible as f64 * Self::ADVANCE * size,
            height: Self::ASCENT * size,
            depth: if descends { Self::DESCENT * size } else { 0.0 },
        }
    }
}

impl LabelMetrics for EstimatedMetrics {
    fn engine(&self) -> TexEngine {
        self.engine
    }

    fn init(&mut self) -> PictorResult<()> {
        self.initialized = true;
        Ok(())
    }

    fn measure(&mut self, text: &str, size: f64) -> PictorResult<LabelExtent> {
        Ok(Self::estimate(text, size))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/typeset/metrics.rs"]
mod tests;
