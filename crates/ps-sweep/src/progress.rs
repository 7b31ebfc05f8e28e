#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepStage {
    Started,
    Invoking,
    Succeeded,
    Failed,
    Interrupted,
    Finished,
}

impl SweepStage {
    pub fn label(&self) -> &'static str {
        match self {
            SweepStage::Started => "starting sweep",
            SweepStage::Invoking => "simulating",
            SweepStage::Succeeded => "iteration ok",
            SweepStage::Failed => "iteration failed",
            SweepStage::Interrupted => "interrupted",
            SweepStage::Finished => "finished",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepProgressEvent {
    pub stage: SweepStage,
    /// Zero-based candidate index, for per-iteration stages
    pub index: Option<usize>,
    pub value: Option<f64>,
    pub total: usize,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
}

impl SweepProgressEvent {
    pub fn fraction_complete(&self) -> f64 {
        match (self.stage, self.index) {
            (SweepStage::Finished, _) => 1.0,
            (SweepStage::Succeeded | SweepStage::Failed, Some(i)) if self.total > 0 => {
                (i + 1) as f64 / self.total as f64
            }
            (_, Some(i)) if self.total > 0 => i as f64 / self.total as f64,
            _ => 0.0,
        }
    }
}
