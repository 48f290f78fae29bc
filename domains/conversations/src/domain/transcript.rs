//! Transcript accumulation for one relayed stream

use compass_llm::StreamFrame;

/// Final answer and citation text of a completed stream
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    pub answer: String,
    pub sources: Option<String>,
}

impl Transcript {
    pub fn is_empty(&self) -> bool {
        self.answer.is_empty()
    }
}

/// Rebuilds the answer from `content` frames and the citations from
/// `sources` frames, in arrival order. Other frames are ignored.
///
/// Owned by exactly one stream; never shared.
#[derive(Debug, Default)]
pub struct TranscriptAccumulator {
    answer: String,
    sources: String,
    frames: usize,
}

impl TranscriptAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, frame: &StreamFrame) {
        self.frames += 1;
        match frame {
            StreamFrame::Content { fragment, .. } => self.answer.push_str(fragment),
            StreamFrame::Sources { sources, .. } => self.sources.push_str(sources),
            StreamFrame::Other { .. } => {}
        }
    }

    /// Number of frames observed, of any kind
    #[mutants::skip] // Diagnostic only: feeds the abort log line
    pub fn frames_observed(&self) -> usize {
        self.frames
    }

    pub fn finish(self) -> Transcript {
        Transcript {
            answer: self.answer,
            sources: if self.sources.is_empty() {
                None
            } else {
                Some(self.sources)
            },
        }
    }
}
