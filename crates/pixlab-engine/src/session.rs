//! An editing session: the decoded original plus the working copy that
//! operations are applied to.

use crate::buffer::PixelBuffer;
use crate::diagnostics::{Clock, OperationRecord, TelemetrySink};
use crate::operation::Operation;
use crate::stats::{Histogram, ImageStatistics, compute_statistics, generate_histogram};
use crate::types::EngineError;

/// Owns the original buffer and the current, edited buffer.
///
/// Operations always act on the current buffer; the original is never
/// touched and can be restored with [`Session::reset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    original: PixelBuffer,
    current: PixelBuffer,
}

impl Session {
    /// Start a session whose current buffer is a copy of `buffer`.
    #[must_use]
    pub fn new(buffer: PixelBuffer) -> Self {
        Self {
            current: buffer.clone(),
            original: buffer,
        }
    }

    /// Run one operation on the current buffer.
    ///
    /// On success the elapsed time, measured with `clock`, is appended to
    /// `sink` as an [`OperationRecord`].
    ///
    /// # Errors
    ///
    /// Returns the error from [`Operation::apply`]. Neither the current
    /// buffer nor `sink` is modified on error.
    pub fn apply<C: Clock>(
        &mut self,
        operation: &Operation,
        clock: &C,
        sink: &mut impl TelemetrySink,
    ) -> Result<(), EngineError> {
        let input = self.current.dimensions();
        let start = clock.now();
        operation.apply(&mut self.current)?;
        let duration = clock.elapsed(&start);
        let output = self.current.dimensions();

        log::debug!(
            "{operation}: {input} -> {output} in {:.3}ms",
            duration.as_secs_f64() * 1000.0
        );
        sink.record(OperationRecord {
            operation: *operation,
            input,
            output,
            duration,
        });
        Ok(())
    }

    /// Run several operations in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first error. Operations before it stay applied.
    pub fn apply_all<'a, C: Clock>(
        &mut self,
        operations: impl IntoIterator<Item = &'a Operation>,
        clock: &C,
        sink: &mut impl TelemetrySink,
    ) -> Result<(), EngineError> {
        for operation in operations {
            self.apply(operation, clock, sink)?;
        }
        Ok(())
    }

    /// Discard all edits.
    pub fn reset(&mut self) {
        log::debug!("reset to original {}", self.original.dimensions());
        self.current.clone_from(&self.original);
    }

    /// The buffer as edited so far.
    #[must_use]
    pub const fn current(&self) -> &PixelBuffer {
        &self.current
    }

    /// The buffer the session started with.
    #[must_use]
    pub const fn original(&self) -> &PixelBuffer {
        &self.original
    }

    /// Consume the session, keeping only the edited buffer.
    #[must_use]
    pub fn into_current(self) -> PixelBuffer {
        self.current
    }

    /// Statistics of the current buffer.
    #[must_use]
    pub fn statistics(&self) -> ImageStatistics {
        compute_statistics(&self.current)
    }

    /// Luma histogram of the current buffer.
    #[must_use]
    pub fn histogram(&self) -> Histogram {
        generate_histogram(&self.current)
    }
}
