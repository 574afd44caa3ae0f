use std::error::Error;

use tracing::{field::display, warn, Span};

#[cfg(test)]
pub(crate) mod test_utils;

/// Records the error of a failed operation in the span the operation ran in.
///
/// The span is expected to declare an empty `error` field.
pub(crate) trait RecordError {
    fn record_error(self, span: &Span) -> Self;
}

impl<T, E> RecordError for Result<T, E>
where
    E: Error,
{
    fn record_error(self, span: &Span) -> Self {
        if let Err(ref err) = self {
            span.record("error", display(err));
            span.in_scope(|| warn!(error = %err, "Finished with error"));
        }
        self
    }
}
