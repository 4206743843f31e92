use std::io::{Read, Write};

use tracing::debug;

use crate::domain::error::ScrubError;
use crate::engine::scrub::scrub;
use crate::io::{self, Format};

/// Execute `scrub` from input stream to output stream.
pub fn run<R: Read, W: Write>(
    input: R,
    output: W,
    input_format: Format,
    output_format: Format,
) -> Result<(), ScrubError> {
    let documents =
        io::read_documents(input, input_format).map_err(|source| ScrubError::ReadInput {
            format: input_format,
            source,
        })?;
    debug!(count = documents.len(), "scrubbing documents");
    let scrubbed: Vec<_> = documents.into_iter().map(scrub).collect();
    io::write_documents(output, output_format, &scrubbed).map_err(|source| {
        ScrubError::WriteOutput {
            format: output_format,
            source,
        }
    })
}
