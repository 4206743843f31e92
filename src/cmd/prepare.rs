use std::io::{Read, Write};

use crate::domain::error::PrepareCommandError;
use crate::domain::resource::Resource;
use crate::engine::prepare::prepare_payload;
use crate::io::{self, Format};
use crate::util::time::NormalizeOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrepareCommandOptions {
    pub resource: Resource,
    pub normalize: NormalizeOptions,
}

/// Execute `prepare`: every document is normalized and scrubbed before
/// anything is written, so one bad record leaves the output empty.
pub fn run<R: Read, W: Write>(
    input: R,
    output: W,
    input_format: Format,
    output_format: Format,
    options: PrepareCommandOptions,
) -> Result<(), PrepareCommandError> {
    let documents = io::read_documents(input, input_format).map_err(|source| {
        PrepareCommandError::ReadInput {
            format: input_format,
            source,
        }
    })?;

    let date_fields = options.resource.date_fields();
    let prepared = documents
        .into_iter()
        .enumerate()
        .map(|(index, document)| {
            prepare_payload(document, date_fields, options.normalize)
                .map_err(|source| PrepareCommandError::Prepare { index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    io::write_documents(output, output_format, &prepared).map_err(|source| {
        PrepareCommandError::WriteOutput {
            format: output_format,
            source,
        }
    })
}
