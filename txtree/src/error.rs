/// An enum to deal with errors.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("no record to build a hash tree from")]
    EmptyInput,

    #[error("a hash tree needs at least one worker to be built")]
    NoWorkers,

    #[error("malformed proof entry at line {line}: {reason}")]
    MalformedPath { line: usize, reason: &'static str },
}
