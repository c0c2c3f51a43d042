//! Argument list passed from the coordinator to a worker process.
//!
//! A worker is started as `<program> child <start> <end> <buffer> <P> <A> <B>`.
//! Changing the order or the number of arguments breaks every worker.

use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

use crate::{Error, RowRange};

/// Sub-command that selects worker mode.
pub const WORKER_COMMAND: &str = "child";

/// Number of arguments following [`WORKER_COMMAND`].
pub const WORKER_ARG_COUNT: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerArgs {
    pub range: RowRange,
    pub buffer: PathBuf,
    pub cols: usize,
    pub matrix_a: PathBuf,
    pub matrix_b: PathBuf,
}

impl WorkerArgs {
    /// Encodes the arguments in wire order, without the sub-command.
    pub fn to_args(&self) -> Vec<OsString> {
        vec![
            self.range.start().to_string().into(),
            self.range.end().to_string().into(),
            self.buffer.clone().into_os_string(),
            self.cols.to_string().into(),
            self.matrix_a.clone().into_os_string(),
            self.matrix_b.clone().into_os_string(),
        ]
    }

    /// Parses the arguments following the sub-command.
    pub fn from_args<I, S>(args: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        if args.len() != WORKER_ARG_COUNT {
            return Err(Error::ArgCount {
                expected: WORKER_ARG_COUNT,
                found: args.len(),
            });
        }

        let start = parse_index("start", &args[0])?;
        let end = parse_index("end", &args[1])?;
        let cols = parse_index("P", &args[3])?;
        if cols == 0 {
            return Err(Error::InvalidArg {
                name: "P",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            range: RowRange::new(start, end)?,
            buffer: PathBuf::from(&args[2]),
            cols,
            matrix_a: PathBuf::from(&args[4]),
            matrix_b: PathBuf::from(&args[5]),
        })
    }
}

fn parse_index(name: &'static str, value: &OsStr) -> Result<usize, Error> {
    value
        .to_str()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| Error::InvalidArg {
            name,
            value: value.to_string_lossy().into_owned(),
        })
}
