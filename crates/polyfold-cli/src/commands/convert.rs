use crate::cli::ConvertArgs;
use crate::error::{CliError, Result};
use polyfold::core::io::options::SilentOptions;
use polyfold::core::io::{codec, container};
use std::fs::File;
use std::io::BufReader;
use tracing::info;

/// Re-encodes record-by-record at the codec layer, so auxiliary scalar
/// fields survive the conversion (they have no home on a decoded pose).
pub fn run(args: ConvertArgs) -> Result<()> {
    let encoding = super::parse_encoding(&args.encoding)?;
    let options = SilentOptions {
        encoding,
        ..SilentOptions::default()
    };

    let file = File::open(&args.input).map_err(CliError::Io)?;
    let mut reader = BufReader::new(file);

    let mut count = 0usize;
    while let Some(record) = codec::read_record(&mut reader)? {
        container::append_record(&args.output, &record, &options)?;
        count += 1;
    }

    info!(
        records = count,
        input = %args.input.display(),
        output = %args.output.display(),
        "converted silent file"
    );
    println!(
        "Re-encoded {} record(s) from '{}' into '{}'",
        count,
        args.input.display(),
        args.output.display()
    );
    Ok(())
}
