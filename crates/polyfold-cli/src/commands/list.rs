use crate::cli::ListArgs;
use crate::error::Result;
use polyfold::core::io::container;
use polyfold::core::io::options::SilentOptions;
use tracing::info;

pub fn run(args: ListArgs) -> Result<()> {
    let options = SilentOptions {
        tolerate_truncated_tail: args.tolerate_truncated_tail,
        ..SilentOptions::default()
    };

    let mut count = 0usize;
    for item in container::stream(&args.input, &options)? {
        let (tag, pose) = item?;
        println!("{}\t{}", tag, pose.residue_count());
        count += 1;
    }

    info!(records = count, path = %args.input.display(), "listed silent file");
    eprintln!("{} record(s) in '{}'", count, args.input.display());
    Ok(())
}
