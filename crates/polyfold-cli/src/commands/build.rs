use crate::cli::BuildArgs;
use crate::error::{CliError, Result};
use polyfold::core::build::pose_from_sequence;
use polyfold::core::chemistry::TypeSet;
use polyfold::core::io::{codec, container};
use std::collections::BTreeMap;
use tracing::info;

pub fn run(args: BuildArgs) -> Result<()> {
    let type_set: TypeSet = args
        .type_set
        .parse()
        .map_err(|_| CliError::Argument(format!("unknown type set '{}'", args.type_set)))?;
    let options = super::resolve_options(args.options.as_deref(), args.encoding.as_deref())?;
    let scalars = parse_scores(&args.scores)?;

    let mut pose = pose_from_sequence(&args.sequence, type_set, !args.no_termini)?;
    if let Some(tag) = &args.tag {
        let metadata = pose
            .metadata_mut()
            .expect("the sequence builder always attaches metadata");
        metadata
            .set_tag(tag)
            .map_err(|e| CliError::Argument(format!("invalid tag: {e}")))?;
    }

    let tag = pose
        .tag()
        .expect("the sequence builder always attaches metadata")
        .to_string();
    let record = codec::encode_pose(&pose, &tag, &scalars);
    container::append_record(&args.out, &record, &options)?;

    info!(
        tag = %tag,
        residues = pose.residue_count(),
        path = %args.out.display(),
        "appended built pose"
    );
    println!(
        "Appended '{}' ({} residues) to '{}'",
        tag,
        pose.residue_count(),
        args.out.display()
    );
    Ok(())
}

fn parse_scores(pairs: &[String]) -> Result<BTreeMap<String, f64>> {
    let mut scalars = BTreeMap::new();
    for pair in pairs {
        let (key, value) = pair.split_once('=').ok_or_else(|| {
            CliError::Argument(format!("score '{pair}' is not of the form KEY=VALUE"))
        })?;
        let value: f64 = value.parse().map_err(|_| {
            CliError::Argument(format!("score '{pair}' has a non-numeric value"))
        })?;
        scalars.insert(key.to_string(), value);
    }
    Ok(scalars)
}
