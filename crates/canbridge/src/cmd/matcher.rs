use canbridge_filter::FilterPattern;

use crate::cmd::MatchArgs;
use crate::exit::{CliResult, FAILURE, SUCCESS};
use crate::output::{print_matches, OutputFormat};

/// Exits 0 when every identifier matches, 1 otherwise.
pub fn run(args: MatchArgs, format: OutputFormat) -> CliResult<i32> {
    let pattern = FilterPattern::compile(&args.pattern);
    tracing::debug!(
        ones = pattern.ones(),
        zeros = pattern.zeros(),
        width = pattern.width(),
        "compiled pattern"
    );

    let results: Vec<(u32, bool)> = args
        .ids
        .iter()
        .map(|&id| (id, pattern.matches(id)))
        .collect();
    print_matches(&pattern, &results, format);

    if results.iter().all(|&(_, matched)| matched) {
        Ok(SUCCESS)
    } else {
        Ok(FAILURE)
    }
}
