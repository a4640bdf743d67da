mod parser;
mod result;

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use log::error;
use log::info;
use log::warn;
use log::LevelFilter;
use mussel_solver::convert_case::Case;
use mussel_solver::model::Model;
use mussel_solver::options::ExplainerOptions;
use mussel_solver::options::ExplanationAlgorithm;
use mussel_solver::options::ExplanationRequest;
use mussel_solver::options::SubsetClause;
use mussel_solver::results::ExplanationOutcome;
use mussel_solver::statistics::configure_statistic_logging;
use mussel_solver::ConstraintId;
use mussel_solver::Explainer;
use parser::parse_instance;
use result::MusselError;
use result::MusselResult;

#[derive(Debug, Parser)]
#[command(
    help_template = "\
{before-help}{name} {version}
Authors: {author}
About: {about}

{usage-heading}\n{tab}{usage}

{all-args}{after-help}
",
    author,
    version,
    about,
    arg_required_else_help = true
)]
struct Args {
    /// The instance to explain. Every line of the file holds one statement:
    ///  - 'var x 0..9' declares the integer variable x with domain [0, 9],
    ///  - 'soft x + y == 10' adds a soft constraint, optionally weighted as in 'soft 5: x <= 3',
    ///  - 'hard 2*x != y' adds a hard constraint.
    ///
    /// Everything after a '%' is a comment.
    #[clap(verbatim_doc_comment)]
    instance_path: PathBuf,

    /// The algorithm which computes the explanation.
    ///
    /// The MUS algorithms print a minimal set of soft constraints which cannot be satisfied
    /// together, the MSS/MCS algorithms print a maximal satisfiable subset of the soft constraints
    /// or its complement, and 'marco', 'all-mus' and 'all-mcs' enumerate these sets.
    #[arg(short = 'a', long, value_enum, default_value_t)]
    algorithm: ExplanationAlgorithm,

    /// The maximum number of sets printed by the enumerating algorithms.
    ///
    /// Possible values: usize (Optional)
    #[arg(long = "max-count", verbatim_doc_comment)]
    max_count: Option<usize>,

    /// The index (starting at 0, in the order of the file) of a soft constraint which has to be
    /// part of the MUS found by 'ocus' and 'ocus-naive'. Can be given multiple times.
    ///
    /// Possible values: usize
    #[arg(long = "require", verbatim_doc_comment)]
    required: Vec<usize>,

    /// The time budget of a single feasibility check, given in milliseconds. A check which runs
    /// out of time is inconclusive.
    ///
    /// Possible values: u64 (Optional)
    #[arg(short = 't', long = "time-limit", verbatim_doc_comment)]
    time_limit: Option<u64>,

    /// The maximum number of search nodes of a single feasibility check. A check which runs out
    /// of nodes is inconclusive.
    ///
    /// Possible values: u64 (Optional)
    #[arg(long = "node-limit", verbatim_doc_comment)]
    node_limit: Option<u64>,

    /// Disables removing several constraints at once based on the cores of the feasibility
    /// checks.
    ///
    /// Possible values: bool
    #[arg(long = "no-core-pruning", verbatim_doc_comment)]
    no_core_pruning: bool,

    /// Verifies that the instance is unsatisfiable before explaining it.
    ///
    /// Possible values: bool
    #[arg(long = "check-unsatisfiable", verbatim_doc_comment)]
    check_unsatisfiable: bool,

    /// Enables log message output from the explainer.
    ///
    /// Possible values: bool
    #[arg(short = 'v', long = "verbose", verbatim_doc_comment)]
    verbose: bool,

    /// Enables logging of statistics from the explainer and the model.
    ///
    /// Possible values: bool
    #[arg(short = 's', long = "log-statistics", verbatim_doc_comment)]
    log_statistics: bool,
}

fn configure_logging(verbose: bool, log_statistics: bool) {
    if log_statistics {
        configure_statistic_logging("%%%mussel-stat:", None, Some(Case::Snake), None);
    }
    let level_filter = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    env_logger::Builder::new()
        .format(move |buf, record| {
            write!(buf, "% ")?;

            writeln!(buf, "{}", record.args())
        })
        .filter_level(level_filter)
        .target(env_logger::Target::Stdout)
        .init();
    info!("Logging successfully configured");
}

fn main() {
    match run() {
        Ok(()) => {}
        Err(e) => {
            error!("Execution failed, error: {e}");
            std::process::exit(1);
        }
    }
}

fn run() -> MusselResult<()> {
    let args = Args::parse();

    configure_logging(args.verbose, args.log_statistics);

    if mussel_solver::asserts::MUSSEL_ASSERT_LEVEL_DEFINITION
        >= mussel_solver::asserts::MUSSEL_ASSERT_MODERATE
    {
        warn!(
            "Potential performance degradation: the Mussel assert level is set to {}, meaning many debug asserts are active which may result in performance degradation.",
            mussel_solver::asserts::MUSSEL_ASSERT_LEVEL_DEFINITION
        );
    };

    if !args.instance_path.is_file() {
        return Err(MusselError::invalid_instance(args.instance_path.display()));
    }
    let source = std::fs::read_to_string(&args.instance_path)?;
    let mut instance = parse_instance(&source)?;
    instance.model.set_node_limit(args.node_limit);
    info!(
        "Read {} soft and {} hard constraints over {} variables",
        instance.soft.len(),
        instance.hard.len(),
        instance.model.num_variables_in_model()
    );

    let options = ExplainerOptions {
        oracle_timeout: args.time_limit.map(Duration::from_millis),
        core_pruning: !args.no_core_pruning,
        ..Default::default()
    };
    let request = ExplanationRequest {
        weights: instance.weights.clone(),
        max_count: args.max_count,
        subset_constraints: args
            .required
            .iter()
            .map(|&index| SubsetClause::require(index))
            .collect(),
        check_unsatisfiable: args.check_unsatisfiable,
    };

    let outcome = {
        let mut explainer = Explainer::with_options(&mut instance.model, options);
        let outcome = explainer.explain(args.algorithm, &instance.soft, &instance.hard, &request);
        explainer.log_statistics();
        outcome?
    };
    instance.model.log_statistics();

    let model = &instance.model;
    match outcome {
        ExplanationOutcome::Subset(subset) => {
            println!(
                "{}: {}",
                args.algorithm.subset_kind(),
                format_subset(model, &subset)
            );
        }
        ExplanationOutcome::Subsets(subsets) => {
            for subset in subsets {
                println!(
                    "{}: {}",
                    args.algorithm.subset_kind(),
                    format_subset(model, &subset)
                );
            }
        }
        ExplanationOutcome::Explanations(explanations) => {
            for explanation in explanations {
                println!(
                    "{}: {}",
                    explanation.kind(),
                    format_subset(model, explanation.constraints())
                );
            }
        }
    }

    Ok(())
}

/// Formats the constraints as they appear in the model, e.g. `{x == 5, x == 7}`.
fn format_subset(model: &Model, subset: &[ConstraintId]) -> String {
    let constraints = subset
        .iter()
        .map(|&constraint| {
            model
                .display_constraint(constraint)
                .map_or_else(|| constraint.to_string(), |display| display.to_string())
        })
        .collect::<Vec<_>>();
    format!("{{{}}}", constraints.join(", "))
}
