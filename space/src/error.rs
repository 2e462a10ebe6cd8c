use snafu::Snafu;

#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub))]
pub enum SpaceError {
    #[snafu(display("parameter '{name}' is declared twice"))]
    DuplicateParameter { name: String },

    #[snafu(display("parameter '{name}' has no candidate values"))]
    EmptyDomain { name: String },

    #[snafu(display("unknown parameter '{name}'"))]
    UnknownParameter { name: String },

    #[snafu(display("predicate {predicate} takes {expected} parameters, {found} given"))]
    ArityMismatch { predicate: String, expected: usize, found: usize },

    #[snafu(display("division by zero while evaluating {predicate} on {values:?}"))]
    DivisionByZero { predicate: String, values: Vec<usize> },

    #[snafu(display("sampling gave up after {draws} draws with {found} configurations found"))]
    SampleExhaustion { found: usize, draws: u64 },

    #[snafu(display("sampling fraction must lie in (0, 1], got {fraction}"))]
    InvalidFraction { fraction: f64 },

    #[snafu(display("invalid particle swarm settings: {reason}"))]
    InvalidSwarm { reason: String },

    #[snafu(display("constraint sets or configurations belong to different parameter spaces"))]
    SpaceMismatch,

    #[snafu(display("configuration binds {found} of {expected} parameters"))]
    IncompleteConfiguration { expected: usize, found: usize },

    #[snafu(display("value {value} is not a candidate of parameter '{name}'"))]
    NotACandidate { name: String, value: usize },
}

pub type Result<T, E = SpaceError> = std::result::Result<T, E>;
