use snafu::Snafu;

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("unknown precision '{input}'; expected 16, 32, 64, 3232 or 6464"))]
    Unknown { input: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
