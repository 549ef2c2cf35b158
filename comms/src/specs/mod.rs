mod run;

pub use run::{ParamsSpec, RunSpec};
