mod parallel;
mod sequential;

pub use parallel::Parallel;
pub use sequential::Sequential;
