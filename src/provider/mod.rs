// Screenshot provider abstraction — pluggable backends for url2png and tests.

pub mod traits;
pub mod url2png;
