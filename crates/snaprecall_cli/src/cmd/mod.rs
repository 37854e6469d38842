/// Matcher generation for one heap object.
pub mod matcher;
/// Setup generation for one heap object.
pub mod setup;
/// Test generation for recorded invocations.
pub mod test;

pub(crate) mod util;
