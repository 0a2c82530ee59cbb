/// Mood Museum - record a mood, get exhibit recommendations
///
/// This is the root crate that provides workspace-level documentation.
/// Actual implementation is in the subcrates:
/// - `mood-museum-core`: Codec, record model, recommendation table and challenge message
/// - `mood-museum-client`: Backends, keyed collection store and the submission and reveal workflows
/// - `mood-museum-cli`: Command-line interface

/// Returns the version of the package.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
