// Integration tests are organized as a single harness with submodules under
// `tests/suite/`, so cargo links one test binary for the crate.
mod suite;
