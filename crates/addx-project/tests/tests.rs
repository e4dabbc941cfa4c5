// Integration test harness for `addx-project`.
//
// Keep integration tests as submodules of this harness (under `tests/suite/`)
// rather than adding new top-level `tests/*.rs` files.
mod suite;
