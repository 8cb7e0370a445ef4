// jgrep - platform/mod.rs
//
// Platform abstraction layer: temp-working-directory and buffered-read
// helpers.
// Dependencies: standard library only.
// Must NOT depend on: core, app.

pub mod fs;
