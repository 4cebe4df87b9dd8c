//! Integration tests for pin-updater
//!
//! Each test builds a throwaway project repository, puts a scripted `niv` or
//! `npins` first on PATH and runs the real binary against it.

mod helpers;
