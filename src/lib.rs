//! Cross-crate integration tests for the fanout workspace live under `tests/`.
