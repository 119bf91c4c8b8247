//! Unit tests for change propagation.
