//! Unit tests for ordered task placement.
