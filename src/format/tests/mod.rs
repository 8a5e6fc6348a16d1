//! Unit tests for the YOLO codec and label storage.
//!
//! These tests cover line decoding/encoding, round-trip precision and the
//! write-through behavior of the label stores.
