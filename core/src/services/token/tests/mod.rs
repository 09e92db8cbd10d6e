//! Tests for the token service, codec and key handling
