//! Integration tests for the score store

mod score_store;
