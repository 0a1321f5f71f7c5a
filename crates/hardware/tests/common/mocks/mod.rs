//! Mock backends.
