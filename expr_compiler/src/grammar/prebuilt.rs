//! Parse tables written by the build script from [`super::rules`]

include!(concat!(env!("OUT_DIR"), "/expression_tables.rs"));
