//! Unit test modules.

mod intensity_resolver_test;
mod plan_parser_test;
mod workout_builder_test;
mod workout_parser_test;
